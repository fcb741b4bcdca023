use std::path::PathBuf;

use clap::ValueEnum;

use crate::renderer::RenderConfig;

/// 触摸事件的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceMode {
    /// 直接读内核 evdev 设备
    #[default]
    Evdev,
    /// 窗口系统的 seat 触摸流
    #[value(alias = "xi2")]
    Seat,
}

/// 命令行解析后的运行参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: SourceMode,
    pub device: Option<PathBuf>,
    pub overlay: bool,
    pub describe: bool,
    pub color_seed: Option<u64>,
    pub render: RenderConfig,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: SourceMode::Evdev,
            device: None,
            overlay: false,
            describe: false,
            color_seed: None,
            render: RenderConfig::default(),
        }
    }
}
