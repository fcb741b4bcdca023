use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use mtview::{RunOptions, Session, SourceMode, renderer::RenderConfig};

/// 多点触控可视化工具, 用来调试触摸驱动
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// 触摸事件的来源
    #[arg(long, value_enum, default_value_t = SourceMode::Evdev)]
    mode: SourceMode,

    /// 画在全屏点击穿透的叠加层上, 而不是普通窗口
    #[arg(long)]
    overlay: bool,

    /// 打印设备能力描述 (TOML) 后退出
    #[arg(long)]
    describe: bool,

    /// 提高日志级别, `RUST_LOG` 优先
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// 触点的最小直径 (像素)
    #[arg(long, value_name = "PX")]
    min_size: Option<f64>,

    /// 满压力时的直径, 占 x 跨度的比例
    #[arg(long, value_name = "F")]
    pressure_scale: Option<f64>,

    /// 固定颜色随机种子
    #[arg(long, hide = true)]
    seed: Option<u64>,

    /// evdev 设备路径, 不填则列出 /dev/input 让用户选择
    device: Option<PathBuf>,
}

impl Cli {
    fn into_options(self) -> RunOptions {
        let mut render = RenderConfig::default();
        if let Some(px) = self.min_size {
            render.min_diameter = px.max(0.0);
        }
        if let Some(fraction) = self.pressure_scale {
            render.pressure_fraction = fraction.max(0.0);
        }
        RunOptions {
            mode: self.mode,
            device: self.device,
            overlay: self.overlay,
            describe: self.describe,
            color_seed: self.seed,
            render,
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(options: RunOptions) -> anyhow::Result<()> {
    let Some(session) = Session::setup(&options)? else {
        return Ok(());
    };
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building the runtime")?
        .block_on(session.run())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli.into_options()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
