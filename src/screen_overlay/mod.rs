/// # Wayland backend
///
/// 普通窗口基于 `xdg_shell`, 叠加层基于 [`wlr layer shell`](https://wayland.app/protocols/wlr-layer-shell-unstable-v1)
///
/// ## 兼容性
///
/// for short, 叠加层不支持 [`GNOME`](https://gitlab.gnome.org/GNOME/mutter/-/issues/973)
pub mod backend_wayland;

pub use backend_wayland::WaylandWindow;

use crate::input_devices::SeatTouch;

#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    Resized { width: u32, height: u32 },
    /// 用户关闭了窗口
    Close,
    /// 在窗口里按下了鼠标按键
    Clear,
    Touch(SeatTouch),
}

#[derive(Debug, Clone)]
pub struct WindowOptions {
    pub title: String,
    /// 全屏点击穿透的叠加层, 而不是普通窗口
    pub overlay: bool,
    /// 订阅 seat 的触摸流
    pub touch: bool,
    /// 合成器不指定尺寸时使用
    pub size: (u32, u32),
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "mtview".to_string(),
            overlay: false,
            touch: false,
            size: (1024, 768),
        }
    }
}
