/// evdev 设备: 独占, 能力探测, 内核事件翻译
pub mod evdev;

/// 窗口系统的触摸流, 每个事件自带身份
pub mod seat;

pub use evdev::EvdevSource;
pub use seat::{SeatSource, SeatTouch};
