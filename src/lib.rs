/// 命令行之外的运行参数
pub mod config;

/// 触点追踪: 把底层事件流还原成一帧帧的触点
pub mod contact_tracker;

/// 启动阶段的错误类型
pub mod error;

/// 单线程事件循环, 把设备, 追踪, 渲染和窗口串起来
pub mod event_loop;

/// 触摸事件的抽象层，定义事件模型和设备能力
pub mod event_model;

/// 原始输入接口实现（evdev 设备和窗口系统的 seat）
pub mod input_devices;

/// 触点的几何和颜色策略, 画到内存画布上
pub mod renderer;

/// 屏幕叠加层接口，用于显示触点
pub mod screen_overlay;

pub use config::{RunOptions, SourceMode};
pub use error::SetupError;
pub use event_loop::Session;

// 两种来源最后都变成 `TrackerEvent`: evdev 走槽位协议, seat 的事件自带身份
// 追踪器不关心来源, 渲染器只看 `DeviceCaps` 决定画法

// 叠加层点击穿透, 所以只能配合 evdev 使用; seat 模式必须是普通窗口才能收到触摸

// TODO: 多个 seat 时目前只绑定第一个, 可以按名字选择
