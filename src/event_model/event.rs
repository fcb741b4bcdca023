use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 触点的一个标量属性
///
/// 数值取自内核的 `ABS_MT_*` 编码, 单点设备的 `ABS_X`/`ABS_Y`/`ABS_PRESSURE`
/// 在适配层就被翻译成这里对应的多点轴, 之后不再出现原始编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum Axis {
    TouchMajor = 0x30,
    TouchMinor = 0x31,
    Orientation = 0x34,
    PositionX = 0x35,
    PositionY = 0x36,
    Pressure = 0x3a,
}

/// 一个 valuator 的取值, `index` 需要通过 [`ValuatorMap`](crate::contact_tracker::ValuatorMap) 解释
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuator {
    pub index: u16,
    pub value: f64,
}

/// 自带身份的触摸事件 (XI2 / seat 触摸流)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TouchPoint {
    pub id: i32,
    /// 原始设备坐标, 纯 valuator 更新时为 `None`
    pub position: Option<(i32, i32)>,
    pub valuators: Vec<Valuator>,
}

impl TouchPoint {
    pub fn at(id: i32, x: i32, y: i32) -> Self {
        Self {
            id,
            position: Some((x, y)),
            valuators: Vec::new(),
        }
    }
}

/// 送进 [`ContactTracker`](crate::contact_tracker::ContactTracker) 的底层事件
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    SlotSelect(i32),
    TrackingIdSet(i32),
    AxisUpdate(Axis, i32),
    FrameBoundary,
    TouchBegin(TouchPoint),
    TouchUpdate(TouchPoint),
    TouchEnd(i32),
}
