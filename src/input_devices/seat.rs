use tracing::{debug, trace};

use crate::contact_tracker::ValuatorMap;
use crate::event_model::{AxisRange, DeviceCaps, DeviceClass, TouchPoint, TrackerEvent, Valuator};

/// 表面坐标的亚像素精度, 与 `wl_fixed` 的 1/256 一致
///
/// x/y 和长短轴用同一个比例换算, 非正方形的窗口里圆形触点仍然是圆的
pub const SEAT_SUBPIXEL: f64 = 256.0;

/// seat 触摸流的 valuator 标签, 顺序即序号
pub const SEAT_VALUATOR_LABELS: [&str; 3] =
    ["Abs MT Touch Major", "Abs MT Touch Minor", "Abs MT Orientation"];

const MAJOR: u16 = 0;
const MINOR: u16 = 1;
const ORIENTATION: u16 = 2;

/// 窗口系统发来的触摸事件, 坐标为表面坐标
#[derive(Debug, Clone, PartialEq)]
pub enum SeatTouch {
    Down { id: i32, x: f64, y: f64 },
    Motion { id: i32, x: f64, y: f64 },
    Up { id: i32 },
    Shape { id: i32, major: f64, minor: f64 },
    Orientation { id: i32, degrees: f64 },
    Cancel,
}

/// seat 触摸流 -> 自带身份的 [`TrackerEvent`]
#[derive(Debug, Clone)]
pub struct SeatSource {
    width: f64,
    height: f64,
    down: Vec<i32>,
}

impl SeatSource {
    pub fn new(width: u32, height: u32) -> Self {
        let mut source = Self {
            width: 1.0,
            height: 1.0,
            down: Vec::new(),
        };
        source.resize(width, height);
        source
    }

    /// 描述当前表面尺寸下的坐标范围, 表面改变尺寸后需要重新取
    pub fn caps(&self) -> DeviceCaps {
        let (x, y) = self.bounds();
        let length = AxisRange::new(0, x.max.max(y.max));
        DeviceCaps {
            name: "seat touch".to_string(),
            class: DeviceClass::Seat,
            slots: crate::contact_tracker::MAX_SLOTS,
            current_slot: None,
            touch_button: false,
            x,
            y,
            pressure: None,
            touch_major: Some(length),
            touch_minor: Some(length),
            orientation: Some(AxisRange::new(-90, 90)),
        }
    }

    pub fn bounds(&self) -> (AxisRange, AxisRange) {
        (
            AxisRange::new(0, units(self.width)),
            AxisRange::new(0, units(self.height)),
        )
    }

    pub fn valuators() -> ValuatorMap {
        ValuatorMap::from_labels(&SEAT_VALUATOR_LABELS)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = f64::from(width.max(1));
        self.height = f64::from(height.max(1));
    }

    pub fn translate(&mut self, touch: SeatTouch, out: &mut Vec<TrackerEvent>) {
        trace!(?touch, "seat");
        match touch {
            SeatTouch::Down { id, .. } | SeatTouch::Motion { id, .. } | SeatTouch::Up { id }
                if id < 0 =>
            {
                debug!(id, "negative touch id, dropped");
            }
            SeatTouch::Down { id, x, y } => {
                if !self.down.contains(&id) {
                    self.down.push(id);
                }
                out.push(TrackerEvent::TouchBegin(TouchPoint::at(id, units(x), units(y))));
            }
            SeatTouch::Motion { id, x, y } => {
                out.push(TrackerEvent::TouchUpdate(TouchPoint::at(id, units(x), units(y))));
            }
            SeatTouch::Up { id } => {
                self.down.retain(|&d| d != id);
                out.push(TrackerEvent::TouchEnd(id));
            }
            SeatTouch::Shape { id, major, minor } => {
                out.push(TrackerEvent::TouchUpdate(TouchPoint {
                    id,
                    position: None,
                    valuators: vec![
                        Valuator {
                            index: MAJOR,
                            value: major * SEAT_SUBPIXEL,
                        },
                        Valuator {
                            index: MINOR,
                            value: minor * SEAT_SUBPIXEL,
                        },
                    ],
                }));
            }
            SeatTouch::Orientation { id, degrees } => {
                out.push(TrackerEvent::TouchUpdate(TouchPoint {
                    id,
                    position: None,
                    valuators: vec![Valuator {
                        index: ORIENTATION,
                        value: degrees,
                    }],
                }));
            }
            SeatTouch::Cancel => {
                debug!(count = self.down.len(), "touch sequence cancelled");
                out.extend(self.down.drain(..).map(TrackerEvent::TouchEnd));
            }
        }
    }
}

fn units(v: f64) -> i32 {
    (v * SEAT_SUBPIXEL).round() as i32
}
