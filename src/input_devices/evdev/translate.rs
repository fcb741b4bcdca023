use evdev_rs::enums::{EV_ABS, EV_KEY, EV_SYN, EventCode};
use tracing::{debug, trace};

use crate::event_model::{Axis, DeviceCaps, DeviceClass, NO_TRACKING_ID, TrackerEvent};

/// 内核事件 -> [`TrackerEvent`], 轴编码只在这里翻译一次
///
/// 单点设备的 `ABS_X`/`ABS_Y`/`ABS_PRESSURE` 被映射到 0 号槽位,
/// 触点的开始结束由 `BTN_TOUCH` 决定; 设备没有 `BTN_TOUCH` 时,
/// 第一个轴事件开始触点, `ABS_PRESSURE == 0` 结束触点
#[derive(Debug, Clone)]
pub struct EventTranslator {
    class: DeviceClass,
    touch_button: bool,
    touching: bool,
    next_id: i32,
}

impl EventTranslator {
    pub fn new(caps: &DeviceCaps) -> Self {
        Self {
            class: caps.class,
            touch_button: caps.touch_button,
            touching: false,
            next_id: 0,
        }
    }

    /// 单点设备没有槽位选择, 槽位固定为 0
    pub fn initial_slot(caps: &DeviceCaps) -> Option<i32> {
        match caps.class {
            DeviceClass::SingleTouch => Some(0),
            _ => caps.current_slot,
        }
    }

    pub fn translate(&mut self, code: &EventCode, value: i32, out: &mut Vec<TrackerEvent>) {
        match code {
            EventCode::EV_SYN(EV_SYN::SYN_REPORT) => out.push(TrackerEvent::FrameBoundary),
            EventCode::EV_SYN(_) => {}
            EventCode::EV_ABS(abs) => match self.class {
                DeviceClass::SingleTouch => self.single_touch_abs(abs, value, out),
                _ => multitouch_abs(abs, value, out),
            },
            EventCode::EV_KEY(EV_KEY::BTN_TOUCH) if self.class == DeviceClass::SingleTouch => {
                if value != 0 {
                    self.begin(out);
                } else {
                    self.end(out);
                }
            }
            _ => trace!(?code, value, "ignored"),
        }
    }

    fn single_touch_abs(&mut self, abs: &EV_ABS, value: i32, out: &mut Vec<TrackerEvent>) {
        let axis = match abs {
            EV_ABS::ABS_X => Axis::PositionX,
            EV_ABS::ABS_Y => Axis::PositionY,
            EV_ABS::ABS_PRESSURE => Axis::Pressure,
            _ => return,
        };
        if !self.touch_button {
            if axis == Axis::Pressure && value == 0 {
                out.push(TrackerEvent::AxisUpdate(axis, value));
                self.end(out);
                return;
            }
            self.begin(out);
        }
        out.push(TrackerEvent::AxisUpdate(axis, value));
    }

    fn begin(&mut self, out: &mut Vec<TrackerEvent>) {
        if !self.touching {
            self.touching = true;
            out.push(TrackerEvent::TrackingIdSet(self.next_id));
            self.next_id = self.next_id.wrapping_add(1).max(0);
        }
    }

    fn end(&mut self, out: &mut Vec<TrackerEvent>) {
        if self.touching {
            self.touching = false;
            out.push(TrackerEvent::TrackingIdSet(NO_TRACKING_ID));
        }
    }
}

fn multitouch_abs(abs: &EV_ABS, value: i32, out: &mut Vec<TrackerEvent>) {
    match abs {
        EV_ABS::ABS_MT_SLOT => out.push(TrackerEvent::SlotSelect(value)),
        EV_ABS::ABS_MT_TRACKING_ID => out.push(TrackerEvent::TrackingIdSet(value)),
        other => match Axis::try_from(*other as u16) {
            Ok(axis) => out.push(TrackerEvent::AxisUpdate(axis, value)),
            Err(_) => debug!(?other, value, "unhandled absolute axis"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact_tracker::ContactTracker;
    use crate::event_model::AxisRange;

    fn caps(class: DeviceClass, touch_button: bool) -> DeviceCaps {
        DeviceCaps {
            name: "test".to_string(),
            class,
            slots: 1,
            current_slot: None,
            touch_button,
            x: AxisRange::new(0, 1000),
            y: AxisRange::new(0, 1000),
            pressure: Some(AxisRange::new(0, 255)),
            touch_major: None,
            touch_minor: None,
            orientation: None,
        }
    }

    fn run(translator: &mut EventTranslator, raw: &[(EventCode, i32)]) -> Vec<TrackerEvent> {
        let mut out = Vec::new();
        for (code, value) in raw {
            translator.translate(code, *value, &mut out);
        }
        out
    }

    const SYN: EventCode = EventCode::EV_SYN(EV_SYN::SYN_REPORT);

    #[test]
    fn multitouch_codes() {
        let mut t = EventTranslator::new(&caps(DeviceClass::Multitouch, true));
        let out = run(
            &mut t,
            &[
                (EventCode::EV_ABS(EV_ABS::ABS_MT_SLOT), 1),
                (EventCode::EV_ABS(EV_ABS::ABS_MT_TRACKING_ID), 33),
                (EventCode::EV_ABS(EV_ABS::ABS_MT_POSITION_X), 10),
                (EventCode::EV_ABS(EV_ABS::ABS_MT_TOUCH_MAJOR), 4),
                (EventCode::EV_ABS(EV_ABS::ABS_MT_ORIENTATION), -2),
                // legacy emulation, ignored on multitouch devices
                (EventCode::EV_ABS(EV_ABS::ABS_X), 10),
                (EventCode::EV_KEY(EV_KEY::BTN_TOUCH), 1),
                (SYN, 0),
            ],
        );
        assert_eq!(
            out,
            [
                TrackerEvent::SlotSelect(1),
                TrackerEvent::TrackingIdSet(33),
                TrackerEvent::AxisUpdate(Axis::PositionX, 10),
                TrackerEvent::AxisUpdate(Axis::TouchMajor, 4),
                TrackerEvent::AxisUpdate(Axis::Orientation, -2),
                TrackerEvent::FrameBoundary,
            ]
        );
    }

    #[test]
    fn single_touch_remap_to_slot_zero() {
        let caps = caps(DeviceClass::SingleTouch, false);
        let mut t = EventTranslator::new(&caps);
        let mut tracker = ContactTracker::new(EventTranslator::initial_slot(&caps));
        let events = run(
            &mut t,
            &[
                (EventCode::EV_ABS(EV_ABS::ABS_X), 321),
                (EventCode::EV_ABS(EV_ABS::ABS_Y), 654),
                (EventCode::EV_ABS(EV_ABS::ABS_PRESSURE), 77),
                (SYN, 0),
            ],
        );
        let frame = tracker.feed_all(events).pop().unwrap();
        assert_eq!(frame.len(), 1);
        let c = frame.contacts[0];
        assert_eq!((c.slot, c.x, c.y, c.pressure), (0, 321, 654, 77));

        let events = run(&mut t, &[(EventCode::EV_ABS(EV_ABS::ABS_PRESSURE), 0), (SYN, 0)]);
        assert!(tracker.feed_all(events).pop().unwrap().is_empty());
    }

    #[test]
    fn single_touch_follows_touch_button() {
        let caps = caps(DeviceClass::SingleTouch, true);
        let mut t = EventTranslator::new(&caps);
        let mut tracker = ContactTracker::new(EventTranslator::initial_slot(&caps));

        // hovering, no contact yet
        let events = run(&mut t, &[(EventCode::EV_ABS(EV_ABS::ABS_X), 5), (SYN, 0)]);
        assert!(tracker.feed_all(events).pop().unwrap().is_empty());

        let events = run(
            &mut t,
            &[
                (EventCode::EV_KEY(EV_KEY::BTN_TOUCH), 1),
                (EventCode::EV_ABS(EV_ABS::ABS_Y), 6),
                (SYN, 0),
            ],
        );
        let frame = tracker.feed_all(events).pop().unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!((frame.contacts[0].x, frame.contacts[0].y), (5, 6));
        let first_id = frame.contacts[0].tracking_id;

        let events = run(&mut t, &[(EventCode::EV_KEY(EV_KEY::BTN_TOUCH), 0), (SYN, 0)]);
        assert!(tracker.feed_all(events).pop().unwrap().is_empty());

        let events = run(&mut t, &[(EventCode::EV_KEY(EV_KEY::BTN_TOUCH), 1), (SYN, 0)]);
        let frame = tracker.feed_all(events).pop().unwrap();
        assert_ne!(frame.contacts[0].tracking_id, first_id);
    }
}
