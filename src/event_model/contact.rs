use super::event::Axis;

/// `tracking_id` 的唯一"无触点"取值
pub const NO_TRACKING_ID: i32 = -1;

/// 一个槽位上的触点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub slot: usize,
    pub tracking_id: i32,
    pub x: i32,
    pub y: i32,
    pub pressure: i32,
    pub touch_major: i32,
    pub touch_minor: i32,
    pub orientation: i32,
}

impl Contact {
    pub fn empty(slot: usize) -> Self {
        Self {
            slot,
            tracking_id: NO_TRACKING_ID,
            x: 0,
            y: 0,
            pressure: 0,
            touch_major: 0,
            touch_minor: 0,
            orientation: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.tracking_id != NO_TRACKING_ID
    }

    pub fn set_axis(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::PositionX => self.x = value,
            Axis::PositionY => self.y = value,
            Axis::Pressure => self.pressure = value,
            Axis::TouchMajor => self.touch_major = value,
            Axis::TouchMinor => self.touch_minor = value,
            Axis::Orientation => self.orientation = value,
        }
    }
}

/// 同步边界上全部活动触点, 按槽位排序, 用完即弃
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub contacts: Vec<Contact>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }

    pub fn slot(&self, slot: usize) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.slot == slot)
    }
}
