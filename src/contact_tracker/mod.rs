mod valuator;

pub use valuator::ValuatorMap;

use tracing::{debug, trace, warn};

use crate::event_model::{Contact, Frame, NO_TRACKING_ID, TouchPoint, TrackerEvent};

/// 槽位表容量, 超出的槽位直接丢弃
pub const MAX_SLOTS: usize = 32;

/// 把底层事件流还原成一帧帧的活动触点
///
/// evdev 路径靠 `SlotSelect` 复用槽位, 只在 `FrameBoundary` 出帧;
/// XI2 路径的事件自带身份, 每个事件都立即出帧
#[derive(Debug, Clone)]
pub struct ContactTracker {
    touches: [Contact; MAX_SLOTS],
    current_slot: Option<usize>,
    valuators: ValuatorMap,
}

impl Default for ContactTracker {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ContactTracker {
    /// `initial_slot` 为设备报告的当前槽位
    ///
    /// 读不到时传 `None`: 在设备再次 `SlotSelect` 之前所有触点都不可见
    pub fn new(initial_slot: Option<i32>) -> Self {
        let mut tracker = Self {
            touches: std::array::from_fn(Contact::empty),
            current_slot: None,
            valuators: ValuatorMap::default(),
        };
        match initial_slot {
            Some(slot) => tracker.select_slot(slot),
            None => debug!("initial slot unknown, waiting for the device to select one"),
        }
        tracker
    }

    pub fn with_valuators(mut self, valuators: ValuatorMap) -> Self {
        self.valuators = valuators;
        self
    }

    pub fn current_slot(&self) -> Option<usize> {
        self.current_slot
    }

    pub fn contact(&self, slot: usize) -> Option<&Contact> {
        self.touches.get(slot)
    }

    /// 处理一个事件, 到达帧边界时返回这一帧
    pub fn feed(&mut self, event: TrackerEvent) -> Option<Frame> {
        trace!(?event, "tracker event");
        match event {
            TrackerEvent::SlotSelect(slot) => {
                self.select_slot(slot);
                None
            }
            TrackerEvent::TrackingIdSet(id) => {
                if let Some(touch) = self.current_mut() {
                    touch.tracking_id = id;
                }
                None
            }
            TrackerEvent::AxisUpdate(axis, value) => {
                if let Some(touch) = self.current_mut() {
                    touch.set_axis(axis, value);
                }
                None
            }
            TrackerEvent::FrameBoundary => Some(self.frame()),
            TrackerEvent::TouchBegin(point) => {
                self.touch(point, true);
                Some(self.frame())
            }
            TrackerEvent::TouchUpdate(point) => {
                self.touch(point, false);
                Some(self.frame())
            }
            TrackerEvent::TouchEnd(id) => {
                match self.find(id) {
                    Some(slot) => self.touches[slot].tracking_id = NO_TRACKING_ID,
                    None => debug!(id, "touch end for unknown id, dropped"),
                }
                Some(self.frame())
            }
        }
    }

    /// 依次处理一批事件, 收集其间产生的所有帧
    pub fn feed_all<I>(&mut self, events: I) -> Vec<Frame>
    where
        I: IntoIterator<Item = TrackerEvent>,
    {
        events.into_iter().filter_map(|e| self.feed(e)).collect()
    }

    /// 当前全部活动触点, 不清除任何状态
    pub fn frame(&self) -> Frame {
        Frame {
            contacts: self
                .touches
                .iter()
                .filter(|t| t.is_active())
                .copied()
                .collect(),
        }
    }

    fn select_slot(&mut self, slot: i32) {
        self.current_slot = usize::try_from(slot).ok().filter(|&s| s < MAX_SLOTS);
        if self.current_slot.is_none() {
            warn!(slot, capacity = MAX_SLOTS, "slot out of range, events dropped until next slot select");
        }
    }

    fn current_mut(&mut self) -> Option<&mut Contact> {
        self.current_slot.map(|slot| &mut self.touches[slot])
    }

    fn find(&self, id: i32) -> Option<usize> {
        if id == NO_TRACKING_ID {
            return None;
        }
        self.touches.iter().position(|t| t.tracking_id == id)
    }

    fn allocate(&self) -> Option<usize> {
        self.touches.iter().position(|t| !t.is_active())
    }

    fn touch(&mut self, point: TouchPoint, begin: bool) {
        let slot = match (self.find(point.id), begin) {
            (Some(slot), _) => slot,
            (None, true) => match self.allocate() {
                Some(slot) => {
                    self.touches[slot] = Contact::empty(slot);
                    self.touches[slot].tracking_id = point.id;
                    slot
                }
                None => {
                    warn!(id = point.id, capacity = MAX_SLOTS, "no free slot, touch dropped");
                    return;
                }
            },
            (None, false) => {
                debug!(id = point.id, "touch update for unknown id, dropped");
                return;
            }
        };

        let touch = &mut self.touches[slot];
        if let Some((x, y)) = point.position {
            touch.x = x;
            touch.y = y;
        }
        for valuator in &point.valuators {
            match self.valuators.axis(valuator.index) {
                Some(axis) => touch.set_axis(axis, valuator.value.round() as i32),
                None => trace!(index = valuator.index, "unmapped valuator"),
            }
        }
    }
}
