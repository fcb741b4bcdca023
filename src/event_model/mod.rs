pub mod capability;
pub mod contact;
pub mod event;

pub use capability::{AxisRange, DeviceCaps, DeviceClass};
pub use contact::{Contact, Frame, NO_TRACKING_ID};
pub use event::{Axis, TouchPoint, TrackerEvent, Valuator};
