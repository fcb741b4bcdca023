mod scan;
mod translate;

pub use scan::{DeviceEntry, INPUT_DIR, prompt_selection, scan_devices};
pub use translate::EventTranslator;

use std::{
    fs::File,
    io,
    os::fd::{AsRawFd, RawFd},
    path::{Path, PathBuf},
};

use evdev_rs::{
    Device, DeviceWrapper, GrabMode, ReadFlag, ReadStatus,
    enums::{EV_ABS, EV_KEY, EventCode},
};
use tracing::{debug, info, trace, warn};

use crate::contact_tracker::MAX_SLOTS;
use crate::error::SetupError;
use crate::event_model::{AxisRange, DeviceCaps, DeviceClass, TrackerEvent};

/// 独占 (grab) 的 evdev 设备, drop 时释放
struct GrabbedDevice {
    device: Device,
    fd: RawFd,
    path: PathBuf,
}

impl GrabbedDevice {
    fn open(path: &Path) -> Result<Self, SetupError> {
        let open_err = |source| SetupError::DeviceOpen {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        let fd = file.as_raw_fd();
        let mut device = Device::new_from_file(file).map_err(open_err)?;
        device
            .grab(GrabMode::Grab)
            .map_err(|source| SetupError::DeviceGrab {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "device grabbed");
        Ok(Self {
            device,
            fd,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for GrabbedDevice {
    fn drop(&mut self) {
        match self.device.grab(GrabMode::Ungrab) {
            Ok(()) => debug!(path = %self.path.display(), "device released"),
            Err(e) => warn!(path = %self.path.display(), "unable to release device: {e}"),
        }
    }
}

/// evdev 事件源: 打开, 独占, 探测能力, 把内核事件翻译成 [`TrackerEvent`]
pub struct EvdevSource {
    inner: GrabbedDevice,
    caps: DeviceCaps,
    translator: EventTranslator,
    resyncing: bool,
}

impl EvdevSource {
    pub fn open(path: &Path) -> Result<Self, SetupError> {
        let inner = GrabbedDevice::open(path)?;
        // 探测失败时 `inner` 被 drop, grab 随之释放
        let caps = read_caps(&inner.device, path)?;
        if caps.slots > MAX_SLOTS {
            warn!(
                slots = caps.slots,
                capacity = MAX_SLOTS,
                "device reports more slots than tracked, extra contacts are dropped"
            );
        }
        if caps.class == DeviceClass::Multitouch && caps.current_slot.is_none() {
            warn!("current slot unavailable, contacts stay hidden until the device selects a slot");
        }
        info!(name = %caps.name, class = ?caps.class, "opened {}", path.display());
        Ok(Self {
            translator: EventTranslator::new(&caps),
            inner,
            caps,
            resyncing: false,
        })
    }

    pub fn caps(&self) -> &DeviceCaps {
        &self.caps
    }

    pub fn initial_slot(&self) -> Option<i32> {
        EventTranslator::initial_slot(&self.caps)
    }

    /// 读完所有已就绪的事件, 不会阻塞
    ///
    /// 遇到 `SYN_DROPPED` 时切到同步模式, 同步出来的增量照常翻译
    pub fn read_events(&mut self, out: &mut Vec<TrackerEvent>) -> io::Result<()> {
        let device = &self.inner.device;
        loop {
            if !self.resyncing && !device.has_event_pending() {
                return Ok(());
            }
            let flag = if self.resyncing {
                ReadFlag::SYNC
            } else {
                ReadFlag::NORMAL
            };
            match device.next_event(flag) {
                Ok((ReadStatus::Sync, _)) if !self.resyncing => {
                    warn!("events dropped by the kernel, resyncing");
                    self.resyncing = true;
                }
                Ok((_, event)) => {
                    trace!(code = ?event.event_code, value = event.value, "evdev");
                    self.translator
                        .translate(&event.event_code, event.value, out);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if !self.resyncing {
                        return Ok(());
                    }
                    debug!("resync done");
                    self.resyncing = false;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl AsRawFd for EvdevSource {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.fd
    }
}

fn read_caps(device: &Device, path: &Path) -> Result<DeviceCaps, SetupError> {
    let range = |abs: EV_ABS| {
        device
            .abs_info(&EventCode::EV_ABS(abs))
            .map(|info| AxisRange::new(info.minimum, info.maximum))
    };
    let unsupported = |reason: &str| SetupError::UnsupportedDevice {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let class = if device.has(EventCode::EV_ABS(EV_ABS::ABS_MT_SLOT)) {
        DeviceClass::Multitouch
    } else if device.has(EventCode::EV_ABS(EV_ABS::ABS_X))
        && device.has(EventCode::EV_ABS(EV_ABS::ABS_Y))
    {
        DeviceClass::SingleTouch
    } else {
        return Err(unsupported("no slotted multitouch or absolute x/y axes"));
    };

    let name = device.name().unwrap_or("unknown").to_string();
    let touch_button = device.has(EventCode::EV_KEY(EV_KEY::BTN_TOUCH));

    let caps = match class {
        DeviceClass::Multitouch => {
            let (Some(x), Some(y)) = (range(EV_ABS::ABS_MT_POSITION_X), range(EV_ABS::ABS_MT_POSITION_Y))
            else {
                return Err(SetupError::UnreadableCaps {
                    path: path.to_path_buf(),
                    reason: "multitouch device without ABS_MT_POSITION_X/Y".to_string(),
                });
            };
            let slots = range(EV_ABS::ABS_MT_SLOT)
                .map(|r| (r.max - r.min + 1).max(1) as usize)
                .unwrap_or(1);
            DeviceCaps {
                name,
                class,
                slots,
                current_slot: device.event_value(&EventCode::EV_ABS(EV_ABS::ABS_MT_SLOT)),
                touch_button,
                x,
                y,
                pressure: range(EV_ABS::ABS_MT_PRESSURE),
                touch_major: range(EV_ABS::ABS_MT_TOUCH_MAJOR),
                touch_minor: range(EV_ABS::ABS_MT_TOUCH_MINOR),
                orientation: range(EV_ABS::ABS_MT_ORIENTATION),
            }
        }
        _ => {
            let (Some(x), Some(y)) = (range(EV_ABS::ABS_X), range(EV_ABS::ABS_Y)) else {
                return Err(unsupported("absolute x/y axes without range information"));
            };
            DeviceCaps {
                name,
                class,
                slots: 1,
                current_slot: Some(0),
                touch_button,
                x,
                y,
                pressure: range(EV_ABS::ABS_PRESSURE),
                touch_major: None,
                touch_minor: None,
                orientation: None,
            }
        }
    };
    debug!(?caps, "capabilities read");
    Ok(caps)
}
