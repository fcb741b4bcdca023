use std::{
    fs::{self, File},
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use evdev_rs::{
    Device, DeviceWrapper,
    enums::{EV_ABS, EventCode},
};
use tracing::debug;

pub const INPUT_DIR: &str = "/dev/input";

#[derive(Debug, Clone)]
pub struct DeviceEntry {
    pub path: PathBuf,
    pub name: String,
    pub multitouch: bool,
}

/// 列出 `/dev/input/event*` 中带绝对坐标轴的设备, 按编号排序
pub fn scan_devices(dir: &Path) -> io::Result<Vec<DeviceEntry>> {
    let mut out = vec![];
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        let is_event_node = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.starts_with("event"));
        if !is_event_node {
            continue;
        }
        let device = match File::open(&path).and_then(Device::new_from_file) {
            Ok(device) => device,
            Err(e) => {
                debug!(path = %path.display(), "skipped: {e}");
                continue;
            }
        };
        let has = |abs| device.has(EventCode::EV_ABS(abs));
        if !(has(EV_ABS::ABS_MT_SLOT) || (has(EV_ABS::ABS_X) && has(EV_ABS::ABS_Y))) {
            continue;
        }
        out.push(DeviceEntry {
            name: device.name().unwrap_or("unknown").to_string(),
            multitouch: has(EV_ABS::ABS_MT_SLOT),
            path,
        });
    }
    out.sort_by_key(|e| event_number(&e.path));
    Ok(out)
}

fn event_number(path: &Path) -> u32 {
    path.file_name()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_prefix("event"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX)
}

/// 打印设备列表并从 `input` 读一个序号
pub fn prompt_selection<R: BufRead, W: Write>(
    devices: &[DeviceEntry],
    mut input: R,
    mut output: W,
) -> io::Result<Option<PathBuf>> {
    writeln!(output, "Available devices:")?;
    for (i, device) in devices.iter().enumerate() {
        let kind = if device.multitouch { "multitouch" } else { "single-touch" };
        writeln!(output, "{i:>3}: {}  {} ({kind})", device.path.display(), device.name)?;
    }
    write!(output, "Select the device number [0-{}]: ", devices.len().saturating_sub(1))?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|i| devices.get(i))
        .map(|d| d.path.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<DeviceEntry> {
        ["event3", "event11"]
            .iter()
            .map(|n| DeviceEntry {
                path: Path::new(INPUT_DIR).join(n),
                name: format!("pad {n}"),
                multitouch: true,
            })
            .collect()
    }

    #[test]
    fn selects_by_index() {
        let mut shown = Vec::new();
        let picked = prompt_selection(&entries(), &b"1\n"[..], &mut shown).unwrap();
        assert_eq!(picked, Some(PathBuf::from("/dev/input/event11")));
        let shown = String::from_utf8(shown).unwrap();
        assert!(shown.contains("  0: /dev/input/event3  pad event3 (multitouch)"));
        assert!(shown.contains("[0-1]"));
    }

    #[test]
    fn rejects_bad_selection() {
        assert_eq!(prompt_selection(&entries(), &b"7\n"[..], io::sink()).unwrap(), None);
        assert_eq!(prompt_selection(&entries(), &b"x\n"[..], io::sink()).unwrap(), None);
    }

    #[test]
    fn numeric_ordering() {
        assert!(event_number(Path::new("/dev/input/event2")) < event_number(Path::new("/dev/input/event10")));
        assert_eq!(event_number(Path::new("/dev/input/mice")), u32::MAX);
    }
}
