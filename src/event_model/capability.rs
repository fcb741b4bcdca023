use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// 跨度, 至少为 1, 退化的范围也能安全做除数
    pub fn span(&self) -> f64 {
        (self.max as f64 - self.min as f64).max(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceClass {
    /// type B 多点协议, 带 `ABS_MT_SLOT`
    Multitouch,
    /// 只有 `ABS_X`/`ABS_Y`, 映射到 0 号槽位
    SingleTouch,
    /// 窗口系统的触摸流, 每个事件自带身份
    Seat,
}

/// 设备能力描述, 启动时探测一次, 整个会话内不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCaps {
    pub name: String,
    pub class: DeviceClass,
    /// 硬件报告的槽位数, 单点设备为 1
    pub slots: usize,
    /// 设备报告的初始槽位, 无法读取时为 `None`
    pub current_slot: Option<i32>,
    pub touch_button: bool,
    pub x: AxisRange,
    pub y: AxisRange,
    pub pressure: Option<AxisRange>,
    pub touch_major: Option<AxisRange>,
    pub touch_minor: Option<AxisRange>,
    pub orientation: Option<AxisRange>,
}

impl DeviceCaps {
    pub fn has_touch_major(&self) -> bool {
        self.touch_major.is_some()
    }

    pub fn has_touch_minor(&self) -> bool {
        self.touch_minor.is_some()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> DeviceCaps {
        DeviceCaps {
            name: "Test Touchscreen".to_string(),
            class: DeviceClass::Multitouch,
            slots: 10,
            current_slot: Some(0),
            touch_button: true,
            x: AxisRange::new(0, 4095),
            y: AxisRange::new(0, 4095),
            pressure: Some(AxisRange::new(0, 255)),
            touch_major: None,
            touch_minor: None,
            orientation: None,
        }
    }

    #[test]
    fn describe_as_toml() {
        let text = caps().to_toml().unwrap();
        assert!(text.contains("name = \"Test Touchscreen\""));
        assert!(text.contains("class = \"multitouch\""));
        assert!(text.contains("[pressure]"));
        assert!(!text.contains("touch_major"));

        let back: DeviceCaps = toml::from_str(&text).unwrap();
        assert_eq!(back, caps());
    }

    #[test]
    fn degenerate_span() {
        assert_eq!(AxisRange::new(5, 5).span(), 1.0);
        assert_eq!(AxisRange::new(-100, 100).span(), 200.0);
    }
}
