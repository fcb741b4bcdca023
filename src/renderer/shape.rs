use std::f64::consts::FRAC_PI_2;

use crate::event_model::{Contact, DeviceCaps};

/// 椭圆的长短轴 (设备坐标) 和旋转角 (弧度)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    pub major: f64,
    pub minor: f64,
    pub angle: f64,
}

impl Axes {
    /// 旋转后沿 x/y 方向的近似外接尺寸, 不做完整的仿射变换
    pub fn extent(&self) -> (f64, f64) {
        let ac = self.angle.cos().abs();
        let as_ = self.angle.sin().abs();
        (
            (self.minor * ac).max(self.major * as_),
            (self.major * ac).max(self.minor * as_),
        )
    }
}

/// 触点形状的推导方式, 打开设备时按能力选一次
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapePolicy {
    /// 只有压力: 直径正比于压力, 不旋转
    Pressure { diameter_per_unit: f64 },
    /// 有 touch major: 按长短轴和方向画椭圆
    TouchGeometry {
        minor_from_major: bool,
        radians_per_unit: f64,
    },
    /// 没有任何形状信息
    Fixed,
}

impl ShapePolicy {
    pub fn select(caps: &DeviceCaps, pressure_fraction: f64) -> Self {
        if caps.has_touch_major() {
            let radians_per_unit = match caps.orientation {
                Some(range) if range.max > 0 => FRAC_PI_2 / f64::from(range.max),
                _ => 0.0,
            };
            Self::TouchGeometry {
                minor_from_major: !caps.has_touch_minor(),
                radians_per_unit,
            }
        } else if let Some(pressure) = caps.pressure.filter(|p| p.max > 0) {
            Self::Pressure {
                diameter_per_unit: pressure_fraction / f64::from(pressure.max) * caps.x.span(),
            }
        } else {
            Self::Fixed
        }
    }

    /// `fallback` 用于没有形状信息或长短轴都为 0 的触点
    pub fn axes(&self, contact: &Contact, fallback: Axes) -> Axes {
        let axes = match *self {
            Self::Pressure { diameter_per_unit } => {
                let d = f64::from(contact.pressure.max(0)) * diameter_per_unit;
                Axes {
                    major: d,
                    minor: d,
                    angle: 0.0,
                }
            }
            Self::TouchGeometry {
                minor_from_major,
                radians_per_unit,
            } => {
                let major = f64::from(contact.touch_major.max(0));
                let minor = if minor_from_major {
                    major
                } else {
                    f64::from(contact.touch_minor.max(0))
                };
                Axes {
                    major,
                    minor,
                    angle: f64::from(contact.orientation) * radians_per_unit,
                }
            }
            Self::Fixed => fallback,
        };
        if axes.major == 0.0 && axes.minor == 0.0 {
            fallback
        } else {
            axes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_model::{AxisRange, DeviceClass};

    fn caps() -> DeviceCaps {
        DeviceCaps {
            name: "test".to_string(),
            class: DeviceClass::Multitouch,
            slots: 10,
            current_slot: Some(0),
            touch_button: true,
            x: AxisRange::new(0, 1000),
            y: AxisRange::new(0, 500),
            pressure: None,
            touch_major: None,
            touch_minor: None,
            orientation: None,
        }
    }

    const FALLBACK: Axes = Axes {
        major: 25.0,
        minor: 50.0,
        angle: 0.0,
    };

    fn contact() -> Contact {
        Contact {
            tracking_id: 1,
            ..Contact::empty(0)
        }
    }

    #[test]
    fn selection_priority() {
        let mut c = caps();
        assert_eq!(ShapePolicy::select(&c, 0.15), ShapePolicy::Fixed);

        c.pressure = Some(AxisRange::new(0, 100));
        assert_eq!(
            ShapePolicy::select(&c, 0.15),
            ShapePolicy::Pressure {
                diameter_per_unit: 0.15 / 100.0 * 1000.0
            }
        );

        c.touch_major = Some(AxisRange::new(0, 255));
        c.orientation = Some(AxisRange::new(-90, 90));
        assert_eq!(
            ShapePolicy::select(&c, 0.15),
            ShapePolicy::TouchGeometry {
                minor_from_major: true,
                radians_per_unit: FRAC_PI_2 / 90.0,
            }
        );

        c.touch_minor = Some(AxisRange::new(0, 255));
        c.orientation = Some(AxisRange::new(0, 0));
        assert_eq!(
            ShapePolicy::select(&c, 0.15),
            ShapePolicy::TouchGeometry {
                minor_from_major: false,
                radians_per_unit: 0.0,
            }
        );
    }

    #[test]
    fn pressure_scales_diameter() {
        let policy = ShapePolicy::Pressure {
            diameter_per_unit: 2.0,
        };
        let axes = policy.axes(
            &Contact {
                pressure: 10,
                ..contact()
            },
            FALLBACK,
        );
        assert_eq!((axes.major, axes.minor, axes.angle), (20.0, 20.0, 0.0));
    }

    #[test]
    fn minor_defaults_to_major() {
        let policy = ShapePolicy::TouchGeometry {
            minor_from_major: true,
            radians_per_unit: 0.0,
        };
        let axes = policy.axes(
            &Contact {
                touch_major: 12,
                touch_minor: 3,
                ..contact()
            },
            FALLBACK,
        );
        assert_eq!((axes.major, axes.minor), (12.0, 12.0));
    }

    #[test]
    fn zero_size_falls_back() {
        let policy = ShapePolicy::Pressure {
            diameter_per_unit: 2.0,
        };
        assert_eq!(policy.axes(&contact(), FALLBACK), FALLBACK);
        assert_eq!(ShapePolicy::Fixed.axes(&contact(), FALLBACK), FALLBACK);
    }

    #[test]
    fn rotated_extent() {
        let upright = Axes {
            major: 40.0,
            minor: 10.0,
            angle: 0.0,
        };
        assert_eq!(upright.extent(), (10.0, 40.0));

        let (mx, my) = Axes {
            angle: FRAC_PI_2,
            ..upright
        }
        .extent();
        assert!((mx - 40.0).abs() < 1e-9);
        assert!((my - 10.0).abs() < 1e-9);

        let (mx, my) = Axes {
            angle: FRAC_PI_2 / 2.0,
            ..upright
        }
        .extent();
        let expected = 40.0 * std::f64::consts::FRAC_1_SQRT_2;
        assert!((mx - expected).abs() < 1e-9);
        assert!((my - expected).abs() < 1e-9);
    }
}
