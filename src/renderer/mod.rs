mod canvas;
mod color;
mod shape;

pub use canvas::{Canvas, OPAQUE, Rect};
pub use color::{ColorTable, Rgb};
pub use shape::{Axes, ShapePolicy};

use tracing::{debug, trace};

use crate::event_model::{AxisRange, Contact, DeviceCaps, Frame};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// 满压力时的直径, 占 x 跨度的比例
    pub pressure_fraction: f64,
    /// 没有形状信息时的默认尺寸, 占跨度的比例
    pub default_fraction: f64,
    /// 最小直径 (像素)
    pub min_diameter: f64,
    pub background: Rgb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pressure_fraction: 0.15,
            default_fraction: 0.05,
            min_diameter: 4.0,
            background: 0x000000,
        }
    }
}

/// 设备坐标 -> 窗口像素的仿射映射, 每次 resize 重新计算
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapping {
    x: AxisRange,
    y: AxisRange,
    width: f64,
    height: f64,
}

impl Mapping {
    pub fn new(caps: &DeviceCaps, width: u32, height: u32) -> Self {
        Self {
            x: caps.x,
            y: caps.y,
            width: f64::from(width),
            height: f64::from(height),
        }
    }

    pub fn to_px(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - f64::from(self.x.min)) / self.x.span() * self.width,
            (y - f64::from(self.y.min)) / self.y.span() * self.height,
        )
    }
}

/// 每帧为每个触点画一个椭圆, 只画到离屏缓冲, 脏区域由调用方刷到窗口
pub struct Renderer {
    policy: ShapePolicy,
    fallback: Axes,
    mapping: Mapping,
    colors: ColorTable,
    canvas: Canvas,
    config: RenderConfig,
    damage: Option<Rect>,
}

impl Renderer {
    pub fn new(caps: &DeviceCaps, config: RenderConfig, width: u32, height: u32) -> Self {
        let policy = ShapePolicy::select(caps, config.pressure_fraction);
        debug!(?policy, "shape policy");
        let mut renderer = Self {
            policy,
            fallback: fallback_axes(&config, caps.x, caps.y),
            mapping: Mapping::new(caps, width, height),
            colors: ColorTable::default(),
            canvas: Canvas::new(width, height),
            config,
            damage: None,
        };
        renderer.clear();
        renderer
    }

    pub fn with_colors(mut self, colors: ColorTable) -> Self {
        self.colors = colors;
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// 设备坐标范围变了 (seat 表面改变尺寸) 时更新映射和默认尺寸
    pub fn set_bounds(&mut self, x: AxisRange, y: AxisRange) {
        debug!(?x, ?y, "device bounds");
        self.mapping.x = x;
        self.mapping.y = y;
        self.fallback = fallback_axes(&self.config, x, y);
    }

    /// 重新分配缓冲并清屏, 不重放历史
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.canvas.width(), self.canvas.height()) {
            return;
        }
        debug!(width, height, "resize");
        self.canvas = Canvas::new(width, height);
        self.mapping.width = f64::from(width);
        self.mapping.height = f64::from(height);
        self.damage = None;
        self.clear();
    }

    pub fn clear(&mut self) {
        let full = self.canvas.fill(self.config.background);
        self.damage = Some(full);
    }

    /// 取走自上次以来的脏区域
    pub fn take_damage(&mut self) -> Option<Rect> {
        self.damage.take()
    }

    /// 触点在窗口上的外接矩形 (像素), 已应用最小尺寸
    pub fn bounds(&self, contact: &Contact) -> ((f64, f64), (f64, f64)) {
        let (mx, my) = self.policy.axes(contact, self.fallback).extent();
        let (x, y) = (f64::from(contact.x), f64::from(contact.y));
        let (mut px, mut py) = self.mapping.to_px(x - 0.5 * mx, y - 0.5 * my);
        let (mut qx, mut qy) = self.mapping.to_px(x + 0.5 * mx, y + 0.5 * my);

        let min = self.config.min_diameter;
        if qx - px < min {
            let cx = (px + qx) / 2.0;
            (px, qx) = (cx - min / 2.0, cx + min / 2.0);
        }
        if qy - py < min {
            let cy = (py + qy) / 2.0;
            (py, qy) = (cy - min / 2.0, cy + min / 2.0);
        }
        ((px, py), (qx, qy))
    }

    pub fn color(&mut self, contact: &Contact) -> Rgb {
        self.colors.color_for(contact)
    }

    pub fn render(&mut self, frame: &Frame) {
        for contact in frame.iter() {
            let color = self.colors.color_for(contact);
            let (p, q) = self.bounds(contact);
            trace!(slot = contact.slot, id = contact.tracking_id, ?p, ?q, "contact");
            if let Some(hit) = self.canvas.fill_ellipse(p, q, color) {
                self.damage = Some(self.damage.map_or(hit, |d| d.union(hit)));
            }
        }
    }
}

fn fallback_axes(config: &RenderConfig, x: AxisRange, y: AxisRange) -> Axes {
    Axes {
        major: config.default_fraction * y.span(),
        minor: config.default_fraction * x.span(),
        angle: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_model::DeviceClass;

    fn caps() -> DeviceCaps {
        DeviceCaps {
            name: "test".to_string(),
            class: DeviceClass::Multitouch,
            slots: 10,
            current_slot: Some(0),
            touch_button: true,
            x: AxisRange::new(0, 1000),
            y: AxisRange::new(0, 1000),
            pressure: Some(AxisRange::new(0, 100)),
            touch_major: None,
            touch_minor: None,
            orientation: None,
        }
    }

    fn contact(slot: usize, id: i32, x: i32, y: i32, pressure: i32) -> Contact {
        Contact {
            tracking_id: id,
            x,
            y,
            pressure,
            ..Contact::empty(slot)
        }
    }

    fn renderer(width: u32, height: u32) -> Renderer {
        Renderer::new(&caps(), RenderConfig::default(), width, height).with_colors(ColorTable::with_seed(3))
    }

    #[test]
    fn starts_cleared() {
        let mut r = renderer(50, 40);
        assert_eq!(r.take_damage(), Some(r.canvas().full()));
        assert_eq!(r.take_damage(), None);
        assert_eq!(r.canvas().pixel(10, 10), Some(OPAQUE));
    }

    #[test]
    fn maps_device_to_window() {
        let mut r = renderer(100, 200);
        assert_eq!(r.mapping.to_px(500.0, 500.0), (50.0, 100.0));
        r.resize(300, 100);
        assert_eq!(r.mapping.to_px(500.0, 500.0), (150.0, 50.0));
        assert_eq!((r.canvas().width(), r.canvas().height()), (300, 100));
        assert_eq!(r.take_damage(), Some(r.canvas().full()));
    }

    #[test]
    fn pressure_sized_circle() {
        let r = renderer(1000, 1000);
        // full pressure: 0.15 of the x span
        let ((px, py), (qx, qy)) = r.bounds(&contact(0, 1, 500, 500, 100));
        assert!((qx - px - 150.0).abs() < 1e-9);
        assert!((qy - py - 150.0).abs() < 1e-9);
        assert!(((px + qx) / 2.0 - 500.0).abs() < 1e-9);
    }

    #[test]
    fn minimum_size_floor() {
        let r = renderer(100, 100);
        // 1 unit of pressure is 1.5 device units, 0.15 px here
        let ((px, py), (qx, qy)) = r.bounds(&contact(0, 1, 500, 500, 1));
        assert!((qx - px - 4.0).abs() < 1e-9);
        assert!((qy - py - 4.0).abs() < 1e-9);
        assert!(((px + qx) / 2.0 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn renders_with_stable_color() {
        let mut r = renderer(100, 100);
        r.take_damage();
        let frame = Frame {
            contacts: vec![contact(2, 9, 500, 500, 50)],
        };
        r.render(&frame);
        let damage = r.take_damage().unwrap();
        assert!(damage.x <= 50 && damage.x + damage.width >= 50);
        let painted = r.canvas().pixel(50, 50).unwrap();
        assert_ne!(painted, OPAQUE);

        r.render(&frame);
        assert_eq!(r.canvas().pixel(50, 50), Some(painted));

        let moved = Frame {
            contacts: vec![contact(2, 10, 500, 500, 50)],
        };
        r.render(&moved);
        assert_ne!(r.canvas().pixel(50, 50), Some(painted));
    }

    #[test]
    fn trails_persist_until_clear() {
        let mut r = renderer(100, 100);
        r.render(&Frame {
            contacts: vec![contact(0, 1, 200, 200, 50)],
        });
        r.render(&Frame {
            contacts: vec![contact(0, 1, 800, 800, 50)],
        });
        assert_ne!(r.canvas().pixel(20, 20), Some(OPAQUE));
        r.clear();
        assert_eq!(r.canvas().pixel(20, 20), Some(OPAQUE));
    }
}
