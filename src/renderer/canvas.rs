use std::convert::Infallible;

use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Ellipse, PrimitiveStyle},
};

use super::Rgb;

/// 画布上所有像素的 alpha
pub const OPAQUE: u32 = 0xff00_0000;

/// 像素矩形, 用于记录需要刷到窗口上的区域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn union(self, other: Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

/// 离屏缓冲, ARGB8888, 行优先
///
/// 实现了 [`DrawTarget`], 触点用 embedded-graphics 的图元画上去
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn full(&self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// 某一行在 `[x, x + width)` 范围内的像素
    pub fn row(&self, y: u32, x: u32, width: u32) -> &[u32] {
        let start = y as usize * self.width as usize + x as usize;
        &self.pixels[start..start + width as usize]
    }

    /// 整个画布涂成不透明的 `rgb`
    pub fn fill(&mut self, rgb: Rgb) -> Rect {
        let Ok(()) = self.clear(to_color(rgb));
        self.full()
    }

    /// 填充外接矩形为 `(x0, y0)`-`(x1, y1)` 的椭圆, 返回裁剪到画布内的外接矩形
    pub fn fill_ellipse(&mut self, (x0, y0): (f64, f64), (x1, y1): (f64, f64), rgb: Rgb) -> Option<Rect> {
        if !(x1 > x0 && y1 > y0) {
            return None;
        }
        let top_left = Point::new(x0.round() as i32, y0.round() as i32);
        let size = Size::new(
            ((x1 - x0).round() as u32).max(1),
            ((y1 - y0).round() as u32).max(1),
        );
        let ellipse = Ellipse::new(top_left, size);
        let damage = ellipse.bounding_box().intersection(&self.bounding_box());
        if damage.is_zero_sized() {
            return None;
        }

        let Ok(()) = ellipse
            .into_styled(PrimitiveStyle::with_fill(to_color(rgb)))
            .draw(self);
        Some(Rect {
            x: damage.top_left.x as u32,
            y: damage.top_left.y as u32,
            width: damage.size.width,
            height: damage.size.height,
        })
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < self.width && y < self.height {
                self.pixels[y as usize * self.width as usize + x as usize] = to_argb(color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(to_argb(color));
        Ok(())
    }
}

fn to_color(rgb: Rgb) -> Rgb888 {
    Rgb888::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

fn to_argb(color: Rgb888) -> u32 {
    OPAQUE | (u32::from(color.r()) << 16) | (u32::from(color.g()) << 8) | u32::from(color.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both() {
        let a = Rect { x: 1, y: 2, width: 3, height: 4 };
        let b = Rect { x: 6, y: 0, width: 2, height: 2 };
        assert_eq!(a.union(b), Rect { x: 1, y: 0, width: 7, height: 6 });
    }

    #[test]
    fn ellipse_inside_bounds() {
        let mut canvas = Canvas::new(20, 20);
        let damage = canvas.fill_ellipse((5.0, 5.0), (15.0, 15.0), 0x00ff00).unwrap();
        assert_eq!(damage, Rect { x: 5, y: 5, width: 10, height: 10 });
        assert_eq!(canvas.pixel(10, 10), Some(0xff00ff00));
        // corners of the bounding box stay untouched
        assert_eq!(canvas.pixel(5, 5), Some(0));
        assert_eq!(canvas.pixel(14, 14), Some(0));
        assert_eq!(canvas.pixel(2, 2), Some(0));
    }

    #[test]
    fn ellipse_clipped_at_edges() {
        let mut canvas = Canvas::new(10, 10);
        let damage = canvas.fill_ellipse((-5.0, -5.0), (5.0, 5.0), 0xffffff).unwrap();
        assert_eq!((damage.x, damage.y), (0, 0));
        assert!(damage.x + damage.width <= 10 && damage.y + damage.height <= 10);
        assert_eq!(canvas.pixel(0, 0), Some(0xffffffff));

        assert_eq!(canvas.fill_ellipse((20.0, 20.0), (30.0, 30.0), 1), None);
        assert_eq!(canvas.fill_ellipse((3.0, 3.0), (3.0, 8.0), 1), None);
    }

    #[test]
    fn fill_and_rows() {
        let mut canvas = Canvas::new(4, 3);
        assert_eq!(canvas.fill(0x000000), canvas.full());
        assert_eq!(canvas.row(2, 1, 3), &[0xff000000; 3]);
    }

    #[test]
    fn draws_embedded_graphics_primitives() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill(0x000000);
        Pixel(Point::new(3, 4), Rgb888::new(0x12, 0x34, 0x56))
            .draw(&mut canvas)
            .unwrap();
        assert_eq!(canvas.pixel(3, 4), Some(0xff12_3456));

        // 画到画布外的像素被丢弃
        Pixel(Point::new(-1, 9), Rgb888::WHITE).draw(&mut canvas).unwrap();
        assert_eq!(canvas.bounding_box().size, Size::new(8, 8));
    }

    #[test]
    fn ellipse_honours_aspect() {
        let mut canvas = Canvas::new(40, 20);
        let damage = canvas.fill_ellipse((0.0, 5.0), (40.0, 15.0), 0xff0000).unwrap();
        assert_eq!(damage, Rect { x: 0, y: 5, width: 40, height: 10 });
        assert_eq!(canvas.pixel(2, 10), Some(0xffff0000));
        assert_eq!(canvas.pixel(20, 6), Some(0xffff0000));
        assert_eq!(canvas.pixel(20, 3), Some(0));
    }
}
