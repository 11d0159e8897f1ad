//! Drawing primitives the rasterizer is written against, and the in-memory
//! RGBA implementation used for print output.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::error::SheetError;
use crate::layout::MmRect;
use crate::units::UnitConverter;

/// Integer pixel rectangle; may extend past the surface and is clipped on draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Convert both edges of `rect` with the shared rounding rule, so rects
    /// that touch in millimetres also touch in pixels.
    pub fn from_mm(rect: &MmRect, conv: &UnitConverter) -> Self {
        let left = conv.mm_to_px_edge(rect.x);
        let top = conv.mm_to_px_edge(rect.y);
        let right = conv.mm_to_px_edge(rect.right());
        let bottom = conv.mm_to_px_edge(rect.bottom());
        let span = |a: i64, b: i64| (b - a).clamp(0, u32::MAX as i64) as u32;
        Self {
            x: left,
            y: top,
            width: span(left, right),
            height: span(top, bottom),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> i64 {
        self.x + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height as i64
    }
}

/// Target-independent drawing operations
pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba<u8>);

    /// Draw `image` so it exactly covers `dest`, scaling if the sizes differ.
    fn draw_image(&mut self, image: &RgbaImage, dest: PixelRect);

    /// Stroke a straight line of the given width, all in pixels.
    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgba<u8>);
}

/// Owned RGBA pixel buffer
#[derive(Debug, Clone)]
pub struct PixelSurface {
    image: RgbaImage,
}

impl PixelSurface {
    /// Allocate a `width` x `height` surface filled with `background`.
    ///
    /// Allocation failure is reported instead of aborting the process.
    pub fn new(width: u64, height: u64, background: Rgba<u8>) -> Result<Self, SheetError> {
        let err = || SheetError::SurfaceAllocation { width, height };
        let w = u32::try_from(width).map_err(|_| err())?;
        let h = u32::try_from(height).map_err(|_| err())?;
        let len = usize::try_from(width)
            .ok()
            .and_then(|w| w.checked_mul(usize::try_from(height).ok()?))
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(err)?;

        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(len).map_err(|_| err())?;
        buf.resize(len, 0);
        for px in buf.chunks_exact_mut(4) {
            px.copy_from_slice(&background.0);
        }

        let image = RgbaImage::from_raw(w, h, buf).ok_or_else(err)?;
        Ok(Self { image })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Clip `rect` to the surface, as (x0, y0, x1, y1) with x1/y1 exclusive
    fn clip(&self, rect: PixelRect) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = (self.image.width() as i64, self.image.height() as i64);
        let x0 = rect.x.clamp(0, w);
        let y0 = rect.y.clamp(0, h);
        let x1 = rect.right().clamp(0, w);
        let y1 = rect.bottom().clamp(0, h);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

/// Distance from point `p` to the segment `a`-`b`
fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    (p.0 - cx).hypot(p.1 - cy)
}

impl Surface for PixelSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba<u8>) {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        let (Ok(x), Ok(y)) = (i32::try_from(x0), i32::try_from(y0)) else {
            return;
        };
        let rect = Rect::at(x, y).of_size(x1 - x0, y1 - y0);
        draw_filled_rect_mut(&mut self.image, rect, color);
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: PixelRect) {
        if dest.is_empty() || image.width() == 0 || image.height() == 0 {
            return;
        }
        if image.dimensions() == (dest.width, dest.height) {
            imageops::replace(&mut self.image, image, dest.x, dest.y);
        } else {
            let scaled = imageops::resize(image, dest.width, dest.height, FilterType::Triangle);
            imageops::replace(&mut self.image, &scaled, dest.x, dest.y);
        }
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgba<u8>) {
        let half = width / 2.0;
        let bounds = PixelRect {
            x: (from.0.min(to.0) - half).floor() as i64,
            y: (from.1.min(to.1) - half).floor() as i64,
            width: ((from.0 - to.0).abs() + width).ceil() as u32 + 1,
            height: ((from.1 - to.1).abs() + width).ceil() as u32 + 1,
        };
        let Some((x0, y0, x1, y1)) = self.clip(bounds) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let center = (x as f64 + 0.5, y as f64 + 0.5);
                if distance_to_segment(center, from, to) <= half {
                    self.image.put_pixel(x, y, color);
                }
            }
        }
    }
}
