//! Center-crop fitting of a source image into a slot's aspect ratio.

/// Region of a source image to sample, in source pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRect {
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Whole-pixel crop window (x, y, width, height) inside a
    /// `image_width` x `image_height` image, at least one pixel each way.
    pub fn to_pixel_bounds(&self, image_width: u32, image_height: u32) -> (u32, u32, u32, u32) {
        let clamp = |v: f64, max: u32| v.round().clamp(0.0, max as f64) as u32;
        let x = clamp(self.x, image_width.saturating_sub(1));
        let y = clamp(self.y, image_height.saturating_sub(1));
        let width = clamp(self.width, image_width - x).max(1);
        let height = clamp(self.height, image_height - y).max(1);
        (x, y, width, height)
    }
}

/// The largest centered region of a `pixel_width` x `pixel_height` image
/// whose aspect ratio is `target_ratio` (width / height).
///
/// Images wider than the target keep their full height; the rest keep
/// their full width. A non-positive or non-finite ratio samples the whole
/// image.
pub fn center_crop(pixel_width: u32, pixel_height: u32, target_ratio: f64) -> SourceRect {
    let w = pixel_width as f64;
    let h = pixel_height as f64;
    let full = SourceRect {
        x: 0.0,
        y: 0.0,
        width: w,
        height: h,
    };
    if pixel_width == 0 || pixel_height == 0 || !target_ratio.is_finite() || target_ratio <= 0.0
    {
        return full;
    }

    let image_ratio = w / h;
    if image_ratio > target_ratio {
        let width = h * target_ratio;
        SourceRect {
            x: (w - width) / 2.0,
            y: 0.0,
            width,
            height: h,
        }
    } else {
        let height = w / target_ratio;
        SourceRect {
            x: 0.0,
            y: (h - height) / 2.0,
            width: w,
            height,
        }
    }
}
