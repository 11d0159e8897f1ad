//! Millimetre / pixel conversion at a given resolution.

use crate::error::SheetError;

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Converts physical lengths to pixels for one render resolution.
///
/// Every pixel edge in the crate goes through [`UnitConverter::mm_to_px_edge`],
/// so the rounding rule is the same for the buffer size, slot rectangles,
/// borders and guide strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    dpi: f64,
    scale: f64,
}

impl UnitConverter {
    pub fn new(dpi: f64) -> Result<Self, SheetError> {
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(SheetError::InvalidDpi(dpi));
        }
        Ok(Self {
            dpi,
            scale: dpi / MM_PER_INCH,
        })
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    /// Pixels per millimetre
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn mm_to_px(&self, mm: f64) -> f64 {
        mm * self.scale
    }

    pub fn px_to_mm(&self, px: f64) -> f64 {
        px / self.scale
    }

    /// Pixel coordinate of an edge lying `mm` from the origin
    pub fn mm_to_px_edge(&self, mm: f64) -> i64 {
        self.mm_to_px(mm).round() as i64
    }

    /// Pixel count spanned by a length starting at the origin
    pub fn mm_to_px_len(&self, mm: f64) -> u64 {
        self.mm_to_px_edge(mm).max(0) as u64
    }
}
