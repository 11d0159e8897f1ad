//! Rasterization of a laid-out sheet at print resolution.
//!
//! Drawing order is fixed:
//! 1. Fill the whole sheet with the background colour
//! 2. For each occupied slot in slot order: border (if any), then the
//!    center-cropped photo scaled to exactly fill the slot
//! 3. Guide lines on top of everything

mod surface;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::{debug, warn};
use std::collections::HashMap;

use crate::allocate::{PhotoEntry, SlotAssignment};
use crate::config::{Color, DEFAULT_DPI, LayoutConfig, PaperSpec};
use crate::error::SheetError;
use crate::fit::center_crop;
use crate::guides::GuideSet;
use crate::layout::LayoutGrid;
use crate::units::UnitConverter;

pub use surface::{PixelRect, PixelSurface, Surface};

/// Fill for slots whose image cannot be read
pub const PLACEHOLDER_COLOR: Color = Color::rgb(0xf3, 0xf4, 0xf6);

/// Options for one render call
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Output resolution in dots per inch
    pub dpi: f64,
    /// Resampling filter used to scale photos into their slots
    pub filter: FilterType,
    pub background: Color,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            filter: FilterType::CatmullRom,
            background: Color::WHITE,
        }
    }
}

/// A finished sheet: pixels plus the physical size they represent
#[derive(Debug, Clone)]
pub struct RenderTarget {
    image: RgbaImage,
    paper: PaperSpec,
    dpi: f64,
}

impl RenderTarget {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn paper(&self) -> PaperSpec {
        self.paper
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }
}

/// Pixel size of the sheet for a config at a given resolution
pub fn target_size(paper: &PaperSpec, conv: &UnitConverter) -> (u64, u64) {
    (
        conv.mm_to_px_len(paper.width_mm),
        conv.mm_to_px_len(paper.height_mm),
    )
}

/// Scaled photo tiles for a single render call, keyed by entry and size.
/// `None` records an entry whose pixels could not be read.
type TileCache = HashMap<(usize, u32, u32), Option<RgbaImage>>;

fn fitted_tile<'c>(
    cache: &'c mut TileCache,
    entries: &[PhotoEntry],
    entry_index: usize,
    dest: PixelRect,
    target_ratio: f64,
    filter: FilterType,
) -> Option<&'c RgbaImage> {
    cache
        .entry((entry_index, dest.width, dest.height))
        .or_insert_with(|| {
            let image = &entries.get(entry_index)?.image;
            let crop = center_crop(image.width(), image.height(), target_ratio);
            match image.sample(&crop) {
                Ok(window) => Some(imageops::resize(&window, dest.width, dest.height, filter)),
                Err(e) => {
                    warn!("{}; drawing a placeholder instead", e);
                    None
                }
            }
        })
        .as_ref()
}

/// Draw photos, borders and guides onto `surface`.
pub fn draw_sheet<S: Surface>(
    surface: &mut S,
    config: &LayoutConfig,
    entries: &[PhotoEntry],
    slots: &SlotAssignment,
    guides: &GuideSet,
    conv: &UnitConverter,
    filter: FilterType,
) {
    let config = &config.sanitized();
    let grid = LayoutGrid::compute(config);
    let target_ratio = config.photo.aspect_ratio();
    let mut tiles = TileCache::new();

    for (slot_index, entry_index) in slots.occupied() {
        let rect = grid.slot_rect(config, slot_index);
        let dest = PixelRect::from_mm(&rect, conv);

        if config.border_mm > 0.0 {
            let border = PixelRect::from_mm(&rect.expand(config.border_mm), conv);
            surface.fill_rect(border, config.border_color.to_rgba());
        }
        if dest.is_empty() {
            continue;
        }

        match fitted_tile(&mut tiles, entries, entry_index, dest, target_ratio, filter) {
            Some(tile) => surface.draw_image(tile, dest),
            None => surface.fill_rect(dest, PLACEHOLDER_COLOR.to_rgba()),
        }
    }

    if !guides.is_empty() {
        // Strokes stay at least one pixel wide at low resolutions
        let width = conv.mm_to_px(guides.style.width_mm).max(1.0);
        let color: Rgba<u8> = guides.style.color.to_rgba();
        let point = |x: f64, y: f64| {
            (
                conv.mm_to_px_edge(x) as f64,
                conv.mm_to_px_edge(y) as f64,
            )
        };
        for seg in &guides.segments {
            surface.stroke_line(point(seg.x1, seg.y1), point(seg.x2, seg.y2), width, color);
        }
    }
}

/// Render a sheet into a freshly allocated pixel buffer.
///
/// Only allocation of the buffer itself can fail once the DPI is valid;
/// unreadable photos become placeholders.
pub fn rasterize(
    config: &LayoutConfig,
    entries: &[PhotoEntry],
    slots: &SlotAssignment,
    guides: &GuideSet,
    options: &RenderOptions,
) -> Result<RenderTarget, SheetError> {
    let conv = UnitConverter::new(options.dpi)?;
    let config = config.sanitized();
    let (width, height) = target_size(&config.paper, &conv);
    debug!(
        "rendering {}x{} px sheet at {} dpi ({} slots)",
        width,
        height,
        options.dpi,
        slots.len()
    );

    let mut surface = PixelSurface::new(width, height, options.background.to_rgba())?;
    draw_sheet(
        &mut surface,
        &config,
        entries,
        slots,
        guides,
        &conv,
        options.filter,
    );

    Ok(RenderTarget {
        image: surface.into_image(),
        paper: config.paper,
        dpi: options.dpi,
    })
}
