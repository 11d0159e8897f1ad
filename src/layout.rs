//! Grid packing: how many photos of a given size fit on the paper.

use log::debug;
use serde::Serialize;

use crate::config::LayoutConfig;

/// Smallest slot pitch treated as non-degenerate
const MIN_PITCH_MM: f64 = 1e-9;

/// Axis-aligned rectangle in millimetres, origin at the top-left paper corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MmRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MmRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Grow by `amount` on all four sides
    pub fn expand(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }
}

/// Slot grid derived from a [`LayoutConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutGrid {
    pub cols: usize,
    pub rows: usize,
    pub capacity: usize,
}

/// Number of slots along one axis.
///
/// N slots need N-1 gutters, so one gutter is added to the available space
/// before dividing by the slot pitch.
fn slots_along(paper: f64, margin: f64, photo: f64, gutter: f64) -> usize {
    let available = paper - 2.0 * margin;
    let pitch = photo + gutter;
    if available <= 0.0 || pitch <= MIN_PITCH_MM || photo <= 0.0 {
        return 0;
    }
    let count = ((available + gutter) / pitch).floor();
    if count.is_finite() && count > 0.0 {
        count as usize
    } else {
        0
    }
}

impl LayoutGrid {
    /// Compute the grid for a config. Unusable lengths give an empty grid.
    pub fn compute(config: &LayoutConfig) -> Self {
        let config = config.sanitized();
        let cols = slots_along(
            config.paper.width_mm,
            config.margin_mm,
            config.photo.width_mm,
            config.gutter_mm,
        );
        let rows = slots_along(
            config.paper.height_mm,
            config.margin_mm,
            config.photo.height_mm,
            config.gutter_mm,
        );
        let grid = Self {
            cols,
            rows,
            capacity: cols.saturating_mul(rows),
        };
        debug!("layout grid {}x{} ({} slots)", cols, rows, grid.capacity);
        grid
    }

    /// Row-major grid position of slot `index` as (col, row)
    pub fn position(&self, index: usize) -> (usize, usize) {
        if self.cols == 0 {
            return (0, 0);
        }
        (index % self.cols, index / self.cols)
    }

    /// Bounds of the slot at (col, row), in millimetres
    pub fn cell_rect(config: &LayoutConfig, col: usize, row: usize) -> MmRect {
        let pitch_x = config.photo.width_mm + config.gutter_mm;
        let pitch_y = config.photo.height_mm + config.gutter_mm;
        MmRect::new(
            config.margin_mm + col as f64 * pitch_x,
            config.margin_mm + row as f64 * pitch_y,
            config.photo.width_mm,
            config.photo.height_mm,
        )
    }

    /// Bounds of slot `index`, in millimetres
    pub fn slot_rect(&self, config: &LayoutConfig, index: usize) -> MmRect {
        let (col, row) = self.position(index);
        Self::cell_rect(config, col, row)
    }
}

/// Layout facts for display next to the sheet
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutSummary {
    pub cols: usize,
    pub rows: usize,
    pub capacity: usize,
    pub total_requested: usize,
    pub would_truncate: bool,
    pub paper_width_mm: f64,
    pub paper_height_mm: f64,
}

impl LayoutSummary {
    pub fn new(config: &LayoutConfig, grid: &LayoutGrid, total_requested: usize) -> Self {
        Self {
            cols: grid.cols,
            rows: grid.rows,
            capacity: grid.capacity,
            total_requested,
            would_truncate: total_requested > grid.capacity,
            paper_width_mm: config.paper.width_mm,
            paper_height_mm: config.paper.height_mm,
        }
    }
}
