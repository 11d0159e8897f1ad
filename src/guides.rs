//! Cut guide generation.
//!
//! Guides are plain line segments in millimetres. Cutter mode marks only
//! the outer perimeter of each contiguous block of photos, so a straightedge
//! cut along a tick runs through the whole block. Scissor mode outlines
//! every photo on its own.

use std::collections::HashSet;

use crate::allocate::SlotAssignment;
use crate::config::{Color, GuideMode, LayoutConfig};
use crate::layout::{LayoutGrid, MmRect};

/// Length of a cutter tick, independent of photo size
pub const CUTTER_TICK_MM: f64 = 5.0;
pub const CUTTER_STROKE_MM: f64 = 0.3;
pub const SCISSOR_STROKE_MM: f64 = 0.2;

/// Stroke used to draw a set of guides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideStyle {
    pub color: Color,
    pub width_mm: f64,
}

impl GuideStyle {
    /// Opaque ink on the white paper around the photos for cutter ticks;
    /// white for scissor outlines, which sit on top of the photos.
    pub fn for_mode(mode: GuideMode) -> Self {
        match mode {
            GuideMode::None | GuideMode::Cutter => Self {
                color: Color::BLACK,
                width_mm: CUTTER_STROKE_MM,
            },
            GuideMode::Scissor => Self {
                color: Color::WHITE,
                width_mm: SCISSOR_STROKE_MM,
            },
        }
    }
}

/// A straight guide line, in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl GuideSegment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn length(&self) -> f64 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }
}

/// All guides for one render, with the stroke they are drawn with
#[derive(Debug, Clone, PartialEq)]
pub struct GuideSet {
    pub mode: GuideMode,
    pub style: GuideStyle,
    pub segments: Vec<GuideSegment>,
}

impl GuideSet {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Which sides of a slot face an empty cell or the edge of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundarySides {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

fn boundary_sides(occupied: &HashSet<(usize, usize)>, col: usize, row: usize) -> BoundarySides {
    let has = |c: Option<usize>, r: Option<usize>| match (c, r) {
        (Some(c), Some(r)) => occupied.contains(&(c, r)),
        _ => false,
    };
    BoundarySides {
        left: !has(col.checked_sub(1), Some(row)),
        right: !has(col.checked_add(1), Some(row)),
        top: !has(Some(col), row.checked_sub(1)),
        bottom: !has(Some(col), row.checked_add(1)),
    }
}

/// Ticks at one slot corner. `dx`/`dy` point away from the slot.
///
/// A boundary on the left/right side gets a horizontal tick continuing the
/// top/bottom edge outward; a boundary on the top/bottom side gets a
/// vertical tick continuing the left/right edge outward.
fn corner_ticks(
    out: &mut Vec<GuideSegment>,
    (cx, cy): (f64, f64),
    (dx, dy): (f64, f64),
    side_boundary: bool,
    end_boundary: bool,
) {
    if side_boundary {
        out.push(GuideSegment::new(cx, cy, cx + dx * CUTTER_TICK_MM, cy));
    }
    if end_boundary {
        out.push(GuideSegment::new(cx, cy, cx, cy + dy * CUTTER_TICK_MM));
    }
}

fn cutter_ticks(rect: &MmRect, sides: BoundarySides, out: &mut Vec<GuideSegment>) {
    let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
    corner_ticks(out, (left, top), (-1.0, -1.0), sides.left, sides.top);
    corner_ticks(out, (right, top), (1.0, -1.0), sides.right, sides.top);
    corner_ticks(out, (left, bottom), (-1.0, 1.0), sides.left, sides.bottom);
    corner_ticks(out, (right, bottom), (1.0, 1.0), sides.right, sides.bottom);
}

fn scissor_outline(rect: &MmRect, out: &mut Vec<GuideSegment>) {
    let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
    out.push(GuideSegment::new(left, top, right, top));
    out.push(GuideSegment::new(left, bottom, right, bottom));
    out.push(GuideSegment::new(left, top, left, bottom));
    out.push(GuideSegment::new(right, top, right, bottom));
}

/// Derive cut guides for the occupied slots, in slot order.
pub fn generate_guides(
    config: &LayoutConfig,
    grid: &LayoutGrid,
    slots: &SlotAssignment,
) -> GuideSet {
    let mode = config.guide_mode;
    let mut segments = Vec::new();

    match mode {
        GuideMode::None => {}
        GuideMode::Scissor => {
            for (index, _) in slots.occupied() {
                scissor_outline(&grid.slot_rect(config, index), &mut segments);
            }
        }
        GuideMode::Cutter => {
            let occupied: HashSet<(usize, usize)> = slots
                .occupied()
                .map(|(index, _)| grid.position(index))
                .collect();
            for (index, _) in slots.occupied() {
                let (col, row) = grid.position(index);
                let sides = boundary_sides(&occupied, col, row);
                cutter_ticks(&grid.slot_rect(config, index), sides, &mut segments);
            }
        }
    }

    GuideSet {
        mode,
        style: GuideStyle::for_mode(mode),
        segments,
    }
}
