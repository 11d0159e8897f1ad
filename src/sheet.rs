//! One render request, captured as an immutable snapshot.
//!
//! A [`SheetJob`] copies the layout config and the photo list when it is
//! created. Later edits to the caller's settings build a new job; a render
//! already running keeps using the values it started with. Jobs are
//! `Send + Sync` and rendering borrows them immutably, so an export and a
//! print of the same sheet can run side by side.

use log::info;

use crate::allocate::{PhotoEntry, SlotAssignment, allocate_slots, total_requested};
use crate::config::LayoutConfig;
use crate::error::SheetError;
use crate::guides::{GuideSet, generate_guides};
use crate::layout::{LayoutGrid, LayoutSummary};
use crate::render::{RenderOptions, RenderTarget, rasterize};

#[derive(Debug, Clone)]
pub struct SheetJob {
    config: LayoutConfig,
    entries: Vec<PhotoEntry>,
    options: RenderOptions,
    grid: LayoutGrid,
    slots: SlotAssignment,
}

impl SheetJob {
    pub fn new(config: &LayoutConfig, entries: &[PhotoEntry], options: RenderOptions) -> Self {
        let config = config.sanitized();
        let grid = LayoutGrid::compute(&config);
        let slots = allocate_slots(entries, grid.capacity);
        Self {
            config,
            entries: entries.to_vec(),
            options,
            grid,
            slots,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn entries(&self) -> &[PhotoEntry] {
        &self.entries
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn grid(&self) -> LayoutGrid {
        self.grid
    }

    pub fn slots(&self) -> &SlotAssignment {
        &self.slots
    }

    pub fn summary(&self) -> LayoutSummary {
        LayoutSummary::new(&self.config, &self.grid, total_requested(&self.entries))
    }

    pub fn guides(&self) -> GuideSet {
        generate_guides(&self.config, &self.grid, &self.slots)
    }

    /// Run the full pipeline into a new pixel buffer
    pub fn render(&self) -> Result<RenderTarget, SheetError> {
        let target = rasterize(
            &self.config,
            &self.entries,
            &self.slots,
            &self.guides(),
            &self.options,
        )?;
        info!(
            "rendered {} photos on a {}x{} px sheet",
            self.slots.len(),
            target.width(),
            target.height()
        );
        Ok(target)
    }
}

/// Lay out and render in one call
pub fn render_sheet(
    config: &LayoutConfig,
    entries: &[PhotoEntry],
    options: RenderOptions,
) -> Result<RenderTarget, SheetError> {
    SheetJob::new(config, entries, options).render()
}
