//! # photo-sheet
//!
//! A Rust library for packing photos onto a printable sheet and rendering
//! the sheet at print resolution.
//!
//! ## Features
//!
//! - **Grid layout**: Fit as many photos of a physical size as the paper,
//!   margin and gutter allow
//! - **Copy allocation**: Expand per-photo copy counts into slots, in order
//! - **Center-crop fitting**: Fill each slot without stretching the photo
//! - **Cut guides**: Corner ticks for a straightedge cutter, or outlines
//!   for scissors
//! - **Rasterization**: Render the sheet into an RGBA buffer at any DPI
//!
//! ## Example
//!
//! ```rust,ignore
//! use photo_sheet::{LayoutConfig, PhotoEntry, RasterDecoder, ImageDecoder, RenderOptions, render_sheet};
//! use std::sync::Arc;
//!
//! let bytes = std::fs::read("me.jpg").unwrap();
//! let photo = Arc::new(RasterDecoder.decode("me.jpg", &bytes).unwrap());
//! let entries = vec![PhotoEntry::new(photo, 8)];
//! let sheet = render_sheet(&LayoutConfig::default(), &entries, RenderOptions::default()).unwrap();
//! sheet.image().save("sheet.png").unwrap();
//! ```

pub mod allocate;
pub mod config;
pub mod error;
pub mod fit;
pub mod guides;
pub mod layout;
pub mod render;
pub mod sheet;
pub mod source;
pub mod units;

// Re-export commonly used items
pub use allocate::{PhotoEntry, SlotAssignment, allocate_slots, total_requested};
pub use config::{Color, GuideMode, LayoutConfig, PaperSpec, PhotoSpec, SheetConfig};
pub use error::SheetError;
pub use fit::{SourceRect, center_crop};
pub use guides::{GuideSegment, GuideSet, GuideStyle, generate_guides};
pub use layout::{LayoutGrid, LayoutSummary, MmRect};
pub use render::{RenderOptions, RenderTarget, Surface, rasterize};
pub use sheet::{SheetJob, render_sheet};
pub use source::{Exporter, ImageDecoder, JpegExporter, PngExporter, RasterDecoder, SourceImage};
pub use units::UnitConverter;
