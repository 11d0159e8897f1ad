use thiserror::Error;

/// Errors surfaced by the sheet pipeline and its collaborators.
///
/// Geometry problems (negative sizes, photos larger than the paper) are not
/// errors: they are clamped at the boundary and show up as zero capacity.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("dpi must be a finite value greater than zero, got {0}")]
    InvalidDpi(f64),

    #[error("invalid color '{0}', expected #rgb or #rrggbb")]
    InvalidColor(String),

    #[error("unknown {kind} size '{name}', expected {expected}")]
    UnknownPreset {
        kind: &'static str,
        name: String,
        expected: String,
    },

    #[error("image '{0}' has no readable pixel data")]
    UnreadableImage(String),

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("cannot allocate a {width}x{height} render target")]
    SurfaceAllocation { width: u64, height: u64 },

    #[error("invalid sheet configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
