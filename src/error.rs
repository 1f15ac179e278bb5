//! Error types for loading, scanning and saving
//!
//! Every failure in the scan pipeline ends up as a `ScanError`. None of
//! them is fatal: callers turn them into label text or a log line and keep
//! going with the next image or symbol.
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the scan pipeline
pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The image file could not be opened or decoded
    #[error("cannot read {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A crop could not be written to disk
    #[error("cannot save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Filesystem error (creating output folders, listing directories)
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    /// Rescaling the image failed
    #[error("resize failed: {0}")]
    Resize(String),

    /// The barcode library reported an error other than "nothing found"
    #[error("decode failed: {0}")]
    Decode(String),

    /// The region left after clamping has no pixels
    #[error("selected region is empty")]
    EmptyRegion,
}
