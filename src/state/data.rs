//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the scan pipeline and the UI layer.
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;

/// Which symbology the viewer decodes in a selected region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    #[default]
    Qr,
    DataMatrix,
}

impl ScanMode {
    pub const ALL: [ScanMode; 2] = [ScanMode::Qr, ScanMode::DataMatrix];

    /// Lowercase file extensions listed when browsing a folder in this mode
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ScanMode::Qr => &["png", "jpg", "jpeg", "bmp", "gif"],
            ScanMode::DataMatrix => &["png", "jpg", "jpeg", "bmp"],
        }
    }

    /// Case-insensitive extension check
    pub fn accepts(self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Qr => write!(f, "QR Code"),
            ScanMode::DataMatrix => write!(f, "Data Matrix"),
        }
    }
}

/// Represents a single image file in the browsed folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Filename only (e.g., "label_01.png")
    pub filename: String,
    /// Full path to the image file
    pub path: PathBuf,
}

/// An image file together with its decoded pixels
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub pixels: Arc<DynamicImage>,
}

impl LoadedImage {
    pub fn new(path: PathBuf, pixels: DynamicImage) -> Self {
        Self {
            path,
            pixels: Arc::new(pixels),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Axis-aligned rectangle in image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Shift by an offset, e.g. from crop coordinates back to the full image
    pub fn translate(&self, dx: u32, dy: u32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grow by `padding` on every side, clipped to a `width` x `height` image
    pub fn padded(&self, padding: u32, width: u32, height: u32) -> Self {
        let x = self.x.saturating_sub(padding).min(width);
        let y = self.y.saturating_sub(padding).min(height);
        let right = self.right().saturating_add(padding).min(width);
        let bottom = self.bottom().saturating_add(padding).min(height);
        Self::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A decoded barcode and where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSymbol {
    pub payload: String,
    pub bounds: PixelRect,
}
