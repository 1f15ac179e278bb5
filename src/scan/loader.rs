//! Image loading and region decoding off the UI thread
//!
//! Decoding a large JPEG or running the Data Matrix chain takes long enough
//! to stall the window, so both run on tokio's blocking pool. Errors are
//! flattened to strings here because iced messages must be `Clone`.
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tokio::task;

use super::decoder;
use crate::error::{Result, ScanError};
use crate::state::data::{DetectedSymbol, LoadedImage, ScanMode};
use crate::state::selection::Selection;
use crate::state::settings::ScanParams;

/// Open and decode an image file
pub fn read_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| ScanError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an image for display
pub async fn load_image(path: PathBuf) -> std::result::Result<LoadedImage, String> {
    task::spawn_blocking(move || -> std::result::Result<LoadedImage, String> {
        let pixels = read_image(&path).map_err(|e| e.to_string())?;
        log::info!(
            "Loaded {} ({}x{})",
            path.display(),
            pixels.width(),
            pixels.height()
        );
        Ok(LoadedImage::new(path, pixels))
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}

/// Decode the selected region of an already loaded image
pub async fn decode_selection(
    image: LoadedImage,
    selection: Selection,
    mode: ScanMode,
    params: ScanParams,
) -> std::result::Result<Vec<DetectedSymbol>, String> {
    task::spawn_blocking(move || {
        decoder::decode_region(&image.pixels, selection, mode, params).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}
