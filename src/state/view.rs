//! Per-image view state
//!
//! Rebuilt from scratch every time an image finishes loading, so the
//! previous selection and result text never leak onto the next image.
use iced::widget::image::Handle;

use super::data::LoadedImage;
use super::selection::{ImagePoint, RegionSelector, Selection};

pub const RESULT_PREFIX: &str = "Decoded data:";

#[derive(Debug, Clone)]
pub struct ViewState {
    pub image: LoadedImage,
    /// GPU-uploadable copy of the pixels for the image widget
    pub handle: Handle,
    pub selector: RegionSelector,
    /// Text shown under the detect button
    pub result: String,
}

impl ViewState {
    pub fn new(image: LoadedImage) -> Self {
        let rgba = image.pixels.to_rgba8();
        let handle = Handle::from_rgba(rgba.width(), rgba.height(), rgba.into_raw());

        Self {
            image,
            handle,
            selector: RegionSelector::default(),
            result: RESULT_PREFIX.to_string(),
        }
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selector.selection()
    }

    /// The selection, if it covers at least one pixel of the image.
    /// A click without a drag leaves a zero-area rectangle behind.
    pub fn region(&self) -> Option<Selection> {
        let (width, height) = self.image_size();
        self.selection()
            .filter(|selection| selection.clamp_to(width, height).is_some())
    }

    pub fn begin_selection(&mut self, point: ImagePoint) {
        self.selector.press(point);
    }

    pub fn update_selection(&mut self, point: ImagePoint) {
        self.selector.drag(point);
    }

    pub fn finish_selection(&mut self, point: ImagePoint) {
        self.selector.release(point);
    }
}
