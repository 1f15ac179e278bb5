//! Region-of-interest selection
//!
//! A press/move/release gesture on the canvas is turned into a rectangle in
//! source image pixels. The canvas converts display coordinates before they
//! get here, so nothing in this module knows about zoom or window size.
use super::data::PixelRect;

/// A point in image pixel space (may lie outside the image while dragging)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImagePoint {
    pub x: f32,
    pub y: f32,
}

impl ImagePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Selected rectangle in image pixel space, before clamping
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Selection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Selection {
    /// Bounding box of two corner points, whatever the drag direction
    pub fn from_corners(a: ImagePoint, b: ImagePoint) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        Self {
            x: left,
            y: top,
            width: a.x.max(b.x) - left,
            height: a.y.max(b.y) - top,
        }
    }

    /// Clip to a `width` x `height` image and snap outward to whole pixels.
    ///
    /// Returns `None` when nothing of the selection overlaps the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<PixelRect> {
        let clip = |v: f32, max: u32| v.clamp(0.0, max as f32);

        let left = clip(self.x.floor(), width) as u32;
        let top = clip(self.y.floor(), height) as u32;
        let right = clip((self.x + self.width).ceil(), width) as u32;
        let bottom = clip((self.y + self.height).ceil(), height) as u32;

        let rect = PixelRect::new(left, top, right - left, bottom - top);
        (!rect.is_empty()).then_some(rect)
    }
}

/// Tracks an in-progress drag and the last finished selection
#[derive(Debug, Clone, Default)]
pub struct RegionSelector {
    anchor: Option<ImagePoint>,
    selection: Option<Selection>,
}

impl RegionSelector {
    pub fn press(&mut self, point: ImagePoint) {
        self.anchor = Some(point);
        self.selection = Some(Selection::from_corners(point, point));
    }

    /// Update the rectangle while the button is held; ignored otherwise
    pub fn drag(&mut self, point: ImagePoint) -> Option<Selection> {
        let anchor = self.anchor?;
        let selection = Selection::from_corners(anchor, point);
        self.selection = Some(selection);
        Some(selection)
    }

    pub fn release(&mut self, point: ImagePoint) {
        if self.drag(point).is_some() {
            self.anchor = None;
        }
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }
}
