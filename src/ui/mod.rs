//! User interface widgets
//!
//! - The selection overlay drawn on top of the displayed image (canvas.rs)

pub mod canvas;
