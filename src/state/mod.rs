//! State management module
//!
//! This module handles all application state, including:
//! - The browsed folder and its image list (library.rs)
//! - Shared data structures (data.rs)
//! - Region selection from mouse gestures (selection.rs)
//! - Scan tunables (settings.rs)
//! - The per-image view record (view.rs)

pub mod data;
pub mod library;
pub mod selection;
pub mod settings;
pub mod view;
