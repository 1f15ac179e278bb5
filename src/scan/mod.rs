//! Barcode scanning module
//!
//! This module handles:
//! - Loading images off the UI thread (loader.rs)
//! - Rescaling and binarizing before detection (preprocess.rs)
//! - QR and Data Matrix decoding (decoder.rs)
//! - Batch extraction of Data Matrix crops (batch.rs)

pub mod batch;
pub mod decoder;
pub mod loader;
pub mod preprocess;

#[cfg(test)]
pub(crate) mod fixtures;
