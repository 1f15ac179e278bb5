//! Scan parameters
//!
//! Tunables for preprocessing, cropping and batch rescaling. Nothing here
//! is persisted: the scale factor is edited from the batch panel and the
//! rest keep their defaults for the lifetime of the process.

/// Smallest batch scale factor the slider allows (percent)
pub const MIN_SCALE_PERCENT: u32 = 25;
/// Largest batch scale factor (percent, i.e. no rescale)
pub const MAX_SCALE_PERCENT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanParams {
    // ========== Batch ==========
    /// Batch rescale factor in percent (25 to 100)
    /// - 100 = keep the original size
    pub scale_percent: u32,

    /// Pixels added on every side of a detected symbol before cropping
    pub crop_padding: u32,

    // ========== Preprocessing ==========
    /// Neighbourhood size for adaptive thresholding (odd, >= 3)
    pub threshold_block: u32,

    /// Constant subtracted from the local Gaussian mean
    pub threshold_offset: i32,

    /// Median filter radius used for denoising (0 disables it)
    pub denoise_radius: u32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            scale_percent: MAX_SCALE_PERCENT,
            crop_padding: 10,
            threshold_block: 51,
            threshold_offset: 2,
            denoise_radius: 1,
        }
    }
}

impl ScanParams {
    /// Set the batch scale, clamped to the supported range
    pub fn with_scale_percent(mut self, percent: u32) -> Self {
        self.scale_percent = percent.clamp(MIN_SCALE_PERCENT, MAX_SCALE_PERCENT);
        self
    }

    /// Whether batch images need rescaling at all
    pub fn rescales(&self) -> bool {
        self.scale_percent != MAX_SCALE_PERCENT
    }

    /// Block size forced odd and at least 3
    pub fn block_size(&self) -> u32 {
        let block = self.threshold_block.max(3);
        if block % 2 == 0 {
            block + 1
        } else {
            block
        }
    }
}
