//! Image preparation before symbol detection
//!
//! Data Matrix detection runs on a cleaned binary image:
//! grayscale -> adaptive Gaussian threshold -> median denoise.
//! Batch images may additionally be downscaled first.
use fast_image_resize as fr;
use image::{DynamicImage, GrayImage, ImageBuffer, Rgba};
use imageproc::filter::{gaussian_blur_f32, median_filter};

use crate::error::{Result, ScanError};
use crate::state::settings::ScanParams;

/// Run the full chain and return the binary image handed to the detector
pub fn binarize(image: &DynamicImage, params: &ScanParams) -> GrayImage {
    let gray = image.to_luma8();
    let binary = adaptive_threshold(&gray, params.block_size(), params.threshold_offset);
    let cleaned = denoise(&binary, params.denoise_radius);

    log::debug!(
        "Preprocessed {}x{} (block {}, offset {}, denoise r{})",
        gray.width(),
        gray.height(),
        params.block_size(),
        params.threshold_offset,
        params.denoise_radius
    );

    cleaned
}

/// Adaptive threshold against a Gaussian-weighted local mean.
///
/// A pixel turns white when it is brighter than `mean - offset`, black
/// otherwise. The blur sigma is derived from the block size the same way
/// common vision libraries derive it for a Gaussian kernel of that size.
pub fn adaptive_threshold(gray: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let sigma = 0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let local_mean = gaussian_blur_f32(gray, sigma);

    let mut out = gray.clone();
    for (pixel, mean) in out.pixels_mut().zip(local_mean.pixels()) {
        let threshold = i32::from(mean.0[0]) - offset;
        pixel.0[0] = if i32::from(pixel.0[0]) > threshold { 255 } else { 0 };
    }
    out
}

/// Median filter; removes speckles left by thresholding
pub fn denoise(binary: &GrayImage, radius: u32) -> GrayImage {
    if radius == 0 {
        return binary.clone();
    }
    median_filter(binary, radius, radius)
}

/// Target size for a percent scale, never below 1x1
pub fn scaled_size(width: u32, height: u32, percent: u32) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * percent as f64 / 100.0).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Downscale with area averaging (box convolution).
///
/// Falls back to the `image` crate's triangle filter if the fast path
/// rejects the buffer.
pub fn rescale(image: &DynamicImage, percent: u32) -> Result<DynamicImage> {
    let (width, height) = scaled_size(image.width(), image.height(), percent);
    if (width, height) == (image.width(), image.height()) {
        return Ok(image.clone());
    }

    match resize_area(image, width, height) {
        Ok(resized) => Ok(resized),
        Err(err) => {
            log::warn!("Area resize failed, falling back to triangle filter: {}", err);
            Ok(image.resize_exact(width, height, image::imageops::FilterType::Triangle))
        }
    }
}

fn resize_area(image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
    let src = image.to_rgba8();
    let (src_width, src_height) = src.dimensions();

    let src_image =
        fr::images::Image::from_vec_u8(src_width, src_height, src.into_raw(), fr::PixelType::U8x4)
            .map_err(|e| ScanError::Resize(format!("source buffer: {}", e)))?;

    let mut dst_image = fr::images::Image::new(width, height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options =
        fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Box));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ScanError::Resize(e.to_string()))?;

    let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| ScanError::Resize("output buffer has the wrong length".to_string()))?;

    Ok(DynamicImage::ImageRgba8(rgba))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, RgbImage};

    #[test]
    fn test_threshold_output_is_binary() {
        let gray = GrayImage::from_fn(64, 64, |x, y| Luma([((x * 3 + y * 2) % 256) as u8]));
        let binary = adaptive_threshold(&gray, 11, 2);
        assert!(binary.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn test_threshold_survives_uneven_lighting() {
        // dark square on a background that brightens left to right
        let gray = GrayImage::from_fn(120, 60, |x, y| {
            let background = 90 + (x as u8);
            if (50..70).contains(&x) && (20..40).contains(&y) {
                Luma([background - 80])
            } else {
                Luma([background])
            }
        });
        let binary = adaptive_threshold(&gray, 51, 2);
        assert_eq!(binary.get_pixel(60, 30).0[0], 0);
        assert_eq!(binary.get_pixel(5, 5).0[0], 255);
        assert_eq!(binary.get_pixel(115, 55).0[0], 255);
    }

    #[test]
    fn test_denoise_removes_speckle() {
        let mut binary = GrayImage::from_pixel(20, 20, Luma([255]));
        binary.put_pixel(10, 10, Luma([0]));
        let cleaned = denoise(&binary, 1);
        assert_eq!(cleaned.get_pixel(10, 10).0[0], 255);
        assert_eq!(denoise(&binary, 0).get_pixel(10, 10).0[0], 0);
    }

    #[test]
    fn test_scaled_size() {
        assert_eq!(scaled_size(200, 101, 50), (100, 51));
        assert_eq!(scaled_size(3, 3, 25), (1, 1));
        assert_eq!(scaled_size(640, 480, 100), (640, 480));
    }

    #[test]
    fn test_rescale_averages_area() {
        // 2x2 checker blocks average to mid grey at half size
        let image = RgbImage::from_fn(40, 40, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([0, 0, 0])
            } else {
                image::Rgb([255, 255, 255])
            }
        });
        let scaled = rescale(&DynamicImage::ImageRgb8(image), 50).unwrap();
        assert_eq!((scaled.width(), scaled.height()), (20, 20));

        let centre = scaled.to_luma8().get_pixel(10, 10).0[0];
        assert!((100..=155).contains(&centre), "got {centre}");
    }

    #[test]
    fn test_binarize_keeps_dimensions() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(33, 17, image::Rgb([200, 10, 10])));
        let binary = binarize(&image, &ScanParams::default());
        assert_eq!(binary.dimensions(), (33, 17));
    }
}
