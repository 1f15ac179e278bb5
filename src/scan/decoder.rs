//! Barcode decoding for a whole image or a selected region
//!
//! QR codes go through `rqrr`, Data Matrix symbols through `rxing`.
//! Both report the payload plus a bounding box in the pixel space of the
//! image they were given.
use image::{DynamicImage, GrayImage};
use rxing::{BarcodeFormat, Exceptions};

use super::preprocess;
use crate::error::{Result, ScanError};
use crate::state::data::{DetectedSymbol, PixelRect, ScanMode};
use crate::state::selection::Selection;
use crate::state::settings::ScanParams;

/// Something that finds and decodes symbols in an image
pub trait SymbolDecoder: Send + Sync {
    fn decode(&self, image: &DynamicImage) -> Result<Vec<DetectedSymbol>>;
}

/// QR detection on the plain grayscale image
#[derive(Debug, Default, Clone, Copy)]
pub struct QrDecoder;

impl SymbolDecoder for QrDecoder {
    fn decode(&self, image: &DynamicImage) -> Result<Vec<DetectedSymbol>> {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();

        let mut prepared = rqrr::PreparedImage::prepare(gray);
        let grids = prepared.detect_grids();

        let mut symbols = Vec::new();

        for grid in grids {
            match grid.decode() {
                Ok((_, payload)) => {
                    let corners = grid.bounds.iter().map(|p| (p.x as f32, p.y as f32));
                    symbols.push(DetectedSymbol {
                        payload,
                        bounds: bounding_box(corners, width, height),
                    });
                }
                // finder-like texture; counts as nothing found
                Err(err) => log::debug!("QR grid failed to decode: {:?}", err),
            }
        }

        Ok(symbols)
    }
}

/// Data Matrix detection on the thresholded and denoised image
#[derive(Debug, Default, Clone, Copy)]
pub struct DataMatrixDecoder {
    pub params: ScanParams,
}

impl DataMatrixDecoder {
    pub fn new(params: ScanParams) -> Self {
        Self { params }
    }
}

impl SymbolDecoder for DataMatrixDecoder {
    fn decode(&self, image: &DynamicImage) -> Result<Vec<DetectedSymbol>> {
        let binary = preprocess::binarize(image, &self.params);
        detect_data_matrix(&binary)
    }
}

/// Find every Data Matrix symbol in an already preprocessed image
pub fn detect_data_matrix(binary: &GrayImage) -> Result<Vec<DetectedSymbol>> {
    let (width, height) = binary.dimensions();

    let results = match rxing::helpers::detect_multiple_in_luma(binary.as_raw().clone(), width, height) {
        Ok(results) => results,
        Err(Exceptions::NotFoundException(_)) => Vec::new(),
        Err(err) => return Err(ScanError::Decode(err.to_string())),
    };

    let symbols = results
        .iter()
        .filter(|result| *result.getBarcodeFormat() == BarcodeFormat::DATA_MATRIX)
        .map(|result| DetectedSymbol {
            payload: result.getText().to_string(),
            bounds: bounding_box(result.getPoints().iter().map(|p| (p.x, p.y)), width, height),
        })
        .collect();

    Ok(symbols)
}

/// Axis-aligned box around the detector's corner points, clipped to the image.
/// Without usable points the whole image is returned.
fn bounding_box(points: impl Iterator<Item = (f32, f32)>, width: u32, height: u32) -> PixelRect {
    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);

    for (x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    if min_x > max_x {
        return PixelRect::new(0, 0, width, height);
    }

    let span = Selection {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    };
    span.clamp_to(width, height)
        .unwrap_or_else(|| PixelRect::new(0, 0, width, height))
}

pub fn decoder_for(mode: ScanMode, params: ScanParams) -> Box<dyn SymbolDecoder> {
    match mode {
        ScanMode::Qr => Box::new(QrDecoder),
        ScanMode::DataMatrix => Box::new(DataMatrixDecoder::new(params)),
    }
}

/// Clamp the selection, crop, and decode the crop for `mode`.
///
/// Returned bounds are in full-image coordinates.
pub fn decode_region(
    image: &DynamicImage,
    selection: Selection,
    mode: ScanMode,
    params: ScanParams,
) -> Result<Vec<DetectedSymbol>> {
    let rect = selection
        .clamp_to(image.width(), image.height())
        .ok_or(ScanError::EmptyRegion)?;

    log::debug!("Decoding {:?} as {}", rect, mode);

    let crop = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
    let symbols = decoder_for(mode, params).decode(&crop)?;

    Ok(symbols
        .into_iter()
        .map(|symbol| DetectedSymbol {
            bounds: symbol.bounds.translate(rect.x, rect.y),
            ..symbol
        })
        .collect())
}

/// Label text for the outcome of a single-region decode
pub fn summarize(mode: ScanMode, outcome: &std::result::Result<Vec<DetectedSymbol>, String>) -> String {
    match outcome {
        Ok(symbols) if symbols.is_empty() => {
            format!("No {} detected in the selected area.", mode)
        }
        Ok(symbols) => {
            let payloads: Vec<&str> = symbols.iter().map(|s| s.payload.as_str()).collect();
            format!("{} {}", crate::state::view::RESULT_PREFIX, payloads.join(", "))
        }
        Err(err) => format!("Error: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::fixtures;

    #[test]
    fn test_qr_in_selected_region() {
        let image = fixtures::with_qr("hello region", 300, 240, (150, 60));
        let selection = Selection { x: 140.0, y: 50.0, width: 160.0, height: 190.0 };

        let symbols = decode_region(&image, selection, ScanMode::Qr, ScanParams::default()).unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].payload, "hello region");
        // bounds are reported in full-image space
        assert!(symbols[0].bounds.x >= 140);
        assert!(symbols[0].bounds.y >= 50);
    }

    #[test]
    fn test_region_without_symbol_is_empty() {
        let image = fixtures::with_qr("elsewhere", 300, 240, (150, 60));
        let selection = Selection { x: 0.0, y: 0.0, width: 100.0, height: 100.0 };

        let symbols = decode_region(&image, selection, ScanMode::Qr, ScanParams::default()).unwrap();
        assert!(symbols.is_empty());
    }

    #[test]
    fn test_unreadable_qr_reports_not_found() {
        let mut canvas = fixtures::with_qr("damaged", 200, 200, (20, 20)).to_rgb8();
        // ink over the middle columns; the three finder patterns stay intact
        for y in 36..120 {
            for x in 68..88 {
                canvas.put_pixel(x, y, image::Rgb([20, 20, 30]));
            }
        }
        let image = DynamicImage::ImageRgb8(canvas);
        let selection = Selection { x: 0.0, y: 0.0, width: 200.0, height: 200.0 };

        let outcome = decode_region(&image, selection, ScanMode::Qr, ScanParams::default())
            .map_err(|e| e.to_string());
        assert!(matches!(&outcome, Ok(symbols) if symbols.is_empty()), "{outcome:?}");
        assert_eq!(
            summarize(ScanMode::Qr, &outcome),
            "No QR Code detected in the selected area."
        );
    }

    #[test]
    fn test_data_matrix_in_selected_region() {
        let image = fixtures::with_data_matrix("ABC123", 320, 320, (170, 150));
        let selection = Selection { x: 150.0, y: 130.0, width: 170.0, height: 190.0 };

        let symbols =
            decode_region(&image, selection, ScanMode::DataMatrix, ScanParams::default()).unwrap();
        let payloads: Vec<_> = symbols.iter().map(|s| s.payload.as_str()).collect();
        assert_eq!(payloads, ["ABC123"]);
    }

    #[test]
    fn test_selection_off_image_is_an_error() {
        let image = fixtures::blank(50, 50);
        let selection = Selection { x: 60.0, y: 60.0, width: 10.0, height: 10.0 };
        let outcome = decode_region(&image, selection, ScanMode::Qr, ScanParams::default());
        assert!(matches!(outcome, Err(ScanError::EmptyRegion)));
    }

    #[test]
    fn test_bounding_box_of_corners() {
        let corners = [(12.4, 30.0), (40.0, 29.5), (40.2, 60.0), (12.0, 60.7)];
        let rect = bounding_box(corners.into_iter(), 100, 100);
        assert_eq!(rect, PixelRect::new(12, 29, 29, 32));
        assert_eq!(bounding_box(std::iter::empty(), 8, 9), PixelRect::new(0, 0, 8, 9));
    }

    #[test]
    fn test_summaries() {
        let found = Ok(vec![
            DetectedSymbol { payload: "one".into(), bounds: PixelRect::new(0, 0, 1, 1) },
            DetectedSymbol { payload: "two".into(), bounds: PixelRect::new(0, 0, 1, 1) },
        ]);
        assert_eq!(summarize(ScanMode::Qr, &found), "Decoded data: one, two");
        assert_eq!(
            summarize(ScanMode::DataMatrix, &Ok(Vec::new())),
            "No Data Matrix detected in the selected area."
        );
        assert_eq!(summarize(ScanMode::Qr, &Err("boom".into())), "Error: boom");
    }
}
