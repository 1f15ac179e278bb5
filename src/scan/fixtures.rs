//! Synthetic test images: symbols painted onto a light background

use image::{DynamicImage, Rgb, RgbImage};

const BACKGROUND: Rgb<u8> = Rgb([235, 235, 228]);
const INK: Rgb<u8> = Rgb([20, 20, 30]);

pub fn blank(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, BACKGROUND))
}

/// Paint dark modules at `origin` (top-left of the quiet zone)
fn paint(
    canvas: &mut RgbImage,
    origin: (u32, u32),
    module: u32,
    quiet: u32,
    dark: impl Iterator<Item = (u32, u32)>,
) {
    for (mx, my) in dark {
        let left = origin.0 + (mx + quiet) * module;
        let top = origin.1 + (my + quiet) * module;
        for y in top..top + module {
            for x in left..left + module {
                canvas.put_pixel(x, y, INK);
            }
        }
    }
}

/// A QR code with 4 px modules
pub fn with_qr(payload: &str, width: u32, height: u32, origin: (u32, u32)) -> DynamicImage {
    let code = qrcode::QrCode::new(payload.as_bytes()).expect("payload fits in a QR code");
    let size = code.width() as u32;
    let colors = code.to_colors();

    let dark = (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .filter(|&(x, y)| colors[(y * size + x) as usize] == qrcode::Color::Dark);

    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);
    paint(&mut canvas, origin, 4, 4, dark);
    DynamicImage::ImageRgb8(canvas)
}

/// A Data Matrix symbol with 5 px modules
pub fn with_data_matrix(payload: &str, width: u32, height: u32, origin: (u32, u32)) -> DynamicImage {
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);
    paint_data_matrix(&mut canvas, payload, origin);
    DynamicImage::ImageRgb8(canvas)
}

pub fn paint_data_matrix(canvas: &mut RgbImage, payload: &str, origin: (u32, u32)) {
    let bitmap = datamatrix::DataMatrix::encode(payload.as_bytes(), datamatrix::SymbolList::default())
        .expect("payload fits in a Data Matrix")
        .bitmap();
    let dark = bitmap.pixels().map(|(x, y)| (x as u32, y as u32));
    paint(canvas, origin, 5, 2, dark);
}
