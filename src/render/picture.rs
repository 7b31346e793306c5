//! Picture loading and resizing.
//!
//! Pictures are kept as 8-bit grayscale. Transparent pixels are composited
//! onto white paper when the picture is decoded.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};

use crate::error::PrintError;

/// Read and decode an image file.
pub fn load(path: &Path) -> Result<GrayImage, PrintError> {
    let image = image::open(path)
        .map_err(|e| PrintError::Image(format!("Failed to open {}: {}", path.display(), e)))?;
    Ok(flatten(image))
}

/// Decode an in-memory image (PNG, JPEG, GIF, ...).
pub fn decode(bytes: &[u8]) -> Result<GrayImage, PrintError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| PrintError::Image(format!("Failed to decode image: {}", e)))?;
    Ok(flatten(image))
}

fn flatten(image: DynamicImage) -> GrayImage {
    if !image.color().has_alpha() {
        return image.to_luma8();
    }
    let gray_alpha = image.to_luma_alpha8();
    GrayImage::from_fn(gray_alpha.width(), gray_alpha.height(), |x, y| {
        let [l, a] = gray_alpha.get_pixel(x, y).0;
        let (l, a) = (l as u32, a as u32);
        Luma([((l * a + 255 * (255 - a)) / 255) as u8])
    })
}

/// Scale a picture down to `max_width`, keeping its aspect ratio.
///
/// Pictures already narrow enough are returned unchanged; pictures are never
/// scaled up.
pub fn fit_width(picture: &GrayImage, max_width: u32) -> GrayImage {
    let (width, height) = picture.dimensions();
    if width <= max_width || max_width == 0 || width == 0 {
        return picture.clone();
    }
    let scaled_height = ((height as u64 * max_width as u64 + width as u64 / 2) / width as u64)
        .max(1) as u32;
    imageops::resize(picture, max_width, scaled_height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, LumaA};
    use std::io::Cursor;

    #[test]
    fn fit_width_keeps_aspect_ratio() {
        let picture = GrayImage::from_pixel(800, 400, Luma([0]));
        let fitted = fit_width(&picture, 384);
        assert_eq!(fitted.dimensions(), (384, 192));
    }

    #[test]
    fn fit_width_never_upscales() {
        let picture = GrayImage::from_pixel(100, 50, Luma([0]));
        assert_eq!(fit_width(&picture, 384).dimensions(), (100, 50));
    }

    #[test]
    fn decode_flattens_transparency_onto_white() {
        let mut source = image::GrayAlphaImage::new(2, 1);
        source.put_pixel(0, 0, LumaA([0, 0]));
        source.put_pixel(1, 0, LumaA([0, 255]));
        let mut png = Vec::new();
        DynamicImage::ImageLumaA8(source)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let decoded = decode(&png).unwrap();
        assert_eq!(decoded.get_pixel(0, 0)[0], 255);
        assert_eq!(decoded.get_pixel(1, 0)[0], 0);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode(b"not an image"), Err(PrintError::Image(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load(Path::new("/nonexistent/logo.png")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/logo.png"));
    }
}
