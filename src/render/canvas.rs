//! Single-channel drawing surface.
//!
//! Every layout stage produces a [`Canvas`]: an 8-bit grayscale bitmap where
//! 0 is black and 255 is white (paper). Canvases are composed by pasting one
//! onto another; pastes are clipped to the destination bounds, so content can
//! never spill outside its container.

use std::path::Path;

use image::{GrayImage, Luma, imageops};

use crate::error::PrintError;

/// Paper colour.
pub const WHITE: u8 = 255;

/// Ink colour.
pub const BLACK: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    image: GrayImage,
}

impl Canvas {
    /// Allocate a white canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, WHITE)
    }

    /// Allocate a canvas filled with `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            image: GrayImage::from_pixel(width, height, Luma([value])),
        }
    }

    pub fn from_image(image: GrayImage) -> Self {
        Self { image }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Intensity at (x, y). Out-of-bounds reads return white.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.image
            .get_pixel_checked(x, y)
            .map(|p| p[0])
            .unwrap_or(WHITE)
    }

    /// Set the intensity at (x, y). Out-of-bounds writes are ignored.
    pub fn put(&mut self, x: i64, y: i64, value: u8) {
        if let Some(p) = self.pixel_mut(x, y) {
            p[0] = value;
        }
    }

    /// Darken (x, y) towards black, keeping the darker of the two values.
    ///
    /// Glyph rasterizers call this so overlapping anti-aliased edges never
    /// lighten ink that is already on the canvas.
    pub fn darken(&mut self, x: i64, y: i64, value: u8) {
        if let Some(p) = self.pixel_mut(x, y) {
            p[0] = p[0].min(value);
        }
    }

    /// Fill the whole canvas with `value`.
    pub fn fill(&mut self, value: u8) {
        for p in self.image.pixels_mut() {
            p[0] = value;
        }
    }

    /// Paste `other` with its top-left corner at (x, y), replacing pixels.
    pub fn paste(&mut self, other: &Canvas, x: i64, y: i64) {
        imageops::replace(&mut self.image, &other.image, x, y);
    }

    /// Row-major intensity bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    /// Write the canvas as a PNG file (preview output).
    pub fn save_png(&self, path: &Path) -> Result<(), PrintError> {
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| PrintError::Image(format!("Failed to save PNG: {}", e)))
    }

    fn pixel_mut(&mut self, x: i64, y: i64) -> Option<&mut Luma<u8>> {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return None;
        }
        Some(self.image.get_pixel_mut(x as u32, y as u32))
    }
}
