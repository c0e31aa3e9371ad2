//! Source image sampling.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Decoded RGBA pixels the portrait takes its colors from
#[derive(Debug, Clone)]
pub struct SourceBitmap {
    image: RgbaImage,
}

impl SourceBitmap {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Scale `image` to the output size so that sample coordinates line up
    /// with drawing coordinates.
    pub fn fit_to(image: &DynamicImage, width: u32, height: u32) -> Self {
        let rgba = image.to_rgba8();
        if rgba.dimensions() == (width, height) {
            return Self::new(rgba);
        }
        Self::new(imageops::resize(&rgba, width, height, FilterType::Triangle))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color at `(x, y)`, or transparent outside the bitmap
    pub fn sample(&self, x: i64, y: i64) -> Rgba<u8> {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return TRANSPARENT;
        }
        *self.image.get_pixel(x as u32, y as u32)
    }
}
