//! Drawing surface abstraction the renderer paints through.

use crate::params::FontSpec;
use image::Rgba;

/// A pixel grid that can draw and measure text.
///
/// Glyph positions are pen origins on the alphabetic baseline, the same
/// convention a 2D canvas uses for `fillText`.
pub trait DrawingSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Replace every pixel with `color`
    fn fill(&mut self, color: Rgba<u8>);

    fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>>;
    fn set_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>);

    fn draw_glyph(&mut self, c: char, x: f32, y: f32, color: Rgba<u8>, font: &FontSpec);

    /// Horizontal advance of `c` in pixels
    fn measure_glyph(&mut self, c: char, font: &FontSpec) -> f32;
}
