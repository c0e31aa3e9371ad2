//! `DrawingSurface` over an RGBA image, rasterizing glyphs with fontdue.

use crate::font::{FaceId, FontBook};
use crate::params::FontSpec;
use crate::surface::DrawingSurface;
use crate::{Result, TextPortraitError};
use image::{Rgba, RgbaImage};
use log::warn;
use std::collections::{HashMap, HashSet};

/// Horizontal shift per pixel of height for synthetic oblique (about 11 degrees)
const OBLIQUE_SHEAR: f32 = 0.2;

/// Coverage mask of one glyph, positioned relative to the pen origin
struct GlyphMask {
    left: i32,
    /// Offset of the top row from the baseline, negative is above
    top: i32,
    width: usize,
    height: usize,
    coverage: Vec<u8>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct MaskKey {
    c: char,
    face: FaceId,
    size_px: u32,
    embolden: bool,
    oblique: bool,
}

pub struct RasterSurface<'a> {
    image: RgbaImage,
    fonts: &'a FontBook,
    masks: HashMap<MaskKey, GlyphMask>,
    reported: HashSet<FontSpec>,
}

impl<'a> RasterSurface<'a> {
    /// Transparent `width` × `height` surface drawing with `fonts`
    pub fn new(width: u32, height: u32, fonts: &'a FontBook) -> Result<Self> {
        if fonts.is_empty() {
            return Err(TextPortraitError::Font("no fonts loaded".to_string()));
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
            fonts,
            masks: HashMap::new(),
            reported: HashSet::new(),
        })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

fn glyph_mask<'m>(
    fonts: &FontBook,
    masks: &'m mut HashMap<MaskKey, GlyphMask>,
    reported: &mut HashSet<FontSpec>,
    c: char,
    spec: &FontSpec,
) -> Option<&'m GlyphMask> {
    let face = match fonts.resolve(spec) {
        Ok(face) => face,
        Err(e) => {
            if reported.insert(*spec) {
                warn!("{e}, skipping glyphs");
            }
            return None;
        }
    };
    if face.is_synthetic() && reported.insert(*spec) {
        warn!(
            "no exact face for {spec}, synthesizing{}{}",
            if face.embolden { " bold" } else { "" },
            if face.oblique { " oblique" } else { "" }
        );
    }
    let key = MaskKey {
        c,
        face: face.id,
        size_px: spec.size_px,
        embolden: face.embolden,
        oblique: face.oblique,
    };
    let mask = masks.entry(key).or_insert_with(|| {
        let (metrics, bitmap) = face.font.rasterize(c, spec.size_px as f32);
        let plain = GlyphMask {
            left: metrics.xmin,
            top: -(metrics.ymin + metrics.height as i32),
            width: metrics.width,
            height: metrics.height,
            coverage: bitmap,
        };
        let stroke = if face.embolden { (spec.size_px / 24).max(1) as usize } else { 0 };
        stylize(plain, stroke, face.oblique)
    });
    Some(mask)
}

/// Widen a mask by `stroke` pixels of overdraw and optionally shear it
fn stylize(mask: GlyphMask, stroke: usize, oblique: bool) -> GlyphMask {
    if stroke == 0 && !oblique {
        return mask;
    }
    let bottom = mask.height.saturating_sub(1);
    let shift = |row: usize| -> usize {
        if oblique {
            ((bottom - row) as f32 * OBLIQUE_SHEAR).round() as usize
        } else {
            0
        }
    };
    let max_shift = (0..mask.height).map(shift).max().unwrap_or(0);
    let width = mask.width + stroke + max_shift;
    let mut coverage = vec![0u8; width * mask.height];

    for row in 0..mask.height {
        let offset = shift(row);
        for col in 0..mask.width {
            let value = mask.coverage[row * mask.width + col];
            if value == 0 {
                continue;
            }
            for dx in 0..=stroke {
                let cell = &mut coverage[row * width + col + offset + dx];
                *cell = (*cell).max(value);
            }
        }
    }

    // rows below the baseline are sheared left so the baseline stays on the pen
    let below_baseline = (mask.top + bottom as i32).max(0);
    let baseline_shift = if oblique {
        (below_baseline as f32 * OBLIQUE_SHEAR).round() as i32
    } else {
        0
    };
    GlyphMask {
        left: mask.left - baseline_shift,
        top: mask.top,
        width,
        height: mask.height,
        coverage,
    }
}

/// Source-over composite of `src` scaled by `coverage` onto `dst`
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>, coverage: u8) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0 * coverage as f32 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let channel = |i: usize| {
        let mixed = src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa);
        (mixed / out_a).round().clamp(0.0, 255.0) as u8
    };
    Rgba([channel(0), channel(1), channel(2), (out_a * 255.0).round() as u8])
}

impl DrawingSurface for RasterSurface<'_> {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.image.get_pixel_checked(x, y).copied()
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if let Some(pixel) = self.image.get_pixel_mut_checked(x, y) {
            *pixel = color;
        }
    }

    fn draw_glyph(&mut self, c: char, x: f32, y: f32, color: Rgba<u8>, font: &FontSpec) {
        if color[3] == 0 {
            return;
        }
        let (img_w, img_h) = (self.image.width() as i64, self.image.height() as i64);
        let Some(mask) = glyph_mask(self.fonts, &mut self.masks, &mut self.reported, c, font) else {
            return;
        };
        let left = x.round() as i64 + mask.left as i64;
        let top = y.round() as i64 + mask.top as i64;
        if left >= img_w || top >= img_h || left + mask.width as i64 <= 0 || top + mask.height as i64 <= 0 {
            return;
        }

        let (width, height) = (mask.width, mask.height);
        for row in 0..height {
            let py = top + row as i64;
            if py < 0 || py >= img_h {
                continue;
            }
            for col in 0..width {
                let px = left + col as i64;
                let value = mask.coverage[row * width + col];
                if px < 0 || px >= img_w || value == 0 {
                    continue;
                }
                let pixel = self.image.get_pixel_mut(px as u32, py as u32);
                *pixel = blend_over(*pixel, color, value);
            }
        }
    }

    fn measure_glyph(&mut self, c: char, font: &FontSpec) -> f32 {
        match self.fonts.resolve(font) {
            Ok(face) => face.font.metrics(c, font.size_px as f32).advance_width,
            Err(e) => {
                if self.reported.insert(*font) {
                    warn!("{e}, measuring as zero width");
                }
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::test_support::system_font;
    use crate::font::FontVariant;
    use crate::params::FontFamily;

    fn spec(bold: bool, italic: bool) -> FontSpec {
        FontSpec { family: FontFamily::SansSerif, size_px: 32, bold, italic }
    }

    fn book(test: &str) -> Option<FontBook> {
        let bytes = system_font(test)?;
        let mut book = FontBook::new();
        book.insert(FontFamily::SansSerif, FontVariant::Regular, &bytes).ok()?;
        Some(book)
    }

    fn painted(surface: &RasterSurface) -> Vec<(u32, u32)> {
        surface
            .image()
            .enumerate_pixels()
            .filter(|(_, _, p)| p[3] > 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn blend_over_respects_coverage_and_alpha() {
        let black = Rgba([0, 0, 0, 255]);
        let white = Rgba([255, 255, 255, 255]);
        assert_eq!(blend_over(black, white, 255), white);
        assert_eq!(blend_over(black, white, 0), black);
        assert_eq!(blend_over(black, white, 128), Rgba([128, 128, 128, 255]));
        assert_eq!(blend_over(Rgba([0, 0, 0, 0]), Rgba([10, 20, 30, 255]), 255), Rgba([10, 20, 30, 255]));
        assert_eq!(blend_over(black, Rgba([255, 0, 0, 0]), 255), black);
    }

    #[test]
    fn stylize_widens_bold_and_shears_oblique() {
        let mask = || GlyphMask { left: 0, top: -2, width: 1, height: 2, coverage: vec![255, 255] };
        let bold = stylize(mask(), 1, false);
        assert_eq!(bold.width, 2);
        assert_eq!(bold.coverage, vec![255, 255, 255, 255]);

        let tall = GlyphMask { left: 0, top: -10, width: 1, height: 10, coverage: vec![255; 10] };
        let slanted = stylize(tall, 0, true);
        // top row is pushed right of the bottom row
        let first_lit = |row: usize| (0..slanted.width).find(|&c| slanted.coverage[row * slanted.width + c] > 0);
        assert!(first_lit(0) > first_lit(9));
        assert_eq!(first_lit(9), Some(0));
    }

    #[test]
    fn empty_book_is_rejected() {
        let book = FontBook::new();
        assert!(RasterSurface::new(4, 4, &book).is_err());
    }

    #[test_log::test]
    fn fill_and_pixel_access() {
        let Some(book) = book("fill_and_pixel_access") else { return };
        let mut surface = RasterSurface::new(3, 2, &book).unwrap();
        surface.fill(Rgba([1, 2, 3, 255]));
        assert_eq!(surface.get_pixel(2, 1), Some(Rgba([1, 2, 3, 255])));
        assert_eq!(surface.get_pixel(3, 0), None);
        surface.set_pixel(0, 0, Rgba([9, 9, 9, 9]));
        surface.set_pixel(10, 10, Rgba([9, 9, 9, 9]));
        assert_eq!(surface.get_pixel(0, 0), Some(Rgba([9, 9, 9, 9])));
    }

    #[test_log::test]
    fn glyph_sits_above_baseline_in_its_color() {
        let Some(book) = book("glyph_sits_above_baseline_in_its_color") else { return };
        let mut surface = RasterSurface::new(64, 64, &book).unwrap();
        let red = Rgba([220, 0, 0, 255]);
        surface.draw_glyph('H', 10.0, 40.0, red, &spec(false, false));

        let lit = painted(&surface);
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(_, y)| y < 40));
        assert!(lit.iter().all(|&(x, _)| x >= 10));
        let solid = surface.image().pixels().filter(|p| p[3] == 255).count();
        assert!(solid > 0);
        assert!(surface.image().pixels().filter(|p| p[3] == 255).all(|p| *p == red));
    }

    #[test_log::test]
    fn glyphs_are_clipped_at_edges() {
        let Some(book) = book("glyphs_are_clipped_at_edges") else { return };
        let mut surface = RasterSurface::new(16, 16, &book).unwrap();
        surface.draw_glyph('W', -8.0, 8.0, Rgba([0, 0, 255, 255]), &spec(false, false));
        surface.draw_glyph('W', 12.0, 40.0, Rgba([0, 0, 255, 255]), &spec(false, false));
        assert!(!painted(&surface).is_empty());
    }

    #[test_log::test]
    fn transparent_color_draws_nothing() {
        let Some(book) = book("transparent_color_draws_nothing") else { return };
        let mut surface = RasterSurface::new(32, 32, &book).unwrap();
        surface.draw_glyph('M', 0.0, 28.0, Rgba([255, 255, 255, 0]), &spec(false, false));
        assert!(painted(&surface).is_empty());
    }

    #[test_log::test]
    fn synthetic_bold_covers_more_pixels() {
        let Some(book) = book("synthetic_bold_covers_more_pixels") else { return };
        let mut regular = RasterSurface::new(64, 64, &book).unwrap();
        let mut bold = RasterSurface::new(64, 64, &book).unwrap();
        regular.draw_glyph('l', 10.0, 40.0, Rgba([0, 0, 0, 255]), &spec(false, false));
        bold.draw_glyph('l', 10.0, 40.0, Rgba([0, 0, 0, 255]), &spec(true, false));
        assert!(painted(&bold).len() > painted(&regular).len());
    }

    #[test_log::test]
    fn measure_uses_advance_width() {
        let Some(book) = book("measure_uses_advance_width") else { return };
        let mut surface = RasterSurface::new(8, 8, &book).unwrap();
        let narrow = surface.measure_glyph('i', &spec(false, false));
        let wide = surface.measure_glyph('W', &spec(false, false));
        assert!(narrow > 0.0);
        assert!(wide > narrow);
        assert!(surface.measure_glyph(' ', &spec(false, false)) > 0.0);
    }

    #[test_log::test]
    fn missing_family_measures_zero() {
        let Some(book) = book("missing_family_measures_zero") else { return };
        let mut surface = RasterSurface::new(8, 8, &book).unwrap();
        let roboto = FontSpec { family: FontFamily::Roboto, size_px: 12, bold: false, italic: false };
        assert_eq!(surface.measure_glyph('a', &roboto), 0.0);
    }
}
