//! The glyph mosaic fill: walk the output left to right, top to bottom,
//! painting the phrase over and over in the colors of the source image.

use crate::params::{FontSpec, RenderParameters};
use crate::source::SourceBitmap;
use crate::surface::DrawingSurface;
use crate::{Result, TextPortraitError};
use log::{debug, info};

/// Smallest net advance one phrase repetition may make, in pixels
pub const MIN_PASS_ADVANCE: f64 = 1.0 / 64.0;

/// Paint `params.phrase` onto `surface`, coloring each glyph with the source
/// pixel under its pen position.
///
/// `on_progress` receives an advisory percentage: the vertical cursor
/// position at the start of every phrase repetition, then 100 when done.
/// An empty phrase leaves the surface untouched.
pub fn render<S: DrawingSurface>(
    source: &SourceBitmap,
    params: &RenderParameters,
    mut surface: S,
    mut on_progress: impl FnMut(f32),
) -> Result<S> {
    params.validate()?;
    if (surface.width(), surface.height()) != (params.width, params.height) {
        return Err(TextPortraitError::Validation(format!(
            "surface is {}x{} but output is {}x{}",
            surface.width(),
            surface.height(),
            params.width,
            params.height
        )));
    }
    if params.phrase.is_empty() {
        return Ok(surface);
    }

    if let Some(background) = params.background {
        surface.fill(background.rgba());
    }

    let font = params.font_spec();
    let glyphs: Vec<char> = params
        .phrase
        .chars()
        .filter(|&c| !(params.remove_spaces && c == ' '))
        .collect();

    on_progress(0.0);
    if glyphs.is_empty() {
        debug!("phrase has no visible characters, nothing to draw");
        on_progress(100.0);
        return Ok(surface);
    }

    let spacing = params.letter_spacing_px as f64;
    let repeat_gap = if params.remove_spaces {
        0.0
    } else {
        surface.measure_glyph(' ', &font) as f64 - 1.0
    };
    let per_pass = pass_advance(&mut surface, &glyphs, spacing, &font) + repeat_gap;
    if per_pass < MIN_PASS_ADVANCE {
        return Err(stalled(per_pass, params));
    }

    info!(
        "rendering {}x{} portrait with {} ({} glyphs per repetition)",
        params.width,
        params.height,
        font,
        glyphs.len()
    );

    let width = params.width as f64;
    let line_advance = params.line_advance();
    let mut x = 0.0f64;
    let mut y = 0u32;
    let mut drawn = 0usize;

    while y < params.height {
        let percent = y as f32 / params.height as f32 * 100.0;
        debug!("pass at row {y} ({percent:.1}%)");
        on_progress(percent);

        let (start_x, start_y) = (x, y);
        for &c in &glyphs {
            let color = source.sample(x.floor() as i64, y as i64);
            surface.draw_glyph(c, x as f32, y as f32, color, &font);
            drawn += 1;

            x += surface.measure_glyph(c, &font) as f64 + spacing;
            if x >= width {
                x = 0.0;
                y += line_advance;
            }
        }
        x += repeat_gap;

        // each pass must wrap or move right, or the line never fills
        if y == start_y && x <= start_x {
            return Err(stalled(x - start_x, params));
        }
    }

    info!("drew {drawn} glyphs");
    on_progress(100.0);
    Ok(surface)
}

fn pass_advance<S: DrawingSurface>(surface: &mut S, glyphs: &[char], spacing: f64, font: &FontSpec) -> f64 {
    glyphs
        .iter()
        .map(|&c| surface.measure_glyph(c, font) as f64 + spacing)
        .sum()
}

fn stalled(advance: f64, params: &RenderParameters) -> TextPortraitError {
    TextPortraitError::Validation(format!(
        "phrase advances {advance:.2e}px per repetition with {}px letter spacing, so lines never fill",
        params.letter_spacing_px
    ))
}
