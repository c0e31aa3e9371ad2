//! Portrait settings from a JSON file, layered under command line flags.
//!
//! Every field is optional. Unset fields fall back to the defaults of
//! [`RenderParameters`], and an unset output size falls back to the source
//! image's own size.

use crate::params::{parse_background, FontFamily, OutputSize, RenderParameters};
use crate::{Result, TextPortraitError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortraitConfig {
    pub phrase: Option<String>,
    pub font: Option<FontFamily>,
    pub font_size_px: Option<u32>,
    pub letter_spacing_px: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub remove_spaces: Option<bool>,
    /// `#rgb`, `#rrggbb`, `#rrggbbaa`, or empty for a transparent background
    pub background: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Directory scanned for `<Family>-<Variant>.ttf` files
    pub font_dir: Option<PathBuf>,
    /// Face used for any family not found in `font_dir`
    pub font_file: Option<PathBuf>,
}

impl PortraitConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
            .map_err(|e| TextPortraitError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| TextPortraitError::Config(e.to_string()))
    }

    /// Layer `top` over `self`; fields set in `top` win.
    pub fn merge(self, top: PortraitConfig) -> Self {
        Self {
            phrase: top.phrase.or(self.phrase),
            font: top.font.or(self.font),
            font_size_px: top.font_size_px.or(self.font_size_px),
            letter_spacing_px: top.letter_spacing_px.or(self.letter_spacing_px),
            bold: top.bold.or(self.bold),
            italic: top.italic.or(self.italic),
            remove_spaces: top.remove_spaces.or(self.remove_spaces),
            background: top.background.or(self.background),
            width: top.width.or(self.width),
            height: top.height.or(self.height),
            font_dir: top.font_dir.or(self.font_dir),
            font_file: top.font_file.or(self.font_file),
        }
    }

    /// Output size for a source image. A lone width or height keeps the
    /// source's aspect ratio; both are taken as given.
    pub fn output_size(&self, source_width: u32, source_height: u32) -> OutputSize {
        let size = OutputSize::from_source(source_width, source_height);
        match (self.width, self.height) {
            (Some(width), Some(height)) => size.with_exact(width, height),
            (Some(width), None) => size.with_width(width),
            (None, Some(height)) => size.with_height(height),
            (None, None) => size,
        }
    }

    pub fn to_parameters(&self, source_width: u32, source_height: u32) -> Result<RenderParameters> {
        let defaults = RenderParameters::default();
        let background = match &self.background {
            Some(raw) => parse_background(raw)?,
            None => defaults.background,
        };
        let params = RenderParameters {
            phrase: self.phrase.clone().unwrap_or(defaults.phrase),
            font: self.font.unwrap_or(defaults.font),
            font_size_px: self.font_size_px.unwrap_or(defaults.font_size_px),
            letter_spacing_px: self.letter_spacing_px.unwrap_or(defaults.letter_spacing_px),
            bold: self.bold.unwrap_or(defaults.bold),
            italic: self.italic.unwrap_or(defaults.italic),
            remove_spaces: self.remove_spaces.unwrap_or(defaults.remove_spaces),
            background,
            ..defaults
        };
        Ok(params.with_size(self.output_size(source_width, source_height)))
    }
}
