//! Render parameters, font selection and output sizing.

use crate::{Result, TextPortraitError};
use image::Rgba;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest accepted output edge in pixels
pub const MAX_DIMENSION: u32 = 16_384;

/// Largest accepted font size in pixels
pub const MAX_FONT_SIZE: u32 = 2_048;

/// Line advance is `font_size_px - LINE_TIGHTENING`
pub const LINE_TIGHTENING: u32 = 2;

/// Font families offered by the portrait form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(clap::ValueEnum))]
pub enum FontFamily {
    #[default]
    #[serde(rename = "Roboto", alias = "roboto")]
    Roboto,
    #[serde(rename = "serif")]
    Serif,
    #[serde(rename = "sans-serif")]
    SansSerif,
    #[serde(rename = "Bebas Neue", alias = "bebas-neue")]
    BebasNeue,
    #[serde(rename = "Bubblegum Sans", alias = "bubblegum-sans")]
    BubblegumSans,
    #[serde(rename = "M PLUS Rounded 1c", alias = "m-plus-rounded-1c")]
    #[cfg_attr(not(target_arch = "wasm32"), value(name = "m-plus-rounded-1c"))]
    MPlusRounded1c,
    #[serde(rename = "Open Sans", alias = "open-sans")]
    OpenSans,
}

impl FontFamily {
    pub const ALL: [FontFamily; 7] = [
        FontFamily::Roboto,
        FontFamily::Serif,
        FontFamily::SansSerif,
        FontFamily::BebasNeue,
        FontFamily::BubblegumSans,
        FontFamily::MPlusRounded1c,
        FontFamily::OpenSans,
    ];

    /// Name as it appears in a CSS font shorthand
    pub fn css_name(self) -> &'static str {
        match self {
            FontFamily::Roboto => "Roboto",
            FontFamily::Serif => "serif",
            FontFamily::SansSerif => "sans-serif",
            FontFamily::BebasNeue => "Bebas Neue",
            FontFamily::BubblegumSans => "Bubblegum Sans",
            FontFamily::MPlusRounded1c => "M PLUS Rounded 1c",
            FontFamily::OpenSans => "Open Sans",
        }
    }

    /// File name prefix used when looking up font files on disk.
    /// The generic families map to DejaVu, which most systems carry.
    pub fn file_stem(self) -> &'static str {
        match self {
            FontFamily::Roboto => "Roboto",
            FontFamily::Serif => "DejaVuSerif",
            FontFamily::SansSerif => "DejaVuSans",
            FontFamily::BebasNeue => "BebasNeue",
            FontFamily::BubblegumSans => "BubblegumSans",
            FontFamily::MPlusRounded1c => "MPLUSRounded1c",
            FontFamily::OpenSans => "OpenSans",
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

/// Font selection for one glyph. Displays as a CSS font shorthand,
/// e.g. `bold italic 12px Roboto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size_px: u32,
    pub bold: bool,
    pub italic: bool,
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bold {
            f.write_str("bold ")?;
        }
        if self.italic {
            f.write_str("italic ")?;
        }
        write!(f, "{}px {}", self.size_px, self.family)
    }
}

/// An sRGB color with alpha, written as `#rgb`, `#rrggbb` or `#rrggbbaa`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub Rgba<u8>);

impl Color {
    pub const BLACK: Color = Color(Rgba([0, 0, 0, 255]));

    pub fn rgba(self) -> Rgba<u8> {
        self.0
    }
}

impl FromStr for Color {
    type Err = TextPortraitError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TextPortraitError::Config(format!("invalid color '{s}'"));
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        let channels = match hex.len() {
            3 => [nibble(0), nibble(1), nibble(2), Ok(255)],
            6 => [byte(0), byte(2), byte(4), Ok(255)],
            8 => [byte(0), byte(2), byte(4), byte(6)],
            _ => return Err(invalid()),
        };
        let mut out = [0u8; 4];
        for (dst, src) in out.iter_mut().zip(channels) {
            *dst = src.map_err(|_| invalid())?;
        }
        Ok(Color(Rgba(out)))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0 .0;
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// Parse a background setting. Empty or `none` means no fill.
pub fn parse_background(s: &str) -> Result<Option<Color>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

fn deserialize_background<'de, D>(deserializer: D) -> std::result::Result<Option<Color>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(s) => parse_background(&s).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn serialize_background<S>(color: &Option<Color>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match color {
        Some(c) => serializer.serialize_str(&c.to_string()),
        None => serializer.serialize_str(""),
    }
}

/// Everything one render pass needs besides the source image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParameters {
    pub phrase: String,
    pub font: FontFamily,
    pub font_size_px: u32,
    pub letter_spacing_px: f32,
    pub bold: bool,
    pub italic: bool,
    pub remove_spaces: bool,
    #[serde(
        deserialize_with = "deserialize_background",
        serialize_with = "serialize_background"
    )]
    pub background: Option<Color>,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            phrase: "Test Phrase!".to_string(),
            font: FontFamily::Roboto,
            font_size_px: 12,
            letter_spacing_px: 0.0,
            bold: false,
            italic: false,
            remove_spaces: false,
            background: Some(Color::BLACK),
            width: 0,
            height: 0,
        }
    }
}

impl RenderParameters {
    pub fn with_size(mut self, size: OutputSize) -> Self {
        self.width = size.width;
        self.height = size.height;
        self
    }

    pub fn font_spec(&self) -> FontSpec {
        FontSpec {
            family: self.font,
            size_px: self.font_size_px,
            bold: self.bold,
            italic: self.italic,
        }
    }

    /// Vertical distance between consecutive lines of glyphs
    pub fn line_advance(&self) -> u32 {
        self.font_size_px.saturating_sub(LINE_TIGHTENING)
    }

    /// Reject parameters that would produce an empty surface or never finish.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(TextPortraitError::Validation(msg));
        if self.width == 0 || self.height == 0 {
            return fail(format!(
                "output size {}x{} has no area",
                self.width, self.height
            ));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return fail(format!(
                "output size {}x{} exceeds {MAX_DIMENSION}px",
                self.width, self.height
            ));
        }
        if self.font_size_px <= LINE_TIGHTENING {
            return fail(format!(
                "font size {}px must be larger than {LINE_TIGHTENING}px",
                self.font_size_px
            ));
        }
        if self.font_size_px > MAX_FONT_SIZE {
            return fail(format!(
                "font size {}px exceeds {MAX_FONT_SIZE}px",
                self.font_size_px
            ));
        }
        if !self.letter_spacing_px.is_finite() {
            return fail("letter spacing must be a finite number".to_string());
        }
        Ok(())
    }
}

/// Output dimensions tied to the aspect ratio of the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSize {
    aspect: f64,
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    /// Start at the source's own size
    pub fn from_source(width: u32, height: u32) -> Self {
        let aspect = if height == 0 {
            1.0
        } else {
            width as f64 / height as f64
        };
        Self { aspect, width, height }
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Set the width and derive the height from the aspect ratio
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self.height = ((width as f64 / self.aspect).round() as u32).max(1);
        self
    }

    /// Set both edges, ignoring the aspect ratio
    pub fn with_exact(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the height and derive the width from the aspect ratio
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self.width = ((height as f64 * self.aspect).round() as u32).max(1);
        self
    }
}
