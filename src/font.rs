//! Font faces for each family, with synthetic bold and oblique when a
//! styled face is missing.

use crate::params::{FontFamily, FontSpec};
use crate::{Result, TextPortraitError};
use fontdue::{Font, FontSettings};
use log::debug;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontVariant {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontVariant {
    pub const ALL: [FontVariant; 4] = [
        FontVariant::Regular,
        FontVariant::Bold,
        FontVariant::Italic,
        FontVariant::BoldItalic,
    ];

    pub fn of(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontVariant::Regular,
            (true, false) => FontVariant::Bold,
            (false, true) => FontVariant::Italic,
            (true, true) => FontVariant::BoldItalic,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontVariant::Bold | FontVariant::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontVariant::Italic | FontVariant::BoldItalic)
    }

    /// File name suffixes after `<stem>-`
    fn suffixes(self) -> &'static [&'static str] {
        match self {
            FontVariant::Regular => &["Regular", "Book"],
            FontVariant::Bold => &["Bold"],
            FontVariant::Italic => &["Italic", "Oblique"],
            FontVariant::BoldItalic => &["BoldItalic", "BoldOblique"],
        }
    }

    /// Faces that can stand in for this one, best first
    fn fallbacks(self) -> &'static [FontVariant] {
        match self {
            FontVariant::Regular => &[FontVariant::Regular],
            FontVariant::Bold => &[FontVariant::Bold, FontVariant::Regular],
            FontVariant::Italic => &[FontVariant::Italic, FontVariant::Regular],
            FontVariant::BoldItalic => &[
                FontVariant::BoldItalic,
                FontVariant::Italic,
                FontVariant::Bold,
                FontVariant::Regular,
            ],
        }
    }
}

/// Identifies a loaded face, used as a glyph cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceId {
    Family(FontFamily, FontVariant),
    Fallback,
}

/// A face chosen for a `FontSpec`, plus the styling it lacks
pub struct ResolvedFace<'a> {
    pub font: &'a Font,
    pub id: FaceId,
    pub embolden: bool,
    pub oblique: bool,
}

impl ResolvedFace<'_> {
    pub fn is_synthetic(&self) -> bool {
        self.embolden || self.oblique
    }
}

#[derive(Default)]
pub struct FontBook {
    faces: HashMap<(FontFamily, FontVariant), Font>,
    fallback: Option<Font>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.fallback.is_none()
    }

    pub fn has_face(&self, family: FontFamily, variant: FontVariant) -> bool {
        self.faces.contains_key(&(family, variant))
    }

    pub fn insert(&mut self, family: FontFamily, variant: FontVariant, bytes: &[u8]) -> Result<()> {
        let font = parse_font(bytes)?;
        self.faces.insert((family, variant), font);
        Ok(())
    }

    /// Face used for families that have nothing loaded
    pub fn set_fallback(&mut self, bytes: &[u8]) -> Result<()> {
        self.fallback = Some(parse_font(bytes)?);
        Ok(())
    }

    pub fn load_fallback_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = std::fs::read(path.as_ref())?;
        self.set_fallback(&bytes)
    }

    /// Load every `<Stem>-<Variant>.ttf` / `.otf` in `dir` that belongs to a
    /// known family. A bare `<Stem>.ttf` is taken as the regular face.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
            if !is_font {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some((family, variant)) = match_file_stem(stem) {
                if self.has_face(family, variant) {
                    continue;
                }
                let bytes = std::fs::read(&path)?;
                self.insert(family, variant, &bytes)?;
                debug!("loaded {} {:?} from {}", family, variant, path.display());
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Pick the closest face for `spec`, synthesizing the missing weight or slant
    pub fn resolve(&self, spec: &FontSpec) -> Result<ResolvedFace<'_>> {
        let want = FontVariant::of(spec.bold, spec.italic);
        let styled = |font, id, have: FontVariant| ResolvedFace {
            font,
            id,
            embolden: want.is_bold() && !have.is_bold(),
            oblique: want.is_italic() && !have.is_italic(),
        };

        for &variant in want.fallbacks() {
            if let Some(font) = self.faces.get(&(spec.family, variant)) {
                return Ok(styled(font, FaceId::Family(spec.family, variant), variant));
            }
        }
        if let Some(font) = &self.fallback {
            return Ok(styled(font, FaceId::Fallback, FontVariant::Regular));
        }
        Err(TextPortraitError::Font(format!("no font loaded for {spec}")))
    }
}

fn parse_font(bytes: &[u8]) -> Result<Font> {
    Font::from_bytes(bytes, FontSettings::default()).map_err(|e| TextPortraitError::Font(e.to_string()))
}

/// Map a font file name (without extension) to the family and variant it holds
pub fn match_file_stem(stem: &str) -> Option<(FontFamily, FontVariant)> {
    for family in FontFamily::ALL {
        if stem == family.file_stem() {
            return Some((family, FontVariant::Regular));
        }
        let Some(suffix) = stem
            .strip_prefix(family.file_stem())
            .and_then(|rest| rest.strip_prefix('-'))
        else {
            continue;
        };
        for variant in FontVariant::ALL {
            if variant.suffixes().contains(&suffix) {
                return Some((family, variant));
            }
        }
    }
    None
}

/// Locating an installed font for tests that need real glyphs
#[doc(hidden)]
pub mod test_support {
    const CANDIDATES: [&str; 6] = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial Unicode.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    /// Bytes of some installed TrueType font. Logs a warning naming the
    /// caller when none is installed so skipped tests show up in the output.
    pub fn system_font(test: &str) -> Option<Vec<u8>> {
        let found = CANDIDATES.iter().find_map(|p| std::fs::read(p).ok());
        if found.is_none() {
            log::warn!("{test}: skipped, no system font in {CANDIDATES:?}");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(family: FontFamily, bold: bool, italic: bool) -> FontSpec {
        FontSpec { family, size_px: 12, bold, italic }
    }

    #[test]
    fn file_stems_map_to_families() {
        assert_eq!(match_file_stem("Roboto-Bold"), Some((FontFamily::Roboto, FontVariant::Bold)));
        assert_eq!(match_file_stem("Roboto-Regular"), Some((FontFamily::Roboto, FontVariant::Regular)));
        assert_eq!(match_file_stem("DejaVuSans"), Some((FontFamily::SansSerif, FontVariant::Regular)));
        assert_eq!(
            match_file_stem("DejaVuSerif-BoldItalic"),
            Some((FontFamily::Serif, FontVariant::BoldItalic))
        );
        assert_eq!(
            match_file_stem("DejaVuSans-Oblique"),
            Some((FontFamily::SansSerif, FontVariant::Italic))
        );
        assert_eq!(match_file_stem("DejaVuSansMono"), None);
        assert_eq!(match_file_stem("OpenSans-Light"), None);
    }

    #[test]
    fn variant_from_flags() {
        assert_eq!(FontVariant::of(true, true), FontVariant::BoldItalic);
        assert!(FontVariant::of(true, false).is_bold());
        assert!(!FontVariant::of(true, false).is_italic());
    }

    #[test]
    fn empty_book_cannot_resolve() {
        let book = FontBook::new();
        assert!(book.is_empty());
        let err = book.resolve(&spec(FontFamily::Roboto, false, false)).err();
        assert!(matches!(err, Some(TextPortraitError::Font(_))));
    }

    #[test]
    fn garbage_bytes_are_a_font_error() {
        let mut book = FontBook::new();
        assert!(matches!(
            book.insert(FontFamily::Roboto, FontVariant::Regular, b"not a font"),
            Err(TextPortraitError::Font(_))
        ));
    }

    #[test_log::test]
    fn resolve_prefers_exact_face_then_synthesizes() {
        let Some(bytes) = test_support::system_font("resolve_prefers_exact_face_then_synthesizes") else {
            return;
        };
        let mut book = FontBook::new();
        book.insert(FontFamily::Roboto, FontVariant::Regular, &bytes).unwrap();
        book.insert(FontFamily::Roboto, FontVariant::Italic, &bytes).unwrap();

        let plain = book.resolve(&spec(FontFamily::Roboto, false, false)).unwrap();
        assert_eq!(plain.id, FaceId::Family(FontFamily::Roboto, FontVariant::Regular));
        assert!(!plain.is_synthetic());

        let bold_italic = book.resolve(&spec(FontFamily::Roboto, true, true)).unwrap();
        assert_eq!(bold_italic.id, FaceId::Family(FontFamily::Roboto, FontVariant::Italic));
        assert!(bold_italic.embolden);
        assert!(!bold_italic.oblique);

        assert!(book.resolve(&spec(FontFamily::OpenSans, false, false)).is_err());
        book.set_fallback(&bytes).unwrap();
        let fallback = book.resolve(&spec(FontFamily::OpenSans, false, true)).unwrap();
        assert_eq!(fallback.id, FaceId::Fallback);
        assert!(fallback.oblique);
    }
}
