use textportrait::font::test_support::system_font;
use textportrait::{FontBook, FontFamily, FontVariant};

/// A book with the system font as Roboto regular, or None to skip `test`
pub fn roboto_book(test: &str) -> Option<FontBook> {
    let bytes = system_font(test)?;
    let mut book = FontBook::new();
    book.insert(FontFamily::Roboto, FontVariant::Regular, &bytes).ok()?;
    Some(book)
}
