//! PNG export of finished portraits.

use crate::Result;
use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// `text-portrait-<unix millis>.png`, unique per millisecond
pub fn download_file_name(at: DateTime<Utc>) -> String {
    format!("text-portrait-{}.png", at.timestamp_millis())
}

pub fn write_png(image: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, encode_png(image)?)?;
    Ok(())
}

/// Write `image` into `dir` under a timestamped name and return the path
pub fn save_png(image: &RgbaImage, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(download_file_name(Utc::now()));
    write_png(image, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::Rgba;

    #[test]
    fn file_name_embeds_timestamp() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(download_file_name(at), "text-portrait-1700000000123.png");
    }

    #[test]
    fn encoded_png_decodes_to_same_pixels() {
        let img = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8 * 80, y as u8 * 100, 7, 200]));
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }
}
