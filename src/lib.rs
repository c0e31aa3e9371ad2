//! Render images as text portraits: a repeated phrase whose glyphs take
//! their color from the pixel they cover.

pub mod config;
pub mod export;
pub mod font;
pub mod params;
pub mod raster;
pub mod render;
pub mod source;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use font::{FontBook, FontVariant};
pub use params::{Color, FontFamily, FontSpec, OutputSize, RenderParameters};
pub use raster::RasterSurface;
pub use render::render;
pub use source::SourceBitmap;
pub use surface::DrawingSurface;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextPortraitError {
    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TextPortraitError>;

/// Renders decoded images into text portraits with a fixed set of fonts
pub struct Portrait {
    fonts: FontBook,
}

impl Portrait {
    pub fn new(fonts: FontBook) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Scale `image` to the output size and paint the phrase over it.
    pub fn render_image(
        &self,
        image: &image::DynamicImage,
        params: &RenderParameters,
        on_progress: impl FnMut(f32),
    ) -> Result<image::RgbaImage> {
        params.validate()?;
        self.fonts.resolve(&params.font_spec())?;
        let source = SourceBitmap::fit_to(image, params.width, params.height);
        let surface = RasterSurface::new(params.width, params.height, &self.fonts)?;
        let surface = render(&source, params, surface, on_progress)?;
        Ok(surface.into_image())
    }
}
