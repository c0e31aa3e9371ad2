//! textportrait CLI - Paint an image with a repeated phrase

use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use textportrait::config::PortraitConfig;
use textportrait::{export, FontBook, FontFamily, Portrait, TextPortraitError};

#[derive(Parser)]
#[command(name = "textportrait", about = "Render an image as a text portrait")]
struct Args {
    /// Input image file
    input: PathBuf,
    /// Phrase repeated across the portrait
    #[arg(short, long)]
    phrase: Option<String>,
    /// Font family
    #[arg(short, long, value_enum)]
    font: Option<FontFamily>,
    /// Font size in pixels (3 to 2048)
    #[arg(short = 's', long)]
    font_size: Option<u32>,
    /// Extra pixels between letters, may be negative
    #[arg(short, long, allow_hyphen_values = true)]
    letter_spacing: Option<f32>,
    /// Use bold text
    #[arg(short, long)]
    bold: bool,
    /// Use italic text
    #[arg(short, long)]
    italic: bool,
    /// Skip space characters in the phrase
    #[arg(short, long)]
    remove_spaces: bool,
    /// Background color as #rrggbb, or "none" for transparent
    #[arg(long)]
    background: Option<String>,
    /// Output width in pixels (height follows the aspect ratio unless given)
    #[arg(short, long)]
    width: Option<u32>,
    /// Output height in pixels (width follows the aspect ratio unless given)
    #[arg(short = 'H', long)]
    height: Option<u32>,
    /// Directory with <Family>-<Variant>.ttf font files
    #[arg(long)]
    font_dir: Option<PathBuf>,
    /// Font file used for families missing from the font directory
    #[arg(long)]
    font_file: Option<PathBuf>,
    /// JSON settings file, overridden by flags
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output PNG path
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Directory for a timestamped output file when no path is given
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

impl Args {
    fn as_config(&self) -> PortraitConfig {
        PortraitConfig {
            phrase: self.phrase.clone(),
            font: self.font,
            font_size_px: self.font_size,
            letter_spacing_px: self.letter_spacing,
            bold: self.bold.then_some(true),
            italic: self.italic.then_some(true),
            remove_spaces: self.remove_spaces.then_some(true),
            background: self.background.clone(),
            width: self.width,
            height: self.height,
            font_dir: self.font_dir.clone(),
            font_file: self.font_file.clone(),
        }
    }
}

fn load_fonts(config: &PortraitConfig) -> Result<FontBook, TextPortraitError> {
    let mut fonts = FontBook::new();
    if let Some(dir) = &config.font_dir {
        let loaded = fonts.load_dir(dir)?;
        info!("Loaded {} font faces from {}", loaded, dir.display());
    }
    if let Some(file) = &config.font_file {
        fonts.load_fallback_file(file)?;
        info!("Using {} as fallback font", file.display());
    }
    if fonts.is_empty() {
        return Err(TextPortraitError::Font(
            "no fonts found, pass --font-dir or --font-file".to_string(),
        ));
    }
    Ok(fonts)
}

fn main() -> Result<(), TextPortraitError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PortraitConfig::load(path)?.merge(args.as_config()),
        None => args.as_config(),
    };

    let image = image::open(&args.input)?;
    info!("Decoded {} ({}x{})", args.input.display(), image.width(), image.height());

    let params = config.to_parameters(image.width(), image.height())?;

    let portrait = Portrait::new(load_fonts(&config)?);
    let rendered = portrait.render_image(&image, &params, |percent| debug!("{percent:.0}%"))?;

    let path = match &args.output {
        Some(path) => {
            export::write_png(&rendered, path)?;
            path.clone()
        }
        None => export::save_png(&rendered, &args.out_dir)?,
    };
    info!("Wrote {}", path.display());
    Ok(())
}
