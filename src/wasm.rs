//! WebAssembly bindings for textportrait

use crate::{export, FontBook, FontFamily, FontVariant, OutputSize, Portrait, RenderParameters};
use image::DynamicImage;
use wasm_bindgen::prelude::*;

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmRenderer {
    portrait: Portrait,
}

#[wasm_bindgen]
impl WasmRenderer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmRenderer {
        WasmRenderer { portrait: Portrait::new(FontBook::new()) }
    }

    /// Register a font face
    ///
    /// # Arguments
    /// * `family` - CSS family name from the font list, e.g. `"Open Sans"`
    /// * `bold`, `italic` - Which variant the bytes hold
    /// * `bytes` - TrueType or OpenType file contents
    #[wasm_bindgen]
    pub fn add_font(&mut self, family: &str, bold: bool, italic: bool, bytes: &[u8]) -> Result<(), JsValue> {
        let family: FontFamily =
            serde_json::from_value(serde_json::Value::String(family.to_string())).map_err(js_err)?;
        self.portrait
            .fonts_mut()
            .insert(family, FontVariant::of(bold, italic), bytes)
            .map_err(js_err)
    }

    /// Face used for families without a registered font
    #[wasm_bindgen]
    pub fn set_fallback_font(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.portrait.fonts_mut().set_fallback(bytes).map_err(js_err)
    }

    /// Render RGBA pixels into a PNG
    ///
    /// `params_json` holds `RenderParameters` fields; a zero or missing
    /// width/height takes the source size. `on_progress` is called with the
    /// advisory completion percentage.
    #[wasm_bindgen]
    pub fn render(
        &self,
        image_data: &[u8],
        width: u32,
        height: u32,
        params_json: &str,
        on_progress: Option<js_sys::Function>,
    ) -> Result<Vec<u8>, JsValue> {
        let img = image::RgbaImage::from_raw(width, height, image_data.to_vec())
            .ok_or_else(|| JsValue::from_str("Invalid image dimensions"))?;
        let image = DynamicImage::ImageRgba8(img);

        let mut params: RenderParameters = serde_json::from_str(params_json).map_err(js_err)?;
        if params.width == 0 || params.height == 0 {
            params = params.with_size(OutputSize::from_source(width, height));
        }

        let rendered = self
            .portrait
            .render_image(&image, &params, |percent| {
                web_sys::console::debug_1(&format!("text portrait {percent:.0}%").into());
                if let Some(callback) = &on_progress {
                    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_f64(percent as f64)) {
                        web_sys::console::warn_2(&"text portrait progress callback threw".into(), &e);
                    }
                }
            })
            .map_err(js_err)?;
        export::encode_png(&rendered).map_err(js_err)
    }
}

impl Default for WasmRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Height that keeps the source aspect ratio at `width`
#[wasm_bindgen]
pub fn height_for_width(source_width: u32, source_height: u32, width: u32) -> u32 {
    OutputSize::from_source(source_width, source_height).with_width(width).height
}

/// Width that keeps the source aspect ratio at `height`
#[wasm_bindgen]
pub fn width_for_height(source_width: u32, source_height: u32, height: u32) -> u32 {
    OutputSize::from_source(source_width, source_height).with_height(height).width
}

/// Download name for a portrait made at `millis` (from `Date.now()`)
#[wasm_bindgen]
pub fn download_file_name(millis: f64) -> Result<String, JsValue> {
    chrono::DateTime::from_timestamp_millis(millis as i64)
        .map(export::download_file_name)
        .ok_or_else(|| JsValue::from_str("Timestamp out of range"))
}

#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&"textportrait ready".into());
}
