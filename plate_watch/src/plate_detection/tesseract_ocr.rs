use std::ffi::CString;

use image::GrayImage;
use leptess::tesseract::TessApi;
use log::debug;

use super::text_extractor::{OcrEngine, TextCandidate};
use crate::error::OcrError;

const PLATE_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 ";
// Treat the image as a single text line.
const PAGESEG_SINGLE_LINE: &str = "7";

/// Tesseract engine restricted to plate characters.
pub struct TesseractOcr {
    ocr: TessApi,
}

impl TesseractOcr {
    pub fn new(data_path: Option<&str>, language: &str) -> Result<Self, OcrError> {
        let mut api = TessApi::new(data_path, language).map_err(|err| {
            OcrError::Engine(format!("cannot load tesseract language '{language}': {err:?}"))
        })?;
        set_variable(&mut api, "tessedit_char_whitelist", PLATE_WHITELIST)?;
        set_variable(&mut api, "tessedit_pageseg_mode", PAGESEG_SINGLE_LINE)?;

        Ok(Self { ocr: api })
    }
}

fn set_variable(api: &mut TessApi, name: &str, value: &str) -> Result<(), OcrError> {
    let name_c = CString::new(name).map_err(|err| OcrError::Engine(err.to_string()))?;
    let value_c = CString::new(value).map_err(|err| OcrError::Engine(err.to_string()))?;
    api.raw
        .set_variable(&name_c, &value_c)
        .map_err(|err| OcrError::Engine(format!("cannot set {name}: {err:?}")))
}

impl OcrEngine for TesseractOcr {
    /// One candidate per recognized line, all sharing the page's mean
    /// confidence.
    fn read(&mut self, image: &GrayImage) -> Result<Vec<TextCandidate>, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidInput("empty image".to_string()));
        }
        let cols = i32::try_from(width)
            .map_err(|_| OcrError::InvalidInput(format!("image width {width} too large")))?;
        let rows = i32::try_from(height)
            .map_err(|_| OcrError::InvalidInput(format!("image height {height} too large")))?;

        self.ocr
            .raw
            .set_image(image.as_raw(), cols, rows, 1, cols)
            .map_err(|err| OcrError::InvalidInput(format!("{err:?}")))?;
        let text = self
            .ocr
            .get_utf8_text()
            .map_err(|err| OcrError::Engine(format!("{err:?}")))?;
        let confidence = (self.ocr.mean_text_conf() as f32 / 100.0).clamp(0.0, 1.0);
        debug!("OCR {:?} at {confidence}", text.trim());

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| TextCandidate::new(line, confidence))
            .collect())
    }
}
