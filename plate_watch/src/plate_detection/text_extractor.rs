use image::GrayImage;
use log::debug;

use super::frame::Frame;
use super::plate_format::PlateString;
use crate::error::OcrError;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// One piece of text read by the OCR engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCandidate {
    pub text: String,
    /// In `[0, 1]`.
    pub confidence: f32,
}

impl TextCandidate {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Reads text out of a luminance image. Implementations may block for a long
/// time.
pub trait OcrEngine {
    fn read(&mut self, image: &GrayImage) -> Result<Vec<TextCandidate>, OcrError>;
}

pub struct TextExtractor {
    engine: Box<dyn OcrEngine>,
    confidence_threshold: f32,
}

impl TextExtractor {
    pub fn new(engine: Box<dyn OcrEngine>) -> Self {
        Self::with_threshold(engine, DEFAULT_CONFIDENCE_THRESHOLD)
    }

    pub fn with_threshold(engine: Box<dyn OcrEngine>, confidence_threshold: f32) -> Self {
        Self {
            engine,
            confidence_threshold,
        }
    }

    /// First candidate, in engine order, that is confident enough and reads
    /// as a plate once spaces are removed.
    pub fn extract(&mut self, frame: &Frame) -> Result<Option<PlateString>, OcrError> {
        let grey = frame.to_grayscale();
        let candidates = self.engine.read(&grey)?;
        debug!("OCR {} candidates: {:?}", candidates.len(), candidates);

        Ok(candidates
            .iter()
            .find_map(|candidate| self.accept(candidate)))
    }

    fn accept(&self, candidate: &TextCandidate) -> Option<PlateString> {
        // NaN confidences never pass
        if candidate.confidence > self.confidence_threshold {
            PlateString::parse(&candidate.text).ok()
        } else {
            None
        }
    }
}
