pub mod classifier;
pub mod display_sink;
pub mod frame;
pub mod plate_format;
pub mod recognition_loop;
pub mod text_extractor;

#[cfg(feature = "opencv")]
pub mod indicator_render;
#[cfg(feature = "tesseract")]
pub mod tesseract_ocr;
#[cfg(feature = "opencv")]
pub mod video_reader;

/// Outcome of looking a plate up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationResult {
    Flagged,
    Clear,
    /// Unrecognized response or failed lookup.
    Unknown,
}

impl ClassificationResult {
    pub fn label(self) -> &'static str {
        match self {
            ClassificationResult::Flagged => "flagged",
            ClassificationResult::Clear => "clear",
            ClassificationResult::Unknown => "unknown",
        }
    }
}

/// What the presentation layer should show. `Idle` until the first
/// classification, afterwards the latest classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayState {
    #[default]
    Idle,
    Flagged,
    Clear,
    Unknown,
}

impl From<ClassificationResult> for DisplayState {
    fn from(result: ClassificationResult) -> Self {
        match result {
            ClassificationResult::Flagged => DisplayState::Flagged,
            ClassificationResult::Clear => DisplayState::Clear,
            ClassificationResult::Unknown => DisplayState::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_state_starts_idle() {
        assert_eq!(DisplayState::default(), DisplayState::Idle);
    }

    #[test]
    fn classification_maps_one_to_one() {
        assert_eq!(
            DisplayState::from(ClassificationResult::Flagged),
            DisplayState::Flagged
        );
        assert_eq!(
            DisplayState::from(ClassificationResult::Clear),
            DisplayState::Clear
        );
        assert_eq!(
            DisplayState::from(ClassificationResult::Unknown),
            DisplayState::Unknown
        );
    }
}
