use thiserror::Error;

use crate::plate_detection::frame::PixelLayout;

/// The frame source had nothing to give this cycle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no frame available from the frame source")]
pub struct FrameUnavailable;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame has zero width or height")]
    Empty,
    #[error("{width}x{height} {layout:?} frame needs {expected} bytes, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        layout: PixelLayout,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OcrError {
    #[error("OCR engine is not loaded")]
    NotLoaded,
    #[error("invalid OCR input: {0}")]
    InvalidInput(String),
    #[error("OCR engine failure: {0}")]
    Engine(String),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("lookup answered with status {0}")]
    Status(u16),
    #[error("lookup body is not UTF-8: {0}")]
    Body(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{0}' is not a registration plate")]
pub struct InvalidPlate(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
