use std::fmt;
use std::str::FromStr;

use crate::error::InvalidPlate;

pub const PLATE_LEN: usize = 6;

/// True iff `candidate_text` is exactly three uppercase letters, two digits
/// and one uppercase letter or digit. The input is used as is.
pub fn matches(candidate_text: &str) -> bool {
    let bytes = candidate_text.as_bytes();
    bytes.len() == PLATE_LEN
        && bytes[..3].iter().all(u8::is_ascii_uppercase)
        && bytes[3..5].iter().all(u8::is_ascii_digit)
        && (bytes[5].is_ascii_uppercase() || bytes[5].is_ascii_digit())
}

/// OCR output splits plates on the embossed gap ("ABC 123"), drop the spaces.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| *c != ' ').collect()
}

/// A registration plate that is known to match the plate grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlateString(String);

impl PlateString {
    /// Normalizes `text` and validates it.
    pub fn parse(text: &str) -> Result<Self, InvalidPlate> {
        let normalized = normalize(text);
        if matches(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(InvalidPlate(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PlateString {
    type Err = InvalidPlate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PlateString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlateString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
