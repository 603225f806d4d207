use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::plate_detection::text_extractor::DEFAULT_CONFIDENCE_THRESHOLD;

/// Environment variable holding the path of the TOML configuration file.
pub const CONFIG_ENV_VAR: &str = "PLATE_WATCH_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The plate is appended verbatim to this address.
    pub base_address: String,
    pub confidence_threshold: f32,
    /// Pause between the end of one cycle and the start of the next.
    pub cycle_interval_ms: u64,
    pub flagged_marker: String,
    pub clear_marker: String,
    pub lookup_timeout_ms: u64,
    pub camera_index: i32,
    /// Read frames from this video file instead of the camera.
    pub video_file: Option<String>,
    /// Log state changes instead of opening a window.
    pub headless: bool,
    /// `None` uses the system tessdata directory.
    pub tesseract_data_path: Option<String>,
    pub tesseract_language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_address: "https://poliskoll.se/fordon/".to_string(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            cycle_interval_ms: 1000,
            flagged_marker: "Nojjigt".to_string(),
            clear_marker: "Nepp".to_string(),
            lookup_timeout_ms: 5000,
            camera_index: 0,
            video_file: None,
            headless: false,
            tesseract_data_path: None,
            tesseract_language: "eng".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `PLATE_WATCH_CONFIG`, or the defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_address.trim().is_empty() {
            return Err(ConfigError::Invalid("base_address is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "confidence_threshold {} is outside [0, 1]",
                self.confidence_threshold
            )));
        }
        if self.cycle_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "cycle_interval_ms must be positive".to_string(),
            ));
        }
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "lookup_timeout_ms must be positive".to_string(),
            ));
        }
        if self.flagged_marker.is_empty() || self.clear_marker.is_empty() {
            return Err(ConfigError::Invalid("markers must not be empty".to_string()));
        }
        if self.flagged_marker == self.clear_marker {
            return Err(ConfigError::Invalid(
                "flagged_marker and clear_marker must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}
