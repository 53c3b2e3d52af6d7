//! Configuration management for the AR overlay application

use crate::constants::{
    DEFAULT_ANIMATION_DELAY_SECS, DEFAULT_CAPTURE_PREFIX, DEFAULT_FADE_DURATION_SECS,
    DEFAULT_JPEG_QUALITY, MOBILE_BUFFER_CAPACITY, MOBILE_PREDICTION_STRENGTH,
};
use crate::smoothing::{SensitivityProfile, SmoothingParams};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pose smoothing configuration
    pub smoothing: SmoothingConfig,

    /// Lifecycle timing configuration
    pub lifecycle: LifecycleTimingConfig,

    /// Capture export configuration
    pub capture: CaptureExportConfig,
}

/// Pose smoothing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Active sensitivity profile (low, medium, high)
    pub sensitivity: SensitivityProfile,

    /// Buffer capacity override applied on mobile platforms
    pub mobile_buffer_capacity: usize,

    /// Prediction strength override applied on mobile platforms
    pub mobile_prediction_strength: f64,
}

/// Lifecycle timing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleTimingConfig {
    /// Seconds between acquisition and the one-shot animation firing
    pub animation_delay_secs: f64,

    /// Seconds the fade-out ramp takes on tracking loss
    pub fade_duration_secs: f64,
}

/// Capture export parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureExportConfig {
    /// Filename prefix for exported artifacts
    pub file_prefix: String,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            lifecycle: LifecycleTimingConfig::default(),
            capture: CaptureExportConfig::default(),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            sensitivity: SensitivityProfile::Medium,
            mobile_buffer_capacity: MOBILE_BUFFER_CAPACITY,
            mobile_prediction_strength: MOBILE_PREDICTION_STRENGTH,
        }
    }
}

impl Default for LifecycleTimingConfig {
    fn default() -> Self {
        Self {
            animation_delay_secs: DEFAULT_ANIMATION_DELAY_SECS,
            fade_duration_secs: DEFAULT_FADE_DURATION_SECS,
        }
    }
}

impl Default for CaptureExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_CAPTURE_PREFIX.to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Smoothing parameters for the configured profile, with the mobile
    /// overrides applied when running on a mobile platform.
    #[must_use]
    pub fn smoothing_params(&self, mobile: bool) -> SmoothingParams {
        if mobile {
            // Mobile cameras shake more; smooth aggressively regardless of
            // the configured profile.
            let mut params = SensitivityProfile::Low.params();
            params.buffer_capacity = self.smoothing.mobile_buffer_capacity;
            params.prediction_strength = self.smoothing.mobile_prediction_strength;
            params
        } else {
            self.smoothing.sensitivity.params()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.smoothing_params(false).validate()?;
        self.smoothing_params(true).validate()?;

        if self.lifecycle.animation_delay_secs < 0.0 {
            return Err(Error::Config(
                "Animation delay must not be negative".to_string(),
            ));
        }
        if self.lifecycle.fade_duration_secs <= 0.0 {
            return Err(Error::Config(
                "Fade duration must be greater than 0".to_string(),
            ));
        }

        if self.capture.jpeg_quality == 0 || self.capture.jpeg_quality > 100 {
            return Err(Error::Config(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }
        if self.capture.file_prefix.is_empty() {
            return Err(Error::Config("Capture file prefix must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# AR Overlay Configuration

# Pose smoothing
smoothing:
  sensitivity: "medium"
  mobile_buffer_capacity: 8
  mobile_prediction_strength: 0.05

# Lifecycle timing
lifecycle:
  animation_delay_secs: 3.0
  fade_duration_secs: 0.5

# Capture export
capture:
  file_prefix: "ar-capture"
  jpeg_quality: 80
"#;
