//! Constants used throughout the application

/// Delay before the one-shot animation fires after acquisition (seconds)
pub const DEFAULT_ANIMATION_DELAY_SECS: f64 = 3.0;

/// Duration of the fade-out on tracking loss (seconds)
pub const DEFAULT_FADE_DURATION_SECS: f64 = 0.5;

/// JPEG quality used when encoding capture exports (0-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Filename prefix for exported captures
pub const DEFAULT_CAPTURE_PREFIX: &str = "ar-capture";

/// Default pose buffer capacities per sensitivity profile
pub const LOW_SENSITIVITY_CAPACITY: usize = 8;
pub const MEDIUM_SENSITIVITY_CAPACITY: usize = 6;
pub const HIGH_SENSITIVITY_CAPACITY: usize = 4;

/// Default prediction strengths per sensitivity profile
pub const LOW_SENSITIVITY_PREDICTION: f64 = 0.05;
pub const MEDIUM_SENSITIVITY_PREDICTION: f64 = 0.15;
pub const HIGH_SENSITIVITY_PREDICTION: f64 = 0.30;

/// Default EMA smoothing factors per sensitivity profile
pub const LOW_SENSITIVITY_SMOOTHING: f64 = 0.15;
pub const MEDIUM_SENSITIVITY_SMOOTHING: f64 = 0.35;
pub const HIGH_SENSITIVITY_SMOOTHING: f64 = 0.60;

/// Buffer capacity applied on top of the low profile on mobile platforms
pub const MOBILE_BUFFER_CAPACITY: usize = 8;

/// Prediction strength applied on top of the low profile on mobile platforms
pub const MOBILE_PREDICTION_STRENGTH: f64 = 0.05;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
