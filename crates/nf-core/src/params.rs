//! Notch parameter ranges and validation

use serde::{Deserialize, Serialize};

use crate::{NotchError, NotchResult};

/// Lower bound (exclusive) for center frequency and bandwidth, in Hz
pub const MIN_FREQUENCY_HZ: f64 = 0.01;

/// Upper bound (exclusive) for center frequency and bandwidth, in Hz
pub const MAX_FREQUENCY_HZ: f64 = 10_000.0;

/// Default notch center (mains hum, 50 Hz regions)
pub const DEFAULT_CENTER_HZ: f64 = 50.0;

/// Default notch width
pub const DEFAULT_BANDWIDTH_HZ: f64 = 5.0;

/// Which notch parameter a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotchParam {
    CenterFrequency,
    Bandwidth,
}

impl NotchParam {
    pub fn name(self) -> &'static str {
        match self {
            Self::CenterFrequency => "center frequency",
            Self::Bandwidth => "bandwidth",
        }
    }
}

impl std::fmt::Display for NotchParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// True if `value` lies strictly inside the accepted frequency domain
#[inline]
pub fn is_valid_frequency(value: f64) -> bool {
    value.is_finite() && value > MIN_FREQUENCY_HZ && value < MAX_FREQUENCY_HZ
}

/// Validate a frequency-domain parameter, returning it unchanged when accepted
pub fn validate_frequency(param: NotchParam, value: f64) -> NotchResult<f64> {
    if is_valid_frequency(value) {
        Ok(value)
    } else {
        Err(NotchError::invalid(format!(
            "{param} {value} Hz outside ({MIN_FREQUENCY_HZ}, {MAX_FREQUENCY_HZ})"
        )))
    }
}

/// Validate a sample rate
pub fn validate_sample_rate(sample_rate: f64) -> NotchResult<f64> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(sample_rate)
    } else {
        Err(NotchError::invalid(format!(
            "sample rate {sample_rate} Hz must be positive"
        )))
    }
}

/// Center/width pair describing one notch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NotchParams {
    pub center_frequency_hz: f64,
    pub bandwidth_hz: f64,
}

impl NotchParams {
    pub const fn new(center_frequency_hz: f64, bandwidth_hz: f64) -> Self {
        Self {
            center_frequency_hz,
            bandwidth_hz,
        }
    }

    /// Check both values against the frequency domain.
    ///
    /// No ordering between center and width is implied here; that guard
    /// belongs to single-parameter edits.
    pub fn validate(&self) -> NotchResult<()> {
        validate_frequency(NotchParam::CenterFrequency, self.center_frequency_hz)?;
        validate_frequency(NotchParam::Bandwidth, self.bandwidth_hz)?;
        Ok(())
    }

    /// Lower band edge in Hz (may be negative for wide notches)
    #[inline]
    pub fn low_edge_hz(&self) -> f64 {
        self.center_frequency_hz - self.bandwidth_hz * 0.5
    }

    /// Upper band edge in Hz
    #[inline]
    pub fn high_edge_hz(&self) -> f64 {
        self.center_frequency_hz + self.bandwidth_hz * 0.5
    }
}

impl Default for NotchParams {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER_HZ, DEFAULT_BANDWIDTH_HZ)
    }
}
