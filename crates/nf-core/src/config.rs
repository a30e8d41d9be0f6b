//! Filter bank configuration

use serde::{Deserialize, Serialize};

use crate::{NotchError, NotchParams, NotchResult, DEFAULT_BANDWIDTH_HZ, DEFAULT_CENTER_HZ};

/// Hosts reporting this many channels or more are ignored on resize
pub const MAX_CHANNELS: usize = 1024;

/// Bank-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotchConfig {
    /// Center frequency given to new channels (Hz)
    pub default_center_hz: f64,
    /// Bandwidth given to new channels (Hz)
    pub default_bandwidth_hz: f64,
    /// Initial state of the apply-to-ADC switch
    pub apply_on_adc: bool,
    /// Channel count limit (exclusive)
    pub max_channels: usize,
}

impl Default for NotchConfig {
    fn default() -> Self {
        Self {
            default_center_hz: DEFAULT_CENTER_HZ,
            default_bandwidth_hz: DEFAULT_BANDWIDTH_HZ,
            apply_on_adc: false,
            max_channels: MAX_CHANNELS,
        }
    }
}

impl NotchConfig {
    /// Parameters given to freshly created channels
    pub fn default_params(&self) -> NotchParams {
        NotchParams::new(self.default_center_hz, self.default_bandwidth_hz)
    }

    pub fn validate(&self) -> NotchResult<()> {
        self.default_params().validate()?;
        if self.max_channels == 0 {
            return Err(NotchError::invalid("max_channels must be at least 1"));
        }
        Ok(())
    }
}
