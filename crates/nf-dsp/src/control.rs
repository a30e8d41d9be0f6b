//! Control surface for the notch bank
//!
//! Every operation names its channel explicitly. Editors that work on a
//! selection of channels use the `*_for` helpers, which apply the same
//! edit to each channel independently and report per-channel results.

use nf_core::{NotchParams, NotchResult};

use crate::bank::NotchFilterBank;

/// Parameter control for a bank of notch channels
pub trait NotchControl: Send + Sync {
    fn set_center_frequency(&self, channel: usize, value: f64) -> NotchResult<()>;
    fn set_bandwidth(&self, channel: usize, value: f64) -> NotchResult<()>;
    fn set_notch(&self, channel: usize, params: NotchParams) -> NotchResult<()>;
    fn set_bypass(&self, channel: usize, bypassed: bool) -> NotchResult<()>;

    fn center_frequency(&self, channel: usize) -> NotchResult<f64>;
    fn bandwidth(&self, channel: usize) -> NotchResult<f64>;
    fn is_bypassed(&self, channel: usize) -> NotchResult<bool>;

    fn set_apply_on_adc(&self, apply: bool);
    fn apply_on_adc(&self) -> bool;

    /// Set the center frequency on every selected channel
    fn set_center_frequency_for(&self, channels: &[usize], value: f64) -> Vec<NotchResult<()>> {
        channels
            .iter()
            .map(|&ch| self.set_center_frequency(ch, value))
            .collect()
    }

    /// Set the bandwidth on every selected channel
    fn set_bandwidth_for(&self, channels: &[usize], value: f64) -> Vec<NotchResult<()>> {
        channels
            .iter()
            .map(|&ch| self.set_bandwidth(ch, value))
            .collect()
    }

    fn set_notch_for(&self, channels: &[usize], params: NotchParams) -> Vec<NotchResult<()>> {
        channels
            .iter()
            .map(|&ch| self.set_notch(ch, params))
            .collect()
    }

    fn set_bypass_for(&self, channels: &[usize], bypassed: bool) -> Vec<NotchResult<()>> {
        channels
            .iter()
            .map(|&ch| self.set_bypass(ch, bypassed))
            .collect()
    }
}

impl NotchControl for NotchFilterBank {
    fn set_center_frequency(&self, channel: usize, value: f64) -> NotchResult<()> {
        NotchFilterBank::set_center_frequency(self, channel, value)
    }

    fn set_bandwidth(&self, channel: usize, value: f64) -> NotchResult<()> {
        NotchFilterBank::set_bandwidth(self, channel, value)
    }

    fn set_notch(&self, channel: usize, params: NotchParams) -> NotchResult<()> {
        NotchFilterBank::set_notch(self, channel, params)
    }

    fn set_bypass(&self, channel: usize, bypassed: bool) -> NotchResult<()> {
        NotchFilterBank::set_bypass(self, channel, bypassed)
    }

    fn center_frequency(&self, channel: usize) -> NotchResult<f64> {
        NotchFilterBank::center_frequency(self, channel)
    }

    fn bandwidth(&self, channel: usize) -> NotchResult<f64> {
        NotchFilterBank::bandwidth(self, channel)
    }

    fn is_bypassed(&self, channel: usize) -> NotchResult<bool> {
        NotchFilterBank::is_bypassed(self, channel)
    }

    fn set_apply_on_adc(&self, apply: bool) {
        NotchFilterBank::set_apply_on_adc(self, apply)
    }

    fn apply_on_adc(&self) -> bool {
        NotchFilterBank::apply_on_adc(self)
    }
}
