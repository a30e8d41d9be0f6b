//! Notch bank snapshots
//!
//! A snapshot stores, per channel, the center frequency, bandwidth and
//! bypass flag, plus the global apply-to-ADC switch. Restoring validates
//! every field on its own: a bad value is logged and skipped, and the
//! channel keeps what it had.

use std::fs;
use std::path::Path;

use nf_core::{is_valid_frequency, NotchParams};
use nf_dsp::NotchFilterBank;
use serde::{Deserialize, Serialize};

use crate::{StateError, StateResult};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Stored settings of one channel. Missing fields leave the channel's
/// current value in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelParameters {
    pub channel: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_frequency_hz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth_hz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypassed: Option<bool>,
}

/// Persisted notch bank state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotchFilterSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_to_adc: Option<bool>,
    #[serde(default)]
    pub channels: Vec<ChannelParameters>,
}

/// What a restore did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Channels that received at least one stored value
    pub channels_restored: usize,
    /// Entries naming a channel the bank does not have
    pub channels_skipped: usize,
    /// Individual values rejected by validation or design
    pub fields_ignored: usize,
}

impl Default for NotchFilterSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            apply_to_adc: None,
            channels: Vec::new(),
        }
    }
}

impl NotchFilterSnapshot {
    /// Read the bank's current state
    pub fn capture(bank: &NotchFilterBank) -> Self {
        let channels = bank
            .snapshots()
            .into_iter()
            .map(|s| ChannelParameters {
                channel: s.channel,
                center_frequency_hz: Some(s.params.center_frequency_hz),
                bandwidth_hz: Some(s.params.bandwidth_hz),
                bypassed: Some(s.bypassed),
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            apply_to_adc: Some(bank.apply_on_adc()),
            channels,
        }
    }

    /// Apply stored values to `bank`.
    ///
    /// The global switch goes first so that stored per-channel bypass flags
    /// win over the rule. Center and bandwidth are applied together, each
    /// only if it is inside the frequency domain.
    pub fn restore(&self, bank: &NotchFilterBank) -> RestoreReport {
        let mut report = RestoreReport::default();

        if let Some(apply) = self.apply_to_adc {
            bank.set_apply_on_adc(apply);
        }

        for entry in &self.channels {
            let Ok(current) = bank.params(entry.channel) else {
                log::warn!(
                    "snapshot names channel {} but the bank has {}; skipping",
                    entry.channel,
                    bank.channel_count()
                );
                report.channels_skipped += 1;
                continue;
            };

            let mut restored = false;
            let center = Self::accept_frequency(
                entry.channel,
                "center frequency",
                entry.center_frequency_hz,
                &mut report,
            );
            let bandwidth = Self::accept_frequency(
                entry.channel,
                "bandwidth",
                entry.bandwidth_hz,
                &mut report,
            );

            if center.is_some() || bandwidth.is_some() {
                let params = NotchParams::new(
                    center.unwrap_or(current.center_frequency_hz),
                    bandwidth.unwrap_or(current.bandwidth_hz),
                );
                match bank.set_notch(entry.channel, params) {
                    Ok(()) => restored = true,
                    Err(e) => {
                        log::warn!("channel {}: stored notch ignored: {}", entry.channel, e);
                        report.fields_ignored +=
                            usize::from(center.is_some()) + usize::from(bandwidth.is_some());
                    }
                }
            }

            if let Some(bypassed) = entry.bypassed {
                if bank.set_bypass(entry.channel, bypassed).is_ok() {
                    restored = true;
                }
            }

            if restored {
                report.channels_restored += 1;
            }
        }

        log::info!(
            "restored {} channels ({} skipped, {} values ignored)",
            report.channels_restored,
            report.channels_skipped,
            report.fields_ignored
        );
        report
    }

    fn accept_frequency(
        channel: usize,
        name: &str,
        value: Option<f64>,
        report: &mut RestoreReport,
    ) -> Option<f64> {
        let value = value?;
        if is_valid_frequency(value) {
            Some(value)
        } else {
            log::warn!("channel {}: stored {} {} Hz ignored", channel, name, value);
            report.fields_ignored += 1;
            None
        }
    }

    // ---- JSON Format ----

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON, rejecting snapshots from a newer format
    pub fn from_json(json: &str) -> StateResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StateError::FutureVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    // ---- Save/Load ----

    /// Save snapshot to file
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> StateResult<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load snapshot from file
    pub fn load_from<P: AsRef<Path>>(path: P) -> StateResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
