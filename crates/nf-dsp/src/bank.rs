//! Multichannel notch filter bank
//!
//! One `ChannelFilterState` per host channel, indexed by position. Every
//! method takes `&self` so the bank can be shared (`Arc`) between the
//! control thread and the audio thread:
//! - parameter edits take the channel list's read lock and the channel's
//!   settings lock, then publish coefficients through a one-slot handoff
//! - `process` takes the channel list with `try_read` and never waits on a
//!   lock that is held around anything but an assignment
//! - resizing takes the write lock; the host keeps the audio thread out
//!   while the topology changes

use std::sync::atomic::{AtomicBool, Ordering};

use nf_core::{
    ChannelKind, ChannelTopology, NotchConfig, NotchError, NotchParams, NotchResult, Sample,
};
use parking_lot::RwLock;

use crate::channel::{ChannelFilterState, ChannelSnapshot};
use crate::design::NotchCoeffs;
use crate::policy::ApplyPolicy;

/// Per-channel band-stop filter bank
#[derive(Debug)]
pub struct NotchFilterBank {
    channels: RwLock<Vec<ChannelFilterState>>,
    config: NotchConfig,
    apply_on_adc: AtomicBool,
}

impl NotchFilterBank {
    /// Create an empty bank. Channels appear with the first
    /// `set_channel_count` / `update_topology`.
    pub fn new(config: NotchConfig) -> NotchResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: NotchConfig) -> Self {
        Self {
            channels: RwLock::new(Vec::new()),
            apply_on_adc: AtomicBool::new(config.apply_on_adc),
            config,
        }
    }

    pub fn config(&self) -> &NotchConfig {
        &self.config
    }

    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Topology
    // ─────────────────────────────────────────────────────────────────────────

    /// Resize to `count` channels.
    ///
    /// Surviving channels keep their parameters, bypass state and delay
    /// memory; they only pick up the topology's current kind and sample
    /// rate. New channels start from the configured defaults, not bypassed.
    pub fn set_channel_count(&self, count: usize, topology: &dyn ChannelTopology) -> NotchResult<()> {
        if count >= self.config.max_channels {
            log::warn!(
                "ignoring topology with {} channels (limit {})",
                count,
                self.config.max_channels
            );
            return Err(NotchError::invalid(format!(
                "channel count {count} exceeds limit {}",
                self.config.max_channels
            )));
        }

        let mut channels = self.channels.write();
        let previous = channels.len();
        channels.truncate(count);

        for (index, channel) in channels.iter().enumerate() {
            channel.update_host_info(topology.sample_rate(index), topology.channel_kind(index));
        }

        let defaults = self.config.default_params();
        channels.reserve(count.saturating_sub(previous));
        for index in previous..count {
            channels.push(ChannelFilterState::new(
                index,
                defaults,
                topology.sample_rate(index),
                topology.channel_kind(index),
            ));
        }

        if previous != count {
            log::info!("notch bank resized: {} -> {} channels", previous, count);
        }
        Ok(())
    }

    /// Follow a host topology change: resize to the topology's channel
    /// count, then re-apply the stored apply-to-ADC rule so new aux/ADC
    /// channels pick it up. The rule is applied even if the resize was
    /// rejected.
    pub fn update_topology(&self, topology: &dyn ChannelTopology) -> NotchResult<()> {
        let resized = self.set_channel_count(topology.channel_count(), topology);
        self.apply_global_adc_rule(self.apply_on_adc());
        resized
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Apply policy
    // ─────────────────────────────────────────────────────────────────────────

    pub fn apply_on_adc(&self) -> bool {
        self.apply_on_adc.load(Ordering::Acquire)
    }

    /// Store the apply-to-ADC switch and apply it
    pub fn set_apply_on_adc(&self, apply: bool) {
        self.apply_on_adc.store(apply, Ordering::Release);
        self.apply_global_adc_rule(apply);
    }

    /// Set bypass on every aux/ADC channel to `!apply`. Regular channels are
    /// left alone. Does not change the stored switch.
    pub fn apply_global_adc_rule(&self, apply: bool) {
        let policy = ApplyPolicy::new(apply);
        let channels = self.channels.read();
        let mut affected = 0;
        for channel in channels.iter() {
            if let Some(bypassed) = policy.bypass_for(channel.kind()) {
                channel.set_bypass(bypassed);
                affected += 1;
            }
        }
        if affected > 0 {
            log::info!(
                "apply-to-ADC {}: {} auxiliary channels {}",
                if apply { "on" } else { "off" },
                affected,
                if apply { "filtered" } else { "bypassed" }
            );
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Parameters
    // ─────────────────────────────────────────────────────────────────────────

    fn with_channel<T>(
        &self,
        channel: usize,
        f: impl FnOnce(&ChannelFilterState) -> NotchResult<T>,
    ) -> NotchResult<T> {
        let channels = self.channels.read();
        let state = channels.get(channel).ok_or(NotchError::OutOfRange {
            channel,
            count: channels.len(),
        })?;
        f(state)
    }

    fn log_rejected<T>(channel: usize, result: NotchResult<T>) -> NotchResult<T> {
        if let Err(e) = &result {
            log::debug!("channel {}: rejected: {}", channel, e);
        }
        result
    }

    /// Set the center frequency. Must be in range and strictly below the
    /// channel's current bandwidth.
    pub fn set_center_frequency(&self, channel: usize, value: f64) -> NotchResult<()> {
        Self::log_rejected(
            channel,
            self.with_channel(channel, |state| state.set_center_frequency(value)),
        )
    }

    /// Set the bandwidth. Must be in range and strictly above the channel's
    /// current center frequency.
    pub fn set_bandwidth(&self, channel: usize, value: f64) -> NotchResult<()> {
        Self::log_rejected(
            channel,
            self.with_channel(channel, |state| state.set_bandwidth(value)),
        )
    }

    /// Set center and bandwidth in one step; each value is only checked
    /// against the frequency domain.
    pub fn set_notch(&self, channel: usize, params: NotchParams) -> NotchResult<()> {
        Self::log_rejected(
            channel,
            self.with_channel(channel, |state| state.set_params(params)),
        )
    }

    pub fn set_bypass(&self, channel: usize, bypassed: bool) -> NotchResult<()> {
        self.with_channel(channel, |state| {
            state.set_bypass(bypassed);
            Ok(())
        })
    }

    pub fn center_frequency(&self, channel: usize) -> NotchResult<f64> {
        self.with_channel(channel, |state| Ok(state.center_frequency()))
    }

    pub fn bandwidth(&self, channel: usize) -> NotchResult<f64> {
        self.with_channel(channel, |state| Ok(state.bandwidth()))
    }

    pub fn is_bypassed(&self, channel: usize) -> NotchResult<bool> {
        self.with_channel(channel, |state| Ok(state.is_bypassed()))
    }

    pub fn params(&self, channel: usize) -> NotchResult<NotchParams> {
        self.with_channel(channel, |state| Ok(state.params()))
    }

    pub fn channel_kind(&self, channel: usize) -> NotchResult<ChannelKind> {
        self.with_channel(channel, |state| Ok(state.kind()))
    }

    pub fn sample_rate(&self, channel: usize) -> NotchResult<f64> {
        self.with_channel(channel, |state| Ok(state.sample_rate()))
    }

    pub fn coefficients(&self, channel: usize) -> NotchResult<Option<NotchCoeffs>> {
        self.with_channel(channel, |state| Ok(state.coefficients()))
    }

    pub fn coefficient_revision(&self, channel: usize) -> NotchResult<u64> {
        self.with_channel(channel, |state| Ok(state.coefficient_revision()))
    }

    pub fn snapshot(&self, channel: usize) -> NotchResult<ChannelSnapshot> {
        self.with_channel(channel, |state| Ok(state.snapshot()))
    }

    /// Snapshots of every channel in index order
    pub fn snapshots(&self) -> Vec<ChannelSnapshot> {
        self.channels.read().iter().map(|c| c.snapshot()).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Audio Processing
    // ─────────────────────────────────────────────────────────────────────────

    /// Filter one channel's block in place.
    /// Call from audio thread. Unknown channels and contended locks leave
    /// the block untouched.
    #[inline]
    pub fn process(&self, channel: usize, samples: &mut [Sample]) {
        if let Some(channels) = self.channels.try_read() {
            if let Some(state) = channels.get(channel) {
                state.process(samples);
            }
        }
    }

    /// Filter one block per channel, in channel order. Buffers past the
    /// bank's channel count are left untouched.
    pub fn process_block(&self, buffers: &mut [&mut [Sample]]) {
        if let Some(channels) = self.channels.try_read() {
            for (state, buffer) in channels.iter().zip(buffers.iter_mut()) {
                state.process(buffer);
            }
        }
    }

    /// Clear every channel's delay memory before its next block (call on
    /// stop/seek)
    pub fn reset(&self) {
        for channel in self.channels.read().iter() {
            channel.reset();
        }
    }
}

impl Default for NotchFilterBank {
    fn default() -> Self {
        Self::with_valid_config(NotchConfig::default())
    }
}
