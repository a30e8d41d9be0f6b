//! Host channel topology
//!
//! The host owns channel discovery. The filter bank only asks, on every
//! resize, how many channels exist and what each one's sample rate and
//! classification is.

use serde::{Deserialize, Serialize};

/// Channel classification supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Regular recording channel
    #[default]
    Regular,
    /// Auxiliary input (accelerometers etc.)
    Aux,
    /// ADC input
    Adc,
}

impl ChannelKind {
    /// Aux and ADC channels follow the global apply-to-ADC switch
    #[inline]
    pub fn is_auxiliary(self) -> bool {
        matches!(self, Self::Aux | Self::Adc)
    }
}

/// Read-only view of the host's channel layout
pub trait ChannelTopology {
    /// Number of input channels
    fn channel_count(&self) -> usize;

    /// Sample rate of `channel` in Hz
    fn sample_rate(&self, channel: usize) -> f64;

    /// Classification of `channel`
    fn channel_kind(&self, channel: usize) -> ChannelKind;
}

/// Description of one host channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub sample_rate: f64,
    pub kind: ChannelKind,
}

impl ChannelInfo {
    pub const fn new(sample_rate: f64, kind: ChannelKind) -> Self {
        Self { sample_rate, kind }
    }

    pub const fn regular(sample_rate: f64) -> Self {
        Self::new(sample_rate, ChannelKind::Regular)
    }
}

/// Owned channel layout, for hosts that describe channels up front
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelLayout {
    channels: Vec<ChannelInfo>,
}

impl ChannelLayout {
    pub fn new(channels: Vec<ChannelInfo>) -> Self {
        Self { channels }
    }

    /// `count` regular channels sharing one sample rate
    pub fn uniform(count: usize, sample_rate: f64) -> Self {
        Self::new(vec![ChannelInfo::regular(sample_rate); count])
    }

    /// Append a channel
    pub fn push(&mut self, info: ChannelInfo) {
        self.channels.push(info);
    }

    /// Builder-style reclassification; indices past the end are ignored
    pub fn with_kind(mut self, channel: usize, kind: ChannelKind) -> Self {
        if let Some(info) = self.channels.get_mut(channel) {
            info.kind = kind;
        }
        self
    }

    pub fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl ChannelTopology for ChannelLayout {
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn sample_rate(&self, channel: usize) -> f64 {
        self.channels
            .get(channel)
            .map(|info| info.sample_rate)
            .unwrap_or(0.0)
    }

    fn channel_kind(&self, channel: usize) -> ChannelKind {
        self.channels
            .get(channel)
            .map(|info| info.kind)
            .unwrap_or_default()
    }
}
