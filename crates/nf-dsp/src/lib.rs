//! nf-dsp: notch filtering for multichannel acquisition streams
//!
//! ## Modules
//! - `biquad` - TDF-II biquad section
//! - `design` - Butterworth band-stop design (bilinear transform)
//! - `notch` - Cascaded notch filter runtime
//! - `channel` - Per-channel parameters, coefficients and filter state
//! - `policy` - Apply-to-ADC rule for auxiliary channels
//! - `bank` - Multichannel bank, resized with the host topology
//! - `control` - Channel-addressed control trait

pub mod bank;
pub mod biquad;
pub mod channel;
pub mod control;
pub mod design;
pub mod notch;
pub mod policy;

pub use bank::NotchFilterBank;
pub use channel::{ChannelFilterState, ChannelSnapshot};
pub use control::NotchControl;
pub use design::{design, NotchCoeffs};
pub use notch::NotchFilter;
pub use policy::ApplyPolicy;

use nf_core::Sample;

/// Trait for all DSP processors
pub trait Processor: Send + Sync {
    /// Reset processor state
    fn reset(&mut self);

    /// Get latency in samples
    fn latency(&self) -> usize {
        0
    }
}

/// Mono processor trait
pub trait MonoProcessor: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: Sample) -> Sample;

    /// Process a block of samples
    fn process_block(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}
