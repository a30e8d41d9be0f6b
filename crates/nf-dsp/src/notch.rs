//! Notch filter runtime: a cascade of TDF-II sections

use nf_core::Sample;

use crate::biquad::BiquadTDF2;
use crate::design::{NotchCoeffs, NOTCH_SECTIONS};
use crate::{MonoProcessor, Processor};

/// Band-stop cascade with its delay-line memory.
///
/// A filter starts unconfigured; `process_block` leaves samples untouched
/// until coefficients have been installed.
#[derive(Debug, Clone, Default)]
pub struct NotchFilter {
    sections: [BiquadTDF2; NOTCH_SECTIONS],
    configured: bool,
}

impl NotchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coeffs(coeffs: &NotchCoeffs) -> Self {
        let mut filter = Self::new();
        filter.set_coeffs(coeffs);
        filter
    }

    /// Install new coefficients, keeping the delay memory so the change is
    /// click-free for small parameter moves
    pub fn set_coeffs(&mut self, coeffs: &NotchCoeffs) {
        for (section, c) in self.sections.iter_mut().zip(coeffs.sections.iter()) {
            section.set_coeffs(*c);
        }
        self.configured = true;
    }

    /// Drop coefficients; the filter stops processing until reconfigured
    pub fn clear_coeffs(&mut self) {
        self.sections = Default::default();
        self.configured = false;
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Current coefficients, if configured
    pub fn coeffs(&self) -> Option<NotchCoeffs> {
        self.configured.then(|| NotchCoeffs {
            sections: std::array::from_fn(|i| *self.sections[i].coeffs()),
        })
    }
}

impl Processor for NotchFilter {
    fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }
}

impl MonoProcessor for NotchFilter {
    #[inline(always)]
    fn process_sample(&mut self, input: Sample) -> Sample {
        self.sections
            .iter_mut()
            .fold(input, |acc, section| section.process_sample(acc))
    }

    fn process_block(&mut self, buffer: &mut [Sample]) {
        if !self.configured {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}
