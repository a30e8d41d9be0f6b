//! Per-channel notch state
//!
//! Split between the two threads that touch a channel:
//! - `settings`: control-thread record (parameters, sample rate, kind and
//!   the last successfully designed coefficients). Never touched by `process`.
//! - `pending`: one-slot handoff of freshly designed coefficients. Both
//!   sides hold it only to assign or take the slot.
//! - `filter`: delay memory and live coefficients, only ever locked by
//!   `process`.
//!
//! Bypass and reset requests are plain atomics.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use nf_core::{
    validate_frequency, ChannelKind, NotchError, NotchParam, NotchParams, NotchResult, Sample,
};
use parking_lot::Mutex;

use crate::design::{design, NotchCoeffs};
use crate::notch::NotchFilter;
use crate::{MonoProcessor, Processor};

/// Point-in-time copy of a channel's observable state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSnapshot {
    pub channel: usize,
    pub params: NotchParams,
    pub sample_rate: f64,
    pub kind: ChannelKind,
    pub bypassed: bool,
}

#[derive(Debug, Clone)]
struct ChannelSettings {
    params: NotchParams,
    sample_rate: f64,
    kind: ChannelKind,
    coeffs: Option<NotchCoeffs>,
}

/// Coefficients waiting for the audio thread
#[derive(Debug, Clone, Copy, PartialEq)]
struct CoeffUpdate {
    coeffs: Option<NotchCoeffs>,
    /// Clear delay memory when installing
    clear_memory: bool,
}

/// One channel of the bank
#[derive(Debug)]
pub struct ChannelFilterState {
    index: usize,
    settings: Mutex<ChannelSettings>,
    pending: Mutex<Option<CoeffUpdate>>,
    filter: Mutex<NotchFilter>,
    /// `pending` holds an update the audio thread has not installed yet
    dirty: AtomicBool,
    reset_pending: AtomicBool,
    bypassed: AtomicBool,
    /// Number of successful coefficient designs
    revision: AtomicU64,
}

impl ChannelFilterState {
    /// Create a channel with `params`, designing coefficients for
    /// `sample_rate`. A design failure leaves the channel unconfigured (it
    /// passes audio through) rather than failing creation.
    pub fn new(index: usize, params: NotchParams, sample_rate: f64, kind: ChannelKind) -> Self {
        let state = Self {
            index,
            settings: Mutex::new(ChannelSettings {
                params,
                sample_rate,
                kind,
                coeffs: None,
            }),
            pending: Mutex::new(None),
            filter: Mutex::new(NotchFilter::new()),
            dirty: AtomicBool::new(false),
            reset_pending: AtomicBool::new(false),
            bypassed: AtomicBool::new(false),
            revision: AtomicU64::new(0),
        };
        state.redesign(false);
        state
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn params(&self) -> NotchParams {
        self.settings.lock().params
    }

    pub fn center_frequency(&self) -> f64 {
        self.settings.lock().params.center_frequency_hz
    }

    pub fn bandwidth(&self) -> f64 {
        self.settings.lock().params.bandwidth_hz
    }

    pub fn sample_rate(&self) -> f64 {
        self.settings.lock().sample_rate
    }

    pub fn kind(&self) -> ChannelKind {
        self.settings.lock().kind
    }

    /// Coefficients of the last successful design
    pub fn coefficients(&self) -> Option<NotchCoeffs> {
        self.settings.lock().coeffs
    }

    /// How many times coefficients have been designed for this channel
    pub fn coefficient_revision(&self) -> u64 {
        self.revision.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.bypassed.load(Ordering::Acquire)
    }

    /// Filtering is active when the channel is not bypassed
    #[inline]
    pub fn should_filter(&self) -> bool {
        !self.is_bypassed()
    }

    pub fn set_bypass(&self, bypassed: bool) {
        self.bypassed.store(bypassed, Ordering::Release);
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        let settings = self.settings.lock();
        ChannelSnapshot {
            channel: self.index,
            params: settings.params,
            sample_rate: settings.sample_rate,
            kind: settings.kind,
            bypassed: self.is_bypassed(),
        }
    }

    /// Single-parameter edit of the center frequency.
    ///
    /// Accepted only inside the frequency domain and strictly below the
    /// current bandwidth.
    pub fn set_center_frequency(&self, value: f64) -> NotchResult<()> {
        validate_frequency(NotchParam::CenterFrequency, value)?;
        let mut settings = self.settings.lock();
        if value >= settings.params.bandwidth_hz {
            return Err(NotchError::invalid(format!(
                "center frequency {value} Hz must be below bandwidth {} Hz",
                settings.params.bandwidth_hz
            )));
        }
        let params = NotchParams {
            center_frequency_hz: value,
            ..settings.params
        };
        self.apply_locked(&mut settings, params)
    }

    /// Single-parameter edit of the bandwidth.
    ///
    /// Accepted only inside the frequency domain and strictly above the
    /// current center frequency.
    pub fn set_bandwidth(&self, value: f64) -> NotchResult<()> {
        validate_frequency(NotchParam::Bandwidth, value)?;
        let mut settings = self.settings.lock();
        if value <= settings.params.center_frequency_hz {
            return Err(NotchError::invalid(format!(
                "bandwidth {value} Hz must exceed center frequency {} Hz",
                settings.params.center_frequency_hz
            )));
        }
        let params = NotchParams {
            bandwidth_hz: value,
            ..settings.params
        };
        self.apply_locked(&mut settings, params)
    }

    /// Replace center and bandwidth together. Only the frequency domain of
    /// each value is checked.
    pub fn set_params(&self, params: NotchParams) -> NotchResult<()> {
        params.validate()?;
        let mut settings = self.settings.lock();
        self.apply_locked(&mut settings, params)
    }

    /// Refresh host-supplied properties. A sample-rate change redesigns
    /// the filter and clears its memory when the new coefficients go live.
    pub(crate) fn update_host_info(&self, sample_rate: f64, kind: ChannelKind) {
        let rate_changed = {
            let mut settings = self.settings.lock();
            settings.kind = kind;
            if settings.sample_rate == sample_rate {
                false
            } else {
                settings.sample_rate = sample_rate;
                true
            }
        };

        if rate_changed {
            log::info!(
                "channel {}: sample rate now {} Hz, redesigning notch",
                self.index,
                sample_rate
            );
            self.redesign(true);
        }
    }

    /// Clear delay memory before the next filtered block
    pub fn reset(&self) {
        self.reset_pending.store(true, Ordering::Release);
    }

    /// Filter `samples` in place.
    ///
    /// Coefficients published before this call are installed first. The
    /// handoff slot is only ever held for an assignment, so taking it here
    /// is bounded. A channel that has never been configured passes audio
    /// through.
    pub fn process(&self, samples: &mut [Sample]) {
        if self.is_bypassed() {
            return;
        }
        // Only `process` locks the filter; contention means a second audio
        // thread on the same channel.
        let Some(mut filter) = self.filter.try_lock() else {
            return;
        };

        if self.dirty.load(Ordering::Acquire) {
            let update = {
                let mut pending = self.pending.lock();
                self.dirty.store(false, Ordering::Release);
                pending.take()
            };
            if let Some(update) = update {
                match update.coeffs.as_ref() {
                    Some(coeffs) => filter.set_coeffs(coeffs),
                    None => filter.clear_coeffs(),
                }
                if update.clear_memory {
                    filter.reset();
                }
            }
        }

        if self.reset_pending.swap(false, Ordering::AcqRel) {
            filter.reset();
        }

        filter.process_block(samples);
    }

    /// Hand coefficients to the audio thread. A newer update replaces an
    /// uninstalled one but keeps its memory-clear request.
    fn publish(&self, coeffs: Option<NotchCoeffs>, clear_memory: bool) {
        let mut pending = self.pending.lock();
        let clear_memory = clear_memory || pending.as_ref().is_some_and(|p| p.clear_memory);
        *pending = Some(CoeffUpdate {
            coeffs,
            clear_memory,
        });
        self.dirty.store(true, Ordering::Release);
    }

    /// Design from current settings; on failure the channel is left
    /// unconfigured
    fn redesign(&self, clear_memory: bool) {
        let mut settings = self.settings.lock();
        match design(settings.sample_rate, settings.params) {
            Ok(coeffs) => {
                settings.coeffs = Some(coeffs);
                self.revision.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                log::warn!("channel {}: {}; passing audio through", self.index, e);
                settings.coeffs = None;
            }
        }
        self.publish(settings.coeffs, clear_memory);
    }

    /// Design for `params`, committing parameters and coefficients only on
    /// success
    fn apply_locked(&self, settings: &mut ChannelSettings, params: NotchParams) -> NotchResult<()> {
        let coeffs = design(settings.sample_rate, params)?;
        settings.params = params;
        settings.coeffs = Some(coeffs);
        self.revision.fetch_add(1, Ordering::Relaxed);
        self.publish(settings.coeffs, false);
        log::debug!(
            "channel {}: notch {} Hz / {} Hz",
            self.index,
            params.center_frequency_hz,
            params.bandwidth_hz
        );
        Ok(())
    }
}
