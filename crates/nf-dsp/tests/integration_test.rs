//! Notch bank integration tests
//!
//! Drives the bank the way a host does:
//! - topology changes (resize, sample rate, ADC/aux channels)
//! - per-channel parameter edits and their rejection rules
//! - block processing, including with a concurrent control thread

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use nf_core::{ChannelInfo, ChannelKind, ChannelLayout, NotchError, NotchParams};
use nf_dsp::{NotchControl, NotchFilterBank};

const SAMPLE_RATE: f64 = 30000.0;
const BLOCK_SIZE: usize = 256;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Generate test sine wave
fn generate_sine(samples: usize, freq: f64) -> Vec<f64> {
    (0..samples)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE;
            (2.0 * std::f64::consts::PI * freq * t).sin()
        })
        .collect()
}

/// Calculate RMS of signal
fn rms(signal: &[f64]) -> f64 {
    let sum: f64 = signal.iter().map(|x| x * x).sum();
    (sum / signal.len() as f64).sqrt()
}

/// Check signal has no NaN or Infinity
fn is_valid_signal(signal: &[f64]) -> bool {
    signal.iter().all(|&x| x.is_finite())
}

fn bank_with(layout: &ChannelLayout) -> NotchFilterBank {
    init_logging();
    let bank = NotchFilterBank::default();
    bank.update_topology(layout).unwrap();
    bank
}

/// Run `signal` through `channel` block by block
fn filter_channel(bank: &NotchFilterBank, channel: usize, signal: &mut [f64]) {
    for block in signal.chunks_mut(BLOCK_SIZE) {
        bank.process(channel, block);
    }
}

/// Last half second of a signal
fn tail(signal: &[f64]) -> &[f64] {
    &signal[signal.len() - (SAMPLE_RATE as usize / 2)..]
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARAMETER CONTROL
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_get_returns_last_accepted_value() {
    let bank = bank_with(&ChannelLayout::uniform(2, SAMPLE_RATE));

    bank.set_bandwidth(0, 123.4).unwrap();
    assert_eq!(bank.bandwidth(0), Ok(123.4));

    bank.set_center_frequency(0, 61.7).unwrap();
    assert_eq!(bank.center_frequency(0), Ok(61.7));

    // Other channel untouched
    assert_eq!(bank.params(1), Ok(NotchParams::default()));
}

#[test]
fn test_rejected_values_leave_state_unchanged() {
    let bank = bank_with(&ChannelLayout::uniform(1, SAMPLE_RATE));
    bank.set_bandwidth(0, 200.0).unwrap();

    let params = bank.params(0).unwrap();
    let revision = bank.coefficient_revision(0).unwrap();
    let coeffs = bank.coefficients(0).unwrap();

    for value in [
        0.0,
        0.005,
        0.01,
        10_000.0,
        12_000.0,
        -5.0,
        f64::NAN,
        f64::INFINITY,
    ] {
        assert!(
            matches!(
                bank.set_center_frequency(0, value),
                Err(NotchError::InvalidParameter(_))
            ),
            "center {value} accepted"
        );
        assert!(
            matches!(
                bank.set_bandwidth(0, value),
                Err(NotchError::InvalidParameter(_))
            ),
            "bandwidth {value} accepted"
        );
    }

    assert_eq!(bank.params(0), Ok(params));
    assert_eq!(bank.coefficient_revision(0), Ok(revision));
    assert_eq!(bank.coefficients(0), Ok(coeffs));
}

#[test]
fn test_bandwidth_below_domain_skips_design() {
    let bank = bank_with(&ChannelLayout::uniform(1, SAMPLE_RATE));
    let revision = bank.coefficient_revision(0).unwrap();

    assert!(bank.set_bandwidth(0, 0.005).is_err());
    assert_eq!(bank.bandwidth(0), Ok(5.0));
    assert_eq!(bank.coefficient_revision(0), Ok(revision));
}

#[test]
fn test_single_parameter_ordering() {
    let bank = bank_with(&ChannelLayout::uniform(1, SAMPLE_RATE));

    // Center must stay below bandwidth
    assert!(bank.set_center_frequency(0, 80.0).is_err());
    bank.set_bandwidth(0, 100.0).unwrap();
    bank.set_center_frequency(0, 80.0).unwrap();
    assert!(bank.set_bandwidth(0, 80.0).is_err());
    assert!(bank.set_bandwidth(0, 50.0).is_err());

    assert_eq!(bank.params(0), Ok(NotchParams::new(80.0, 100.0)));
}

#[test]
fn test_out_of_range_channel() {
    let bank = bank_with(&ChannelLayout::uniform(2, SAMPLE_RATE));

    assert_eq!(
        bank.set_center_frequency(2, 1.0),
        Err(NotchError::OutOfRange { channel: 2, count: 2 })
    );
    assert_eq!(
        bank.set_notch(7, NotchParams::new(60.0, 4.0)),
        Err(NotchError::OutOfRange { channel: 7, count: 2 })
    );
    assert!(bank.is_bypassed(2).is_err());
    assert!(bank.snapshot(2).is_err());
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOPOLOGY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_shrink_then_regrow_resets_dropped_channels() {
    let bank = bank_with(&ChannelLayout::uniform(4, SAMPLE_RATE));
    bank.set_notch(1, NotchParams::new(60.0, 4.0)).unwrap();
    bank.set_notch(3, NotchParams::new(120.0, 8.0)).unwrap();
    bank.set_bypass(3, true).unwrap();

    bank.update_topology(&ChannelLayout::uniform(2, SAMPLE_RATE))
        .unwrap();
    assert_eq!(bank.channel_count(), 2);
    assert!(bank.params(3).is_err());

    bank.update_topology(&ChannelLayout::uniform(4, SAMPLE_RATE))
        .unwrap();
    assert_eq!(bank.channel_count(), 4);
    assert_eq!(bank.params(1), Ok(NotchParams::new(60.0, 4.0)));
    assert_eq!(bank.params(3), Ok(NotchParams::default()));
    assert_eq!(bank.is_bypassed(3), Ok(false));
}

#[test]
fn test_topology_limit_keeps_bank() {
    let bank = bank_with(&ChannelLayout::uniform(8, SAMPLE_RATE));

    let result = bank.update_topology(&ChannelLayout::uniform(1024, SAMPLE_RATE));
    assert!(matches!(result, Err(NotchError::InvalidParameter(_))));
    assert_eq!(bank.channel_count(), 8);

    bank.update_topology(&ChannelLayout::uniform(1023, SAMPLE_RATE))
        .unwrap();
    assert_eq!(bank.channel_count(), 1023);
}

#[test]
fn test_sample_rate_change_redesigns() {
    let bank = bank_with(&ChannelLayout::uniform(2, SAMPLE_RATE));
    let revision = bank.coefficient_revision(0).unwrap();
    let coeffs = bank.coefficients(0).unwrap();

    let layout = ChannelLayout::new(vec![
        ChannelInfo::regular(1000.0),
        ChannelInfo::regular(SAMPLE_RATE),
    ]);
    bank.update_topology(&layout).unwrap();

    assert_eq!(bank.sample_rate(0), Ok(1000.0));
    assert_eq!(bank.coefficient_revision(0), Ok(revision + 1));
    assert_ne!(bank.coefficients(0), Ok(coeffs));
    // Unchanged rate, unchanged design
    assert_eq!(bank.coefficient_revision(1), Ok(revision));
}

#[test]
fn test_adc_rule() {
    let layout = ChannelLayout::uniform(4, SAMPLE_RATE)
        .with_kind(2, ChannelKind::Adc)
        .with_kind(3, ChannelKind::Aux);
    let bank = bank_with(&layout);

    // Default config leaves aux/ADC channels bypassed
    assert!(!bank.apply_on_adc());
    assert_eq!(bank.is_bypassed(2), Ok(true));
    assert_eq!(bank.is_bypassed(3), Ok(true));

    bank.set_bypass(0, true).unwrap();

    bank.set_apply_on_adc(true);
    assert_eq!(bank.is_bypassed(0), Ok(true));
    assert_eq!(bank.is_bypassed(1), Ok(false));
    assert_eq!(bank.is_bypassed(2), Ok(false));
    assert_eq!(bank.is_bypassed(3), Ok(false));

    bank.set_apply_on_adc(false);
    assert_eq!(bank.is_bypassed(0), Ok(true));
    assert_eq!(bank.is_bypassed(1), Ok(false));
    assert_eq!(bank.is_bypassed(2), Ok(true));
    assert_eq!(bank.is_bypassed(3), Ok(true));
}

#[test]
fn test_adc_rule_idempotent() {
    let layout = ChannelLayout::uniform(4, SAMPLE_RATE)
        .with_kind(1, ChannelKind::Aux)
        .with_kind(3, ChannelKind::Adc);
    let bank = bank_with(&layout);
    bank.set_bypass(0, true).unwrap();

    for apply in [true, false] {
        bank.apply_global_adc_rule(apply);
        let once = bank.snapshots();
        bank.apply_global_adc_rule(apply);
        assert_eq!(bank.snapshots(), once);
    }
    // The stored switch is not touched by the rule alone
    assert!(!bank.apply_on_adc());
}

#[test]
fn test_new_adc_channels_follow_stored_rule() {
    let bank = bank_with(&ChannelLayout::uniform(2, SAMPLE_RATE));
    bank.set_apply_on_adc(true);

    let layout = ChannelLayout::uniform(3, SAMPLE_RATE).with_kind(2, ChannelKind::Adc);
    bank.update_topology(&layout).unwrap();
    assert_eq!(bank.is_bypassed(2), Ok(false));

    bank.set_apply_on_adc(false);
    let layout = ChannelLayout::uniform(4, SAMPLE_RATE)
        .with_kind(2, ChannelKind::Adc)
        .with_kind(3, ChannelKind::Adc);
    bank.update_topology(&layout).unwrap();
    assert_eq!(bank.is_bypassed(2), Ok(true));
    assert_eq!(bank.is_bypassed(3), Ok(true));
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIGNAL FLOW
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_two_channel_line_noise_removal() {
    let bank = bank_with(&ChannelLayout::uniform(2, SAMPLE_RATE));
    bank.set_notch(0, NotchParams::new(60.0, 4.0)).unwrap();
    assert_eq!(bank.center_frequency(0), Ok(60.0));
    assert_eq!(bank.bandwidth(0), Ok(4.0));

    let len = 2 * SAMPLE_RATE as usize;

    // 60 Hz removed on channel 0
    let mut hum = generate_sine(len, 60.0);
    filter_channel(&bank, 0, &mut hum);
    assert!(is_valid_signal(&hum));
    assert!(rms(tail(&hum)) < 0.01 * std::f64::consts::FRAC_1_SQRT_2);

    // 1 kHz passes channel 0
    bank.reset();
    let input = generate_sine(len, 1000.0);
    let mut tone = input.clone();
    filter_channel(&bank, 0, &mut tone);
    let ratio = rms(tail(&tone)) / rms(tail(&input));
    assert!((ratio - 1.0).abs() < 0.01, "1 kHz gain {ratio}");

    // Channel 1 keeps the default 50 Hz notch
    let mut mains = generate_sine(len, 50.0);
    filter_channel(&bank, 1, &mut mains);
    assert!(rms(tail(&mains)) < 0.01 * std::f64::consts::FRAC_1_SQRT_2);
}

#[test]
fn test_mixture_keeps_signal() {
    let bank = bank_with(&ChannelLayout::uniform(1, SAMPLE_RATE));
    bank.set_notch(0, NotchParams::new(60.0, 4.0)).unwrap();

    let len = 2 * SAMPLE_RATE as usize;
    let hum = generate_sine(len, 60.0);
    let signal = generate_sine(len, 1000.0);
    let mut mix: Vec<f64> = hum
        .iter()
        .zip(&signal)
        .map(|(h, s)| h + 0.5 * s)
        .collect();

    filter_channel(&bank, 0, &mut mix);

    let expected = 0.5 * std::f64::consts::FRAC_1_SQRT_2;
    assert!((rms(tail(&mix)) - expected).abs() < 0.01 * expected);
}

#[test]
fn test_bypassed_channel_is_untouched() {
    let bank = bank_with(&ChannelLayout::uniform(2, SAMPLE_RATE));
    bank.set_bypass(1, true).unwrap();

    let input = generate_sine(4096, 50.0);
    let mut output = input.clone();
    filter_channel(&bank, 1, &mut output);
    assert_eq!(output, input);
}

#[test]
fn test_process_block_per_channel() {
    let bank = bank_with(&ChannelLayout::uniform(2, SAMPLE_RATE));
    bank.set_bypass(1, true).unwrap();

    let len = 2 * SAMPLE_RATE as usize;
    let input = generate_sine(len, 50.0);
    let mut left = input.clone();
    let mut right = input.clone();
    let mut extra = input.clone();

    for start in (0..len).step_by(BLOCK_SIZE) {
        let end = (start + BLOCK_SIZE).min(len);
        let mut buffers: Vec<&mut [f64]> = vec![
            &mut left[start..end],
            &mut right[start..end],
            &mut extra[start..end],
        ];
        bank.process_block(&mut buffers);
    }

    assert!(rms(tail(&left)) < 0.01);
    assert_eq!(right, input);
    // No third channel in the bank
    assert_eq!(extra, input);
}

#[test]
fn test_unconfigurable_channel_passes_through() {
    let layout = ChannelLayout::new(vec![ChannelInfo::regular(0.0)]);
    let bank = bank_with(&layout);
    assert_eq!(bank.coefficients(0), Ok(None));

    let input = generate_sine(1024, 50.0);
    let mut output = input.clone();
    filter_channel(&bank, 0, &mut output);
    assert_eq!(output, input);
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONCURRENCY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_control_thread_during_processing() {
    let bank = Arc::new(bank_with(&ChannelLayout::uniform(2, SAMPLE_RATE)));

    let control = {
        let bank = Arc::clone(&bank);
        thread::spawn(move || {
            for i in 0..500 {
                let center = 40.0 + (i % 40) as f64;
                let _ = bank.set_notch(0, NotchParams::new(center, 4.0));
                let _ = bank.set_bypass(1, i % 2 == 0);
            }
            bank.set_notch(0, NotchParams::new(60.0, 4.0)).unwrap();
            bank.set_bypass(1, false).unwrap();
        })
    };

    let mut buffer = generate_sine(BLOCK_SIZE, 60.0);
    for _ in 0..2000 {
        bank.process(0, &mut buffer);
        bank.process(1, &mut buffer);
        assert!(is_valid_signal(&buffer));
    }
    control.join().unwrap();

    // Final parameters are in effect once the control thread is done
    bank.reset();
    let mut hum = generate_sine(2 * SAMPLE_RATE as usize, 60.0);
    filter_channel(&bank, 0, &mut hum);
    assert!(rms(tail(&hum)) < 0.01);
}

#[test]
fn test_update_reaches_next_block_during_reads() {
    let bank = Arc::new(bank_with(&ChannelLayout::uniform(1, SAMPLE_RATE)));
    let stop = Arc::new(AtomicBool::new(false));

    // Display refresh polling the getters
    let reader = {
        let bank = Arc::clone(&bank);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                let _ = bank.snapshots();
                let _ = bank.center_frequency(0);
            }
        })
    };

    bank.set_notch(0, NotchParams::new(60.0, 4.0)).unwrap();
    let mut hum = generate_sine(2 * SAMPLE_RATE as usize, 60.0);
    filter_channel(&bank, 0, &mut hum);

    stop.store(true, Ordering::Relaxed);
    reader.join().unwrap();

    assert!(rms(tail(&hum)) < 0.01);
}

#[test]
fn test_reset_during_processing_keeps_filtering() {
    let bank = Arc::new(bank_with(&ChannelLayout::uniform(1, SAMPLE_RATE)));
    let stop = Arc::new(AtomicBool::new(false));

    let resetter = {
        let bank = Arc::clone(&bank);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                bank.reset();
            }
        })
    };

    let input = generate_sine(BLOCK_SIZE, 60.0);
    for _ in 0..500 {
        let mut block = input.clone();
        bank.process(0, &mut block);
        assert!(is_valid_signal(&block));
        assert_ne!(block, input, "active channel passed a block through");
    }

    stop.store(true, Ordering::Relaxed);
    resetter.join().unwrap();
}

#[test]
fn test_control_trait_object_is_shareable() {
    let bank: Arc<dyn NotchControl> = Arc::new(bank_with(&ChannelLayout::uniform(3, SAMPLE_RATE)));

    let handles: Vec<_> = (0..3)
        .map(|ch| {
            let bank = Arc::clone(&bank);
            thread::spawn(move || bank.set_bandwidth(ch, 100.0 + ch as f64))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    for ch in 0..3 {
        assert_eq!(bank.bandwidth(ch), Ok(100.0 + ch as f64));
    }
}
