//! Notch bank demo
//!
//! Usage:
//!   notchbank-demo                        - 60 Hz notch on channel 0, defaults on channel 1
//!   notchbank-demo --snapshot s.json      - Restore channel settings from a snapshot
//!   notchbank-demo --save s.json          - Write the resulting settings to a snapshot

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nf_core::{ChannelLayout, NotchConfig, NotchParams};
use nf_dsp::NotchFilterBank;
use nf_state::{ConfigFile, NotchFilterSnapshot};

const BLOCK_SIZE: usize = 256;

#[derive(Parser)]
#[command(name = "notchbank-demo", about = "Filter a synthetic hum + tone mix")]
struct Cli {
    /// Number of channels
    #[arg(short, long, default_value_t = 2)]
    channels: usize,

    /// Sample rate (Hz)
    #[arg(short = 'r', long, default_value_t = 30000.0)]
    sample_rate: f64,

    /// Signal length (seconds)
    #[arg(short, long, default_value_t = 2.0)]
    duration: f64,

    /// Hum frequency mixed into every channel (Hz)
    #[arg(long, default_value_t = 60.0)]
    hum: f64,

    /// Tone frequency mixed into every channel (Hz)
    #[arg(long, default_value_t = 1000.0)]
    tone: f64,

    /// Bank configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Snapshot to restore after the default channel 0 notch is set
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Write the final settings here
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NotchConfig::load_from(path),
        None => NotchConfig::default(),
    };
    let bank = NotchFilterBank::new(config).context("invalid bank configuration")?;
    bank.update_topology(&ChannelLayout::uniform(cli.channels, cli.sample_rate))
        .context("channel layout rejected")?;

    if cli.channels > 0 {
        bank.set_notch(0, NotchParams::new(cli.hum, 4.0))
            .context("cannot place notch on channel 0")?;
    }

    if let Some(path) = &cli.snapshot {
        let snapshot = NotchFilterSnapshot::load_from(path)
            .with_context(|| format!("cannot read snapshot {}", path.display()))?;
        snapshot.restore(&bank);
    }

    for s in bank.snapshots() {
        log::info!(
            "channel {}: {} Hz / {} Hz{}",
            s.channel,
            s.params.center_frequency_hz,
            s.params.bandwidth_hz,
            if s.bypassed { " (bypassed)" } else { "" }
        );
    }

    let len = (cli.duration * cli.sample_rate).round() as usize;
    let input = mix(len, cli.sample_rate, cli.hum, cli.tone);
    let mut outputs: Vec<Vec<f64>> = vec![input.clone(); cli.channels];

    for start in (0..len).step_by(BLOCK_SIZE) {
        let end = (start + BLOCK_SIZE).min(len);
        let mut buffers: Vec<&mut [f64]> = outputs
            .iter_mut()
            .map(|channel| &mut channel[start..end])
            .collect();
        bank.process_block(&mut buffers);
    }

    // Skip the first quarter so the filters have settled
    let settled = len / 4;
    let before = rms(&input[settled..]);
    for (channel, output) in outputs.iter().enumerate() {
        let after = rms(&output[settled..]);
        log::info!(
            "channel {}: rms {:.4} -> {:.4} ({:+.1} dB)",
            channel,
            before,
            after,
            20.0 * (after / before).log10()
        );
    }

    if let Some(path) = &cli.save {
        NotchFilterSnapshot::capture(&bank)
            .save_to(path)
            .with_context(|| format!("cannot write snapshot {}", path.display()))?;
        log::info!("saved snapshot to {}", path.display());
    }

    Ok(())
}

/// Equal-amplitude sum of two sines
fn mix(len: usize, sample_rate: f64, hum: f64, tone: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            0.5 * (2.0 * std::f64::consts::PI * hum * t).sin()
                + 0.5 * (2.0 * std::f64::consts::PI * tone * t).sin()
        })
        .collect()
}

fn rms(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum: f64 = signal.iter().map(|x| x * x).sum();
    (sum / signal.len() as f64).sqrt()
}
