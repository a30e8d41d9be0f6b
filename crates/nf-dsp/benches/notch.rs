//! Notch filter benchmarks

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nf_core::{ChannelLayout, NotchParams};
use nf_dsp::{MonoProcessor, NotchFilter, NotchFilterBank, design};

const SAMPLE_RATE: f64 = 30000.0;

fn bench_design(c: &mut Criterion) {
    let params = NotchParams::new(60.0, 4.0);
    c.bench_function("notch_design", |b| {
        b.iter(|| design(black_box(SAMPLE_RATE), black_box(params)))
    });
}

fn bench_filter(c: &mut Criterion) {
    let coeffs = design(SAMPLE_RATE, NotchParams::new(60.0, 4.0)).unwrap();
    let mut filter = NotchFilter::with_coeffs(&coeffs);
    let mut buffer: Vec<f64> = (0..1024).map(|i| (i as f64 * 0.01).sin()).collect();

    c.bench_function("notch_filter_1024", |b| {
        b.iter(|| {
            filter.process_block(black_box(&mut buffer));
        })
    });
}

fn bench_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("notch_bank_block_256");

    for &channels in &[16usize, 64, 384] {
        let bank = NotchFilterBank::default();
        bank.set_channel_count(channels, &ChannelLayout::uniform(channels, SAMPLE_RATE))
            .unwrap();
        let mut data: Vec<Vec<f64>> = (0..channels)
            .map(|ch| (0..256).map(|i| ((i + ch) as f64 * 0.01).sin()).collect())
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(channels), &channels, |b, _| {
            b.iter(|| {
                let mut buffers: Vec<&mut [f64]> =
                    data.iter_mut().map(|v| v.as_mut_slice()).collect();
                bank.process_block(black_box(&mut buffers));
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_design, bench_filter, bench_bank);
criterion_main!(benches);
