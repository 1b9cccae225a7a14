//! Benchmarks for reverb processing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_reverb::dsp::reverb::{lowpass_coefficient, CostelloReverb};

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        // Impulse followed by a quiet tail
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0)
                } else {
                    (i as f32 * 0.05).sin() * 0.1
                }
            })
            .collect();

        let cases = [
            ("short_bright", 0.3, 12_000.0, true),
            ("long_dark", 0.9, 800.0, true),
            ("no_diffusion", 0.6, 4_000.0, false),
        ];

        for (name, feedback, cutoff, diffusion) in cases {
            let mut reverb = CostelloReverb::new(sample_rate, 1);
            reverb.set_diffusion(diffusion);
            let coefficient = lowpass_coefficient(cutoff, sample_rate);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for &sample in &input {
                        sum += reverb.process(0, black_box(sample), feedback, coefficient);
                    }
                    sum
                })
            });
        }
    }

    group.finish();
}
