//! Benchmark for noise sampling.
//!
//! Every generated column takes two 8-octave samples.
//!
//! Run with: cargo bench --package liminal_procedural --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use liminal_procedural::{NoiseSeed, OctaveParams, SimplexNoise};

fn benchmark_single_sample(c: &mut Criterion) {
    let noise = SimplexNoise::new(NoiseSeed::for_level(1));

    c.bench_function("simplex_2d_single", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 1.0;
            black_box(noise.sample(black_box(x * 0.01), black_box(x * 0.007)))
        });
    });
}

fn benchmark_wall_perturbation(c: &mut Criterion) {
    let noise = SimplexNoise::new(NoiseSeed::for_level(2));
    let params = OctaveParams::WALL_PERTURBATION;

    c.bench_function("wall_perturbation_column", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 1.0;
            let n1 = noise.sample_octaves(black_box(x), black_box(x * 0.5), &params);
            let n2 = noise.sample_octaves(black_box(x * 0.5), black_box(x), &params);
            black_box(n1 + n2)
        });
    });
}

criterion_group!(benches, benchmark_single_sample, benchmark_wall_perturbation);
criterion_main!(benches);
