//! Benchmark for chunk generation performance.
//!
//! TARGET: a 32x32 chunk area of any level in well under a second
//!
//! Run with: cargo bench --package liminal_procedural --bench chunk_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use liminal_procedural::{ChunkCoord, LevelProfile, LevelRegistry, TerrainGenerator};
use liminal_shared::FacilityConfig;

fn benchmark_single_chunk(c: &mut Criterion) {
    let config = FacilityConfig::default();

    for level in 0..config.max_levels {
        let gen = TerrainGenerator::new(LevelProfile::new(level, &config));
        c.bench_function(&format!("single_chunk_level_{level}"), |b| {
            let mut coord = 0i32;
            b.iter(|| {
                coord = coord.wrapping_add(1);
                black_box(gen.generate(ChunkCoord::new(coord, coord / 2)))
            });
        });
    }
}

fn benchmark_chunk_grid(c: &mut Criterion) {
    let config = FacilityConfig::default();
    let gen = TerrainGenerator::new(LevelProfile::new(2, &config));

    let mut group = c.benchmark_group("chunk_grid");

    // 32x32 chunks = 512x512 columns
    group.throughput(Throughput::Elements(32 * 32));
    group.bench_function("32x32_chunks_deep", |b| {
        b.iter(|| {
            for z in 0..32 {
                for x in 0..32 {
                    black_box(gen.generate(ChunkCoord::new(x, z)));
                }
            }
        });
    });

    group.finish();
}

fn benchmark_cached_lookup(c: &mut Criterion) {
    let registry = LevelRegistry::new(Arc::new(FacilityConfig::default()));
    let coord = ChunkCoord::new(3, 4);
    let _ = registry.chunk(0, coord);

    c.bench_function("registry_cached_chunk", |b| {
        b.iter(|| black_box(registry.chunk(0, black_box(coord))));
    });
}

criterion_group!(
    benches,
    benchmark_single_chunk,
    benchmark_chunk_grid,
    benchmark_cached_lookup,
);
criterion_main!(benches);
