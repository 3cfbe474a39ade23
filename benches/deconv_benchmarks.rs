//! Criterion benchmarks for the restoration entry points.
//!
//! Run with: cargo bench
//! Run specific: cargo bench -- bench_wiener

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::prelude::*;

use deconv_core::{richardson_lucy, unsupervised_wiener, wiener, ImageOperator, SamplerConfig};

fn random_image(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((rows, cols), |_| rng.gen())
}

fn box_psf(size: usize) -> Array2<f64> {
    Array2::from_elem((size, size), 1.0 / (size * size) as f64)
}

fn bench_wiener(c: &mut Criterion) {
    let mut group = c.benchmark_group("wiener");
    for &size in &[64usize, 128, 256] {
        let image = random_image(size, size, 42);
        let psf = ImageOperator::Impulse(box_psf(5));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| wiener(black_box(image.view()), &psf, 0.05, None, true).unwrap())
        });
    }
    group.finish();
}

fn bench_richardson_lucy(c: &mut Criterion) {
    let mut group = c.benchmark_group("richardson_lucy");
    for &size in &[64usize, 128] {
        let image = random_image(size, size, 42);
        let psf = box_psf(5);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| richardson_lucy(black_box(image.view()), psf.view(), 10))
        });
    }
    group.finish();
}

fn bench_unsupervised_wiener(c: &mut Criterion) {
    let mut group = c.benchmark_group("unsupervised_wiener");
    group.sample_size(10);
    let image = random_image(64, 64, 42);
    let psf = ImageOperator::Impulse(box_psf(5));
    let config = SamplerConfig {
        threshold: 1e-4,
        burnin: 2,
        min_iter: 5,
        max_iter: 20,
    };
    group.bench_function("64", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(7);
            unsupervised_wiener(black_box(image.view()), &psf, None, &config, &mut rng, None)
                .unwrap()
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_wiener,
    bench_richardson_lucy,
    bench_unsupervised_wiener
);
criterion_main!(benches);
