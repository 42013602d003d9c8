//! Benchmarks for the dip crates.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dip_core::Image;
use dip_ops::canny::canny;
use dip_ops::fft::{fft, ifft};
use dip_ops::filter::convolve;
use dip_ops::kernel::Kernel;
use dip_ops::noise::gaussian_noise;

/// Reproducible noisy test image clamped to the display range.
fn test_image(side: usize) -> Image {
    let base = Image::filled(side, side, 1, 128.0).unwrap();
    gaussian_noise(&base, 40.0, 7)
        .unwrap()
        .map(|v| v.clamp(0.0, 255.0))
}

/// Benchmark the FFT across image sizes, forward-only and round-trip.
fn bench_fft(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft");

    for &side in &[64usize, 128, 256] {
        let img = test_image(side);
        group.throughput(Throughput::Elements((side * side) as u64));

        group.bench_with_input(BenchmarkId::new("forward", side), &img, |b, img| {
            b.iter(|| fft(black_box(img)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("round_trip", side), &img, |b, img| {
            b.iter(|| ifft(&fft(black_box(img)).unwrap()).unwrap())
        });
    }

    group.finish();
}

/// Benchmark spatial convolution with a mid-sized Gaussian kernel.
fn bench_convolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolve");

    let img = test_image(256);
    let kernel = Kernel::gaussian(2.0).unwrap();
    group.throughput(Throughput::Elements((256 * 256) as u64));

    group.bench_function("gaussian_sigma2_256", |b| {
        b.iter(|| convolve(black_box(&img), black_box(&kernel)).unwrap())
    });

    group.finish();
}

/// Benchmark the full Canny pipeline.
fn bench_canny(c: &mut Criterion) {
    let mut group = c.benchmark_group("canny");

    let img = test_image(128);
    group.throughput(Throughput::Elements((128 * 128) as u64));

    group.bench_function("sigma2_128", |b| {
        b.iter(|| canny(black_box(&img), 2.0).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_fft, bench_convolve, bench_canny);
criterion_main!(benches);
