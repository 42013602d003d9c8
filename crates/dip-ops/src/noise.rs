//! Deterministic Gaussian noise synthesis
//!
//! Adds zero-mean Gaussian noise to every sample of a buffer, seeded so test
//! fixtures and benchmarks are reproducible. Variates come from the polar
//! Box-Muller rejection method, which produces them in pairs; the second of
//! each pair is cached for the next draw. Output samples are not clamped to
//! the display range.

use crate::error::{OpsError, OpsResult};
use dip_core::Image;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

/// One standard normal variate, consuming the cached half-pair first.
fn next_gaussian(rng: &mut StdRng, cache: &mut Option<f64>) -> f64 {
    if let Some(v) = cache.take() {
        return v;
    }
    loop {
        let v1 = 2.0 * rng.gen_range(0.0..1.0) - 1.0;
        let v2 = 2.0 * rng.gen_range(0.0..1.0) - 1.0;
        let s: f64 = v1 * v1 + v2 * v2;
        if s > 0.0 && s < 1.0 {
            let factor = (-2.0 * s.ln() / s).sqrt();
            *cache = Some(v2 * factor);
            return v1 * factor;
        }
    }
}

/// Add zero-mean Gaussian noise with standard deviation `std_dev` to every
/// sample, drawn from a generator seeded with `seed`.
pub fn gaussian_noise(src: &Image, std_dev: f32, seed: u64) -> OpsResult<Image> {
    if std_dev <= 0.0 {
        return Err(OpsError::Degenerate(format!(
            "gaussian_noise: standard deviation must be positive, got {std_dev}"
        )));
    }
    debug!(
        rows = src.rows(),
        cols = src.cols(),
        std_dev,
        seed,
        "gaussian_noise"
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cache = None;
    let mut out = src.clone();
    for v in out.data_mut() {
        *v += std_dev * next_gaussian(&mut rng, &mut cache) as f32;
    }
    Ok(out)
}
