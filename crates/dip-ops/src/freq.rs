//! Frequency-domain filtering
//!
//! ## Overview
//!
//! Each filter forward-transforms the input with [`crate::fft::fft`],
//! multiplies the magnitude plane by a radial transfer mask centered on the
//! DC bin at `(rows / 2, cols / 2)`, leaves phase alone, and runs
//! [`crate::fft::ifft`] back to the spatial domain. The FFT preconditions
//! (square, power-of-two, single-channel) therefore apply to every filter
//! here.
//!
//! Smoothing and sharpening come from [`ideal`], [`butterworth`] and
//! [`gaussian`], each selectable as a low or high pass through [`PassBand`].
//! Restoration comes from [`wiener`] and [`inverse_filter`], both built on a
//! Gaussian blur model `B = exp(-d^2 / (2 sigma^2))`.
//!
//! ## Usage
//!
//! ```ignore
//! use dip_ops::freq::{gaussian, PassBand};
//!
//! let smoothed = gaussian(&img, 12.0, PassBand::Low)?;
//! ```

use crate::error::{OpsError, OpsResult};
use crate::fft::{fft, ifft};
use dip_core::Image;
use tracing::debug;

/// Which side of the cutoff a radial filter keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassBand {
    /// Keep frequencies near DC.
    Low,
    /// Keep frequencies away from DC.
    High,
}

fn check_radius(name: &str, radius: f64) -> OpsResult<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(OpsError::InvalidParameter(format!(
            "{name}: cutoff radius {radius} must be positive and finite"
        )));
    }
    Ok(())
}

fn check_sigma(name: &str, sigma: f64) -> OpsResult<()> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(OpsError::Degenerate(format!(
            "{name}: sigma {sigma} must be positive and finite"
        )));
    }
    Ok(())
}

fn ideal_mask(d: f64, radius: f64, band: PassBand) -> f64 {
    let inside = d <= radius;
    if inside == (band == PassBand::Low) { 1.0 } else { 0.0 }
}

fn butterworth_mask(d: f64, radius: f64, exp: f64, band: PassBand) -> f64 {
    let ratio = match band {
        PassBand::Low => d / radius,
        // d = 0 sends the ratio to infinity and the mask to 0
        PassBand::High => radius / d,
    };
    1.0 / (1.0 + ratio.powf(exp))
}

fn gaussian_mask(d2: f64, sigma: f64, band: PassBand) -> f64 {
    let low = (-d2 / (2.0 * sigma * sigma)).exp();
    match band {
        PassBand::Low => low,
        PassBand::High => 1.0 - low,
    }
}

fn wiener_mask(d2: f64, sigma: f64, k: f64) -> f64 {
    let blur = (-d2 / (2.0 * sigma * sigma)).exp();
    let blur2 = blur * blur;
    (1.0 / blur) * (blur2 / (blur2 + k))
}

fn inverse_mask(d2: f64, sigma: f64) -> f64 {
    let blur = (-d2 / (2.0 * sigma * sigma)).exp();
    1.0 / blur
}

/// Transform, scale the magnitude by `transfer(di, dj)`, transform back.
fn apply_transfer<F>(src: &Image, transfer: F) -> OpsResult<Image>
where
    F: Fn(f64, f64) -> f64,
{
    let mut spectrum = fft(src)?;
    let n = spectrum.side();
    let center = (n / 2) as f64;
    for i in 0..n {
        for j in 0..n {
            let h = transfer(i as f64 - center, j as f64 - center);
            let v = spectrum.magnitude.at(i, j, 0) as f64 * h;
            *spectrum.magnitude.at_mut(i, j, 0) = v as f32;
        }
    }
    ifft(&spectrum)
}

/// Ideal (brick-wall) filter with cutoff `radius`.
///
/// The sharp cutoff rings (Gibbs); that is the point of having this filter
/// next to [`butterworth`] and [`gaussian`].
pub fn ideal(src: &Image, radius: f64, band: PassBand) -> OpsResult<Image> {
    check_radius("ideal", radius)?;
    debug!(radius, ?band, "ideal filter");
    apply_transfer(src, move |di, dj| {
        ideal_mask((di * di + dj * dj).sqrt(), radius, band)
    })
}

/// Butterworth filter of the given `order` with cutoff `radius`.
///
/// The transfer value at the cutoff distance is exactly 0.5 for any order;
/// higher orders steepen the rolloff toward the ideal filter.
pub fn butterworth(src: &Image, radius: f64, order: u32, band: PassBand) -> OpsResult<Image> {
    check_radius("butterworth", radius)?;
    if order == 0 {
        return Err(OpsError::InvalidParameter(
            "butterworth: order must be at least 1".to_string(),
        ));
    }
    debug!(radius, order, ?band, "butterworth filter");
    let exp = 2.0 * order as f64;
    apply_transfer(src, move |di, dj| {
        butterworth_mask((di * di + dj * dj).sqrt(), radius, exp, band)
    })
}

/// Gaussian filter with spread `sigma`.
///
/// The high-pass variant is the complement `1 - exp(-d^2 / (2 sigma^2))`.
pub fn gaussian(src: &Image, sigma: f64, band: PassBand) -> OpsResult<Image> {
    check_sigma("gaussian", sigma)?;
    debug!(sigma, ?band, "gaussian filter");
    apply_transfer(src, move |di, dj| gaussian_mask(di * di + dj * dj, sigma, band))
}

/// Wiener restoration against a Gaussian blur of spread `sigma`.
///
/// `k` is the assumed noise-to-signal power ratio: larger values damp the
/// amplification of frequencies the blur crushed. As `k` approaches zero
/// the mask approaches [`inverse_filter`]; zero itself is rejected.
pub fn wiener(src: &Image, k: f64, sigma: f64) -> OpsResult<Image> {
    check_sigma("wiener", sigma)?;
    if !k.is_finite() || k <= 0.0 {
        return Err(OpsError::Degenerate(format!(
            "wiener: noise-to-signal ratio {k} must be positive and finite"
        )));
    }
    debug!(k, sigma, "wiener filter");
    apply_transfer(src, move |di, dj| wiener_mask(di * di + dj * dj, sigma, k))
}

/// Unregularized inverse of a Gaussian blur of spread `sigma`.
///
/// Divides by the blur transfer directly. Where the blur is vanishingly
/// small this amplifies without bound; any noise in those frequencies blows
/// up with it. [`wiener`] is the damped alternative.
pub fn inverse_filter(src: &Image, sigma: f64) -> OpsResult<Image> {
    check_sigma("inverse_filter", sigma)?;
    debug!(sigma, "inverse filter");
    apply_transfer(src, move |di, dj| inverse_mask(di * di + dj * dj, sigma))
}
