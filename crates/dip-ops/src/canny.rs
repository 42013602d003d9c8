//! Canny edge detection
//!
//! ## Overview
//!
//! The classic four-stage detector over single-channel images:
//!
//! 1. smooth with a Gaussian of the requested `sigma`,
//! 2. differentiate the smoothed image with Gaussian derivative kernels,
//! 3. thin the gradient magnitude with interpolated non-maximum
//!    suppression ([`nonmax_suppress`]),
//! 4. pick thresholds from the suppressed histogram
//!    ([`estimate_thresholds`]) and link with [`hysteresis`].
//!
//! [`canny`] chains all four; the stages stay public so callers can swap a
//! threshold policy or feed precomputed gradients.
//!
//! Hysteresis runs a single forward raster scan and only consults
//! already-visited neighbors (the row above and the pixel to the left), so
//! weak edges connect downward and rightward from a strong seed but never
//! back up. Fixing that would take a second reverse scan or a worklist;
//! the single-pass form is kept for its predictable cost.

use crate::error::{OpsError, OpsResult};
use crate::filter::convolve;
use crate::kernel::Kernel;
use dip_core::{Image, MAX_LEVEL};
use tracing::debug;

/// Fraction of non-extreme suppressed pixels that must sit at or above the
/// high threshold.
const THRESHOLD_RATIO: f64 = 0.7;

fn require_gray(name: &str, img: &Image) -> OpsResult<()> {
    if !img.is_gray() {
        return Err(OpsError::Unsupported(format!(
            "{name}: single-channel images only, got {} channels",
            img.channels()
        )));
    }
    Ok(())
}

fn check_same_shape(name: &str, a: &Image, b: &Image) -> OpsResult<()> {
    if a.rows() != b.rows() || a.cols() != b.cols() {
        return Err(OpsError::SizeMismatch(format!(
            "{name}: plane shapes differ, {}x{} vs {}x{}",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    Ok(())
}

/// Thin `magnitude` to single-pixel ridges along the gradient direction.
///
/// The two virtual neighbors along the gradient are linearly interpolated
/// from the surrounding 8-neighborhood using the `ix`/`iy` components; a
/// pixel survives only if strictly greater than both. Survivors are clamped
/// to [`MAX_LEVEL`]; everything else, including the one-pixel border,
/// becomes zero.
pub fn nonmax_suppress(magnitude: &Image, ix: &Image, iy: &Image) -> OpsResult<Image> {
    require_gray("nonmax_suppress", magnitude)?;
    require_gray("nonmax_suppress", ix)?;
    require_gray("nonmax_suppress", iy)?;
    check_same_shape("nonmax_suppress", magnitude, ix)?;
    check_same_shape("nonmax_suppress", magnitude, iy)?;
    let nr = magnitude.rows();
    let nc = magnitude.cols();
    let mut out = Image::new(nr, nc, 1)?;
    for i in 1..nr.saturating_sub(1) {
        for j in 1..nc.saturating_sub(1) {
            let gx = ix.at(i, j, 0);
            let gy = iy.at(i, j, 0);
            let g = magnitude.at(i, j, 0);
            let (weight, g1, g2, g3, g4);
            if gy.abs() > gx.abs() {
                // mostly vertical gradient: interpolate between the vertical
                // neighbors and the diagonal matching sign(gx * gy)
                weight = gx.abs() / gy.abs();
                g2 = magnitude.at(i - 1, j, 0);
                g4 = magnitude.at(i + 1, j, 0);
                if gx * gy > 0.0 {
                    g1 = magnitude.at(i - 1, j - 1, 0);
                    g3 = magnitude.at(i + 1, j + 1, 0);
                } else {
                    g1 = magnitude.at(i - 1, j + 1, 0);
                    g3 = magnitude.at(i + 1, j - 1, 0);
                }
            } else {
                // mostly horizontal: interpolate off the horizontal neighbors
                weight = gy.abs() / gx.abs();
                g2 = magnitude.at(i, j - 1, 0);
                g4 = magnitude.at(i, j + 1, 0);
                if gx * gy > 0.0 {
                    g1 = magnitude.at(i - 1, j - 1, 0);
                    g3 = magnitude.at(i + 1, j + 1, 0);
                } else {
                    g1 = magnitude.at(i + 1, j - 1, 0);
                    g3 = magnitude.at(i - 1, j + 1, 0);
                }
            }
            // a zero gradient makes weight NaN, both comparisons fail, and
            // the pixel drops out on its own
            let temp1 = weight * g1 + (1.0 - weight) * g2;
            let temp2 = weight * g3 + (1.0 - weight) * g4;
            if g > temp1 && g > temp2 {
                *out.at_mut(i, j, 0) = if g > MAX_LEVEL { MAX_LEVEL } else { g };
            }
        }
    }
    Ok(out)
}

/// Derive `(high, low)` hysteresis thresholds from a suppressed magnitude.
///
/// Pixels are binned by truncation into 256 levels. Bins 0 and 255 are left
/// out of the population count: zero is the suppressed background and 255
/// the clamp bucket, and either can dominate. The high threshold is the bin
/// at which, walking down from 254, the accumulated count first covers
/// [`THRESHOLD_RATIO`] of the population; low is half of high. An empty
/// population yields `(254, 127)`.
pub fn estimate_thresholds(suppressed: &Image) -> OpsResult<(f32, f32)> {
    require_gray("estimate_thresholds", suppressed)?;
    let mut hist = [0usize; 256];
    for i in 0..suppressed.rows() {
        for j in 0..suppressed.cols() {
            hist[suppressed.at(i, j, 0) as usize] += 1;
        }
    }
    let population: usize = hist[1..255].iter().sum();
    let target = THRESHOLD_RATIO * population as f64;
    let mut high = 254usize;
    let mut count = hist[high];
    while (count as f64) < target && high > 0 {
        high -= 1;
        count += hist[high];
    }
    let low = high / 2;
    debug!(high, low, population, "estimated hysteresis thresholds");
    Ok((high as f32, low as f32))
}

/// Link suppressed magnitudes into a binary edge map.
///
/// A single forward raster pass: pixels at or above `high` are marked
/// outright; pixels strictly between `low` and `high` are marked if a
/// marked pixel already exists among the visited neighbors (row above, or
/// to the left in the current row). Marks are [`MAX_LEVEL`], everything
/// else 0.
pub fn hysteresis(suppressed: &Image, high: f32, low: f32) -> OpsResult<Image> {
    require_gray("hysteresis", suppressed)?;
    let nr = suppressed.rows();
    let nc = suppressed.cols();
    let mut out = Image::new(nr, nc, 1)?;
    for i in 0..nr {
        for j in 0..nc {
            let v = suppressed.at(i, j, 0);
            if v >= high {
                *out.at_mut(i, j, 0) = MAX_LEVEL;
            } else if v > low {
                'search: for m in -1isize..=0 {
                    for n in -1isize..=1 {
                        let r = i as isize + m;
                        let c = j as isize + n;
                        if r >= 0
                            && c >= 0
                            && c < nc as isize
                            && out.at(r as usize, c as usize, 0) == MAX_LEVEL
                        {
                            *out.at_mut(i, j, 0) = MAX_LEVEL;
                            break 'search;
                        }
                    }
                }
            }
        }
    }
    Ok(out)
}

/// Run the full detector on a single-channel image.
///
/// `sigma` drives both the smoothing and the derivative kernels; thresholds
/// come from [`estimate_thresholds`]. Output pixels are [`MAX_LEVEL`] on
/// edges and 0 elsewhere.
pub fn canny(src: &Image, sigma: f64) -> OpsResult<Image> {
    require_gray("canny", src)?;
    debug!(rows = src.rows(), cols = src.cols(), sigma, "canny");
    let smoothed = convolve(src, &Kernel::gaussian(sigma as f32)?)?;
    let ix = convolve(&smoothed, &Kernel::gaussian_deriv_x(sigma as f32)?)?;
    let iy = convolve(&smoothed, &Kernel::gaussian_deriv_y(sigma as f32)?)?;
    let mut magnitude = Image::new(src.rows(), src.cols(), 1)?;
    for i in 0..src.rows() {
        for j in 0..src.cols() {
            let gx = ix.at(i, j, 0);
            let gy = iy.at(i, j, 0);
            *magnitude.at_mut(i, j, 0) = (gx * gx + gy * gy).sqrt();
        }
    }
    let suppressed = nonmax_suppress(&magnitude, &ix, &iy)?;
    let (high, low) = estimate_thresholds(&suppressed)?;
    hysteresis(&suppressed, high, low)
}
