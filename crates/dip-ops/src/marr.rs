//! Marr-Hildreth edge detection
//!
//! ## Overview
//!
//! Laplacian-of-Gaussian filtering at two scales bracketing the requested
//! `sigma` (`sigma - 0.8` and `sigma + 0.8`), followed by zero-crossing
//! extraction on each response and a pixelwise AND of the two crossing
//! maps. Requiring agreement between the scales discards crossings that
//! exist only at one level of smoothing, which is where most of the
//! operator's false positives live.
//!
//! Works per channel, so a 3-channel input yields a 3-channel edge map.

use crate::error::{OpsError, OpsResult};
use crate::filter::convolve;
use crate::kernel::Kernel;
use dip_core::{Image, MAX_LEVEL};
use tracing::debug;

/// Mark sign changes in a filter response.
///
/// A pixel is marked with [`MAX_LEVEL`] when any of the four opposing
/// neighbor pairs (horizontal, vertical, both diagonals) has a strictly
/// negative product. A response that touches zero exactly never produces a
/// crossing through that sample. The one-pixel border stays zero.
pub fn zero_crossings(response: &Image) -> OpsResult<Image> {
    let nr = response.rows();
    let nc = response.cols();
    let mut out = Image::new(nr, nc, response.channels())?;
    for k in 0..response.channels() {
        for i in 1..nr.saturating_sub(1) {
            for j in 1..nc.saturating_sub(1) {
                let pairs = [
                    (response.at(i, j - 1, k), response.at(i, j + 1, k)),
                    (response.at(i - 1, j, k), response.at(i + 1, j, k)),
                    (response.at(i - 1, j - 1, k), response.at(i + 1, j + 1, k)),
                    (response.at(i - 1, j + 1, k), response.at(i + 1, j - 1, k)),
                ];
                if pairs.iter().any(|(a, b)| a * b < 0.0) {
                    *out.at_mut(i, j, k) = MAX_LEVEL;
                }
            }
        }
    }
    Ok(out)
}

/// Two-scale Marr-Hildreth detector.
///
/// `sigma` must exceed 0.8 so the lower scale stays positive. Output pixels
/// are [`MAX_LEVEL`] where both scale responses cross zero, 0 elsewhere.
pub fn marr_hildreth(src: &Image, sigma: f64) -> OpsResult<Image> {
    if !sigma.is_finite() || sigma <= 0.8 {
        return Err(OpsError::Degenerate(format!(
            "marr_hildreth: sigma {sigma} must exceed 0.8 to split scales"
        )));
    }
    debug!(rows = src.rows(), cols = src.cols(), sigma, "marr_hildreth");
    let narrow = convolve(src, &Kernel::laplacian_of_gaussian((sigma - 0.8) as f32)?)?;
    let wide = convolve(src, &Kernel::laplacian_of_gaussian((sigma + 0.8) as f32)?)?;
    let mut out = zero_crossings(&narrow)?;
    let wide_crossings = zero_crossings(&wide)?;
    for (o, &w) in out.data_mut().iter_mut().zip(wide_crossings.data()) {
        if w != MAX_LEVEL {
            *o = 0.0;
        }
    }
    Ok(out)
}
