//! Spatial filtering
//!
//! ## Overview
//!
//! The convolution primitive shared by every kernel-based operation, plus
//! the spatial lowpass family: uniform average, 3x3 binomial smoothing,
//! geometric mean, median, adaptive median, and contraharmonic mean.
//!
//! [`convolve`] is a correlation: the kernel is not flipped, its anchor is
//! `(rows / 2, cols / 2)`, out-of-bounds taps contribute nothing (zero
//! padding), and the result is not renormalized. Each channel is filtered
//! independently.
//!
//! The order-statistic filters (`geometric_mean`, `median`,
//! `adaptive_median`, `contraharmonic_mean`) are single-channel. The first
//! two touch interior pixels only (borders stay zero); the other two clip
//! their windows at the image border and cover every pixel.

use crate::error::{OpsError, OpsResult};
use crate::kernel::Kernel;
use dip_core::Image;
use std::cmp::Ordering;
use tracing::trace;

fn require_gray(name: &str, img: &Image) -> OpsResult<()> {
    if !img.is_gray() {
        return Err(OpsError::Unsupported(format!(
            "{name}: single-channel images only, got {} channels",
            img.channels()
        )));
    }
    Ok(())
}

/// Split a window size into (left/top, right/bottom) radii.
///
/// Odd sizes are symmetric; even sizes extend one step further up-left.
fn split_radii(size: usize) -> (usize, usize) {
    if size % 2 == 1 {
        (size / 2, size / 2)
    } else {
        (size / 2, size / 2 - 1)
    }
}

fn sort_window(window: &mut [f32]) {
    window.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
}

/// Correlate `src` with `kernel`, zero-padded, channel by channel.
pub fn convolve(src: &Image, kernel: &Kernel) -> OpsResult<Image> {
    trace!(
        rows = src.rows(),
        cols = src.cols(),
        channels = src.channels(),
        kernel_rows = kernel.rows,
        kernel_cols = kernel.cols,
        "convolve"
    );
    let (ar, ac) = kernel.anchor();
    let nr = src.rows();
    let nc = src.cols();
    let mut out = Image::new(nr, nc, src.channels())?;
    for i in 0..nr {
        for j in 0..nc {
            for k in 0..src.channels() {
                let mut sum = 0.0f32;
                for m in 0..kernel.rows {
                    for n in 0..kernel.cols {
                        let r = i as isize + m as isize - ar as isize;
                        let c = j as isize + n as isize - ac as isize;
                        if r >= 0 && r < nr as isize && c >= 0 && c < nc as isize {
                            sum += kernel.at(m, n) * src.at(r as usize, c as usize, k);
                        }
                    }
                }
                *out.at_mut(i, j, k) = sum;
            }
        }
    }
    Ok(out)
}

/// Mean filter over a `size x size` window via a uniform kernel.
pub fn average(src: &Image, size: usize) -> OpsResult<Image> {
    let kernel = Kernel::uniform(size)?;
    convolve(src, &kernel)
}

/// Fixed 3x3 binomial smoothing, `[1 2 1; 2 4 2; 1 2 1] / 16`.
pub fn gaussian_smooth(src: &Image) -> OpsResult<Image> {
    convolve(src, &Kernel::binomial3())
}

/// Geometric mean filter over a `size x size` neighborhood.
///
/// The product window spans offsets `[-size/2, size/2)`, exclusive at the
/// upper end, and the result is raised to `1 / size^2`. For `size = 3` that
/// is a 2x2 product under a 1/9 exponent. Border pixels stay zero.
pub fn geometric_mean(src: &Image, size: usize) -> OpsResult<Image> {
    require_gray("geometric_mean", src)?;
    if size == 0 {
        return Err(OpsError::InvalidParameter(
            "geometric_mean window size must be nonzero".to_string(),
        ));
    }
    trace!(rows = src.rows(), cols = src.cols(), size, "geometric_mean");
    let nr = src.rows();
    let nc = src.cols();
    let h = size / 2;
    let exponent = 1.0 / (size * size) as f64;
    let mut out = Image::new(nr, nc, 1)?;
    for i in h..nr.saturating_sub(h) {
        for j in h..nc.saturating_sub(h) {
            let mut prod = 1.0f64;
            for m in (i - h)..(i + h) {
                for n in (j - h)..(j + h) {
                    prod *= src.at(m, n, 0) as f64;
                }
            }
            *out.at_mut(i, j, 0) = prod.powf(exponent) as f32;
        }
    }
    Ok(out)
}

/// Median filter over a `size x size` window.
///
/// Even sizes take one extra row/column above-left per [`split_radii`].
/// Border pixels stay zero.
pub fn median(src: &Image, size: usize) -> OpsResult<Image> {
    require_gray("median", src)?;
    if size == 0 {
        return Err(OpsError::InvalidParameter(
            "median window size must be nonzero".to_string(),
        ));
    }
    trace!(rows = src.rows(), cols = src.cols(), size, "median");
    let nr = src.rows();
    let nc = src.cols();
    let (r1, r2) = split_radii(size);
    let mut out = Image::new(nr, nc, 1)?;
    let mut window = Vec::with_capacity(size * size);
    for i in r1..nr.saturating_sub(r2) {
        for j in r1..nc.saturating_sub(r2) {
            window.clear();
            for m in (i - r1)..=(i + r2) {
                for n in (j - r1)..=(j + r2) {
                    window.push(src.at(m, n, 0));
                }
            }
            sort_window(&mut window);
            *out.at_mut(i, j, 0) = window[size * size / 2];
        }
    }
    Ok(out)
}

/// Adaptive median filter with window growth up to `max_size`.
///
/// Per pixel the window grows from 3 until the window median is strictly
/// between the window extremes (stage A); then the original pixel is kept if
/// it is itself strictly between the extremes, else replaced by the median
/// (stage B). Exhausting the growth outputs the last median. Windows are
/// clipped at the image border.
pub fn adaptive_median(src: &Image, max_size: usize) -> OpsResult<Image> {
    require_gray("adaptive_median", src)?;
    if max_size < 3 {
        return Err(OpsError::InvalidParameter(format!(
            "adaptive_median max window {max_size} must be at least 3"
        )));
    }
    trace!(rows = src.rows(), cols = src.cols(), max_size, "adaptive_median");
    let nr = src.rows();
    let nc = src.cols();
    let mut out = Image::new(nr, nc, 1)?;
    let mut window = Vec::with_capacity(max_size * max_size);
    for i in 0..nr {
        for j in 0..nc {
            let zxy = src.at(i, j, 0);
            let mut masksize = 3usize;
            let mut resolved = false;
            let mut zmed = 0.0f32;
            while masksize <= max_size && !resolved {
                let (r1, r2) = split_radii(masksize);
                window.clear();
                for m in -(r1 as isize)..=(r2 as isize) {
                    for n in -(r1 as isize)..=(r2 as isize) {
                        let r = i as isize + m;
                        let c = j as isize + n;
                        if r >= 0 && r < nr as isize && c >= 0 && c < nc as isize {
                            window.push(src.at(r as usize, c as usize, 0));
                        }
                    }
                }
                sort_window(&mut window);
                let zmin = window[0];
                let zmax = window[window.len() - 1];
                zmed = window[window.len() / 2];
                if zmed > zmin && zmed < zmax {
                    *out.at_mut(i, j, 0) = if zxy > zmin && zxy < zmax { zxy } else { zmed };
                    resolved = true;
                } else {
                    masksize += 1;
                }
            }
            if !resolved {
                *out.at_mut(i, j, 0) = zmed;
            }
        }
    }
    Ok(out)
}

/// Contraharmonic mean filter of order `q` over a window of `+/- radius`.
///
/// Positive `q` suppresses pepper noise, negative `q` salt noise. Windows
/// are clipped at the border. Zero-valued regions drive the denominator to
/// zero for some orders; the IEEE inf/NaN outcome is the algorithm's
/// documented failure mode and is not intercepted.
pub fn contraharmonic_mean(src: &Image, q: f32, radius: usize) -> OpsResult<Image> {
    require_gray("contraharmonic_mean", src)?;
    trace!(rows = src.rows(), cols = src.cols(), q, radius, "contraharmonic_mean");
    let nr = src.rows();
    let nc = src.cols();
    let mut out = Image::new(nr, nc, 1)?;
    for i in 0..nr {
        for j in 0..nc {
            let mut sumn = 0.0f32;
            let mut sumd = 0.0f32;
            for m in -(radius as isize)..=(radius as isize) {
                for n in -(radius as isize)..=(radius as isize) {
                    let r = i as isize + m;
                    let c = j as isize + n;
                    if r >= 0 && r < nr as isize && c >= 0 && c < nc as isize {
                        let v = src.at(r as usize, c as usize, 0);
                        sumn += v.powf(q + 1.0);
                        sumd += v.powf(q);
                    }
                }
            }
            *out.at_mut(i, j, 0) = sumn / sumd;
        }
    }
    Ok(out)
}
