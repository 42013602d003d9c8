//! Two-dimensional radix-2 Fourier transform
//!
//! ## Overview
//!
//! Separable Cooley-Tukey FFT over square, power-of-two, single-channel
//! images. The forward transform premultiplies samples by `(-1)^(i+j)` so
//! the DC term lands at the center of the output planes, and returns the
//! spectrum in polar form as a magnitude and a phase image. The inverse
//! transform rebuilds real/imaginary parts from the polar planes through a
//! tangent ratio, runs the conjugate transform, and emits the magnitude of
//! the result divided by `N^2`, which also strips the centering factor.
//!
//! The polar representation is what the frequency-domain filters in
//! [`crate::freq`] operate on: they scale magnitude and leave phase alone.
//!
//! All arithmetic runs in `f64` scratch planes; only the stored planes are
//! `f32`.
//!
//! ## Usage
//!
//! ```ignore
//! use dip_ops::fft::{fft, ifft};
//!
//! let spectrum = fft(&img)?;
//! // ... scale spectrum.magnitude ...
//! let restored = ifft(&spectrum)?;
//! ```

use crate::error::{OpsError, OpsResult};
use dip_core::Image;
use std::f64::consts::{FRAC_PI_2, PI};
use tracing::{debug, trace};

const FORWARD: f64 = 1.0;
const INVERSE: f64 = -1.0;

/// Polar frequency-domain representation of a single-channel image.
///
/// Both planes share the side length of the transformed image and are DC
/// centered. Phase is in radians, `(-pi, pi]`.
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Magnitude plane.
    pub magnitude: Image,
    /// Phase plane in radians.
    pub phase: Image,
}

impl Spectrum {
    /// Side length of the square planes.
    pub fn side(&self) -> usize {
        self.magnitude.rows()
    }
}

fn check_transform_input(img: &Image, name: &str) -> OpsResult<usize> {
    if !img.is_gray() {
        return Err(OpsError::Unsupported(format!(
            "{name}: single-channel images only, got {} channels",
            img.channels()
        )));
    }
    if img.rows() != img.cols() {
        return Err(OpsError::InvalidDimensions(format!(
            "{name}: image must be square, got {}x{}",
            img.rows(),
            img.cols()
        )));
    }
    if !img.rows().is_power_of_two() {
        return Err(OpsError::InvalidDimensions(format!(
            "{name}: side must be a power of two, got {}",
            img.rows()
        )));
    }
    Ok(img.rows())
}

/// Bit-reversal permutation for a transform of length `n`.
///
/// Built by the halving recurrence: each stage appends the existing entries
/// offset by the current half-length.
fn bit_reversal_table(n: usize) -> Vec<usize> {
    let stages = n.trailing_zeros();
    let mut loc = vec![0usize; n];
    let mut k = 1;
    let mut m = 1;
    let mut half = n / 2;
    for _ in 0..stages {
        for _ in 0..m {
            loc[k] = loc[k - m] + half;
            k += 1;
        }
        m <<= 1;
        half >>= 1;
    }
    loc
}

/// In-place Danielson-Lanczos pass over bit-reverse-loaded data.
///
/// `scale` is [`FORWARD`] or [`INVERSE`] and flips the sign of the twiddle
/// exponent. No normalization is applied in either direction.
fn butterfly(re: &mut [f64], im: &mut [f64], scale: f64) {
    let len = re.len();
    let mut half = 1usize;
    while half < len {
        for q in 0..half {
            let theta = PI * q as f64 / half as f64;
            let (sin_t, cos_t) = theta.sin_cos();
            let mut k = q;
            while k + half < len {
                let tr = re[k + half] * cos_t + im[k + half] * sin_t * scale;
                let ti = -re[k + half] * sin_t * scale + im[k + half] * cos_t;
                re[k + half] = re[k] - tr;
                re[k] += tr;
                im[k + half] = im[k] - ti;
                im[k] += ti;
                k += 2 * half;
            }
        }
        half <<= 1;
    }
}

/// Forward 2-D FFT of a square, power-of-two, single-channel image.
///
/// Returns the DC-centered polar spectrum.
pub fn fft(src: &Image) -> OpsResult<Spectrum> {
    let n = check_transform_input(src, "fft")?;
    debug!(side = n, "fft");
    let loc = bit_reversal_table(n);
    let mut re = vec![0.0f64; n * n];
    let mut im = vec![0.0f64; n * n];
    let mut line_re = vec![0.0f64; n];
    let mut line_im = vec![0.0f64; n];

    // row transforms, with the centering sign folded into the reorder
    for i in 0..n {
        for j in 0..n {
            let sign = if loc[j] % 2 == 0 { 1.0 } else { -1.0 };
            line_re[j] = src.at(i, loc[j], 0) as f64 * sign;
            line_im[j] = 0.0;
        }
        butterfly(&mut line_re, &mut line_im, FORWARD);
        for j in 0..n {
            re[i * n + j] = line_re[j];
            im[i * n + j] = line_im[j];
        }
    }

    // column transforms over the row-transformed planes
    for j in 0..n {
        for i in 0..n {
            let sign = if loc[i] % 2 == 0 { 1.0 } else { -1.0 };
            line_re[i] = re[loc[i] * n + j] * sign;
            line_im[i] = im[loc[i] * n + j] * sign;
        }
        butterfly(&mut line_re, &mut line_im, FORWARD);
        for i in 0..n {
            re[i * n + j] = line_re[i];
            im[i * n + j] = line_im[i];
        }
    }

    let mut magnitude = Image::new(n, n, 1)?;
    let mut phase = Image::new(n, n, 1)?;
    for i in 0..n {
        for j in 0..n {
            let r = re[i * n + j];
            let m = im[i * n + j];
            *magnitude.at_mut(i, j, 0) = (r * r + m * m).sqrt() as f32;
            *phase.at_mut(i, j, 0) = m.atan2(r) as f32;
        }
    }
    trace!(side = n, "fft done");
    Ok(Spectrum { magnitude, phase })
}

/// Inverse 2-D FFT of a polar spectrum.
///
/// The output pixel is the magnitude of the inverse transform divided by
/// `N^2`, so sign information in the restored signal is discarded. Phase
/// values outside `(-pi, pi]` are wrapped back by one turn before use;
/// composed phases from upstream arithmetic can leave the principal range.
pub fn ifft(spectrum: &Spectrum) -> OpsResult<Image> {
    let mag = &spectrum.magnitude;
    let ph = &spectrum.phase;
    if mag.rows() != ph.rows() || mag.cols() != ph.cols() {
        return Err(OpsError::SizeMismatch(format!(
            "ifft: magnitude {}x{} and phase {}x{} differ",
            mag.rows(),
            mag.cols(),
            ph.rows(),
            ph.cols()
        )));
    }
    let n = check_transform_input(mag, "ifft")?;
    check_transform_input(ph, "ifft")?;
    debug!(side = n, "ifft");
    let loc = bit_reversal_table(n);
    let mut re = vec![0.0f64; n * n];
    let mut im = vec![0.0f64; n * n];
    let mut line_re = vec![0.0f64; n];
    let mut line_im = vec![0.0f64; n];

    // row transforms; rebuild re/im from the polar planes through tan
    for i in 0..n {
        for j in 0..n {
            let m = mag.at(i, loc[j], 0) as f64;
            let mut p = ph.at(i, loc[j], 0) as f64;
            if p > PI {
                p -= 2.0 * PI;
            }
            if p < -PI {
                p += 2.0 * PI;
            }
            let t = p.tan();
            let mut r = (m * m / (1.0 + t * t)).sqrt();
            if p > FRAC_PI_2 || p < -FRAC_PI_2 {
                r = -r;
            }
            line_re[j] = r;
            line_im[j] = r * t;
        }
        butterfly(&mut line_re, &mut line_im, INVERSE);
        for j in 0..n {
            re[i * n + j] = line_re[j];
            im[i * n + j] = line_im[j];
        }
    }

    // column transforms, plain reorder this time
    for j in 0..n {
        for i in 0..n {
            line_re[i] = re[loc[i] * n + j];
            line_im[i] = im[loc[i] * n + j];
        }
        butterfly(&mut line_re, &mut line_im, INVERSE);
        for i in 0..n {
            re[i * n + j] = line_re[i];
            im[i * n + j] = line_im[i];
        }
    }

    let norm = (n * n) as f64;
    let mut out = Image::new(n, n, 1)?;
    for i in 0..n {
        for j in 0..n {
            let r = re[i * n + j];
            let m = im[i * n + j];
            *out.at_mut(i, j, 0) = ((r * r + m * m).sqrt() / norm) as f32;
        }
    }
    trace!(side = n, "ifft done");
    Ok(out)
}
