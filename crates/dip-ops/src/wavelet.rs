//! Daubechies-4 wavelet transform
//!
//! ## Overview
//!
//! A single Daubechies 4-tap stage (periodic at the tail), the 1-D cascade
//! [`wt1d`], and the separable 2-D transform [`wt2d`]. The 2-D forward
//! output at level L places the blurred approximation in the top-left
//! `(rows >> L) x (cols >> L)` block, with horizontal-detail, vertical-detail
//! and corner-detail bands around it.
//!
//! Inputs are cropped to the largest power-of-two extent per axis before
//! transforming; the deepest stage must still have at least 4 samples, which
//! bounds the level for a given size. All stage arithmetic runs in `f64`.

use crate::error::{OpsError, OpsResult};
use dip_core::{Image, floor_power_of_two};
use tracing::debug;

const C0: f64 = 0.4829629131445341;
const C1: f64 = 0.8365163037378079;
const C2: f64 = 0.2241438680420134;
const C3: f64 = -0.1294095225512604;

/// One forward stage over `a` (length >= 4, even): smooth coefficients to
/// the first half, detail to the second, with the last pair wrapping around
/// to the head of the signal.
fn daub4_forward(a: &mut [f64], wksp: &mut Vec<f64>) {
    let n = a.len();
    let nh = n / 2;
    wksp.clear();
    wksp.resize(n, 0.0);
    let mut i = 0;
    let mut j = 0;
    while j < n - 3 {
        wksp[i] = C0 * a[j] + C1 * a[j + 1] + C2 * a[j + 2] + C3 * a[j + 3];
        wksp[i + nh] = C3 * a[j] - C2 * a[j + 1] + C1 * a[j + 2] - C0 * a[j + 3];
        i += 1;
        j += 2;
    }
    wksp[i] = C0 * a[n - 2] + C1 * a[n - 1] + C2 * a[0] + C3 * a[1];
    wksp[i + nh] = C3 * a[n - 2] - C2 * a[n - 1] + C1 * a[0] - C0 * a[1];
    a.copy_from_slice(wksp);
}

/// Transpose reconstruction of [`daub4_forward`]; exact because the stage
/// matrix is orthonormal.
fn daub4_inverse(a: &mut [f64], wksp: &mut Vec<f64>) {
    let n = a.len();
    let nh = n / 2;
    wksp.clear();
    wksp.resize(n, 0.0);
    wksp[0] = C2 * a[nh - 1] + C1 * a[n - 1] + C0 * a[0] + C3 * a[nh];
    wksp[1] = C3 * a[nh - 1] - C0 * a[n - 1] + C1 * a[0] - C2 * a[nh];
    let mut j = 2;
    for i in 0..nh - 1 {
        wksp[j] = C2 * a[i] + C1 * a[i + nh] + C0 * a[i + 1] + C3 * a[i + nh + 1];
        wksp[j + 1] = C3 * a[i] - C0 * a[i + nh] + C1 * a[i + 1] - C2 * a[i + nh + 1];
        j += 2;
    }
    a.copy_from_slice(wksp);
}

/// 1-D wavelet transform of a single-row vector.
///
/// The row is cropped to its largest power-of-two prefix (at least 4
/// samples). Forward cascades stages from the full length down to 4;
/// `inverse` runs the mirror schedule from 4 back up.
pub fn wt1d(src: &Image, inverse: bool) -> OpsResult<Image> {
    if !src.is_gray() || src.rows() != 1 {
        return Err(OpsError::InvalidDimensions(format!(
            "wt1d: expected a single-row vector, got {}x{} with {} channels",
            src.rows(),
            src.cols(),
            src.channels()
        )));
    }
    let len = floor_power_of_two(src.cols());
    if len < 4 {
        return Err(OpsError::Degenerate(format!(
            "wt1d: need at least 4 samples, got {}",
            src.cols()
        )));
    }
    if len != src.cols() {
        debug!(from = src.cols(), to = len, "wt1d: cropping to power of two");
    }
    let mut data: Vec<f64> = (0..len).map(|j| src.at(0, j, 0) as f64).collect();
    let mut wksp = Vec::new();
    if inverse {
        let mut n = 4;
        while n <= len {
            daub4_inverse(&mut data[..n], &mut wksp);
            n <<= 1;
        }
    } else {
        let mut n = len;
        while n >= 4 {
            daub4_forward(&mut data[..n], &mut wksp);
            n >>= 1;
        }
    }
    let mut out = Image::new(1, len, 1)?;
    for j in 0..len {
        *out.at_mut(0, j, 0) = data[j] as f32;
    }
    Ok(out)
}

/// 2-D wavelet transform to the given decomposition `level`.
///
/// Rows and columns are cropped to their largest power-of-two extents
/// independently. Each of the `level + 1` iterations runs one stage over
/// the leading extent of every row, then of every column, with both
/// extents halving (forward) or doubling from the deepest stage
/// (`inverse`). The level is rejected when either axis would drop below 4
/// samples at the deepest stage.
pub fn wt2d(src: &Image, level: u32, inverse: bool) -> OpsResult<Image> {
    if !src.is_gray() {
        return Err(OpsError::Unsupported(format!(
            "wt2d: single-channel images only, got {} channels",
            src.channels()
        )));
    }
    let rows = floor_power_of_two(src.rows());
    let cols = floor_power_of_two(src.cols());
    for (name, side) in [("rows", rows), ("cols", cols)] {
        let deepest = side.checked_shr(level).unwrap_or(0);
        if deepest < 4 {
            return Err(OpsError::Degenerate(format!(
                "wt2d: {name} extent {side} cannot support level {level}, \
                 the deepest stage needs 4 samples"
            )));
        }
    }
    if rows != src.rows() || cols != src.cols() {
        debug!(rows, cols, "wt2d: cropping to power-of-two extents");
    }
    debug!(rows, cols, level, inverse, "wt2d");
    let mut plane = vec![0.0f64; rows * cols];
    for i in 0..rows {
        for j in 0..cols {
            plane[i * cols + j] = src.at(i, j, 0) as f64;
        }
    }
    let mut wksp = Vec::new();
    let mut column = Vec::new();
    let schedule: Vec<u32> = if inverse {
        (0..=level).rev().collect()
    } else {
        (0..=level).collect()
    };
    for t in schedule {
        let wc = cols >> t;
        let wr = rows >> t;
        for i in 0..rows {
            let row = &mut plane[i * cols..i * cols + wc];
            if inverse {
                daub4_inverse(row, &mut wksp);
            } else {
                daub4_forward(row, &mut wksp);
            }
        }
        for j in 0..cols {
            column.clear();
            column.extend((0..wr).map(|i| plane[i * cols + j]));
            if inverse {
                daub4_inverse(&mut column, &mut wksp);
            } else {
                daub4_forward(&mut column, &mut wksp);
            }
            for i in 0..wr {
                plane[i * cols + j] = column[i];
            }
        }
    }
    let mut out = Image::new(rows, cols, 1)?;
    for i in 0..rows {
        for j in 0..cols {
            *out.at_mut(i, j, 0) = plane[i * cols + j] as f32;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daub4_stage_round_trip() {
        let original: Vec<f64> = (0..8).map(|v| (v * v) as f64).collect();
        let mut data = original.clone();
        let mut wksp = Vec::new();
        daub4_forward(&mut data, &mut wksp);
        daub4_inverse(&mut data, &mut wksp);
        for (a, b) in data.iter().zip(&original) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_daub4_constant_has_no_detail() {
        let mut data = vec![1.0f64; 8];
        let mut wksp = Vec::new();
        daub4_forward(&mut data, &mut wksp);
        let sqrt2 = std::f64::consts::SQRT_2;
        for s in &data[..4] {
            assert!((s - sqrt2).abs() < 1e-12);
        }
        for d in &data[4..] {
            assert!(d.abs() < 1e-12);
        }
    }

    #[test]
    fn test_wt1d_round_trip() {
        let img = Image::from_data(1, 16, 1, (0..16).map(|v| v as f32).collect()).unwrap();
        let forward = wt1d(&img, false).unwrap();
        let back = wt1d(&forward, true).unwrap();
        for j in 0..16 {
            assert!((back.at(0, j, 0) - img.at(0, j, 0)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_wt1d_crops_and_validates() {
        let img = Image::new(1, 10, 1).unwrap();
        assert_eq!(wt1d(&img, false).unwrap().cols(), 8);
        let short = Image::new(1, 3, 1).unwrap();
        assert!(matches!(wt1d(&short, false), Err(OpsError::Degenerate(_))));
        let matrix = Image::new(2, 8, 1).unwrap();
        assert!(matches!(
            wt1d(&matrix, false),
            Err(OpsError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_wt2d_round_trip_rectangular() {
        let img = Image::from_data(
            8,
            16,
            1,
            (0..128).map(|v| ((v * 7) % 31) as f32).collect(),
        )
        .unwrap();
        let forward = wt2d(&img, 1, false).unwrap();
        let back = wt2d(&forward, 1, true).unwrap();
        for i in 0..8 {
            for j in 0..16 {
                assert!(
                    (back.at(i, j, 0) - img.at(i, j, 0)).abs() < 1e-3,
                    "mismatch at ({i}, {j})"
                );
            }
        }
    }

    #[test]
    fn test_wt2d_constant_concentrates_in_approximation() {
        let img = Image::filled(16, 16, 1, 10.0).unwrap();
        let out = wt2d(&img, 1, false).unwrap();
        // two stages per axis each scale the approximation by sqrt(2)
        assert!((out.at(1, 1, 0) - 40.0).abs() < 1e-3);
        assert!(out.at(1, 12, 0).abs() < 1e-3);
        assert!(out.at(12, 1, 0).abs() < 1e-3);
    }

    #[test]
    fn test_wt2d_depth_validation() {
        let img = Image::new(16, 16, 1).unwrap();
        assert!(wt2d(&img, 2, false).is_ok());
        assert!(matches!(wt2d(&img, 3, false), Err(OpsError::Degenerate(_))));
        let color = Image::new(16, 16, 3).unwrap();
        assert!(matches!(
            wt2d(&color, 1, false),
            Err(OpsError::Unsupported(_))
        ));
    }
}
