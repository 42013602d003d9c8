//! Hough transform for straight lines
//!
//! ## Overview
//!
//! Votes every foreground pixel of a single-channel edge map into a polar
//! `(theta, rho)` accumulator. The parameterization measures `rho` from the
//! bottom-left corner, `rho = (rows - i) cos(theta) + j sin(theta)`, with
//! `theta` swept over whole degrees `0..360` and `rho` truncated to its
//! integer bin. Votes that fall outside `[0, max_rho]` are discarded, so
//! each line is represented once with a nonnegative offset.
//!
//! The input map is read-only; inspect the returned [`HoughMap`] for peaks.

use crate::error::{OpsError, OpsResult};
use dip_core::Image;
use tracing::debug;

/// Number of angular bins, one per whole degree.
const THETA_BINS: usize = 360;

/// Vote accumulator produced by [`hough_lines`].
#[derive(Debug, Clone)]
pub struct HoughMap {
    accumulator: Image,
}

impl HoughMap {
    /// Accumulator image: [`THETA_BINS`] rows and `max_rho + 1` columns,
    /// vote counts as samples.
    pub fn accumulator(&self) -> &Image {
        &self.accumulator
    }

    /// Strongest line as `(theta_degrees, rho, votes)`.
    ///
    /// Ties resolve to the earliest bin in theta-major scan order. An
    /// accumulator with no votes reports `(0, 0, 0.0)`.
    pub fn peak(&self) -> (usize, usize, f32) {
        let mut best = (0, 0, self.accumulator.at(0, 0, 0));
        for theta in 0..self.accumulator.rows() {
            for rho in 0..self.accumulator.cols() {
                let votes = self.accumulator.at(theta, rho, 0);
                if votes > best.2 {
                    best = (theta, rho, votes);
                }
            }
        }
        best
    }
}

/// Accumulate line votes from a single-channel edge map.
///
/// Every pixel with a nonzero sample votes once per angular bin; the rho
/// axis spans `0..=max_rho` with `max_rho = floor(sqrt(rows^2 + cols^2))`.
pub fn hough_lines(src: &Image) -> OpsResult<HoughMap> {
    if !src.is_gray() {
        return Err(OpsError::Unsupported(format!(
            "hough_lines: single-channel images only, got {} channels",
            src.channels()
        )));
    }
    let rows = src.rows();
    let cols = src.cols();
    let max_rho = ((rows * rows + cols * cols) as f64).sqrt() as usize;
    let angles: Vec<(f64, f64)> = (0..THETA_BINS)
        .map(|deg| (deg as f64).to_radians().sin_cos())
        .collect();
    let mut accumulator = Image::new(THETA_BINS, max_rho + 1, 1)?;
    for i in 0..rows {
        for j in 0..cols {
            if src.at(i, j, 0) == 0.0 {
                continue;
            }
            for (theta, &(sin, cos)) in angles.iter().enumerate() {
                let rho = ((rows - i) as f64 * cos + j as f64 * sin) as i64;
                if rho < 0 || rho > max_rho as i64 {
                    continue;
                }
                *accumulator.at_mut(theta, rho as usize, 0) += 1.0;
            }
        }
    }
    debug!(rows, cols, max_rho, "hough_lines");
    Ok(HoughMap { accumulator })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_line(rows: usize, cols: usize, col: usize) -> Image {
        let mut img = Image::new(rows, cols, 1).unwrap();
        for i in 0..rows {
            *img.at_mut(i, col, 0) = 200.0;
        }
        img
    }

    #[test]
    fn test_accumulator_shape() {
        let img = Image::new(16, 16, 1).unwrap();
        let map = hough_lines(&img).unwrap();
        // max_rho = floor(sqrt(512)) = 22
        assert_eq!(map.accumulator().rows(), 360);
        assert_eq!(map.accumulator().cols(), 23);
        assert_eq!(map.peak(), (0, 0, 0.0));
    }

    #[test]
    fn test_horizontal_line_peak() {
        let mut img = Image::new(16, 16, 1).unwrap();
        for j in 0..16 {
            *img.at_mut(5, j, 0) = 255.0;
        }
        let map = hough_lines(&img).unwrap();
        // at theta = 0 every pixel of row 5 lands in rho = 16 - 5
        assert_eq!(map.peak(), (0, 11, 16.0));
    }

    #[test]
    fn test_vertical_line_votes() {
        let img = vertical_line(16, 16, 5);
        let map = hough_lines(&img).unwrap();
        // at theta = 90 the column collapses onto rho = j
        assert_eq!(map.accumulator().at(90, 5, 0), 16.0);
        assert_eq!(map.peak().2, 16.0);
    }

    #[test]
    fn test_negative_rho_discarded() {
        let mut img = Image::new(16, 16, 1).unwrap();
        *img.at_mut(0, 0, 0) = 255.0;
        let map = hough_lines(&img).unwrap();
        assert_eq!(map.accumulator().at(0, 16, 0), 1.0);
        let upper_row: f32 = (0..map.accumulator().cols())
            .map(|r| map.accumulator().at(180, r, 0))
            .sum();
        assert_eq!(upper_row, 0.0);
    }

    #[test]
    fn test_input_left_untouched() {
        let img = vertical_line(8, 8, 3);
        let before = img.data().to_vec();
        hough_lines(&img).unwrap();
        assert_eq!(img.data(), before.as_slice());
    }

    #[test]
    fn test_rejects_color() {
        let img = Image::new(8, 8, 3).unwrap();
        assert!(matches!(hough_lines(&img), Err(OpsError::Unsupported(_))));
    }
}
