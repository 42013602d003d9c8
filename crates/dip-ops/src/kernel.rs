//! Convolution kernels
//!
//! ## Overview
//!
//! [`Kernel`] is a small rectangular coefficient grid consumed by
//! [`crate::filter::convolve`]. Constructors cover the Gaussian family used
//! by the edge detectors (smoothing, first derivatives, Laplacian) and the
//! fixed smoothing masks of the spatial lowpass filters.
//!
//! Gaussian-family kernels use support radius `round(3 * sqrt(2) * sigma)`
//! and are deliberately unnormalized: coefficients are the sampled continuous
//! formulas, with no post-hoc rescaling of the truncated sum.
//!
//! ## Used By
//!
//! - `filter`: convolution and the lowpass family
//! - `canny`, `marr`: smoothing and derivative kernels

use crate::error::{OpsError, OpsResult};
use std::f32::consts::PI;

/// A rectangular convolution kernel.
///
/// Coefficients are row-major. The anchor sits at `(rows / 2, cols / 2)` in
/// integer division, so even-sized kernels bias toward the upper-left.
#[derive(Debug, Clone)]
pub struct Kernel {
    /// Coefficients, row-major.
    pub data: Vec<f32>,
    /// Kernel height.
    pub rows: usize,
    /// Kernel width.
    pub cols: usize,
}

impl Kernel {
    /// Create a kernel from raw coefficients.
    pub fn new(data: Vec<f32>, rows: usize, cols: usize) -> OpsResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(OpsError::InvalidParameter(format!(
                "kernel dimensions must be nonzero, got {rows}x{cols}"
            )));
        }
        if data.len() != rows * cols {
            return Err(OpsError::InvalidParameter(format!(
                "kernel data length {} does not match {rows}x{cols}",
                data.len()
            )));
        }
        Ok(Self { data, rows, cols })
    }

    /// Coefficient at `(row, col)`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    /// Anchor coordinate, `(rows / 2, cols / 2)`.
    #[inline]
    pub fn anchor(&self) -> (usize, usize) {
        (self.rows / 2, self.cols / 2)
    }

    fn support_radius(sigma: f32) -> isize {
        (3.0 * std::f32::consts::SQRT_2 * sigma).round() as isize
    }

    fn check_sigma(name: &str, sigma: f32) -> OpsResult<()> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(OpsError::Degenerate(format!(
                "{name} sigma {sigma} must be positive and finite"
            )));
        }
        Ok(())
    }

    /// 2-D Gaussian smoothing kernel, `(1 / 2*pi*sigma^2) * exp(-r^2 / 2*sigma^2)`.
    pub fn gaussian(sigma: f32) -> OpsResult<Self> {
        Self::check_sigma("gaussian", sigma)?;
        let radius = Self::support_radius(sigma);
        let size = (2 * radius + 1) as usize;
        let norm = 1.0 / (2.0 * PI * sigma * sigma);
        let mut data = Vec::with_capacity(size * size);
        for i in -radius..=radius {
            for j in -radius..=radius {
                let r2 = (i * i + j * j) as f32;
                data.push(norm * (-r2 / (2.0 * sigma * sigma)).exp());
            }
        }
        Self::new(data, size, size)
    }

    /// Horizontal derivative-of-Gaussian kernel.
    pub fn gaussian_deriv_x(sigma: f32) -> OpsResult<Self> {
        Self::check_sigma("gaussian_deriv_x", sigma)?;
        let radius = Self::support_radius(sigma);
        let size = (2 * radius + 1) as usize;
        let norm = 1.0 / (2.0 * PI * sigma.powi(4));
        let mut data = Vec::with_capacity(size * size);
        for i in -radius..=radius {
            for j in -radius..=radius {
                let r2 = (i * i + j * j) as f32;
                data.push(-(j as f32) * norm * (-r2 / (2.0 * sigma * sigma)).exp());
            }
        }
        Self::new(data, size, size)
    }

    /// Vertical derivative-of-Gaussian kernel.
    pub fn gaussian_deriv_y(sigma: f32) -> OpsResult<Self> {
        Self::check_sigma("gaussian_deriv_y", sigma)?;
        let radius = Self::support_radius(sigma);
        let size = (2 * radius + 1) as usize;
        let norm = 1.0 / (2.0 * PI * sigma.powi(4));
        let mut data = Vec::with_capacity(size * size);
        for i in -radius..=radius {
            for j in -radius..=radius {
                let r2 = (i * i + j * j) as f32;
                data.push(-(i as f32) * norm * (-r2 / (2.0 * sigma * sigma)).exp());
            }
        }
        Self::new(data, size, size)
    }

    /// Laplacian-of-Gaussian kernel, `(1 / pi*sigma^4) * (t - 1) * exp(-t)`
    /// with `t = r^2 / 2*sigma^2`.
    pub fn laplacian_of_gaussian(sigma: f32) -> OpsResult<Self> {
        Self::check_sigma("laplacian_of_gaussian", sigma)?;
        let radius = Self::support_radius(sigma);
        let size = (2 * radius + 1) as usize;
        let norm = 1.0 / (PI * sigma.powi(4));
        let mut data = Vec::with_capacity(size * size);
        for i in -radius..=radius {
            for j in -radius..=radius {
                let t = (i * i + j * j) as f32 / (2.0 * sigma * sigma);
                data.push(norm * (t - 1.0) * (-t).exp());
            }
        }
        Self::new(data, size, size)
    }

    /// Uniform averaging kernel, every coefficient `1 / size^2`.
    pub fn uniform(size: usize) -> OpsResult<Self> {
        if size == 0 {
            return Err(OpsError::InvalidParameter(
                "uniform kernel size must be nonzero".to_string(),
            ));
        }
        let w = 1.0 / (size * size) as f32;
        Self::new(vec![w; size * size], size, size)
    }

    /// Fixed 3x3 binomial smoothing kernel, `[1 2 1; 2 4 2; 1 2 1] / 16`.
    pub fn binomial3() -> Self {
        let data = [1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0];
        Self {
            data: data.iter().map(|v| v / 16.0).collect(),
            rows: 3,
            cols: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates() {
        assert!(Kernel::new(vec![1.0; 9], 3, 3).is_ok());
        assert!(Kernel::new(vec![1.0; 8], 3, 3).is_err());
        assert!(Kernel::new(vec![], 0, 3).is_err());
    }

    #[test]
    fn test_anchor() {
        let odd = Kernel::new(vec![0.0; 9], 3, 3).unwrap();
        assert_eq!(odd.anchor(), (1, 1));
        let even = Kernel::new(vec![0.0; 16], 4, 4).unwrap();
        assert_eq!(even.anchor(), (2, 2));
    }

    #[test]
    fn test_gaussian_shape() {
        let k = Kernel::gaussian(1.0).unwrap();
        // radius = round(3 * sqrt(2)) = 4
        assert_eq!(k.rows, 9);
        assert_eq!(k.cols, 9);
        let center = k.at(4, 4);
        assert!((center - 1.0 / (2.0 * PI)).abs() < 1e-6);
        // symmetric and decreasing away from center
        assert!((k.at(4, 3) - k.at(4, 5)).abs() < 1e-7);
        assert!(k.at(4, 5) < center);
    }

    #[test]
    fn test_gaussian_rejects_bad_sigma() {
        assert!(Kernel::gaussian(0.0).is_err());
        assert!(Kernel::gaussian(-1.0).is_err());
        assert!(Kernel::gaussian(f32::NAN).is_err());
    }

    #[test]
    fn test_deriv_kernels_antisymmetric() {
        let kx = Kernel::gaussian_deriv_x(1.0).unwrap();
        let (ar, ac) = kx.anchor();
        assert_eq!(kx.at(ar, ac), 0.0);
        assert!((kx.at(ar, ac + 1) + kx.at(ar, ac - 1)).abs() < 1e-7);
        // left side positive under the -j convention
        assert!(kx.at(ar, ac - 1) > 0.0);

        let ky = Kernel::gaussian_deriv_y(1.0).unwrap();
        assert!((ky.at(ar + 1, ac) + ky.at(ar - 1, ac)).abs() < 1e-7);
        // transpose relationship between the two derivative kernels
        assert!((ky.at(ar + 2, ac) - kx.at(ar, ac + 2)).abs() < 1e-7);
    }

    #[test]
    fn test_log_center_value() {
        let sigma = 1.5;
        let k = Kernel::laplacian_of_gaussian(sigma).unwrap();
        let (ar, ac) = k.anchor();
        let expected = -1.0 / (PI * sigma.powi(4));
        assert!((k.at(ar, ac) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_and_binomial_sum_to_one() {
        let u = Kernel::uniform(5).unwrap();
        let sum: f32 = u.data.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);

        let b = Kernel::binomial3();
        let sum: f32 = b.data.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }
}
