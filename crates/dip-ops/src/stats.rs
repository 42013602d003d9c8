//! Image quality metrics
//!
//! Root-mean-square error and peak signal-to-noise ratio over
//! single-channel pairs of matching shape. The PSNR here is the ratio form
//! `10 log10((MAX_LEVEL - 1) / rmse)`; identical inputs drive it to
//! positive infinity through the zero denominator.

use crate::error::{OpsError, OpsResult};
use dip_core::{Image, MAX_LEVEL};
use tracing::trace;

fn check_pair(a: &Image, b: &Image) -> OpsResult<()> {
    if !a.is_gray() || !b.is_gray() {
        return Err(OpsError::Unsupported(format!(
            "metrics compare single-channel images, got {} and {} channels",
            a.channels(),
            b.channels()
        )));
    }
    if a.rows() != b.rows() || a.cols() != b.cols() {
        return Err(OpsError::SizeMismatch(format!(
            "metrics need matching shapes, got {}x{} and {}x{}",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    Ok(())
}

/// Root-mean-square error between two single-channel images.
pub fn rmse(a: &Image, b: &Image) -> OpsResult<f32> {
    check_pair(a, b)?;
    trace!(rows = a.rows(), cols = a.cols(), "rmse");
    let n = (a.rows() * a.cols()) as f64;
    let sum: f64 = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| ((x - y) as f64).powi(2))
        .sum();
    Ok((sum / n).sqrt() as f32)
}

/// Peak signal-to-noise ratio between two single-channel images, in dB.
pub fn psnr(a: &Image, b: &Image) -> OpsResult<f32> {
    let err = rmse(a, b)?;
    Ok(10.0 * ((MAX_LEVEL - 1.0) / err).log10())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identical_images() {
        let img = Image::from_data(2, 2, 1, vec![10.0, 20.0, 30.0, 40.0]).unwrap();
        assert_eq!(rmse(&img, &img).unwrap(), 0.0);
        assert!(psnr(&img, &img).unwrap().is_infinite());
    }

    #[test]
    fn test_unit_offset() {
        let a = Image::new(2, 2, 1).unwrap();
        let b = Image::filled(2, 2, 1, 1.0).unwrap();
        assert_relative_eq!(rmse(&a, &b).unwrap(), 1.0);
        // 10 log10(254)
        assert_relative_eq!(psnr(&a, &b).unwrap(), 24.04834, max_relative = 1e-5);
    }

    #[test]
    fn test_mixed_differences() {
        let a = Image::from_data(2, 2, 1, vec![10.0, 20.0, 30.0, 40.0]).unwrap();
        let b = Image::from_data(2, 2, 1, vec![12.0, 18.0, 33.0, 36.0]).unwrap();
        // sqrt((4 + 4 + 9 + 16) / 4)
        assert_relative_eq!(rmse(&a, &b).unwrap(), 8.25f32.sqrt(), max_relative = 1e-6);
    }

    #[test]
    fn test_pair_validation() {
        let a = Image::new(2, 2, 1).unwrap();
        let b = Image::new(2, 3, 1).unwrap();
        let c = Image::new(2, 2, 3).unwrap();
        assert!(matches!(rmse(&a, &b), Err(OpsError::SizeMismatch(_))));
        assert!(matches!(psnr(&a, &c), Err(OpsError::Unsupported(_))));
    }
}
