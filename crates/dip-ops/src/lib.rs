//! # dip-ops
//!
//! Numeric image operations over [`dip_core::Image`] buffers.
//!
//! This crate collects the classical processing toolbox: spatial filtering,
//! a radix-2 FFT with a frequency-domain filter bank, two edge detectors,
//! binary and grayscale morphology, the Daubechies-4 wavelet transform, a
//! Hough line accumulator, seeded noise synthesis, and quality metrics.
//!
//! # Modules
//!
//! - [`kernel`] - Convolution kernel constructors (Gaussian family)
//! - [`filter`] - Spatial smoothing and order-statistic filters
//! - [`fft`] - Radix-2 FFT/IFFT over square power-of-two images
//! - [`freq`] - Frequency-domain filters (ideal, Butterworth, Gaussian, Wiener)
//! - [`canny`] - Canny edge detection pipeline
//! - [`marr`] - Marr-Hildreth zero-crossing detector
//! - [`morph`] - Dilation, erosion, opening and closing
//! - [`wavelet`] - Daubechies-4 wavelet transform
//! - [`hough`] - Straight-line Hough transform
//! - [`noise`] - Deterministic Gaussian noise
//! - [`stats`] - RMSE and PSNR metrics
//!
//! # Common Operations
//!
//! ## Smoothing
//!
//! ```rust,ignore
//! use dip_ops::filter;
//!
//! let softened = filter::average(&image, 5)?;
//! let despeckled = filter::median(&image, 3)?;
//! ```
//!
//! ## Edges
//!
//! ```rust,ignore
//! use dip_ops::{canny, marr};
//!
//! let edges = canny::canny(&image, 2.0)?;
//! let crossings = marr::marr_hildreth(&image, 3.0)?;
//! ```
//!
//! ## Frequency domain
//!
//! ```rust,ignore
//! use dip_ops::freq::{self, PassBand};
//!
//! let softened = freq::gaussian(&image, 24.0, PassBand::Low)?;
//! let restored = freq::wiener(&blurred, 0.01, 4.0)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod canny;
pub mod error;
pub mod fft;
pub mod filter;
pub mod freq;
pub mod hough;
pub mod kernel;
pub mod marr;
pub mod morph;
pub mod noise;
pub mod stats;
pub mod wavelet;

pub use error::{OpsError, OpsResult};
pub use fft::Spectrum;
pub use freq::PassBand;
pub use hough::HoughMap;
pub use kernel::Kernel;
pub use morph::{MorphStyle, StructuringElement};
