//! In-memory image buffer
//!
//! ## Overview
//!
//! [`Image`] is a dense, row-major, channel-interleaved grid of `f32`
//! samples: 1 channel for grayscale and derived numeric images (gradient
//! magnitudes, spectra, edge maps), 3 for color. Every numeric operation in
//! the workspace reads and writes through this type.
//!
//! Two access paths are provided deliberately. [`Image::get`] /
//! [`Image::set`] are bounds-checked and return [`Result`]; [`Image::at`] /
//! [`Image::at_mut`] assert bounds only in debug builds and are meant for
//! inner loops that have already validated their ranges. Cloning deep-copies
//! the sample storage; two buffers never alias.
//!
//! ## Usage
//!
//! ```ignore
//! use dip_core::Image;
//!
//! let mut img = Image::new(64, 64, 1)?;
//! img.set(10, 10, 0, 255.0)?;
//! let bright = img.add_scalar(16.0);
//! ```
//!
//! ## Dependencies
//!
//! - `error`: validation failures
//!
//! ## Used By
//!
//! - `dip-ops`: every operation
//! - `dip-io`: decode target / encode source

use crate::error::{Error, Result};

/// Bits per intensity level.
pub const BIT_DEPTH: u32 = 8;

/// Largest representable intensity, `2^BIT_DEPTH - 1`.
pub const MAX_LEVEL: f32 = 255.0;

/// Number of discrete intensity levels, used for histogram sizing.
pub const LEVELS: usize = 256;

/// Sample provenance tag.
///
/// Records whether a buffer originated from binary-coded or text-coded
/// samples. The numeric core ignores it beyond bookkeeping; channel count is
/// what drives behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    /// Binary-coded samples.
    #[default]
    Raw,
    /// Text-coded samples.
    Ascii,
}

/// Dense row-major multi-channel `f32` image.
///
/// Sample `(row, col, channel)` lives at index
/// `(row * cols + col) * channels + channel`. Constructed zero-initialized;
/// `Clone` performs a full deep copy.
#[derive(Debug, Clone)]
pub struct Image {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
    channels: usize,
    format: SampleFormat,
}

impl Image {
    /// Create a zero-initialized image.
    ///
    /// Rejects zero dimensions and channel counts other than 1 or 3; an
    /// element count that overflows `usize` or cannot be allocated surfaces
    /// as [`Error::AllocationFailed`].
    pub fn new(rows: usize, cols: usize, channels: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::invalid_dimensions(
                rows,
                cols,
                "row and column counts must be nonzero",
            ));
        }
        if channels != 1 && channels != 3 {
            return Err(Error::invalid_dimensions(
                rows,
                cols,
                format!("channel count must be 1 or 3, got {channels}"),
            ));
        }
        let len = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| {
                Error::allocation_failed(usize::MAX, "sample count overflows usize")
            })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::allocation_failed(len, "sample buffer allocation failed"))?;
        data.resize(len, 0.0);
        Ok(Self {
            data,
            rows,
            cols,
            channels,
            format: SampleFormat::default(),
        })
    }

    /// Create an image from existing samples.
    ///
    /// `data.len()` must equal `rows * cols * channels`.
    pub fn from_data(rows: usize, cols: usize, channels: usize, data: Vec<f32>) -> Result<Self> {
        let mut img = Self::new(rows, cols, channels)?;
        if data.len() != img.data.len() {
            return Err(Error::invalid_dimensions(
                rows,
                cols,
                format!("expected {} samples, got {}", img.data.len(), data.len()),
            ));
        }
        img.data = data;
        Ok(img)
    }

    /// Create an image with every sample set to `value`.
    pub fn filled(rows: usize, cols: usize, channels: usize, value: f32) -> Result<Self> {
        let mut img = Self::new(rows, cols, channels)?;
        img.data.fill(value);
        Ok(img)
    }

    /// Row count (image height).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count (image width).
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Channel count (1 or 3).
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// True for single-channel images.
    #[inline]
    pub fn is_gray(&self) -> bool {
        self.channels == 1
    }

    /// Sample provenance tag.
    #[inline]
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Replace the sample provenance tag.
    pub fn set_format(&mut self, format: SampleFormat) {
        self.format = format;
    }

    /// Flat read-only view of the sample storage.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Flat mutable view of the sample storage.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    fn index(&self, row: usize, col: usize, channel: usize) -> usize {
        (row * self.cols + col) * self.channels + channel
    }

    /// Fast sample read.
    ///
    /// Bounds are `debug_assert!`ed; release builds trap through slice
    /// indexing only when the flattened index escapes the buffer. Use
    /// [`Image::get`] when indices are not already validated.
    #[inline]
    pub fn at(&self, row: usize, col: usize, channel: usize) -> f32 {
        debug_assert!(row < self.rows && col < self.cols && channel < self.channels);
        self.data[self.index(row, col, channel)]
    }

    /// Fast mutable sample access. Same contract as [`Image::at`].
    #[inline]
    pub fn at_mut(&mut self, row: usize, col: usize, channel: usize) -> &mut f32 {
        debug_assert!(row < self.rows && col < self.cols && channel < self.channels);
        let idx = self.index(row, col, channel);
        &mut self.data[idx]
    }

    /// Bounds-checked sample read.
    pub fn get(&self, row: usize, col: usize, channel: usize) -> Result<f32> {
        if row >= self.rows || col >= self.cols || channel >= self.channels {
            return Err(Error::out_of_bounds(
                row,
                col,
                channel,
                self.rows,
                self.cols,
                self.channels,
            ));
        }
        Ok(self.data[self.index(row, col, channel)])
    }

    /// Bounds-checked sample write.
    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: f32) -> Result<()> {
        if row >= self.rows || col >= self.cols || channel >= self.channels {
            return Err(Error::out_of_bounds(
                row,
                col,
                channel,
                self.rows,
                self.cols,
                self.channels,
            ));
        }
        let idx = self.index(row, col, channel);
        self.data[idx] = value;
        Ok(())
    }

    /// Read-only slice of one row, all channels interleaved.
    ///
    /// Bounds are `debug_assert!`ed like [`Image::at`].
    #[inline]
    pub fn row(&self, row: usize) -> &[f32] {
        debug_assert!(row < self.rows);
        let stride = self.cols * self.channels;
        &self.data[row * stride..(row + 1) * stride]
    }

    /// Mutable slice of one row, all channels interleaved.
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        debug_assert!(row < self.rows);
        let stride = self.cols * self.channels;
        &mut self.data[row * stride..(row + 1) * stride]
    }

    /// Set every sample to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Elementwise transform into a new buffer of the same shape.
    pub fn map<F>(&self, f: F) -> Image
    where
        F: Fn(f32) -> f32,
    {
        let mut out = self.clone();
        for v in &mut out.data {
            *v = f(*v);
        }
        out
    }

    /// Smallest sample value across all channels.
    pub fn min(&self) -> f32 {
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Largest sample value across all channels.
    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Linear map of the sample range `[min, max]` onto `[lo, hi]`.
    ///
    /// A constant image (max == min) maps every sample to `lo`.
    pub fn rescaled(&self, lo: f32, hi: f32) -> Image {
        let min = self.min();
        let max = self.max();
        if max == min {
            return self.map(|_| lo);
        }
        let t = (hi - lo) / (max - min);
        self.map(|v| lo + (v - min) * t)
    }

    /// Transposed copy of a single-channel image.
    pub fn transpose(&self) -> Result<Image> {
        if self.channels != 1 {
            return Err(Error::channel_mismatch(1, self.channels));
        }
        let mut out = Image::new(self.cols, self.rows, 1)?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                *out.at_mut(j, i, 0) = self.at(i, j, 0);
            }
        }
        Ok(out)
    }

    /// Rectangular sub-image copy.
    pub fn crop(&self, row0: usize, col0: usize, rows: usize, cols: usize) -> Result<Image> {
        let row_end = row0.checked_add(rows);
        let col_end = col0.checked_add(cols);
        match (row_end, col_end) {
            (Some(re), Some(ce)) if re <= self.rows && ce <= self.cols => {}
            _ => {
                return Err(Error::invalid_dimensions(
                    rows,
                    cols,
                    format!(
                        "crop at ({row0}, {col0}) exceeds {}x{} image",
                        self.rows, self.cols
                    ),
                ));
            }
        }
        let mut out = Image::new(rows, cols, self.channels)?;
        out.format = self.format;
        for i in 0..rows {
            for j in 0..cols {
                for k in 0..self.channels {
                    *out.at_mut(i, j, k) = self.at(row0 + i, col0 + j, k);
                }
            }
        }
        Ok(out)
    }

    /// Extract channel `k` as a single-channel image.
    pub fn channel(&self, k: usize) -> Result<Image> {
        if k >= self.channels {
            return Err(Error::out_of_bounds(
                0,
                0,
                k,
                self.rows,
                self.cols,
                self.channels,
            ));
        }
        let mut out = Image::new(self.rows, self.cols, 1)?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                *out.at_mut(i, j, 0) = self.at(i, j, k);
            }
        }
        Ok(out)
    }

    /// Overwrite channel `k` from a single-channel image of the same size.
    pub fn set_channel(&mut self, k: usize, src: &Image) -> Result<()> {
        if k >= self.channels {
            return Err(Error::out_of_bounds(
                0,
                0,
                k,
                self.rows,
                self.cols,
                self.channels,
            ));
        }
        if src.channels != 1 {
            return Err(Error::channel_mismatch(1, src.channels));
        }
        if src.rows != self.rows || src.cols != self.cols {
            return Err(Error::dimension_mismatch(
                (self.rows, self.cols),
                (src.rows, src.cols),
            ));
        }
        for i in 0..self.rows {
            for j in 0..self.cols {
                *self.at_mut(i, j, k) = src.at(i, j, 0);
            }
        }
        Ok(())
    }

    /// New buffer with `value` added to every sample.
    pub fn add_scalar(&self, value: f32) -> Image {
        self.map(|v| v + value)
    }

    /// New buffer with `value` subtracted from every sample.
    pub fn sub_scalar(&self, value: f32) -> Image {
        self.map(|v| v - value)
    }

    /// New buffer with every sample multiplied by `value`.
    pub fn mul_scalar(&self, value: f32) -> Image {
        self.map(|v| v * value)
    }

    /// New buffer with every sample divided by `value`.
    ///
    /// A zero divisor is rejected as degenerate.
    pub fn div_scalar(&self, value: f32) -> Result<Image> {
        if value == 0.0 {
            return Err(Error::degenerate("divisor", 0.0, "division by zero"));
        }
        Ok(self.map(|v| v / value))
    }

    fn check_same_shape(&self, other: &Image) -> Result<()> {
        if self.channels != other.channels {
            return Err(Error::channel_mismatch(self.channels, other.channels));
        }
        if self.rows != other.rows || self.cols != other.cols {
            return Err(Error::dimension_mismatch(
                (self.rows, self.cols),
                (other.rows, other.cols),
            ));
        }
        Ok(())
    }

    /// Elementwise sum with a same-shaped buffer.
    pub fn add(&self, other: &Image) -> Result<Image> {
        self.check_same_shape(other)?;
        let mut out = self.clone();
        for (a, b) in out.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
        Ok(out)
    }

    /// Elementwise difference with a same-shaped buffer.
    pub fn sub(&self, other: &Image) -> Result<Image> {
        self.check_same_shape(other)?;
        let mut out = self.clone();
        for (a, b) in out.data.iter_mut().zip(other.data.iter()) {
            *a -= b;
        }
        Ok(out)
    }

    /// Elementwise product with a same-shaped buffer.
    pub fn mul(&self, other: &Image) -> Result<Image> {
        self.check_same_shape(other)?;
        let mut out = self.clone();
        for (a, b) in out.data.iter_mut().zip(other.data.iter()) {
            *a *= b;
        }
        Ok(out)
    }
}

/// Largest power of two less than or equal to `n`; 0 when `n` is 0.
pub fn floor_power_of_two(n: usize) -> usize {
    if n == 0 { 0 } else { 1 << n.ilog2() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zero_initialized() {
        let img = Image::new(4, 6, 3).unwrap();
        assert_eq!(img.rows(), 4);
        assert_eq!(img.cols(), 6);
        assert_eq!(img.channels(), 3);
        assert!(img.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_new_rejects_bad_shapes() {
        assert!(Image::new(0, 10, 1).is_err());
        assert!(Image::new(10, 0, 1).is_err());
        assert!(Image::new(10, 10, 2).is_err());
        assert!(Image::new(10, 10, 4).is_err());
    }

    #[test]
    fn test_from_data_length_check() {
        let img = Image::from_data(2, 2, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(img.at(1, 1, 0), 4.0);
        assert!(Image::from_data(2, 2, 1, vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_clone_is_deep() {
        let a = Image::filled(3, 3, 1, 7.0).unwrap();
        let mut b = a.clone();
        *b.at_mut(0, 0, 0) = 99.0;
        assert_eq!(a.at(0, 0, 0), 7.0);
        assert_eq!(b.at(0, 0, 0), 99.0);
    }

    #[test]
    fn test_get_set_bounds() {
        let mut img = Image::new(3, 3, 1).unwrap();
        img.set(2, 2, 0, 5.0).unwrap();
        assert_eq!(img.get(2, 2, 0).unwrap(), 5.0);
        assert!(img.get(3, 0, 0).unwrap_err().is_bounds_error());
        assert!(img.get(0, 0, 1).unwrap_err().is_bounds_error());
        assert!(img.set(0, 3, 0, 1.0).is_err());
    }

    #[test]
    fn test_row_slices() {
        let mut img = Image::new(2, 3, 1).unwrap();
        img.row_mut(1).copy_from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(img.row(0), &[0.0, 0.0, 0.0]);
        assert_eq!(img.row(1), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_min_max_map() {
        let img = Image::from_data(1, 4, 1, vec![-2.0, 0.5, 3.0, 1.0]).unwrap();
        assert_eq!(img.min(), -2.0);
        assert_eq!(img.max(), 3.0);
        let doubled = img.map(|v| v * 2.0);
        assert_eq!(doubled.at(0, 2, 0), 6.0);
    }

    #[test]
    fn test_rescaled() {
        let img = Image::from_data(1, 3, 1, vec![10.0, 20.0, 30.0]).unwrap();
        let scaled = img.rescaled(0.0, MAX_LEVEL);
        assert!((scaled.at(0, 0, 0) - 0.0).abs() < 1e-5);
        assert!((scaled.at(0, 1, 0) - 127.5).abs() < 1e-4);
        assert!((scaled.at(0, 2, 0) - 255.0).abs() < 1e-4);
    }

    #[test]
    fn test_rescaled_constant_maps_to_lo() {
        let img = Image::filled(4, 4, 1, 42.0).unwrap();
        let scaled = img.rescaled(0.0, 255.0);
        assert!(scaled.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_transpose() {
        let img = Image::from_data(2, 3, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let t = img.transpose().unwrap();
        assert_eq!(t.rows(), 3);
        assert_eq!(t.cols(), 2);
        assert_eq!(t.at(2, 0, 0), 3.0);
        assert_eq!(t.at(0, 1, 0), 4.0);
        let color = Image::new(2, 2, 3).unwrap();
        assert!(color.transpose().is_err());
    }

    #[test]
    fn test_crop() {
        let img = Image::from_data(3, 3, 1, (0..9).map(|v| v as f32).collect()).unwrap();
        let sub = img.crop(1, 1, 2, 2).unwrap();
        assert_eq!(sub.at(0, 0, 0), 4.0);
        assert_eq!(sub.at(1, 1, 0), 8.0);
        assert!(img.crop(2, 2, 2, 2).is_err());
    }

    #[test]
    fn test_channel_extract_insert() {
        let mut color = Image::new(2, 2, 3).unwrap();
        let mut red = Image::new(2, 2, 1).unwrap();
        red.fill(9.0);
        color.set_channel(0, &red).unwrap();
        assert_eq!(color.at(1, 1, 0), 9.0);
        assert_eq!(color.at(1, 1, 1), 0.0);
        let extracted = color.channel(0).unwrap();
        assert_eq!(extracted.at(0, 1, 0), 9.0);
        assert!(color.channel(3).is_err());
    }

    #[test]
    fn test_named_algebra() {
        let a = Image::filled(2, 2, 1, 10.0).unwrap();
        let b = Image::filled(2, 2, 1, 4.0).unwrap();
        assert_eq!(a.add_scalar(5.0).at(0, 0, 0), 15.0);
        assert_eq!(a.sub_scalar(5.0).at(0, 0, 0), 5.0);
        assert_eq!(a.mul_scalar(0.5).at(0, 0, 0), 5.0);
        assert_eq!(a.div_scalar(2.0).unwrap().at(0, 0, 0), 5.0);
        assert!(a.div_scalar(0.0).unwrap_err().is_degenerate());
        assert_eq!(a.add(&b).unwrap().at(1, 1, 0), 14.0);
        assert_eq!(a.sub(&b).unwrap().at(1, 1, 0), 6.0);
        assert_eq!(a.mul(&b).unwrap().at(1, 1, 0), 40.0);
    }

    #[test]
    fn test_algebra_shape_checks() {
        let a = Image::new(2, 2, 1).unwrap();
        let b = Image::new(2, 3, 1).unwrap();
        let c = Image::new(2, 2, 3).unwrap();
        assert!(a.add(&b).unwrap_err().is_dimension_error());
        assert!(a.mul(&c).unwrap_err().is_dimension_error());
    }

    #[test]
    fn test_floor_power_of_two() {
        assert_eq!(floor_power_of_two(0), 0);
        assert_eq!(floor_power_of_two(1), 1);
        assert_eq!(floor_power_of_two(4), 4);
        assert_eq!(floor_power_of_two(100), 64);
        assert_eq!(floor_power_of_two(1023), 512);
    }
}
