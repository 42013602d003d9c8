//! Error types for the dip-core crate
//!
//! ## Overview
//!
//! Defines the [`Error`] enum covering every failure a buffer operation can
//! produce: out-of-range access, invalid or mismatched dimensions, channel
//! mismatches, allocation failure, and degenerate numeric parameters.
//! All variants carry enough context to diagnose the failure without a
//! debugger.
//!
//! ## Usage
//!
//! ```ignore
//! use dip_core::error::{Error, Result};
//!
//! fn checked_read(img: &Image, row: usize, col: usize) -> Result<f32> {
//!     img.get(row, col, 0)
//! }
//! ```
//!
//! ## Dependencies
//!
//! - `thiserror`: derive macro for `std::error::Error`
//!
//! ## Used By
//!
//! - `image`: bounds and dimension validation
//! - `dip-ops`, `dip-io`: wrapped via `#[from]` conversions

use thiserror::Error;

/// Result type alias for dip-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for image buffer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Sample coordinates outside the buffer bounds.
    #[error(
        "sample ({row}, {col}, {channel}) out of bounds for {rows}x{cols}x{channels} image"
    )]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Requested channel.
        channel: usize,
        /// Buffer row count.
        rows: usize,
        /// Buffer column count.
        cols: usize,
        /// Buffer channel count.
        channels: usize,
    },

    /// Dimensions rejected at construction or by an operation.
    #[error("invalid dimensions {rows}x{cols}: {reason}")]
    InvalidDimensions {
        /// Offending row count.
        rows: usize,
        /// Offending column count.
        cols: usize,
        /// Why the dimensions were rejected.
        reason: String,
    },

    /// Two buffers that must agree in size do not.
    #[error("dimension mismatch: {a_rows}x{a_cols} vs {b_rows}x{b_cols}")]
    DimensionMismatch {
        /// First buffer rows.
        a_rows: usize,
        /// First buffer columns.
        a_cols: usize,
        /// Second buffer rows.
        b_rows: usize,
        /// Second buffer columns.
        b_cols: usize,
    },

    /// Channel count differs from what the operation requires.
    #[error("channel mismatch: expected {expected}, got {got}")]
    ChannelMismatch {
        /// Required channel count.
        expected: usize,
        /// Actual channel count.
        got: usize,
    },

    /// Sample storage could not be allocated.
    #[error("allocation of {requested} samples failed: {reason}")]
    AllocationFailed {
        /// Number of samples requested.
        requested: usize,
        /// Why the allocation failed.
        reason: String,
    },

    /// A numeric parameter makes the requested computation meaningless.
    #[error("degenerate parameter {name} = {value}: {reason}")]
    DegenerateParameter {
        /// Parameter name.
        name: String,
        /// Offending value.
        value: f64,
        /// Why the value is degenerate.
        reason: String,
    },
}

impl Error {
    /// Create an out-of-bounds error.
    #[inline]
    pub fn out_of_bounds(
        row: usize,
        col: usize,
        channel: usize,
        rows: usize,
        cols: usize,
        channels: usize,
    ) -> Self {
        Error::OutOfBounds {
            row,
            col,
            channel,
            rows,
            cols,
            channels,
        }
    }

    /// Create an invalid-dimensions error.
    #[inline]
    pub fn invalid_dimensions(rows: usize, cols: usize, reason: impl Into<String>) -> Self {
        Error::InvalidDimensions {
            rows,
            cols,
            reason: reason.into(),
        }
    }

    /// Create a dimension-mismatch error from two (rows, cols) pairs.
    #[inline]
    pub fn dimension_mismatch(a: (usize, usize), b: (usize, usize)) -> Self {
        Error::DimensionMismatch {
            a_rows: a.0,
            a_cols: a.1,
            b_rows: b.0,
            b_cols: b.1,
        }
    }

    /// Create a channel-mismatch error.
    #[inline]
    pub fn channel_mismatch(expected: usize, got: usize) -> Self {
        Error::ChannelMismatch { expected, got }
    }

    /// Create an allocation-failure error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Error::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Create a degenerate-parameter error.
    #[inline]
    pub fn degenerate(name: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        Error::DegenerateParameter {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Check if the error is a bounds violation.
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Error::OutOfBounds { .. })
    }

    /// Check if the error is a dimension or channel precondition failure.
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidDimensions { .. }
                | Error::DimensionMismatch { .. }
                | Error::ChannelMismatch { .. }
        )
    }

    /// Check if the error is an allocation failure.
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Error::AllocationFailed { .. })
    }

    /// Check if the error is a degenerate numeric parameter.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Error::DegenerateParameter { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_display() {
        let err = Error::out_of_bounds(10, 20, 0, 8, 8, 1);
        assert!(err.to_string().contains("out of bounds"));
        assert!(err.to_string().contains("(10, 20, 0)"));
        assert!(err.is_bounds_error());
    }

    #[test]
    fn test_invalid_dimensions_display() {
        let err = Error::invalid_dimensions(0, 64, "row count must be nonzero");
        assert!(err.to_string().contains("invalid dimensions 0x64"));
        assert!(err.to_string().contains("nonzero"));
        assert!(err.is_dimension_error());
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = Error::dimension_mismatch((64, 64), (32, 64));
        assert!(err.to_string().contains("64x64"));
        assert!(err.to_string().contains("32x64"));
        assert!(err.is_dimension_error());
        assert!(!err.is_bounds_error());
    }

    #[test]
    fn test_degenerate_display() {
        let err = Error::degenerate("sigma", 0.0, "must be positive");
        assert!(err.to_string().contains("sigma"));
        assert!(err.to_string().contains("must be positive"));
        assert!(err.is_degenerate());
    }

    #[test]
    fn test_allocation_display() {
        let err = Error::allocation_failed(1 << 40, "buffer allocation failed");
        assert!(err.is_allocation_error());
        assert!(err.to_string().contains("samples failed"));
    }
}
