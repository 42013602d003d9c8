//! Error types for dip-ops operations

use thiserror::Error;

/// Errors that can occur during image processing operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Input dimensions are unusable for the operation.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Two inputs that must agree in size do not.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// A parameter is outside the supported range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The requested mode or input style is not supported.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// The parameterization makes the computation numerically meaningless.
    #[error("degenerate computation: {0}")]
    Degenerate(String),

    /// Buffer-level failure from dip-core.
    #[error("image error: {0}")]
    Image(#[from] dip_core::Error),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
