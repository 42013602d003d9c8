//! Error types for dip-io codecs

use thiserror::Error;

/// Errors that can occur while decoding or encoding image files.
#[derive(Error, Debug)]
pub enum IoError {
    /// Underlying filesystem failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be decoded.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// The buffer could not be encoded.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// The file uses a layout the codec does not handle.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Buffer-level failure from dip-core.
    #[error("image error: {0}")]
    Image(#[from] dip_core::Error),
}

/// Result type for codec operations.
pub type IoResult<T> = Result<T, IoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IoError::UnsupportedFormat("Indexed at Eight".to_string());
        assert!(err.to_string().contains("unsupported format"));

        let err = IoError::DecodeError("truncated stream".to_string());
        assert!(err.to_string().contains("decode error"));
    }

    #[test]
    fn test_core_error_conversion() {
        let core = dip_core::Error::channel_mismatch(1, 3);
        let err: IoError = core.into();
        assert!(matches!(err, IoError::Image(_)));
    }
}
