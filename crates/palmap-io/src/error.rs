//! I/O error types
//!
//! Every file-facing operation in this crate returns [`IoError`]. Codec
//! and serializer errors are mapped into it so callers handle one type.

use thiserror::Error;

/// Error type for palmap file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The data is structurally invalid for the requested operation
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The PNG decoder returned an error
    #[error("decode error: {0}")]
    DecodeError(String),

    /// The PNG encoder returned an error
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Error from the `image` codecs
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// Malformed or unserializable JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the core library (format, size mismatch, ...)
    #[error("core error: {0}")]
    Core(#[from] palmap_core::Error),
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
