//! Error types for palmap-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Every variant is recoverable: an operation that fails leaves the
//! document, palette and raster it was handed untouched.

use thiserror::Error;

/// palmap-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed color text, PMAP text or index structure
    #[error("format error: {0}")]
    Format(String),

    /// Imported palette or strip length differs from the expected length
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Coordinate outside the raster
    #[error("coordinate ({x}, {y}) outside {width}x{height} raster")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Palette slot or palette tab index out of range
    #[error("index out of range: {index} >= {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Invalid raster dimensions
    #[error("invalid raster dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for building a [`Error::Format`].
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }
}

/// Result type alias for palmap-core operations
pub type Result<T> = std::result::Result<T, Error>;
