//! Error types for tinytensor

use crate::Encoding;
use std::fmt;
use thiserror::Error;

/// Main error type for tinytensor operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TinyTensorError {
    #[error("Tensor error: {0}")]
    Tensor(#[from] TensorError),
    #[error("Quantization error: {0}")]
    Quantization(#[from] QuantizationError),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TinyTensorError {
    /// True when the error means backing storage could not be obtained.
    pub fn is_allocation(&self) -> bool {
        matches!(self, Self::Tensor(TensorError::Allocation { .. }))
    }
}

/// Errors raised by matrix allocation and cell access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("Allocation failed: cannot obtain storage for a {rows}x{cols} {encoding} matrix")]
    Allocation { encoding: Encoding, rows: usize, cols: usize },

    #[error("Invalid dimensions {rows}x{cols}: rows and cols must be non-zero")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Index ({row}, {col}) out of range for {rows}x{cols} matrix")]
    IndexOutOfRange { row: usize, col: usize, rows: usize, cols: usize },

    #[error("Data length mismatch: {rows}x{cols} matrix needs {expected} elements, got {actual}")]
    DataLength { rows: usize, cols: usize, expected: usize, actual: usize },

    #[error("Scalar mismatch: {matrix} matrix cannot hold a {scalar} value")]
    ScalarMismatch { matrix: Encoding, scalar: Encoding },
}

/// Encoding and shape of a matrix, as reported in conversion errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLayout {
    pub encoding: Encoding,
    pub rows: usize,
    pub cols: usize,
}

impl fmt::Display for StoreLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{}", self.encoding, self.rows, self.cols)
    }
}

/// Errors raised by conversion between encodings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantizationError {
    /// Source and destination disagree on encoding or shape.
    #[error("Encoding mismatch: cannot convert {src} into {dst}")]
    EncodingMismatch { src: StoreLayout, dst: StoreLayout },
}

/// A half-precision cell whose scaled value fell outside the 16-bit range.
///
/// This is informational: the conversion still completes and the condition
/// is collected in its report.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("Overflow at ({row}, {col}): {value} does not fit Float16, stored {stored}")]
pub struct OverflowTruncated {
    pub row: usize,
    pub col: usize,
    pub value: f32,
    pub stored: i16,
}

/// Result type for tinytensor operations
pub type Result<T> = std::result::Result<T, TinyTensorError>;
