//! Error message and conversion tests for tinytensor-common

use tinytensor_common::*;

#[test]
fn test_tensor_error_messages() {
    let alloc = TensorError::Allocation { encoding: Encoding::Full32, rows: 2, cols: 3 };
    assert_eq!(
        alloc.to_string(),
        "Allocation failed: cannot obtain storage for a 2x3 Float32 matrix"
    );

    let index = TensorError::IndexOutOfRange { row: 2, col: 0, rows: 2, cols: 3 };
    assert_eq!(index.to_string(), "Index (2, 0) out of range for 2x3 matrix");

    let dims = TensorError::InvalidDimensions { rows: 0, cols: 3 };
    assert!(dims.to_string().contains("must be non-zero"));
}

#[test]
fn test_encoding_mismatch_message() {
    let err = QuantizationError::EncodingMismatch {
        src: StoreLayout { encoding: Encoding::Full32, rows: 2, cols: 3 },
        dst: StoreLayout { encoding: Encoding::Quantized8, rows: 3, cols: 2 },
    };
    assert_eq!(
        err.to_string(),
        "Encoding mismatch: cannot convert Float32 2x3 into Int8 3x2"
    );
}

#[test]
fn test_umbrella_prefixes() {
    let err: TinyTensorError = TensorError::InvalidDimensions { rows: 0, cols: 0 }.into();
    assert!(err.to_string().starts_with("Tensor error: "));

    let err = TinyTensorError::Config("rows must be non-zero".to_string());
    assert_eq!(err.to_string(), "Configuration error: rows must be non-zero");
}

#[test]
fn test_overflow_condition_is_an_error_type() {
    let cond = OverflowTruncated { row: 0, col: 1, value: 40.0, stored: i16::MAX };
    let as_error: &dyn std::error::Error = &cond;
    assert!(as_error.to_string().contains("(0, 1)"));
    assert!(as_error.to_string().contains("32767"));
}
