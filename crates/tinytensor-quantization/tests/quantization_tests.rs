//! Integration tests for tinytensor-quantization
//!
//! Covers the fixed-scale conversions end to end, shape and encoding checks
//! on the typed and dynamic entry points, and the overflow policy.

use tinytensor_common::{
    Encoding, Matrix, OverflowPolicy, QuantizationError, StoreLayout, TensorStore,
    TinyTensorError,
};
use tinytensor_quantization::utils::{calculate_mse, dequantize_i8};
use tinytensor_quantization::*;

/// The 2x3 sensor matrix used by the demo report.
fn sensor_matrix() -> Matrix<f32> {
    Matrix::from_vec(2, 3, vec![0.15, -0.88, 1.20, -0.05, 0.50, 0.95]).unwrap()
}

fn rows_of<T: tinytensor_common::Element>(m: &Matrix<T>) -> Vec<Vec<T>> {
    m.iter_rows().map(<[T]>::to_vec).collect()
}

// ---------------------------------------------------------------------------
// Int8
// ---------------------------------------------------------------------------

#[test]
fn int8_sensor_matrix_end_to_end() {
    let source = sensor_matrix();
    let mut dest = Matrix::<i8>::new(2, 3).unwrap();
    to_i8(&source, &mut dest).unwrap();
    assert_eq!(rows_of(&dest), vec![vec![19, -111, 127], vec![-6, 63, 120]]);
}

#[test]
fn int8_clamp_vector() {
    let source = Matrix::from_vec(1, 5, vec![2.0f32, -2.0, 1.0, -1.0, 0.0]).unwrap();
    let dest = quantize_i8(&source).unwrap();
    assert_eq!(dest.as_slice(), &[127, -128, 127, -127, 0]);
}

#[test]
fn int8_is_deterministic() {
    let source = sensor_matrix();
    let first = quantize_i8(&source).unwrap();
    let second = quantize_i8(&source).unwrap();
    assert_eq!(first, second);
}

#[test]
fn int8_shape_mismatch_fails_loudly() {
    let source = sensor_matrix();
    let mut dest = Matrix::<i8>::new(3, 2).unwrap();
    let err = to_i8(&source, &mut dest).unwrap_err();
    assert_eq!(
        err,
        TinyTensorError::Quantization(QuantizationError::EncodingMismatch {
            src: StoreLayout { encoding: Encoding::Full32, rows: 2, cols: 3 },
            dst: StoreLayout { encoding: Encoding::Quantized8, rows: 3, cols: 2 },
        })
    );
    assert!(dest.as_slice().iter().all(|&v| v == 0), "destination must stay untouched");
}

#[test]
fn int8_dequantize_error_is_bounded() {
    let source = sensor_matrix();
    let restored = dequantize_i8(&quantize_i8(&source).unwrap()).unwrap();
    // 1.20 saturates to 1.0; everything else is within one step of 1/127
    let mse = calculate_mse(&source, &restored).unwrap();
    assert!(mse < 0.01, "MSE too high: {}", mse);
}

// ---------------------------------------------------------------------------
// Half16
// ---------------------------------------------------------------------------

#[test]
fn half16_sensor_matrix_end_to_end() {
    let conversion = to_half16(&sensor_matrix()).unwrap();
    assert_eq!(rows_of(&conversion.matrix), vec![vec![150, -880, 1200], vec![-50, 500, 950]]);
    assert!(conversion.report.is_exact());
    assert_eq!(conversion.report.cells, 6);
}

#[test]
fn half16_overflow_is_reported_per_cell() {
    let source = Matrix::from_vec(2, 2, vec![0.1f32, 50.0, -50.0, 0.2]).unwrap();
    let conversion = to_half16(&source).unwrap();
    assert_eq!(conversion.matrix.as_slice(), &[100, i16::MAX, i16::MIN, 200]);

    let cells: Vec<_> = conversion.report.overflows.iter().map(|o| (o.row, o.col)).collect();
    assert_eq!(cells, vec![(0, 1), (1, 0)]);
    assert_eq!(conversion.report.overflows[0].stored, i16::MAX);
    assert_eq!(conversion.report.saturated, 2);
}

#[test]
fn half16_wrap_policy_keeps_native_narrowing() {
    let source = Matrix::from_vec(1, 1, vec![40.0f32]).unwrap();
    let conversion = Half16Converter::new(OverflowPolicy::Wrap).convert(&source).unwrap();
    assert_eq!(conversion.matrix.as_slice(), &[-25536]);
    assert_eq!(conversion.report.overflows.len(), 1);
    assert_eq!(conversion.report.saturated, 0);
}

#[test]
fn half16_into_shape_mismatch() {
    let mut dest = Matrix::<i16>::new(2, 2).unwrap();
    let err = to_half16_into(&sensor_matrix(), &mut dest, OverflowPolicy::Saturate).unwrap_err();
    assert!(matches!(
        err,
        TinyTensorError::Quantization(QuantizationError::EncodingMismatch { .. })
    ));
}

// ---------------------------------------------------------------------------
// Dynamic stores
// ---------------------------------------------------------------------------

#[test]
fn dynamic_convert_into_preallocated_stores() {
    let source: TensorStore = sensor_matrix().into();
    let mut half = TensorStore::create(Encoding::Half16, 2, 3).unwrap();
    let mut quant = TensorStore::create(Encoding::Quantized8, 2, 3).unwrap();

    convert_into(&source, &mut half).unwrap();
    let report = convert_into(&source, &mut quant).unwrap();

    assert_eq!(half.as_half16().unwrap().as_slice(), &[150, -880, 1200, -50, 500, 950]);
    assert_eq!(quant.as_quantized8().unwrap().as_slice(), &[19, -111, 127, -6, 63, 120]);
    assert_eq!(report.target, Encoding::Quantized8);
    assert_eq!(report.saturated, 1);
}

#[test]
fn dynamic_full32_destination_is_mismatch() {
    let source: TensorStore = sensor_matrix().into();
    let mut dest = TensorStore::create(Encoding::Full32, 2, 3).unwrap();
    let err = convert_into(&source, &mut dest).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Quantization error: Encoding mismatch: cannot convert Float32 2x3 into Float32 2x3"
    );
}

#[test]
fn dynamic_quantized_source_is_mismatch() {
    let source = TensorStore::create(Encoding::Quantized8, 2, 3).unwrap();
    let mut dest = TensorStore::create(Encoding::Half16, 2, 3).unwrap();
    assert!(convert_into(&source, &mut dest).is_err());
}

#[test]
fn dynamic_shape_mismatch() {
    let source: TensorStore = sensor_matrix().into();
    let mut dest = TensorStore::create(Encoding::Quantized8, 1, 6).unwrap();
    let err = convert_into(&source, &mut dest).unwrap_err();
    assert!(err.to_string().contains("Int8 1x6"));
}

#[test]
fn quantizer_carries_overflow_policy() {
    let source: TensorStore = Matrix::from_vec(1, 1, vec![-40.0f32]).unwrap().into();
    let quantizer = Quantizer::with_overflow_policy(OverflowPolicy::Wrap);
    assert_eq!(quantizer.overflow_policy(), OverflowPolicy::Wrap);

    let (dest, report) = quantizer.convert(&source, Encoding::Half16).unwrap();
    assert_eq!(dest.as_half16().unwrap().as_slice(), &[25536]);
    assert!(!report.is_exact());
}

#[test]
fn convert_to_full32_is_rejected_before_allocating() {
    let source: TensorStore = sensor_matrix().into();
    assert!(convert(&source, Encoding::Full32).is_err());
}
