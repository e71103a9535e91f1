//! Symmetric 8-bit quantization with a fixed scale of 127
//!
//! Each cell is `trunc(clamp(value * 127, -128, 127))`. Out-of-range input
//! saturates silently; no error is raised for it.

use crate::{ConversionReport, Converter, mismatch, utils::check_shapes};
use tinytensor_common::{Encoding, Matrix, Result, TensorStore};
use tracing::debug;

/// Fixed scale applied before clamping.
pub const INT8_SCALE: f32 = 127.0;

const INT8_MIN: f32 = -128.0;
const INT8_MAX: f32 = 127.0;

/// Quantize a single value. NaN maps to 0.
#[inline]
pub fn quantize_value(value: f32) -> i8 {
    // clamp passes NaN through; the cast turns it into 0
    (value * INT8_SCALE).clamp(INT8_MIN, INT8_MAX) as i8
}

#[inline]
fn saturates(value: f32) -> bool {
    let scaled = value * INT8_SCALE;
    scaled > INT8_MAX || scaled < INT8_MIN
}

fn quantize_cells(source: &Matrix<f32>, dest: &mut Matrix<i8>) -> Result<ConversionReport> {
    check_shapes(source, dest)?;

    let mut report = ConversionReport::new(Encoding::Quantized8, source.len());
    for (&value, cell) in source.as_slice().iter().zip(dest.as_mut_slice().iter_mut()) {
        *cell = quantize_value(value);
        if saturates(value) {
            report.saturated += 1;
        }
    }

    debug!(cells = report.cells, saturated = report.saturated, "quantized to Int8");
    Ok(report)
}

/// Quantize `source` into the pre-allocated `dest` of the same shape.
///
/// A shape mismatch fails with `EncodingMismatch` and leaves `dest` untouched.
pub fn to_i8(source: &Matrix<f32>, dest: &mut Matrix<i8>) -> Result<()> {
    quantize_cells(source, dest).map(|_| ())
}

/// Allocate an Int8 matrix shaped like `source` and quantize into it.
pub fn quantize_i8(source: &Matrix<f32>) -> Result<Matrix<i8>> {
    let mut dest = Matrix::new(source.rows(), source.cols())?;
    to_i8(source, &mut dest)?;
    Ok(dest)
}

/// Int8 quantization routine
#[derive(Debug, Clone, Copy, Default)]
pub struct Int8Converter;

impl Int8Converter {
    pub fn new() -> Self {
        Self
    }
}

impl Converter for Int8Converter {
    fn target(&self) -> Encoding {
        Encoding::Quantized8
    }

    fn convert_store(
        &self,
        source: &Matrix<f32>,
        dest: &mut TensorStore,
    ) -> Result<ConversionReport> {
        match dest {
            TensorStore::Quantized8(m) => quantize_cells(source, m),
            other => Err(mismatch(source.layout(), other.layout()).into()),
        }
    }
}
