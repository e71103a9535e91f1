//! Conversion between tinytensor encodings
//!
//! This crate converts full-precision matrices into the narrower encodings:
//! - Half16: `value * 1000` truncated into a 16-bit integer
//! - Quantized8: `value * 127` clamped to `[-128, 127]` and truncated
//!
//! Both schemes use a fixed linear scale. Conversions are pure: the same
//! input always yields the same output.

use tinytensor_common::{
    Element, Encoding, Matrix, OverflowPolicy, OverflowTruncated, QuantizationError, Result,
    StoreLayout, TensorStore,
};
use tracing::debug;

pub mod half16;
pub mod int8;
pub mod utils;

pub use half16::{Half16Converter, HALF16_SCALE, half16_value, to_half16, to_half16_into};
pub use int8::{INT8_SCALE, Int8Converter, quantize_i8, quantize_value, to_i8};

/// Outcome of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Encoding written.
    pub target: Encoding,
    /// Number of cells converted.
    pub cells: usize,
    /// Cells whose scaled value hit a range bound.
    pub saturated: usize,
    /// Half-precision cells that did not fit 16 bits.
    pub overflows: Vec<OverflowTruncated>,
}

impl ConversionReport {
    pub fn new(target: Encoding, cells: usize) -> Self {
        Self { target, cells, saturated: 0, overflows: Vec::new() }
    }

    /// True when no cell was clamped or overflowed.
    pub fn is_exact(&self) -> bool {
        self.saturated == 0 && self.overflows.is_empty()
    }
}

/// A freshly allocated destination together with its report.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion<T: Element> {
    pub matrix: Matrix<T>,
    pub report: ConversionReport,
}

/// Trait for conversion routines selected by target encoding
pub trait Converter: Send + Sync {
    /// Encoding this converter writes.
    fn target(&self) -> Encoding;

    /// Convert `source` into `dest`, which must hold [`Converter::target`].
    fn convert_store(
        &self,
        source: &Matrix<f32>,
        dest: &mut TensorStore,
    ) -> Result<ConversionReport>;
}

/// Converter factory for creating the routine for a target encoding
pub struct ConverterFactory;

impl ConverterFactory {
    /// `None` for `Full32`, which is never a conversion target.
    pub fn create(target: Encoding, policy: OverflowPolicy) -> Option<Box<dyn Converter>> {
        match target {
            Encoding::Full32 => None,
            Encoding::Half16 => Some(Box::new(Half16Converter::new(policy))),
            Encoding::Quantized8 => Some(Box::new(Int8Converter::new())),
        }
    }
}

pub(crate) fn mismatch(src: StoreLayout, dst: StoreLayout) -> QuantizationError {
    QuantizationError::EncodingMismatch { src, dst }
}

/// Dynamically typed conversion entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quantizer {
    half16_overflow: OverflowPolicy,
}

impl Quantizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overflow_policy(policy: OverflowPolicy) -> Self {
        Self { half16_overflow: policy }
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.half16_overflow
    }

    /// Convert a `Full32` store into a pre-allocated `Half16` or `Quantized8`
    /// store of the same shape.
    pub fn convert_into(
        &self,
        source: &TensorStore,
        dest: &mut TensorStore,
    ) -> Result<ConversionReport> {
        let TensorStore::Full32(src) = source else {
            return Err(mismatch(source.layout(), dest.layout()).into());
        };
        let converter = ConverterFactory::create(dest.encoding(), self.half16_overflow)
            .ok_or_else(|| mismatch(source.layout(), dest.layout()))?;

        debug!(from = %source.layout(), to = %dest.layout(), "converting store");
        converter.convert_store(src, dest)
    }

    /// Allocate a `target` store shaped like `source` and convert into it.
    pub fn convert(
        &self,
        source: &TensorStore,
        target: Encoding,
    ) -> Result<(TensorStore, ConversionReport)> {
        let requested = StoreLayout { encoding: target, rows: source.rows(), cols: source.cols() };
        if source.encoding() != Encoding::Full32 || target == Encoding::Full32 {
            return Err(mismatch(source.layout(), requested).into());
        }

        let mut dest = TensorStore::create(target, source.rows(), source.cols())?;
        let report = self.convert_into(source, &mut dest)?;
        Ok((dest, report))
    }
}

/// [`Quantizer::convert_into`] with the default overflow policy.
pub fn convert_into(source: &TensorStore, dest: &mut TensorStore) -> Result<ConversionReport> {
    Quantizer::new().convert_into(source, dest)
}

/// [`Quantizer::convert`] with the default overflow policy.
pub fn convert(source: &TensorStore, target: Encoding) -> Result<(TensorStore, ConversionReport)> {
    Quantizer::new().convert(source, target)
}
