//! Half-precision stand-in: fixed-point 16-bit conversion
//!
//! Values are stored as `trunc(value * 1000)` in an `i16`. This is a scaled
//! integer, not the IEEE binary16 layout. Cells whose scaled value leaves the
//! 16-bit range are handled by an [`OverflowPolicy`] and always reported.

use crate::{Conversion, ConversionReport, Converter, mismatch, utils::check_shapes};
use tinytensor_common::{
    Encoding, Matrix, OverflowPolicy, OverflowTruncated, Result, TensorStore,
};
use tracing::{debug, warn};

/// Fixed scale applied before narrowing to 16 bits.
pub const HALF16_SCALE: f32 = 1000.0;

/// Narrow one value. Returns the stored cell and whether it overflowed.
///
/// NaN counts as an overflow and stores 0 under either policy.
///
/// `Wrap` narrows through an `i32` the way a hardware truncating convert
/// does: values outside the `i32` range (and NaN) become `i32::MIN` first,
/// so their low 16 bits are 0.
#[inline]
pub fn half16_value(value: f32, policy: OverflowPolicy) -> (i16, bool) {
    let scaled = (value * HALF16_SCALE).trunc();
    // NaN fails both comparisons
    if scaled >= f32::from(i16::MIN) && scaled <= f32::from(i16::MAX) {
        return (scaled as i16, false);
    }

    let stored = match policy {
        // float-to-int `as` saturates
        OverflowPolicy::Saturate => scaled as i16,
        OverflowPolicy::Wrap => truncate_i32(scaled) as i16,
    };
    (stored, true)
}

/// Truncating `f32 -> i32` with the x86 "integer indefinite" result for
/// NaN and out-of-range input.
#[inline]
fn truncate_i32(scaled: f32) -> i32 {
    const I32_BOUND: f32 = 2_147_483_648.0;
    if scaled >= -I32_BOUND && scaled < I32_BOUND { scaled as i32 } else { i32::MIN }
}

/// Convert `source` into the pre-allocated `dest` of the same shape.
pub fn to_half16_into(
    source: &Matrix<f32>,
    dest: &mut Matrix<i16>,
    policy: OverflowPolicy,
) -> Result<ConversionReport> {
    check_shapes(source, dest)?;

    let mut report = ConversionReport::new(Encoding::Half16, source.len());
    for ((row, col, value), cell) in source.cells().zip(dest.as_mut_slice().iter_mut()) {
        let (stored, overflowed) = half16_value(value, policy);
        *cell = stored;
        if overflowed {
            report.overflows.push(OverflowTruncated { row, col, value, stored });
        }
    }
    if policy == OverflowPolicy::Saturate {
        report.saturated = report.overflows.len();
    }

    if !report.overflows.is_empty() {
        warn!(
            count = report.overflows.len(),
            policy = %policy,
            "half-precision conversion overflowed the 16-bit range"
        );
    }
    debug!(cells = report.cells, "converted to Float16");
    Ok(report)
}

/// Allocate a Half16 matrix shaped like `source` and convert into it,
/// saturating out-of-range cells.
pub fn to_half16(source: &Matrix<f32>) -> Result<Conversion<i16>> {
    Half16Converter::default().convert(source)
}

/// Half16 conversion routine with a fixed overflow policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Half16Converter {
    policy: OverflowPolicy,
}

impl Half16Converter {
    pub fn new(policy: OverflowPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn convert(&self, source: &Matrix<f32>) -> Result<Conversion<i16>> {
        let mut matrix = Matrix::new(source.rows(), source.cols())?;
        let report = to_half16_into(source, &mut matrix, self.policy)?;
        Ok(Conversion { matrix, report })
    }
}

impl Converter for Half16Converter {
    fn target(&self) -> Encoding {
        Encoding::Half16
    }

    fn convert_store(
        &self,
        source: &Matrix<f32>,
        dest: &mut TensorStore,
    ) -> Result<ConversionReport> {
        match dest {
            TensorStore::Half16(m) => to_half16_into(source, m, self.policy),
            other => Err(mismatch(source.layout(), other.layout()).into()),
        }
    }
}
