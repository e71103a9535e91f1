//! Builds the three technical reports from a configured source matrix
//!
//! Lifecycle per store: build from data or convert, read into a report,
//! destroy.

use crate::config::CliConfig;
use crate::report::{ConversionStats, MatrixReport};
use tinytensor_common::{Encoding, Matrix, QuantizationError, Result, StoreLayout, TensorStore};
use tinytensor_quantization::utils::{
    calculate_mse, calculate_snr, compression_ratio, dequantize_half16, dequantize_i8,
};
use tinytensor_quantization::{ConversionReport, Quantizer};
use tracing::{debug, info};

pub const SOURCE_LABEL: &str = "ORIGINAL HIGH PRECISION";
pub const HALF16_LABEL: &str = "HALF-PRECISION MATRIX";
pub const INT8_LABEL: &str = "QUANTIZED MATRIX (MAX SAVINGS)";

/// Options that do not live in the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Attach reconstruction statistics to converted matrices.
    pub stats: bool,
}

/// Allocate, populate, convert and report.
pub fn run(config: &CliConfig, options: PipelineOptions) -> Result<Vec<MatrixReport>> {
    let matrix = &config.matrix;
    let source: TensorStore =
        Matrix::from_vec(matrix.rows, matrix.cols, matrix.data.clone())?.into();
    debug!(layout = %source.layout(), "populated source matrix");

    let quantizer = Quantizer::with_overflow_policy(config.quantization.half16_overflow);
    let mut reports = vec![MatrixReport::from_store(SOURCE_LABEL, &source)];

    for (label, target) in [(HALF16_LABEL, Encoding::Half16), (INT8_LABEL, Encoding::Quantized8)] {
        let mut dest = TensorStore::create(target, source.rows(), source.cols())?;
        let conversion = quantizer.convert_into(&source, &mut dest)?;

        let mut report = MatrixReport::from_store(label, &dest);
        if options.stats {
            report = report.with_stats(conversion_stats(&source, &dest, &conversion)?);
        }
        reports.push(report);
        dest.destroy();
    }

    source.destroy();
    info!(reports = reports.len(), "technical report ready");
    Ok(reports)
}

fn conversion_stats(
    source: &TensorStore,
    dest: &TensorStore,
    conversion: &ConversionReport,
) -> Result<ConversionStats> {
    let mismatch = || QuantizationError::EncodingMismatch {
        src: source.layout(),
        dst: StoreLayout { encoding: Encoding::Full32, ..dest.layout() },
    };
    let TensorStore::Full32(original) = source else {
        return Err(mismatch().into());
    };
    let restored = match dest {
        TensorStore::Half16(m) => dequantize_half16(m)?,
        TensorStore::Quantized8(m) => dequantize_i8(m)?,
        TensorStore::Full32(_) => return Err(mismatch().into()),
    };

    Ok(ConversionStats {
        compression_ratio: compression_ratio(Encoding::Full32, dest.encoding()),
        mse: calculate_mse(original, &restored)?,
        snr_db: calculate_snr(original, &restored)?,
        saturated: conversion.saturated,
        overflows: conversion.overflows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatrixConfig;
    use tinytensor_common::{Scalar, TensorError, TinyTensorError};

    #[test]
    fn demo_pipeline_produces_three_reports() {
        let reports = run(&CliConfig::default(), PipelineOptions::default()).unwrap();
        let labels: Vec<_> = reports.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec![SOURCE_LABEL, HALF16_LABEL, INT8_LABEL]);
        assert_eq!(reports[2].cells[0][0], Scalar::I8(19));
        assert!(reports.iter().all(|r| r.stats.is_none()));
    }

    #[test]
    fn short_data_is_rejected_without_padding() {
        let config = CliConfig {
            matrix: MatrixConfig { rows: 1, cols: 2, data: vec![1.0] },
            ..CliConfig::default()
        };
        let err = run(&config, PipelineOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            TinyTensorError::Tensor(TensorError::DataLength { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn zero_rows_are_rejected() {
        let config = CliConfig {
            matrix: MatrixConfig { rows: 0, cols: 2, data: vec![] },
            ..CliConfig::default()
        };
        let err = run(&config, PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, TinyTensorError::Tensor(TensorError::InvalidDimensions { .. })));
    }

    #[test]
    fn stats_attach_to_converted_matrices_only() {
        let reports = run(&CliConfig::default(), PipelineOptions { stats: true }).unwrap();
        assert!(reports[0].stats.is_none());
        let int8 = reports[2].stats.unwrap();
        assert_eq!(int8.compression_ratio, 4.0);
        assert_eq!(int8.saturated, 1);
        assert!(int8.mse > 0.0);
    }
}
