//! Utility functions for conversion: shape checks, dequantization, error metrics

use crate::{HALF16_SCALE, INT8_SCALE, mismatch};
use tinytensor_common::{Element, Encoding, Matrix, Result};

/// Validate that two matrices share `rows`/`cols`.
pub fn check_shapes<A: Element, B: Element>(source: &Matrix<A>, dest: &Matrix<B>) -> Result<()> {
    if source.shape() != dest.shape() {
        return Err(mismatch(source.layout(), dest.layout()).into());
    }
    Ok(())
}

/// Map Half16 cells back to full precision (`value / 1000`).
pub fn dequantize_half16(matrix: &Matrix<i16>) -> Result<Matrix<f32>> {
    dequantize_with(matrix, |v| f32::from(v) / HALF16_SCALE)
}

/// Map Int8 cells back to full precision (`value / 127`).
pub fn dequantize_i8(matrix: &Matrix<i8>) -> Result<Matrix<f32>> {
    dequantize_with(matrix, |v| f32::from(v) / INT8_SCALE)
}

fn dequantize_with<T: Element>(matrix: &Matrix<T>, f: impl Fn(T) -> f32) -> Result<Matrix<f32>> {
    let data: Vec<f32> = matrix.as_slice().iter().map(|&v| f(v)).collect();
    Ok(Matrix::from_vec(matrix.rows(), matrix.cols(), data)?)
}

/// Calculate mean squared error between two matrices
pub fn calculate_mse(original: &Matrix<f32>, restored: &Matrix<f32>) -> Result<f32> {
    check_shapes(original, restored)?;

    let a = original.as_slice();
    let b = restored.as_slice();
    let mse = a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).powi(2)).sum::<f32>() / a.len() as f32;
    Ok(mse)
}

/// Calculate signal-to-noise ratio in dB
pub fn calculate_snr(original: &Matrix<f32>, restored: &Matrix<f32>) -> Result<f32> {
    let a = original.as_slice();
    let signal_power = a.iter().map(|&x| x.powi(2)).sum::<f32>() / a.len() as f32;
    let noise_power = calculate_mse(original, restored)?;

    if noise_power == 0.0 {
        return Ok(f32::INFINITY);
    }

    Ok(10.0 * (signal_power / noise_power).log10())
}

/// Storage ratio of `from` over `to`, e.g. Float32 over Int8 is 4.0.
pub fn compression_ratio(from: Encoding, to: Encoding) -> f32 {
    from.byte_width() as f32 / to.byte_width() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_ratios() {
        assert_eq!(compression_ratio(Encoding::Full32, Encoding::Half16), 2.0);
        assert_eq!(compression_ratio(Encoding::Full32, Encoding::Quantized8), 4.0);
        assert_eq!(compression_ratio(Encoding::Half16, Encoding::Quantized8), 2.0);
    }

    #[test]
    fn test_dequantize_i8() {
        let q = Matrix::from_vec(1, 3, vec![127i8, -127, 0]).unwrap();
        let restored = dequantize_i8(&q).unwrap();
        assert_eq!(restored.as_slice(), &[1.0, -1.0, 0.0]);
    }

    #[test]
    fn test_dequantize_half16() {
        let h = Matrix::from_vec(1, 2, vec![500i16, -1000]).unwrap();
        let restored = dequantize_half16(&h).unwrap();
        assert_eq!(restored.as_slice(), &[0.5, -1.0]);
    }

    #[test]
    fn test_mse_identical_is_zero() {
        let m = Matrix::from_vec(1, 2, vec![0.25f32, -0.75]).unwrap();
        assert_eq!(calculate_mse(&m, &m).unwrap(), 0.0);
        assert!(calculate_snr(&m, &m).unwrap().is_infinite());
    }

    #[test]
    fn test_mse_shape_mismatch() {
        let a = Matrix::<f32>::new(2, 3).unwrap();
        let b = Matrix::<f32>::new(3, 2).unwrap();
        assert!(calculate_mse(&a, &b).is_err());
    }
}
