//! Owned row-major matrix storage
//!
//! [`Matrix<T>`] is the statically typed store; [`TensorStore`] is the closed
//! sum over the three encodings, fixed at construction. Every cell access goes
//! through `Matrix::offset`, the only place a flat offset is computed.

use crate::{Encoding, Scalar, StoreLayout, TensorError};
use std::fmt;
use tracing::{debug, trace};

/// Rust element type bound to one [`Encoding`].
pub trait Element:
    bytemuck::Pod + Default + PartialEq + fmt::Debug + Send + Sync + 'static
{
    const ENCODING: Encoding;

    fn to_scalar(self) -> Scalar;

    /// `None` when the scalar belongs to another encoding.
    fn from_scalar(scalar: Scalar) -> Option<Self>;
}

impl Element for f32 {
    const ENCODING: Encoding = Encoding::Full32;

    fn to_scalar(self) -> Scalar {
        Scalar::F32(self)
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::F32(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for i16 {
    const ENCODING: Encoding = Encoding::Half16;

    fn to_scalar(self) -> Scalar {
        Scalar::I16(self)
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::I16(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for i8 {
    const ENCODING: Encoding = Encoding::Quantized8;

    fn to_scalar(self) -> Scalar {
        Scalar::I8(self)
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::I8(v) => Some(v),
            _ => None,
        }
    }
}

/// Validate dimensions and compute the element count.
fn element_count(encoding: Encoding, rows: usize, cols: usize) -> Result<usize, TensorError> {
    if rows == 0 || cols == 0 {
        return Err(TensorError::InvalidDimensions { rows, cols });
    }

    let alloc_err = TensorError::Allocation { encoding, rows, cols };
    let elements = rows.checked_mul(cols).ok_or_else(|| alloc_err.clone())?;
    // Vec cannot hold more than isize::MAX bytes
    match elements.checked_mul(encoding.byte_width()) {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(elements),
        _ => Err(alloc_err),
    }
}

/// Dense 2-D matrix with exclusively owned row-major storage.
#[derive(Clone, PartialEq)]
pub struct Matrix<T: Element> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Element> Matrix<T> {
    /// Allocate a zero-filled `rows x cols` matrix.
    ///
    /// Storage is reserved fallibly, so exhaustion surfaces as
    /// [`TensorError::Allocation`] instead of aborting.
    pub fn new(rows: usize, cols: usize) -> Result<Self, TensorError> {
        let elements = element_count(T::ENCODING, rows, cols)?;

        let mut data = Vec::new();
        data.try_reserve_exact(elements)
            .map_err(|_| TensorError::Allocation { encoding: T::ENCODING, rows, cols })?;
        data.resize(elements, T::zeroed());

        debug!(
            encoding = %T::ENCODING,
            rows,
            cols,
            bytes = elements * T::ENCODING.byte_width(),
            "allocated matrix"
        );
        Ok(Self { rows, cols, data })
    }

    /// Adopt an existing row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, TensorError> {
        let expected = element_count(T::ENCODING, rows, cols)?;
        if data.len() != expected {
            return Err(TensorError::DataLength { rows, cols, expected, actual: data.len() });
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix by evaluating `f(row, col)` for every cell.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Result<Self, TensorError>
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut matrix = Self::new(rows, cols)?;
        for (r, row) in matrix.data.chunks_exact_mut(cols).enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = f(r, c);
            }
        }
        Ok(matrix)
    }

    #[inline]
    pub fn encoding(&self) -> Encoding {
        T::ENCODING
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Encoding and shape, as used in conversion errors.
    pub fn layout(&self) -> StoreLayout {
        StoreLayout { encoding: T::ENCODING, rows: self.rows, cols: self.cols }
    }

    /// Number of elements (`rows * cols`).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: zero-sized matrices cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Total storage in bytes (`len * byte_width`).
    pub fn byte_size(&self) -> usize {
        self.data.len() * T::ENCODING.byte_width()
    }

    /// Flat offset of `(row, col)`, or `IndexOutOfRange`.
    #[inline]
    fn offset(&self, row: usize, col: usize) -> Result<usize, TensorError> {
        if row >= self.rows || col >= self.cols {
            return Err(TensorError::IndexOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T, TensorError> {
        let index = self.offset(row, col)?;
        Ok(self.data[index])
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), TensorError> {
        let index = self.offset(row, col)?;
        self.data[index] = value;
        Ok(())
    }

    /// One row as a slice.
    pub fn row(&self, row: usize) -> Result<&[T], TensorError> {
        let start = self.offset(row, 0)?;
        Ok(&self.data[start..start + self.cols])
    }

    /// Rows in order, each `cols` long.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.data.chunks_exact(self.cols)
    }

    /// Every cell as `(row, col, value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.iter_rows()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, &v)| (r, c, v)))
    }

    /// Raw row-major view of the buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Raw row-major mutable view; the length stays fixed.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Buffer reinterpreted as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Release ownership of the buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Release the matrix and its storage.
    ///
    /// The matrix is consumed, so reading it afterwards does not compile:
    ///
    /// ```compile_fail
    /// use tinytensor_common::Matrix;
    ///
    /// let matrix = Matrix::<f32>::new(2, 2).unwrap();
    /// matrix.destroy();
    /// let _ = matrix.get(0, 0);
    /// ```
    pub fn destroy(self) {
        trace!(encoding = %T::ENCODING, rows = self.rows, cols = self.cols, "releasing matrix");
        drop(self);
    }
}

impl<T: Element> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("encoding", &T::ENCODING)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("data", &self.data)
            .finish()
    }
}

/// A matrix of any encoding, selected at construction and never re-tagged.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorStore {
    Full32(Matrix<f32>),
    Half16(Matrix<i16>),
    Quantized8(Matrix<i8>),
}

macro_rules! dispatch {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            TensorStore::Full32($m) => $body,
            TensorStore::Half16($m) => $body,
            TensorStore::Quantized8($m) => $body,
        }
    };
}

impl TensorStore {
    /// Allocate a zero-filled store of the given encoding.
    pub fn create(encoding: Encoding, rows: usize, cols: usize) -> Result<Self, TensorError> {
        Ok(match encoding {
            Encoding::Full32 => Self::Full32(Matrix::new(rows, cols)?),
            Encoding::Half16 => Self::Half16(Matrix::new(rows, cols)?),
            Encoding::Quantized8 => Self::Quantized8(Matrix::new(rows, cols)?),
        })
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Full32(_) => Encoding::Full32,
            Self::Half16(_) => Encoding::Half16,
            Self::Quantized8(_) => Encoding::Quantized8,
        }
    }

    pub fn rows(&self) -> usize {
        dispatch!(self, m => m.rows())
    }

    pub fn cols(&self) -> usize {
        dispatch!(self, m => m.cols())
    }

    pub fn shape(&self) -> (usize, usize) {
        dispatch!(self, m => m.shape())
    }

    pub fn layout(&self) -> StoreLayout {
        dispatch!(self, m => m.layout())
    }

    pub fn len(&self) -> usize {
        dispatch!(self, m => m.len())
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, m => m.is_empty())
    }

    pub fn byte_width(&self) -> usize {
        self.encoding().byte_width()
    }

    pub fn byte_size(&self) -> usize {
        dispatch!(self, m => m.byte_size())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Scalar, TensorError> {
        dispatch!(self, m => m.get(row, col).map(Element::to_scalar))
    }

    /// Write a cell; the scalar must carry this store's encoding.
    pub fn set(
        &mut self,
        row: usize,
        col: usize,
        value: impl Into<Scalar>,
    ) -> Result<(), TensorError> {
        let value = value.into();
        let encoding = self.encoding();
        let mismatch = TensorError::ScalarMismatch { matrix: encoding, scalar: value.encoding() };
        dispatch!(self, m => {
            let v = Element::from_scalar(value).ok_or(mismatch)?;
            m.set(row, col, v)
        })
    }

    /// One row of cells as scalars.
    pub fn row(&self, row: usize) -> Result<Vec<Scalar>, TensorError> {
        dispatch!(self, m => Ok(m.row(row)?.iter().map(|&v| v.to_scalar()).collect()))
    }

    /// All rows as scalars, in order.
    pub fn to_rows(&self) -> Vec<Vec<Scalar>> {
        dispatch!(self, m => m
            .iter_rows()
            .map(|row| row.iter().map(|&v| v.to_scalar()).collect())
            .collect())
    }

    pub fn as_bytes(&self) -> &[u8] {
        dispatch!(self, m => m.as_bytes())
    }

    pub fn as_full32(&self) -> Option<&Matrix<f32>> {
        match self {
            Self::Full32(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_half16(&self) -> Option<&Matrix<i16>> {
        match self {
            Self::Half16(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_quantized8(&self) -> Option<&Matrix<i8>> {
        match self {
            Self::Quantized8(m) => Some(m),
            _ => None,
        }
    }

    /// Release the store and its storage.
    ///
    /// ```
    /// use tinytensor_common::{Encoding, TensorStore};
    ///
    /// let store = TensorStore::create(Encoding::Half16, 2, 3).unwrap();
    /// store.destroy();
    /// ```
    ///
    /// Any access after `destroy` is rejected at compile time:
    ///
    /// ```compile_fail
    /// use tinytensor_common::{Encoding, TensorStore};
    ///
    /// let store = TensorStore::create(Encoding::Quantized8, 2, 3).unwrap();
    /// store.destroy();
    /// let _ = store.get(0, 0);
    /// ```
    pub fn destroy(self) {
        dispatch!(self, m => m.destroy())
    }
}

impl From<Matrix<f32>> for TensorStore {
    fn from(matrix: Matrix<f32>) -> Self {
        Self::Full32(matrix)
    }
}

impl From<Matrix<i16>> for TensorStore {
    fn from(matrix: Matrix<i16>) -> Self {
        Self::Half16(matrix)
    }
}

impl From<Matrix<i8>> for TensorStore {
    fn from(matrix: Matrix<i8>) -> Self {
        Self::Quantized8(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_matrix_is_zeroed() {
        let m = Matrix::<f32>::new(2, 3).unwrap();
        assert_eq!(m.len(), 6);
        assert!(m.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(
            Matrix::<i8>::new(0, 3).unwrap_err(),
            TensorError::InvalidDimensions { rows: 0, cols: 3 }
        );
        assert_eq!(
            Matrix::<i8>::new(3, 0).unwrap_err(),
            TensorError::InvalidDimensions { rows: 3, cols: 0 }
        );
    }

    #[test]
    fn element_count_overflow_is_allocation_error() {
        let err = Matrix::<f32>::new(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, TensorError::Allocation { encoding: Encoding::Full32, .. }));
    }

    #[test]
    fn offset_is_row_major() {
        let m = Matrix::<i16>::new(3, 4).unwrap();
        assert_eq!(m.offset(0, 0).unwrap(), 0);
        assert_eq!(m.offset(1, 0).unwrap(), 4);
        assert_eq!(m.offset(2, 3).unwrap(), 11);
        assert!(m.offset(3, 0).is_err());
        assert!(m.offset(0, 4).is_err());
    }

    #[test]
    fn cells_follow_row_major_order() {
        let m = Matrix::from_vec(2, 2, vec![1i8, 2, 3, 4]).unwrap();
        let cells: Vec<_> = m.cells().collect();
        assert_eq!(cells, vec![(0, 0, 1), (0, 1, 2), (1, 0, 3), (1, 1, 4)]);
    }

    #[test]
    fn store_rejects_foreign_scalar() {
        let mut store = TensorStore::create(Encoding::Half16, 1, 1).unwrap();
        let err = store.set(0, 0, 1.5f32).unwrap_err();
        assert_eq!(
            err,
            TensorError::ScalarMismatch { matrix: Encoding::Half16, scalar: Encoding::Full32 }
        );
        store.set(0, 0, 7i16).unwrap();
        assert_eq!(store.get(0, 0).unwrap(), Scalar::I16(7));
    }
}
