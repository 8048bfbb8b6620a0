//! Column-major dense matrix view.

use crate::error::TrainError;

/// Memory layout of a caller-provided feature matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLayout {
    /// Columns are contiguous: `data[col * n_rows + row]`.
    ColumnMajor,
    /// Rows are contiguous. Not accepted by the builder.
    RowMajor,
}

/// Borrowed column-major `f32` matrix.
///
/// The builder walks one column at a time across a node's row subset, so
/// column-contiguous storage is the only accepted layout. The view is
/// `Copy`-cheap and immutable for the duration of a tree build.
///
/// # Example
///
/// ```
/// use timber_rs::data::ColMatrix;
///
/// // 3 rows, 2 columns
/// let data = [1.0, 2.0, 3.0, 10.0, 20.0, 30.0];
/// let matrix = ColMatrix::from_slice(&data, 3, 2);
///
/// assert_eq!(matrix.get(1, 1), 20.0);
/// assert_eq!(matrix.column(0), &[1.0, 2.0, 3.0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ColMatrix<'a> {
    data: &'a [f32],
    n_rows: usize,
    n_cols: usize,
}

impl<'a> ColMatrix<'a> {
    /// Create a view over column-major data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != n_rows * n_cols`.
    pub fn from_slice(data: &'a [f32], n_rows: usize, n_cols: usize) -> Self {
        assert_eq!(
            data.len(),
            n_rows * n_cols,
            "data length {} does not match dimensions {}x{}",
            data.len(),
            n_rows,
            n_cols
        );
        Self {
            data,
            n_rows,
            n_cols,
        }
    }

    /// Create a view over data with an explicit layout tag.
    ///
    /// Row-major input is rejected here, at the collaborator boundary,
    /// before any work is enqueued.
    pub fn with_layout(
        data: &'a [f32],
        n_rows: usize,
        n_cols: usize,
        layout: DataLayout,
    ) -> Result<Self, TrainError> {
        match layout {
            DataLayout::ColumnMajor => Ok(Self::from_slice(data, n_rows, n_cols)),
            DataLayout::RowMajor => Err(TrainError::RowMajorInput),
        }
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Read a single element.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        debug_assert!(row < self.n_rows && col < self.n_cols);
        self.data[col * self.n_rows + row]
    }

    /// One column as a contiguous slice.
    #[inline]
    pub fn column(&self, col: usize) -> &'a [f32] {
        let start = col * self.n_rows;
        &self.data[start..start + self.n_rows]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_column_major() {
        let data = [0.0, 1.0, 2.0, 10.0, 11.0, 12.0];
        let m = ColMatrix::from_slice(&data, 3, 2);

        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.n_cols(), 2);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(2, 1), 12.0);
        assert_eq!(m.column(1), &[10.0, 11.0, 12.0]);
    }

    #[test]
    #[should_panic(expected = "does not match dimensions")]
    fn rejects_wrong_length() {
        let data = [0.0, 1.0, 2.0];
        let _ = ColMatrix::from_slice(&data, 2, 2);
    }

    #[test]
    fn rejects_row_major_layout() {
        let data = [0.0, 1.0, 2.0, 3.0];
        let err = ColMatrix::with_layout(&data, 2, 2, DataLayout::RowMajor).unwrap_err();
        assert!(matches!(err, TrainError::RowMajorInput));

        assert!(ColMatrix::with_layout(&data, 2, 2, DataLayout::ColumnMajor).is_ok());
    }
}
