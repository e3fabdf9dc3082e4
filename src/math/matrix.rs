use std::fmt;

use crate::error::{NnError, Result};

/// Dense row-major matrix of `f64` backed by one contiguous buffer.
///
/// Cell `(i, j)` lives at `data[i * cols + j]`. `cols` is always at least 1;
/// `rows == 0` is allowed and stands for an empty batch of fixed width.
///
/// `Clone` is a deep copy. `clone_from` is the assignment form: it reuses the
/// destination buffer when the shapes agree and reallocates otherwise.
#[derive(Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Builds a `rows x cols` matrix with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Matrix> {
        if cols == 0 {
            return Err(NnError::InvalidArgument(format!(
                "matrix must have at least one column, got {rows}x{cols}"
            )));
        }
        Ok(Matrix {
            rows,
            cols,
            data: vec![value; rows * cols],
        })
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Matrix> {
        Matrix::filled(rows, cols, 0.0)
    }

    /// Builds a matrix from nested rows. All rows must share one non-zero width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if cols == 0 {
            return Err(NnError::InvalidArgument(
                "from_rows: need at least one row with at least one column".to_string(),
            ));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(NnError::InvalidArgument(format!(
                "from_rows: row {i} has {} columns, expected {cols}",
                row.len()
            )));
        }
        let n_rows = rows.len();
        Ok(Matrix {
            rows: n_rows,
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub(crate) fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Matrix {
        debug_assert!(cols > 0 && data.len() == rows * cols);
        Matrix { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(NnError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        let idx = self.index(row, col)?;
        Ok(self.data[idx])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let idx = self.index(row, col)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Borrowed view of row `row`.
    pub fn row(&self, row: usize) -> Result<&[f64]> {
        if row >= self.rows {
            return Err(NnError::OutOfRange {
                row,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let start = row * self.cols;
        Ok(&self.data[start..start + self.cols])
    }

    pub(crate) fn row_iter(&self) -> std::slice::Chunks<'_, f64> {
        self.data.chunks(self.cols)
    }

    pub(crate) fn row_iter_mut(&mut self) -> std::slice::ChunksMut<'_, f64> {
        self.data.chunks_mut(self.cols)
    }

    pub(crate) fn same_shape(&self, other: &Matrix, context: &str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(NnError::shape_mismatch(context, self.shape(), other.shape()));
        }
        Ok(())
    }

    /// Standard product `self * rhs`, shape `self.rows x rhs.cols`.
    ///
    /// The naive triple loop in i-k-j order: each `self[i][k]` is broadcast
    /// along row `k` of `rhs`, so both operands are walked contiguously.
    /// Every output cell still accumulates its K products in order of `k`.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(NnError::InvalidArgument(format!(
                "matmul: lhs has {} columns but rhs has {} rows",
                self.cols, rhs.rows
            )));
        }

        let mut out = vec![0.0; self.rows * rhs.cols];
        for (lhs_row, out_row) in self.row_iter().zip(out.chunks_mut(rhs.cols)) {
            for (&a, rhs_row) in lhs_row.iter().zip(rhs.row_iter()) {
                for (o, &b) in out_row.iter_mut().zip(rhs_row) {
                    *o += a * b;
                }
            }
        }
        Ok(Matrix::from_vec(self.rows, rhs.cols, out))
    }

    /// Elementwise `self - rhs`.
    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "subtract", |a, b| a - b)
    }

    /// Elementwise `self + rhs`.
    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "add", |a, b| a + b)
    }

    pub(crate) fn zip_with<F>(&self, rhs: &Matrix, context: &str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.same_shape(rhs, context)?;
        let data = self
            .data
            .iter()
            .zip(&rhs.data)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Matrix::from_vec(self.rows, self.cols, data))
    }

    /// `cols x rows` matrix with `t[j][i] == self[i][j]`.
    ///
    /// Fails for a 0-row matrix, whose transpose would have no columns.
    pub fn transpose(&self) -> Result<Matrix> {
        if self.rows == 0 {
            return Err(NnError::InvalidArgument(format!(
                "transpose: 0x{} matrix has no columns once transposed",
                self.cols
            )));
        }
        let mut data = vec![0.0; self.data.len()];
        for (i, row) in self.row_iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                data[j * self.rows + i] = v;
            }
        }
        Ok(Matrix::from_vec(self.cols, self.rows, data))
    }

    /// `transpose(self) * rhs` without materializing the transpose.
    ///
    /// Defined for 0-row operands too: the result is then all zeros.
    pub fn transpose_matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.rows != rhs.rows {
            return Err(NnError::InvalidArgument(format!(
                "transpose_matmul: lhs has {} rows but rhs has {} rows",
                self.rows, rhs.rows
            )));
        }

        let mut out = vec![0.0; self.cols * rhs.cols];
        for (lhs_row, rhs_row) in self.row_iter().zip(rhs.row_iter()) {
            for (&a, out_row) in lhs_row.iter().zip(out.chunks_mut(rhs.cols)) {
                for (o, &b) in out_row.iter_mut().zip(rhs_row) {
                    *o += a * b;
                }
            }
        }
        Ok(Matrix::from_vec(self.cols, rhs.cols, out))
    }

    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        let data = self.data.iter().map(|&x| f(x)).collect();
        Matrix::from_vec(self.rows, self.cols, data)
    }
}

impl Clone for Matrix {
    fn clone(&self) -> Self {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.rows = source.rows;
        self.cols = source.cols;
        self.data.clone_from(&source.data);
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix ({} x {})", self.rows, self.cols)?;
        for row in self.row_iter() {
            writeln!(f, "{row:?}")?;
        }
        Ok(())
    }
}
