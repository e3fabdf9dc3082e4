//! Free-standing helpers over [`Matrix`] used by the layers and by gradient
//! checks in tests.

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Default central-difference step for [`numerical_gradient`].
pub const NUMERICAL_EPS: f64 = 1e-5;

pub fn transpose(m: &Matrix) -> Result<Matrix> {
    m.transpose()
}

/// One sum per row, length `m.rows()`.
pub fn sum_rows(m: &Matrix) -> Vec<f64> {
    m.row_iter().map(|row| row.iter().sum()).collect()
}

/// One sum per column, length `m.cols()`.
pub fn sum_cols(m: &Matrix) -> Vec<f64> {
    let mut sums = vec![0.0; m.cols()];
    for row in m.row_iter() {
        for (s, &v) in sums.iter_mut().zip(row) {
            *s += v;
        }
    }
    sums
}

/// `max(m[i][j], threshold)` per cell.
pub fn elementwise_max(m: &Matrix, threshold: f64) -> Matrix {
    m.map(|x| x.max(threshold))
}

/// Hadamard product.
pub fn elementwise_mul(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    a.zip_with(b, "elementwise_mul", |x, y| x * y)
}

/// Jacobian of softmax w.r.t. its logits for one sample: `diag(p) - p * p^T`.
pub fn softmax_jacobian(p: &[f64]) -> Result<Matrix> {
    let n = p.len();
    let mut jac = Matrix::zeros(n, n)?;
    for (i, &pi) in p.iter().enumerate() {
        for (j, &pj) in p.iter().enumerate() {
            let diag = if i == j { pi } else { 0.0 };
            jac.set(i, j, diag - pi * pj)?;
        }
    }
    Ok(jac)
}

/// Central-difference estimate of `df/dW[i][j]`:
/// `(f(W + eps*e_ij) - f(W - eps*e_ij)) / (2 * eps)`.
///
/// `w` is never modified; the two probes are perturbed copies.
pub fn numerical_gradient<F>(mut f: F, w: &Matrix, i: usize, j: usize, eps: f64) -> Result<f64>
where
    F: FnMut(&Matrix) -> f64,
{
    let original = w.get(i, j)?;
    if !(eps > 0.0 && eps.is_finite()) {
        return Err(NnError::InvalidArgument(format!(
            "numerical_gradient: eps must be positive and finite, got {eps}"
        )));
    }

    let mut w_plus = w.clone();
    let mut w_minus = w.clone();
    w_plus.set(i, j, original + eps)?;
    w_minus.set(i, j, original - eps)?;

    Ok((f(&w_plus) - f(&w_minus)) / (2.0 * eps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numerical_gradient_of_square() {
        let w = Matrix::filled(1, 1, 3.0).unwrap();
        let square = |m: &Matrix| m.as_slice()[0].powi(2);
        let g = numerical_gradient(square, &w, 0, 0, NUMERICAL_EPS).unwrap();
        assert!((g - 6.0).abs() < 1e-6);
    }

    #[test]
    fn numerical_gradient_bad_index() {
        let w = Matrix::zeros(2, 2).unwrap();
        let err = numerical_gradient(|_| 0.0, &w, 2, 0, NUMERICAL_EPS);
        assert!(matches!(err, Err(NnError::OutOfRange { row: 2, .. })));
    }
}
