use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

fn normal(mean: f64, stddev: f64) -> Result<Normal<f64>> {
    if !mean.is_finite() || !stddev.is_finite() {
        return Err(NnError::InvalidArgument(format!(
            "normal distribution needs finite parameters, got mean={mean} stddev={stddev}"
        )));
    }
    if stddev < 0.0 {
        return Err(NnError::InvalidArgument(format!(
            "normal distribution needs stddev >= 0, got {stddev}"
        )));
    }
    Normal::new(mean, stddev)
        .map_err(|e| NnError::InvalidArgument(format!("normal distribution: {e}")))
}

/// One draw from N(mean, stddev).
pub fn randn<R: Rng + ?Sized>(rng: &mut R, mean: f64, stddev: f64) -> Result<f64> {
    Ok(normal(mean, stddev)?.sample(rng))
}

/// `rows x cols` matrix of independent N(mean, stddev) draws, each times `scale`.
///
/// Cells are drawn in row-major order, so a generator seeded the same way
/// always yields the same matrix.
pub fn randn_matrix<R: Rng + ?Sized>(
    rng: &mut R,
    rows: usize,
    cols: usize,
    mean: f64,
    stddev: f64,
    scale: f64,
) -> Result<Matrix> {
    let dist = normal(mean, stddev)?;
    let mut m = Matrix::zeros(rows, cols)?;
    for row in m.row_iter_mut() {
        for cell in row {
            *cell = dist.sample(rng) * scale;
        }
    }
    Ok(m)
}
