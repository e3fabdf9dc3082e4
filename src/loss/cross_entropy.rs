use log::{debug, trace};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Probabilities are clipped into `[CLIP_EPS, 1 - CLIP_EPS]` before `ln`.
pub const CLIP_EPS: f64 = 1e-7;

fn clip(p: f64) -> f64 {
    p.clamp(CLIP_EPS, 1.0 - CLIP_EPS)
}

/// Ground truth for a batch: one class index per row, or a one-hot matrix
/// with the same shape as the predictions.
#[derive(Debug, Clone, Copy)]
pub enum Targets<'a> {
    Labels(&'a [usize]),
    OneHot(&'a Matrix),
}

impl<'a> From<&'a [usize]> for Targets<'a> {
    fn from(labels: &'a [usize]) -> Self {
        Targets::Labels(labels)
    }
}

impl<'a> From<&'a Vec<usize>> for Targets<'a> {
    fn from(labels: &'a Vec<usize>) -> Self {
        Targets::Labels(labels)
    }
}

impl<'a> From<&'a Matrix> for Targets<'a> {
    fn from(onehot: &'a Matrix) -> Self {
        Targets::OneHot(onehot)
    }
}

/// Categorical cross-entropy for a softmax output layer, averaged over rows.
pub struct CategoricalCrossEntropy;

impl CategoricalCrossEntropy {
    /// Mean negative log-likelihood of the true classes.
    pub fn forward<'a>(y_pred: &Matrix, y_true: impl Into<Targets<'a>>) -> Result<f64> {
        match y_true.into() {
            Targets::Labels(labels) => Self::forward_labels(y_pred, labels),
            Targets::OneHot(onehot) => Self::forward_onehot(y_pred, onehot),
        }
    }

    /// `mean_i -ln(clip(y_pred[i][labels[i]]))`.
    pub fn forward_labels(y_pred: &Matrix, labels: &[usize]) -> Result<f64> {
        check_labels(y_pred, labels)?;
        trace!("cce forward on {:?} with labels", y_pred.shape());

        let total: f64 = y_pred
            .row_iter()
            .zip(labels)
            .map(|(row, &label)| -clip(row[label]).ln())
            .sum();
        Ok(mean(total, y_pred.rows()))
    }

    /// `mean_i -sum_j onehot[i][j] * ln(clip(y_pred[i][j]))`.
    pub fn forward_onehot(y_pred: &Matrix, onehot: &Matrix) -> Result<f64> {
        if let Err(e) = y_pred.same_shape(onehot, "cce one-hot targets") {
            debug!("cce forward rejected: {e}");
            return Err(e);
        }
        trace!("cce forward on {:?} with one-hot targets", y_pred.shape());

        let total: f64 = y_pred
            .row_iter()
            .zip(onehot.row_iter())
            .map(|(p_row, t_row)| {
                -p_row
                    .iter()
                    .zip(t_row)
                    .map(|(&p, &t)| t * clip(p).ln())
                    .sum::<f64>()
            })
            .sum();
        Ok(mean(total, y_pred.rows()))
    }

    /// Gradient of softmax followed by this loss with respect to the logits:
    /// `(probs - onehot) / rows`.
    ///
    /// Feed the result straight into the layer below the softmax; running it
    /// through `ActivationSoftmax::backward` as well would apply the softmax
    /// Jacobian twice.
    pub fn softmax_backward<'a>(
        probs: &Matrix,
        y_true: impl Into<Targets<'a>>,
    ) -> Result<Matrix> {
        let mut dinputs = match y_true.into() {
            Targets::Labels(labels) => {
                check_labels(probs, labels)?;
                let mut d = probs.clone();
                for (row, &label) in d.row_iter_mut().zip(labels) {
                    row[label] -= 1.0;
                }
                d
            }
            Targets::OneHot(onehot) => {
                if let Err(e) = probs.same_shape(onehot, "cce one-hot targets") {
                    debug!("cce softmax_backward rejected: {e}");
                    return Err(e);
                }
                probs.sub(onehot)?
            }
        };
        let n = probs.rows().max(1) as f64;
        for row in dinputs.row_iter_mut() {
            for v in row {
                *v /= n;
            }
        }
        Ok(dinputs)
    }
}

/// Fraction of rows whose highest-scoring column equals the label.
/// Ties go to the lowest column index. An empty batch scores 0.
pub fn accuracy(y_pred: &Matrix, labels: &[usize]) -> Result<f64> {
    check_labels(y_pred, labels)?;
    let correct = y_pred
        .row_iter()
        .zip(labels)
        .filter(|(row, label)| argmax(row) == **label)
        .count();
    Ok(mean(correct as f64, y_pred.rows()))
}

fn check_labels(y_pred: &Matrix, labels: &[usize]) -> Result<()> {
    if labels.len() != y_pred.rows() {
        debug!(
            "cce rejected: {} labels for {} prediction rows",
            labels.len(),
            y_pred.rows()
        );
        return Err(NnError::InvalidArgument(format!(
            "expected {} labels, got {}",
            y_pred.rows(),
            labels.len()
        )));
    }
    if let Some((row, &label)) = labels
        .iter()
        .enumerate()
        .find(|(_, l)| **l >= y_pred.cols())
    {
        debug!(
            "cce rejected: label {label} at row {row} exceeds {} classes",
            y_pred.cols()
        );
        return Err(NnError::InvalidArgument(format!(
            "label {label} at row {row} is not a valid class for {} columns",
            y_pred.cols()
        )));
    }
    Ok(())
}

fn mean(total: f64, rows: usize) -> f64 {
    if rows == 0 {
        0.0
    } else {
        total / rows as f64
    }
}

fn argmax(row: &[f64]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best), (i, &v)| {
            if v > best {
                (i, v)
            } else {
                (best_i, best)
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[1.0]), 0);
    }

    #[test]
    fn empty_batch_has_zero_loss() {
        let y_pred = Matrix::zeros(0, 3).unwrap();
        assert_eq!(
            CategoricalCrossEntropy::forward_labels(&y_pred, &[]).unwrap(),
            0.0
        );
    }
}
