use log::{debug, trace};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Row-wise softmax. Each row of the output is a probability distribution.
#[derive(Debug, Clone, Default)]
pub struct ActivationSoftmax {
    output: Option<Matrix>,
    dinputs: Option<Matrix>,
}

impl ActivationSoftmax {
    pub fn new() -> Self {
        ActivationSoftmax::default()
    }

    /// Numerically stable softmax: the row maximum is subtracted before
    /// exponentiating, so the largest exponent is `exp(0) = 1` and the row
    /// sum is at least 1.
    ///
    /// Logits must be finite. A row holding `inf` or `NaN` comes out all `NaN`.
    pub fn forward(&mut self, inputs: &Matrix) -> &Matrix {
        trace!("softmax forward {:?}", inputs.shape());
        let mut output = inputs.clone();
        for row in output.row_iter_mut() {
            let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mut sum = 0.0;
            for v in row.iter_mut() {
                *v = (*v - max).exp();
                sum += *v;
            }
            for v in row.iter_mut() {
                *v /= sum;
            }
        }
        self.output.insert(output)
    }

    /// Jacobian-vector product per row without building the n x n Jacobian:
    /// `dinputs[i][j] = out[i][j] * (dvalues[i][j] - sum_k out[i][k] * dvalues[i][k])`.
    ///
    /// Equivalent to multiplying each row of `dvalues` by
    /// [`softmax_jacobian`](crate::math::ops::softmax_jacobian) of that row.
    pub fn backward(&mut self, dvalues: &Matrix) -> Result<&Matrix> {
        let Some(output) = self.output.as_ref() else {
            debug!("softmax backward rejected: no cached output");
            return Err(NnError::InvalidArgument(
                "softmax backward called before forward".to_string(),
            ));
        };
        if let Err(e) = output.same_shape(dvalues, "softmax backward") {
            debug!("softmax backward rejected: {e}");
            return Err(e);
        }
        trace!("softmax backward {:?}", dvalues.shape());

        let mut dinputs = dvalues.clone();
        for (d_row, out_row) in dinputs.row_iter_mut().zip(output.row_iter()) {
            let dot: f64 = out_row.iter().zip(d_row.iter()).map(|(o, d)| o * d).sum();
            for (d, &o) in d_row.iter_mut().zip(out_row) {
                *d = o * (*d - dot);
            }
        }
        Ok(self.dinputs.insert(dinputs))
    }

    pub fn output(&self) -> Option<&Matrix> {
        self.output.as_ref()
    }

    pub fn dinputs(&self) -> Option<&Matrix> {
        self.dinputs.as_ref()
    }
}
