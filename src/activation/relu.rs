use log::{debug, trace};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::math::ops::elementwise_max;

/// Rectified linear unit, `max(0, x)` per cell.
#[derive(Debug, Clone, Default)]
pub struct ActivationReLU {
    inputs: Option<Matrix>,
    output: Option<Matrix>,
    dinputs: Option<Matrix>,
}

impl ActivationReLU {
    pub fn new() -> Self {
        ActivationReLU::default()
    }

    pub fn forward(&mut self, inputs: &Matrix) -> &Matrix {
        trace!("relu forward {:?}", inputs.shape());
        self.inputs = Some(inputs.clone());
        self.output.insert(elementwise_max(inputs, 0.0))
    }

    /// Passes `dvalues` through where the cached input was positive and
    /// zeroes it elsewhere, including at exactly 0.
    pub fn backward(&mut self, dvalues: &Matrix) -> Result<&Matrix> {
        let Some(inputs) = self.inputs.as_ref() else {
            debug!("relu backward rejected: no cached input");
            return Err(NnError::InvalidArgument(
                "relu backward called before forward".to_string(),
            ));
        };
        if let Err(e) = inputs.same_shape(dvalues, "relu backward") {
            debug!("relu backward rejected: {e}");
            return Err(e);
        }
        trace!("relu backward {:?}", dvalues.shape());

        let dinputs =
            dvalues.zip_with(inputs, "relu backward", |d, x| if x > 0.0 { d } else { 0.0 })?;
        Ok(self.dinputs.insert(dinputs))
    }

    pub fn output(&self) -> Option<&Matrix> {
        self.output.as_ref()
    }

    pub fn dinputs(&self) -> Option<&Matrix> {
        self.dinputs.as_ref()
    }
}
