use log::{debug, trace};
use rand::Rng;

use crate::config::InitConfig;
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::math::ops::sum_cols;
use crate::math::random::randn_matrix;

/// Fully connected layer `Y = X * W + b`.
///
/// The layer never updates its own parameters: `weights` and `biases` are
/// public so an optimizer can step them using `dweights()` / `dbiases()`.
#[derive(Debug, Clone)]
pub struct LayerDense {
    /// Shape `(n_inputs, n_neurons)`.
    pub weights: Matrix,
    /// Length `n_neurons`.
    pub biases: Vec<f64>,
    inputs: Option<Matrix>,
    output: Matrix,
    dweights: Matrix,
    dbiases: Vec<f64>,
    dinputs: Matrix,
}

impl LayerDense {
    /// Weights drawn from N(0, 0.01), zero biases.
    pub fn new<R: Rng + ?Sized>(
        n_inputs: usize,
        n_neurons: usize,
        rng: &mut R,
    ) -> Result<LayerDense> {
        LayerDense::with_init(n_inputs, n_neurons, &InitConfig::default(), rng)
    }

    /// Weights drawn from `N(init.mean, init.stddev) * init.scale`, zero biases.
    /// `init.seed` is ignored here; the caller owns the generator.
    pub fn with_init<R: Rng + ?Sized>(
        n_inputs: usize,
        n_neurons: usize,
        init: &InitConfig,
        rng: &mut R,
    ) -> Result<LayerDense> {
        if n_inputs == 0 || n_neurons == 0 {
            return Err(NnError::InvalidArgument(format!(
                "dense layer needs n_inputs > 0 and n_neurons > 0, got {n_inputs}x{n_neurons}"
            )));
        }
        let weights = randn_matrix(
            rng,
            n_inputs,
            n_neurons,
            init.mean,
            init.stddev,
            init.scale,
        )?;
        debug!(
            "dense layer {}x{} initialised from N({}, {}) * {}",
            n_inputs, n_neurons, init.mean, init.stddev, init.scale
        );
        LayerDense::from_params(weights, vec![0.0; n_neurons])
    }

    /// Builds a layer around existing parameters. `biases.len()` must equal
    /// `weights.cols()`.
    pub fn from_params(weights: Matrix, biases: Vec<f64>) -> Result<LayerDense> {
        if weights.rows() == 0 {
            return Err(NnError::InvalidArgument(
                "dense layer weights need at least one row".to_string(),
            ));
        }
        if biases.len() != weights.cols() {
            return Err(NnError::InvalidArgument(format!(
                "dense layer has {} neurons but {} biases",
                weights.cols(),
                biases.len()
            )));
        }
        let (n_inputs, n_neurons) = weights.shape();
        Ok(LayerDense {
            output: Matrix::zeros(0, n_neurons)?,
            dweights: Matrix::zeros(n_inputs, n_neurons)?,
            dbiases: vec![0.0; n_neurons],
            dinputs: Matrix::zeros(0, n_inputs)?,
            inputs: None,
            weights,
            biases,
        })
    }

    pub fn n_inputs(&self) -> usize {
        self.weights.rows()
    }

    pub fn n_neurons(&self) -> usize {
        self.weights.cols()
    }

    /// `output = inputs * weights + biases` (biases broadcast over rows).
    /// Caches `inputs` for the next `backward`.
    pub fn forward(&mut self, inputs: &Matrix) -> Result<&Matrix> {
        if inputs.cols() != self.weights.rows() {
            debug!(
                "dense forward rejected: input width {} vs {} weight rows",
                inputs.cols(),
                self.weights.rows()
            );
            return Err(NnError::InvalidArgument(format!(
                "dense forward: input has {} columns, layer expects {}",
                inputs.cols(),
                self.weights.rows()
            )));
        }
        if self.biases.len() != self.weights.cols() {
            debug!(
                "dense forward rejected: {} biases for {} neurons",
                self.biases.len(),
                self.weights.cols()
            );
            return Err(NnError::InvalidArgument(format!(
                "dense forward: {} biases for {} neurons",
                self.biases.len(),
                self.weights.cols()
            )));
        }
        trace!("dense forward {:?} x {:?}", inputs.shape(), self.weights.shape());

        let mut output = inputs.matmul(&self.weights)?;
        for row in output.row_iter_mut() {
            for (o, &b) in row.iter_mut().zip(&self.biases) {
                *o += b;
            }
        }

        self.inputs = Some(inputs.clone());
        self.output = output;
        Ok(&self.output)
    }

    /// Chain-rule gradients of `Y = X * W + b` given `dvalues = dL/dY`:
    /// `dweights = X^T * dvalues`, `dbiases = column sums of dvalues`,
    /// `dinputs = dvalues * W^T`. Returns `dinputs`.
    pub fn backward(&mut self, dvalues: &Matrix) -> Result<&Matrix> {
        let Some(inputs) = self.inputs.as_ref() else {
            debug!("dense backward rejected: no cached input");
            return Err(NnError::InvalidArgument(
                "dense backward called before forward".to_string(),
            ));
        };
        if dvalues.cols() != self.weights.cols() {
            debug!(
                "dense backward rejected: dvalues width {} vs {} neurons",
                dvalues.cols(),
                self.weights.cols()
            );
            return Err(NnError::InvalidArgument(format!(
                "dense backward: dvalues has {} columns, layer has {} neurons",
                dvalues.cols(),
                self.weights.cols()
            )));
        }
        if dvalues.rows() != inputs.rows() {
            debug!(
                "dense backward rejected: dvalues rows {} vs cached batch {}",
                dvalues.rows(),
                inputs.rows()
            );
            return Err(NnError::InvalidArgument(format!(
                "dense backward: dvalues has {} rows, last forward had {}",
                dvalues.rows(),
                inputs.rows()
            )));
        }
        trace!(
            "dense backward {:?} through {:?}",
            dvalues.shape(),
            self.weights.shape()
        );

        let dweights = inputs.transpose_matmul(dvalues)?;
        let dinputs = dvalues.matmul(&self.weights.transpose()?)?;

        self.dweights = dweights;
        self.dbiases = sum_cols(dvalues);
        self.dinputs = dinputs;
        Ok(&self.dinputs)
    }

    /// Last forward input, if any.
    pub fn inputs(&self) -> Option<&Matrix> {
        self.inputs.as_ref()
    }

    pub fn output(&self) -> &Matrix {
        &self.output
    }

    pub fn dweights(&self) -> &Matrix {
        &self.dweights
    }

    pub fn dbiases(&self) -> &[f64] {
        &self.dbiases
    }

    pub fn dinputs(&self) -> &Matrix {
        &self.dinputs
    }
}
