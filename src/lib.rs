pub mod activation;
pub mod config;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;

// Convenience re-exports
pub use activation::{ActivationReLU, ActivationSoftmax};
pub use config::{DenseSpec, InitConfig};
pub use error::{NnError, Result};
pub use layers::dense::LayerDense;
pub use loss::{accuracy, CategoricalCrossEntropy, Targets};
pub use math::matrix::Matrix;
pub use math::ops::{
    elementwise_max, elementwise_mul, numerical_gradient, softmax_jacobian, sum_cols, sum_rows,
    transpose, NUMERICAL_EPS,
};
pub use math::random::{randn, randn_matrix};
