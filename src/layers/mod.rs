pub mod dense;

pub use dense::LayerDense;
