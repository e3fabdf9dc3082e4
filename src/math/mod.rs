pub mod matrix;
pub mod ops;
pub mod random;

pub use matrix::Matrix;
