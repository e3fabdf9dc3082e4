pub mod relu;
pub mod softmax;

pub use relu::ActivationReLU;
pub use softmax::ActivationSoftmax;
