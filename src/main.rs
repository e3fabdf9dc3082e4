// The binary is a thin caller over the library: one forward/backward pass
// through dense -> relu -> dense -> softmax on a fixed toy batch.
// Set RUST_LOG=debug (or trace) to see the library's records.
use flatgrad::{
    accuracy, ActivationReLU, ActivationSoftmax, CategoricalCrossEntropy, DenseSpec, InitConfig,
    Matrix, Result,
};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("flatgrad: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let init = InitConfig::seeded(7);
    let mut dense1 = DenseSpec {
        n_inputs: 2,
        n_neurons: 3,
        init: init.clone(),
    }
    .build()?;
    let mut dense2 = DenseSpec {
        n_inputs: 3,
        n_neurons: 3,
        init,
    }
    .build()?;
    let mut relu = ActivationReLU::new();
    let mut softmax = ActivationSoftmax::new();

    let x = Matrix::from_rows(vec![
        vec![0.0, 0.0],
        vec![0.5, -0.5],
        vec![-1.0, 1.0],
        vec![1.0, 1.0],
    ])?;
    let labels = vec![0usize, 1, 2, 1];

    let hidden = dense1.forward(&x)?.clone();
    let activated = relu.forward(&hidden).clone();
    let logits = dense2.forward(&activated)?.clone();
    let probs = softmax.forward(&logits).clone();

    let loss = CategoricalCrossEntropy::forward(&probs, &labels)?;
    let acc = accuracy(&probs, &labels)?;
    println!("loss = {loss:.6}, accuracy = {acc:.2}");

    let dlogits = CategoricalCrossEntropy::softmax_backward(&probs, &labels)?;
    let dhidden = dense2.backward(&dlogits)?.clone();
    let drelu = relu.backward(&dhidden)?.clone();
    dense1.backward(&drelu)?;

    println!("dense1 dweights:\n{}", dense1.dweights());
    println!("dense1 dbiases: {:?}", dense1.dbiases());
    println!("dense2 dweights:\n{}", dense2.dweights());
    Ok(())
}
