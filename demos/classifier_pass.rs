use flatgrad::{ActivationSoftmax, CategoricalCrossEntropy, LayerDense, Matrix};

fn main() -> flatgrad::Result<()> {
    let weights = Matrix::from_rows(vec![vec![0.10, 0.20, -0.10], vec![0.40, -0.20, 0.00]])?;
    let mut dense = LayerDense::from_params(weights, vec![0.05, -0.05, 0.10])?;

    let x = Matrix::from_rows(vec![vec![1.0, 2.0], vec![-1.0, 3.0]])?;
    let out = dense.forward(&x)?.clone();
    println!("dense output:\n{out}");

    let upstream = Matrix::from_rows(vec![vec![1.0, 0.0, -1.0], vec![0.5, 0.5, -1.0]])?;
    dense.backward(&upstream)?;
    println!("dweights:\n{}", dense.dweights());
    println!("dbiases: {:?}", dense.dbiases());
    println!("dinputs:\n{}", dense.dinputs());

    let logits = Matrix::from_rows(vec![vec![2.0, 1.0, 0.5], vec![1.0, 3.0, 2.0]])?;
    let mut softmax = ActivationSoftmax::new();
    let probs = softmax.forward(&logits).clone();
    println!("softmax:\n{probs}");

    let loss = CategoricalCrossEntropy::forward(&probs, &vec![0usize, 1])?;
    println!("loss = {loss:.6}");
    Ok(())
}
