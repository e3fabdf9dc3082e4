// Tests for the dense layer: initialisation, forward/backward on a worked
// example, and shape validation that must not disturb cached state.

use approx::assert_abs_diff_eq;
use flatgrad::{InitConfig, LayerDense, Matrix, NnError};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn m(rows: Vec<Vec<f64>>) -> Matrix {
    Matrix::from_rows(rows).unwrap()
}

fn assert_matrix_eq(actual: &Matrix, expected: &Matrix) {
    assert_eq!(actual.shape(), expected.shape());
    for (a, e) in actual.as_slice().iter().zip(expected.as_slice()) {
        assert_abs_diff_eq!(*a, *e, epsilon = 1e-12);
    }
}

fn worked_layer() -> LayerDense {
    let weights = m(vec![vec![0.10, 0.20, -0.10], vec![0.40, -0.20, 0.00]]);
    LayerDense::from_params(weights, vec![0.05, -0.05, 0.10]).unwrap()
}

#[test]
fn test_new_shapes_and_zero_biases() {
    let mut rng = StdRng::seed_from_u64(0);
    let layer = LayerDense::new(4, 3, &mut rng).unwrap();
    assert_eq!(layer.weights.shape(), (4, 3));
    assert_eq!(layer.biases, vec![0.0; 3]);
    assert_eq!((layer.n_inputs(), layer.n_neurons()), (4, 3));
    // N(0, 0.01): nothing remotely large.
    assert!(layer.weights.as_slice().iter().all(|w| w.abs() < 0.1));
}

#[test]
fn test_new_is_deterministic_for_a_seed() {
    let a = LayerDense::new(3, 2, &mut StdRng::seed_from_u64(11)).unwrap();
    let b = LayerDense::new(3, 2, &mut StdRng::seed_from_u64(11)).unwrap();
    assert_eq!(a.weights, b.weights);
}

#[test]
fn test_with_init_scales_weights() {
    let init = InitConfig {
        mean: 0.0,
        stddev: 1.0,
        scale: 0.0,
        seed: None,
    };
    let layer = LayerDense::with_init(2, 2, &init, &mut StdRng::seed_from_u64(1)).unwrap();
    assert!(layer.weights.as_slice().iter().all(|&w| w == 0.0));
}

#[test]
fn test_with_init_rejects_negative_stddev() {
    let init = InitConfig {
        stddev: -0.01,
        ..InitConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(1);
    assert!(matches!(
        LayerDense::with_init(2, 2, &init, &mut rng),
        Err(NnError::InvalidArgument(_))
    ));
}

#[test]
fn test_zero_sized_layer_rejected() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        LayerDense::new(0, 3, &mut rng),
        Err(NnError::InvalidArgument(_))
    ));
    assert!(matches!(
        LayerDense::new(3, 0, &mut rng),
        Err(NnError::InvalidArgument(_))
    ));
    let w = Matrix::zeros(2, 3).unwrap();
    assert!(matches!(
        LayerDense::from_params(w, vec![0.0; 2]),
        Err(NnError::InvalidArgument(_))
    ));
}

#[test]
fn test_forward_worked_example() {
    let mut layer = worked_layer();
    let x = m(vec![vec![1.0, 2.0], vec![-1.0, 3.0]]);
    let out = layer.forward(&x).unwrap().clone();
    let expected = m(vec![vec![0.95, -0.25, 0.0], vec![1.15, -0.85, 0.2]]);
    assert_matrix_eq(&out, &expected);
    assert_eq!(layer.inputs(), Some(&x));
}

#[test]
fn test_backward_worked_example() {
    let mut layer = worked_layer();
    layer.forward(&m(vec![vec![1.0, 2.0], vec![-1.0, 3.0]])).unwrap();

    let dvalues = m(vec![vec![1.0, 0.0, -1.0], vec![0.5, 0.5, -1.0]]);
    let dinputs = layer.backward(&dvalues).unwrap().clone();

    let expected_dweights = m(vec![vec![0.5, -0.5, 0.0], vec![3.5, 1.5, -5.0]]);
    assert_matrix_eq(layer.dweights(), &expected_dweights);
    for (a, e) in layer.dbiases().iter().zip(&[1.5, 0.5, -2.0]) {
        assert_abs_diff_eq!(*a, *e, epsilon = 1e-12);
    }
    assert_matrix_eq(&dinputs, &m(vec![vec![0.2, 0.4], vec![0.25, 0.1]]));
    assert_eq!(layer.dinputs(), &dinputs);
}

#[test]
fn test_forward_rejects_wrong_width_without_touching_cache() {
    let mut layer = worked_layer();
    let x = m(vec![vec![1.0, 2.0]]);
    layer.forward(&x).unwrap();
    let before = layer.output().clone();

    let bad = Matrix::zeros(1, 3).unwrap();
    assert!(matches!(
        layer.forward(&bad),
        Err(NnError::InvalidArgument(_))
    ));
    assert_eq!(layer.inputs(), Some(&x));
    assert_eq!(layer.output(), &before);
}

#[test]
fn test_backward_before_forward() {
    let mut layer = worked_layer();
    let dvalues = Matrix::zeros(1, 3).unwrap();
    assert!(matches!(
        layer.backward(&dvalues),
        Err(NnError::InvalidArgument(_))
    ));
}

#[test]
fn test_backward_rejects_bad_shapes_without_touching_gradients() {
    let mut layer = worked_layer();
    layer.forward(&m(vec![vec![1.0, 2.0], vec![-1.0, 3.0]])).unwrap();
    layer.backward(&m(vec![vec![1.0, 0.0, -1.0], vec![0.5, 0.5, -1.0]])).unwrap();
    let dweights = layer.dweights().clone();
    let dbiases = layer.dbiases().to_vec();
    let dinputs = layer.dinputs().clone();

    let wrong_cols = Matrix::zeros(2, 2).unwrap();
    let wrong_rows = Matrix::zeros(3, 3).unwrap();
    assert!(matches!(
        layer.backward(&wrong_cols),
        Err(NnError::InvalidArgument(_))
    ));
    assert!(matches!(
        layer.backward(&wrong_rows),
        Err(NnError::InvalidArgument(_))
    ));

    assert_eq!(layer.dweights(), &dweights);
    assert_eq!(layer.dbiases(), dbiases.as_slice());
    assert_eq!(layer.dinputs(), &dinputs);
}

#[test]
fn test_empty_batch_round_trip() {
    let mut layer = worked_layer();
    let out = layer.forward(&Matrix::zeros(0, 2).unwrap()).unwrap();
    assert_eq!(out.shape(), (0, 3));

    layer.backward(&Matrix::zeros(0, 3).unwrap()).unwrap();
    assert_eq!(layer.dweights(), &Matrix::zeros(2, 3).unwrap());
    assert_eq!(layer.dbiases(), &[0.0, 0.0, 0.0]);
    assert_eq!(layer.dinputs().shape(), (0, 2));
}
