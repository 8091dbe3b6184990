use ndarray::{array, Array1};
use crate::layers::LayerGradients;
use crate::optimizer::{Adam, GradientClipper, Optimizer, OptimizerKind, OptimizerWrapper, SGD};

#[test]
fn test_sgd_update_weights() {
    let mut sgd = SGD::new();
    let mut weights = array![[1.0, 1.0], [1.0, 1.0]];
    let gradients = array![[0.1, 0.2], [0.3, 0.4]];

    sgd.update_weights(0, &mut weights, &gradients, 0.01);

    let expected = array![[0.999, 0.998], [0.997, 0.996]];
    for (w, e) in weights.iter().zip(expected.iter()) {
        assert!((w - e).abs() < 1e-6);
    }
}

#[test]
fn test_sgd_update_biases() {
    let mut sgd = SGD::new();
    let mut biases = array![1.0, 1.0];
    sgd.update_biases(0, &mut biases, &array![0.1, 0.2], 0.01);
    assert!((biases[0] - 0.999).abs() < 1e-6);
    assert!((biases[1] - 0.998).abs() < 1e-6);
}

#[test]
fn test_adam_new() {
    let adam = Adam::new(0.9, 0.999, 1e-8);
    assert_eq!(adam.beta1, 0.9);
    assert_eq!(adam.beta2, 0.999);
    assert_eq!(adam.epsilon, 1e-8);
    assert_eq!(adam.t, 0);
}

#[test]
fn test_adam_first_step_is_sign_times_lr() {
    // With bias correction the first Adam step is lr * g / (|g| + eps)
    let mut adam = Adam::default();
    let mut weights = array![[1.0, 1.0], [1.0, 1.0]];
    let gradients = array![[0.1, -0.2], [0.3, -0.4]];

    adam.begin_step();
    adam.update_weights(0, &mut weights, &gradients, 0.01);

    let expected = array![[0.99, 1.01], [0.99, 1.01]];
    for (w, e) in weights.iter().zip(expected.iter()) {
        assert!((w - e).abs() < 1e-5, "{} vs {}", w, e);
    }
}

#[test]
fn test_adam_keeps_state_per_layer() {
    let mut adam = Adam::default();
    let mut first = array![1.0];
    let mut second = array![1.0, 1.0, 1.0];

    for _ in 0..3 {
        adam.begin_step();
        adam.update_biases(0, &mut first, &array![1.0], 0.1);
        adam.update_biases(1, &mut second, &array![-1.0, -1.0, -1.0], 0.1);
    }
    assert_eq!(adam.t, 3);
    assert!(first[0] < 1.0);
    assert!(second.iter().all(|&b| b > 1.0));
    assert!((first[0] - 0.7).abs() < 1e-4);
}

#[test]
fn test_optimizer_kind_builds_wrapper() {
    assert!(matches!(OptimizerKind::Sgd.build(), OptimizerWrapper::SGD(_)));
    assert!(matches!(OptimizerKind::default().build(), OptimizerWrapper::Adam(_)));
}

fn gradients(weights: [f32; 2], bias: f32) -> LayerGradients {
    LayerGradients {
        inputs: array![[0.0]],
        weights: array![[weights[0], weights[1]]],
        biases: Array1::from_elem(1, bias),
    }
}

#[test]
fn test_clip_by_global_norm() {
    let mut grads = vec![gradients([3.0, 0.0], 0.0), gradients([0.0, 4.0], 0.0)];
    assert!((GradientClipper::global_norm(&grads) - 5.0).abs() < 1e-6);

    GradientClipper::ClipByGlobalNorm { max_norm: 1.0 }.clip(&mut grads);
    assert!((GradientClipper::global_norm(&grads) - 1.0).abs() < 1e-6);
    assert!((grads[0].weights[[0, 0]] - 0.6).abs() < 1e-6);
}

#[test]
fn test_clip_by_global_norm_below_limit_is_noop() {
    let mut grads = vec![gradients([0.3, 0.4], 0.0)];
    GradientClipper::ClipByGlobalNorm { max_norm: 10.0 }.clip(&mut grads);
    assert_eq!(grads[0].weights, array![[0.3, 0.4]]);
}

#[test]
fn test_clip_by_value() {
    let mut grads = vec![gradients([-5.0, 0.5], 2.0)];
    GradientClipper::ClipByValue { min: -1.0, max: 1.0 }.clip(&mut grads);
    assert_eq!(grads[0].weights, array![[-1.0, 0.5]]);
    assert_eq!(grads[0].biases, array![1.0]);
}

#[test]
fn test_no_clipper() {
    assert_eq!(GradientClipper::default(), GradientClipper::None);
    assert!(GradientClipper::None.validate().is_ok());
    let mut grads = vec![gradients([100.0, -100.0], 50.0)];
    GradientClipper::None.clip(&mut grads);
    assert_eq!(grads[0].weights, array![[100.0, -100.0]]);
}
