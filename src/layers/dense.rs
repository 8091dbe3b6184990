use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use super::initialization::WeightInit;

/// Gradients produced by one backward pass through a dense layer
#[derive(Debug, Clone)]
pub struct LayerGradients {
    /// Error with respect to the layer inputs, passed on to the previous layer
    pub inputs: Array2<f32>,
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

/// A fully connected (dense) layer: `y = act(x W + b)`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    #[serde(skip)]
    pre_activation_output: Option<Array2<f32>>,
    #[serde(skip)]
    inputs: Option<Array2<f32>>,
}

impl DenseLayer {
    /// Create a new dense layer with the given input size, output size and
    /// activation function, drawing its parameters from `rng`.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Self {
        let weights = init.initialize_weights((input_size, output_size), rng);
        let biases = init.initialize_biases(input_size, output_size, rng);
        DenseLayer {
            weights,
            biases,
            activation,
            pre_activation_output: None,
            inputs: None,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Result<Self> {
        if weights.dim() != self.weights.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", self.weights.dim()),
                format!("{:?}", weights.dim()),
            ));
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Result<Self> {
        if biases.dim() != self.biases.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{}", self.biases.len()),
                format!("{}", biases.len()),
            ));
        }
        self.biases = biases;
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    fn affine(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0))
    }

    /// Forward pass for a batch without touching the backward cache.
    pub fn predict(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = self.affine(inputs);
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Forward pass for a batch, caching what [`backward_batch`](Self::backward_batch) needs.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = self.affine(inputs);
        self.inputs = Some(inputs.to_owned());
        self.pre_activation_output = Some(outputs.clone());
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Backpropagate `output_errors` (dL/dy, one row per sample) through the
    /// batch cached by the last `forward_batch`.
    pub fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<LayerGradients> {
        let (pre_activation_output, inputs) = match (&self.pre_activation_output, &self.inputs) {
            (Some(z), Some(x)) => (z, x),
            _ => {
                return Err(DdpgError::TrainingError(
                    "forward_batch() must be called before backward_batch()".to_string(),
                ))
            }
        };
        if output_errors.dim() != pre_activation_output.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", pre_activation_output.dim()),
                format!("{:?}", output_errors.dim()),
            ));
        }

        let activation_deriv = self.activation.derivative_batch(pre_activation_output.view());
        let adjusted_error = &output_errors * &activation_deriv;
        let weights = inputs.t().dot(&adjusted_error);
        let biases = adjusted_error.sum_axis(Axis(0));
        let inputs = adjusted_error.dot(&self.weights.t());

        Ok(LayerGradients { inputs, weights, biases })
    }

    /// True when every weight and bias is finite
    pub fn is_finite(&self) -> bool {
        self.weights.iter().chain(self.biases.iter()).all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn layer(activation: Activation) -> DenseLayer {
        DenseLayer::new(2, 2, activation, WeightInit::FanInUniform, &mut StdRng::seed_from_u64(0))
            .with_weights(array![[1.0, -1.0], [0.5, 2.0]])
            .unwrap()
            .with_biases(array![0.0, 1.0])
            .unwrap()
    }

    #[test]
    fn test_predict_matches_forward() {
        let mut layer = layer(Activation::Relu);
        let x = array![[1.0, 2.0], [-3.0, 0.5]];
        let predicted = layer.predict(x.view());
        let forwarded = layer.forward_batch(x.view());
        assert_eq!(predicted, forwarded);
        assert_eq!(predicted, array![[2.0, 4.0], [0.0, 5.0]]);
    }

    #[test]
    fn test_backward_linear() {
        let mut layer = layer(Activation::Linear);
        let x = array![[1.0, 2.0]];
        layer.forward_batch(x.view());
        let grads = layer.backward_batch(array![[1.0, 0.0]].view()).unwrap();
        assert_eq!(grads.weights, array![[1.0, 0.0], [2.0, 0.0]]);
        assert_eq!(grads.biases, array![1.0, 0.0]);
        assert_eq!(grads.inputs, array![[1.0, 0.5]]);
    }

    #[test]
    fn test_backward_requires_forward() {
        let layer = layer(Activation::Relu);
        assert!(layer.backward_batch(array![[1.0, 1.0]].view()).is_err());
    }

    #[test]
    fn test_with_weights_rejects_wrong_shape() {
        let layer = DenseLayer::new(2, 3, Activation::Relu, WeightInit::HeUniform, &mut StdRng::seed_from_u64(1));
        assert!(layer.with_weights(Array2::zeros((3, 3))).is_err());
    }
}
