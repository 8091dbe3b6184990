use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::layers::{DenseLayer, LayerGradients, WeightInit};
use crate::optimizer::{GradientClipper, Optimizer, OptimizerWrapper};

/// Output of [`NeuralNetwork::backward_batch`]
#[derive(Debug, Clone)]
pub struct NetworkGradients {
    /// Parameter gradients, in layer order
    pub layers: Vec<LayerGradients>,
    /// dL/dx for the network inputs
    pub inputs: Array2<f32>,
}

/// A feed-forward network of dense layers together with its optimizer.
///
/// `predict` and `forward` are pure and may be called on target networks.
/// Training goes through `forward_batch` (which caches activations),
/// `backward_batch` and `apply_gradients`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Create a new network with the given layer sizes and activations.
    ///
    /// Hidden layers use `init`; the output layer uses `output_init`.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        init: WeightInit,
        output_init: WeightInit,
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DdpgError::invalid_parameter(
                "layer_sizes",
                "must have at least input and output sizes",
            ));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} activations", layer_sizes.len() - 1),
                format!("{} activations", activations.len()),
            ));
        }
        if layer_sizes.iter().any(|&s| s == 0) {
            return Err(DdpgError::invalid_parameter("layer_sizes", "sizes must be positive"));
        }

        let last = activations.len() - 1;
        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .enumerate()
            .map(|(i, (window, &activation))| {
                let init = if i == last { output_init } else { init };
                DenseLayer::new(window[0], window[1], activation, init, rng)
            })
            .collect::<Vec<_>>();

        Ok(NeuralNetwork { layers, optimizer })
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size())
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.output_size())
    }

    pub fn num_parameters(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len() + l.biases.len()).sum()
    }

    fn check_input(&self, cols: usize) -> Result<()> {
        if cols != self.input_size() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} input features", self.input_size()),
                format!("{} input features", cols),
            ));
        }
        Ok(())
    }

    /// Pure forward pass for a batch of inputs (one row per sample).
    pub fn predict(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(inputs.ncols())?;
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            current = layer.predict(current.view());
        }
        Ok(current)
    }

    /// Pure forward pass for a single input vector.
    pub fn forward(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        let output = self.predict(input.insert_axis(Axis(0)))?;
        Ok(output.index_axis_move(Axis(0), 0))
    }

    /// Forward pass that caches activations for a following `backward_batch`.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(inputs.ncols())?;
        let mut current = inputs.to_owned();
        for layer in &mut self.layers {
            current = layer.forward_batch(current.view());
        }
        Ok(current)
    }

    /// Backpropagate dL/d(output) through the batch cached by the last
    /// `forward_batch`. Parameters are not modified.
    pub fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<NetworkGradients> {
        let mut layers = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for layer in self.layers.iter().rev() {
            let grads = layer.backward_batch(current_error.view())?;
            current_error = grads.inputs.clone();
            layers.push(grads);
        }

        layers.reverse();
        Ok(NetworkGradients { layers, inputs: current_error })
    }

    /// Clip and apply parameter gradients with the network's optimizer.
    pub fn apply_gradients(
        &mut self,
        gradients: &mut [LayerGradients],
        clipper: &GradientClipper,
        learning_rate: f32,
    ) -> Result<()> {
        if gradients.len() != self.layers.len() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} layer gradients", self.layers.len()),
                format!("{} layer gradients", gradients.len()),
            ));
        }
        clipper.clip(gradients);

        self.optimizer.begin_step();
        for (idx, (layer, grads)) in self.layers.iter_mut().zip(gradients.iter()).enumerate() {
            self.optimizer.update_weights(idx, &mut layer.weights, &grads.weights, learning_rate);
            self.optimizer.update_biases(idx, &mut layer.biases, &grads.biases, learning_rate);
        }
        Ok(())
    }

    fn check_same_shape(&self, other: &NeuralNetwork) -> Result<()> {
        let same = self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(other.layers.iter())
                .all(|(a, b)| a.weights.dim() == b.weights.dim() && a.biases.dim() == b.biases.dim());
        if !same {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", self.shape()),
                format!("{:?}", other.shape()),
            ));
        }
        Ok(())
    }

    /// Layer sizes from input to output
    pub fn shape(&self) -> Vec<usize> {
        let mut sizes = vec![self.input_size()];
        sizes.extend(self.layers.iter().map(|l| l.output_size()));
        sizes
    }

    /// Hard copy of every parameter from `source`.
    pub fn copy_parameters_from(&mut self, source: &NeuralNetwork) -> Result<()> {
        self.check_same_shape(source)?;
        for (target, source) in self.layers.iter_mut().zip(source.layers.iter()) {
            target.weights.assign(&source.weights);
            target.biases.assign(&source.biases);
        }
        Ok(())
    }

    /// Polyak averaging: `self ← tau * source + (1 - tau) * self`.
    pub fn soft_update_from(&mut self, source: &NeuralNetwork, tau: f32) -> Result<()> {
        self.check_same_shape(source)?;
        for (target, source) in self.layers.iter_mut().zip(source.layers.iter()) {
            target.weights.zip_mut_with(&source.weights, |t, &s| *t = tau * s + (1.0 - tau) * *t);
            target.biases.zip_mut_with(&source.biases, |t, &s| *t = tau * s + (1.0 - tau) * *t);
        }
        Ok(())
    }

    /// True when both networks hold exactly the same parameter values
    pub fn parameters_equal(&self, other: &NeuralNetwork) -> bool {
        self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(other.layers.iter())
                .all(|(a, b)| a.weights == b.weights && a.biases == b.biases)
    }

    pub fn is_finite(&self) -> bool {
        self.layers.iter().all(|l| l.is_finite())
    }
}
