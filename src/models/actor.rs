use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::layers::WeightInit;
use crate::network::NeuralNetwork;
use crate::optimizer::{GradientClipper, OptimizerWrapper};
use super::OUTPUT_INIT;

/// Deterministic policy `mu(s) = action_scale * tanh(f(s))`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Actor {
    pub network: NeuralNetwork,
    pub action_scale: f32,
    pub learning_rate: f32,
    pub clipper: GradientClipper,
}

impl Actor {
    pub fn new<R: Rng + ?Sized>(
        obs_dim: usize,
        act_dim: usize,
        action_scale: f32,
        hidden_sizes: &[usize],
        hidden_activation: Activation,
        optimizer: OptimizerWrapper,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if !(action_scale.is_finite() && action_scale > 0.0) {
            return Err(DdpgError::invalid_parameter(
                "action_scale".to_string(),
                format!("must be positive and finite, got {}", action_scale),
            ));
        }

        let mut sizes = vec![obs_dim];
        sizes.extend_from_slice(hidden_sizes);
        sizes.push(act_dim);

        let activations = vec![hidden_activation; hidden_sizes.len()]
            .into_iter()
            .chain(std::iter::once(Activation::Tanh))
            .collect::<Vec<_>>();

        let network = NeuralNetwork::new(
            &sizes,
            &activations,
            WeightInit::FanInUniform,
            OUTPUT_INIT,
            optimizer,
            rng,
        )?;

        Ok(Actor {
            network,
            action_scale,
            learning_rate,
            clipper: GradientClipper::None,
        })
    }

    pub fn with_clipper(mut self, clipper: GradientClipper) -> Self {
        self.clipper = clipper;
        self
    }

    pub fn obs_dim(&self) -> usize {
        self.network.input_size()
    }

    pub fn act_dim(&self) -> usize {
        self.network.output_size()
    }

    /// Action for a single observation
    pub fn forward(&self, observation: ArrayView1<f32>) -> Result<Array1<f32>> {
        Ok(self.network.forward(observation)? * self.action_scale)
    }

    /// Actions for a batch of observations, without caching
    pub fn forward_batch(&self, observations: ArrayView2<f32>) -> Result<Array2<f32>> {
        Ok(self.network.predict(observations)? * self.action_scale)
    }

    /// Actions for a batch of observations, cached for [`step`](Self::step)
    pub fn forward_train(&mut self, observations: ArrayView2<f32>) -> Result<Array2<f32>> {
        Ok(self.network.forward_batch(observations)? * self.action_scale)
    }

    /// One gradient step given dL/da for the batch of the last `forward_train`.
    pub fn step(&mut self, action_gradients: ArrayView2<f32>) -> Result<()> {
        let output_errors = &action_gradients * self.action_scale;
        let mut grads = self.network.backward_batch(output_errors.view())?;
        self.network.apply_gradients(&mut grads.layers, &self.clipper, self.learning_rate)
    }
}
