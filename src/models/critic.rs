use ndarray::{s, concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::layers::WeightInit;
use crate::network::NeuralNetwork;
use crate::optimizer::{GradientClipper, OptimizerWrapper};
use super::OUTPUT_INIT;

/// Action-value function `Q(s, a)` over the concatenated observation and action
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Critic {
    pub network: NeuralNetwork,
    pub obs_dim: usize,
    pub act_dim: usize,
    pub learning_rate: f32,
    pub clipper: GradientClipper,
}

impl Critic {
    pub fn new<R: Rng + ?Sized>(
        obs_dim: usize,
        act_dim: usize,
        hidden_sizes: &[usize],
        hidden_activation: Activation,
        optimizer: OptimizerWrapper,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        let mut sizes = vec![obs_dim + act_dim];
        sizes.extend_from_slice(hidden_sizes);
        sizes.push(1);

        let activations = vec![hidden_activation; hidden_sizes.len()]
            .into_iter()
            .chain(std::iter::once(Activation::Linear))
            .collect::<Vec<_>>();

        let network = NeuralNetwork::new(
            &sizes,
            &activations,
            WeightInit::FanInUniform,
            OUTPUT_INIT,
            optimizer,
            rng,
        )?;

        Ok(Critic {
            network,
            obs_dim,
            act_dim,
            learning_rate,
            clipper: GradientClipper::None,
        })
    }

    pub fn with_clipper(mut self, clipper: GradientClipper) -> Self {
        self.clipper = clipper;
        self
    }

    fn inputs(&self, observations: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array2<f32>> {
        if observations.nrows() != actions.nrows() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} action rows", observations.nrows()),
                format!("{} action rows", actions.nrows()),
            ));
        }
        if actions.ncols() != self.act_dim {
            return Err(DdpgError::dimension_mismatch(
                format!("{} action features", self.act_dim),
                format!("{} action features", actions.ncols()),
            ));
        }
        Ok(concatenate(Axis(1), &[observations.view(), actions.view()])?)
    }

    /// Q-values for a batch, without caching
    pub fn forward_batch(&self, observations: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array1<f32>> {
        let inputs = self.inputs(observations, actions)?;
        Ok(self.network.predict(inputs.view())?.column(0).to_owned())
    }

    /// Q-value for a single observation/action pair
    pub fn forward(&self, observation: ArrayView1<f32>, action: ArrayView1<f32>) -> Result<f32> {
        let q = self.forward_batch(
            observation.insert_axis(Axis(0)),
            action.insert_axis(Axis(0)),
        )?;
        Ok(q[0])
    }

    /// One gradient step on `mean((Q(s, a) - targets)^2)`. Returns the loss and
    /// the Q-values measured before the step.
    pub fn train_step(
        &mut self,
        observations: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        targets: ArrayView1<f32>,
    ) -> Result<(f32, Array1<f32>)> {
        let n = observations.nrows();
        if targets.len() != n {
            return Err(DdpgError::dimension_mismatch(
                format!("{} targets", n),
                format!("{} targets", targets.len()),
            ));
        }
        let inputs = self.inputs(observations, actions)?;
        let q = self.network.forward_batch(inputs.view())?;

        let q = q.column(0).to_owned();
        let errors = &q - &targets;
        let loss = errors.mapv(|e| e * e).mean().unwrap_or(0.0);

        let output_errors = (errors * (2.0 / n as f32)).insert_axis(Axis(1));
        let mut grads = self.network.backward_batch(output_errors.view())?;
        self.network.apply_gradients(&mut grads.layers, &self.clipper, self.learning_rate)?;
        Ok((loss, q))
    }

    /// Backpropagate `q_gradients` (dL/dQ per sample) to the action inputs.
    ///
    /// Returns the Q-values and dL/da. Critic parameters are not modified.
    pub fn action_gradient(
        &mut self,
        observations: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        q_gradients: ArrayView1<f32>,
    ) -> Result<(Array1<f32>, Array2<f32>)> {
        let inputs = self.inputs(observations, actions)?;
        let q = self.network.forward_batch(inputs.view())?;
        if q_gradients.len() != q.nrows() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} q gradients", q.nrows()),
                format!("{} q gradients", q_gradients.len()),
            ));
        }

        let grads = self.network.backward_batch(q_gradients.insert_axis(Axis(1)))?;
        let action_grads = grads.inputs.slice(s![.., self.obs_dim..]).to_owned();
        Ok((q.column(0).to_owned(), action_grads))
    }
}
