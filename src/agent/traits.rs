use ndarray::{Array1, ArrayView1};

use crate::error::Result;
use crate::replay_buffer::TransitionBatch;

/// Losses and value estimate reported by one optimization step
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UpdateStats {
    /// Mean squared TD error before the critic step
    pub critic_loss: f32,
    /// `-mean(Q(s, mu(s)))` against the updated critic
    pub actor_loss: f32,
    /// Mean Q-value of the sampled state-action pairs
    pub mean_q: f32,
}

/// Interface the episode runner and trainer use to drive an agent.
pub trait PolicyAgent {
    /// Action for `observation`. With `explore`, Gaussian noise is added to
    /// every dimension. The result is not clipped.
    fn select_action(&mut self, observation: ArrayView1<f32>, explore: bool) -> Result<Array1<f32>>;

    /// Copy online parameters into the target networks.
    fn align_target(&mut self) -> Result<()>;

    /// One optimization step on `batch`, followed by a soft target update.
    fn update(&mut self, batch: &TransitionBatch) -> Result<UpdateStats>;
}
