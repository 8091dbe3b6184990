use std::path::Path;

use log::trace;
use ndarray::{Array1, ArrayView1, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::error::{DdpgError, Result};
use crate::models::{Actor, Critic};
use crate::replay_buffer::TransitionBatch;
use super::traits::{PolicyAgent, UpdateStats};

fn default_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

/// Deep Deterministic Policy Gradient agent.
///
/// Holds the online actor and critic together with their target copies. The
/// targets are never trained directly; they track the online networks through
/// Polyak averaging after every [`update`](PolicyAgent::update).
///
/// Use [`DdpgBuilder`](super::DdpgBuilder) to create one from environment
/// dimensions, or [`DdpgAgent::new`] to wrap existing networks.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DdpgAgent {
    pub actor: Actor,
    pub critic: Critic,
    pub target_actor: Actor,
    pub target_critic: Critic,
    /// Discount factor
    pub gamma: f32,
    /// Soft update coefficient
    pub tau: f32,
    /// Exploration noise standard deviation
    pub noise_std: f32,
    /// Number of completed updates
    pub updates: usize,
    #[serde(skip, default = "default_rng")]
    rng: StdRng,
}

impl DdpgAgent {
    /// Wrap `actor` and `critic`. The targets start as exact copies.
    pub fn new(
        actor: Actor,
        critic: Critic,
        gamma: f32,
        tau: f32,
        noise_std: f32,
        rng: StdRng,
    ) -> Result<Self> {
        if actor.obs_dim() != critic.obs_dim || actor.act_dim() != critic.act_dim {
            return Err(DdpgError::dimension_mismatch(
                format!("actor over obs {} / act {}", actor.obs_dim(), actor.act_dim()),
                format!("critic over obs {} / act {}", critic.obs_dim, critic.act_dim),
            ));
        }
        let target_actor = actor.clone();
        let target_critic = critic.clone();

        let mut agent = DdpgAgent {
            actor,
            critic,
            target_actor,
            target_critic,
            gamma,
            tau,
            noise_std,
            updates: 0,
            rng,
        };
        agent.align_target()?;
        Ok(agent)
    }

    pub fn obs_dim(&self) -> usize {
        self.actor.obs_dim()
    }

    pub fn act_dim(&self) -> usize {
        self.actor.act_dim()
    }

    /// Reseed the exploration noise
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Bootstrapped critic targets `r + gamma * (1 - done) * Q'(s', mu'(s'))`.
    ///
    /// Uses only the target networks and does not touch any cached state.
    pub fn compute_target_q(&self, batch: &TransitionBatch) -> Result<Array1<f32>> {
        let next_actions = self.target_actor.forward_batch(batch.next_observations.view())?;
        let next_q = self
            .target_critic
            .forward_batch(batch.next_observations.view(), next_actions.view())?;

        let gamma = self.gamma;
        Ok(Zip::from(&batch.rewards)
            .and(&batch.dones)
            .and(&next_q)
            .map_collect(|&r, &d, &q| r + gamma * (1.0 - d) * q))
    }

    /// Polyak-average the online parameters into the targets.
    pub fn soft_update(&mut self) -> Result<()> {
        self.target_actor.network.soft_update_from(&self.actor.network, self.tau)?;
        self.target_critic.network.soft_update_from(&self.critic.network, self.tau)
    }

    fn check_finite(&self, stats: &UpdateStats) -> Result<()> {
        if !(stats.critic_loss.is_finite() && stats.actor_loss.is_finite()) {
            return Err(DdpgError::NumericalError(format!(
                "non-finite loss after update {}: critic {}, actor {}",
                self.updates, stats.critic_loss, stats.actor_loss
            )));
        }
        if !(self.actor.network.is_finite() && self.critic.network.is_finite()) {
            return Err(DdpgError::NumericalError(format!(
                "non-finite parameters after update {}",
                self.updates
            )));
        }
        Ok(())
    }

    /// Save the agent (networks, optimizer state and hyperparameters).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load an agent written by [`save`](Self::save). The exploration noise
    /// is reseeded with 0; call [`reseed`](Self::reseed) to change it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        let agent = bincode::deserialize(&data)?;
        Ok(agent)
    }
}

impl PolicyAgent for DdpgAgent {
    fn select_action(&mut self, observation: ArrayView1<f32>, explore: bool) -> Result<Array1<f32>> {
        let mut action = self.actor.forward(observation)?;
        if explore {
            let normal = Normal::new(0.0, self.noise_std)
                .map_err(|e| DdpgError::NumericalError(e.to_string()))?;
            let rng = &mut self.rng;
            action.mapv_inplace(|a| a + rng.sample(normal));
        }
        Ok(action)
    }

    fn align_target(&mut self) -> Result<()> {
        self.target_actor.network.copy_parameters_from(&self.actor.network)?;
        self.target_critic.network.copy_parameters_from(&self.critic.network)
    }

    fn update(&mut self, batch: &TransitionBatch) -> Result<UpdateStats> {
        if batch.is_empty() {
            return Err(DdpgError::EmptyBuffer("cannot update on an empty batch".to_string()));
        }
        let n = batch.len() as f32;
        let observations = batch.observations.view();

        let target_q = self.compute_target_q(batch)?;
        let (critic_loss, q) = self
            .critic
            .train_step(observations, batch.actions.view(), target_q.view())?;

        // dL/dQ for L = -mean(Q(s, mu(s)))
        let policy_actions = self.actor.forward_train(observations)?;
        let q_gradients = Array1::from_elem(batch.len(), -1.0 / n);
        let (policy_q, action_gradients) =
            self.critic
                .action_gradient(observations, policy_actions.view(), q_gradients.view())?;
        self.actor.step(action_gradients.view())?;

        self.soft_update()?;
        self.updates += 1;

        let stats = UpdateStats {
            critic_loss,
            actor_loss: -policy_q.mean().unwrap_or(0.0),
            mean_q: q.mean().unwrap_or(0.0),
        };
        trace!(
            "update {}: critic_loss {:.5}, actor_loss {:.5}, mean_q {:.5}",
            self.updates, stats.critic_loss, stats.actor_loss, stats.mean_q
        );
        self.check_finite(&stats)?;
        Ok(stats)
    }
}
