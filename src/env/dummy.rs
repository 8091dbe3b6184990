//! Deterministic environment used in tests.

use std::collections::HashMap;

use ndarray::{Array1, ArrayView1};

use crate::error::{DdpgError, Result};
use super::{BoxSpace, Env, Step};

/// Episodes last exactly `horizon` steps and every step pays `reward`.
///
/// The observation at step `t` is filled with `t as f32`. Every action passed to
/// [`step`](Env::step) is kept and can be inspected with
/// [`sent_actions`](FixedHorizonEnv::sent_actions).
#[derive(Clone, Debug)]
pub struct FixedHorizonEnv {
    horizon: usize,
    reward: f32,
    ticks: usize,
    resets: usize,
    observation_space: BoxSpace,
    action_space: BoxSpace,
    sent_actions: Vec<Array1<f32>>,
}

impl FixedHorizonEnv {
    pub fn new(obs_dim: usize, act_dim: usize, action_limit: f32, horizon: usize) -> Self {
        FixedHorizonEnv {
            horizon: horizon.max(1),
            reward: 1.0,
            ticks: 0,
            resets: 0,
            observation_space: BoxSpace::symmetric(obs_dim, f32::MAX),
            action_space: BoxSpace::symmetric(act_dim, action_limit),
            sent_actions: Vec::new(),
        }
    }

    pub fn with_reward(mut self, reward: f32) -> Self {
        self.reward = reward;
        self
    }

    pub fn sent_actions(&self) -> &[Array1<f32>] {
        &self.sent_actions
    }

    /// Number of `reset` calls so far
    pub fn resets(&self) -> usize {
        self.resets
    }

    fn observation(&self) -> Array1<f32> {
        Array1::from_elem(self.observation_space.dim(), self.ticks as f32)
    }
}

impl Env for FixedHorizonEnv {
    fn reset(&mut self) -> Result<Array1<f32>> {
        self.ticks = 0;
        self.resets += 1;
        Ok(self.observation())
    }

    fn step(&mut self, action: ArrayView1<f32>) -> Result<Step> {
        if action.len() != self.action_space.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} action dims", self.action_space.dim()),
                format!("{} action dims", action.len()),
            ));
        }
        self.sent_actions.push(action.to_owned());
        self.ticks += 1;

        Ok(Step {
            observation: self.observation(),
            reward: self.reward,
            done: self.ticks >= self.horizon,
            info: HashMap::new(),
        })
    }

    fn seed(&mut self, _seed: u64) {}

    fn observation_space(&self) -> &BoxSpace {
        &self.observation_space
    }

    fn action_space(&self) -> &BoxSpace {
        &self.action_space
    }
}
