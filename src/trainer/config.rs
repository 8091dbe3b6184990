use serde::{Deserialize, Serialize};

use crate::error::{DdpgError, Result};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Environment identifier passed to [`make_env`](crate::env::make_env).
    pub env_name: String,

    /// Episodes of uniformly random actions before training starts.
    pub start_episodes: usize,

    /// Training episode budget. `num_episodes / eval_freq` evaluations are run.
    pub num_episodes: usize,

    /// Episodes collected per rollout batch; also the divisor of the update count.
    pub batch_size: usize,

    /// Rollout batches between evaluations.
    pub eval_freq: usize,

    /// Deterministic episodes per evaluation.
    pub eval_episodes: usize,

    pub seed: u64,

    /// Transitions per sampled minibatch.
    pub gradient_batch_size: usize,

    /// Replay capacity; unbounded when `None`.
    pub replay_capacity: Option<usize>,

    /// Per-step increment of the time feature appended to observations.
    pub time_increment: f32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            env_name: "Pendulum-v0".to_string(),
            start_episodes: 10,
            num_episodes: 1000,
            batch_size: 1,
            eval_freq: 10,
            eval_episodes: 10,
            seed: 0,
            gradient_batch_size: 100,
            replay_capacity: None,
            time_increment: 1e-3,
        }
    }
}

impl TrainerConfig {
    pub fn env_name<T: Into<String>>(mut self, v: T) -> Self {
        self.env_name = v.into();
        self
    }

    pub fn start_episodes(mut self, v: usize) -> Self {
        self.start_episodes = v;
        self
    }

    pub fn num_episodes(mut self, v: usize) -> Self {
        self.num_episodes = v;
        self
    }

    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    pub fn eval_freq(mut self, v: usize) -> Self {
        self.eval_freq = v;
        self
    }

    pub fn eval_episodes(mut self, v: usize) -> Self {
        self.eval_episodes = v;
        self
    }

    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    pub fn gradient_batch_size(mut self, v: usize) -> Self {
        self.gradient_batch_size = v;
        self
    }

    pub fn replay_capacity(mut self, v: Option<usize>) -> Self {
        self.replay_capacity = v;
        self
    }

    pub fn time_increment(mut self, v: f32) -> Self {
        self.time_increment = v;
        self
    }

    /// Number of evaluations, `num_episodes / eval_freq`
    pub fn num_iterations(&self) -> usize {
        self.num_episodes / self.eval_freq
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("batch_size", self.batch_size),
            ("eval_freq", self.eval_freq),
            ("gradient_batch_size", self.gradient_batch_size),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(DdpgError::invalid_parameter(name, "must be positive"));
            }
        }
        if self.replay_capacity == Some(0) {
            return Err(DdpgError::invalid_parameter("replay_capacity", "must be positive when set"));
        }
        if !self.time_increment.is_finite() {
            return Err(DdpgError::invalid_parameter(
                "time_increment".to_string(),
                format!("must be finite, got {}", self.time_increment),
            ));
        }
        Ok(())
    }
}
