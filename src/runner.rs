//! Episode rollouts.
//!
//! Every observation handed to the agent or stored for replay is augmented with
//! a time-in-episode feature: `0.0` after `reset`, increased by
//! `time_increment` after every step.
use log::debug;
use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::agent::PolicyAgent;
use crate::env::Env;
use crate::error::{DdpgError, Result};
use crate::replay_buffer::ReplayBuffer;

/// Actions sent to the environment are clipped to `[-ACTION_BOUND, ACTION_BOUND]`
pub const ACTION_BOUND: f32 = 1.0;

/// How actions are chosen during a rollout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Samples from the action space; transitions are stored
    Random,
    /// Policy with exploration noise; transitions are stored
    Train,
    /// Deterministic policy; nothing is stored
    Test,
}

impl Mode {
    pub fn stores_transitions(&self) -> bool {
        !matches!(self, Mode::Test)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeOutcome {
    pub episode_return: f32,
    pub length: usize,
}

/// Returns of a sequence of episodes and their summed length
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RolloutSummary {
    pub returns: Vec<f32>,
    pub total_steps: usize,
}

/// Append the time feature to a raw observation
pub fn augment(observation: ArrayView1<f32>, time: f32) -> Array1<f32> {
    let mut augmented = Array1::zeros(observation.len() + 1);
    augmented.slice_mut(ndarray::s![..observation.len()]).assign(&observation);
    augmented[observation.len()] = time;
    augmented
}

pub struct EpisodeRunner {
    time_increment: f32,
    rng: StdRng,
}

impl EpisodeRunner {
    /// `seed` drives the sampled actions of [`Mode::Random`]
    pub fn new(time_increment: f32, seed: u64) -> Self {
        EpisodeRunner {
            time_increment,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn time_increment(&self) -> f32 {
        self.time_increment
    }

    /// Run one episode until the environment reports `done`.
    pub fn run_episode<E, A>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        buffer: &mut ReplayBuffer,
        mode: Mode,
    ) -> Result<EpisodeOutcome>
    where
        E: Env + ?Sized,
        A: PolicyAgent + ?Sized,
    {
        let mut raw = env.reset()?;
        let mut time = 0.0f32;
        let mut episode_return = 0.0f32;
        let mut length = 0usize;

        loop {
            let observation = augment(raw.view(), time);
            let action = match mode {
                Mode::Random => env.action_space().sample(&mut self.rng),
                Mode::Train => agent.select_action(observation.view(), true)?,
                Mode::Test => agent.select_action(observation.view(), false)?,
            };
            if action.iter().any(|a| !a.is_finite()) {
                return Err(DdpgError::NumericalError(format!(
                    "non-finite action {} at step {}",
                    action, length
                )));
            }
            let action = action.mapv(|a| a.clamp(-ACTION_BOUND, ACTION_BOUND));

            let step = env.step(action.view())?;
            episode_return += step.reward;
            time += self.time_increment;
            length += 1;

            let next_observation = augment(step.observation.view(), time);
            if mode.stores_transitions() {
                let done = if step.done { 1.0 } else { 0.0 };
                buffer.add(observation, action, next_observation, step.reward, done);
            }

            if step.done {
                break;
            }
            raw = step.observation;
        }

        debug!("{:?} episode: return {:.3}, length {}", mode, episode_return, length);
        Ok(EpisodeOutcome { episode_return, length })
    }

    /// Run `episodes` episodes back to back.
    pub fn run_policy<E, A>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        buffer: &mut ReplayBuffer,
        mode: Mode,
        episodes: usize,
    ) -> Result<RolloutSummary>
    where
        E: Env + ?Sized,
        A: PolicyAgent + ?Sized,
    {
        let mut summary = RolloutSummary {
            returns: Vec::with_capacity(episodes),
            total_steps: 0,
        };
        for _ in 0..episodes {
            let outcome = self.run_episode(env, agent, buffer, mode)?;
            summary.returns.push(outcome.episode_return);
            summary.total_steps += outcome.length;
        }
        Ok(summary)
    }
}
