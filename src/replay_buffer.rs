use ndarray::{Array1, Array2};
use rand::Rng;
use std::collections::VecDeque;

use crate::error::{DdpgError, Result};

/// One environment step stored for replay
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub observation: Array1<f32>,
    pub action: Array1<f32>,
    pub next_observation: Array1<f32>,
    pub reward: f32,
    /// 1.0 for a terminal step, 0.0 otherwise
    pub done: f32,
}

/// Column-stacked batch of transitions, one row per sample
#[derive(Clone, Debug)]
pub struct TransitionBatch {
    pub observations: Array2<f32>,
    pub actions: Array2<f32>,
    pub rewards: Array1<f32>,
    pub next_observations: Array2<f32>,
    pub dones: Array1<f32>,
}

impl TransitionBatch {
    /// Stack transitions into a batch. All transitions must share dimensions.
    pub fn from_transitions(transitions: &[&Transition]) -> Result<Self> {
        let first = transitions
            .first()
            .ok_or_else(|| DdpgError::EmptyBuffer("cannot stack an empty batch".to_string()))?;
        let (n, obs_dim, act_dim) = (transitions.len(), first.observation.len(), first.action.len());

        let mut observations = Array2::zeros((n, obs_dim));
        let mut actions = Array2::zeros((n, act_dim));
        let mut next_observations = Array2::zeros((n, obs_dim));
        let mut rewards = Array1::zeros(n);
        let mut dones = Array1::zeros(n);

        for (i, t) in transitions.iter().enumerate() {
            if t.observation.len() != obs_dim
                || t.next_observation.len() != obs_dim
                || t.action.len() != act_dim
            {
                return Err(DdpgError::dimension_mismatch(
                    format!("obs {} / act {}", obs_dim, act_dim),
                    format!("obs {} / act {}", t.observation.len(), t.action.len()),
                ));
            }
            observations.row_mut(i).assign(&t.observation);
            actions.row_mut(i).assign(&t.action);
            next_observations.row_mut(i).assign(&t.next_observation);
            rewards[i] = t.reward;
            dones[i] = t.done;
        }

        Ok(TransitionBatch {
            observations,
            actions,
            rewards,
            next_observations,
            dones,
        })
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

/// Uniform experience replay.
///
/// Unbounded by default. With a capacity, the oldest transition is evicted
/// first and sampling stays uniform over the retained window.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: Option<usize>,
    batch_size: usize,
}

impl ReplayBuffer {
    /// Unbounded buffer whose `sample` returns `batch_size` transitions
    pub fn new(batch_size: usize) -> Self {
        ReplayBuffer {
            buffer: VecDeque::new(),
            capacity: None,
            batch_size,
        }
    }

    /// FIFO buffer holding at most `capacity` transitions
    pub fn with_capacity(batch_size: usize, capacity: usize) -> Self {
        ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
            batch_size,
        }
    }

    pub fn add(
        &mut self,
        observation: Array1<f32>,
        action: Array1<f32>,
        next_observation: Array1<f32>,
        reward: f32,
        done: f32,
    ) {
        self.push(Transition {
            observation,
            action,
            next_observation,
            reward,
            done,
        });
    }

    pub fn push(&mut self, transition: Transition) {
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            if self.buffer.len() == capacity {
                self.buffer.pop_front();
            }
        }
        self.buffer.push_back(transition);
    }

    /// Draw `batch_size` indices i.i.d. uniformly, with replacement.
    pub fn sample_indices<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<usize>> {
        if self.buffer.is_empty() {
            return Err(DdpgError::EmptyBuffer("cannot sample from an empty replay buffer".to_string()));
        }
        let len = self.buffer.len();
        Ok((0..self.batch_size).map(|_| rng.gen_range(0..len)).collect())
    }

    /// Draw a batch uniformly at random, with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<TransitionBatch> {
        let indices = self.sample_indices(rng)?;
        let transitions = indices.iter().map(|&i| &self.buffer[i]).collect::<Vec<_>>();
        TransitionBatch::from_transitions(&transitions)
    }

    pub fn get(&self, index: usize) -> Option<&Transition> {
        self.buffer.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}
