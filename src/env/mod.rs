//! # Environments
//!
//! The training loop talks to simulators only through the [`Env`] trait, a
//! gym-style contract: `reset`, `step`, `seed` and the observation/action
//! [`BoxSpace`] bounds.
//!
//! - [`Pendulum`]: classic swing-up task with a one-dimensional torque action
//! - [`FixedHorizonEnv`]: deterministic environment for tests, records every action
//!
//! Use [`make_env`] to build an environment from its identifier.

pub mod dummy;
pub mod pendulum;

use std::collections::HashMap;

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use rand_distr::{Exp1, StandardNormal};

use crate::error::{DdpgError, Result};

pub use dummy::FixedHorizonEnv;
pub use pendulum::Pendulum;

/// Result of one environment step
#[derive(Clone, Debug)]
pub struct Step {
    pub observation: Array1<f32>,
    pub reward: f32,
    pub done: bool,
    pub info: HashMap<String, f32>,
}

/// Axis-aligned box `[low, high]` in every dimension
#[derive(Clone, Debug, PartialEq)]
pub struct BoxSpace {
    pub low: Array1<f32>,
    pub high: Array1<f32>,
}

impl BoxSpace {
    pub fn new(low: Array1<f32>, high: Array1<f32>) -> Result<Self> {
        if low.len() != high.len() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} upper bounds", low.len()),
                format!("{} upper bounds", high.len()),
            ));
        }
        if low.iter().zip(high.iter()).any(|(l, h)| l > h || l.is_nan() || h.is_nan()) {
            return Err(DdpgError::invalid_parameter("bounds", "low must not exceed high"));
        }
        Ok(BoxSpace { low, high })
    }

    /// Same bound `[-limit, limit]` in each of `dim` dimensions
    pub fn symmetric(dim: usize, limit: f32) -> Self {
        BoxSpace {
            low: Array1::from_elem(dim, -limit),
            high: Array1::from_elem(dim, limit),
        }
    }

    pub fn dim(&self) -> usize {
        self.low.len()
    }

    /// Sample from the box, per dimension:
    ///
    /// - bounded: uniform over `[low, high]`
    /// - bounded on one side: the bound shifted by an `Exp(1)` draw
    /// - unbounded: standard normal
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Array1<f32> {
        self.low
            .iter()
            .zip(self.high.iter())
            .map(|(&l, &h)| match (l.is_finite(), h.is_finite()) {
                _ if l >= h => l,
                // f64 keeps `h - l` finite for any pair of finite f32 bounds
                (true, true) => (rng.gen_range(l as f64..=h as f64) as f32).clamp(l, h),
                (true, false) => l + rng.sample::<f32, _>(Exp1),
                (false, true) => h - rng.sample::<f32, _>(Exp1),
                (false, false) => rng.sample(StandardNormal),
            })
            .collect()
    }

    pub fn contains(&self, x: ArrayView1<f32>) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(v, (l, h))| v >= l && v <= h)
    }
}

/// A single-agent environment with continuous actions
pub trait Env {
    /// Start a new episode and return its first observation
    fn reset(&mut self) -> Result<Array1<f32>>;

    /// Advance one step with `action`
    fn step(&mut self, action: ArrayView1<f32>) -> Result<Step>;

    /// Reseed the environment's own random source
    fn seed(&mut self, seed: u64);

    fn observation_space(&self) -> &BoxSpace;

    fn action_space(&self) -> &BoxSpace;
}

impl<E: Env + ?Sized> Env for Box<E> {
    fn reset(&mut self) -> Result<Array1<f32>> {
        (**self).reset()
    }

    fn step(&mut self, action: ArrayView1<f32>) -> Result<Step> {
        (**self).step(action)
    }

    fn seed(&mut self, seed: u64) {
        (**self).seed(seed)
    }

    fn observation_space(&self) -> &BoxSpace {
        (**self).observation_space()
    }

    fn action_space(&self) -> &BoxSpace {
        (**self).action_space()
    }
}

/// Build an environment from its identifier
pub fn make_env(name: &str) -> Result<Box<dyn Env>> {
    match name {
        "Pendulum" | "Pendulum-v0" | "Pendulum-v1" => Ok(Box::new(Pendulum::new())),
        other => Err(DdpgError::invalid_parameter(
            "env_name".to_string(),
            format!("unknown environment '{}'", other),
        )),
    }
}
