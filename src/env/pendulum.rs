//! Inverted pendulum swing-up with a continuous torque action.
//!
//! The episode ends after a fixed number of steps; there is no other
//! terminal state.

use std::collections::HashMap;
use std::f32::consts::PI;

use ndarray::{array, Array1, ArrayView1};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::error::{DdpgError, Result};
use super::{BoxSpace, Env, Step};

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;
const MAX_STEPS: usize = 200;

/// Wrap an angle into `[-pi, pi)`
fn angle_normalize(x: f32) -> f32 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

pub struct Pendulum {
    theta: f32,
    theta_dot: f32,
    ticks: usize,
    max_steps: usize,
    observation_space: BoxSpace,
    action_space: BoxSpace,
    rng: StdRng,
}

impl Pendulum {
    pub fn new() -> Self {
        Self::with_max_steps(MAX_STEPS)
    }

    pub fn with_max_steps(max_steps: usize) -> Self {
        Pendulum {
            theta: 0.0,
            theta_dot: 0.0,
            ticks: 0,
            max_steps,
            observation_space: BoxSpace {
                low: array![-1.0, -1.0, -MAX_SPEED],
                high: array![1.0, 1.0, MAX_SPEED],
            },
            action_space: BoxSpace::symmetric(1, MAX_TORQUE),
            rng: StdRng::seed_from_u64(0),
        }
    }

    fn observation(&self) -> Array1<f32> {
        array![self.theta.cos(), self.theta.sin(), self.theta_dot]
    }
}

impl Default for Pendulum {
    fn default() -> Self {
        Self::new()
    }
}

impl Env for Pendulum {
    fn reset(&mut self) -> Result<Array1<f32>> {
        self.theta = self.rng.gen_range(-PI..=PI);
        self.theta_dot = self.rng.gen_range(-1.0..=1.0);
        self.ticks = 0;
        Ok(self.observation())
    }

    fn step(&mut self, action: ArrayView1<f32>) -> Result<Step> {
        if action.len() != 1 {
            return Err(DdpgError::dimension_mismatch("1".to_string(), action.len().to_string()));
        }
        let torque = action[0].clamp(-MAX_TORQUE, MAX_TORQUE);
        let (theta, theta_dot) = (self.theta, self.theta_dot);

        let cost = angle_normalize(theta).powi(2) + 0.1 * theta_dot * theta_dot + 0.001 * torque * torque;

        let new_theta_dot = (theta_dot
            + (3.0 * G / (2.0 * L) * theta.sin() + 3.0 / (M * L * L) * torque) * DT)
            .clamp(-MAX_SPEED, MAX_SPEED);
        self.theta = theta + new_theta_dot * DT;
        self.theta_dot = new_theta_dot;
        self.ticks += 1;

        let done = self.ticks >= self.max_steps;
        let mut info = HashMap::new();
        if done {
            info.insert("truncated".to_string(), 1.0);
        }

        Ok(Step {
            observation: self.observation(),
            reward: -cost,
            done,
            info,
        })
    }

    fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn observation_space(&self) -> &BoxSpace {
        &self.observation_space
    }

    fn action_space(&self) -> &BoxSpace {
        &self.action_space
    }
}
