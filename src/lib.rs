//! # ddpg - Deep Deterministic Policy Gradient on ndarray
//!
//! Off-policy actor-critic training for continuous-action environments: a
//! deterministic actor `mu(s)`, a critic `Q(s, a)`, slowly tracking target copies
//! of both, Gaussian exploration noise and uniform experience replay.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ddpg::agent::DdpgConfig;
//! use ddpg::env::make_env;
//! use ddpg::record::NullRecorder;
//! use ddpg::trainer::{agent_for_env, Trainer, TrainerConfig};
//!
//! let config = TrainerConfig::default().num_episodes(100);
//! let env = make_env(&config.env_name).unwrap();
//! let agent = agent_for_env(&env, &DdpgConfig::default(), config.seed).unwrap();
//!
//! let mut trainer = Trainer::new(config, env, agent, NullRecorder).unwrap();
//! let summary = trainer.train().unwrap();
//! println!("{:?}", summary.eval_records.last());
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions and their derivatives
//! - [`agent`] - The DDPG agent, its builder and the [`agent::PolicyAgent`] trait
//! - [`config`] - YAML run configuration
//! - [`env`] - Environment trait, `Pendulum` and a deterministic test environment
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers and weight initialization
//! - [`metrics`] - Return and loss statistics
//! - [`models`] - Actor and critic networks
//! - [`network`] - Feed-forward network with backpropagation
//! - [`optimizer`] - SGD, Adam and gradient clipping
//! - [`record`] - Train/eval records, recorders and run directories
//! - [`replay_buffer`] - Uniform experience replay
//! - [`runner`] - Episode rollouts with the time feature
//! - [`trainer`] - Warm-up, training and evaluation schedule

pub mod activations;
pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod layers;
pub mod metrics;
pub mod models;
pub mod network;
pub mod optimizer;
pub mod record;
pub mod replay_buffer;
pub mod runner;
pub mod trainer;

#[cfg(test)]
mod tests;
