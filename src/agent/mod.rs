//! # DDPG agent
//!
//! The agent owns four networks: the online actor `mu(s)` and critic `Q(s, a)`,
//! and a target copy of each. Target parameters are a lagged, smoothed copy of
//! the online ones and are never trained by gradient descent.
//!
//! Callers only need the [`PolicyAgent`] trait:
//!
//! - `select_action(obs, explore)`: actor output, plus `N(0, noise_std)` noise when exploring
//! - `update(batch)`: critic step, actor step, then soft target update
//! - `align_target()`: hard copy online → target (done once by the builder)
//!
//! ```rust
//! use ddpg::agent::{DdpgBuilder, DdpgConfig, PolicyAgent};
//! use ddpg::replay_buffer::ReplayBuffer;
//! use ndarray::array;
//! use rand::SeedableRng;
//!
//! let config = DdpgConfig::default().hidden_sizes(vec![16, 16]);
//! let mut agent = DdpgBuilder::from_config(2, 1, config).seed(0).build().unwrap();
//!
//! let mut buffer = ReplayBuffer::new(4);
//! buffer.add(array![0.0, 1.0], array![0.5], array![0.1, 0.9], -1.0, 0.0);
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let batch = buffer.sample(&mut rng).unwrap();
//! let stats = agent.update(&batch).unwrap();
//! assert!(stats.critic_loss >= 0.0);
//! ```

pub mod builder;
pub mod config;
pub mod ddpg;
pub mod traits;

pub use builder::DdpgBuilder;
pub use config::DdpgConfig;
pub use ddpg::DdpgAgent;
pub use traits::{PolicyAgent, UpdateStats};
