use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{DdpgError, Result};
use crate::models::{Actor, Critic};
use super::config::DdpgConfig;
use super::ddpg::DdpgAgent;

/// Builds a [`DdpgAgent`] with freshly initialized, aligned networks.
///
/// ```rust
/// use ddpg::agent::{DdpgBuilder, PolicyAgent};
/// use ndarray::array;
///
/// let mut agent = DdpgBuilder::new(4, 1)
///     .action_scale(2.0)
///     .hidden_sizes(vec![32, 32])
///     .seed(7)
///     .build()
///     .unwrap();
///
/// let action = agent.select_action(array![0.1, -0.2, 0.3, 0.0].view(), false).unwrap();
/// assert_eq!(action.len(), 1);
/// ```
pub struct DdpgBuilder {
    obs_dim: usize,
    act_dim: usize,
    action_scale: f32,
    config: DdpgConfig,
    seed: u64,
}

impl DdpgBuilder {
    pub fn new(obs_dim: usize, act_dim: usize) -> Self {
        DdpgBuilder {
            obs_dim,
            act_dim,
            action_scale: 1.0,
            config: DdpgConfig::default(),
            seed: 0,
        }
    }

    /// Start from a full set of hyperparameters
    pub fn from_config(obs_dim: usize, act_dim: usize, config: DdpgConfig) -> Self {
        DdpgBuilder {
            config,
            ..Self::new(obs_dim, act_dim)
        }
    }

    /// Bound of the actor output, usually the action space's `high[0]`
    pub fn action_scale(mut self, scale: f32) -> Self {
        self.action_scale = scale;
        self
    }

    pub fn hidden_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.config.hidden_sizes = sizes;
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.config.gamma = gamma;
        self
    }

    pub fn tau(mut self, tau: f32) -> Self {
        self.config.tau = tau;
        self
    }

    pub fn noise_std(mut self, noise_std: f32) -> Self {
        self.config.noise_std = noise_std;
        self
    }

    pub fn learning_rates(mut self, actor_lr: f32, critic_lr: f32) -> Self {
        self.config.actor_lr = actor_lr;
        self.config.critic_lr = critic_lr;
        self
    }

    /// Seeds network initialization and exploration noise
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<DdpgAgent> {
        if self.obs_dim == 0 || self.act_dim == 0 {
            return Err(DdpgError::invalid_parameter(
                "dimensions".to_string(),
                format!("obs_dim and act_dim must be positive, got {} and {}", self.obs_dim, self.act_dim),
            ));
        }
        self.config.validate()?;

        let config = &self.config;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let clipper = config.grad_clip;

        let actor = Actor::new(
            self.obs_dim,
            self.act_dim,
            self.action_scale,
            &config.hidden_sizes,
            config.hidden_activation,
            config.optimizer.build(),
            config.actor_lr,
            &mut rng,
        )?
        .with_clipper(clipper);

        let critic = Critic::new(
            self.obs_dim,
            self.act_dim,
            &config.hidden_sizes,
            config.hidden_activation,
            config.optimizer.build(),
            config.critic_lr,
            &mut rng,
        )?
        .with_clipper(clipper);

        // Noise gets its own stream so that network sizes do not shift it
        let noise_rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));

        DdpgAgent::new(actor, critic, config.gamma, config.tau, config.noise_std, noise_rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::Activation;
    use crate::optimizer::GradientClipper;

    #[test]
    fn test_builder_dimensions() {
        let agent = DdpgBuilder::new(4, 2)
            .hidden_sizes(vec![16, 8])
            .action_scale(2.0)
            .build()
            .unwrap();
        assert_eq!(agent.obs_dim(), 4);
        assert_eq!(agent.act_dim(), 2);
        assert_eq!(agent.actor.network.shape(), vec![4, 16, 8, 2]);
        assert_eq!(agent.critic.network.shape(), vec![6, 16, 8, 1]);
        assert_eq!(agent.actor.action_scale, 2.0);
    }

    #[test]
    fn test_builder_aligns_targets() {
        let agent = DdpgBuilder::new(3, 1).hidden_sizes(vec![8]).seed(3).build().unwrap();
        assert!(agent.target_actor.network.parameters_equal(&agent.actor.network));
        assert!(agent.target_critic.network.parameters_equal(&agent.critic.network));
    }

    #[test]
    fn test_builder_rejects_invalid() {
        assert!(DdpgBuilder::new(0, 1).build().is_err());
        assert!(DdpgBuilder::new(3, 1).tau(2.0).build().is_err());
        assert!(DdpgBuilder::new(3, 1).action_scale(0.0).build().is_err());
    }

    #[test]
    fn test_same_seed_same_networks() {
        let a = DdpgBuilder::new(3, 1).hidden_sizes(vec![8]).seed(11).build().unwrap();
        let b = DdpgBuilder::new(3, 1).hidden_sizes(vec![8]).seed(11).build().unwrap();
        let c = DdpgBuilder::new(3, 1).hidden_sizes(vec![8]).seed(12).build().unwrap();
        assert!(a.actor.network.parameters_equal(&b.actor.network));
        assert!(!a.actor.network.parameters_equal(&c.actor.network));
    }

    #[test]
    fn test_config_reaches_networks() {
        let config = DdpgConfig::default()
            .hidden_sizes(vec![8, 8])
            .hidden_activation(Activation::LeakyRelu { alpha: 0.05 })
            .grad_clip(GradientClipper::ClipByValue { min: -0.1, max: 0.1 });
        let agent = DdpgBuilder::from_config(3, 1, config).build().unwrap();

        for network in [&agent.actor.network, &agent.critic.network] {
            assert_eq!(network.layers[0].activation, Activation::LeakyRelu { alpha: 0.05 });
            assert_eq!(network.layers[1].activation, Activation::LeakyRelu { alpha: 0.05 });
        }
        assert_eq!(agent.actor.network.layers[2].activation, Activation::Tanh);
        assert_eq!(agent.critic.network.layers[2].activation, Activation::Linear);
        assert_eq!(agent.actor.clipper, GradientClipper::ClipByValue { min: -0.1, max: 0.1 });
        assert_eq!(agent.target_critic.clipper, agent.critic.clipper);
    }
}
