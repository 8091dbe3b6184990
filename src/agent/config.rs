use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::optimizer::{GradientClipper, OptimizerKind};

/// Hyperparameters of [`DdpgAgent`](super::DdpgAgent).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DdpgConfig {
    /// Discount factor.
    pub gamma: f32,

    /// Soft update coefficient of the target networks.
    pub tau: f32,

    /// Standard deviation of the Gaussian exploration noise.
    pub noise_std: f32,

    /// Hidden layer widths, shared by actor and critic.
    pub hidden_sizes: Vec<usize>,

    /// Activation of every hidden layer. Output layers are fixed (tanh for the
    /// actor, linear for the critic).
    pub hidden_activation: Activation,

    pub actor_lr: f32,

    pub critic_lr: f32,

    pub optimizer: OptimizerKind,

    /// Gradient clipping applied to each network's parameter gradients.
    pub grad_clip: GradientClipper,
}

impl Default for DdpgConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            tau: 0.005,
            noise_std: 0.1,
            hidden_sizes: vec![400, 300],
            hidden_activation: Activation::Relu,
            actor_lr: 1e-4,
            critic_lr: 1e-3,
            optimizer: OptimizerKind::Adam,
            grad_clip: GradientClipper::None,
        }
    }
}

impl DdpgConfig {
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    pub fn tau(mut self, v: f32) -> Self {
        self.tau = v;
        self
    }

    pub fn noise_std(mut self, v: f32) -> Self {
        self.noise_std = v;
        self
    }

    pub fn hidden_sizes(mut self, v: Vec<usize>) -> Self {
        self.hidden_sizes = v;
        self
    }

    pub fn learning_rates(mut self, actor_lr: f32, critic_lr: f32) -> Self {
        self.actor_lr = actor_lr;
        self.critic_lr = critic_lr;
        self
    }

    pub fn optimizer(mut self, v: OptimizerKind) -> Self {
        self.optimizer = v;
        self
    }

    pub fn hidden_activation(mut self, v: Activation) -> Self {
        self.hidden_activation = v;
        self
    }

    pub fn grad_clip(mut self, v: GradientClipper) -> Self {
        self.grad_clip = v;
        self
    }

    /// Checks value ranges. Called by the builder before any network is created.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(DdpgError::invalid_parameter(
                "gamma".to_string(),
                format!("must be in [0, 1], got {}", self.gamma),
            ));
        }
        if !(0.0..=1.0).contains(&self.tau) {
            return Err(DdpgError::invalid_parameter(
                "tau".to_string(),
                format!("must be in [0, 1], got {}", self.tau),
            ));
        }
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(DdpgError::invalid_parameter(
                "noise_std".to_string(),
                format!("must be non-negative, got {}", self.noise_std),
            ));
        }
        for (name, lr) in [("actor_lr", self.actor_lr), ("critic_lr", self.critic_lr)] {
            if !(lr.is_finite() && lr > 0.0) {
                return Err(DdpgError::invalid_parameter(name.to_string(), format!("must be positive, got {}", lr)));
            }
        }
        if self.hidden_sizes.iter().any(|&h| h == 0) {
            return Err(DdpgError::invalid_parameter("hidden_sizes", "widths must be positive"));
        }
        if let Activation::LeakyRelu { alpha } = self.hidden_activation {
            if !alpha.is_finite() {
                return Err(DdpgError::invalid_parameter(
                    "hidden_activation".to_string(),
                    format!("leaky relu slope must be finite, got {}", alpha),
                ));
            }
        }
        self.grad_clip.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DdpgConfig::default();
        assert_eq!(config.gamma, 0.99);
        assert_eq!(config.tau, 0.005);
        assert_eq!(config.noise_std, 0.1);
        assert_eq!(config.hidden_sizes, vec![400, 300]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(DdpgConfig::default().tau(1.5).validate().is_err());
        assert!(DdpgConfig::default().gamma(-0.1).validate().is_err());
        assert!(DdpgConfig::default().noise_std(-1.0).validate().is_err());
        assert!(DdpgConfig::default().learning_rates(0.0, 1e-3).validate().is_err());
        assert!(DdpgConfig::default()
            .grad_clip(GradientClipper::ClipByGlobalNorm { max_norm: 0.0 })
            .validate()
            .is_err());
        assert!(DdpgConfig::default()
            .grad_clip(GradientClipper::ClipByValue { min: 1.0, max: -1.0 })
            .validate()
            .is_err());
        assert!(DdpgConfig::default()
            .hidden_activation(Activation::LeakyRelu { alpha: f32::NAN })
            .validate()
            .is_err());
        assert!(DdpgConfig::default().tau(1.0).gamma(0.0).noise_std(0.0).validate().is_ok());
        assert!(DdpgConfig::default()
            .grad_clip(GradientClipper::ClipByValue { min: -1.0, max: 1.0 })
            .hidden_activation(Activation::LeakyRelu { alpha: 0.01 })
            .validate()
            .is_ok());
    }

    #[test]
    fn test_yaml_selects_clipper_and_activation() {
        let yaml = "grad_clip:\n  ClipByValue:\n    min: -0.5\n    max: 0.5\nhidden_activation:\n  LeakyRelu:\n    alpha: 0.2\n";
        let config: DdpgConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.grad_clip, GradientClipper::ClipByValue { min: -0.5, max: 0.5 });
        assert_eq!(config.hidden_activation, Activation::LeakyRelu { alpha: 0.2 });
        assert_eq!(config.gamma, 0.99);
    }
}
