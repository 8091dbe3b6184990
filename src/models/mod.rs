//! Actor and critic function approximators used by the DDPG agent.

pub mod actor;
pub mod critic;

pub use actor::Actor;
pub use critic::Critic;

use crate::layers::WeightInit;

/// Output layers start close to zero so initial actions and values are small
pub(crate) const OUTPUT_INIT: WeightInit = WeightInit::Uniform { min: -3e-3, max: 3e-3 };
