use serde::{Serialize, Deserialize};

use crate::error::{DdpgError, Result};
use crate::layers::LayerGradients;

/// Gradient clipping methods
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum GradientClipper {
    /// Clip every gradient element into `[min, max]`
    ClipByValue { min: f32, max: f32 },

    /// Rescale all gradients of a network so their joint L2 norm is at most `max_norm`
    ClipByGlobalNorm { max_norm: f32 },

    /// No clipping
    #[default]
    None,
}

impl GradientClipper {
    /// Rejects empty value ranges and non-positive norms
    pub fn validate(&self) -> Result<()> {
        match *self {
            GradientClipper::ClipByValue { min, max } if !(min.is_finite() && max.is_finite() && min < max) => {
                Err(DdpgError::invalid_parameter(
                    "grad_clip".to_string(),
                    format!("clip range must be finite with min < max, got [{}, {}]", min, max),
                ))
            }
            GradientClipper::ClipByGlobalNorm { max_norm } if !(max_norm.is_finite() && max_norm > 0.0) => {
                Err(DdpgError::invalid_parameter(
                    "grad_clip".to_string(),
                    format!("max_norm must be positive, got {}", max_norm),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Compute global norm of all parameter gradients
    pub fn global_norm(gradients: &[LayerGradients]) -> f32 {
        gradients
            .iter()
            .map(|g| {
                g.weights.iter().map(|&x| x * x).sum::<f32>()
                    + g.biases.iter().map(|&x| x * x).sum::<f32>()
            })
            .sum::<f32>()
            .sqrt()
    }

    /// Clip parameter gradients in place. Input gradients are left untouched.
    pub fn clip(&self, gradients: &mut [LayerGradients]) {
        match self {
            GradientClipper::ClipByValue { min, max } => {
                let (min, max) = (*min, *max);
                for g in gradients.iter_mut() {
                    g.weights.mapv_inplace(|x| x.max(min).min(max));
                    g.biases.mapv_inplace(|x| x.max(min).min(max));
                }
            }

            GradientClipper::ClipByGlobalNorm { max_norm } => {
                let norm = Self::global_norm(gradients);
                if norm > *max_norm {
                    let scale = max_norm / norm;
                    for g in gradients.iter_mut() {
                        g.weights.mapv_inplace(|x| x * scale);
                        g.biases.mapv_inplace(|x| x * scale);
                    }
                }
            }

            GradientClipper::None => {}
        }
    }
}
