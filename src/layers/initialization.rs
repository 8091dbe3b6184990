use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;
use serde::{Serialize, Deserialize};

/// Weight initialization strategies.
///
/// Every strategy draws from a caller-supplied generator so that a seeded run
/// produces the same initial networks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    /// `U(-1/sqrt(fan_in), 1/sqrt(fan_in))` for weights and biases
    FanInUniform,

    /// Xavier/Glorot uniform initialization, zero biases
    XavierUniform,

    /// He/Kaiming uniform initialization (for ReLU), zero biases
    HeUniform,

    /// Uniform distribution with custom range for weights and biases
    Uniform { min: f32, max: f32 },
}

impl Default for WeightInit {
    fn default() -> Self {
        WeightInit::FanInUniform
    }
}

impl WeightInit {
    /// Initialize weights of shape `(fan_in, fan_out)`
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f32> {
        let (fan_in, fan_out) = shape;

        match self {
            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in.max(1) as f32).sqrt();
                Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
                Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::HeUniform => {
                let limit = (6.0 / fan_in.max(1) as f32).sqrt();
                Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::Uniform { min, max } => {
                Array2::random_using(shape, Uniform::new_inclusive(*min, *max), rng)
            }
        }
    }

    /// Initialize biases for a layer with `fan_in` inputs
    pub fn initialize_biases<R: Rng + ?Sized>(&self, fan_in: usize, size: usize, rng: &mut R) -> Array1<f32> {
        match self {
            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in.max(1) as f32).sqrt();
                Array1::random_using(size, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::XavierUniform | WeightInit::HeUniform => {
                Array1::zeros(size)
            }

            WeightInit::Uniform { min, max } => {
                Array1::random_using(size, Uniform::new_inclusive(*min, *max), rng)
            }
        }
    }
}
