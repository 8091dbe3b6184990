//! # Activation Functions Module
//!
//! Element-wise non-linearities used by [`DenseLayer`](crate::layers::DenseLayer).
//!
//! - **ReLU**: `max(0, x)`, the default for hidden layers of actor and critic
//! - **Tanh**: bounded output, used by the actor head before action scaling
//! - **Linear**: identity, used by the critic head
//! - **LeakyReLU**: ReLU with a small negative slope
//!
//! ```rust
//! use ddpg::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5, 0.0, 2.0]];
//! Activation::Relu.apply_batch(&mut data);
//! assert_eq!(data, array![[1.0, 0.0, 0.0, 2.0]]);
//! ```

pub mod functions;

pub use functions::Activation;
