pub mod statistics;

pub use statistics::{RunningStats, Statistics};
