pub mod test_optimizer;
pub mod test_runner;
