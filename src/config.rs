//! Run configuration stored next to the logs of every run.
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::DdpgConfig;
use crate::error::Result;
use crate::trainer::TrainerConfig;

/// Everything needed to reproduce a training run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    pub trainer: TrainerConfig,
    pub agent: DdpgConfig,
}

impl RunConfig {
    /// Constructs [`RunConfig`] from a YAML file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`RunConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.trainer.validate()?;
        self.agent.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::{GradientClipper, OptimizerKind};
    use tempfile::TempDir;

    #[test]
    fn test_yaml_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = RunConfig::default();
        config.trainer = config.trainer.num_episodes(20).replay_capacity(Some(5000));
        config.agent = config
            .agent
            .tau(0.01)
            .optimizer(OptimizerKind::Sgd)
            .grad_clip(GradientClipper::ClipByGlobalNorm { max_norm: 1.0 });

        config.save(&path).unwrap();
        let loaded = RunConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.yaml");
        std::fs::write(&path, "agent:\n  gamma: 0.9\n  optimizer: sgd\n").unwrap();

        let loaded = RunConfig::load(&path).unwrap();
        assert_eq!(loaded.agent.gamma, 0.9);
        assert_eq!(loaded.agent.optimizer, OptimizerKind::Sgd);
        assert_eq!(loaded.trainer, TrainerConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(RunConfig::load("/nonexistent/config.yaml").is_err());
    }
}
