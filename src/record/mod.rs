//! Training and evaluation records, and where they are written.
//!
//! The trainer emits one [`TrainRecord`] per rollout batch and one
//! [`EvalRecord`] per evaluation. A [`Recorder`] decides where they go:
//!
//! - [`CsvRecorder`]: `train.csv` and `progress.csv` in the run directory
//! - [`MemoryRecorder`]: keeps everything in memory, used by tests
//! - [`NullRecorder`]: drops everything
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::Writer;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::Result;

/// Summary of one batch of training episodes and the updates that followed it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainRecord {
    pub iteration: usize,
    /// Cumulative training episodes
    pub episodes: usize,
    /// Cumulative training environment steps
    pub steps: usize,
    pub avg_return: f32,
    pub std_return: f32,
    /// Mean critic loss over the updates of this batch
    pub critic_loss: f32,
    /// Mean actor loss over the updates of this batch
    pub actor_loss: f32,
    /// Updates performed after this batch
    pub updates: usize,
}

/// Result of one deterministic evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    pub iteration: usize,
    /// Cumulative training episodes at evaluation time
    pub episodes: usize,
    /// Cumulative training environment steps at evaluation time
    pub steps: usize,
    pub avg_return: f32,
    pub std_return: f32,
}

impl EvalRecord {
    /// Two-column key/value table, one row per field
    pub fn to_table(&self) -> String {
        let rows = [
            ("iteration", self.iteration.to_string()),
            ("episodes", self.episodes.to_string()),
            ("steps", self.steps.to_string()),
            ("avg_return", format!("{:.4}", self.avg_return)),
            ("std_return", format!("{:.4}", self.std_return)),
        ];
        let key_width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        let val_width = rows.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        let dashes = "-".repeat(key_width + val_width + 7);

        let mut table = format!("{}\n", dashes);
        for (key, value) in rows.iter() {
            table.push_str(&format!("| {:>kw$} | {:<vw$} |\n", key, value, kw = key_width, vw = val_width));
        }
        table.push_str(&dashes);
        table
    }
}

/// Destination of training and evaluation records.
pub trait Recorder {
    fn write_train(&mut self, record: &TrainRecord) -> Result<()>;

    fn write_eval(&mut self, record: &EvalRecord) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes `train.csv` and `progress.csv` with a header row each.
pub struct CsvRecorder {
    train: Writer<File>,
    eval: Writer<File>,
}

impl CsvRecorder {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(CsvRecorder {
            train: Writer::from_path(dir.join("train.csv"))?,
            eval: Writer::from_path(dir.join("progress.csv"))?,
        })
    }
}

impl Recorder for CsvRecorder {
    fn write_train(&mut self, record: &TrainRecord) -> Result<()> {
        self.train.serialize(record)?;
        Ok(())
    }

    fn write_eval(&mut self, record: &EvalRecord) -> Result<()> {
        self.eval.serialize(record)?;
        // Evaluations are rare; keep progress.csv readable while training
        self.eval.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.train.flush()?;
        self.eval.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryRecorder {
    pub train: Vec<TrainRecord>,
    pub eval: Vec<EvalRecord>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Recorder for MemoryRecorder {
    fn write_train(&mut self, record: &TrainRecord) -> Result<()> {
        self.train.push(record.clone());
        Ok(())
    }

    fn write_eval(&mut self, record: &EvalRecord) -> Result<()> {
        self.eval.push(record.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn write_train(&mut self, _record: &TrainRecord) -> Result<()> {
        Ok(())
    }

    fn write_eval(&mut self, _record: &EvalRecord) -> Result<()> {
        Ok(())
    }
}

/// Run name `<env>-<seed>-<Mon-DD_HH:MM:SS>`
pub fn run_name(env_name: &str, seed: u64, now: DateTime<Utc>) -> String {
    format!("{}-{}-{}", env_name, seed, now.format("%b-%d_%H:%M:%S"))
}

/// Create `<root>/log/<run name>` and write the run configuration into it.
pub fn configure_run_dir<P: AsRef<Path>>(root: P, config: &RunConfig) -> Result<PathBuf> {
    let name = run_name(&config.trainer.env_name, config.trainer.seed, Utc::now());
    let dir = root.as_ref().join("log").join(name);
    fs::create_dir_all(&dir)?;
    config.save(dir.join("config.yaml"))?;
    info!("logging to {}", dir.display());
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn eval_record() -> EvalRecord {
        EvalRecord {
            iteration: 3,
            episodes: 40,
            steps: 8000,
            avg_return: -150.25,
            std_return: 12.5,
        }
    }

    #[test]
    fn test_run_name_format() {
        let now = Utc.with_ymd_and_hms(2021, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(run_name("Pendulum-v0", 0, now), "Pendulum-v0-0-Mar-07_09:05:01");
    }

    #[test]
    fn test_table_contains_fields() {
        let table = eval_record().to_table();
        for key in ["iteration", "episodes", "steps", "avg_return", "std_return"] {
            assert!(table.contains(key));
        }
        assert!(table.contains("-150.2500"));
        let widths: Vec<usize> = table.lines().map(|l| l.len()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_csv_recorder_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        {
            let mut recorder = CsvRecorder::new(dir.path()).unwrap();
            recorder.write_eval(&eval_record()).unwrap();
            recorder.flush().unwrap();
        }
        let contents = fs::read_to_string(dir.path().join("progress.csv")).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("iteration,episodes,steps,avg_return,std_return"));
        assert!(lines.next().unwrap().starts_with("3,40,8000,"));
    }

    #[test]
    fn test_configure_run_dir() {
        let root = TempDir::new().unwrap();
        let config = RunConfig::default();
        let dir = configure_run_dir(root.path(), &config).unwrap();
        assert!(dir.starts_with(root.path().join("log")));
        assert!(dir.join("config.yaml").exists());
        let name = dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Pendulum-v0-0-"));
    }
}
