use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use ddpg::config::RunConfig;
use ddpg::env::make_env;
use ddpg::record::{configure_run_dir, CsvRecorder};
use ddpg::trainer::{agent_for_env, Trainer};

/// Train a DDPG policy on a continuous-control environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Environment name
    #[arg(short, long)]
    env_name: Option<String>,

    /// Episodes of random actions before training
    #[arg(long)]
    start_episodes: Option<usize>,

    /// Number of training episodes
    #[arg(short, long)]
    num_episodes: Option<usize>,

    /// Discount factor
    #[arg(short, long)]
    gamma: Option<f32>,

    /// Target network update rate
    #[arg(short, long)]
    tau: Option<f32>,

    /// Standard deviation of the exploration noise
    #[arg(short = 'o', long)]
    noise_std: Option<f32>,

    /// Episodes per training batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Training batches between evaluations
    #[arg(short = 'f', long)]
    eval_freq: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Transitions per gradient minibatch
    #[arg(long)]
    gradient_batch_size: Option<usize>,

    /// Replay capacity (unbounded when omitted)
    #[arg(long)]
    replay_capacity: Option<usize>,

    /// Per-step increment of the time feature
    #[arg(long)]
    time_increment: Option<f32>,

    /// YAML run configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory under which `log/<run name>` is created
    #[arg(long, default_value = ".")]
    log_root: PathBuf,

    /// Save the trained agent into the run directory
    #[arg(long, default_value_t = false)]
    save_model: bool,
}

impl Args {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };

        let trainer = &mut config.trainer;
        if let Some(v) = &self.env_name {
            trainer.env_name = v.clone();
        }
        if let Some(v) = self.start_episodes {
            trainer.start_episodes = v;
        }
        if let Some(v) = self.num_episodes {
            trainer.num_episodes = v;
        }
        if let Some(v) = self.batch_size {
            trainer.batch_size = v;
        }
        if let Some(v) = self.eval_freq {
            trainer.eval_freq = v;
        }
        if let Some(v) = self.seed {
            trainer.seed = v;
        }
        if let Some(v) = self.gradient_batch_size {
            trainer.gradient_batch_size = v;
        }
        if self.replay_capacity.is_some() {
            trainer.replay_capacity = self.replay_capacity;
        }
        if let Some(v) = self.time_increment {
            trainer.time_increment = v;
        }

        let agent = &mut config.agent;
        if let Some(v) = self.gamma {
            agent.gamma = v;
        }
        if let Some(v) = self.tau {
            agent.tau = v;
        }
        if let Some(v) = self.noise_std {
            agent.noise_std = v;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.run_config()?;
    let run_dir = configure_run_dir(&args.log_root, &config)?;

    let env = make_env(&config.trainer.env_name)?;
    let agent = agent_for_env(&env, &config.agent, config.trainer.seed)?;
    let recorder = CsvRecorder::new(&run_dir)?;

    let mut trainer = Trainer::new(config.trainer.clone(), env, agent, recorder)?;
    let summary = trainer.train()?;
    info!(
        "finished: {} evaluations, {} updates, {} stored transitions",
        summary.eval_records.len(),
        summary.total_updates,
        summary.stored_transitions
    );

    if args.save_model {
        let path = run_dir.join("agent.bin");
        trainer.agent().save(&path)?;
        info!("saved agent to {}", path.display());
    }

    Ok(())
}
