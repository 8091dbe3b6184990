//! Training loop.
//!
//! A run has two phases:
//!
//! 1. Warm-up: `start_episodes` episodes with uniformly random actions, filling
//!    the replay buffer.
//! 2. `num_episodes / eval_freq` iterations. Each iteration collects
//!    `eval_freq` rollout batches of `batch_size` training episodes. After each
//!    batch the agent is updated `total_steps / batch_size` times, every update
//!    on a freshly sampled minibatch. The iteration ends with `eval_episodes`
//!    deterministic episodes whose returns become an [`EvalRecord`].
pub mod config;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::agent::{DdpgAgent, DdpgBuilder, DdpgConfig, PolicyAgent};
use crate::env::Env;
use crate::error::Result;
use crate::metrics::{RunningStats, Statistics};
use crate::record::{EvalRecord, Recorder, TrainRecord};
use crate::replay_buffer::ReplayBuffer;
use crate::runner::{EpisodeRunner, Mode};

pub use config::TrainerConfig;

/// What a finished run produced
#[derive(Clone, Debug, Default)]
pub struct TrainingSummary {
    pub eval_records: Vec<EvalRecord>,
    pub total_updates: usize,
    pub stored_transitions: usize,
}

/// Build an agent sized for `env`: one extra observation input for the time
/// feature, and the actor output scaled by the action space's upper bound.
pub fn agent_for_env<E: Env + ?Sized>(env: &E, config: &DdpgConfig, seed: u64) -> Result<DdpgAgent> {
    let obs_dim = env.observation_space().dim() + 1;
    let action_space = env.action_space();
    let action_scale = action_space.high.get(0).copied().unwrap_or(1.0);

    DdpgBuilder::from_config(obs_dim, action_space.dim(), config.clone())
        .action_scale(action_scale)
        .seed(seed)
        .build()
}

/// Drives an agent through warm-up, training and evaluation on one environment.
pub struct Trainer<E, A, R> {
    config: TrainerConfig,
    env: E,
    agent: A,
    recorder: R,
    buffer: ReplayBuffer,
    runner: EpisodeRunner,
    rng: StdRng,
}

impl<E, A, R> Trainer<E, A, R>
where
    E: Env,
    A: PolicyAgent,
    R: Recorder,
{
    /// `agent` must already be aligned, as produced by [`DdpgBuilder`].
    pub fn new(config: TrainerConfig, mut env: E, agent: A, recorder: R) -> Result<Self> {
        config.validate()?;
        env.seed(config.seed);

        let buffer = match config.replay_capacity {
            Some(capacity) => ReplayBuffer::with_capacity(config.gradient_batch_size, capacity),
            None => ReplayBuffer::new(config.gradient_batch_size),
        };
        let runner = EpisodeRunner::new(config.time_increment, config.seed.wrapping_add(2));
        let rng = StdRng::seed_from_u64(config.seed.wrapping_add(3));

        Ok(Trainer {
            config,
            env,
            agent,
            recorder,
            buffer,
            runner,
            rng,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    pub fn into_agent(self) -> A {
        self.agent
    }

    /// Run the whole schedule. Any error aborts the run.
    pub fn train(&mut self) -> Result<TrainingSummary> {
        let config = self.config.clone();

        info!("warm-up: {} random episodes", config.start_episodes);
        self.runner.run_policy(
            &mut self.env,
            &mut self.agent,
            &mut self.buffer,
            Mode::Random,
            config.start_episodes,
        )?;
        info!("replay buffer holds {} transitions", self.buffer.len());

        let mut episodes = 0;
        let mut steps = 0;
        let mut updates = 0;
        let mut eval_records = Vec::with_capacity(config.num_iterations());

        for iteration in 0..config.num_iterations() {
            for _ in 0..config.eval_freq {
                let rollout = self.runner.run_policy(
                    &mut self.env,
                    &mut self.agent,
                    &mut self.buffer,
                    Mode::Train,
                    config.batch_size,
                )?;
                episodes += config.batch_size;
                steps += rollout.total_steps;

                let returns = Statistics::from_slice(&rollout.returns);
                info!("[train] average return: {}, std return: {}", returns.mean, returns.std);

                let num_epoch = rollout.total_steps / config.batch_size;
                let mut critic_loss = RunningStats::new();
                let mut actor_loss = RunningStats::new();
                for _ in 0..num_epoch {
                    let batch = self.buffer.sample(&mut self.rng)?;
                    let stats = self.agent.update(&batch)?;
                    critic_loss.update(stats.critic_loss);
                    actor_loss.update(stats.actor_loss);
                }
                updates += num_epoch;

                self.recorder.write_train(&TrainRecord {
                    iteration,
                    episodes,
                    steps,
                    avg_return: returns.mean,
                    std_return: returns.std,
                    critic_loss: critic_loss.mean(),
                    actor_loss: actor_loss.mean(),
                    updates,
                })?;
            }

            let evaluation = self.runner.run_policy(
                &mut self.env,
                &mut self.agent,
                &mut self.buffer,
                Mode::Test,
                config.eval_episodes,
            )?;
            let returns = Statistics::from_slice(&evaluation.returns);
            let record = EvalRecord {
                iteration,
                episodes,
                steps,
                avg_return: returns.mean,
                std_return: returns.std,
            };
            info!("\n{}", record.to_table());
            self.recorder.write_eval(&record)?;
            eval_records.push(record);
        }

        self.recorder.flush()?;
        Ok(TrainingSummary {
            eval_records,
            total_updates: updates,
            stored_transitions: self.buffer.len(),
        })
    }
}
