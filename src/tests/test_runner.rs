use ndarray::{Array1, ArrayView1};
use proptest::prelude::*;

use crate::agent::{DdpgBuilder, PolicyAgent, UpdateStats};
use crate::env::{Env, FixedHorizonEnv};
use crate::error::{DdpgError, Result};
use crate::replay_buffer::{ReplayBuffer, TransitionBatch};
use crate::runner::{EpisodeRunner, Mode};

/// Returns a fixed action and counts how it was asked
struct ScriptedAgent {
    action: Array1<f32>,
    explore_calls: usize,
    greedy_calls: usize,
    seen_observations: Vec<Array1<f32>>,
}

impl ScriptedAgent {
    fn new(action: Vec<f32>) -> Self {
        ScriptedAgent {
            action: Array1::from(action),
            explore_calls: 0,
            greedy_calls: 0,
            seen_observations: Vec::new(),
        }
    }
}

impl PolicyAgent for ScriptedAgent {
    fn select_action(&mut self, observation: ArrayView1<f32>, explore: bool) -> Result<Array1<f32>> {
        if explore {
            self.explore_calls += 1;
        } else {
            self.greedy_calls += 1;
        }
        self.seen_observations.push(observation.to_owned());
        Ok(self.action.clone())
    }

    fn align_target(&mut self) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, _batch: &TransitionBatch) -> Result<UpdateStats> {
        Ok(UpdateStats::default())
    }
}

#[test]
fn test_time_feature_increments_and_resets() {
    let mut env = FixedHorizonEnv::new(2, 1, 1.0, 4);
    let mut agent = ScriptedAgent::new(vec![0.0]);
    let mut buffer = ReplayBuffer::new(1);
    let mut runner = EpisodeRunner::new(1e-3, 0);

    runner.run_policy(&mut env, &mut agent, &mut buffer, Mode::Train, 2).unwrap();
    assert_eq!(buffer.len(), 8);

    for (k, t) in buffer.iter().enumerate() {
        let step = k % 4;
        assert_eq!(t.observation.len(), 3);
        assert_eq!(t.next_observation.len(), 3);
        if step == 0 {
            assert_eq!(t.observation[2], 0.0);
        }
        let increment = t.next_observation[2] - t.observation[2];
        assert!((increment - 1e-3).abs() < 1e-6);
        // raw observation is the environment tick
        assert_eq!(t.observation[0], step as f32);
        assert_eq!(t.next_observation[0], (step + 1) as f32);
    }

    // the next episode continues from where the stored next observation left off
    let transitions: Vec<_> = buffer.iter().collect();
    for pair in transitions.windows(2) {
        if pair[0].done == 0.0 {
            assert_eq!(pair[0].next_observation, pair[1].observation);
        }
    }
}

#[test]
fn test_custom_time_increment() {
    let mut env = FixedHorizonEnv::new(1, 1, 1.0, 3);
    let mut agent = ScriptedAgent::new(vec![0.0]);
    let mut buffer = ReplayBuffer::new(1);
    let mut runner = EpisodeRunner::new(0.5, 0);

    runner.run_episode(&mut env, &mut agent, &mut buffer, Mode::Train).unwrap();
    let times: Vec<f32> = agent.seen_observations.iter().map(|o| o[1]).collect();
    assert_eq!(times, vec![0.0, 0.5, 1.0]);
}

#[test]
fn test_episode_outcome() {
    let mut env = FixedHorizonEnv::new(2, 1, 1.0, 7).with_reward(0.5);
    let mut agent = ScriptedAgent::new(vec![0.2]);
    let mut buffer = ReplayBuffer::new(1);
    let mut runner = EpisodeRunner::new(1e-3, 0);

    let outcome = runner.run_episode(&mut env, &mut agent, &mut buffer, Mode::Train).unwrap();
    assert_eq!(outcome.length, 7);
    assert!((outcome.episode_return - 3.5).abs() < 1e-6);

    let dones: Vec<f32> = buffer.iter().map(|t| t.done).collect();
    assert_eq!(dones, vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_run_policy_sums_lengths() {
    let mut env = FixedHorizonEnv::new(2, 1, 1.0, 5);
    let mut agent = ScriptedAgent::new(vec![0.0]);
    let mut buffer = ReplayBuffer::new(1);
    let mut runner = EpisodeRunner::new(1e-3, 0);

    let summary = runner.run_policy(&mut env, &mut agent, &mut buffer, Mode::Train, 3).unwrap();
    assert_eq!(summary.returns, vec![5.0, 5.0, 5.0]);
    assert_eq!(summary.total_steps, 15);
    assert_eq!(env.resets(), 3);
}

#[test]
fn test_test_mode_stores_nothing_and_is_greedy() {
    let mut env = FixedHorizonEnv::new(2, 1, 1.0, 5);
    let mut agent = ScriptedAgent::new(vec![0.3]);
    let mut buffer = ReplayBuffer::new(1);
    let mut runner = EpisodeRunner::new(1e-3, 0);

    let summary = runner.run_policy(&mut env, &mut agent, &mut buffer, Mode::Test, 4).unwrap();
    assert_eq!(summary.total_steps, 20);
    assert!(buffer.is_empty());
    assert_eq!(agent.greedy_calls, 20);
    assert_eq!(agent.explore_calls, 0);
}

#[test]
fn test_random_mode_ignores_agent() {
    let mut env = FixedHorizonEnv::new(2, 2, 5.0, 50);
    let mut agent = ScriptedAgent::new(vec![0.0, 0.0]);
    let mut buffer = ReplayBuffer::new(1);
    let mut runner = EpisodeRunner::new(1e-3, 42);

    runner.run_episode(&mut env, &mut agent, &mut buffer, Mode::Random).unwrap();
    assert_eq!(agent.greedy_calls + agent.explore_calls, 0);
    assert_eq!(buffer.len(), 50);
    // uniform over [-5, 5] then clipped
    assert!(env.sent_actions().iter().flatten().all(|a| a.abs() <= 1.0));
    assert!(env.sent_actions().iter().flatten().any(|&a| a == 1.0 || a == -1.0));
    // stored actions are the clipped ones
    for (stored, sent) in buffer.iter().zip(env.sent_actions()) {
        assert_eq!(&stored.action, sent);
    }
}

#[test]
fn test_non_finite_action_is_error() {
    let mut env = FixedHorizonEnv::new(2, 1, 1.0, 5);
    let mut agent = ScriptedAgent::new(vec![f32::NAN]);
    let mut buffer = ReplayBuffer::new(1);
    let mut runner = EpisodeRunner::new(1e-3, 0);

    let result = runner.run_episode(&mut env, &mut agent, &mut buffer, Mode::Test);
    assert!(matches!(result, Err(DdpgError::NumericalError(_))));
    assert!(env.sent_actions().is_empty());
}

#[test]
fn test_ddpg_agent_drives_runner() {
    let mut env = FixedHorizonEnv::new(3, 2, 2.0, 10);
    let mut agent = DdpgBuilder::new(4, 2)
        .hidden_sizes(vec![8])
        .action_scale(2.0)
        .noise_std(5.0)
        .build()
        .unwrap();
    let mut buffer = ReplayBuffer::new(1);
    let mut runner = EpisodeRunner::new(1e-3, 0);

    runner.run_policy(&mut env, &mut agent, &mut buffer, Mode::Train, 2).unwrap();
    assert_eq!(buffer.len(), 20);
    assert!(env.sent_actions().iter().flatten().all(|a| (-1.0..=1.0).contains(a)));
    assert_eq!(env.action_space().dim(), 2);
}

proptest! {
    #[test]
    fn prop_actions_sent_to_env_are_clipped(values in prop::collection::vec(-100.0f32..100.0, 1..4)) {
        let dim = values.len();
        let mut env = FixedHorizonEnv::new(2, dim, 100.0, 3);
        let mut agent = ScriptedAgent::new(values.clone());
        let mut buffer = ReplayBuffer::new(1);
        let mut runner = EpisodeRunner::new(1e-3, 0);

        runner.run_episode(&mut env, &mut agent, &mut buffer, Mode::Train).unwrap();

        for sent in env.sent_actions() {
            for (a, v) in sent.iter().zip(values.iter()) {
                prop_assert!(*a >= -1.0 && *a <= 1.0);
                prop_assert_eq!(*a, v.clamp(-1.0, 1.0));
            }
        }
    }
}

#[test]
fn test_random_mode_on_extreme_action_bounds() {
    for limit in [f32::MAX, f32::INFINITY] {
        let mut env = FixedHorizonEnv::new(2, 1, limit, 3);
        let mut agent = ScriptedAgent::new(vec![0.0]);
        let mut buffer = ReplayBuffer::new(1);
        let mut runner = EpisodeRunner::new(1e-3, 7);

        let outcome = runner.run_episode(&mut env, &mut agent, &mut buffer, Mode::Random).unwrap();
        assert_eq!(outcome.length, 3);
        assert_eq!(buffer.len(), 3);
        assert!(env.sent_actions().iter().flatten().all(|a| (-1.0..=1.0).contains(a)));
    }
}
