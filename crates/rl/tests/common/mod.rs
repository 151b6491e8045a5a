#![allow(dead_code)]

use physics::PhysicsError;
use std::cell::Cell;
use ml::{Activation, Dense};
use rl::{Categorical, Env, MlpPolicy, Policy, RlError, Transition};

/// Ends the episode after exactly `limit` steps, reward 1 per step.
pub struct CountdownEnv {
    pub limit: usize,
    pub dim: usize,
    pub t: usize,
    pub resets: usize,
    pub renders: Cell<usize>,
}

impl CountdownEnv {
    pub fn new(limit: usize) -> Self {
        Self { limit, dim: 4, t: 0, resets: 0, renders: Cell::new(0) }
    }
}

impl Env for CountdownEnv {
    fn reset(&mut self) -> Vec<f32> {
        self.t = 0;
        self.resets += 1;
        vec![0.0; self.dim]
    }

    fn step(&mut self, action: usize) -> rl::Result<Transition> {
        if action >= 2 {
            return Err(RlError::InvalidAction { action, count: 2 });
        }
        self.t += 1;
        #[allow(clippy::cast_precision_loss)]
        let state = vec![self.t as f32 * 0.01; self.dim];
        Ok(Transition { state, reward: 1.0, done: self.t >= self.limit })
    }

    fn action_count(&self) -> usize {
        2
    }

    fn state_dimension(&self) -> usize {
        self.dim
    }

    fn render(&self) {
        self.renders.set(self.renders.get() + 1);
    }
}

/// One-step episodes paying 1 for action 1 and 0 for action 0.
pub struct TwoArmedEnv;

impl Env for TwoArmedEnv {
    fn reset(&mut self) -> Vec<f32> {
        vec![1.0]
    }

    fn step(&mut self, action: usize) -> rl::Result<Transition> {
        #[allow(clippy::cast_precision_loss)]
        let reward = action as f32;
        Ok(Transition { state: vec![1.0], reward, done: true })
    }

    fn action_count(&self) -> usize {
        2
    }

    fn state_dimension(&self) -> usize {
        1
    }
}

/// Fails on the `fail_at`-th step of every episode.
pub struct BrokenEnv {
    pub fail_at: usize,
    t: usize,
}

impl BrokenEnv {
    pub fn new(fail_at: usize) -> Self {
        Self { fail_at, t: 0 }
    }
}

impl Env for BrokenEnv {
    fn reset(&mut self) -> Vec<f32> {
        self.t = 0;
        vec![0.0; 4]
    }

    fn step(&mut self, _action: usize) -> rl::Result<Transition> {
        self.t += 1;
        if self.t >= self.fail_at {
            return Err(PhysicsError::SteppedAfterFailure.into());
        }
        Ok(Transition { state: vec![0.0; 4], reward: 1.0, done: false })
    }

    fn action_count(&self) -> usize {
        2
    }

    fn state_dimension(&self) -> usize {
        4
    }
}

/// Reports whatever dimensions it was built with; never stepped.
pub struct ShapelessEnv {
    pub actions: usize,
    pub dim: usize,
}

impl Env for ShapelessEnv {
    fn reset(&mut self) -> Vec<f32> {
        vec![0.0; self.dim]
    }

    fn step(&mut self, _action: usize) -> rl::Result<Transition> {
        Ok(Transition { state: vec![0.0; self.dim], reward: 0.0, done: true })
    }

    fn action_count(&self) -> usize {
        self.actions
    }

    fn state_dimension(&self) -> usize {
        self.dim
    }
}

/// Deterministic policy that always pushes right (action 1).
pub struct AlwaysRight;

impl Policy for AlwaysRight {
    fn action_count(&self) -> usize {
        2
    }

    fn distribution(&self, _state: &[f32]) -> rl::Result<Categorical> {
        Ok(Categorical::from_logits(vec![f32::NEG_INFINITY, 0.0]))
    }
}

pub fn small_config() -> rl::TrainerConfig {
    rl::TrainerConfig {
        hidden_size: 16,
        verbose: false,
        ..rl::TrainerConfig::default()
    }
}

/// Network whose head is biased so hard towards action 1 that it always
/// pushes right, whatever the state.
pub fn always_right_network(state_dim: usize) -> MlpPolicy {
    let hidden = Dense::new(vec![0.0; state_dim * 2], vec![0.0; 2], state_dim, 2);
    let head = Dense::new(vec![0.0; 4], vec![-50.0, 50.0], 2, 2);
    MlpPolicy::from_layers(hidden, head, Activation::Relu).unwrap()
}
