use crate::error::{Result, RlError};
use physics::{CartPole, CartPoleConfig, Push};

/// Outcome of applying one action.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Vec<f32>,
    pub reward: f32,
    pub done: bool,
}

/// Reinforcement learning environment trait.
///
/// Inspired by classic frameworks like OpenAI Gym, this trait defines the core
/// interface an episodic, discrete-action environment must provide. Each call
/// to [`step`] advances the simulation by one action and returns the new state,
/// a reward signal, and whether the episode has terminated.
///
/// [`step`]: Env::step
pub trait Env {
    /// Reset the environment to a starting state and return it.
    fn reset(&mut self) -> Vec<f32>;

    /// Advance the environment by one action.
    ///
    /// # Errors
    ///
    /// Environment failures are returned as-is and end the training run.
    fn step(&mut self, action: usize) -> Result<Transition>;

    /// Number of discrete actions.
    fn action_count(&self) -> usize;

    /// Length of the state vector.
    fn state_dimension(&self) -> usize;

    /// Visualise the current state. Does nothing unless overridden.
    fn render(&self) {}

    /// Reseed the environment's random source.
    fn seed(&mut self, _seed: u64) {}
}

/// The cart-pole balancing task: action 0 pushes left, 1 pushes right,
/// reward 1 for every step taken.
pub struct CartPoleEnv {
    cartpole: CartPole,
    rng: fastrand::Rng,
}

impl CartPoleEnv {
    /// # Errors
    ///
    /// Fails if `config` is invalid.
    pub fn new(config: CartPoleConfig, seed: u64) -> Result<Self> {
        Ok(Self { cartpole: CartPole::new(config)?, rng: fastrand::Rng::with_seed(seed) })
    }

    /// Default cart-pole parameters.
    ///
    /// # Errors
    ///
    /// Only fails if the default configuration were invalid.
    pub fn with_seed(seed: u64) -> Result<Self> {
        Self::new(CartPoleConfig::default(), seed)
    }

    #[must_use]
    pub fn cartpole(&self) -> &CartPole {
        &self.cartpole
    }
}

impl Env for CartPoleEnv {
    fn reset(&mut self) -> Vec<f32> {
        self.cartpole.reset(&mut self.rng).to_array().to_vec()
    }

    fn step(&mut self, action: usize) -> Result<Transition> {
        let push = match action {
            0 => Push::Left,
            1 => Push::Right,
            _ => return Err(RlError::InvalidAction { action, count: 2 }),
        };
        let done = self.cartpole.step(push)?;
        Ok(Transition { state: self.cartpole.state().to_array().to_vec(), reward: 1.0, done })
    }

    fn action_count(&self) -> usize {
        2
    }

    fn state_dimension(&self) -> usize {
        4
    }

    fn render(&self) {
        let s = self.cartpole.state();
        tracing::trace!(x = s.x, x_dot = s.x_dot, theta = s.theta, theta_dot = s.theta_dot, "cart-pole");
    }

    fn seed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }
}
