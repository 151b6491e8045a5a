//! CartPole entity for reinforcement learning environments
//!
//! A pole balanced on a cart that is pushed left or right with a fixed force.
//! The episode fails once the pole tips past the failure angle or the cart
//! leaves the track.

use crate::error::PhysicsError;
use crate::integrator;
use serde::{Deserialize, Serialize};

/// Direction of the fixed-magnitude force applied to the cart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Push {
    Left,
    Right,
}

/// Configuration for a CartPole entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartPoleConfig {
    /// Gravitational acceleration in m/s^2
    pub gravity: f32,
    /// Cart mass in kg
    pub cart_mass: f32,
    /// Pole mass in kg
    pub pole_mass: f32,
    /// Half the pole length in meters
    pub half_pole_length: f32,
    /// Force magnitude applied to the cart on every step
    pub force_magnitude: f32,
    /// Integration time step in seconds
    pub tau: f32,
    /// Angle threshold for failure detection (radians)
    pub failure_angle: f32,
    /// Position threshold for failure detection (meters)
    pub position_limit: f32,
    /// Each state component is reset uniformly within +/- this value
    pub reset_noise: f32,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            cart_mass: 1.0,
            pole_mass: 0.1,
            half_pole_length: 0.5,
            force_magnitude: 10.0,
            tau: 0.02,
            failure_angle: 12.0_f32.to_radians(),
            position_limit: 2.4,
            reset_noise: 0.05,
        }
    }
}

impl CartPoleConfig {
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] for non-positive masses,
    /// lengths, force, time steps or thresholds, and for non-finite gravity.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let positive = [
            (self.cart_mass, "cart_mass must be positive"),
            (self.pole_mass, "pole_mass must be positive"),
            (self.force_magnitude, "force_magnitude must be positive"),
            (self.half_pole_length, "half_pole_length must be positive"),
            (self.tau, "tau must be positive"),
            (self.failure_angle, "failure_angle must be positive"),
            (self.position_limit, "position_limit must be positive"),
        ];
        for (value, msg) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PhysicsError::InvalidConfig(msg));
            }
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig("gravity must be finite"));
        }
        if !(self.reset_noise.is_finite() && self.reset_noise >= 0.0) {
            return Err(PhysicsError::InvalidConfig("reset_noise must be non-negative"));
        }
        Ok(())
    }
}

/// Cart position and velocity, pole angle (0 = upright) and angular velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CartPoleState {
    pub x: f32,
    pub x_dot: f32,
    pub theta: f32,
    pub theta_dot: f32,
}

impl CartPoleState {
    #[must_use]
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.x_dot, self.theta, self.theta_dot]
    }
}

/// A CartPole entity
#[derive(Clone, Debug)]
pub struct CartPole {
    /// Configuration for this cartpole
    pub config: CartPoleConfig,
    state: CartPoleState,
    /// Whether the cartpole has failed (fallen over or out of bounds)
    failed: bool,
}

impl CartPole {
    /// # Errors
    ///
    /// Fails if `config` does not validate.
    pub fn new(config: CartPoleConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self { config, state: CartPoleState::default(), failed: false })
    }

    #[must_use]
    pub fn state(&self) -> CartPoleState {
        self.state
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Places the system in `state`; the failure flag follows the new state.
    pub fn set_state(&mut self, state: CartPoleState) {
        self.state = state;
        self.failed = self.out_of_bounds();
    }

    /// Draws every state component uniformly from `[-reset_noise, reset_noise)`.
    pub fn reset(&mut self, rng: &mut fastrand::Rng) -> CartPoleState {
        let noise = self.config.reset_noise;
        let mut draw = || rng.f32() * 2.0 * noise - noise;
        let state = CartPoleState { x: draw(), x_dot: draw(), theta: draw(), theta_dot: draw() };
        self.set_state(state);
        self.state
    }

    /// Applies `push` for one time step and reports whether the system failed.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::SteppedAfterFailure`] once the system has failed
    /// and has not been reset.
    pub fn step(&mut self, push: Push) -> Result<bool, PhysicsError> {
        if self.failed {
            return Err(PhysicsError::SteppedAfterFailure);
        }
        let force = match push {
            Push::Left => -self.config.force_magnitude,
            Push::Right => self.config.force_magnitude,
        };
        self.state = integrator::euler_step(&self.config, &self.state, force);
        self.failed = self.out_of_bounds();
        if self.failed {
            tracing::trace!(x = self.state.x, theta = self.state.theta, "cart-pole failed");
        }
        Ok(self.failed)
    }

    fn out_of_bounds(&self) -> bool {
        self.state.x.abs() > self.config.position_limit
            || self.state.theta.abs() > self.config.failure_angle
    }
}
