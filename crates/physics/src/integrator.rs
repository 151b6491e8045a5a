//! # Cart-pole integration
//!
//! Equations of motion for a pole hinged on a cart moving along a frictionless
//! track, advanced with explicit Euler steps.

use crate::cartpole::{CartPoleConfig, CartPoleState};

/// Accelerations `(x_acc, theta_acc)` of the cart and pole under `force`.
#[must_use]
pub fn accelerations(config: &CartPoleConfig, state: &CartPoleState, force: f32) -> (f32, f32) {
    let total_mass = config.cart_mass + config.pole_mass;
    let polemass_length = config.pole_mass * config.half_pole_length;
    let (sin_theta, cos_theta) = state.theta.sin_cos();

    let temp = (force + polemass_length * state.theta_dot.powi(2) * sin_theta) / total_mass;
    let theta_acc = (config.gravity * sin_theta - cos_theta * temp)
        / (config.half_pole_length
            * (4.0 / 3.0 - config.pole_mass * cos_theta.powi(2) / total_mass));
    let x_acc = temp - polemass_length * theta_acc * cos_theta / total_mass;
    (x_acc, theta_acc)
}

/// Explicit Euler step: positions advance with the old velocities, velocities
/// with the new accelerations.
#[must_use]
pub fn euler_step(config: &CartPoleConfig, state: &CartPoleState, force: f32) -> CartPoleState {
    let (x_acc, theta_acc) = accelerations(config, state, force);
    let dt = config.tau;
    CartPoleState {
        x: state.x + dt * state.x_dot,
        x_dot: state.x_dot + dt * x_acc,
        theta: state.theta + dt * state.theta_dot,
        theta_dot: state.theta_dot + dt * theta_acc,
    }
}
