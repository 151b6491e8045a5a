#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Cart-pole physics
//!
//! The classic cart-pole balancing system: a pole hinged on a cart that moves
//! along a bounded, frictionless track. The controller can only push the cart
//! left or right with a fixed force; the system fails once the pole tips past
//! the failure angle or the cart leaves the track.
//!
//! ```rust
//! use physics::{CartPole, CartPoleConfig, Push};
//!
//! let mut cartpole = CartPole::new(CartPoleConfig::default())?;
//! cartpole.reset(&mut fastrand::Rng::with_seed(0));
//! let failed = cartpole.step(Push::Right)?;
//! assert!(!failed);
//! # Ok::<(), physics::PhysicsError>(())
//! ```

pub mod cartpole;
pub mod error;
pub mod integrator;


pub use cartpole::{CartPole, CartPoleConfig, CartPoleState, Push};
pub use error::PhysicsError;
