//! # pgrad: policy gradients on cart-pole
//!
//! ## Overview
//!
//! `pgrad` trains a small neural policy to balance a pole on a cart with
//! REINFORCE, the Monte-Carlo policy-gradient method. Each episode is played
//! to the end, its rewards are turned into discounted returns, and the policy
//! takes one gradient step on `-sum_t log pi(a_t | s_t) * G_t`. With the
//! baseline enabled the returns are mean-centred and scaled to unit variance
//! before weighting, which cuts the variance of the gradient estimate.
//!
//! ## Project Architecture
//!
//! -   **`pgrad`:** The crate you are currently viewing: documentation plus the
//!     command-line application that drives training runs and experiments.
//! -   **[`ml`]:** Tensors, tape-based reverse-mode autodiff, the `Dense`
//!     layer and the `Adam` optimizer.
//! -   **[`physics`]:** Classic cart-pole dynamics with seeded resets.
//! -   **[`rl`]:** Environment trait, stochastic policies, episode sampling,
//!     return calculation, the REINFORCE trainer and multi-seed experiments.
//!
//! ## Getting Started
//!
//! ```text
//! pgrad train --seed 3
//! pgrad train --baseline --episodes 800 -v
//! pgrad experiment --seeds 0,1,2,3,4 --baseline --parallel --out baseline.json
//! ```
//!
//! Every flag overrides the matching field of an optional JSON config passed
//! with `--config`; see [`rl::TrainerConfig`] and [`rl::ExperimentConfig`].

pub mod app;

pub use ml;
pub use physics;
pub use rl;
