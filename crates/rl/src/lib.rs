#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Policy-gradient training
//!
//! Monte-Carlo policy gradient (REINFORCE) for discrete-action, episodic
//! environments, with an optional normalizing baseline.
//!
//! ## Pipeline
//!
//! -   **[`EpisodeSampler`]** runs one episode under a [`Policy`], recording
//!     the state, sampled action, its log-probability and the reward per step.
//! -   **[`returns`]** turns the rewards into discounted returns, either plain
//!     or mean/std-normalized ([`ReturnMode`]).
//! -   **[`Trainer`]** assembles `-sum_t log pi(a_t | s_t) * G_t`,
//!     backpropagates it through the [`MlpPolicy`] with the `ml` tape and takes
//!     one Adam step per episode, stopping once the rolling average clears the
//!     solved threshold or the episode budget runs out.
//! -   **[`ExperimentRunner`]** repeats training over several seeds and
//!     aggregates the smoothed score curves.
//!
//! ```rust,no_run
//! use rl::{CartPoleEnv, Trainer, TrainerConfig};
//!
//! let env = CartPoleEnv::with_seed(0)?;
//! let mut trainer = Trainer::new(TrainerConfig::default(), env)?;
//! let summary = trainer.run()?;
//! println!("{:?} after {} episodes", summary.outcome, summary.episodes);
//! # Ok::<(), rl::RlError>(())
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod experiment;
pub mod policy;
pub mod returns;
pub mod sampler;
pub mod score;
pub mod trainer;

pub use config::{ExperimentConfig, TrainerConfig};
pub use env::{CartPoleEnv, Env, Transition};
pub use error::{Result, RlError};
pub use experiment::{aggregate, moving_average, Aggregate, ExperimentReport, ExperimentRunner, SeedRun};
pub use policy::{Categorical, MlpPolicy, Policy};
pub use returns::{discounted_returns, normalized_returns, ReturnMode};
pub use sampler::{Episode, EpisodeSampler, EpisodeTrace, StepRecord};
pub use score::ScoreHistory;
pub use trainer::{reinforce_loss, EpisodeReport, Trainer, TrainerState, TrainingSummary};
