//! Trainer and experiment configuration.
//!
//! Both structs deserialize from JSON with every field optional; missing
//! fields take the reference cart-pole values.

use crate::error::{Result, RlError};
use crate::returns::{validate_gamma, ReturnMode};
use ml::Activation;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub learning_rate: f32,
    /// Episode budget; the run ends `Exhausted` once it is spent.
    pub num_episodes: usize,
    /// Step cap per episode.
    pub max_steps: usize,
    pub gamma: f32,
    /// Rolling average at which the run ends `Solved`.
    pub solved_threshold: f32,
    /// Episodes between progress reports.
    pub report_interval: usize,
    /// Emit the periodic progress reports.
    pub verbose: bool,
    /// Call the environment's render hook after every step.
    pub render: bool,
    /// Number of recent episodes in the rolling average.
    pub rolling_window: usize,
    pub return_mode: ReturnMode,
    pub hidden_size: usize,
    pub activation: Activation,
    /// Seeds weight initialisation, action sampling and the environment.
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            num_episodes: 1500,
            max_steps: 500,
            gamma: 0.99,
            solved_threshold: 495.0,
            report_interval: 50,
            verbose: true,
            render: false,
            rolling_window: 100,
            return_mode: ReturnMode::Plain,
            hidden_size: 128,
            activation: Activation::Relu,
            seed: 0,
        }
    }
}

fn positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(RlError::NonPositive { name, value: 0.0 });
    }
    Ok(())
}

impl TrainerConfig {
    /// # Errors
    ///
    /// Returns the first invalid field: zero counts or windows, a learning
    /// rate that is not positive, or a discount outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(RlError::NonPositive {
                name: "learning_rate",
                value: f64::from(self.learning_rate),
            });
        }
        positive("num_episodes", self.num_episodes)?;
        positive("max_steps", self.max_steps)?;
        positive("report_interval", self.report_interval)?;
        positive("rolling_window", self.rolling_window)?;
        positive("hidden_size", self.hidden_size)?;
        validate_gamma(self.gamma)
    }

    /// # Errors
    ///
    /// Fails on malformed JSON or an invalid configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read, or as [`TrainerConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&read(path.as_ref())?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub trainer: TrainerConfig,
    pub seeds: Vec<u64>,
    /// Trailing moving-average window applied before aggregating.
    pub smoothing_window: usize,
    /// Train the seeds on separate threads.
    pub parallel: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            trainer: TrainerConfig::default(),
            seeds: vec![0, 1, 2, 3, 4],
            smoothing_window: 50,
            parallel: false,
        }
    }
}

impl ExperimentConfig {
    /// # Errors
    ///
    /// Fails on an invalid trainer config, an empty seed list or a zero
    /// smoothing window.
    pub fn validate(&self) -> Result<()> {
        self.trainer.validate()?;
        if self.seeds.is_empty() {
            return Err(RlError::NoSeeds);
        }
        positive("smoothing_window", self.smoothing_window)
    }

    /// # Errors
    ///
    /// Fails on malformed JSON or an invalid configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read, or as [`ExperimentConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&read(path.as_ref())?)
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| RlError::ConfigIo { path: path.to_path_buf(), source })
}
