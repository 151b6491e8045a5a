//! Multi-seed experiments and score aggregation.

use crate::config::{ExperimentConfig, TrainerConfig};
use crate::env::Env;
use crate::error::{Result, RlError};
use crate::trainer::{Trainer, TrainingSummary};
use serde::Serialize;

/// Trailing moving average in "valid" mode: entry `i` is the mean of
/// `values[i..i + window]`, so the output has `len - window + 1` entries and
/// is empty when there are fewer values than `window`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn moving_average(values: &[f32], window: usize) -> Vec<f32> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(values.len() - window + 1);
    let mut sum: f32 = values[..window].iter().sum();
    out.push(sum / window as f32);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out.push(sum / window as f32);
    }
    out
}

/// Per-episode mean and population standard deviation across seeds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Aggregate {
    pub window: usize,
    /// Common length all smoothed histories were truncated to.
    pub length: usize,
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

/// Smooths every history with [`moving_average`], truncates them all to the
/// shortest smoothed length, and reduces across seeds.
///
/// # Errors
///
/// Fails on an empty history list or a zero window.
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(histories: &[Vec<f32>], window: usize) -> Result<Aggregate> {
    if histories.is_empty() {
        return Err(RlError::NoSeeds);
    }
    if window == 0 {
        return Err(RlError::NonPositive { name: "smoothing_window", value: 0.0 });
    }
    let smoothed: Vec<Vec<f32>> = histories.iter().map(|h| moving_average(h, window)).collect();
    let length = smoothed.iter().map(Vec::len).min().unwrap_or(0);
    let n = smoothed.len() as f32;

    let mut mean = Vec::with_capacity(length);
    let mut std = Vec::with_capacity(length);
    for t in 0..length {
        let m = smoothed.iter().map(|s| s[t]).sum::<f32>() / n;
        let var = smoothed.iter().map(|s| (s[t] - m).powi(2)).sum::<f32>() / n;
        mean.push(m);
        std.push(var.sqrt());
    }
    Ok(Aggregate { window, length, mean, std })
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeedRun {
    pub seed: u64,
    pub summary: TrainingSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub runs: Vec<SeedRun>,
    pub aggregate: Aggregate,
}

/// Trains one independent run per seed and aggregates their score histories.
pub struct ExperimentRunner {
    config: ExperimentConfig,
}

impl ExperimentRunner {
    /// # Errors
    ///
    /// Fails if `config` does not validate.
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Trains a [`Trainer`] per seed on the environment built by `make_env`.
    /// Progress reports are silenced.
    ///
    /// # Errors
    ///
    /// The first failing seed aborts the experiment.
    pub fn run<E, F>(&self, make_env: F) -> Result<ExperimentReport>
    where
        E: Env,
        F: Fn(u64) -> Result<E> + Sync,
    {
        self.run_with(|seed, config| {
            let mut trainer = Trainer::new(config.clone(), make_env(seed)?)?;
            trainer.run()
        })
    }

    /// Runs `train` once per seed with that seed written into a copy of the
    /// trainer config, then aggregates the resulting score histories.
    ///
    /// # Errors
    ///
    /// The first failing seed aborts the experiment.
    pub fn run_with<F>(&self, train: F) -> Result<ExperimentReport>
    where
        F: Fn(u64, &TrainerConfig) -> Result<TrainingSummary> + Sync,
    {
        let configs: Vec<(u64, TrainerConfig)> = self
            .config
            .seeds
            .iter()
            .map(|&seed| {
                let mut trainer = self.config.trainer.clone();
                trainer.seed = seed;
                trainer.verbose = false;
                (seed, trainer)
            })
            .collect();

        let train = &train;
        let results: Vec<Result<TrainingSummary>> = if self.config.parallel {
            std::thread::scope(|scope| {
                let handles: Vec<_> = configs
                    .iter()
                    .map(|(seed, config)| scope.spawn(move || train(*seed, config)))
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                    .collect()
            })
        } else {
            configs.iter().map(|(seed, config)| train(*seed, config)).collect()
        };

        let mut runs = Vec::with_capacity(results.len());
        for ((seed, _), result) in configs.iter().zip(results) {
            let summary = result?;
            tracing::info!(
                seed,
                outcome = ?summary.outcome,
                episodes = summary.episodes,
                rolling_average = summary.rolling_average,
                "seed finished"
            );
            runs.push(SeedRun { seed: *seed, summary });
        }

        let histories: Vec<Vec<f32>> = runs.iter().map(|r| r.summary.scores.clone()).collect();
        let aggregate = aggregate(&histories, self.config.smoothing_window)?;
        Ok(ExperimentReport { runs, aggregate })
    }
}
