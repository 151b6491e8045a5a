//! # pgrad application logic
//!
//! Turns command-line options into validated trainer and experiment
//! configurations, runs them on the cart-pole environment, and serializes the
//! results. The binary in `main.rs` only parses arguments and prints.

use anyhow::{Context, Result};
use rl::{
    CartPoleEnv, ExperimentConfig, ExperimentReport, ExperimentRunner, ReturnMode, Trainer,
    TrainerConfig, TrainingSummary,
};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Install the `fmt` subscriber. `verbosity` counts `-v` flags.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).with_target(false).init();
}

/// Options shared by both subcommands.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub baseline: bool,
    pub episodes: Option<usize>,
}

impl Overrides {
    fn apply(&self, trainer: &mut TrainerConfig) {
        if self.baseline {
            trainer.return_mode = ReturnMode::Baseline;
        }
        if let Some(episodes) = self.episodes {
            trainer.num_episodes = episodes;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TrainOptions {
    pub overrides: Overrides,
    pub seed: Option<u64>,
    pub render: bool,
    pub evaluate: usize,
}

#[derive(Clone, Debug, Default)]
pub struct ExperimentOptions {
    pub overrides: Overrides,
    pub seeds: Option<Vec<u64>>,
    pub parallel: bool,
}

#[derive(Clone, Debug)]
pub struct TrainOutcome {
    pub summary: TrainingSummary,
    /// Total rewards of the greedy evaluation episodes, if any were requested.
    pub evaluation: Vec<f32>,
}

/// Config file (or defaults) with the command-line overrides applied.
///
/// # Errors
///
/// Fails if the file cannot be read or parsed, or the result is invalid.
pub fn trainer_config(options: &TrainOptions) -> Result<TrainerConfig> {
    let mut config = match &options.overrides.config {
        Some(path) => TrainerConfig::from_json_file(path)
            .with_context(|| format!("loading trainer config {}", path.display()))?,
        None => TrainerConfig::default(),
    };
    options.overrides.apply(&mut config);
    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    config.render |= options.render;
    config.validate().context("invalid trainer config")?;
    Ok(config)
}

/// # Errors
///
/// Fails if the file cannot be read or parsed, or the result is invalid.
pub fn experiment_config(options: &ExperimentOptions) -> Result<ExperimentConfig> {
    let mut config = match &options.overrides.config {
        Some(path) => ExperimentConfig::from_json_file(path)
            .with_context(|| format!("loading experiment config {}", path.display()))?,
        None => ExperimentConfig::default(),
    };
    options.overrides.apply(&mut config.trainer);
    if let Some(seeds) = &options.seeds {
        config.seeds.clone_from(seeds);
    }
    config.parallel |= options.parallel;
    config.validate().context("invalid experiment config")?;
    Ok(config)
}

/// Train one policy on cart-pole.
///
/// # Errors
///
/// Returns configuration errors and any failure that aborted training.
pub fn train(options: &TrainOptions) -> Result<TrainOutcome> {
    let config = trainer_config(options)?;
    let env = CartPoleEnv::with_seed(config.seed)?;
    let mut trainer = Trainer::new(config, env)?;
    let summary = trainer.run().context("training failed")?;
    tracing::info!(
        outcome = ?summary.outcome,
        episodes = summary.episodes,
        rolling_average = summary.rolling_average,
        "training finished"
    );
    let evaluation = trainer.evaluate(options.evaluate)?;
    Ok(TrainOutcome { summary, evaluation })
}

/// Train one cart-pole policy per seed and aggregate.
///
/// # Errors
///
/// Returns configuration errors and the first failing seed.
pub fn experiment(options: &ExperimentOptions) -> Result<ExperimentReport> {
    let config = experiment_config(options)?;
    tracing::info!(
        seeds = ?config.seeds,
        mode = ?config.trainer.return_mode,
        parallel = config.parallel,
        "starting experiment"
    );
    let report = ExperimentRunner::new(config)?
        .run(CartPoleEnv::with_seed)
        .context("experiment failed")?;
    let solved = report
        .runs
        .iter()
        .filter(|r| r.summary.outcome == rl::TrainerState::Solved)
        .count();
    tracing::info!(solved, seeds = report.runs.len(), "experiment finished");
    Ok(report)
}

/// Pretty JSON to `out`, or stdout when no path is given.
///
/// # Errors
///
/// Fails if the report cannot be written.
pub fn write_report(report: &ExperimentReport, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    match out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pgrad-{}-{name}", std::process::id()))
    }

    #[test]
    fn flags_override_config_file() {
        let path = temp_path("trainer.json");
        std::fs::write(&path, r#"{ "num_episodes": 10, "seed": 1, "gamma": 0.9 }"#).unwrap();
        let options = TrainOptions {
            overrides: Overrides { config: Some(path.clone()), baseline: true, episodes: Some(20) },
            seed: Some(5),
            render: false,
            evaluate: 0,
        };
        let config = trainer_config(&options).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.num_episodes, 20);
        assert_eq!(config.seed, 5);
        assert_eq!(config.return_mode, ReturnMode::Baseline);
        assert!((config.gamma - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_config_file_is_reported() {
        let options = TrainOptions {
            overrides: Overrides { config: Some(temp_path("absent.json")), ..Overrides::default() },
            ..TrainOptions::default()
        };
        let err = trainer_config(&options).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }

    #[test]
    fn experiment_flags_replace_seeds() {
        let options = ExperimentOptions {
            overrides: Overrides { episodes: Some(3), ..Overrides::default() },
            seeds: Some(vec![7, 8]),
            parallel: true,
        };
        let config = experiment_config(&options).unwrap();
        assert_eq!(config.seeds, vec![7, 8]);
        assert!(config.parallel);
        assert_eq!(config.trainer.num_episodes, 3);
    }

    #[test]
    fn zero_episodes_is_rejected() {
        let options = ExperimentOptions {
            overrides: Overrides { episodes: Some(0), ..Overrides::default() },
            ..ExperimentOptions::default()
        };
        assert!(experiment_config(&options).is_err());
    }

    #[test]
    fn short_experiment_writes_json() {
        let options = ExperimentOptions {
            overrides: Overrides { episodes: Some(3), ..Overrides::default() },
            seeds: Some(vec![0, 1]),
            parallel: false,
        };
        let report = experiment(&options).unwrap();
        // smoothing window 50 leaves nothing to aggregate after 3 episodes
        assert_eq!(report.aggregate.length, 0);
        assert_eq!(report.runs.len(), 2);

        let path = temp_path("report.json");
        write_report(&report, Some(&path)).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(json["runs"][0]["summary"]["outcome"], "exhausted");
        assert_eq!(json["runs"][1]["summary"]["scores"].as_array().unwrap().len(), 3);
    }
}
