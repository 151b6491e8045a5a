//! # pgrad
//!
//! Command-line entry point. `train` runs a single REINFORCE trainer on
//! cart-pole; `experiment` repeats training over several seeds and writes the
//! aggregated learning curves as JSON.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pgrad::app::{self, ExperimentOptions, Overrides, TrainOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pgrad", version, about)]
struct Cli {
    /// Raise the log level (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train one policy and print the outcome.
    Train {
        #[command(flatten)]
        common: CommonArgs,

        /// Seed for weights, action sampling and the environment.
        #[arg(long)]
        seed: Option<u64>,

        /// Log every cart-pole step at trace level.
        #[arg(long)]
        render: bool,

        /// Greedy evaluation episodes to run after training.
        #[arg(long, default_value_t = 0)]
        evaluate: usize,
    },
    /// Train one policy per seed and aggregate the score curves.
    Experiment {
        #[command(flatten)]
        common: CommonArgs,

        /// Comma-separated seeds.
        #[arg(long, value_delimiter = ',')]
        seeds: Option<Vec<u64>>,

        /// Train the seeds on separate threads.
        #[arg(long)]
        parallel: bool,

        /// Write the report here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Weight log-probabilities with normalized returns.
    #[arg(long)]
    baseline: bool,

    /// Episode budget.
    #[arg(long)]
    episodes: Option<usize>,
}

impl CommonArgs {
    fn overrides(self) -> Overrides {
        Overrides { config: self.config, baseline: self.baseline, episodes: self.episodes }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    app::init_logging(cli.verbose);

    match cli.command {
        Command::Train { common, seed, render, evaluate } => {
            let options = TrainOptions { overrides: common.overrides(), seed, render, evaluate };
            let outcome = app::train(&options)?;
            println!(
                "{:?} after {} episodes, rolling average {:.2}",
                outcome.summary.outcome, outcome.summary.episodes, outcome.summary.rolling_average
            );
            if !outcome.evaluation.is_empty() {
                println!("greedy evaluation: {:?}", outcome.evaluation);
            }
        }
        Command::Experiment { common, seeds, parallel, out } => {
            let options = ExperimentOptions { overrides: common.overrides(), seeds, parallel };
            let report = app::experiment(&options)?;
            app::write_report(&report, out.as_deref())?;
        }
    }
    Ok(())
}
