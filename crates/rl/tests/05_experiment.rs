mod common;

use approx::assert_relative_eq;
use common::{small_config, CountdownEnv};
use rl::{
    aggregate, moving_average, ExperimentConfig, ExperimentRunner, RlError, TrainerConfig,
    TrainerState, TrainingSummary,
};

fn stub_summary(len: usize, level: f32) -> TrainingSummary {
    TrainingSummary {
        outcome: TrainerState::Exhausted,
        episodes: len,
        scores: vec![level; len],
        rolling_average: level,
    }
}

#[test]
fn moving_average_valid_mode() {
    assert_eq!(moving_average(&[1.0, 2.0, 3.0, 4.0], 2), vec![1.5, 2.5, 3.5]);
    assert_eq!(moving_average(&[1.0, 2.0, 3.0], 3), vec![2.0]);
    assert!(moving_average(&[1.0, 2.0], 3).is_empty());
    assert!(moving_average(&[1.0, 2.0], 0).is_empty());
}

#[test]
fn aggregate_reduces_across_seeds() {
    let histories = vec![vec![0.0; 4], vec![2.0; 4]];
    let agg = aggregate(&histories, 2).unwrap();
    assert_eq!(agg.length, 3);
    for t in 0..3 {
        assert_relative_eq!(agg.mean[t], 1.0);
        assert_relative_eq!(agg.std[t], 1.0);
    }
}

#[test]
fn aggregate_rejects_nothing_to_aggregate() {
    assert!(matches!(aggregate(&[], 5), Err(RlError::NoSeeds)));
    assert!(matches!(aggregate(&[vec![1.0]], 0), Err(RlError::NonPositive { .. })));
}

#[test]
fn unequal_histories_truncate_to_shortest() {
    let config = ExperimentConfig {
        trainer: small_config(),
        seeds: vec![20, 25, 30],
        smoothing_window: 5,
        parallel: false,
    };
    let runner = ExperimentRunner::new(config).unwrap();
    #[allow(clippy::cast_precision_loss)]
    let report = runner
        .run_with(|seed, _| Ok(stub_summary(usize::try_from(seed).unwrap(), seed as f32)))
        .unwrap();

    assert_eq!(report.runs.len(), 3);
    assert_eq!(report.aggregate.length, 20 - 5 + 1);
    assert_eq!(report.aggregate.mean.len(), 16);
    assert_eq!(report.aggregate.std.len(), 16);
    assert_relative_eq!(report.aggregate.mean[0], 25.0);
    assert_relative_eq!(report.aggregate.std[0], (50.0_f32 / 3.0).sqrt(), epsilon = 1e-4);
}

#[test]
fn every_seed_gets_its_own_config() {
    let config = ExperimentConfig {
        trainer: TrainerConfig { verbose: true, ..small_config() },
        seeds: vec![3, 9],
        smoothing_window: 1,
        parallel: false,
    };
    let runner = ExperimentRunner::new(config).unwrap();
    let report = runner
        .run_with(|seed, trainer| {
            assert_eq!(trainer.seed, seed);
            assert!(!trainer.verbose);
            Ok(stub_summary(2, 1.0))
        })
        .unwrap();
    let seeds: Vec<u64> = report.runs.iter().map(|r| r.seed).collect();
    assert_eq!(seeds, vec![3, 9]);
}

#[test]
fn failing_seed_aborts_experiment() {
    let config = ExperimentConfig { seeds: vec![0, 1], ..ExperimentConfig::default() };
    let runner = ExperimentRunner::new(config).unwrap();
    let err = runner
        .run_with(|seed, _| {
            if seed == 1 {
                Err(RlError::Finished("failed"))
            } else {
                Ok(stub_summary(60, 1.0))
            }
        })
        .unwrap_err();
    assert!(matches!(err, RlError::Finished(_)));
}

#[test]
fn parallel_matches_sequential() {
    let trainer = TrainerConfig { num_episodes: 6, ..small_config() };
    let sequential = ExperimentConfig {
        trainer,
        seeds: vec![0, 1, 2],
        smoothing_window: 3,
        parallel: false,
    };
    let parallel = ExperimentConfig { parallel: true, ..sequential.clone() };

    let make_env = |seed| rl::CartPoleEnv::with_seed(seed);
    let a = ExperimentRunner::new(sequential).unwrap().run(make_env).unwrap();
    let b = ExperimentRunner::new(parallel).unwrap().run(make_env).unwrap();
    assert_eq!(a, b);
}

#[test]
fn stub_environment_experiment() {
    let config = ExperimentConfig {
        trainer: TrainerConfig { num_episodes: 4, ..small_config() },
        seeds: vec![0, 1],
        smoothing_window: 2,
        parallel: true,
    };
    let report = ExperimentRunner::new(config)
        .unwrap()
        .run(|_| Ok(CountdownEnv::new(8)))
        .unwrap();
    assert_eq!(report.aggregate.mean, vec![8.0; 3]);
    assert_eq!(report.aggregate.std, vec![0.0; 3]);
}

#[test]
fn empty_seed_list_is_rejected() {
    let config = ExperimentConfig { seeds: vec![], ..ExperimentConfig::default() };
    assert!(matches!(ExperimentRunner::new(config), Err(RlError::NoSeeds)));
}
