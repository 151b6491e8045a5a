use ml::Activation;
use rl::{ExperimentConfig, ReturnMode, RlError, TrainerConfig};

#[test]
fn empty_json_gives_defaults() {
    let config = TrainerConfig::from_json_str("{}").unwrap();
    assert_eq!(config, TrainerConfig::default());
    assert_eq!(config.num_episodes, 1500);
    assert_eq!(config.max_steps, 500);
    assert!((config.gamma - 0.99).abs() < f32::EPSILON);
    assert!((config.solved_threshold - 495.0).abs() < f32::EPSILON);
    assert_eq!(config.rolling_window, 100);
}

#[test]
fn partial_json_overrides_fields() {
    let config = TrainerConfig::from_json_str(
        r#"{ "return_mode": "baseline", "activation": "tanh", "hidden_size": 32, "seed": 11 }"#,
    )
    .unwrap();
    assert_eq!(config.return_mode, ReturnMode::Baseline);
    assert_eq!(config.activation, Activation::Tanh);
    assert_eq!(config.hidden_size, 32);
    assert_eq!(config.seed, 11);
    assert_eq!(config.max_steps, 500);
}

#[test]
fn experiment_json_nests_trainer() {
    let config = ExperimentConfig::from_json_str(
        r#"{ "seeds": [4, 5], "parallel": true, "trainer": { "num_episodes": 10 } }"#,
    )
    .unwrap();
    assert_eq!(config.seeds, vec![4, 5]);
    assert!(config.parallel);
    assert_eq!(config.trainer.num_episodes, 10);
    assert_eq!(config.smoothing_window, 50);
}

#[test]
fn invalid_values_fail_validation() {
    assert!(matches!(
        TrainerConfig::from_json_str(r#"{ "gamma": 1.5 }"#),
        Err(RlError::InvalidDiscount(_))
    ));
    assert!(matches!(
        TrainerConfig::from_json_str(r#"{ "learning_rate": -0.1 }"#),
        Err(RlError::NonPositive { name: "learning_rate", .. })
    ));
    assert!(matches!(
        TrainerConfig::from_json_str(r#"{ "rolling_window": 0 }"#),
        Err(RlError::NonPositive { name: "rolling_window", .. })
    ));
    assert!(matches!(
        ExperimentConfig::from_json_str(r#"{ "smoothing_window": 0 }"#),
        Err(RlError::NonPositive { name: "smoothing_window", .. })
    ));
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        TrainerConfig::from_json_str(r#"{ "return_mode": "sideways" }"#),
        Err(RlError::ConfigParse(_))
    ));
    assert!(matches!(TrainerConfig::from_json_str("not json"), Err(RlError::ConfigParse(_))));
}

#[test]
fn missing_file_reports_path() {
    let err = TrainerConfig::from_json_file("/definitely/not/here.json").unwrap_err();
    match err {
        RlError::ConfigIo { path, .. } => assert!(path.ends_with("here.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn config_round_trips_through_file() {
    let path = std::env::temp_dir().join(format!("pgrad-config-{}.json", std::process::id()));
    let config = TrainerConfig { gamma: 0.95, num_episodes: 42, ..TrainerConfig::default() };
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    let loaded = TrainerConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, config);
}
