use approx::assert_relative_eq;
use ml::Activation;
use rl::{Categorical, MlpPolicy, Policy, RlError};

fn reference_log_softmax(logits: &[f64], i: usize) -> f64 {
    let m = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lse = m + logits.iter().map(|l| (l - m).exp()).sum::<f64>().ln();
    logits[i] - lse
}

#[test]
fn log_prob_matches_log_softmax() {
    for logits in [
        vec![0.0, 0.0],
        vec![1.0, 2.0, 3.0],
        vec![-3.5, 0.25, 7.0, 1.0],
        vec![1000.0, -1000.0],
        vec![-800.0, -805.0, -790.0],
    ] {
        let dist = Categorical::from_logits(logits.clone());
        let wide: Vec<f64> = logits.iter().map(|&v| f64::from(v)).collect();
        for a in 0..logits.len() {
            let lp = dist.log_prob(a).unwrap();
            assert!(lp <= 0.0);
            assert!(lp.is_finite(), "log prob should not underflow for {logits:?}");
            let expected = reference_log_softmax(&wide, a) as f32;
            assert_relative_eq!(lp, expected, epsilon = 1e-3, max_relative = 1e-5);
        }
    }
}

#[test]
fn probabilities_sum_to_one() {
    let dist = Categorical::from_logits(vec![0.3, -1.0, 2.0]);
    let total: f32 = dist.probs().iter().sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-6);
    assert_eq!(dist.action_count(), 3);
    assert_eq!(dist.mode(), 2);
}

#[test]
fn out_of_range_action_is_an_error() {
    let dist = Categorical::from_logits(vec![0.0, 0.0]);
    assert!(matches!(
        dist.log_prob(2),
        Err(RlError::InvalidAction { action: 2, count: 2 })
    ));
}

#[test]
fn sampling_follows_probabilities() {
    let dist = Categorical::from_logits(vec![0.0, (3.0f32).ln()]);
    let mut rng = fastrand::Rng::with_seed(11);
    let n = 20_000;
    let ones = (0..n).filter(|_| dist.sample(&mut rng) == 1).count();
    let frac = ones as f32 / n as f32;
    assert!((frac - 0.75).abs() < 0.02, "sampled fraction {frac}");
}

#[test]
fn impossible_actions_are_never_sampled() {
    let dist = Categorical::from_logits(vec![f32::NEG_INFINITY, 0.0]);
    let mut rng = fastrand::Rng::with_seed(5);
    assert!((0..1000).all(|_| dist.sample(&mut rng) == 1));
    assert_eq!(dist.log_prob(1).unwrap(), 0.0);
}

#[test]
fn mlp_policy_is_deterministic_given_parameters() {
    let policy = MlpPolicy::new(4, 16, 2, Activation::Relu, &mut fastrand::Rng::with_seed(3));
    let state = [0.01, -0.02, 0.03, 0.0];
    let a = policy.distribution(&state).unwrap();
    let b = policy.distribution(&state).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.action_count(), 2);
    assert_eq!(policy.action_count(), 2);
    assert_eq!(policy.params().len(), 4);
}

#[test]
fn mlp_policy_seeded_init_is_reproducible() {
    let a = MlpPolicy::new(4, 8, 2, Activation::Tanh, &mut fastrand::Rng::with_seed(9));
    let b = MlpPolicy::new(4, 8, 2, Activation::Tanh, &mut fastrand::Rng::with_seed(9));
    let s = [0.5, 0.1, -0.2, 0.3];
    assert_eq!(a.distribution(&s).unwrap(), b.distribution(&s).unwrap());
}

#[test]
fn mlp_policy_rejects_wrong_state_size() {
    let policy = MlpPolicy::new(4, 8, 2, Activation::Relu, &mut fastrand::Rng::with_seed(0));
    assert!(matches!(
        policy.distribution(&[0.0, 1.0]),
        Err(RlError::StateDimension { expected: 4, got: 2 })
    ));
}
