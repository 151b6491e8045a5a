use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ml::{Activation, Tape, TensorStore};
use rl::{
    discounted_returns, normalized_returns, reinforce_loss, CartPoleEnv, EpisodeSampler, MlpPolicy,
    ReturnMode,
};

fn bench_returns(c: &mut Criterion) {
    let mut group = c.benchmark_group("returns");
    for len in [10, 100, 500] {
        let rewards = vec![1.0_f32; len];
        group.bench_with_input(BenchmarkId::new("plain", len), &rewards, |b, r| {
            b.iter(|| discounted_returns(black_box(r), 0.99));
        });
        group.bench_with_input(BenchmarkId::new("baseline", len), &rewards, |b, r| {
            b.iter(|| normalized_returns(black_box(r), 0.99));
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(0);
    let policy = MlpPolicy::new(4, 128, 2, Activation::Relu, &mut rng);
    let mut env = CartPoleEnv::with_seed(0).expect("default cart-pole config");
    let episode = EpisodeSampler::new(500)
        .and_then(|s| s.sample(&policy, &mut env, &mut rng))
        .expect("episode");
    let returns = ReturnMode::Baseline
        .compute(&episode.trace.rewards(), 0.99)
        .expect("returns");

    c.bench_function("reinforce_loss_backward", |b| {
        b.iter(|| {
            let mut tensors = TensorStore::new();
            policy.watch(&mut tensors);
            let mut tape = Tape::new();
            let loss = reinforce_loss(&policy, &episode.trace, &returns, &mut tape, &mut tensors)
                .expect("loss");
            tape.backward(&loss, &tensors).expect("backward")
        });
    });
}

criterion_group!(benches, bench_returns, bench_update);
criterion_main!(benches);
