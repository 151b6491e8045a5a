use criterion::{black_box, criterion_group, criterion_main, Criterion};
use physics::{CartPole, CartPoleConfig, Push};

fn bench_cartpole_episode(c: &mut Criterion) {
    let mut cartpole = CartPole::new(CartPoleConfig::default()).expect("default config");
    let mut rng = fastrand::Rng::with_seed(0);
    c.bench_function("cartpole_episode", |b| {
        b.iter(|| {
            cartpole.reset(&mut rng);
            let mut steps = 0_u32;
            // alternate pushes so episodes run for a while before failing
            while steps < 500 {
                let push = if steps % 2 == 0 { Push::Left } else { Push::Right };
                if cartpole.step(black_box(push)).expect("step before failure") {
                    break;
                }
                steps += 1;
            }
            steps
        });
    });
}

criterion_group!(benches, bench_cartpole_episode);
criterion_main!(benches);
