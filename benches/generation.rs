//! Floor generation and turn throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use gloomdelve::data::MapSettings;
use gloomdelve::world::generate;
use gloomdelve::GameSession;

fn bench_generate(c: &mut Criterion) {
    let settings = MapSettings::default();
    c.bench_function("generate_floor", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            let mut rng = StdRng::seed_from_u64(seed);
            black_box(generate(&settings, 3, 4, &mut rng))
        })
    });
}

fn bench_turns(c: &mut Criterion) {
    c.bench_function("fifty_waits", |b| {
        b.iter(|| {
            let mut session = GameSession::with_defaults(black_box(17));
            for _ in 0..50 {
                if session.wait().is_err() {
                    break;
                }
            }
            black_box(session.turn())
        })
    });
}

criterion_group!(benches, bench_generate, bench_turns);
criterion_main!(benches);
