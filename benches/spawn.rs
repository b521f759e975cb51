use std::hint::black_box;

use criterion::*;
use strata_ecs::engine::registry::Archetypes;

const ENTITIES: usize = 100_000;

fn spawn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    group.bench_function("spawn_100k", |b| {
        b.iter(|| {
            let mut archetypes = Archetypes::new();
            for _ in 0..ENTITIES {
                black_box(archetypes.spawn());
            }
            black_box(archetypes);
        });
    });

    group.bench_function("spawn_despawn_recycle_100k", |b| {
        b.iter(|| {
            let mut archetypes = Archetypes::new();
            let mut handles = Vec::with_capacity(ENTITIES);
            for _ in 0..ENTITIES {
                handles.push(archetypes.spawn().identity());
            }
            for identity in handles.drain(..) {
                archetypes
                    .despawn(identity)
                    .expect("despawn failed in benchmark");
            }
            // Second wave reuses every index from the free list.
            for _ in 0..ENTITIES {
                black_box(archetypes.spawn());
            }
            black_box(archetypes);
        });
    });

    group.finish();
}

criterion_group!(benches, spawn_benchmark);
criterion_main!(benches);
