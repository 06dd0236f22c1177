#![allow(dead_code)]
use shared::*;

use criterion::{criterion_group, Criterion};
use std::hint::black_box;

fn bench_join_two_warm_trees(_c: &mut Criterion) {
    let rects_a = generate_rectangles();
    let mut rng = Lcg::new(0x5EED_BEEF ^ 0x1357_9BDF);
    let rects_b: Vec<_> = (0..BENCH_NUM_INSERT)
        .map(|i| {
            let min_x = rng.next_range(0.0, BENCH_BOUNDARY);
            let min_y = rng.next_range(0.0, BENCH_BOUNDARY);
            let w = rng.next_range(0.1, 20.0);
            let h = rng.next_range(0.1, 20.0);
            (rtreedex::geometry::Rectangle::new(min_x, min_y, min_x + w, min_y + h), i + 1_000_000)
        })
        .collect();

    let a = bulk_loaded_index(&rects_a);
    let b = bulk_loaded_index(&rects_b);

    let mut cc = configure_criterion();
    cc.bench_function("join_two_warm_trees", |bencher| {
        bencher.iter(|| black_box(a.join(&b)))
    });
}

criterion_group!(benches, bench_join_two_warm_trees);
