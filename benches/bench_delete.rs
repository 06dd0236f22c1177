#![allow(dead_code)]
use shared::*;

use criterion::{criterion_group, Criterion};
use std::hint::black_box;

fn bench_delete_one_from_warm_tree(_c: &mut Criterion) {
    let rects = generate_rectangles();
    let (to_delete, _) = rects.split_last().unwrap();
    let to_delete = *to_delete;
    let mut cc = configure_criterion();
    cc.bench_function("delete_one_from_warm_tree", |b| {
        b.iter_with_setup(
            || bulk_loaded_index(&rects),
            |mut idx| {
                black_box(idx.delete(to_delete.0, to_delete.1));
            },
        )
    });
}

criterion_group!(benches, bench_delete_one_from_warm_tree);
