//! Benchmarks for single uniqueness checks: index vs aggregate backend.

#![allow(missing_docs)]
#![allow(clippy::expect_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use movedex::dex::{CosmeticFilter, DexBuilder, Generation, MemoryDex};
use movedex::engine::{
    AggregateCheck, MoveSetIndex, UniquenessCheck, effective_moves, sample_without_replacement,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Three-stage evolution lines so inheritance is exercised.
fn world(lines: u32, pool: u32, per_creature: usize) -> MemoryDex {
    let mut rng = SmallRng::seed_from_u64(3);
    let all: Vec<u32> = (1..=pool).collect();
    let mut b = DexBuilder::new().version_group(1, 1).version_group(2, 2);
    for line in 0..lines {
        for stage in 0..3 {
            let id = line * 3 + stage + 1;
            let moves =
                sample_without_replacement(&all, per_creature, &mut rng).expect("pool too small");
            b = b.creature(id, &format!("c{id}"), 1).learns(id, &moves, 1 + stage % 2);
            if stage > 0 {
                b = b.evolves(id - 1, id);
            }
        }
    }
    b.build().expect("synthetic world")
}

fn bench_effective_moves(c: &mut Criterion) {
    let dex = world(150, 400, 50);
    let filter = CosmeticFilter::default();
    let latest = Generation::new(2).expect("generation");

    c.bench_function("effective_moves_stage3", |b| {
        b.iter(|| black_box(effective_moves(&dex, &filter, black_box(3), latest)));
    });
}

fn bench_is_unique(c: &mut Criterion) {
    let dex = world(150, 400, 50);
    let filter = CosmeticFilter::default();
    let latest = Generation::new(2).expect("generation");
    let index = MoveSetIndex::build(&dex, &filter, latest).expect("index");
    let aggregate = AggregateCheck::new(&dex, &filter, latest).expect("aggregate");
    let owner = 3;
    let moves: Vec<u32> = index.moves_of(owner).expect("indexed")[..4].to_vec();

    c.bench_function("is_unique_index", |b| {
        b.iter(|| black_box(index.is_unique(black_box(&moves), owner)));
    });
    c.bench_function("is_unique_aggregate", |b| {
        b.iter(|| black_box(aggregate.is_unique(black_box(&moves), owner)));
    });
}

criterion_group!(benches, bench_effective_moves, bench_is_unique);
criterion_main!(benches);
