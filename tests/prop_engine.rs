//! Property-based tests for learnability and uniqueness.
//!
//! Random small worlds: a handful of creatures over three generations, with
//! arbitrary (possibly cyclic) evolution edges and some cosmetic forms.
//! Run with: cargo test --release prop_engine

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_possible_truncation)]

use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;

use proptest::prelude::*;

use movedex::dex::{
    CosmeticFilter, CreatureId, DexBuilder, DexSource, Generation, MemoryDex, MoveId,
};
use movedex::engine::{
    AggregateCheck, LearnabilityResolver, MoveSetIndex, NoProgress, SampleOptions, UniquenessCheck,
    effective_moves, sweep_complete, sweep_sampled,
};

#[derive(Debug, Clone)]
struct World {
    generations: Vec<u8>,
    cosmetic: Vec<bool>,
    learns: Vec<(u32, MoveId, u32)>,
    edges: Vec<(u32, u32)>,
}

fn world() -> impl Strategy<Value = World> {
    (2usize..8).prop_flat_map(|n| {
        let n32 = n as u32;
        (
            prop::collection::vec(1u8..=3, n),
            prop::collection::vec(prop::bool::weighted(0.2), n),
            prop::collection::vec((0..n32, 1 as MoveId..=10, 1u32..=3), 0..60),
            prop::collection::vec((0..n32, 0..n32), 0..8),
        )
            .prop_map(|(generations, cosmetic, learns, edges)| World {
                generations,
                cosmetic,
                learns,
                edges,
            })
    })
}

fn build(world: &World) -> MemoryDex {
    let mut b = DexBuilder::new()
        .version_group(1, 1)
        .version_group(2, 2)
        .version_group(3, 3);
    for (i, (&g, &cosmetic)) in world.generations.iter().zip(&world.cosmetic).enumerate() {
        let name = if cosmetic {
            format!("c{i}-cap")
        } else {
            format!("c{i}")
        };
        b = b.creature(i as CreatureId + 1, &name, g);
    }
    for &(c, m, vg) in &world.learns {
        b = b.learns(c + 1, &[m], vg);
    }
    for &(from, to) in &world.edges {
        b = b.evolves(from + 1, to + 1);
    }
    b.build().unwrap()
}

fn cutoff(g: u8) -> Generation {
    Generation::new(g).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Lineage terminates on any graph and lists each ancestor once.
    #[test]
    fn prop_closure_terminates(w in world()) {
        let dex = build(&w);
        let filter = CosmeticFilter::default();
        let resolver = LearnabilityResolver::new(&dex, &filter, cutoff(3)).unwrap();
        for id in 1..=w.generations.len() as CreatureId {
            let lineage = resolver.lineage(id).unwrap();
            let distinct: BTreeSet<_> = lineage.iter().collect();
            prop_assert_eq!(distinct.len(), lineage.len());
            prop_assert_eq!(lineage[0], id);
            for &ancestor in &lineage[1..] {
                let name = dex.creature_by_id(ancestor).unwrap().name;
                prop_assert!(!filter.is_cosmetic(&name));
            }
        }
    }

    /// Raising the cutoff never removes a move.
    #[test]
    fn prop_monotonic_cutoff(w in world(), g1 in 1u8..=3, g2 in 1u8..=3) {
        let (lo, hi) = (g1.min(g2), g1.max(g2));
        let dex = build(&w);
        let filter = CosmeticFilter::default();
        for id in 1..=w.generations.len() as CreatureId {
            let small = effective_moves(&dex, &filter, id, cutoff(lo)).unwrap();
            let large = effective_moves(&dex, &filter, id, cutoff(hi)).unwrap();
            prop_assert!(small.is_subset(&large));
        }
    }

    /// Index and aggregate backends agree on owners and uniqueness.
    #[test]
    fn prop_backends_agree(
        w in world(),
        g in 1u8..=3,
        moves in prop::collection::vec(1 as MoveId..=10, 1..=4),
        owner in 1 as CreatureId..=8,
    ) {
        let dex = build(&w);
        let filter = CosmeticFilter::default();
        let index = MoveSetIndex::build(&dex, &filter, cutoff(g)).unwrap();
        let aggregate = AggregateCheck::new(&dex, &filter, cutoff(g)).unwrap();

        prop_assert_eq!(index.owners(&moves), aggregate.owners(&moves).unwrap());
        prop_assert_eq!(
            index.is_unique(&moves, owner).unwrap(),
            aggregate.is_unique(&moves, owner).unwrap()
        );
    }

    /// Every swept puzzle re-checks as unique through both backends.
    #[test]
    fn prop_sweep_round_trip(w in world(), g in 1u8..=3) {
        let dex = build(&w);
        let filter = CosmeticFilter::default();
        let index = MoveSetIndex::build(&dex, &filter, cutoff(g)).unwrap();
        let aggregate = AggregateCheck::new(&dex, &filter, cutoff(g)).unwrap();
        let outcome = sweep_complete(&index, &NoProgress, &AtomicBool::new(false)).unwrap();

        for p in &outcome.puzzles {
            prop_assert!(index.is_unique(&p.moves, p.owner).unwrap());
            prop_assert!(aggregate.is_unique(&p.moves, p.owner).unwrap());
            let creature = dex.creature_by_id(p.owner).unwrap();
            prop_assert!(!filter.is_cosmetic(&creature.name));
            prop_assert!(creature.generation <= cutoff(g));
        }
        prop_assert!(outcome.puzzles.windows(2).all(|w| w[0] < w[1]));
    }

    /// Sampled output is a subset of complete output.
    #[test]
    fn prop_sampled_subset(w in world(), samples in 1usize..30, seed in any::<u64>()) {
        let dex = build(&w);
        let index = MoveSetIndex::build(&dex, &CosmeticFilter::default(), cutoff(3)).unwrap();
        let cancel = AtomicBool::new(false);
        let complete = sweep_complete(&index, &NoProgress, &cancel).unwrap();
        let options = SampleOptions { samples_per_creature: samples, seed };
        let sampled = sweep_sampled(&index, options, &NoProgress, &cancel).unwrap();

        let all: BTreeSet<_> = complete.puzzles.iter().collect();
        prop_assert!(sampled.puzzles.iter().all(|p| all.contains(p)));
        prop_assert!(sampled.stats.combinations_checked <= complete.stats.combinations_checked);
    }
}
