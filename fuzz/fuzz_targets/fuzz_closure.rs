#![no_main]

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use movedex::dex::{CosmeticFilter, DexBuilder, Generation};
use movedex::engine::{AggregateCheck, LearnabilityResolver, MoveSetIndex, UniquenessCheck};

/// Structured input: an arbitrary evolution graph over a few creatures.
#[derive(Arbitrary, Debug)]
struct GraphInput {
    /// Creature count (capped).
    creatures: u8,
    /// Which creatures are cosmetic forms.
    cosmetic_mask: u16,
    /// Evolution edges as (from, to) indices.
    edges: Vec<(u8, u8)>,
    /// Learn records as (creature, move, generation).
    learns: Vec<(u8, u8, u8)>,
    /// Candidate move set for the uniqueness check.
    probe: [u8; 4],
    /// Generation cutoff.
    cutoff: u8,
}

fuzz_target!(|input: GraphInput| {
    let n = u32::from(input.creatures % 12) + 1;
    let mut b = DexBuilder::new()
        .version_group(1, 1)
        .version_group(2, 2)
        .version_group(3, 3);
    for id in 1..=n {
        let name = if input.cosmetic_mask & (1 << (id - 1)) != 0 {
            format!("c{id}-gmax")
        } else {
            format!("c{id}")
        };
        b = b.creature(id, &name, 1 + (id % 3) as u8);
    }
    for &(from, to) in input.edges.iter().take(64) {
        b = b.evolves(u32::from(from) % n + 1, u32::from(to) % n + 1);
    }
    for &(c, m, g) in input.learns.iter().take(256) {
        b = b.learns(u32::from(c) % n + 1, &[u32::from(m % 16)], u32::from(g % 3) + 1);
    }
    let Ok(dex) = b.build() else { return };

    let filter = CosmeticFilter::default();
    let cutoff = Generation::new(input.cutoff % 3 + 1).expect("in range");
    let resolver = LearnabilityResolver::new(&dex, &filter, cutoff).expect("resolver");
    for id in 1..=n {
        let lineage = resolver.lineage(id).expect("lineage");
        let distinct: BTreeSet<_> = lineage.iter().collect();
        assert_eq!(distinct.len(), lineage.len(), "ancestor visited twice");
    }

    let index = MoveSetIndex::build(&dex, &filter, cutoff).expect("index");
    let aggregate = AggregateCheck::new(&dex, &filter, cutoff).expect("aggregate");
    let probe: Vec<u32> = input.probe.iter().map(|&m| u32::from(m % 16)).collect();
    assert_eq!(index.owners(&probe), aggregate.owners(&probe).expect("aggregate owners"));
});
