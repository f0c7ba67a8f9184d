//! Generation-scoped move learnability with pre-evolution inheritance.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;

use crate::dex::{CosmeticFilter, CreatureId, DexSource, Generation, MoveId, VersionGroupId};
use crate::error::DexError;

/// Resolves effective move sets for one generation cutoff.
///
/// The version-group set for the cutoff is fetched once at construction and
/// reused for every creature.
pub struct LearnabilityResolver<'a, S: DexSource + ?Sized> {
    source: &'a S,
    filter: &'a CosmeticFilter,
    generation: Generation,
    version_groups: Vec<VersionGroupId>,
}

impl<S: DexSource + ?Sized> fmt::Debug for LearnabilityResolver<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LearnabilityResolver")
            .field("generation", &self.generation)
            .field("version_groups", &self.version_groups)
            .finish_non_exhaustive()
    }
}

impl<'a, S: DexSource + ?Sized> LearnabilityResolver<'a, S> {
    /// Prepare a resolver for `generation`.
    ///
    /// # Errors
    ///
    /// Returns an error if the version groups cannot be read.
    pub fn new(
        source: &'a S,
        filter: &'a CosmeticFilter,
        generation: Generation,
    ) -> Result<Self, DexError> {
        let version_groups = source.version_groups_up_to(generation)?;
        Ok(Self {
            source,
            filter,
            generation,
            version_groups,
        })
    }

    /// The cutoff this resolver was built for.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Version groups inside the cutoff.
    #[must_use]
    pub fn version_groups(&self) -> &[VersionGroupId] {
        &self.version_groups
    }

    /// `creature` followed by every pre-evolution reachable without passing
    /// through a cosmetic form, breadth-first, each at most once.
    ///
    /// # Errors
    ///
    /// Returns an error if evolution data cannot be read.
    pub fn lineage(&self, creature: CreatureId) -> Result<Vec<CreatureId>, DexError> {
        let mut visited = HashSet::from([creature]);
        let mut lineage = vec![creature];
        let mut queue = VecDeque::from([creature]);

        while let Some(current) = queue.pop_front() {
            for pred in self.source.evolution_predecessors(current)? {
                if self.filter.is_cosmetic(&pred.name) {
                    continue;
                }
                if visited.insert(pred.id) {
                    lineage.push(pred.id);
                    queue.push_back(pred.id);
                }
            }
        }

        Ok(lineage)
    }

    /// Every move `creature` or its lineage can learn within the cutoff.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownCreature`] for an unknown id, or any
    /// read error from the source.
    pub fn effective_moves(&self, creature: CreatureId) -> Result<BTreeSet<MoveId>, DexError> {
        self.source.creature_by_id(creature)?;
        let lineage = self.lineage(creature)?;
        let moves = self
            .source
            .learnable_moves(&lineage, &self.version_groups)?;
        Ok(moves.into_iter().collect())
    }
}

/// One-shot form of [`LearnabilityResolver::effective_moves`].
///
/// # Errors
///
/// Returns [`DexError::UnknownCreature`] for an unknown id, or any read
/// error from the source.
pub fn effective_moves<S: DexSource + ?Sized>(
    source: &S,
    filter: &CosmeticFilter,
    creature: CreatureId,
    generation: Generation,
) -> Result<BTreeSet<MoveId>, DexError> {
    LearnabilityResolver::new(source, filter, generation)?.effective_moves(creature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::DexBuilder;

    fn cutoff(g: u8) -> Generation {
        Generation::new(g).unwrap()
    }

    #[test]
    fn test_inherits_from_pre_evolution() {
        let dex = DexBuilder::new()
            .version_group(1, 1)
            .creature(1, "pre", 1)
            .creature(2, "evolved", 1)
            .evolves(1, 2)
            .learns(1, &[9], 1)
            .learns(2, &[1, 2], 1)
            .build()
            .unwrap();
        let filter = CosmeticFilter::default();

        let moves = effective_moves(&dex, &filter, 2, cutoff(1)).unwrap();
        assert_eq!(moves, BTreeSet::from([1, 2, 9]));
        // Inheritance only flows forward.
        let moves = effective_moves(&dex, &filter, 1, cutoff(1)).unwrap();
        assert_eq!(moves, BTreeSet::from([9]));
    }

    #[test]
    fn test_version_groups_gate_moves() {
        let dex = DexBuilder::new()
            .version_group(1, 1)
            .version_group(2, 3)
            .creature(1, "a", 1)
            .learns(1, &[1], 1)
            .learns(1, &[2], 2)
            .build()
            .unwrap();
        let filter = CosmeticFilter::default();

        assert_eq!(
            effective_moves(&dex, &filter, 1, cutoff(2)).unwrap(),
            BTreeSet::from([1])
        );
        assert_eq!(
            effective_moves(&dex, &filter, 1, cutoff(3)).unwrap(),
            BTreeSet::from([1, 2])
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let dex = DexBuilder::new()
            .version_group(1, 1)
            .creature(1, "a", 1)
            .creature(2, "b", 1)
            .creature(3, "c", 1)
            .evolves(1, 2)
            .evolves(2, 3)
            .evolves(3, 1)
            .learns(1, &[1], 1)
            .learns(2, &[2], 1)
            .learns(3, &[3], 1)
            .build()
            .unwrap();
        let filter = CosmeticFilter::default();
        let resolver = LearnabilityResolver::new(&dex, &filter, cutoff(1)).unwrap();

        assert_eq!(resolver.lineage(3).unwrap(), vec![3, 2, 1]);
        assert_eq!(resolver.effective_moves(3).unwrap(), BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_diamond_counts_ancestor_once() {
        // 1 -> 2 -> 4 and 1 -> 3 -> 4
        let dex = DexBuilder::new()
            .version_group(1, 1)
            .creature(1, "root", 1)
            .creature(2, "left", 1)
            .creature(3, "right", 1)
            .creature(4, "tip", 1)
            .evolves(1, 2)
            .evolves(1, 3)
            .evolves(2, 4)
            .evolves(3, 4)
            .build()
            .unwrap();
        let filter = CosmeticFilter::default();
        let resolver = LearnabilityResolver::new(&dex, &filter, cutoff(1)).unwrap();

        let lineage = resolver.lineage(4).unwrap();
        assert_eq!(lineage, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_walk_stops_at_cosmetic_form() {
        // 1 -> 2 (cosmetic) -> 3
        let dex = DexBuilder::new()
            .version_group(1, 1)
            .creature(1, "base", 1)
            .creature(2, "pikachu-original-cap", 1)
            .creature(3, "top", 1)
            .evolves(1, 2)
            .evolves(2, 3)
            .learns(1, &[1], 1)
            .learns(2, &[2], 1)
            .learns(3, &[3], 1)
            .build()
            .unwrap();
        let filter = CosmeticFilter::default();
        let resolver = LearnabilityResolver::new(&dex, &filter, cutoff(1)).unwrap();

        assert_eq!(resolver.lineage(3).unwrap(), vec![3]);
        assert_eq!(resolver.effective_moves(3).unwrap(), BTreeSet::from([3]));
    }

    #[test]
    fn test_unknown_creature() {
        let dex = DexBuilder::new().version_group(1, 1).build().unwrap();
        let result = effective_moves(&dex, &CosmeticFilter::default(), 42, cutoff(1));
        assert!(matches!(result, Err(DexError::UnknownCreature(42))));
    }
}
