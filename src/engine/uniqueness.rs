//! Uniqueness checking: one contract, two backends.
//!
//! [`MoveSetIndex`] keeps every creature's effective move set in memory and is
//! what the offline sweep uses. [`AggregateCheck`] issues a single grouped
//! query per check and is what the online selector uses.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use rayon::prelude::*;

use super::learnability::LearnabilityResolver;
use crate::dex::{
    CosmeticFilter, Creature, CreatureId, DexSource, Generation, MoveId, VersionGroupId,
};
use crate::error::DexError;

/// Decides whether a move set singles out one creature under a fixed cutoff.
pub trait UniquenessCheck {
    /// The generation cutoff this checker answers for.
    fn generation(&self) -> Generation;

    /// `true` iff no non-cosmetic creature other than `owner` can learn every
    /// move in `moves`. An empty move set is never unique.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing data cannot be read.
    fn is_unique(&self, moves: &[MoveId], owner: CreatureId) -> Result<bool, DexError>;
}

/// Fixed-size set of creature positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CreatureBits {
    words: Vec<u64>,
}

impl CreatureBits {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
        }
    }

    fn insert(&mut self, pos: usize) {
        self.words[pos / 64] |= 1 << (pos % 64);
    }

    /// `out = self ∩ other`
    pub(crate) fn intersect_into(&self, other: &Self, out: &mut Self) {
        for ((o, a), b) in out.words.iter_mut().zip(&self.words).zip(&other.words) {
            *o = a & b;
        }
    }

    pub(crate) fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut w = word;
            std::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let bit = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(i * 64 + bit)
            })
        })
    }
}

/// One creature's row in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// The creature.
    pub creature: Creature,
    /// Its effective moves, ascending.
    pub moves: Vec<MoveId>,
}

/// Every non-cosmetic creature's effective move set for one cutoff, plus an
/// inverted move → creatures index.
///
/// Built once before a sweep and never mutated afterwards, so it can be
/// shared freely across threads.
#[derive(Debug, Clone)]
pub struct MoveSetIndex {
    generation: Generation,
    entries: Vec<IndexEntry>,
    positions: HashMap<CreatureId, usize>,
    holders: HashMap<MoveId, CreatureBits>,
}

impl MoveSetIndex {
    /// Resolve every non-cosmetic creature in the cutoff, in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first read error hit while resolving.
    pub fn build<S: DexSource + ?Sized>(
        source: &S,
        filter: &CosmeticFilter,
        generation: Generation,
    ) -> Result<Self, DexError> {
        let resolver = LearnabilityResolver::new(source, filter, generation)?;
        let creatures: Vec<Creature> = source
            .creatures_up_to(generation)?
            .into_iter()
            .filter(|c| !filter.is_cosmetic(&c.name))
            .collect();

        let entries = creatures
            .into_par_iter()
            .map(|creature| {
                let moves = resolver.effective_moves(creature.id)?;
                Ok(IndexEntry {
                    creature,
                    moves: moves.into_iter().collect(),
                })
            })
            .collect::<Result<Vec<_>, DexError>>()?;

        log::debug!(
            "indexed {} creatures for generation {generation}",
            entries.len()
        );
        Ok(Self::from_entries(generation, entries))
    }

    /// Index precomputed entries. Move lists are sorted and deduplicated.
    #[must_use]
    pub fn from_entries(generation: Generation, mut entries: Vec<IndexEntry>) -> Self {
        entries.sort_by_key(|e| e.creature.id);
        let mut positions = HashMap::with_capacity(entries.len());
        let mut holders: HashMap<MoveId, CreatureBits> = HashMap::new();

        for (pos, entry) in entries.iter_mut().enumerate() {
            entry.moves.sort_unstable();
            entry.moves.dedup();
            positions.insert(entry.creature.id, pos);
        }
        let len = entries.len();
        for (pos, entry) in entries.iter().enumerate() {
            for &m in &entry.moves {
                holders
                    .entry(m)
                    .or_insert_with(|| CreatureBits::new(len))
                    .insert(pos);
            }
        }

        Self {
            generation,
            entries,
            positions,
            holders,
        }
    }

    /// Indexed creatures, ordered by id.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of indexed creatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no creature is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Effective moves of an indexed creature.
    #[must_use]
    pub fn moves_of(&self, creature: CreatureId) -> Option<&[MoveId]> {
        self.positions
            .get(&creature)
            .map(|&pos| self.entries[pos].moves.as_slice())
    }

    /// An indexed creature by id.
    #[must_use]
    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.positions
            .get(&id)
            .map(|&pos| &self.entries[pos].creature)
    }

    pub(crate) fn holders_of(&self, m: MoveId) -> Option<&CreatureBits> {
        self.holders.get(&m)
    }

    /// Creatures able to learn every move in `moves`, ordered by id.
    ///
    /// An empty `moves` matches every indexed creature.
    #[must_use]
    pub fn owners(&self, moves: &[MoveId]) -> Vec<CreatureId> {
        let distinct: BTreeSet<MoveId> = moves.iter().copied().collect();
        let mut acc = CreatureBits::new(self.len());
        for pos in 0..self.len() {
            acc.insert(pos);
        }
        let mut scratch = CreatureBits::new(self.len());
        for m in distinct {
            let Some(bits) = self.holders.get(&m) else {
                return Vec::new();
            };
            acc.intersect_into(bits, &mut scratch);
            std::mem::swap(&mut acc, &mut scratch);
        }
        acc.positions()
            .map(|pos| self.entries[pos].creature.id)
            .collect()
    }
}

impl UniquenessCheck for MoveSetIndex {
    fn generation(&self) -> Generation {
        self.generation
    }

    fn is_unique(&self, moves: &[MoveId], owner: CreatureId) -> Result<bool, DexError> {
        if moves.is_empty() {
            return Ok(false);
        }
        Ok(self.owners(moves).iter().all(|&c| c == owner))
    }
}

/// Uniqueness via one grouped aggregate query per check.
pub struct AggregateCheck<'a, S: DexSource + ?Sized> {
    source: &'a S,
    filter: &'a CosmeticFilter,
    generation: Generation,
    version_groups: Vec<VersionGroupId>,
}

impl<S: DexSource + ?Sized> fmt::Debug for AggregateCheck<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateCheck")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<'a, S: DexSource + ?Sized> AggregateCheck<'a, S> {
    /// Prepare a checker for `generation`.
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

    /// Creatures able to learn every move in `moves`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregate query fails.
    pub fn owners(&self, moves: &[MoveId]) -> Result<Vec<CreatureId>, DexError> {
        let distinct: Vec<MoveId> = moves
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let rows = self.source.count_creatures_learning_all(
            &distinct,
            &self.version_groups,
            self.generation,
            self.filter,
        )?;
        Ok(rows
            .into_iter()
            .filter(|row| row.match_count == distinct.len())
            .map(|row| row.creature_id)
            .collect())
    }
}

impl<S: DexSource + ?Sized> UniquenessCheck for AggregateCheck<'_, S> {
    fn generation(&self) -> Generation {
        self.generation
    }

    fn is_unique(&self, moves: &[MoveId], owner: CreatureId) -> Result<bool, DexError> {
        if moves.is_empty() {
            return Ok(false);
        }
        Ok(self.owners(moves)?.iter().all(|&c| c == owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::{DexBuilder, MemoryDex};

    fn cutoff(g: u8) -> Generation {
        Generation::new(g).unwrap()
    }

    /// A knows {1,2,3,4,5}, B knows {1,2,3,4}, a capped form knows {1,2,3,5}.
    fn scenario() -> MemoryDex {
        DexBuilder::new()
            .version_group(1, 1)
            .creature(1, "alpha", 1)
            .creature(2, "beta", 1)
            .creature(3, "pikachu-original-cap", 1)
            .learns(1, &[1, 2, 3, 4, 5], 1)
            .learns(2, &[1, 2, 3, 4], 1)
            .learns(3, &[1, 2, 3, 5], 1)
            .build()
            .unwrap()
    }

    fn both_backends<'a>(
        dex: &'a MemoryDex,
        filter: &'a CosmeticFilter,
        g: u8,
    ) -> [Box<dyn UniquenessCheck + 'a>; 2] {
        let index = MoveSetIndex::build(dex, filter, cutoff(g)).unwrap();
        let aggregate = AggregateCheck::new(dex, filter, cutoff(g)).unwrap();
        [Box::new(index), Box::new(aggregate)]
    }

    #[test]
    fn test_shared_moves_not_unique() {
        let dex = scenario();
        let filter = CosmeticFilter::default();
        for check in both_backends(&dex, &filter, 1) {
            assert!(!check.is_unique(&[1, 2, 3, 4], 1).unwrap());
            assert!(!check.is_unique(&[1, 2, 3, 4], 2).unwrap());
        }
    }

    #[test]
    fn test_cosmetic_form_does_not_break_uniqueness() {
        let dex = scenario();
        let filter = CosmeticFilter::default();
        for check in both_backends(&dex, &filter, 1) {
            assert!(check.is_unique(&[1, 2, 3, 5], 1).unwrap());
        }
    }

    #[test]
    fn test_without_filter_cosmetic_form_counts() {
        let dex = scenario();
        let filter = CosmeticFilter::none();
        for check in both_backends(&dex, &filter, 1) {
            assert!(!check.is_unique(&[1, 2, 3, 5], 1).unwrap());
        }
    }

    #[test]
    fn test_empty_set_never_unique() {
        let dex = scenario();
        let filter = CosmeticFilter::default();
        for check in both_backends(&dex, &filter, 1) {
            assert!(!check.is_unique(&[], 1).unwrap());
        }
    }

    #[test]
    fn test_generation_cutoff_excludes_later_creatures() {
        let dex = DexBuilder::new()
            .version_group(1, 1)
            .version_group(2, 2)
            .creature(1, "old", 1)
            .creature(2, "new", 2)
            .learns(1, &[1, 2, 3, 4], 1)
            .learns(2, &[1, 2, 3, 4], 2)
            .build()
            .unwrap();
        let filter = CosmeticFilter::default();

        for check in both_backends(&dex, &filter, 1) {
            assert!(check.is_unique(&[1, 2, 3, 4], 1).unwrap());
        }
        for check in both_backends(&dex, &filter, 2) {
            assert!(!check.is_unique(&[1, 2, 3, 4], 1).unwrap());
        }
    }

    #[test]
    fn test_index_owners_and_moves() {
        let dex = scenario();
        let index = MoveSetIndex::build(&dex, &CosmeticFilter::default(), cutoff(1)).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.owners(&[1, 2]), vec![1, 2]);
        assert_eq!(index.owners(&[5]), vec![1]);
        assert!(index.owners(&[99]).is_empty());
        assert_eq!(index.moves_of(2), Some(&[1, 2, 3, 4][..]));
        assert_eq!(index.moves_of(3), None);
    }

    #[test]
    fn test_bits_positions() {
        let mut bits = CreatureBits::new(130);
        for pos in [0, 63, 64, 129] {
            bits.insert(pos);
        }
        assert_eq!(bits.count(), 4);
        assert_eq!(bits.positions().collect::<Vec<_>>(), vec![0, 63, 64, 129]);
    }
}
