//! Reference data layer.
//!
//! The engine only talks to reference data through [`DexSource`]. This module
//! provides the model types, an in-memory source backed by a JSON snapshot,
//! and the persisted seed marker that guards re-seeding.
//!
//! ```text
//! ┌──────────────┐   load    ┌───────────┐   DexSource   ┌────────┐
//! │ dataset.json │ ────────▶ │ MemoryDex │ ────────────▶ │ engine │
//! └──────────────┘           └───────────┘               └────────┘
//! ```

mod dataset;
mod memory;
mod model;
mod seed;

pub use dataset::{Dataset, EvolutionEdge, LearnRecord};
pub use memory::{DexBuilder, MemoryDex};
pub use model::{
    CosmeticFilter, Creature, CreatureId, CreatureMatch, Generation, MAX_GENERATION, Move, MoveId,
    Predecessor, VersionGroup, VersionGroupId,
};
pub use seed::{SeedMarker, dataset_path, is_seeded, marker_path, open_seeded, reset, seed};

use crate::error::DexError;

/// Read-only access to the reference dataset.
///
/// Implementations must be shareable across threads: the sweep resolves
/// move sets in parallel.
pub trait DexSource: Sync {
    /// All creatures introduced in `max` or earlier, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn creatures_up_to(&self, max: Generation) -> Result<Vec<Creature>, DexError>;

    /// Look up a single creature.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownCreature`] if no such creature exists.
    fn creature_by_id(&self, id: CreatureId) -> Result<Creature, DexError>;

    /// Look up a single move.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownMove`] if no such move exists.
    fn move_by_id(&self, id: MoveId) -> Result<Move, DexError>;

    /// Direct pre-evolutions of `id` (one edge backwards).
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn evolution_predecessors(&self, id: CreatureId) -> Result<Vec<Predecessor>, DexError>;

    /// Version groups belonging to `max` or an earlier generation.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn version_groups_up_to(&self, max: Generation) -> Result<Vec<VersionGroupId>, DexError>;

    /// Distinct moves any of `creatures` can learn in any of `version_groups`, ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn learnable_moves(
        &self,
        creatures: &[CreatureId],
        version_groups: &[VersionGroupId],
    ) -> Result<Vec<MoveId>, DexError>;

    /// Grouped aggregate: for every non-cosmetic creature introduced in `max` or
    /// earlier, count how many of `moves` it can learn in `version_groups`,
    /// directly or through its non-cosmetic pre-evolution lineage.
    ///
    /// Creatures matching none of the moves are omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn count_creatures_learning_all(
        &self,
        moves: &[MoveId],
        version_groups: &[VersionGroupId],
        max: Generation,
        filter: &CosmeticFilter,
    ) -> Result<Vec<CreatureMatch>, DexError>;
}
