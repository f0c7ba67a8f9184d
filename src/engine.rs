//! Moveset-uniqueness puzzle engine.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────┐   ┌────────────────────────────┐
//! │ Selector (online, 10×) │   │ Sweep (offline, rayon)     │
//! ├────────────────────────┤   ├────────────────────────────┤
//! │ AggregateCheck         │   │ MoveSetIndex               │
//! ├────────────────────────┴───┴────────────────────────────┤
//! │            UniquenessCheck (shared contract)            │
//! ├─────────────────────────────────────────────────────────┤
//! │                  LearnabilityResolver                   │
//! ├─────────────────────────────────────────────────────────┤
//! │                       DexSource                         │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod learnability;
mod sample;
mod selector;
mod sweep;
mod uniqueness;

pub use learnability::{LearnabilityResolver, effective_moves};
pub use sample::{sample_array, sample_without_replacement};
pub use selector::{MAX_SELECT_ATTEMPTS, SelectError, Selection, select_round};
pub use sweep::{
    LogObserver, NoProgress, SampleOptions, SweepError, SweepMode, SweepObserver, SweepOutcome,
    SweepSnapshot, SweepStats, sweep_complete, sweep_sampled,
};
pub use uniqueness::{AggregateCheck, IndexEntry, MoveSetIndex, UniquenessCheck};

use serde::{Deserialize, Serialize};

use crate::dex::{CreatureId, Generation, MoveId};

/// Number of moves shown in a puzzle.
pub const PUZZLE_SIZE: usize = 4;

/// A move combination owned by exactly one creature under a generation cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Puzzle {
    /// The only creature that can learn all of `moves`.
    pub owner: CreatureId,
    /// The moves, ascending.
    pub moves: [MoveId; PUZZLE_SIZE],
    /// Generation cutoff the puzzle was computed for.
    pub generation: Generation,
}

impl Puzzle {
    /// Create a puzzle, normalising the move order.
    #[must_use]
    pub fn new(
        owner: CreatureId,
        mut moves: [MoveId; PUZZLE_SIZE],
        generation: Generation,
    ) -> Self {
        moves.sort_unstable();
        Self {
            owner,
            moves,
            generation,
        }
    }
}
