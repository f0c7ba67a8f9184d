//! Interactive puzzle selection with a bounded number of attempts.

use std::fmt;

use rand::Rng;

use super::learnability::LearnabilityResolver;
use super::sample::sample_array;
use super::uniqueness::{AggregateCheck, UniquenessCheck};
use super::{PUZZLE_SIZE, Puzzle};
use crate::dex::{CosmeticFilter, Creature, DexSource, Generation, MoveId};
use crate::error::DexError;

/// Attempts the selector makes before giving up.
pub const MAX_SELECT_ATTEMPTS: usize = 10;

/// A selected puzzle and how many attempts it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// The unique combination and its owner.
    pub puzzle: Puzzle,
    /// 1-based attempt that produced it.
    pub attempts: usize,
}

/// Why no puzzle was selected.
#[derive(Debug)]
pub enum SelectError {
    /// Every attempt failed; the caller may retry the whole operation.
    NoUniquePuzzle {
        /// Attempts made.
        attempts: usize,
    },
    /// Reading reference data failed.
    Dex(DexError),
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoUniquePuzzle { attempts } => {
                write!(f, "no unique puzzle found after {attempts} attempts")
            }
            Self::Dex(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SelectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dex(e) => Some(e),
            Self::NoUniquePuzzle { .. } => None,
        }
    }
}

impl From<DexError> for SelectError {
    fn from(e: DexError) -> Self {
        Self::Dex(e)
    }
}

/// Draw random creatures until one yields a unique 4-move combination.
///
/// Each attempt picks a non-cosmetic creature introduced in `generation` or
/// earlier, samples 4 of its effective moves and checks them with a grouped
/// query. Creatures with fewer than 4 moves just burn the attempt.
///
/// # Errors
///
/// Returns [`SelectError::NoUniquePuzzle`] once `max_attempts` attempts have
/// failed, or [`SelectError::Dex`] if the source cannot be read.
pub fn select_round<S, R>(
    source: &S,
    filter: &CosmeticFilter,
    generation: Generation,
    rng: &mut R,
    max_attempts: usize,
) -> Result<Selection, SelectError>
where
    S: DexSource + ?Sized,
    R: Rng,
{
    let candidates: Vec<Creature> = source
        .creatures_up_to(generation)?
        .into_iter()
        .filter(|c| !filter.is_cosmetic(&c.name))
        .collect();
    let resolver = LearnabilityResolver::new(source, filter, generation)?;
    let checker = AggregateCheck::new(source, filter, generation)?;

    for attempt in 1..=max_attempts {
        if candidates.is_empty() {
            log::debug!("attempt {attempt}: no creatures up to generation {generation}");
            continue;
        }
        let creature = &candidates[rng.gen_range(0..candidates.len())];
        let moves: Vec<MoveId> = resolver.effective_moves(creature.id)?.into_iter().collect();

        let Some(picked) = sample_array::<MoveId, PUZZLE_SIZE, R>(&moves, rng) else {
            log::debug!(
                "attempt {attempt}: {} knows only {} moves",
                creature.name,
                moves.len()
            );
            continue;
        };

        if checker.is_unique(&picked, creature.id)? {
            log::debug!("attempt {attempt}: {} {picked:?} is unique", creature.name);
            return Ok(Selection {
                puzzle: Puzzle::new(creature.id, picked, generation),
                attempts: attempt,
            });
        }
        log::debug!("attempt {attempt}: {} {picked:?} is shared", creature.name);
    }

    Err(SelectError::NoUniquePuzzle {
        attempts: max_attempts,
    })
}
