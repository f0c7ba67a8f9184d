//! Stateless round service: start, answer, hint.
//!
//! All round state travels in the [`RoundToken`]; nothing is stored between
//! calls.

mod token;

pub use token::{MAX_TOKEN_LEN, RoundToken, TokenError};

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::dex::{CosmeticFilter, Creature, CreatureId, DexSource, Generation, Move, MoveId};
use crate::engine::{Puzzle, SelectError, select_round};
use crate::error::DexError;

/// Attempts allowed per round.
pub const MAX_ATTEMPTS: u8 = 3;

/// Points for a correct first attempt; each later attempt is worth one less.
pub const BASE_POINTS: u32 = 5;

/// Errors from the round service.
#[derive(Debug)]
pub enum RoundError {
    /// Attempt number outside `1..=3`.
    InvalidAttempt(u8),
    /// The selector gave up; retry the whole round start.
    NoUniquePuzzle {
        /// Attempts made.
        attempts: usize,
    },
    /// The token could not be decoded.
    Token(TokenError),
    /// Reference data lookup failed.
    Dex(DexError),
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAttempt(n) => {
                write!(f, "attempt must be between 1 and {MAX_ATTEMPTS}, got {n}")
            }
            Self::NoUniquePuzzle { attempts } => {
                write!(f, "no unique puzzle found after {attempts} attempts, try again")
            }
            Self::Token(e) => write!(f, "{e}"),
            Self::Dex(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RoundError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Token(e) => Some(e),
            Self::Dex(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TokenError> for RoundError {
    fn from(e: TokenError) -> Self {
        Self::Token(e)
    }
}

impl From<DexError> for RoundError {
    fn from(e: DexError) -> Self {
        Self::Dex(e)
    }
}

impl From<SelectError> for RoundError {
    fn from(e: SelectError) -> Self {
        match e {
            SelectError::NoUniquePuzzle { attempts } => Self::NoUniquePuzzle { attempts },
            SelectError::Dex(e) => Self::Dex(e),
        }
    }
}

/// A freshly started round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundStart {
    /// Opaque token to send back with answers and hint requests.
    pub token: String,
    /// The 4 moves shown to the player.
    pub moves: Vec<Move>,
    /// Cutoff of the round.
    pub generation: Generation,
}

/// Result of one guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    /// Whether the guess named the owner.
    pub correct: bool,
    /// Points earned by this guess.
    pub points: u32,
    /// The owner, once the round is over.
    pub reveal: Option<Creature>,
}

/// What a hint reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    /// Generation of introduction.
    Generation,
    /// Elemental types.
    Type,
}

/// Points for a correct answer on `attempt` after `hints_used` hints.
///
/// # Errors
///
/// Returns [`RoundError::InvalidAttempt`] unless `attempt` is in `1..=3`.
pub fn score(attempt: u8, hints_used: u32) -> Result<u32, RoundError> {
    if !(1..=MAX_ATTEMPTS).contains(&attempt) {
        return Err(RoundError::InvalidAttempt(attempt));
    }
    let base = BASE_POINTS - u32::from(attempt - 1);
    Ok(base.saturating_sub(hints_used))
}

/// Round service over a reference data source.
pub struct Game<'a, S: DexSource + ?Sized> {
    source: &'a S,
    filter: CosmeticFilter,
    max_attempts: usize,
    catalogs: HashMap<Generation, Catalog>,
}

impl<S: DexSource + ?Sized> fmt::Debug for Game<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("max_attempts", &self.max_attempts)
            .field("catalogs", &self.catalogs.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<'a, S: DexSource + ?Sized> Game<'a, S> {
    /// Create a service using `config` for the filter and attempt bound.
    #[must_use]
    pub fn new(source: &'a S, config: &EngineConfig) -> Self {
        Self {
            source,
            filter: config.cosmetic_filter(),
            max_attempts: config.max_select_attempts,
            catalogs: HashMap::new(),
        }
    }

    /// Serve rounds for the catalog's generation from the catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalogs.insert(catalog.generation(), catalog);
        self
    }

    /// Start a round for `generation`.
    ///
    /// Uses an attached catalog when one exists for the generation,
    /// otherwise runs the interactive selector.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::NoUniquePuzzle`] if the selector gives up, or a
    /// data error if move lookups fail.
    pub fn start_round<R: Rng>(
        &self,
        generation: Generation,
        rng: &mut R,
    ) -> Result<RoundStart, RoundError> {
        let puzzle = match self.catalogs.get(&generation).and_then(|c| c.random(rng)) {
            Some(row) => {
                log::debug!("serving {} from catalog", row.creature_name);
                row.puzzle()
            }
            None => {
                select_round(self.source, &self.filter, generation, rng, self.max_attempts)?.puzzle
            }
        };
        self.round_for(&puzzle)
    }

    fn round_for(&self, puzzle: &Puzzle) -> Result<RoundStart, RoundError> {
        let moves = puzzle
            .moves
            .iter()
            .map(|&id: &MoveId| self.source.move_by_id(id))
            .collect::<Result<Vec<_>, _>>()?;
        let token = RoundToken {
            creature_id: puzzle.owner,
            moves: std::array::from_fn(|i| moves[i].name.clone()),
            generation: puzzle.generation,
        };
        Ok(RoundStart {
            token: token.encode()?,
            moves,
            generation: puzzle.generation,
        })
    }

    /// Score a guess.
    ///
    /// The owner is revealed on a correct guess or on the last attempt.
    ///
    /// # Errors
    ///
    /// Returns an error for a bad attempt number, an undecodable token, or an
    /// owner that does not exist.
    pub fn submit_answer(
        &self,
        token: &str,
        guess: CreatureId,
        attempt: u8,
        hints_used: u32,
    ) -> Result<AnswerOutcome, RoundError> {
        let token = RoundToken::decode(token)?;
        let points = score(attempt, hints_used)?;
        let correct = guess == token.creature_id;

        let reveal = if correct || attempt >= MAX_ATTEMPTS {
            Some(self.source.creature_by_id(token.creature_id)?)
        } else {
            None
        };
        Ok(AnswerOutcome {
            correct,
            points: if correct { points } else { 0 },
            reveal,
        })
    }

    /// Describe the owner without naming it.
    ///
    /// # Errors
    ///
    /// Returns an error for an undecodable token or an unknown owner.
    pub fn get_hint(&self, token: &str, kind: HintKind) -> Result<String, RoundError> {
        let token = RoundToken::decode(token)?;
        let creature = self.source.creature_by_id(token.creature_id)?;
        Ok(match kind {
            HintKind::Generation => format!("Introduced in generation {}", creature.generation),
            HintKind::Type => {
                let label = if creature.types.len() > 1 { "Types" } else { "Type" };
                format!("{label}: {}", creature.types.join("/"))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::{DexBuilder, MemoryDex};
    use crate::engine::{MoveSetIndex, NoProgress, sweep_complete};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::atomic::AtomicBool;

    fn dex() -> MemoryDex {
        DexBuilder::new()
            .version_group(1, 1)
            .typed_creature(6, "charizard", 1, &["fire", "flying"])
            .creature(7, "squirtle", 1)
            .learns(6, &[1, 2, 3, 4, 5], 1)
            .learns(7, &[1, 2, 3, 4], 1)
            .build()
            .unwrap()
    }

    fn token_for(owner: CreatureId) -> String {
        RoundToken {
            creature_id: owner,
            moves: ["a", "b", "c", "d"].map(String::from),
            generation: Generation::FIRST,
        }
        .encode()
        .unwrap()
    }

    #[test]
    fn test_scoring() {
        assert_eq!(score(1, 0).unwrap(), 5);
        assert_eq!(score(2, 1).unwrap(), 3);
        assert_eq!(score(3, 5).unwrap(), 0);
        assert!(matches!(score(0, 0), Err(RoundError::InvalidAttempt(0))));
        assert!(matches!(score(4, 0), Err(RoundError::InvalidAttempt(4))));
    }

    #[test]
    fn test_start_round_with_selector() {
        let dex = dex();
        let game = Game::new(&dex, &EngineConfig::default());
        let mut rng = SmallRng::seed_from_u64(3);

        // Only charizard owns unique combinations; squirtle's single set is shared.
        let round = loop {
            match game.start_round(Generation::FIRST, &mut rng) {
                Ok(round) => break round,
                Err(RoundError::NoUniquePuzzle { attempts }) => assert_eq!(attempts, 10),
                Err(e) => panic!("unexpected error: {e}"),
            }
        };
        let token = RoundToken::decode(&round.token).unwrap();
        assert_eq!(token.creature_id, 6);
        assert_eq!(round.moves.len(), 4);
        assert!(round.moves.iter().any(|m| m.id == 5));
        assert_eq!(token.moves[0], round.moves[0].name);
    }

    #[test]
    fn test_start_round_from_catalog() {
        let dex = dex();
        let filter = CosmeticFilter::default();
        let index = MoveSetIndex::build(&dex, &filter, Generation::FIRST).unwrap();
        let outcome = sweep_complete(&index, &NoProgress, &AtomicBool::new(false)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        crate::catalog::write_catalog(dir.path(), &outcome, &index).unwrap();
        let catalog = crate::catalog::load_catalog(dir.path(), Generation::FIRST).unwrap();

        let game = Game::new(&dex, &EngineConfig::default()).with_catalog(catalog);
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..10 {
            let round = game.start_round(Generation::FIRST, &mut rng).unwrap();
            let ids: Vec<MoveId> = round.moves.iter().map(|m| m.id).collect();
            assert!(index.owners(&ids) == vec![6]);
        }
    }

    #[test]
    fn test_answers_and_reveal() {
        let dex = dex();
        let game = Game::new(&dex, &EngineConfig::default());
        let token = token_for(6);

        let right = game.submit_answer(&token, 6, 2, 1).unwrap();
        assert!(right.correct);
        assert_eq!(right.points, 3);
        assert_eq!(right.reveal.map(|c| c.id), Some(6));

        let wrong = game.submit_answer(&token, 7, 1, 0).unwrap();
        assert!(!wrong.correct);
        assert_eq!(wrong.points, 0);
        assert!(wrong.reveal.is_none());

        let last = game.submit_answer(&token, 7, 3, 0).unwrap();
        assert_eq!(last.reveal.map(|c| c.name), Some("charizard".to_string()));

        assert!(matches!(
            game.submit_answer(&token, 6, 4, 0),
            Err(RoundError::InvalidAttempt(4))
        ));
        assert!(matches!(
            game.submit_answer("not a token", 6, 1, 0),
            Err(RoundError::Token(_))
        ));
    }

    #[test]
    fn test_hints_do_not_name_owner() {
        let dex = dex();
        let game = Game::new(&dex, &EngineConfig::default());
        let token = token_for(6);

        let generation = game.get_hint(&token, HintKind::Generation).unwrap();
        assert_eq!(generation, "Introduced in generation 1");
        let types = game.get_hint(&token, HintKind::Type).unwrap();
        assert_eq!(types, "Types: fire/flying");
        assert!(!types.contains("charizard"));

        assert!(matches!(
            game.get_hint(&token_for(99), HintKind::Type),
            Err(RoundError::Dex(DexError::UnknownCreature(99)))
        ));
    }
}
