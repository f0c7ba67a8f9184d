//! Reference data model: creatures, moves, version groups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Stable identifier of a creature (species or form).
pub type CreatureId = u32;

/// Stable identifier of a move.
pub type MoveId = u32;

/// Stable identifier of a version group.
pub type VersionGroupId = u32;

/// Highest generation the ruleset knows about.
pub const MAX_GENERATION: u8 = 9;

/// An inclusive generation cutoff in `1..=MAX_GENERATION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Generation(u8);

impl Generation {
    /// The first generation.
    pub const FIRST: Self = Self(1);

    /// The latest generation.
    pub const LATEST: Self = Self(MAX_GENERATION);

    /// Validate a raw generation number.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::OutOfRange`] outside `1..=MAX_GENERATION`.
    pub fn new(value: u8) -> Result<Self, GenerationError> {
        if (1..=MAX_GENERATION).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GenerationError::OutOfRange(value))
        }
    }

    /// The raw generation number.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Every generation, oldest first.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=MAX_GENERATION).map(Self)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Generation {
    type Error = GenerationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Generation> for u8 {
    fn from(g: Generation) -> Self {
        g.0
    }
}

impl FromStr for Generation {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| GenerationError::Malformed(s.to_string()))?;
        Self::new(value)
    }
}

/// A species or form entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    /// Stable identifier.
    pub id: CreatureId,
    /// Form name, e.g. `pikachu-original-cap`. Cosmetic forms are matched on this.
    pub name: String,
    /// Species name shared by all forms of the species.
    pub species: String,
    /// National dex number.
    pub dex_number: u32,
    /// Generation the creature was introduced in.
    pub generation: Generation,
    /// Elemental types, primary first.
    pub types: Vec<String>,
}

/// An attack a creature can learn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Stable identifier.
    pub id: MoveId,
    /// Move name.
    pub name: String,
    /// Elemental type.
    #[serde(rename = "type")]
    pub element: String,
    /// Base power, absent for status moves.
    #[serde(default)]
    pub power: Option<u16>,
    /// Accuracy percentage, absent for moves that never miss.
    #[serde(default)]
    pub accuracy: Option<u8>,
    /// Power points.
    #[serde(default)]
    pub pp: Option<u8>,
    /// Generation the move was introduced in.
    pub generation: Generation,
}

/// A game release whose learnability rules may differ from its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionGroup {
    /// Stable identifier.
    pub id: VersionGroupId,
    /// Release name, e.g. `red-blue`.
    pub name: String,
    /// Generation the release belongs to.
    pub generation: Generation,
}

/// One step backwards along an evolution edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predecessor {
    /// The earlier evolutionary stage.
    pub id: CreatureId,
    /// Its form name, used for cosmetic-form matching.
    pub name: String,
}

/// Row of the grouped "who learns these moves" aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatureMatch {
    /// The matching creature.
    pub creature_id: CreatureId,
    /// How many distinct requested moves it can learn.
    pub match_count: usize,
}

/// Name fragments that mark a form as cosmetic.
const DEFAULT_COSMETIC_FRAGMENTS: &[&str] = &[
    "-cap",
    "-cosplay",
    "-rock-star",
    "-belle",
    "-pop-star",
    "-phd",
    "-libre",
    "-totem",
    "-starter",
    "-gmax",
];

/// Decides which forms are cosmetic-only variants.
///
/// Cosmetic forms are never puzzle targets and never count as another owner
/// of a move combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosmeticFilter {
    fragments: Vec<String>,
}

impl CosmeticFilter {
    /// A filter matching any name that contains one of `fragments`.
    #[must_use]
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }

    /// A filter that treats nothing as cosmetic.
    #[must_use]
    pub fn none() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// Whether the form named `name` is cosmetic.
    #[must_use]
    pub fn is_cosmetic(&self, name: &str) -> bool {
        self.fragments.iter().any(|frag| name.contains(frag.as_str()))
    }

    /// The configured fragments.
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

impl Default for CosmeticFilter {
    fn default() -> Self {
        Self::new(DEFAULT_COSMETIC_FRAGMENTS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_bounds() {
        assert!(Generation::new(0).is_err());
        assert!(Generation::new(1).is_ok());
        assert!(Generation::new(9).is_ok());
        assert_eq!(Generation::new(10), Err(GenerationError::OutOfRange(10)));
    }

    #[test]
    fn test_generation_parse() {
        assert_eq!("3".parse::<Generation>().unwrap().get(), 3);
        assert_eq!(" 7 ".parse::<Generation>().unwrap().get(), 7);
        assert!(matches!(
            "three".parse::<Generation>(),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            "42".parse::<Generation>(),
            Err(GenerationError::OutOfRange(42))
        ));
    }

    #[test]
    fn test_generation_serde_validates() {
        let g: Generation = serde_json::from_str("4").unwrap();
        assert_eq!(g.get(), 4);
        assert!(serde_json::from_str::<Generation>("0").is_err());
    }

    #[test]
    fn test_all_generations() {
        let all: Vec<u8> = Generation::all().map(Generation::get).collect();
        assert_eq!(all, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_default_cosmetic_filter() {
        let filter = CosmeticFilter::default();
        assert!(filter.is_cosmetic("pikachu-original-cap"));
        assert!(filter.is_cosmetic("pikachu-rock-star"));
        assert!(filter.is_cosmetic("raticate-totem-alola"));
        assert!(filter.is_cosmetic("eevee-starter"));
        assert!(!filter.is_cosmetic("pikachu"));
        assert!(!filter.is_cosmetic("raticate-alola"));
    }

    #[test]
    fn test_none_filter() {
        assert!(!CosmeticFilter::none().is_cosmetic("pikachu-original-cap"));
    }
}
