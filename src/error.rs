//! Error types shared across the reference-data layer and the engine.

use std::fmt;
use std::io;

use crate::dex::{CreatureId, MoveId};

/// Errors raised by a [`DexSource`](crate::dex::DexSource) or while loading reference data.
#[derive(Debug)]
pub enum DexError {
    /// No creature with this identifier exists.
    UnknownCreature(CreatureId),
    /// No move with this identifier exists.
    UnknownMove(MoveId),
    /// A dataset file could not be read or written.
    Io(io::Error),
    /// A dataset file was not valid JSON for the expected shape.
    Parse(serde_json::Error),
    /// The dataset references an entity that it does not define.
    DanglingReference(String),
    /// Reference data is already seeded; an explicit reset is required first.
    AlreadySeeded,
    /// Reference data has not been seeded yet.
    NotSeeded,
    /// A generation value in the dataset is invalid.
    InvalidGeneration(GenerationError),
}

impl fmt::Display for DexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCreature(id) => write!(f, "unknown creature id {id}"),
            Self::UnknownMove(id) => write!(f, "unknown move id {id}"),
            Self::Io(e) => write!(f, "dataset I/O error: {e}"),
            Self::Parse(e) => write!(f, "dataset parse error: {e}"),
            Self::DanglingReference(what) => write!(f, "dataset references missing {what}"),
            Self::AlreadySeeded => {
                write!(f, "reference data already seeded (run `reset` first)")
            }
            Self::NotSeeded => write!(f, "reference data not seeded (run `seed` first)"),
            Self::InvalidGeneration(e) => write!(f, "invalid dataset: {e}"),
        }
    }
}

impl std::error::Error for DexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::InvalidGeneration(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DexError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for DexError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<GenerationError> for DexError {
    fn from(e: GenerationError) -> Self {
        Self::InvalidGeneration(e)
    }
}

/// A generation value that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Parsed, but outside `1..=MAX_GENERATION`.
    OutOfRange(u8),
    /// Not a number at all.
    Malformed(String),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(g) => write!(
                f,
                "generation {g} out of range (expected 1..={})",
                crate::dex::MAX_GENERATION
            ),
            Self::Malformed(s) => write!(f, "malformed generation: {s:?}"),
        }
    }
}

impl std::error::Error for GenerationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(DexError::UnknownCreature(7).to_string(), "unknown creature id 7");
        assert!(GenerationError::OutOfRange(12).to_string().contains("1..=9"));
        assert!(GenerationError::Malformed("x".into()).to_string().contains("\"x\""));
    }

    #[test]
    fn test_io_source_is_preserved() {
        use std::error::Error;
        let err = DexError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
    }
}
