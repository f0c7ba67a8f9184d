//! CLI command implementations for Movedex.

pub(crate) mod enumerate;
pub(crate) mod round;
pub(crate) mod seed;
pub(crate) mod verify;

mod output;

use clap::ValueEnum;
use movedex::config::{EngineConfig, default_data_dir};
use movedex::dex::{Generation, MemoryDex, open_seeded};
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output format for round commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Sweep flavour for the `enumerate` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum EnumerateMode {
    /// Random sample of combinations per creature.
    Fast,
    /// Every combination of every creature.
    Complete,
}

/// Uniqueness backend for the `verify` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Backend {
    /// In-memory move-set index.
    Index,
    /// One grouped query per puzzle.
    Aggregate,
}

/// Hint kind for the `hint` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum HintArg {
    /// Generation of introduction.
    Generation,
    /// Elemental types.
    Type,
}

impl From<HintArg> for movedex::round::HintKind {
    fn from(arg: HintArg) -> Self {
        match arg {
            HintArg::Generation => Self::Generation,
            HintArg::Type => Self::Type,
        }
    }
}

/// A single generation or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GenerationSelection {
    /// Every generation in order.
    All,
    /// One generation.
    One(Generation),
}

impl GenerationSelection {
    /// Generations selected, ascending.
    pub(crate) fn generations(self) -> Vec<Generation> {
        match self {
            Self::All => Generation::all().collect(),
            Self::One(g) => vec![g],
        }
    }
}

impl FromStr for GenerationSelection {
    type Err = movedex::error::GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::One)
        }
    }
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<movedex::DexError> for CliError {
    fn from(e: movedex::DexError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<movedex::CatalogError> for CliError {
    fn from(e: movedex::CatalogError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<movedex::RoundError> for CliError {
    fn from(e: movedex::RoundError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<movedex::engine::SweepError> for CliError {
    fn from(e: movedex::engine::SweepError) -> Self {
        Self::new(e.to_string())
    }
}

/// The `--data-dir` override, or `~/.movedex`.
pub(crate) fn resolve_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match data_dir {
        Some(dir) => Ok(dir),
        None => default_data_dir()
            .map_err(|e| CliError::new(format!("Failed to locate data directory: {e}"))),
    }
}

/// Load config and the seeded dataset from `data_dir`.
pub(crate) fn open_dex(data_dir: &Path) -> Result<(MemoryDex, EngineConfig), CliError> {
    let config = EngineConfig::load_or_default(data_dir)?;
    let (dataset, marker) = open_seeded(data_dir).map_err(|e| {
        CliError::new(format!(
            "Failed to open reference data in {}: {e}",
            data_dir.display()
        ))
    })?;
    log::debug!(
        "opened dataset seeded from {} ({} creatures)",
        marker.source,
        marker.creatures
    );
    let dex = MemoryDex::from_dataset(dataset)?;
    Ok((dex, config))
}
