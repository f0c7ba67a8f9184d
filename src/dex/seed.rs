//! Persisted "already seeded" marker for the reference dataset.
//!
//! Lifecycle: set once when a dataset is first imported into a data
//! directory, checked before any reseed attempt, cleared only by an explicit
//! [`reset`]. The dataset file is written before the marker, so a marker on
//! disk always refers to a complete dataset.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::dataset::Dataset;
use crate::error::DexError;

const DATASET_FILE: &str = "dataset.json";
const MARKER_FILE: &str = "seeded.json";

/// Contents of the seed marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedMarker {
    /// Unix epoch seconds when the dataset was imported.
    pub seeded_at: u64,
    /// Where the dataset was imported from.
    pub source: String,
    /// Number of creatures imported.
    pub creatures: usize,
    /// Number of moves imported.
    pub moves: usize,
    /// Number of learnability records imported.
    pub learn_records: usize,
}

/// Path of the seeded dataset inside `data_dir`.
#[must_use]
pub fn dataset_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATASET_FILE)
}

/// Path of the seed marker inside `data_dir`.
#[must_use]
pub fn marker_path(data_dir: &Path) -> PathBuf {
    data_dir.join(MARKER_FILE)
}

/// Whether `data_dir` holds a seeded dataset.
#[must_use]
pub fn is_seeded(data_dir: &Path) -> bool {
    marker_path(data_dir).is_file()
}

/// Import `dataset` into `data_dir` and set the marker.
///
/// # Errors
///
/// Returns [`DexError::AlreadySeeded`] if the marker is already set, or an
/// I/O error if writing fails.
pub fn seed(data_dir: &Path, dataset: &Dataset, source: &str) -> Result<SeedMarker, DexError> {
    if is_seeded(data_dir) {
        return Err(DexError::AlreadySeeded);
    }
    fs::create_dir_all(data_dir)?;
    dataset.save(&dataset_path(data_dir))?;

    let marker = SeedMarker {
        seeded_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
        source: source.to_string(),
        creatures: dataset.creatures.len(),
        moves: dataset.moves.len(),
        learn_records: dataset.learnsets.len(),
    };
    fs::write(marker_path(data_dir), serde_json::to_string_pretty(&marker)?)?;
    log::info!(
        "seeded {} creatures, {} moves, {} learn records from {source}",
        marker.creatures,
        marker.moves,
        marker.learn_records
    );
    Ok(marker)
}

/// Load the seeded dataset and its marker.
///
/// # Errors
///
/// Returns [`DexError::NotSeeded`] if the marker is missing.
pub fn open_seeded(data_dir: &Path) -> Result<(Dataset, SeedMarker), DexError> {
    if !is_seeded(data_dir) {
        return Err(DexError::NotSeeded);
    }
    let marker: SeedMarker = serde_json::from_str(&fs::read_to_string(marker_path(data_dir))?)?;
    let dataset = Dataset::load(&dataset_path(data_dir))?;
    Ok((dataset, marker))
}

/// Clear the marker and remove the seeded dataset.
///
/// Returns whether anything was seeded.
///
/// # Errors
///
/// Returns an error if the files exist but cannot be removed.
pub fn reset(data_dir: &Path) -> Result<bool, DexError> {
    if !is_seeded(data_dir) {
        return Ok(false);
    }
    fs::remove_file(marker_path(data_dir))?;
    let dataset = dataset_path(data_dir);
    if dataset.exists() {
        fs::remove_file(dataset)?;
    }
    log::info!("reference data reset in {}", data_dir.display());
    Ok(true)
}
