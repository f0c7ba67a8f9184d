//! Engine configuration and data directory layout.
//!
//! Settings live in `<data-dir>/config.json`. Every field is optional in the
//! file; missing fields take their defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dex::CosmeticFilter;
use crate::engine::MAX_SELECT_ATTEMPTS;
use crate::error::DexError;

/// Name of the config file inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Subdirectory holding generated catalogs.
pub const CATALOG_SUBDIR: &str = "catalog";

/// Tunables shared by the selector, the sweeps and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Selector attempts before giving up on a round.
    pub max_select_attempts: usize,
    /// Combinations drawn per creature by the sampled sweep.
    pub samples_per_creature: usize,
    /// Seconds between progress log lines during a sweep.
    pub progress_interval_secs: u64,
    /// Fixed RNG seed. `None` derives one from the clock.
    pub seed: Option<u64>,
    /// Name fragments marking cosmetic forms.
    pub cosmetic_fragments: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_select_attempts: MAX_SELECT_ATTEMPTS,
            samples_per_creature: 64,
            progress_interval_secs: 30,
            seed: None,
            cosmetic_fragments: CosmeticFilter::default().fragments().to_vec(),
        }
    }
}

impl EngineConfig {
    /// Read a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, DexError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read `<data_dir>/config.json`, falling back to defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(data_dir: &Path) -> Result<Self, DexError> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("no {} in {}, using defaults", CONFIG_FILE, data_dir.display());
            return Ok(Self::default());
        }
        let config = Self::load(&path)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Cosmetic filter built from the configured fragments.
    #[must_use]
    pub fn cosmetic_filter(&self) -> CosmeticFilter {
        CosmeticFilter::new(self.cosmetic_fragments.iter().cloned())
    }

    /// Progress logging interval.
    #[must_use]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }

    /// The configured seed, or one derived from the clock.
    #[must_use]
    pub fn seed_or_clock(&self) -> u64 {
        self.seed.unwrap_or_else(clock_seed)
    }
}

/// Seed derived from the current time.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

/// Path to the default data directory (`~/.movedex`).
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or directory creation fails.
pub fn default_data_dir() -> io::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "cannot determine home directory"))?;

    let data_dir = Path::new(&home).join(".movedex");
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

/// Path to the catalog directory inside `data_dir`.
#[must_use]
pub fn catalog_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(CATALOG_SUBDIR)
}
