//! Reference data administration: seed, reset, status.

use super::CliError;
use movedex::catalog;
use movedex::config::catalog_dir;
use movedex::dex::{self, Dataset, Generation, MemoryDex};
use std::fs;
use std::path::{Path, PathBuf};

/// Execute the seed command.
///
/// # Errors
///
/// Returns an error if the dataset is invalid, already seeded (without
/// `force`), or cannot be written.
pub(crate) fn execute(data_dir: &Path, dataset: PathBuf, force: bool) -> Result<(), CliError> {
    let data = Dataset::load(&dataset).map_err(|e| {
        CliError::new(format!("Failed to read {}: {e}", dataset.display()))
    })?;
    // Validate references before anything touches the data directory.
    let loaded = MemoryDex::from_dataset(data.clone())?;

    if force && dex::reset(data_dir)? {
        clear_catalogs(data_dir)?;
    }
    let marker = dex::seed(data_dir, &data, &dataset.display().to_string()).map_err(|e| match e {
        movedex::DexError::AlreadySeeded => CliError::new(format!(
            "{} is already seeded; run `movedex reset` or pass --force",
            data_dir.display()
        )),
        other => other.into(),
    })?;

    println!("Seeded {}", data_dir.display());
    println!("  Creatures:     {}", loaded.creature_count());
    println!("  Moves:         {}", loaded.move_count());
    println!("  Learn records: {}", marker.learn_records);
    Ok(())
}

/// Execute the reset command.
///
/// # Errors
///
/// Returns an error if seeded files cannot be removed.
pub(crate) fn execute_reset(data_dir: &Path) -> Result<(), CliError> {
    if dex::reset(data_dir)? {
        clear_catalogs(data_dir)?;
        println!("Reset {}", data_dir.display());
    } else {
        println!("{} is not seeded", data_dir.display());
    }
    Ok(())
}

/// Execute the status command.
///
/// # Errors
///
/// Returns an error if the seed marker exists but cannot be read.
pub(crate) fn execute_status(data_dir: &Path) -> Result<(), CliError> {
    println!("Data directory: {}", data_dir.display());
    if !dex::is_seeded(data_dir) {
        println!("  Not seeded");
        return Ok(());
    }
    let (_, marker) = dex::open_seeded(data_dir)?;
    println!("  Seeded from:  {}", marker.source);
    println!("  Seeded at:    {} (unix)", marker.seeded_at);
    println!("  Creatures:    {}", marker.creatures);
    println!("  Moves:        {}", marker.moves);
    println!();
    println!("Catalogs:");
    let dir = catalog_dir(data_dir);
    for generation in Generation::all() {
        if !catalog::exists(&dir, generation) {
            continue;
        }
        match catalog::load_catalog(&dir, generation) {
            Ok(c) => {
                let m = c.manifest();
                println!(
                    "  gen {generation}: {} puzzles ({}, {} checked)",
                    m.puzzles, m.mode, m.combinations_checked
                );
            }
            Err(e) => println!("  gen {generation}: unreadable ({e})"),
        }
    }
    Ok(())
}

/// Catalogs describe the old dataset and must go with it.
fn clear_catalogs(data_dir: &Path) -> Result<(), CliError> {
    let dir = catalog_dir(data_dir);
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
        log::info!("removed catalogs in {}", dir.display());
    }
    Ok(())
}
