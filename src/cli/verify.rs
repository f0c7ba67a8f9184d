//! Verify command: re-check stored catalogs against the current data.

use super::{Backend, CliError, GenerationSelection, open_dex};
use movedex::catalog::{self, load_catalog};
use movedex::config::catalog_dir;
use movedex::engine::{AggregateCheck, MoveSetIndex, UniquenessCheck};
use std::path::Path;

/// Execute the verify command.
///
/// # Errors
///
/// Returns an error if a catalog cannot be read, or if any stored puzzle is
/// no longer unique.
pub(crate) fn execute(
    data_dir: &Path,
    generation: GenerationSelection,
    backend: Backend,
) -> Result<(), CliError> {
    let (dex, config) = open_dex(data_dir)?;
    let filter = config.cosmetic_filter();
    let dir = catalog_dir(data_dir);
    let mut failures = 0usize;
    let mut verified = 0usize;

    for g in generation.generations() {
        if !catalog::exists(&dir, g) {
            if matches!(generation, GenerationSelection::One(_)) {
                return Err(CliError::new(format!("No catalog for generation {g}")));
            }
            continue;
        }
        let catalog = load_catalog(&dir, g)?;
        let checker: Box<dyn UniquenessCheck + '_> = match backend {
            Backend::Index => Box::new(MoveSetIndex::build(&dex, &filter, g)?),
            Backend::Aggregate => Box::new(AggregateCheck::new(&dex, &filter, g)?),
        };
        let report = catalog.verify(checker.as_ref())?;
        verified += 1;
        failures += report.failures.len();

        let status = if report.is_clean() { "OK" } else { "FAILED" };
        println!(
            "gen {g}: {}/{} unique [{status}]",
            report.checked - report.failures.len(),
            report.checked
        );
        for p in &report.failures {
            println!("  creature {} {:?}", p.owner, p.moves);
        }
    }

    if verified == 0 {
        println!("No catalogs found in {}", dir.display());
    }
    if failures > 0 {
        return Err(CliError::new(format!(
            "{failures} stored puzzles are no longer unique; re-run enumerate"
        )));
    }
    Ok(())
}
