//! Round commands: start, answer, hint.

use super::output::{format_answer, format_round};
use super::{CliError, HintArg, OutputFormat, open_dex};
use movedex::Game;
use movedex::catalog::{self, CatalogError};
use movedex::config::catalog_dir;
use movedex::dex::{CreatureId, Generation};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::Path;

/// Execute the start command.
///
/// # Errors
///
/// Returns an error if the data cannot be opened or no puzzle is found.
pub(crate) fn execute_start(
    data_dir: &Path,
    generation: Generation,
    seed: Option<u64>,
    use_catalog: bool,
    format: OutputFormat,
) -> Result<(), CliError> {
    let (dex, config) = open_dex(data_dir)?;
    let mut game = Game::new(&dex, &config);

    if use_catalog {
        match catalog::load_catalog(&catalog_dir(data_dir), generation) {
            Ok(c) if !c.is_empty() => game = game.with_catalog(c),
            Ok(_) => log::debug!("catalog for generation {generation} is empty"),
            Err(CatalogError::MissingManifest(_)) => {
                log::debug!("no catalog for generation {generation}, using selector");
            }
            Err(e) => log::warn!("ignoring catalog for generation {generation}: {e}"),
        }
    }

    let seed = seed.unwrap_or_else(|| config.seed_or_clock());
    let mut rng = SmallRng::seed_from_u64(seed);
    let round = game.start_round(generation, &mut rng)?;

    match format {
        OutputFormat::Text => print!("{}", format_round(&round)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&round)?),
    }
    Ok(())
}

/// Execute the answer command.
///
/// # Errors
///
/// Returns an error for a bad token or attempt number.
pub(crate) fn execute_answer(
    data_dir: &Path,
    token: &str,
    guess: CreatureId,
    attempt: u8,
    hints: u32,
    format: OutputFormat,
) -> Result<(), CliError> {
    let (dex, config) = open_dex(data_dir)?;
    let outcome = Game::new(&dex, &config).submit_answer(token, guess, attempt, hints)?;

    match format {
        OutputFormat::Text => print!("{}", format_answer(&outcome)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }
    Ok(())
}

/// Execute the hint command.
///
/// # Errors
///
/// Returns an error for a bad token.
pub(crate) fn execute_hint(data_dir: &Path, token: &str, kind: HintArg) -> Result<(), CliError> {
    let (dex, config) = open_dex(data_dir)?;
    let hint = Game::new(&dex, &config).get_hint(token, kind.into())?;
    println!("{hint}");
    Ok(())
}
