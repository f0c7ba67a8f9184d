//! Enumerate command: offline sweeps that rebuild catalogs.

use super::output::format_sweep;
use super::{CliError, EnumerateMode, GenerationSelection, open_dex};
use indicatif::{ProgressBar, ProgressStyle};
use movedex::catalog::{CatalogManifest, write_catalog};
use movedex::config::catalog_dir;
use movedex::engine::{
    LogObserver, MoveSetIndex, SampleOptions, SweepObserver, SweepOutcome, SweepSnapshot,
    sweep_complete, sweep_sampled,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Options for the enumerate command.
#[derive(Debug)]
pub(crate) struct EnumerateArgs {
    /// Generations to sweep.
    pub(crate) generation: GenerationSelection,
    /// Which sweep to run.
    pub(crate) mode: EnumerateMode,
    /// Rayon pool size.
    pub(crate) threads: Option<usize>,
    /// Show a progress bar instead of log lines.
    pub(crate) progress: bool,
    /// Per-creature sample budget override.
    pub(crate) samples: Option<usize>,
    /// Sample seed override.
    pub(crate) seed: Option<u64>,
    /// Wall-clock limit for the whole command, in seconds.
    pub(crate) max_duration: Option<u64>,
}

/// Progress bar over creatures.
#[derive(Debug)]
struct BarObserver {
    bar: ProgressBar,
}

impl SweepObserver for BarObserver {
    fn on_progress(&self, s: &SweepSnapshot) {
        self.bar.set_position(s.creatures_done as u64);
        self.bar.set_message(format!(
            "{} checked, {} unique",
            s.combinations_checked, s.unique_found
        ));
    }
}

fn progress_bar(len: usize, generation: movedex::Generation) -> Result<ProgressBar, CliError> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{prefix} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
                 {pos}/{len} creatures {msg}",
            )
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-"),
    );
    pb.set_prefix(format!("gen {generation}"));
    Ok(pb)
}

/// Write one generation's catalog, naming the generation and the work lost
/// on failure.
fn store_catalog(
    out_dir: &Path,
    outcome: &SweepOutcome,
    index: &MoveSetIndex,
) -> Result<CatalogManifest, CliError> {
    write_catalog(out_dir, outcome, index).map_err(|e| {
        let message = format!(
            "writing generation {} catalog failed after {} combinations: {e}",
            outcome.generation, outcome.stats.combinations_checked
        );
        log::error!("{message}");
        CliError::new(message)
    })
}

/// Execute the enumerate command.
///
/// # Errors
///
/// Returns an error if the data cannot be opened, a sweep is cancelled by
/// the time limit, or a catalog cannot be written.
pub(crate) fn execute(data_dir: &Path, args: EnumerateArgs) -> Result<(), CliError> {
    let (dex, config) = open_dex(data_dir)?;
    let filter = config.cosmetic_filter();
    let out_dir = catalog_dir(data_dir);

    // Set thread pool size if specified
    if let Some(num_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let cancel = Arc::new(AtomicBool::new(false));
    if let Some(secs) = args.max_duration {
        let cancel = Arc::clone(&cancel);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            log::warn!("time limit of {secs}s reached, cancelling");
            cancel.store(true, Ordering::Relaxed);
        });
    }

    let options = SampleOptions {
        samples_per_creature: args.samples.unwrap_or(config.samples_per_creature),
        seed: args.seed.unwrap_or_else(|| config.seed_or_clock()),
    };
    let start = Instant::now();

    for generation in args.generation.generations() {
        let index = MoveSetIndex::build(&dex, &filter, generation)?;

        let bar = if args.progress {
            Some(BarObserver {
                bar: progress_bar(index.len(), generation)?,
            })
        } else {
            None
        };
        let log_observer = LogObserver::new(config.progress_interval());
        let observer: &dyn SweepObserver = match &bar {
            Some(b) => b,
            None => &log_observer,
        };

        let result = match args.mode {
            EnumerateMode::Complete => sweep_complete(&index, observer, &cancel),
            EnumerateMode::Fast => sweep_sampled(&index, options, observer, &cancel),
        };
        if let Some(b) = bar {
            b.bar.finish_with_message("done");
        }
        let outcome = result?;

        let manifest = store_catalog(&out_dir, &outcome, &index)?;
        print!("{}", format_sweep(&outcome, &manifest));
    }

    println!();
    println!(
        "Catalogs written to {} in {:.2}s",
        out_dir.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
