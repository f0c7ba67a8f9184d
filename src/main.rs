//! Movedex CLI - administrative and offline surface of the puzzle engine.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use movedex::dex::{CreatureId, Generation};
use std::path::PathBuf;
use std::process::ExitCode;

/// Movedex - name the creature from four of its moves
#[derive(Parser, Debug)]
#[command(name = "movedex")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory (default: ~/.movedex)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a reference dataset (JSON snapshot) into the data directory
    Seed {
        /// Dataset JSON file
        #[arg(required = true)]
        dataset: PathBuf,

        /// Replace existing reference data and drop its catalogs
        #[arg(long)]
        force: bool,
    },

    /// Remove reference data and catalogs
    Reset,

    /// Show seeded data and available catalogs
    Status,

    /// Start a round
    Start {
        /// Generation cutoff (1-9)
        #[arg(short, long, default_value = "9")]
        generation: Generation,

        /// Random seed (default: config or clock)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Always run the selector, even if a catalog exists
        #[arg(long)]
        no_catalog: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Submit a guess for a round
    Answer {
        /// Round token from `start`
        #[arg(required = true)]
        token: String,

        /// Guessed creature id
        #[arg(required = true)]
        guess: CreatureId,

        /// Attempt number (1-3)
        #[arg(short, long, default_value = "1")]
        attempt: u8,

        /// Hints used so far
        #[arg(long, default_value = "0")]
        hints: u32,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Get a hint for a round
    Hint {
        /// Round token from `start`
        #[arg(required = true)]
        token: String,

        /// Hint kind: generation or type
        #[arg(short, long)]
        kind: cli::HintArg,
    },

    /// Sweep move combinations and rebuild catalogs
    Enumerate {
        /// Generation (1-9) or "all"
        #[arg(short, long)]
        generation: cli::GenerationSelection,

        /// Sweep mode: fast (sampled) or complete
        #[arg(short, long, required = true)]
        mode: cli::EnumerateMode,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,

        /// Combinations sampled per creature in fast mode (default: config)
        #[arg(long)]
        samples: Option<usize>,

        /// Sampling seed (default: config or clock)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Cancel after this many seconds
        #[arg(long)]
        max_duration: Option<u64>,
    },

    /// Re-check stored catalogs against the reference data
    Verify {
        /// Generation (1-9) or "all"
        #[arg(short, long, default_value = "all")]
        generation: cli::GenerationSelection,

        /// Uniqueness backend: index or aggregate
        #[arg(short, long, default_value = "index")]
        backend: cli::Backend,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let data_dir = match cli::resolve_data_dir(args.data_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Commands::Seed { dataset, force } => cli::seed::execute(&data_dir, dataset, force),

        Commands::Reset => cli::seed::execute_reset(&data_dir),

        Commands::Status => cli::seed::execute_status(&data_dir),

        Commands::Start {
            generation,
            seed,
            no_catalog,
            format,
        } => cli::round::execute_start(&data_dir, generation, seed, !no_catalog, format),

        Commands::Answer {
            token,
            guess,
            attempt,
            hints,
            format,
        } => cli::round::execute_answer(&data_dir, &token, guess, attempt, hints, format),

        Commands::Hint { token, kind } => cli::round::execute_hint(&data_dir, &token, kind),

        Commands::Enumerate {
            generation,
            mode,
            threads,
            progress,
            samples,
            seed,
            max_duration,
        } => cli::enumerate::execute(
            &data_dir,
            cli::enumerate::EnumerateArgs {
                generation,
                mode,
                threads,
                progress,
                samples,
                seed,
                max_duration,
            },
        ),

        Commands::Verify { generation, backend } => {
            cli::verify::execute(&data_dir, generation, backend)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
