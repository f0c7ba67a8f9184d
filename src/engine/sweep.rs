//! Offline enumeration of unique 4-move combinations.
//!
//! Two explicitly separate operations share one driver:
//! - [`sweep_complete`] checks every 4-combination of every creature.
//! - [`sweep_sampled`] checks a bounded random sample per creature.
//!
//! Creatures are swept in parallel with rayon. The [`MoveSetIndex`] is
//! read-only for the whole run; the only shared mutable state is a set of
//! atomic progress counters updated once per creature.

// Progress arithmetic mixes counters and floats
#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::sample::sample_array;
use super::uniqueness::{CreatureBits, MoveSetIndex, UniquenessCheck};
use super::{PUZZLE_SIZE, Puzzle};
use crate::dex::{CreatureId, Generation, MoveId};

/// Which sweep produced a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum SweepMode {
    /// Every combination of every creature.
    Complete,
    /// A bounded random sample per creature.
    Sampled {
        /// Combinations drawn per creature.
        samples_per_creature: usize,
        /// Base seed of the per-creature RNGs.
        seed: u64,
    },
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Sampled {
                samples_per_creature,
                seed,
            } => write!(f, "sampled ({samples_per_creature}/creature, seed {seed})"),
        }
    }
}

/// Parameters of a sampled sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleOptions {
    /// Combinations to draw per creature.
    pub samples_per_creature: usize,
    /// Base seed; each creature derives its own RNG from it.
    pub seed: u64,
}

/// Point-in-time view of a running sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSnapshot {
    /// Generation being swept.
    pub generation: Generation,
    /// Creatures finished so far.
    pub creatures_done: usize,
    /// Creatures in the sweep.
    pub creatures_total: usize,
    /// Combinations checked so far.
    pub combinations_checked: u64,
    /// Unique combinations found so far.
    pub unique_found: u64,
    /// Time since the sweep started.
    pub elapsed: Duration,
}

/// Receives progress from a running sweep.
///
/// Called from rayon worker threads after each creature.
pub trait SweepObserver: Sync {
    /// A creature finished.
    fn on_progress(&self, snapshot: &SweepSnapshot);
}

/// Ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl SweepObserver for NoProgress {
    fn on_progress(&self, _snapshot: &SweepSnapshot) {}
}

/// Logs progress at `info` level no more often than `interval`.
#[derive(Debug)]
pub struct LogObserver {
    interval: Duration,
    last: Mutex<Instant>,
}

impl LogObserver {
    /// Log at most once per `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(Instant::now()),
        }
    }
}

impl SweepObserver for LogObserver {
    fn on_progress(&self, s: &SweepSnapshot) {
        let Ok(mut last) = self.last.try_lock() else {
            return;
        };
        if last.elapsed() < self.interval && s.creatures_done < s.creatures_total {
            return;
        }
        *last = Instant::now();
        let secs = s.elapsed.as_secs_f64();
        let rate = if secs > 0.0 {
            s.combinations_checked as f64 / secs
        } else {
            0.0
        };
        log::info!(
            "gen {}: {}/{} creatures, {} checked, {} unique, {:.0}s elapsed ({:.0} checks/s)",
            s.generation,
            s.creatures_done,
            s.creatures_total,
            s.combinations_checked,
            s.unique_found,
            secs,
            rate
        );
    }
}

/// Final counters of a finished sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepStats {
    /// Creatures in the index.
    pub creatures_total: usize,
    /// Creatures skipped for knowing fewer than 4 moves.
    pub creatures_skipped: usize,
    /// Combinations checked.
    pub combinations_checked: u64,
    /// Unique combinations found.
    pub unique_found: u64,
    /// Wall-clock duration.
    pub elapsed: Duration,
}

/// Result of a finished sweep.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    /// Generation swept.
    pub generation: Generation,
    /// Which sweep ran.
    pub mode: SweepMode,
    /// Accepted puzzles ordered by owner, then moves.
    pub puzzles: Vec<Puzzle>,
    /// Final counters.
    pub stats: SweepStats,
}

/// Why a sweep stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepError {
    /// The cancel flag was raised; nothing was produced.
    Cancelled {
        /// Generation being swept.
        generation: Generation,
        /// Creatures finished before cancellation.
        creatures_done: usize,
        /// Combinations checked before cancellation.
        combinations_checked: u64,
    },
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled {
                generation,
                creatures_done,
                combinations_checked,
            } => write!(
                f,
                "sweep of generation {generation} cancelled after {creatures_done} creatures \
                 ({combinations_checked} combinations checked)"
            ),
        }
    }
}

impl std::error::Error for SweepError {}

/// Check every 4-combination of every indexed creature.
///
/// # Errors
///
/// Returns [`SweepError::Cancelled`] if `cancel` is raised before every
/// creature has been swept.
pub fn sweep_complete(
    index: &MoveSetIndex,
    observer: &dyn SweepObserver,
    cancel: &AtomicBool,
) -> Result<SweepOutcome, SweepError> {
    run(index, SweepMode::Complete, observer, cancel, |entry_moves, owner| {
        sweep_all_combinations(index, entry_moves, owner)
    })
}

/// Check up to `options.samples_per_creature` random 4-combinations per creature.
///
/// Creatures with no more combinations than the budget are swept fully.
/// Output is deterministic for a given seed.
///
/// # Errors
///
/// Returns [`SweepError::Cancelled`] if `cancel` is raised before every
/// creature has been swept.
pub fn sweep_sampled(
    index: &MoveSetIndex,
    options: SampleOptions,
    observer: &dyn SweepObserver,
    cancel: &AtomicBool,
) -> Result<SweepOutcome, SweepError> {
    let mode = SweepMode::Sampled {
        samples_per_creature: options.samples_per_creature,
        seed: options.seed,
    };
    run(index, mode, observer, cancel, |entry_moves, owner| {
        sweep_random_combinations(index, entry_moves, owner, options)
    })
}

/// Per-creature result.
struct CreatureSweep {
    checked: u64,
    found: Vec<[MoveId; PUZZLE_SIZE]>,
    skipped: bool,
}

impl CreatureSweep {
    fn skipped() -> Self {
        Self {
            checked: 0,
            found: Vec::new(),
            skipped: true,
        }
    }
}

#[derive(Default)]
struct Counters {
    creatures_done: AtomicUsize,
    checked: AtomicU64,
    unique: AtomicU64,
}

fn run<F>(
    index: &MoveSetIndex,
    mode: SweepMode,
    observer: &dyn SweepObserver,
    cancel: &AtomicBool,
    per_creature: F,
) -> Result<SweepOutcome, SweepError>
where
    F: Fn(&[MoveId], CreatureId) -> CreatureSweep + Sync,
{
    let generation = index.generation();
    let start = Instant::now();
    let total = index.len();
    let counters = Counters::default();
    log::info!("sweeping generation {generation}: {total} creatures, mode {mode}");

    let results: Vec<Option<(CreatureId, CreatureSweep)>> = index
        .entries()
        .par_iter()
        .map(|entry| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let result = if entry.moves.len() < PUZZLE_SIZE {
                log::debug!(
                    "skipping {} ({} moves up to generation {generation})",
                    entry.creature.name,
                    entry.moves.len()
                );
                CreatureSweep::skipped()
            } else {
                per_creature(&entry.moves, entry.creature.id)
            };

            let done = counters.creatures_done.fetch_add(1, Ordering::Relaxed) + 1;
            let checked =
                counters.checked.fetch_add(result.checked, Ordering::Relaxed) + result.checked;
            let found = result.found.len() as u64;
            let unique = counters.unique.fetch_add(found, Ordering::Relaxed) + found;
            observer.on_progress(&SweepSnapshot {
                generation,
                creatures_done: done,
                creatures_total: total,
                combinations_checked: checked,
                unique_found: unique,
                elapsed: start.elapsed(),
            });

            Some((entry.creature.id, result))
        })
        .collect();

    if results.iter().any(Option::is_none) {
        let err = SweepError::Cancelled {
            generation,
            creatures_done: counters.creatures_done.load(Ordering::Relaxed),
            combinations_checked: counters.checked.load(Ordering::Relaxed),
        };
        log::warn!("{err}");
        return Err(err);
    }

    let mut stats = SweepStats {
        creatures_total: total,
        creatures_skipped: 0,
        combinations_checked: 0,
        unique_found: 0,
        elapsed: Duration::ZERO,
    };
    let mut puzzles = Vec::new();
    for (owner, result) in results.into_iter().flatten() {
        stats.creatures_skipped += usize::from(result.skipped);
        stats.combinations_checked += result.checked;
        puzzles.extend(
            result
                .found
                .into_iter()
                .map(|moves| Puzzle::new(owner, moves, generation)),
        );
    }
    puzzles.sort_unstable();
    stats.unique_found = puzzles.len() as u64;
    stats.elapsed = start.elapsed();

    log::info!(
        "generation {generation} done: {} unique of {} checked in {:.1}s ({} creatures skipped)",
        stats.unique_found,
        stats.combinations_checked,
        stats.elapsed.as_secs_f64(),
        stats.creatures_skipped
    );
    Ok(SweepOutcome {
        generation,
        mode,
        puzzles,
        stats,
    })
}

/// Inverted-index columns for a creature's moves.
fn columns<'a>(index: &'a MoveSetIndex, moves: &[MoveId]) -> Vec<(MoveId, &'a CreatureBits)> {
    moves
        .iter()
        .filter_map(|&m| index.holders_of(m).map(|bits| (m, bits)))
        .collect()
}

fn sweep_all_combinations(
    index: &MoveSetIndex,
    moves: &[MoveId],
    _owner: CreatureId,
) -> CreatureSweep {
    let cols = columns(index, moves);
    let n = cols.len();
    let mut ab = CreatureBits::new(index.len());
    let mut abc = CreatureBits::new(index.len());
    let mut abcd = CreatureBits::new(index.len());
    let mut checked = 0u64;
    let mut found = Vec::new();

    for a in 0..n {
        for b in a + 1..n {
            cols[a].1.intersect_into(cols[b].1, &mut ab);
            for c in b + 1..n {
                ab.intersect_into(cols[c].1, &mut abc);
                // Only the owner is left: every extension is unique.
                if abc.count() == 1 {
                    for col in &cols[c + 1..] {
                        found.push([cols[a].0, cols[b].0, cols[c].0, col.0]);
                    }
                    checked += (n - c - 1) as u64;
                    continue;
                }
                for d in c + 1..n {
                    abc.intersect_into(cols[d].1, &mut abcd);
                    checked += 1;
                    if abcd.count() == 1 {
                        found.push([cols[a].0, cols[b].0, cols[c].0, cols[d].0]);
                    }
                }
            }
        }
    }

    CreatureSweep {
        checked,
        found,
        skipped: false,
    }
}

/// Number of 4-combinations of `n` items.
fn combinations_of(n: usize) -> u64 {
    if n < PUZZLE_SIZE {
        return 0;
    }
    let n = n as u64;
    n * (n - 1) * (n - 2) * (n - 3) / 24
}

fn sweep_random_combinations(
    index: &MoveSetIndex,
    moves: &[MoveId],
    owner: CreatureId,
    options: SampleOptions,
) -> CreatureSweep {
    if combinations_of(moves.len()) <= options.samples_per_creature as u64 {
        return sweep_all_combinations(index, moves, owner);
    }

    let mut rng = SmallRng::seed_from_u64(
        options.seed ^ u64::from(owner).wrapping_mul(0x9E37_79B9_7F4A_7C15),
    );
    let mut drawn: BTreeSet<[MoveId; PUZZLE_SIZE]> = BTreeSet::new();
    let max_draws = options.samples_per_creature.saturating_mul(8);
    for _ in 0..max_draws {
        if drawn.len() >= options.samples_per_creature {
            break;
        }
        if let Some(mut combo) = sample_array::<MoveId, PUZZLE_SIZE, _>(moves, &mut rng) {
            combo.sort_unstable();
            drawn.insert(combo);
        }
    }

    let mut acc = CreatureBits::new(index.len());
    let mut scratch = CreatureBits::new(index.len());
    let mut found = Vec::new();
    for combo in &drawn {
        let [first, rest @ ..] = combo;
        let Some(bits) = index.holders_of(*first) else {
            continue;
        };
        acc.clone_from(bits);
        for m in rest {
            if let Some(bits) = index.holders_of(*m) {
                acc.intersect_into(bits, &mut scratch);
                std::mem::swap(&mut acc, &mut scratch);
            }
        }
        if acc.count() == 1 {
            found.push(*combo);
        }
    }

    CreatureSweep {
        checked: drawn.len() as u64,
        found,
        skipped: false,
    }
}
