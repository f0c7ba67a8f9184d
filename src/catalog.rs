//! Durable per-generation catalogs of sweep output.
//!
//! A catalog is two files in the catalog directory:
//!
//! - `gen_<g>.csv` with columns
//!   `creature_id,creature_name,dex_number,move_ids,generation`, where
//!   `move_ids` is a quoted comma-joined list.
//! - `gen_<g>.json`, the manifest describing the run that produced it.
//!
//! Both are written to a `.partial` file first and renamed into place. The
//! manifest goes last, so a CSV without a manifest is never loaded.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dex::{CreatureId, Generation, MoveId};
use crate::engine::{MoveSetIndex, PUZZLE_SIZE, Puzzle, SweepMode, SweepOutcome, UniquenessCheck};
use crate::error::DexError;

/// CSV header line.
pub const CSV_HEADER: &str = "creature_id,creature_name,dex_number,move_ids,generation";

const PARTIAL_SUFFIX: &str = "partial";

/// Errors reading or writing a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// Filesystem failure.
    Io(io::Error),
    /// Manifest could not be (de)serialised.
    Json(serde_json::Error),
    /// A CSV line could not be parsed.
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },
    /// No manifest for this generation; the catalog is absent or incomplete.
    MissingManifest(Generation),
    /// The sweep owner is not in the index used to label rows.
    UnknownOwner(CreatureId),
    /// Row count differs from the manifest.
    CountMismatch {
        /// Rows the manifest promises.
        expected: usize,
        /// Rows found in the CSV.
        found: usize,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "catalog I/O error: {e}"),
            Self::Json(e) => write!(f, "catalog manifest error: {e}"),
            Self::Malformed { line, reason } => write!(f, "catalog line {line}: {reason}"),
            Self::MissingManifest(g) => write!(f, "no complete catalog for generation {g}"),
            Self::UnknownOwner(id) => write!(f, "puzzle owner {id} is not indexed"),
            Self::CountMismatch { expected, found } => {
                write!(f, "catalog has {found} rows, manifest says {expected}")
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CatalogError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// One accepted puzzle with display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    /// Owner id.
    pub creature_id: CreatureId,
    /// Owner form name.
    pub creature_name: String,
    /// Owner national dex number.
    pub dex_number: u32,
    /// The 4 moves, ascending.
    pub move_ids: [MoveId; PUZZLE_SIZE],
    /// Cutoff the puzzle was computed for.
    pub generation: Generation,
}

impl CatalogRow {
    /// The puzzle this row records.
    #[must_use]
    pub fn puzzle(&self) -> Puzzle {
        Puzzle::new(self.creature_id, self.move_ids, self.generation)
    }

    fn to_csv(&self) -> String {
        let moves = self
            .move_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{},{},{},\"{moves}\",{}",
            self.creature_id,
            quote_field(&self.creature_name),
            self.dex_number,
            self.generation
        )
    }

    fn from_csv(line: &str, line_no: usize) -> Result<Self, CatalogError> {
        let malformed = |reason: String| CatalogError::Malformed {
            line: line_no,
            reason,
        };
        let fields = split_record(line).map_err(malformed)?;
        let [id, name, dex, moves, generation] = fields.as_slice() else {
            return Err(malformed(format!("expected 5 fields, found {}", fields.len())));
        };

        let creature_id = id
            .parse::<CreatureId>()
            .map_err(|_| malformed(format!("bad creature id {id:?}")))?;
        let dex_number = dex
            .parse::<u32>()
            .map_err(|_| malformed(format!("bad dex number {dex:?}")))?;
        let parsed: Vec<MoveId> = moves
            .split(',')
            .map(|m| m.trim().parse::<MoveId>())
            .collect::<Result<_, _>>()
            .map_err(|_| malformed(format!("bad move list {moves:?}")))?;
        let move_ids: [MoveId; PUZZLE_SIZE] = parsed
            .try_into()
            .map_err(|v: Vec<MoveId>| malformed(format!("expected 4 moves, found {}", v.len())))?;
        let generation = generation
            .parse::<Generation>()
            .map_err(|e| malformed(format!("{e}")))?;

        Ok(Self {
            creature_id,
            creature_name: name.clone(),
            dex_number,
            move_ids,
            generation,
        })
    }
}

/// Quote a field if it contains a delimiter or quote.
///
/// Records are one line each, so line breaks become spaces.
fn quote_field(field: &str) -> String {
    let field = field.replace(['\r', '\n'], " ");
    if field.contains([',', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}

/// Split one CSV record, honouring double-quoted fields.
fn split_record(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match (quoted, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            (true, '"') => quoted = false,
            (false, '"') if current.is_empty() => quoted = true,
            (false, ',') => fields.push(std::mem::take(&mut current)),
            (_, c) => current.push(c),
        }
    }
    if quoted {
        return Err("unterminated quote".to_string());
    }
    fields.push(current);
    Ok(fields)
}

/// Description of the run that produced a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogManifest {
    /// Generation cutoff.
    pub generation: Generation,
    /// Sweep that produced the rows.
    pub mode: SweepMode,
    /// Rows in the CSV.
    pub puzzles: usize,
    /// Creatures in the index.
    pub creatures_total: usize,
    /// Creatures skipped for knowing fewer than 4 moves.
    pub creatures_skipped: usize,
    /// Combinations checked.
    pub combinations_checked: u64,
    /// Sweep duration in seconds.
    pub elapsed_secs: f64,
    /// When the catalog was written (Unix epoch seconds).
    pub written_at: u64,
}

/// A loaded catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    manifest: CatalogManifest,
    rows: Vec<CatalogRow>,
}

/// Outcome of re-checking a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Rows checked.
    pub checked: usize,
    /// Rows that are no longer unique.
    pub failures: Vec<Puzzle>,
}

impl VerifyReport {
    /// Whether every row re-checked as unique.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Catalog {
    /// Run description.
    #[must_use]
    pub fn manifest(&self) -> &CatalogManifest {
        &self.manifest
    }

    /// Rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    /// Generation cutoff.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.manifest.generation
    }

    /// Number of puzzles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the catalog holds no puzzles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A uniformly random row, or `None` if the catalog is empty.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<&CatalogRow> {
        if self.rows.is_empty() {
            return None;
        }
        Some(&self.rows[rng.gen_range(0..self.rows.len())])
    }

    /// Re-check every row against `checker`.
    ///
    /// # Errors
    ///
    /// Returns an error if the checker cannot read its data.
    pub fn verify(&self, checker: &dyn UniquenessCheck) -> Result<VerifyReport, DexError> {
        let mut report = VerifyReport::default();
        for row in &self.rows {
            report.checked += 1;
            if !checker.is_unique(&row.move_ids, row.creature_id)? {
                log::warn!(
                    "{} {:?} is no longer unique at generation {}",
                    row.creature_name,
                    row.move_ids,
                    row.generation
                );
                report.failures.push(row.puzzle());
            }
        }
        Ok(report)
    }
}

/// CSV path for `generation` in `dir`.
#[must_use]
pub fn csv_path(dir: &Path, generation: Generation) -> PathBuf {
    dir.join(format!("gen_{generation}.csv"))
}

/// Manifest path for `generation` in `dir`.
#[must_use]
pub fn manifest_path(dir: &Path, generation: Generation) -> PathBuf {
    dir.join(format!("gen_{generation}.json"))
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Whether a complete catalog exists for `generation`.
#[must_use]
pub fn exists(dir: &Path, generation: Generation) -> bool {
    manifest_path(dir, generation).exists() && csv_path(dir, generation).exists()
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Open `path.partial` for writing, clearing a stale one left by a crashed run.
fn create_partial(path: &Path) -> Result<(PathBuf, BufWriter<File>), CatalogError> {
    let partial = partial_path(path);
    if partial.exists() {
        log::warn!("removing stale {}", partial.display());
        fs::remove_file(&partial)?;
    }
    let file = File::create(&partial)?;
    Ok((partial, BufWriter::new(file)))
}

fn commit(partial: &Path, writer: BufWriter<File>, path: &Path) -> Result<(), CatalogError> {
    let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
    file.sync_all()?;
    fs::rename(partial, path)?;
    Ok(())
}

/// Replace the catalog for `outcome.generation` wholesale.
///
/// `index` supplies the names and dex numbers written alongside each puzzle.
///
/// # Errors
///
/// Returns an error on filesystem failure or if a puzzle owner is not in
/// `index`. A failed write leaves at most a `.partial` file and no manifest.
pub fn write_catalog(
    dir: &Path,
    outcome: &SweepOutcome,
    index: &MoveSetIndex,
) -> Result<CatalogManifest, CatalogError> {
    fs::create_dir_all(dir)?;
    let generation = outcome.generation;
    let csv = csv_path(dir, generation);
    let manifest_file = manifest_path(dir, generation);

    let (partial, mut writer) = create_partial(&csv)?;
    writeln!(writer, "{CSV_HEADER}")?;
    for puzzle in &outcome.puzzles {
        let creature = index
            .creature(puzzle.owner)
            .ok_or(CatalogError::UnknownOwner(puzzle.owner))?;
        let row = CatalogRow {
            creature_id: creature.id,
            creature_name: creature.name.clone(),
            dex_number: creature.dex_number,
            move_ids: puzzle.moves,
            generation,
        };
        writeln!(writer, "{}", row.to_csv())?;
    }

    // The old manifest must not describe the new CSV.
    if manifest_file.exists() {
        fs::remove_file(&manifest_file)?;
    }
    commit(&partial, writer, &csv)?;

    let manifest = CatalogManifest {
        generation,
        mode: outcome.mode,
        puzzles: outcome.puzzles.len(),
        creatures_total: outcome.stats.creatures_total,
        creatures_skipped: outcome.stats.creatures_skipped,
        combinations_checked: outcome.stats.combinations_checked,
        elapsed_secs: outcome.stats.elapsed.as_secs_f64(),
        written_at: unix_now(),
    };
    let (partial, mut writer) = create_partial(&manifest_file)?;
    serde_json::to_writer_pretty(&mut writer, &manifest)?;
    commit(&partial, writer, &manifest_file)?;

    log::info!(
        "wrote {} puzzles for generation {generation} to {}",
        manifest.puzzles,
        csv.display()
    );
    Ok(manifest)
}

/// Load the catalog for `generation`.
///
/// # Errors
///
/// Returns [`CatalogError::MissingManifest`] if no complete catalog exists,
/// or a parse error if the CSV is malformed or disagrees with the manifest.
pub fn load_catalog(dir: &Path, generation: Generation) -> Result<Catalog, CatalogError> {
    let manifest_file = manifest_path(dir, generation);
    if !manifest_file.exists() {
        return Err(CatalogError::MissingManifest(generation));
    }
    let manifest: CatalogManifest =
        serde_json::from_reader(BufReader::new(File::open(&manifest_file)?))?;

    let reader = BufReader::new(File::open(csv_path(dir, generation))?);
    let mut rows = Vec::with_capacity(manifest.puzzles);
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        if line_no == 1 {
            if line.trim() != CSV_HEADER {
                return Err(CatalogError::Malformed {
                    line: 1,
                    reason: format!("unexpected header {line:?}"),
                });
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        rows.push(CatalogRow::from_csv(&line, line_no)?);
    }

    if rows.len() != manifest.puzzles {
        return Err(CatalogError::CountMismatch {
            expected: manifest.puzzles,
            found: rows.len(),
        });
    }
    log::debug!("loaded {} puzzles for generation {generation}", rows.len());
    Ok(Catalog { manifest, rows })
}
