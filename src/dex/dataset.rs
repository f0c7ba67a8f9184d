//! JSON snapshot of the reference dataset.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::{Creature, CreatureId, Move, MoveId, VersionGroup, VersionGroupId};
use crate::error::DexError;

/// Directed evolution edge: `from` evolves into `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionEdge {
    /// The earlier stage.
    pub from: CreatureId,
    /// The later stage.
    pub to: CreatureId,
}

/// `creature` can learn `move_id` under the rules of `version_group`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LearnRecord {
    /// Learning creature.
    pub creature: CreatureId,
    /// Learned move.
    #[serde(rename = "move")]
    pub move_id: MoveId,
    /// Version group whose rules allow it.
    pub version_group: VersionGroupId,
}

/// Whole reference dataset as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Game releases.
    pub version_groups: Vec<VersionGroup>,
    /// Species and forms.
    pub creatures: Vec<Creature>,
    /// Attacks.
    pub moves: Vec<Move>,
    /// Evolution edges.
    #[serde(default)]
    pub evolutions: Vec<EvolutionEdge>,
    /// Learnability relation.
    pub learnsets: Vec<LearnRecord>,
}

impl Dataset {
    /// Read a dataset from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid dataset.
    pub fn load(path: &Path) -> Result<Self, DexError> {
        let file = fs::File::open(path)?;
        let dataset = serde_json::from_reader(BufReader::new(file))?;
        Ok(dataset)
    }

    /// Write the dataset to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file I/O fails.
    pub fn save(&self, path: &Path) -> Result<(), DexError> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
