//! In-memory [`DexSource`] built from a [`Dataset`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use super::DexSource;
use super::dataset::{Dataset, EvolutionEdge, LearnRecord};
use super::model::{
    CosmeticFilter, Creature, CreatureId, CreatureMatch, Generation, Move, MoveId, Predecessor,
    VersionGroup, VersionGroupId,
};
use crate::error::DexError;

/// Reference data held entirely in memory, indexed for the engine's queries.
#[derive(Debug, Clone)]
pub struct MemoryDex {
    creatures: BTreeMap<CreatureId, Creature>,
    moves: HashMap<MoveId, Move>,
    version_groups: Vec<VersionGroup>,
    predecessors: HashMap<CreatureId, Vec<CreatureId>>,
    successors: HashMap<CreatureId, Vec<CreatureId>>,
    /// creature -> (move, version group)
    learnsets: HashMap<CreatureId, Vec<(MoveId, VersionGroupId)>>,
    /// move -> (creature, version group)
    learners: HashMap<MoveId, Vec<(CreatureId, VersionGroupId)>>,
}

impl MemoryDex {
    /// Index a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::DanglingReference`] if an evolution edge or
    /// learnability record names an entity the dataset does not define.
    pub fn from_dataset(dataset: Dataset) -> Result<Self, DexError> {
        let creatures: BTreeMap<_, _> = dataset
            .creatures
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let moves: HashMap<_, _> = dataset.moves.into_iter().map(|m| (m.id, m)).collect();
        let vg_ids: HashSet<_> = dataset.version_groups.iter().map(|vg| vg.id).collect();

        let mut predecessors: HashMap<CreatureId, Vec<CreatureId>> = HashMap::new();
        let mut successors: HashMap<CreatureId, Vec<CreatureId>> = HashMap::new();
        for EvolutionEdge { from, to } in dataset.evolutions {
            for id in [from, to] {
                if !creatures.contains_key(&id) {
                    return Err(DexError::DanglingReference(format!(
                        "creature {id} in evolution {from} -> {to}"
                    )));
                }
            }
            predecessors.entry(to).or_default().push(from);
            successors.entry(from).or_default().push(to);
        }

        let mut learnsets: HashMap<CreatureId, Vec<(MoveId, VersionGroupId)>> = HashMap::new();
        let mut learners: HashMap<MoveId, Vec<(CreatureId, VersionGroupId)>> = HashMap::new();
        for LearnRecord {
            creature,
            move_id,
            version_group,
        } in dataset.learnsets
        {
            if !creatures.contains_key(&creature) {
                return Err(DexError::DanglingReference(format!("creature {creature}")));
            }
            if !moves.contains_key(&move_id) {
                return Err(DexError::DanglingReference(format!("move {move_id}")));
            }
            if !vg_ids.contains(&version_group) {
                return Err(DexError::DanglingReference(format!(
                    "version group {version_group}"
                )));
            }
            learnsets
                .entry(creature)
                .or_default()
                .push((move_id, version_group));
            learners
                .entry(move_id)
                .or_default()
                .push((creature, version_group));
        }

        Ok(Self {
            creatures,
            moves,
            version_groups: dataset.version_groups,
            predecessors,
            successors,
            learnsets,
            learners,
        })
    }

    /// Number of creatures, cosmetic forms included.
    #[must_use]
    pub fn creature_count(&self) -> usize {
        self.creatures.len()
    }

    /// Number of moves.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// Every creature that inherits from `learner`: itself plus all later
    /// stages reachable without passing through a cosmetic form.
    fn inheritors(&self, learner: CreatureId, filter: &CosmeticFilter) -> HashSet<CreatureId> {
        let mut seen = HashSet::from([learner]);
        let mut queue = VecDeque::new();
        if !self.is_cosmetic(learner, filter) {
            queue.push_back(learner);
        }

        while let Some(current) = queue.pop_front() {
            for &next in self.successors.get(&current).into_iter().flatten() {
                if seen.insert(next) && !self.is_cosmetic(next, filter) {
                    queue.push_back(next);
                }
            }
        }

        seen
    }

    fn is_cosmetic(&self, id: CreatureId, filter: &CosmeticFilter) -> bool {
        self.creatures
            .get(&id)
            .is_some_and(|c| filter.is_cosmetic(&c.name))
    }
}

impl DexSource for MemoryDex {
    fn creatures_up_to(&self, max: Generation) -> Result<Vec<Creature>, DexError> {
        Ok(self
            .creatures
            .values()
            .filter(|c| c.generation <= max)
            .cloned()
            .collect())
    }

    fn creature_by_id(&self, id: CreatureId) -> Result<Creature, DexError> {
        self.creatures
            .get(&id)
            .cloned()
            .ok_or(DexError::UnknownCreature(id))
    }

    fn move_by_id(&self, id: MoveId) -> Result<Move, DexError> {
        self.moves.get(&id).cloned().ok_or(DexError::UnknownMove(id))
    }

    fn evolution_predecessors(&self, id: CreatureId) -> Result<Vec<Predecessor>, DexError> {
        Ok(self
            .predecessors
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|pid| self.creatures.get(pid))
            .map(|c| Predecessor {
                id: c.id,
                name: c.name.clone(),
            })
            .collect())
    }

    fn version_groups_up_to(&self, max: Generation) -> Result<Vec<VersionGroupId>, DexError> {
        Ok(self
            .version_groups
            .iter()
            .filter(|vg| vg.generation <= max)
            .map(|vg| vg.id)
            .collect())
    }

    fn learnable_moves(
        &self,
        creatures: &[CreatureId],
        version_groups: &[VersionGroupId],
    ) -> Result<Vec<MoveId>, DexError> {
        let allowed: HashSet<_> = version_groups.iter().copied().collect();
        let moves: BTreeSet<MoveId> = creatures
            .iter()
            .filter_map(|id| self.learnsets.get(id))
            .flatten()
            .filter(|(_, vg)| allowed.contains(vg))
            .map(|&(m, _)| m)
            .collect();
        Ok(moves.into_iter().collect())
    }

    fn count_creatures_learning_all(
        &self,
        moves: &[MoveId],
        version_groups: &[VersionGroupId],
        max: Generation,
        filter: &CosmeticFilter,
    ) -> Result<Vec<CreatureMatch>, DexError> {
        let allowed: HashSet<_> = version_groups.iter().copied().collect();
        let distinct: BTreeSet<MoveId> = moves.iter().copied().collect();
        let mut counts: BTreeMap<CreatureId, usize> = BTreeMap::new();

        for move_id in distinct {
            let direct: BTreeSet<CreatureId> = self
                .learners
                .get(&move_id)
                .into_iter()
                .flatten()
                .filter(|(_, vg)| allowed.contains(vg))
                .map(|&(c, _)| c)
                .collect();

            let mut holders = HashSet::new();
            for learner in direct {
                holders.extend(self.inheritors(learner, filter));
            }
            for holder in holders {
                *counts.entry(holder).or_default() += 1;
            }
        }

        Ok(counts
            .into_iter()
            .filter(|(id, _)| {
                self.creatures
                    .get(id)
                    .is_some_and(|c| c.generation <= max && !filter.is_cosmetic(&c.name))
            })
            .map(|(creature_id, match_count)| CreatureMatch {
                creature_id,
                match_count,
            })
            .collect())
    }
}

/// Fluent construction of small synthetic datasets.
///
/// Moves referenced by [`learns`](Self::learns) but never declared get a
/// placeholder `move-<id>` entry introduced in generation 1.
#[derive(Debug, Default)]
pub struct DexBuilder {
    version_groups: Vec<(VersionGroupId, u8)>,
    creatures: Vec<(CreatureId, String, u8, Vec<String>)>,
    moves: Vec<Move>,
    evolutions: Vec<EvolutionEdge>,
    learnsets: Vec<(CreatureId, MoveId, VersionGroupId)>,
}

impl DexBuilder {
    /// Start an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a version group belonging to `generation`.
    #[must_use]
    pub fn version_group(mut self, id: VersionGroupId, generation: u8) -> Self {
        self.version_groups.push((id, generation));
        self
    }

    /// Declare a single-typed creature introduced in `generation`.
    #[must_use]
    pub fn creature(self, id: CreatureId, name: &str, generation: u8) -> Self {
        self.typed_creature(id, name, generation, &["normal"])
    }

    /// Declare a creature with explicit types.
    #[must_use]
    pub fn typed_creature(
        mut self,
        id: CreatureId,
        name: &str,
        generation: u8,
        types: &[&str],
    ) -> Self {
        let types = types.iter().map(ToString::to_string).collect();
        self.creatures.push((id, name.to_string(), generation, types));
        self
    }

    /// Declare a move explicitly.
    #[must_use]
    pub fn with_move(mut self, mv: Move) -> Self {
        self.moves.push(mv);
        self
    }

    /// `from` evolves into `to`.
    #[must_use]
    pub fn evolves(mut self, from: CreatureId, to: CreatureId) -> Self {
        self.evolutions.push(EvolutionEdge { from, to });
        self
    }

    /// `creature` learns every move in `moves` in `version_group`.
    #[must_use]
    pub fn learns(
        mut self,
        creature: CreatureId,
        moves: &[MoveId],
        version_group: VersionGroupId,
    ) -> Self {
        self.learnsets
            .extend(moves.iter().map(|&m| (creature, m, version_group)));
        self
    }

    /// Assemble the dataset without indexing it.
    ///
    /// # Errors
    ///
    /// Returns an error if any generation number is out of range.
    pub fn dataset(self) -> Result<Dataset, DexError> {
        let version_groups = self
            .version_groups
            .into_iter()
            .map(|(id, g)| {
                Ok(VersionGroup {
                    id,
                    name: format!("vg-{id}"),
                    generation: Generation::new(g)?,
                })
            })
            .collect::<Result<Vec<_>, DexError>>()?;

        let creatures = self
            .creatures
            .into_iter()
            .map(|(id, name, g, types)| {
                let species = name.split('-').next().unwrap_or(&name).to_string();
                Ok(Creature {
                    id,
                    name,
                    species,
                    dex_number: id,
                    generation: Generation::new(g)?,
                    types,
                })
            })
            .collect::<Result<Vec<_>, DexError>>()?;

        let mut moves = self.moves;
        let declared: BTreeSet<MoveId> = moves.iter().map(|m| m.id).collect();
        let referenced: BTreeSet<MoveId> = self.learnsets.iter().map(|&(_, m, _)| m).collect();
        moves.extend(referenced.difference(&declared).map(|&id| Move {
            id,
            name: format!("move-{id}"),
            element: "normal".to_string(),
            power: None,
            accuracy: None,
            pp: None,
            generation: Generation::FIRST,
        }));

        let learnsets = self
            .learnsets
            .into_iter()
            .map(|(creature, move_id, version_group)| LearnRecord {
                creature,
                move_id,
                version_group,
            })
            .collect();

        Ok(Dataset {
            version_groups,
            creatures,
            moves,
            evolutions: self.evolutions,
            learnsets,
        })
    }

    /// Assemble and index the dataset.
    ///
    /// # Errors
    ///
    /// Returns an error on out-of-range generations or dangling references.
    pub fn build(self) -> Result<MemoryDex, DexError> {
        MemoryDex::from_dataset(self.dataset()?)
    }
}
