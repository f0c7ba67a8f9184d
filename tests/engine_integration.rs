//! End-to-end tests: seed a data directory, sweep, write catalogs, play rounds.
//!
//! Run with: cargo test --release engine_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::sync::atomic::AtomicBool;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use movedex::catalog::{load_catalog, write_catalog};
use movedex::config::catalog_dir;
use movedex::dex::{CosmeticFilter, Dataset, DexBuilder, Generation, MemoryDex};
use movedex::engine::{
    AggregateCheck, MAX_SELECT_ATTEMPTS, MoveSetIndex, NoProgress, SelectError, UniquenessCheck,
    effective_moves, select_round, sweep_complete,
};
use movedex::round::{HintKind, RoundError, RoundToken};
use movedex::{EngineConfig, Game};

fn cutoff(g: u8) -> Generation {
    Generation::new(g).unwrap()
}

/// Two generations of a small region.
///
/// - 1 bulbasaur -> 2 ivysaur, bulbasaur knows 9 from the start
/// - 3 pikachu and its capped form 4 share most moves
/// - 5 eevee arrives in generation 2 and knows pikachu's whole set
fn region() -> Dataset {
    DexBuilder::new()
        .version_group(1, 1)
        .version_group(2, 2)
        .typed_creature(1, "bulbasaur", 1, &["grass", "poison"])
        .typed_creature(2, "ivysaur", 1, &["grass", "poison"])
        .typed_creature(3, "pikachu", 1, &["electric"])
        .typed_creature(4, "pikachu-original-cap", 1, &["electric"])
        .typed_creature(5, "eevee", 2, &["normal"])
        .evolves(1, 2)
        .learns(1, &[9, 20, 21], 1)
        .learns(2, &[20, 21, 22, 23], 1)
        .learns(3, &[30, 31, 32, 33, 34], 1)
        .learns(4, &[30, 31, 32, 33, 34, 35], 1)
        .learns(5, &[30, 31, 32, 33, 34], 2)
        .dataset()
        .unwrap()
}

#[test]
fn test_scenario_ab_through_both_backends() {
    let dex = DexBuilder::new()
        .version_group(1, 1)
        .creature(1, "a", 1)
        .creature(2, "b", 1)
        .learns(1, &[1, 2, 3, 4, 5], 1)
        .learns(2, &[1, 2, 3, 4], 1)
        .build()
        .unwrap();
    let filter = CosmeticFilter::default();
    let index = MoveSetIndex::build(&dex, &filter, cutoff(1)).unwrap();
    let aggregate = AggregateCheck::new(&dex, &filter, cutoff(1)).unwrap();

    for check in [&index as &dyn UniquenessCheck, &aggregate] {
        assert!(!check.is_unique(&[1, 2, 3, 4], 1).unwrap());
        assert!(check.is_unique(&[1, 2, 3, 5], 1).unwrap());
    }
}

#[test]
fn test_scenario_c_inherits_from_pre_evolution() {
    let dex = MemoryDex::from_dataset(region()).unwrap();
    let moves = effective_moves(&dex, &CosmeticFilter::default(), 2, cutoff(1)).unwrap();
    assert!(moves.contains(&9));
    assert_eq!(moves.len(), 5);
}

#[test]
fn test_selector_bound_on_saturated_dataset() {
    let dex = DexBuilder::new()
        .version_group(1, 1)
        .creature(1, "only", 1)
        .learns(1, &[1], 1)
        .build()
        .unwrap();
    let mut rng = SmallRng::seed_from_u64(11);

    let err = select_round(
        &dex,
        &CosmeticFilter::default(),
        cutoff(1),
        &mut rng,
        MAX_SELECT_ATTEMPTS,
    )
    .unwrap_err();
    assert!(matches!(err, SelectError::NoUniquePuzzle { attempts: 10 }));

    let game = Game::new(&dex, &EngineConfig::default());
    assert!(matches!(
        game.start_round(cutoff(1), &mut rng),
        Err(RoundError::NoUniquePuzzle { attempts: 10 })
    ));
}

#[test]
fn test_later_generation_breaks_uniqueness() {
    let dex = MemoryDex::from_dataset(region()).unwrap();
    let filter = CosmeticFilter::default();
    let gen1 = MoveSetIndex::build(&dex, &filter, cutoff(1)).unwrap();
    let gen2 = MoveSetIndex::build(&dex, &filter, cutoff(2)).unwrap();

    // The capped form never counts; eevee only exists from generation 2.
    assert!(gen1.is_unique(&[30, 31, 32, 33], 3).unwrap());
    assert!(!gen2.is_unique(&[30, 31, 32, 33], 3).unwrap());
}

#[test]
fn test_seed_sweep_catalog_and_play() {
    let data_dir = tempfile::tempdir().unwrap();
    let data_path = data_dir.path();
    movedex::dex::seed(data_path, &region(), "region.json").unwrap();
    assert!(matches!(
        movedex::dex::seed(data_path, &region(), "again"),
        Err(movedex::DexError::AlreadySeeded)
    ));

    let (dataset, marker) = movedex::dex::open_seeded(data_path).unwrap();
    assert_eq!(marker.creatures, 5);
    let dex = MemoryDex::from_dataset(dataset).unwrap();
    let config = EngineConfig::default();
    let filter = config.cosmetic_filter();

    let index = MoveSetIndex::build(&dex, &filter, cutoff(1)).unwrap();
    let outcome = sweep_complete(&index, &NoProgress, &AtomicBool::new(false)).unwrap();
    // pikachu: C(5,4) = 5, ivysaur (inherits 9): C(5,4) = 5; bulbasaur is skipped.
    assert_eq!(outcome.stats.combinations_checked, 10);
    assert_eq!(outcome.stats.creatures_skipped, 1);
    assert!(outcome.puzzles.iter().all(|p| p.owner == 2 || p.owner == 3));

    let dir = catalog_dir(data_path);
    let manifest = write_catalog(&dir, &outcome, &index).unwrap();
    assert_eq!(manifest.puzzles, outcome.puzzles.len());
    let catalog = load_catalog(&dir, cutoff(1)).unwrap();
    let aggregate = AggregateCheck::new(&dex, &filter, cutoff(1)).unwrap();
    assert!(catalog.verify(&aggregate).unwrap().is_clean());

    let game = Game::new(&dex, &config).with_catalog(catalog);
    let mut rng = SmallRng::seed_from_u64(1);
    let round = game.start_round(cutoff(1), &mut rng).unwrap();
    let owner = RoundToken::decode(&round.token).unwrap().creature_id;

    let hint = game.get_hint(&round.token, HintKind::Type).unwrap();
    assert!(hint.starts_with("Type"));
    let wrong = game.submit_answer(&round.token, 5, 1, 1).unwrap();
    assert!(!wrong.correct);
    let right = game.submit_answer(&round.token, owner, 2, 1).unwrap();
    assert!(right.correct);
    assert_eq!(right.points, 3);
    assert_eq!(right.reveal.unwrap().id, owner);

    assert!(movedex::dex::reset(data_path).unwrap());
    assert!(!movedex::dex::is_seeded(data_path));
}

#[test]
fn test_catalog_goes_stale_after_data_change() {
    let dir = tempfile::tempdir().unwrap();
    let old = MemoryDex::from_dataset(region()).unwrap();
    let filter = CosmeticFilter::default();
    let index = MoveSetIndex::build(&old, &filter, cutoff(1)).unwrap();
    let outcome = sweep_complete(&index, &NoProgress, &AtomicBool::new(false)).unwrap();
    write_catalog(dir.path(), &outcome, &index).unwrap();

    // A new generation-1 creature learns everything pikachu does.
    let mut changed = region();
    changed.creatures.push(movedex::dex::Creature {
        id: 6,
        name: "raichu".to_string(),
        species: "raichu".to_string(),
        dex_number: 26,
        generation: cutoff(1),
        types: vec!["electric".to_string()],
    });
    changed.evolutions.push(movedex::dex::EvolutionEdge { from: 3, to: 6 });
    let new = MemoryDex::from_dataset(changed).unwrap();
    let new_index = MoveSetIndex::build(&new, &filter, cutoff(1)).unwrap();

    let catalog = load_catalog(dir.path(), cutoff(1)).unwrap();
    let report = catalog.verify(&new_index).unwrap();
    assert!(!report.is_clean());
    assert!(report.failures.iter().all(|p| p.owner == 3));
}
