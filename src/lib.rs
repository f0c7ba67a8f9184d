// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Movedex: a moveset-uniqueness puzzle engine.
//!
//! Players see four moves and must name the one creature that can learn
//! all of them under a generation cutoff. This crate provides:
//! - Generation-scoped learnability with pre-evolution inheritance
//! - Uniqueness checking with an in-memory and an aggregate backend
//! - A bounded interactive selector and offline exhaustive/sampled sweeps
//! - Durable per-generation catalogs and a stateless round service
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  ┌──────────────────────────┐
//! │  round::Game     │  │  catalog (CSV+manifest)  │
//! ├──────────────────┴──┴──────────────────────────┤
//! │  engine: selector │ sweep │ uniqueness │ learn │
//! ├────────────────────────────────────────────────┤
//! │  dex: DexSource (MemoryDex over dataset.json)  │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use movedex::dex::{CosmeticFilter, DexBuilder, Generation};
//! use movedex::engine::{MoveSetIndex, UniquenessCheck};
//!
//! let dex = DexBuilder::new()
//!     .version_group(1, 1)
//!     .creature(1, "alpha", 1)
//!     .creature(2, "beta", 1)
//!     .learns(1, &[1, 2, 3, 4, 5], 1)
//!     .learns(2, &[1, 2, 3, 4], 1)
//!     .build()?;
//! let index = MoveSetIndex::build(&dex, &CosmeticFilter::default(), Generation::FIRST)?;
//!
//! assert!(!index.is_unique(&[1, 2, 3, 4], 1)?);
//! assert!(index.is_unique(&[1, 2, 3, 5], 1)?);
//! # Ok::<(), movedex::error::DexError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod dex;
pub mod engine;
pub mod error;
pub mod round;

pub use catalog::{Catalog, CatalogError};
pub use config::EngineConfig;
pub use dex::{DexSource, Generation, MemoryDex};
pub use engine::{Puzzle, UniquenessCheck};
pub use error::DexError;
pub use round::{Game, RoundError};
