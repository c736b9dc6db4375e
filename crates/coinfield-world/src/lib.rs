//! The deterministic spatial cache engine for Coinfield.
//!
//! This crate models the grid world: canonical addressing of cells, the
//! pure decision of which cells hold a cache and what it starts with, and
//! the memento store that persists mutated caches without keeping every
//! cache resident.
//!
//! # Modules
//!
//! - [`board`] -- Point-to-cell addressing and the canonical-cell registry
//!   with generation-stamped handles.
//! - [`cache`] -- The mutable coin holding of a single cell.
//! - [`error`] -- Error types for memento encoding and decoding.
//! - [`generator`] -- Spawn decision and initial coin roll, as pure
//!   functions of the cell key.
//! - [`luck`] -- The deterministic hash collaborator and its SHA-256
//!   default.
//! - [`memento`] -- Versioned cache snapshots and the override store.

pub mod board;
pub mod cache;
pub mod error;
pub mod generator;
pub mod luck;
pub mod memento;

// Re-export primary types at crate root.
pub use board::{Board, Cell, CellId};
pub use cache::Cache;
pub use error::WorldError;
pub use generator::{CacheGenerator, generate, should_spawn};
pub use luck::{Luck, Sha256Luck};
pub use memento::{CacheMemento, MEMENTO_SCHEMA_VERSION, MementoStore};
