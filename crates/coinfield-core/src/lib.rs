//! Session state, persistence, and the game controller for Coinfield.
//!
//! This crate sits on top of `coinfield-world` and owns everything that
//! outlives a single cache resolution: the player's inventory and path, the
//! memento store, the save slot, and the configuration that ties them
//! together.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with per-field defaults and
//!   validation.
//! - [`error`] -- [`GameError`], separating player-input rejections from
//!   internal failures.
//! - [`game`] -- [`GameSession`], the explicitly owned controller behind a
//!   running game.
//! - [`session`] -- [`SessionState`] and its persisted blob format.
//! - [`storage`] -- The string-keyed slot boundary with in-memory and
//!   file-backed stores.
//!
//! [`GameError`]: error::GameError
//! [`GameSession`]: game::GameSession
//! [`SessionState`]: session::SessionState

pub mod config;
pub mod error;
pub mod game;
pub mod session;
pub mod storage;

// Re-export primary types at crate root.
pub use config::{ConfigError, GameConfig, StorageConfig, WorldConfig};
pub use error::GameError;
pub use game::GameSession;
pub use session::{SESSION_SCHEMA_VERSION, SessionState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
