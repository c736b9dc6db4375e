//! Shared value types for the Coinfield grid world.
//!
//! These are the plain values that cross every boundary in the workspace:
//! the world engine, the persisted session blob, and the rendering
//! collaborator (which receives `TypeScript` bindings via `ts-rs`).
//!
//! # Modules
//!
//! - [`geo`] -- Geographic points, cell coordinates, cell rectangles, and
//!   movement directions.
//! - [`coin`] -- Coins and the per-cache view rendered by the UI.

pub mod coin;
pub mod geo;

// Re-export all public types at crate root for convenience.
pub use coin::{CacheView, Coin};
pub use geo::{CellBounds, CellCoord, Direction, LatLng};
