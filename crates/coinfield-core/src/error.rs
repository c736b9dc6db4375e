//! Error types for the game controller.
//!
//! [`GameError`] separates recoverable player-input rejections (which never
//! mutate state) from internal failures in the world or storage layers.

use coinfield_types::CellCoord;
use coinfield_world::WorldError;

use crate::storage::StorageError;

/// Errors returned by [`GameSession`](crate::game::GameSession) operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The cell has no cache (its spawn decision is false).
    #[error("no cache at cell {0}")]
    NoCacheAtCell(CellCoord),

    /// The cell is outside the player's visible neighborhood.
    #[error("cell {0} is out of reach")]
    CellOutOfReach(CellCoord),

    /// The requested coin index does not exist in the cache.
    #[error("cache at {coord} has {len} coins, no coin at index {index}")]
    CoinIndexOutOfRange {
        /// The cell owning the cache.
        coord: CellCoord,
        /// The requested index.
        index: usize,
        /// Coins actually held.
        len: usize,
    },

    /// A deposit was requested while the inventory is empty.
    #[error("no coins to deposit")]
    EmptyInventory,

    /// The requested inventory index does not exist.
    #[error("inventory has {len} coins, no coin at index {index}")]
    InventoryIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Coins actually carried.
        len: usize,
    },

    /// A memento could not be read or written.
    #[error("world error: {0}")]
    World(#[from] WorldError),

    /// The storage slot could not be written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The session could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GameError {
    /// Whether this is a rejected player request rather than an internal
    /// failure.
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::NoCacheAtCell(_)
                | Self::CellOutOfReach(_)
                | Self::CoinIndexOutOfRange { .. }
                | Self::EmptyInventory
                | Self::InventoryIndexOutOfRange { .. }
        )
    }
}
