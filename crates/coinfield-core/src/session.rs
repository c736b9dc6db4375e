//! Session state: everything about one player's game that must survive a
//! restart.
//!
//! The persisted blob is JSON:
//!
//! ```text
//! {
//!   "version": 1,
//!   "inventory": [{"id": "0:0#1"}],
//!   "position": {"lat": 36.98967, "lng": -122.06283},
//!   "path": [{"lat": 36.98967, "lng": -122.06283}],
//!   "cache_mementos": [["0,0", "{\"version\":1,\"coins\":[\"0:0#0\"]}"]]
//! }
//! ```
//!
//! The memento mapping is flattened to an ordered array of
//! `[key, serialized memento]` pairs sorted by key, so the blob is a
//! deterministic function of the state.
//!
//! Loading never fails: an absent blob is a first run, and a blob that is
//! malformed, from another schema version, or carries a corrupt memento is
//! logged and replaced by a fresh session.

use coinfield_types::{Coin, LatLng};
use coinfield_world::MementoStore;
use serde::{Deserialize, Serialize};

/// Schema version of the session blob.
pub const SESSION_SCHEMA_VERSION: u32 = 1;

/// Player inventory, position, path, and cache mementos.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Coins carried by the player, in pickup order.
    pub inventory: Vec<Coin>,
    /// Current player position.
    pub position: LatLng,
    /// Every position the player has occupied, oldest first.
    pub path: Vec<LatLng>,
    /// Overrides for every cache the player has mutated.
    pub mementos: MementoStore,
}

/// Wire shape of the persisted blob.
#[derive(Debug, Serialize, Deserialize)]
struct SessionBlob {
    version: u32,
    inventory: Vec<Coin>,
    position: LatLng,
    path: Vec<LatLng>,
    cache_mementos: Vec<(String, String)>,
}

impl SessionState {
    /// A new game at `start`: empty inventory, single-point path, no mementos.
    pub fn initialize(start: LatLng) -> Self {
        Self {
            inventory: Vec::new(),
            position: start,
            path: vec![start],
            mementos: MementoStore::new(),
        }
    }

    /// Restore a session from a persisted blob, falling back to
    /// [`SessionState::initialize`] when the blob is absent or unusable.
    pub fn load(blob: Option<&str>, start: LatLng) -> Self {
        let Some(raw) = blob else {
            tracing::info!("No saved session, starting fresh");
            return Self::initialize(start);
        };

        match Self::decode(raw) {
            Ok(state) => {
                tracing::info!(
                    inventory = state.inventory.len(),
                    path_len = state.path.len(),
                    mementos = state.mementos.len(),
                    "Session restored"
                );
                state
            }
            Err(reason) => {
                tracing::warn!(%reason, "Discarding unreadable saved session, starting fresh");
                Self::initialize(start)
            }
        }
    }

    /// Encode this session as the persisted blob.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; with the types involved this only
    /// happens on allocation failure.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        let blob = SessionBlob {
            version: SESSION_SCHEMA_VERSION,
            inventory: self.inventory.clone(),
            position: self.position,
            path: self.path.clone(),
            cache_mementos: self.mementos.to_pairs(),
        };
        serde_json::to_string(&blob)
    }

    /// A fresh session, as for an explicit "erase save".
    pub fn reset(start: LatLng) -> Self {
        Self::initialize(start)
    }

    /// Move the player to `point`, recording it on the path.
    pub fn record_move(&mut self, point: LatLng) {
        self.position = point;
        self.path.push(point);
    }

    fn decode(raw: &str) -> Result<Self, String> {
        let blob: SessionBlob = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        if blob.version != SESSION_SCHEMA_VERSION {
            return Err(format!("unsupported session version {}", blob.version));
        }
        if !blob.position.is_finite() {
            return Err("non-finite player position".to_owned());
        }
        let mementos =
            MementoStore::from_pairs(blob.cache_mementos).map_err(|e| e.to_string())?;
        let mut path = blob.path;
        if path.is_empty() {
            path.push(blob.position);
        }
        Ok(Self {
            inventory: blob.inventory,
            position: blob.position,
            path,
            mementos,
        })
    }
}
