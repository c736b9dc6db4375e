//! Line-delimited JSON protocol between the engine and its UI collaborator.
//!
//! Each stdin line is one [`HostEvent`]; each event is answered with exactly
//! one [`HostReply`] line on stdout.
//!
//! | Event | Reply |
//! |-------|-------|
//! | `{"type":"look"}` | `caches` |
//! | `{"type":"step","direction":"north"}` | `caches` |
//! | `{"type":"locate","lat":..,"lng":..}` | `caches` |
//! | `{"type":"collect","i":..,"j":..,"index":..}` | `cache` or `rejected` |
//! | `{"type":"deposit","i":..,"j":..,"index":..}` | `cache` or `rejected` |
//! | `{"type":"erase"}` | `caches` |
//! | `{"type":"save"}` | `saved` or `rejected` |

use coinfield_core::{GameError, GameSession, KeyValueStore};
use coinfield_types::{CacheView, CellCoord, Coin, Direction, LatLng};
use coinfield_world::Luck;
use serde::{Deserialize, Serialize};

/// An event raised by the UI or geolocation collaborator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// Re-render request: report the visible caches.
    Look,
    /// Move one tile.
    Step {
        /// Direction of travel.
        direction: Direction,
    },
    /// A geolocation fix.
    Locate {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lng: f64,
    },
    /// Take coin `index` from the cache at cell `(i, j)`.
    Collect {
        /// Latitude index of the cell.
        i: i64,
        /// Longitude index of the cell.
        j: i64,
        /// Position of the coin in the cache.
        index: usize,
    },
    /// Put inventory coin `index` into the cache at cell `(i, j)`.
    Deposit {
        /// Latitude index of the cell.
        i: i64,
        /// Longitude index of the cell.
        j: i64,
        /// Position of the coin in the inventory.
        index: usize,
    },
    /// Erase the save and start over.
    Erase,
    /// Flush the session now.
    Save,
}

/// The engine's answer to one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostReply {
    /// Player position and every visible cache.
    Caches {
        /// Current player position.
        position: LatLng,
        /// Visible caches in cell order.
        caches: Vec<CacheView>,
    },
    /// One cache after a transfer, plus the updated inventory.
    Cache {
        /// The cache that changed.
        cache: CacheView,
        /// The player's inventory after the transfer.
        inventory: Vec<Coin>,
    },
    /// The event was not applied.
    Rejected {
        /// Human-readable reason.
        reason: String,
    },
    /// The session was written to storage.
    Saved,
}

impl HostReply {
    fn rejected(reason: impl ToString) -> Self {
        Self::Rejected {
            reason: reason.to_string(),
        }
    }
}

/// Decode and apply one input line.
pub fn handle_line<L: Luck, S: KeyValueStore>(
    game: &mut GameSession<L, S>,
    line: &str,
) -> HostReply {
    match serde_json::from_str::<HostEvent>(line) {
        Ok(event) => handle_event(game, event),
        Err(e) => {
            tracing::debug!(error = %e, "Malformed event line");
            HostReply::rejected(format!("malformed event: {e}"))
        }
    }
}

/// Apply one event to the game.
pub fn handle_event<L: Luck, S: KeyValueStore>(
    game: &mut GameSession<L, S>,
    event: HostEvent,
) -> HostReply {
    match event {
        HostEvent::Look => caches_reply(game),
        HostEvent::Step { direction } => {
            game.step(direction);
            caches_reply(game)
        }
        HostEvent::Locate { lat, lng } => {
            let point = LatLng::new(lat, lng);
            if !point.is_finite() {
                return HostReply::rejected("location must be finite");
            }
            game.relocate(point);
            caches_reply(game)
        }
        HostEvent::Collect { i, j, index } => {
            let result = game.collect(CellCoord::new(i, j), index);
            transfer_reply(game, result)
        }
        HostEvent::Deposit { i, j, index } => {
            let result = game.deposit(CellCoord::new(i, j), index);
            transfer_reply(game, result)
        }
        HostEvent::Erase => {
            if let Err(e) = game.erase() {
                tracing::warn!(error = %e, "Erased in memory but could not overwrite save");
            }
            caches_reply(game)
        }
        HostEvent::Save => match game.flush() {
            Ok(()) => HostReply::Saved,
            Err(e) => {
                tracing::warn!(error = %e, "Save failed");
                HostReply::rejected(e)
            }
        },
    }
}

fn caches_reply<L: Luck, S: KeyValueStore>(game: &mut GameSession<L, S>) -> HostReply {
    match game.visible_caches() {
        Ok(caches) => HostReply::Caches {
            position: game.position(),
            caches,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Could not resolve visible caches");
            HostReply::rejected(e)
        }
    }
}

fn transfer_reply<L: Luck, S: KeyValueStore>(
    game: &GameSession<L, S>,
    result: Result<CacheView, GameError>,
) -> HostReply {
    match result {
        Ok(cache) => HostReply::Cache {
            cache,
            inventory: game.inventory().to_vec(),
        },
        Err(e) => {
            if !e.is_rejection() {
                tracing::warn!(error = %e, "Transfer failed");
            }
            HostReply::rejected(e)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coinfield_core::{GameConfig, MemoryStore, StorageConfig, WorldConfig};

    use super::*;

    fn luck(seed: &str) -> f64 {
        match seed {
            "0,0" => 0.05,
            "0,0:firstCoins" => 0.41,
            _ => 0.99,
        }
    }

    fn game() -> GameSession<fn(&str) -> f64, MemoryStore> {
        let config = GameConfig {
            world: WorldConfig {
                tile_width: 1.0,
                visibility_radius: 1,
                spawn_probability: 0.1,
                max_coins_per_cache: 5,
                registry_reset_distance: 8,
                start: LatLng::new(0.5, 0.5),
            },
            storage: StorageConfig::default(),
        };
        GameSession::start(&config, luck as fn(&str) -> f64, MemoryStore::new())
    }

    #[test]
    fn events_decode_from_tagged_json() {
        let step: HostEvent =
            serde_json::from_str(r#"{"type":"step","direction":"south"}"#).unwrap();
        assert_eq!(step, HostEvent::Step { direction: Direction::South });

        let collect: HostEvent =
            serde_json::from_str(r#"{"type":"collect","i":-3,"j":4,"index":2}"#).unwrap();
        assert_eq!(collect, HostEvent::Collect { i: -3, j: 4, index: 2 });

        let save: HostEvent = serde_json::from_str(r#"{"type":"save"}"#).unwrap();
        assert_eq!(save, HostEvent::Save);
    }

    #[test]
    fn look_reports_visible_caches() {
        let mut game = game();
        let reply = handle_line(&mut game, r#"{"type":"look"}"#);
        let HostReply::Caches { position, caches } = reply else {
            panic!("expected caches reply, got {reply:?}");
        };
        assert_eq!(position, LatLng::new(0.5, 0.5));
        assert_eq!(caches.len(), 1);
    }

    #[test]
    fn collect_then_deposit_round_trip() {
        let mut game = game();
        let reply = handle_line(&mut game, r#"{"type":"collect","i":0,"j":0,"index":0}"#);
        let HostReply::Cache { cache, inventory } = reply else {
            panic!("expected cache reply, got {reply:?}");
        };
        assert_eq!(cache.coins.len(), 2);
        assert_eq!(inventory, vec![Coin::from_id("0:0#0")]);

        let reply = handle_line(&mut game, r#"{"type":"deposit","i":0,"j":0,"index":0}"#);
        let HostReply::Cache { cache, inventory } = reply else {
            panic!("expected cache reply, got {reply:?}");
        };
        assert_eq!(cache.coins.last(), Some(&Coin::from_id("0:0#0")));
        assert!(inventory.is_empty());
    }

    #[test]
    fn rejections_carry_reason() {
        let mut game = game();
        let reply = handle_line(&mut game, r#"{"type":"deposit","i":0,"j":0,"index":0}"#);
        assert_eq!(
            reply,
            HostReply::Rejected {
                reason: "no coins to deposit".to_owned()
            }
        );
    }

    #[test]
    fn malformed_line_is_rejected() {
        let mut game = game();
        let reply = handle_line(&mut game, "{\"type\":\"fly\"}");
        assert!(matches!(reply, HostReply::Rejected { .. }));
        assert!(game.inventory().is_empty());
    }

    #[test]
    fn save_writes_slot() {
        let mut game = game();
        assert_eq!(handle_line(&mut game, r#"{"type":"save"}"#), HostReply::Saved);
        assert!(game.store().get("gameState").unwrap().is_some());
    }

    #[test]
    fn replies_encode_with_type_tag() {
        let json = serde_json::to_string(&HostReply::Saved).unwrap();
        assert_eq!(json, r#"{"type":"saved"}"#);
    }
}
