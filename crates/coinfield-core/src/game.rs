//! The game session controller.
//!
//! [`GameSession`] is the one explicitly owned object behind a running game.
//! It holds the board, the cache generator, the session state, and the
//! storage slot, and turns player events (move, collect, deposit, erase)
//! into mutations of that state.
//!
//! Every operation runs to completion before the next one starts; there is
//! no shared state and no locking. Player-input rejections are checked
//! before anything is mutated, so a rejected request leaves the session
//! exactly as it was.
//!
//! # Registry lifetime
//!
//! The board's canonical-cell registry is anchored at the cell where it was
//! last cleared. Walking more than `registry_reset_distance` cells away from
//! the anchor, teleporting via [`GameSession::relocate`], or erasing the
//! save clears it.

use coinfield_types::{CacheView, CellCoord, Coin, Direction, LatLng};
use coinfield_world::{Board, Cache, CacheGenerator, Luck};
use tracing::{debug, info, warn};

use crate::config::{GameConfig, WorldConfig};
use crate::error::GameError;
use crate::session::SessionState;
use crate::storage::KeyValueStore;

/// A running game: world engine, session state, and save slot.
#[derive(Debug)]
pub struct GameSession<L, S> {
    world: WorldConfig,
    slot: String,
    board: Board,
    generator: CacheGenerator<L>,
    state: SessionState,
    store: S,
    /// Cell the registry was last cleared at.
    anchor: CellCoord,
}

impl<L: Luck, S: KeyValueStore> GameSession<L, S> {
    /// Start a game, restoring the saved session from `store` if there is a
    /// readable one.
    ///
    /// A storage read failure is logged and treated like an absent save.
    pub fn start(config: &GameConfig, luck: L, store: S) -> Self {
        let world = config.world.clone();
        let slot = config.storage.slot.clone();

        let blob = store.get(&slot).unwrap_or_else(|e| {
            warn!(error = %e, slot, "Could not read saved session");
            None
        });
        let mut state = SessionState::load(blob.as_deref(), world.start);

        let mut board = Board::new(world.tile_width);
        let anchor = board.cell_for_point(state.position).coord();
        let generator =
            CacheGenerator::new(luck, world.spawn_probability, world.max_coins_per_cache);

        // A cell without a cache has no memento slot.
        let orphaned = state.mementos.retain(|key| {
            CellCoord::from_key(key).is_some_and(|coord| generator.should_spawn(coord))
        });
        if !orphaned.is_empty() {
            warn!(?orphaned, "Dropping saved mementos for cells without a cache");
        }

        info!(
            lat = state.position.lat,
            lng = state.position.lng,
            cell = %anchor,
            inventory = state.inventory.len(),
            "Game session started"
        );

        Self {
            world,
            slot,
            board,
            generator,
            state,
            store,
            anchor,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every cache in the player's visible neighborhood, with its current
    /// coins, in row-major cell order.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::World`] if a stored memento is unreadable.
    pub fn visible_caches(&mut self) -> Result<Vec<CacheView>, GameError> {
        let cells = self
            .board
            .cells_near(self.state.position, self.world.visibility_radius);
        let mut views = Vec::new();
        for cell in cells {
            let coord = cell.coord();
            if !self.generator.should_spawn(coord) {
                continue;
            }
            let cache = self.state.mementos.resolve(coord, &self.generator)?;
            views.push(self.view(coord, cache));
        }
        debug!(
            visible = views.len(),
            known_cells = self.board.known_cell_count(),
            "Visible caches resolved"
        );
        Ok(views)
    }

    /// Coins carried by the player, in pickup order.
    pub fn inventory(&self) -> &[Coin] {
        &self.state.inventory
    }

    /// Current player position.
    pub const fn position(&self) -> LatLng {
        self.state.position
    }

    /// Every position the player has occupied, oldest first.
    pub fn path(&self) -> &[LatLng] {
        &self.state.path
    }

    /// The full session state.
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// The board and its canonical-cell registry.
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// The world settings in effect.
    pub const fn world(&self) -> &WorldConfig {
        &self.world
    }

    /// The storage backend.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Stop the game and hand back the storage backend, without flushing.
    pub fn into_store(self) -> S {
        self.store
    }

    // =========================================================================
    // Movement
    // =========================================================================

    /// Move the player one tile in `direction`. Returns the new position.
    pub fn step(&mut self, direction: Direction) -> LatLng {
        let (di, dj) = direction.unit();
        let w = self.world.tile_width;
        let from = self.state.position;
        let to = LatLng::new(
            from.lat + f64::from(di) * w,
            from.lng + f64::from(dj) * w,
        );
        self.state.record_move(to);

        let here = self.board.coord_for_point(to);
        let drift = here.chebyshev_distance(&self.anchor);
        if drift > u64::from(self.world.registry_reset_distance) {
            debug!(drift, cell = %here, "Player left registry neighborhood");
            self.board.reset();
            self.anchor = here;
        }
        to
    }

    /// Place the player at `point` (a geolocation fix or a teleport).
    ///
    /// Always clears the canonical-cell registry.
    pub fn relocate(&mut self, point: LatLng) {
        self.state.record_move(point);
        self.board.reset();
        self.anchor = self.board.coord_for_point(point);
        info!(lat = point.lat, lng = point.lng, cell = %self.anchor, "Player relocated");
    }

    // =========================================================================
    // Coin transfer
    // =========================================================================

    /// Move the coin at `coin_index` of the cache at `coord` into the
    /// player's inventory.
    ///
    /// Returns the cache after the withdrawal.
    ///
    /// # Errors
    ///
    /// Rejects with [`GameError::CellOutOfReach`], [`GameError::NoCacheAtCell`],
    /// or [`GameError::CoinIndexOutOfRange`] without mutating anything.
    pub fn collect(
        &mut self,
        coord: CellCoord,
        coin_index: usize,
    ) -> Result<CacheView, GameError> {
        let mut cache = self.reachable_cache(coord)?;
        let len = cache.len();
        let coin = cache
            .withdraw(coin_index)
            .ok_or(GameError::CoinIndexOutOfRange {
                coord,
                index: coin_index,
                len,
            })?;

        self.state.mementos.commit(&coord.key(), &cache)?;
        info!(cell = %coord, coin = %coin.id, "Coin collected");
        self.state.inventory.push(coin);
        Ok(self.view(coord, cache))
    }

    /// Move the inventory coin at `inventory_index` into the cache at `coord`.
    ///
    /// Returns the cache after the deposit.
    ///
    /// # Errors
    ///
    /// Rejects with [`GameError::EmptyInventory`],
    /// [`GameError::CellOutOfReach`], [`GameError::NoCacheAtCell`], or
    /// [`GameError::InventoryIndexOutOfRange`] without mutating anything.
    pub fn deposit(
        &mut self,
        coord: CellCoord,
        inventory_index: usize,
    ) -> Result<CacheView, GameError> {
        if self.state.inventory.is_empty() {
            return Err(GameError::EmptyInventory);
        }
        let mut cache = self.reachable_cache(coord)?;
        let coin = self
            .state
            .inventory
            .get(inventory_index)
            .cloned()
            .ok_or(GameError::InventoryIndexOutOfRange {
                index: inventory_index,
                len: self.state.inventory.len(),
            })?;

        let returned_home = coin.home() == Some(coord);
        cache.deposit(coin);
        self.state.mementos.commit(&coord.key(), &cache)?;
        let coin = self.state.inventory.remove(inventory_index);
        info!(cell = %coord, coin = %coin.id, returned_home, "Coin deposited");
        Ok(self.view(coord, cache))
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the session to the storage slot.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Serialization`] or [`GameError::Storage`]. The
    /// in-memory session is unaffected and stays authoritative; the previous
    /// save remains in the slot.
    pub fn flush(&mut self) -> Result<(), GameError> {
        let blob = self.state.serialize()?;
        self.store.set(&self.slot, &blob)?;
        info!(
            slot = self.slot,
            bytes = blob.len(),
            mementos = self.state.mementos.len(),
            "Session saved"
        );
        Ok(())
    }

    /// Discard the session and overwrite the save with a fresh one.
    ///
    /// # Errors
    ///
    /// Returns the [`GameSession::flush`] error; the in-memory session is
    /// reset regardless.
    pub fn erase(&mut self) -> Result<(), GameError> {
        self.state = SessionState::reset(self.world.start);
        self.board.reset();
        self.anchor = self.board.coord_for_point(self.state.position);
        info!("Session erased");
        self.flush()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Resolve the cache at `coord` after checking reach and spawn.
    fn reachable_cache(&mut self, coord: CellCoord) -> Result<Cache, GameError> {
        if !self
            .board
            .is_near(self.state.position, self.world.visibility_radius, coord)
        {
            return Err(GameError::CellOutOfReach(coord));
        }
        if !self.generator.should_spawn(coord) {
            return Err(GameError::NoCacheAtCell(coord));
        }
        let cell = self.board.cell_at(coord);
        Ok(self.state.mementos.resolve(cell.coord(), &self.generator)?)
    }

    fn view(&self, coord: CellCoord, cache: Cache) -> CacheView {
        CacheView {
            coord,
            bounds: self.board.bounds_of(coord),
            coins: cache.into_coins(),
        }
    }
}
