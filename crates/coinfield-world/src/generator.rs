//! Deterministic cache generation.
//!
//! Whether a cell holds a cache, and what that cache initially contains,
//! is a pure function of the cell's key and the [`Luck`] collaborator:
//!
//! - spawn: `luck("<i>,<j>") < spawn_probability`
//! - coin count: `ceil(luck("<i>,<j>:firstCoins") * max_coins_per_cache)`
//! - coin ids: `"<i>:<j>#0"` through `"<i>:<j>#<count - 1>"`
//!
//! Nothing about which cells have caches is ever stored; the world is
//! regenerated losslessly from coordinates. The generated cache is the
//! baseline that mementos override.

use coinfield_types::{CellCoord, Coin};

use crate::cache::Cache;
use crate::luck::Luck;

/// Suffix appended to the cell key to seed the initial coin count.
pub const FIRST_COINS_SUFFIX: &str = ":firstCoins";

/// Deterministic spawn decision for the cell at `coord`.
pub fn should_spawn<L: Luck + ?Sized>(
    luck: &L,
    coord: CellCoord,
    spawn_probability: f64,
) -> bool {
    luck.luck(&coord.key()) < spawn_probability
}

/// Number of coins a freshly generated cache at `coord` holds.
///
/// Never exceeds `max_coins_per_cache`, even for a misbehaving [`Luck`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn initial_coin_count<L: Luck + ?Sized>(
    luck: &L,
    coord: CellCoord,
    max_coins_per_cache: u32,
) -> u32 {
    let seed = format!("{}{FIRST_COINS_SUFFIX}", coord.key());
    let scaled = (luck.luck(&seed) * f64::from(max_coins_per_cache)).ceil();
    // Saturating cast: negative or NaN maps to 0.
    (scaled as u32).min(max_coins_per_cache)
}

/// The initial cache for the cell at `coord`.
///
/// Only meaningful for cells where [`should_spawn`] is true. Calling it twice
/// for the same cell yields identical coin sequences.
pub fn generate<L: Luck + ?Sized>(
    luck: &L,
    coord: CellCoord,
    max_coins_per_cache: u32,
) -> Cache {
    let count = initial_coin_count(luck, coord, max_coins_per_cache);
    let coins = (0..count).map(|serial| Coin::minted(coord, serial)).collect();
    Cache::from_coins(coins)
}

/// A [`Luck`] source bundled with the generation settings.
#[derive(Debug, Clone)]
pub struct CacheGenerator<L> {
    luck: L,
    spawn_probability: f64,
    max_coins_per_cache: u32,
}

impl<L: Luck> CacheGenerator<L> {
    /// Create a generator.
    pub const fn new(luck: L, spawn_probability: f64, max_coins_per_cache: u32) -> Self {
        Self {
            luck,
            spawn_probability,
            max_coins_per_cache,
        }
    }

    /// The configured spawn probability.
    pub const fn spawn_probability(&self) -> f64 {
        self.spawn_probability
    }

    /// The configured coin ceiling per cache.
    pub const fn max_coins_per_cache(&self) -> u32 {
        self.max_coins_per_cache
    }

    /// The underlying [`Luck`] source.
    pub const fn luck(&self) -> &L {
        &self.luck
    }

    /// Spawn decision using the configured probability.
    pub fn should_spawn(&self, coord: CellCoord) -> bool {
        should_spawn(&self.luck, coord, self.spawn_probability)
    }

    /// Initial cache using the configured coin ceiling.
    pub fn generate(&self, coord: CellCoord) -> Cache {
        generate(&self.luck, coord, self.max_coins_per_cache)
    }
}
