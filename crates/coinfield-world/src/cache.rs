//! The mutable coin holding owned by one cell.

use coinfield_types::Coin;

/// Coins held by the cache of a single spawn-eligible cell.
///
/// A `Cache` is only authoritative while resident. Callers that mutate it
/// must commit it back to the memento store, otherwise the next resolve of
/// the cell returns the previous state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cache {
    coins_held: Vec<Coin>,
}

impl Cache {
    /// Create a cache holding `coins`, in order.
    pub const fn from_coins(coins: Vec<Coin>) -> Self {
        Self { coins_held: coins }
    }

    /// Coins currently held, in cache order.
    pub fn coins(&self) -> &[Coin] {
        &self.coins_held
    }

    /// Consume the cache, returning its coins.
    pub fn into_coins(self) -> Vec<Coin> {
        self.coins_held
    }

    /// Number of coins held.
    pub fn len(&self) -> usize {
        self.coins_held.len()
    }

    /// Whether the cache holds no coins.
    pub fn is_empty(&self) -> bool {
        self.coins_held.is_empty()
    }

    /// Remove and return the coin at `index`, preserving the order of the rest.
    ///
    /// Returns `None` (and leaves the cache untouched) when `index` is out
    /// of range.
    pub fn withdraw(&mut self, index: usize) -> Option<Coin> {
        if index < self.coins_held.len() {
            Some(self.coins_held.remove(index))
        } else {
            None
        }
    }

    /// Append `coin` to the end of the cache.
    pub fn deposit(&mut self, coin: Coin) {
        self.coins_held.push(coin);
    }
}
