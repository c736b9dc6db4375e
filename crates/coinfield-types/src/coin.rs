//! Coins and the cache view handed to the rendering collaborator.
//!
//! A coin's identity is its id string `"<i>:<j>#<serial>"`: the home cell
//! it was minted in and its position in that cell's initial roll. The id
//! never changes as the coin moves between caches and inventories, so a
//! coin deposited back into its home cell is the same coin returning home.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::geo::{CellBounds, CellCoord};

/// An atomic, uniquely identified collectible token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coin {
    /// Globally unique id, `"<i>:<j>#<serial>"`.
    pub id: String,
}

impl Coin {
    /// Mint the coin with the given serial in the cell at `home`.
    pub fn minted(home: CellCoord, serial: u32) -> Self {
        Self {
            id: format!("{}:{}#{serial}", home.i, home.j),
        }
    }

    /// Rebuild a coin from a previously issued id.
    pub fn from_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The cell this coin was minted in, if the id is well formed.
    pub fn home(&self) -> Option<CellCoord> {
        self.parse().map(|(home, _)| home)
    }

    /// The serial this coin was minted with, if the id is well formed.
    pub fn serial(&self) -> Option<u32> {
        self.parse().map(|(_, serial)| serial)
    }

    fn parse(&self) -> Option<(CellCoord, u32)> {
        let (cell, serial) = self.id.split_once('#')?;
        let (i, j) = cell.split_once(':')?;
        Some((
            CellCoord::new(i.parse().ok()?, j.parse().ok()?),
            serial.parse().ok()?,
        ))
    }
}

/// Current content of one visible cache, as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CacheView {
    /// The cell that owns the cache.
    pub coord: CellCoord,
    /// Geographic rectangle of the cell.
    pub bounds: CellBounds,
    /// Coins currently held, in cache order.
    pub coins: Vec<Coin>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_id_format() {
        let coin = Coin::minted(CellCoord::new(369_896, -1_220_629), 4);
        assert_eq!(coin.id, "369896:-1220629#4");
    }

    #[test]
    fn home_and_serial_recovered_from_id() {
        let coin = Coin::minted(CellCoord::new(-2, 7), 3);
        assert_eq!(coin.home(), Some(CellCoord::new(-2, 7)));
        assert_eq!(coin.serial(), Some(3));
    }

    #[test]
    fn malformed_id_has_no_home() {
        assert_eq!(Coin::from_id("not-a-coin").home(), None);
        assert_eq!(Coin::from_id("1:2#x").serial(), None);
        assert_eq!(Coin::from_id("1;2#0").home(), None);
    }

    #[test]
    fn coin_serializes_as_id_record() {
        let json = serde_json::to_string(&Coin::from_id("0:0#1")).unwrap_or_default();
        assert_eq!(json, r##"{"id":"0:0#1"}"##);
    }
}
