//! Geographic points, integer cell coordinates, and cell rectangles.
//!
//! Latitude and longitude are plain `f64` degrees. A [`CellCoord`] is the
//! pair of floor-divided indices produced by the board; it carries no
//! identity of its own -- canonical identity is issued by the board's
//! registry.

use core::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Create a point from latitude and longitude.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite numbers.
    pub const fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Integer grid coordinate of a cell: `i` indexes latitude, `j` longitude.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct CellCoord {
    /// Latitude index (`floor(lat / tile_width)`).
    #[ts(type = "number")]
    pub i: i64,
    /// Longitude index (`floor(lng / tile_width)`).
    #[ts(type = "number")]
    pub j: i64,
}

impl CellCoord {
    /// Create a coordinate from its two indices.
    pub const fn new(i: i64, j: i64) -> Self {
        Self { i, j }
    }

    /// The canonical string key for this cell, `"<i>,<j>"`.
    ///
    /// This key seeds the spawn decision and addresses the cell's memento.
    pub fn key(&self) -> String {
        format!("{},{}", self.i, self.j)
    }

    /// Parse a key produced by [`CellCoord::key`].
    pub fn from_key(key: &str) -> Option<Self> {
        let (i, j) = key.split_once(',')?;
        Some(Self::new(i.parse().ok()?, j.parse().ok()?))
    }

    /// The coordinate displaced by `(di, dj)`, saturating at the `i64` range.
    pub const fn offset(&self, di: i64, dj: i64) -> Self {
        Self {
            i: self.i.saturating_add(di),
            j: self.j.saturating_add(dj),
        }
    }

    /// Chebyshev (king-move) distance between two coordinates.
    pub const fn chebyshev_distance(&self, other: &Self) -> u64 {
        let di = self.i.abs_diff(other.i);
        let dj = self.j.abs_diff(other.j);
        if di > dj { di } else { dj }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

/// Axis-aligned geographic rectangle covered by one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellBounds {
    /// Minimum-latitude, minimum-longitude corner.
    pub south_west: LatLng,
    /// Maximum-latitude, maximum-longitude corner.
    pub north_east: LatLng,
}

impl CellBounds {
    /// Whether `point` lies inside the half-open rectangle
    /// `[south_west, north_east)`.
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat < self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng < self.north_east.lng
    }
}

/// One tile step on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// Increasing latitude.
    North,
    /// Decreasing latitude.
    South,
    /// Increasing longitude.
    East,
    /// Decreasing longitude.
    West,
}

impl Direction {
    /// Unit `(di, dj)` displacement of this direction in cell indices.
    pub const fn unit(self) -> (i8, i8) {
        match self {
            Self::North => (1, 0),
            Self::South => (-1, 0),
            Self::East => (0, 1),
            Self::West => (0, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_comma_separator() {
        assert_eq!(CellCoord::new(0, 0).key(), "0,0");
        assert_eq!(CellCoord::new(-3, 12).key(), "-3,12");
    }

    #[test]
    fn key_parses_back() {
        let coord = CellCoord::new(-3, 12);
        assert_eq!(CellCoord::from_key(&coord.key()), Some(coord));
        assert_eq!(CellCoord::from_key("3;4"), None);
        assert_eq!(CellCoord::from_key("a,1"), None);
    }

    #[test]
    fn chebyshev_distance_takes_larger_axis() {
        let a = CellCoord::new(0, 0);
        assert_eq!(a.chebyshev_distance(&CellCoord::new(3, -7)), 7);
        assert_eq!(a.chebyshev_distance(&a), 0);
    }

    #[test]
    fn offset_saturates() {
        let edge = CellCoord::new(i64::MAX, i64::MIN);
        assert_eq!(edge.offset(1, -1), edge);
    }

    #[test]
    fn bounds_are_half_open() {
        let bounds = CellBounds {
            south_west: LatLng::new(0.0, 0.0),
            north_east: LatLng::new(1.0, 1.0),
        };
        assert!(bounds.contains(LatLng::new(0.0, 0.5)));
        assert!(!bounds.contains(LatLng::new(1.0, 0.5)));
    }

    #[test]
    fn direction_serializes_lowercase() {
        let json = serde_json::to_string(&Direction::North).unwrap_or_default();
        assert_eq!(json, "\"north\"");
        assert_eq!(Direction::West.unit(), (0, -1));
    }
}
