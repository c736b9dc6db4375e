//! Grid addressing: points to cells, and canonical cell identity.
//!
//! The plane is cut into square tiles of `tile_width` degrees. A point maps
//! to the cell `(floor(lat / w), floor(lng / w))`.
//!
//! # Canonical identity
//!
//! The [`Board`] keeps an arena-style registry of every cell requested since
//! the last [`Board::reset`]. The first request for a coordinate allocates a
//! slot; every later request for the same coordinate returns the same
//! [`CellId`]. Identity-sensitive callers compare [`CellId`]s, not
//! coordinates.
//!
//! Every `CellId` is stamped with the registry generation. Resetting bumps
//! the generation, so handles issued earlier no longer resolve and the same
//! coordinate is issued a fresh identity on its next request.

use std::collections::BTreeMap;

use coinfield_types::{CellBounds, CellCoord, LatLng};

/// Identity handle for a canonical cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId {
    index: u32,
    generation: u32,
}

impl CellId {
    /// Registry generation this handle was issued in.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// A canonical cell: its identity handle plus its coordinate.
///
/// Two `Cell`s are equal exactly when their handles are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    id: CellId,
    coord: CellCoord,
}

impl Cell {
    /// The identity handle.
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// The integer coordinate.
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }
}

/// Grid addressing and the known-cells registry.
#[derive(Debug, Clone)]
pub struct Board {
    tile_width: f64,
    generation: u32,
    /// Arena of registered coordinates, indexed by `CellId::index`.
    slots: Vec<CellCoord>,
    /// Coordinate to arena index.
    known: BTreeMap<CellCoord, u32>,
}

impl Board {
    /// Create an empty board with tiles of `tile_width` degrees.
    ///
    /// `tile_width` must be positive and finite; the configuration layer
    /// validates this before a board is built.
    pub const fn new(tile_width: f64) -> Self {
        Self {
            tile_width,
            generation: 0,
            slots: Vec::new(),
            known: BTreeMap::new(),
        }
    }

    /// Tile width in degrees.
    pub const fn tile_width(&self) -> f64 {
        self.tile_width
    }

    /// Current registry generation.
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of cells registered since the last reset.
    pub fn known_cell_count(&self) -> usize {
        self.slots.len()
    }

    /// The integer coordinate containing `point`, without registering it.
    #[allow(clippy::cast_possible_truncation)]
    pub fn coord_for_point(&self, point: LatLng) -> CellCoord {
        // Saturating float-to-int conversion; non-finite input is a caller
        // contract violation.
        CellCoord::new(
            (point.lat / self.tile_width).floor() as i64,
            (point.lng / self.tile_width).floor() as i64,
        )
    }

    /// The canonical cell containing `point`, registering it on first use.
    pub fn cell_for_point(&mut self, point: LatLng) -> Cell {
        let coord = self.coord_for_point(point);
        self.cell_at(coord)
    }

    /// The canonical cell for `coord`, registering it on first use.
    pub fn cell_at(&mut self, coord: CellCoord) -> Cell {
        let index = if let Some(&index) = self.known.get(&coord) {
            index
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(coord);
            self.known.insert(coord, index);
            index
        };
        Cell {
            id: CellId {
                index,
                generation: self.generation,
            },
            coord,
        }
    }

    /// Resolve a handle back to its coordinate.
    ///
    /// Returns `None` for handles issued before the last [`Board::reset`].
    pub fn coord_of(&self, id: CellId) -> Option<CellCoord> {
        if id.generation != self.generation {
            return None;
        }
        let index = usize::try_from(id.index).ok()?;
        self.slots.get(index).copied()
    }

    /// Geographic rectangle covered by `cell`.
    pub fn cell_bounds(&self, cell: &Cell) -> CellBounds {
        self.bounds_of(cell.coord)
    }

    /// Geographic rectangle covered by the cell at `coord`.
    pub fn bounds_of(&self, coord: CellCoord) -> CellBounds {
        let w = self.tile_width;
        let lat = edge(coord.i, w);
        let lng = edge(coord.j, w);
        CellBounds {
            south_west: LatLng::new(lat, lng),
            north_east: LatLng::new(lat + w, lng + w),
        }
    }

    /// All cells in the `2r x 2r` square around the cell containing `point`.
    ///
    /// Offsets run from `-radius` to `radius - 1` inclusive on both axes,
    /// row-major by `i` then `j`. The result always has `(2 * radius)^2`
    /// distinct cells.
    pub fn cells_near(&mut self, point: LatLng, radius: u32) -> Vec<Cell> {
        let origin = self.coord_for_point(point);
        let r = i64::from(radius);
        let mut cells = Vec::new();
        for di in r.saturating_neg()..r {
            for dj in r.saturating_neg()..r {
                cells.push(self.cell_at(origin.offset(di, dj)));
            }
        }
        cells
    }

    /// Whether `coord` falls inside the [`Board::cells_near`] square of
    /// `point` for `radius`.
    pub fn is_near(&self, point: LatLng, radius: u32, coord: CellCoord) -> bool {
        let origin = self.coord_for_point(point);
        let r = i64::from(radius);
        let within = |from: i64, to: i64| {
            to.checked_sub(from)
                .is_some_and(|d| d >= r.saturating_neg() && d < r)
        };
        within(origin.i, coord.i) && within(origin.j, coord.j)
    }

    /// Discard every canonical identity.
    pub fn reset(&mut self) {
        tracing::debug!(
            generation = self.generation,
            known_cells = self.slots.len(),
            "Resetting cell registry"
        );
        self.slots.clear();
        self.known.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Lower edge, in degrees, of the tile with index `index`.
#[allow(clippy::cast_precision_loss)]
fn edge(index: i64, tile_width: f64) -> f64 {
    index as f64 * tile_width
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    const TILE: f64 = 1e-4;

    #[test]
    fn points_in_same_tile_share_identity() {
        let mut board = Board::new(TILE);
        let a = board.cell_for_point(LatLng::new(36.989_671, -122.062_831));
        let b = board.cell_for_point(LatLng::new(36.989_699, -122.062_899));
        assert_eq!(a.coord(), b.coord());
        assert_eq!(a.id(), b.id());
        assert_eq!(board.known_cell_count(), 1);
    }

    #[test]
    fn floor_division_handles_negatives() {
        let board = Board::new(1.0);
        assert_eq!(
            board.coord_for_point(LatLng::new(-0.5, 2.5)),
            CellCoord::new(-1, 2)
        );
        assert_eq!(
            board.coord_for_point(LatLng::new(0.0, -2.0)),
            CellCoord::new(0, -2)
        );
    }

    #[test]
    fn distinct_tiles_have_distinct_identity() {
        let mut board = Board::new(1.0);
        let a = board.cell_for_point(LatLng::new(0.5, 0.5));
        let b = board.cell_for_point(LatLng::new(1.5, 0.5));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn bounds_span_one_tile() {
        let mut board = Board::new(0.5);
        let cell = board.cell_at(CellCoord::new(2, -3));
        let bounds = board.cell_bounds(&cell);
        assert_eq!(bounds.south_west, LatLng::new(1.0, -1.5));
        assert_eq!(bounds.north_east, LatLng::new(1.5, -1.0));
    }

    #[test]
    fn cells_near_covers_asymmetric_square() {
        let mut board = Board::new(1.0);
        let cells = board.cells_near(LatLng::new(0.5, 0.5), 2);
        assert_eq!(cells.len(), 16);

        let coords: Vec<CellCoord> = cells.iter().map(Cell::coord).collect();
        assert_eq!(coords.first(), Some(&CellCoord::new(-2, -2)));
        assert_eq!(coords.get(1), Some(&CellCoord::new(-2, -1)));
        assert_eq!(coords.last(), Some(&CellCoord::new(1, 1)));

        let distinct: BTreeSet<CellId> = cells.iter().map(Cell::id).collect();
        assert_eq!(distinct.len(), 16);
        for coord in &coords {
            assert!(coord.chebyshev_distance(&CellCoord::new(0, 0)) <= 2);
            assert!(coord.i < 2 && coord.j < 2);
        }
    }

    #[test]
    fn cells_near_is_stable_across_calls() {
        let mut board = Board::new(TILE);
        let point = LatLng::new(36.989_67, -122.062_83);
        let first = board.cells_near(point, 8);
        let second = board.cells_near(point, 8);
        assert_eq!(first, second);
        assert_eq!(first.len(), 256);
    }

    #[test]
    fn cells_near_zero_radius_is_empty() {
        let mut board = Board::new(1.0);
        assert!(board.cells_near(LatLng::new(0.0, 0.0), 0).is_empty());
    }

    #[test]
    fn is_near_matches_cells_near() {
        let mut board = Board::new(1.0);
        let point = LatLng::new(0.5, 0.5);
        let near: BTreeSet<CellCoord> =
            board.cells_near(point, 3).iter().map(Cell::coord).collect();
        for i in -5_i64..5 {
            for j in -5_i64..5 {
                let coord = CellCoord::new(i, j);
                assert_eq!(board.is_near(point, 3, coord), near.contains(&coord));
            }
        }
    }

    #[test]
    fn reset_invalidates_previous_handles() {
        let mut board = Board::new(1.0);
        let before = board.cell_at(CellCoord::new(4, 4));
        assert_eq!(board.coord_of(before.id()), Some(CellCoord::new(4, 4)));

        board.reset();
        assert_eq!(board.known_cell_count(), 0);
        assert_eq!(board.coord_of(before.id()), None);

        let after = board.cell_at(CellCoord::new(4, 4));
        assert_eq!(after.coord(), before.coord());
        assert_ne!(after.id(), before.id());
        assert_eq!(after.id().generation(), 1);
    }
}
