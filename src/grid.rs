#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{coord, Coord, CoordList, CoordMap, CoordSet, NavCell};
use std::fmt;
use std::sync::Arc;

/// Neighbor connectivity of a grid.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DirMode {
    Dir4,
    #[default]
    Dir8,
}

/// Axial neighbor offsets, in the enumeration order callers may rely on.
const DIR4_OFFSETS: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Dir8 appends the diagonals to the axial offsets.
const DIR8_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (-1, 0),
    (1, 0),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Offsets sorted by bearing, used for nearest-bearing lookups.
/// Ties resolve to the earlier entry: E, NE, N, NW, W, SW, S, SE.
const BEARING8_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const BEARING4_OFFSETS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// The blocked-cell predicate a grid consults for passability.
///
/// `Terrain` is the built-in rule (a cell is blocked iff its terrain is
/// [crate::Terrain::Forbidden]); `Custom` injects an arbitrary predicate over
/// grid, which must be deterministic for a given grid snapshot.
#[derive(Clone)]
pub enum BlockedQuery {
    Terrain,
    Custom(Arc<dyn Fn(&NavGrid, i32, i32) -> bool + Send + Sync>),
}

impl Default for BlockedQuery {
    fn default() -> Self {
        BlockedQuery::Terrain
    }
}

impl fmt::Debug for BlockedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockedQuery::Terrain => f.write_str("BlockedQuery::Terrain"),
            BlockedQuery::Custom(_) => f.write_str("BlockedQuery::Custom(..)"),
        }
    }
}

/// A bounded or unbounded 2D navigation grid with per-cell terrain.
///
/// A width or height of `0` leaves that axis unbounded. Cells carry a
/// [NavCell]; positions without an explicit entry read as the default
/// (normal terrain).
#[derive(Debug, Clone)]
pub struct NavGrid {
    width: i32,
    height: i32,
    mode: DirMode,
    cells: CoordMap<NavCell>,
    blocked: BlockedQuery,
}

impl Default for NavGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl NavGrid {
    /// An unbounded Dir8 grid.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(0, 0, DirMode::Dir8)
    }

    /// A grid bounded to `[0, width) × [0, height)`; `0` leaves an axis
    /// unbounded.
    #[must_use]
    pub fn with_size(width: i32, height: i32, mode: DirMode) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
            mode,
            cells: CoordMap::default(),
            blocked: BlockedQuery::Terrain,
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> DirMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DirMode) {
        self.mode = mode;
    }

    /// Replace the blocked-cell predicate.
    pub fn set_blocked_query(&mut self, query: BlockedQuery) {
        self.blocked = query;
    }

    #[must_use]
    pub fn blocked_query(&self) -> &BlockedQuery {
        &self.blocked
    }

    /// Whether `(x, y)` lies inside the grid bounds. Always true on an
    /// unbounded axis.
    #[inline]
    #[must_use]
    pub fn is_inside(&self, x: i32, y: i32) -> bool {
        let x_ok = self.width == 0 || (x >= 0 && x < self.width);
        let y_ok = self.height == 0 || (y >= 0 && y < self.height);
        x_ok && y_ok
    }

    /// The cell at `(x, y)`, or the default cell when none was set.
    #[inline]
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> NavCell {
        self.cells.get(&coord(x, y)).copied().unwrap_or_default()
    }

    /// Set the cell at `(x, y)`. Returns false and makes no change when the
    /// position is out of bounds.
    pub fn set_cell(&mut self, x: i32, y: i32, cell: NavCell) -> bool {
        if !self.is_inside(x, y) {
            return false;
        }
        self.cells.insert(coord(x, y), cell);
        true
    }

    #[must_use]
    pub fn cells(&self) -> &CoordMap<NavCell> {
        &self.cells
    }

    /// Mark `(x, y)` forbidden. Returns false when out of bounds.
    pub fn block(&mut self, x: i32, y: i32) -> bool {
        self.set_cell(x, y, NavCell::forbidden())
    }

    /// Restore `(x, y)` to normal terrain. Returns false when out of bounds.
    pub fn unblock(&mut self, x: i32, y: i32) -> bool {
        self.set_cell(x, y, NavCell::default())
    }

    /// Whether `(x, y)` is impassable, per the injected query.
    #[must_use]
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        match &self.blocked {
            BlockedQuery::Terrain => self.cell(x, y).is_blocked(),
            BlockedQuery::Custom(query) => query(self, x, y),
        }
    }

    /// Drop every explicit cell entry.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    #[inline]
    fn offsets(&self) -> &'static [(i32, i32)] {
        match self.mode {
            DirMode::Dir4 => &DIR4_OFFSETS,
            DirMode::Dir8 => &DIR8_OFFSETS,
        }
    }

    /// In-bounds, passable neighbors of `(x, y)`. Empty when the origin is
    /// out of bounds.
    #[must_use]
    pub fn neighbors(&self, x: i32, y: i32) -> CoordList {
        if !self.is_inside(x, y) {
            return CoordList::new();
        }
        self.offsets()
            .iter()
            .map(|&(dx, dy)| (x + dx, y + dy))
            .filter(|&(nx, ny)| self.is_inside(nx, ny) && !self.is_blocked(nx, ny))
            .map(|(nx, ny)| coord(nx, ny))
            .collect()
    }

    /// All in-bounds neighbors of `(x, y)`, blocked or not. Empty when the
    /// origin is out of bounds.
    #[must_use]
    pub fn neighbors_all(&self, x: i32, y: i32) -> CoordList {
        if !self.is_inside(x, y) {
            return CoordList::new();
        }
        self.offsets()
            .iter()
            .map(|&(dx, dy)| (x + dx, y + dy))
            .filter(|&(nx, ny)| self.is_inside(nx, ny))
            .map(|(nx, ny)| coord(nx, ny))
            .collect()
    }

    /// All in-bounds cells within Chebyshev distance `range` of `(x, y)`,
    /// the origin included. `range = 0` yields just the origin (when inside).
    #[must_use]
    pub fn neighbors_all_range(&self, x: i32, y: i32, range: i32) -> CoordList {
        if range < 0 {
            return CoordList::new();
        }
        let mut seen = CoordSet::default();
        for dy in -range..=range {
            for dx in -range..=range {
                let (nx, ny) = (x + dx, y + dy);
                if self.is_inside(nx, ny) {
                    seen.insert(coord(nx, ny));
                }
            }
        }
        seen.into_iter().collect()
    }

    /// The in-bounds neighbor whose bearing from `(x, y)` is closest to
    /// `degree`. Ties resolve in the fixed order E, NE, N, NW, W, SW, S, SE.
    #[must_use]
    pub fn neighbor_at_degree(&self, x: i32, y: i32, degree: f64) -> Option<Coord> {
        let table: &[(i32, i32)] = match self.mode {
            DirMode::Dir4 => &BEARING4_OFFSETS,
            DirMode::Dir8 => &BEARING8_OFFSETS,
        };
        let origin = coord(x, y);
        let mut best = None;
        let mut min_diff = f64::INFINITY;
        for &(dx, dy) in table {
            let target = coord(x + dx, y + dy);
            if !self.is_inside(target.x, target.y) {
                continue;
            }
            let mut diff = (degree - origin.degree(target)).abs() % 360.0;
            if diff > 180.0 {
                diff = 360.0 - diff;
            }
            if diff < min_diff {
                min_diff = diff;
                best = Some(target);
            }
        }
        best
    }

    /// The in-bounds neighbor of `center` closest in bearing to the
    /// `center → goal` direction. `None` when `center == goal` or no
    /// neighbor exists.
    #[must_use]
    pub fn neighbor_toward(&self, center: Coord, goal: Coord) -> Option<Coord> {
        if center == goal {
            return None;
        }
        self.neighbor_at_degree(center.x, center.y, center.degree(goal))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Terrain;

    #[test]
    fn test_bounds() {
        let grid = NavGrid::with_size(10, 10, DirMode::Dir8);
        assert!(grid.is_inside(0, 0));
        assert!(grid.is_inside(9, 9));
        assert!(!grid.is_inside(10, 9));
        assert!(!grid.is_inside(-1, 0));
    }

    #[test]
    fn test_unbounded_axis() {
        let grid = NavGrid::with_size(0, 5, DirMode::Dir4);
        assert!(grid.is_inside(-1000, 4));
        assert!(grid.is_inside(1000, 0));
        assert!(!grid.is_inside(0, 5));
    }

    #[test]
    fn test_block_unblock() {
        let mut grid = NavGrid::with_size(10, 10, DirMode::Dir8);
        assert!(!grid.is_blocked(3, 3));
        assert!(grid.block(3, 3));
        assert!(grid.is_blocked(3, 3));
        assert_eq!(grid.cell(3, 3).terrain, Terrain::Forbidden);
        assert!(grid.unblock(3, 3));
        assert!(!grid.is_blocked(3, 3));
    }

    #[test]
    fn test_block_out_of_bounds_is_rejected() {
        let mut grid = NavGrid::with_size(10, 10, DirMode::Dir8);
        assert!(!grid.block(10, 0));
        assert!(!grid.block(0, -1));
        assert!(grid.cells().is_empty());
    }

    #[test]
    fn test_missing_cell_reads_as_default() {
        let grid = NavGrid::with_size(4, 4, DirMode::Dir8);
        assert_eq!(grid.cell(2, 2), NavCell::default());
    }

    #[test]
    fn test_neighbor_enumeration_order() {
        let grid = NavGrid::with_size(10, 10, DirMode::Dir8);
        assert_eq!(
            grid.neighbors_all(5, 5),
            vec![
                coord(5, 4),
                coord(4, 5),
                coord(6, 5),
                coord(5, 6),
                coord(4, 4),
                coord(4, 6),
                coord(6, 4),
                coord(6, 6),
            ]
        );

        let grid = NavGrid::with_size(10, 10, DirMode::Dir4);
        assert_eq!(
            grid.neighbors_all(5, 5),
            vec![coord(5, 4), coord(4, 5), coord(6, 5), coord(5, 6)]
        );
    }

    #[test]
    fn test_neighbors_respect_bounds_and_blocks() {
        let mut grid = NavGrid::with_size(10, 10, DirMode::Dir8);
        assert_eq!(grid.neighbors_all(0, 0).len(), 3);

        grid.block(1, 0);
        grid.block(1, 1);
        let passable = grid.neighbors(0, 0);
        assert_eq!(passable, vec![coord(0, 1)]);
    }

    #[test]
    fn test_neighbors_of_outside_origin_are_empty() {
        let grid = NavGrid::with_size(4, 4, DirMode::Dir8);
        assert!(grid.neighbors(-1, 0).is_empty());
        assert!(grid.neighbors_all(4, 4).is_empty());
    }

    #[test]
    fn test_neighbors_all_range() {
        let grid = NavGrid::with_size(10, 10, DirMode::Dir8);
        assert_eq!(grid.neighbors_all_range(5, 5, 1).len(), 9);
        assert_eq!(grid.neighbors_all_range(0, 0, 1).len(), 4);
        assert_eq!(grid.neighbors_all_range(5, 5, 0), vec![coord(5, 5)]);
        assert_eq!(grid.neighbors_all_range(5, 5, 2).len(), 25);
    }

    #[test]
    fn test_neighbor_at_degree() {
        let grid = NavGrid::with_size(10, 10, DirMode::Dir8);
        assert_eq!(grid.neighbor_at_degree(5, 5, 0.0), Some(coord(6, 5)));
        assert_eq!(grid.neighbor_at_degree(5, 5, 90.0), Some(coord(5, 6)));
        assert_eq!(grid.neighbor_at_degree(5, 5, 180.0), Some(coord(4, 5)));
        assert_eq!(grid.neighbor_at_degree(5, 5, 270.0), Some(coord(5, 4)));
        assert_eq!(grid.neighbor_at_degree(5, 5, 40.0), Some(coord(6, 6)));
    }

    #[test]
    fn test_neighbor_at_degree_tie_prefers_static_order() {
        let grid = NavGrid::with_size(10, 10, DirMode::Dir8);
        // 22.5° sits exactly between E (0°) and NE (45°); E wins the tie.
        assert_eq!(grid.neighbor_at_degree(5, 5, 22.5), Some(coord(6, 5)));
    }

    #[test]
    fn test_neighbor_toward() {
        let grid = NavGrid::with_size(10, 10, DirMode::Dir8);
        assert_eq!(grid.neighbor_toward(coord(0, 0), coord(9, 9)), Some(coord(1, 1)));
        assert_eq!(grid.neighbor_toward(coord(5, 5), coord(5, 0)), Some(coord(5, 4)));
        assert_eq!(grid.neighbor_toward(coord(5, 5), coord(5, 5)), None);
    }

    #[test]
    fn test_custom_blocked_query() {
        let mut grid = NavGrid::with_size(10, 10, DirMode::Dir8);
        grid.set_blocked_query(BlockedQuery::Custom(Arc::new(|_, x, y| x == y)));
        assert!(grid.is_blocked(3, 3));
        assert!(!grid.is_blocked(3, 4));
        // Terrain entries are ignored while a custom query is installed.
        grid.block(2, 5);
        assert!(!grid.is_blocked(2, 5));
    }
}
