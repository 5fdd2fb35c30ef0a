use crate::{Coord, CoordList, NavGrid};
use std::sync::Arc;

/// Step cost callback: cost of moving `from → to` on `grid`. Must be
/// non-negative and `+∞` into blocked cells.
pub type CostFn = Arc<dyn Fn(&NavGrid, Coord, Coord) -> f32 + Send + Sync>;

/// Heuristic callback: estimated cost between two coords. Must be
/// non-negative; consistent heuristics yield optimal plans.
pub type HeuristicFn = Arc<dyn Fn(Coord, Coord) -> f32 + Send + Sync>;

/// Side-effecting hook called once per committed step of a drive loop.
pub type MoveFn = Box<dyn FnMut(Coord) + Send>;

/// Obstacle-change callback, called once per drive-loop step. It may mutate
/// the grid (the mutations are visible to `is_blocked` as soon as it
/// returns) and reports the cells whose blocked state changed since the
/// previous step; an empty list means "no change".
pub type ChangedFn = Box<dyn FnMut(&mut NavGrid) -> CoordList + Send>;

/// The one-shot finders' default cost: `1.0` between passable neighbors,
/// `+∞` into a blocked cell.
#[must_use]
pub fn unit_cost(grid: &NavGrid, _from: Coord, to: Coord) -> f32 {
    if grid.is_blocked(to.x, to.y) {
        f32::INFINITY
    } else {
        1.0
    }
}

/// The planner's default cost: Euclidean length of the step, `+∞` into a
/// blocked cell.
#[must_use]
pub fn dstar_cost(grid: &NavGrid, from: Coord, to: Coord) -> f32 {
    if grid.is_blocked(to.x, to.y) {
        f32::INFINITY
    } else {
        from.distance(to)
    }
}

#[must_use]
pub fn euclidean_heuristic(a: Coord, b: Coord) -> f32 {
    a.distance(b)
}

#[must_use]
pub fn manhattan_heuristic(a: Coord, b: Coord) -> f32 {
    a.manhattan_distance(b) as f32
}

/// The heuristic that turns A* into Dijkstra.
#[must_use]
pub fn zero_heuristic(_a: Coord, _b: Coord) -> f32 {
    0.0
}
