use super::{CostRef, HeuristicRef};
use crate::{Coord, CoordSet, NavGrid, Route};

/// Greedy rollout of `depth` steps from `from`, returning the accumulated
/// cost plus the terminal heuristic.
fn bounded_eval(
    grid: &NavGrid,
    from: Coord,
    goal: Coord,
    depth: i32,
    cost_fn: CostRef,
    heuristic_fn: HeuristicRef,
) -> f32 {
    let mut current = from;
    let mut g = 0.0;
    for _ in 0..depth {
        if current == goal {
            break;
        }
        let mut best: Option<(Coord, f32)> = None;
        for next in grid.neighbors(current.x, current.y) {
            let f = g + cost_fn(grid, current, next) + heuristic_fn(next, goal);
            if best.map_or(true, |(_, bf)| f < bf) {
                best = Some((next, f));
            }
        }
        let Some((next, _)) = best else {
            break;
        };
        g += cost_fn(grid, current, next);
        current = next;
    }
    g + heuristic_fn(current, goal)
}

/// Real-time A*: commits one step at a time, scoring each candidate with a
/// bounded-depth lookahead and never revisiting a committed cell. The route
/// is the actual motion, so it can dead-end against concave obstacles.
#[allow(clippy::too_many_arguments)]
pub(crate) fn find_rta_star(
    grid: &NavGrid,
    start: Coord,
    goal: Coord,
    cost_fn: CostRef,
    heuristic_fn: HeuristicRef,
    depth_limit: i32,
    max_retry: i32,
    debug_mode: bool,
) -> Route {
    let mut route = Route::new();
    let mut visited = CoordSet::default();

    let mut current = start;
    route.push(current);
    visited.insert(current);
    if debug_mode {
        route.add_visited(current);
    }

    let mut retry = 0;
    while current != goal && retry < max_retry {
        retry += 1;

        let mut best: Option<(Coord, f32)> = None;
        for next in grid.neighbors(current.x, current.y) {
            if visited.contains(&next) {
                continue;
            }
            let eval = cost_fn(grid, current, next)
                + bounded_eval(grid, next, goal, depth_limit - 1, cost_fn, heuristic_fn);
            if best.map_or(true, |(_, bf)| eval < bf) {
                best = Some((next, eval));
            }
        }
        let Some((next, _)) = best else {
            break;
        };

        route.add_cost(cost_fn(grid, current, next));
        current = next;
        route.push(current);
        visited.insert(current);
        if debug_mode {
            route.add_visited(current);
        }
    }

    route.set_success(current == goal);
    route.set_total_retry_count(retry);
    route
}
