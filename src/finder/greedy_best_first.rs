use super::HeuristicRef;
use crate::{Coord, CoordMap, CoordSet, CostQueue, NavGrid, Route};

/// Greedy best-first search: expands purely by `f = h`, ignoring path cost.
/// Fast and non-optimal.
pub(crate) fn find_greedy_best_first(
    grid: &NavGrid,
    start: Coord,
    goal: Coord,
    heuristic_fn: HeuristicRef,
    max_retry: i32,
    debug_mode: bool,
) -> Route {
    let mut route = Route::new();
    let mut open = CostQueue::new();
    let mut visited = CoordSet::default();
    let mut came_from: CoordMap<Coord> = CoordMap::default();

    open.push(heuristic_fn(start, goal), start);
    visited.insert(start);
    if debug_mode {
        route.add_visited(start);
    }

    let mut found = false;
    let mut last = start;
    let mut retry = 0;

    while !open.is_empty() && retry < max_retry {
        retry += 1;
        let Some(current) = open.pop() else {
            break;
        };
        if current == goal {
            found = true;
            last = current;
            break;
        }

        for next in grid.neighbors(current.x, current.y) {
            if visited.insert(next) {
                came_from.insert(next, current);
                open.push(heuristic_fn(next, goal), next);
                if debug_mode {
                    route.add_visited(next);
                }
            }
        }
        last = current;
    }

    let reconstructed = route.reconstruct(&came_from, start, last);
    route.set_success(reconstructed && found);
    route.set_cost(route.len().saturating_sub(1) as f32);
    route.set_total_retry_count(retry);
    route
}
