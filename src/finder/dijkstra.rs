use super::CostRef;
use crate::{Coord, CoordMap, CostQueue, NavGrid, Route};

/// Uniform-cost search: A* with a zero heuristic, expanding strictly by g.
pub(crate) fn find_dijkstra(
    grid: &NavGrid,
    start: Coord,
    goal: Coord,
    cost_fn: CostRef,
    max_retry: i32,
    debug_mode: bool,
) -> Route {
    let mut route = Route::new();
    let mut open = CostQueue::new();
    let mut cost_so_far: CoordMap<f32> = CoordMap::default();
    let mut came_from: CoordMap<Coord> = CoordMap::default();

    cost_so_far.insert(start, 0.0);
    open.push(0.0, start);
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

        let g = cost_so_far.get(&current).copied().unwrap_or(0.0);
        for next in grid.neighbors(current.x, current.y) {
            let new_cost = g + cost_fn(grid, current, next);
            let known = cost_so_far.get(&next).copied();
            if known.map_or(true, |k| new_cost < k) {
                cost_so_far.insert(next, new_cost);
                came_from.insert(next, current);
                open.push(new_cost, next);
                if debug_mode {
                    route.add_visited(next);
                }
            }
        }
        last = current;
    }

    let reconstructed = route.reconstruct(&came_from, start, last);
    route.set_success(reconstructed && found);
    route.set_cost(cost_so_far.get(&last).copied().unwrap_or(0.0));
    route.set_total_retry_count(retry);
    route
}
