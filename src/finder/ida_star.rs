use super::{CostRef, HeuristicRef};
use crate::{Coord, CoordMap, CostQueue, NavGrid, Route};

/// Iterative-deepening A*: repeated cost-bounded searches, raising the
/// f-threshold to the smallest rejected value between iterations. The retry
/// cap spans all iterations.
pub(crate) fn find_ida_star(
    grid: &NavGrid,
    start: Coord,
    goal: Coord,
    cost_fn: CostRef,
    heuristic_fn: HeuristicRef,
    max_retry: i32,
    debug_mode: bool,
) -> Route {
    let mut route = Route::new();
    let mut threshold = heuristic_fn(start, goal);
    let mut retry = 0;

    loop {
        let mut next_threshold = f32::INFINITY;
        let mut open = CostQueue::new();
        let mut cost_so_far: CoordMap<f32> = CoordMap::default();
        let mut came_from: CoordMap<Coord> = CoordMap::default();

        cost_so_far.insert(start, 0.0);
        open.push(0.0, start);
        if debug_mode {
            route.add_visited(start);
        }

        let mut found = false;
        let mut best: Option<(Coord, f32)> = None;

        while !open.is_empty() && retry < max_retry {
            retry += 1;
            let Some(current) = open.pop() else {
                break;
            };

            let g = cost_so_far.get(&current).copied().unwrap_or(0.0);
            let f = g + heuristic_fn(current, goal);
            if f > threshold {
                if f < next_threshold {
                    next_threshold = f;
                }
                continue;
            }

            if best.map_or(true, |(_, bf)| f < bf) {
                best = Some((current, f));
            }
            if current == goal {
                found = true;
                break;
            }

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
        }

        if found {
            route.reconstruct(&came_from, start, goal);
            route.set_success(true);
            route.set_cost(cost_so_far.get(&goal).copied().unwrap_or(0.0));
            route.set_total_retry_count(retry);
            return route;
        }
        if let Some((best_coord, _)) = best {
            // Best-effort partial path from this iteration.
            route.reconstruct(&came_from, start, best_coord);
        }

        if next_threshold.is_infinite() || retry >= max_retry {
            break;
        }
        threshold = next_threshold;
    }

    route.set_success(false);
    route.set_total_retry_count(retry);
    route
}
