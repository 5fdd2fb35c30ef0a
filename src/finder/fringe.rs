use super::{CostRef, HeuristicRef};
use crate::{Coord, CoordMap, CostQueue, NavGrid, Route};

/// Fringe search: expands nodes inside a threshold band `f ≤ threshold + δ`;
/// nodes above the band are deferred to the next sweep, and the threshold
/// rises to the smallest deferred f between sweeps.
#[allow(clippy::too_many_arguments)]
pub(crate) fn find_fringe_search(
    grid: &NavGrid,
    start: Coord,
    goal: Coord,
    cost_fn: CostRef,
    heuristic_fn: HeuristicRef,
    delta_epsilon: f32,
    max_retry: i32,
    debug_mode: bool,
) -> Route {
    let delta = if delta_epsilon > 0.0 { delta_epsilon } else { 0.5 };
    let mut threshold = heuristic_fn(start, goal);

    let mut route = Route::new();
    let mut open = CostQueue::new();
    let mut deferred = CostQueue::new();
    let mut cost_so_far: CoordMap<f32> = CoordMap::default();
    let mut came_from: CoordMap<Coord> = CoordMap::default();

    cost_so_far.insert(start, 0.0);
    open.push(threshold, start);
    if debug_mode {
        route.add_visited(start);
    }

    let mut found = false;
    let mut last = start;
    let mut retry = 0;

    while !open.is_empty() && retry < max_retry {
        let mut next_threshold = f32::INFINITY;
        let mut expanded = false;

        // One sweep over the current band.
        while retry < max_retry {
            let Some(current) = open.pop() else {
                break;
            };
            retry += 1;

            let g = cost_so_far.get(&current).copied().unwrap_or(0.0);
            let f = g + heuristic_fn(current, goal);
            if f > threshold + delta {
                if f < next_threshold {
                    next_threshold = f;
                }
                deferred.push(f, current);
                continue;
            }

            last = current;
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
                    open.push(new_cost + heuristic_fn(next, goal), next);
                    if debug_mode {
                        route.add_visited(next);
                    }
                    expanded = true;
                }
            }
        }

        std::mem::swap(&mut open, &mut deferred);
        deferred = CostQueue::new();

        if found || open.is_empty() || !expanded {
            break;
        }
        threshold = if next_threshold <= threshold + delta {
            threshold + 1.0
        } else {
            next_threshold
        };
    }

    let reconstructed = route.reconstruct(&came_from, start, last);
    route.set_success(reconstructed && found);
    route.set_cost(cost_so_far.get(&last).copied().unwrap_or(0.0));
    route.set_total_retry_count(retry);
    route
}
