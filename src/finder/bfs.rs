use crate::{Coord, CoordMap, CoordSet, NavGrid, Route};
use std::collections::VecDeque;

/// Breadth-first search over passable neighbors; every step costs 1, so the
/// result minimizes step count.
pub(crate) fn find_bfs(
    grid: &NavGrid,
    start: Coord,
    goal: Coord,
    max_retry: i32,
    debug_mode: bool,
) -> Route {
    let mut route = Route::new();
    let mut frontier = VecDeque::new();
    let mut visited = CoordSet::default();
    let mut came_from: CoordMap<Coord> = CoordMap::default();

    frontier.push_back(start);
    visited.insert(start);
    if debug_mode {
        route.add_visited(start);
    }

    let mut found = false;
    let mut last = start;
    let mut retry = 0;

    while !frontier.is_empty() && retry < max_retry {
        retry += 1;
        let Some(current) = frontier.pop_front() else {
            break;
        };
        if current == goal {
            found = true;
            last = current;
            break;
        }

        for next in grid.neighbors(current.x, current.y) {
            if visited.insert(next) {
                frontier.push_back(next);
                came_from.insert(next, current);
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
