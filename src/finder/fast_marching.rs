use super::CostRef;
use crate::{coord, Coord, CoordList, CoordMap, CostQueue, NavGrid, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FmmState {
    Narrow,
    Known,
}

#[derive(Debug, Clone, Copy)]
struct FmmCell {
    state: FmmState,
    value: f32,
}

/// The propagated arrival-time field, rooted at the propagation seed.
struct FmmField {
    cells: CoordMap<FmmCell>,
    visit_order: CoordList,
    total_retry_count: i32,
}

/// Propagate a cost front from `seed` with the Eikonal update
/// `T = min(a, b) + h` when `|a - b| ≥ h`, else
/// `(a + b + √(2h² − (a − b)²)) / 2`, where `a`/`b` are the smallest known
/// arrival times on the x/y axes and `h` the local step cost.
fn fmm_compute(
    grid: &NavGrid,
    seed: Coord,
    cost_fn: CostRef,
    radius_limit: f32,
    max_retry: i32,
) -> FmmField {
    let mut field = FmmField {
        cells: CoordMap::default(),
        visit_order: CoordList::new(),
        total_retry_count: 0,
    };
    let mut narrow_band = CostQueue::new();

    field.cells.insert(
        seed,
        FmmCell {
            state: FmmState::Narrow,
            value: 0.0,
        },
    );
    field.visit_order.push(seed);
    narrow_band.push(0.0, seed);

    let mut retry = 0;
    while !narrow_band.is_empty() && retry < max_retry {
        retry += 1;
        let Some(current) = narrow_band.pop() else {
            break;
        };

        let current_value = match field.cells.get_mut(&current) {
            Some(cell) => {
                cell.state = FmmState::Known;
                cell.value
            }
            None => continue,
        };
        if current_value > radius_limit {
            continue;
        }
        field.visit_order.push(current);

        for next in grid.neighbors(current.x, current.y) {
            if field
                .cells
                .get(&next)
                .is_some_and(|cell| cell.state == FmmState::Known)
            {
                continue;
            }

            let h = cost_fn(grid, current, next);
            if !h.is_finite() {
                continue;
            }

            let axis_min = |a: Coord, b: Coord| {
                let va = field.cells.get(&a).map_or(f32::INFINITY, |c| c.value);
                let vb = field.cells.get(&b).map_or(f32::INFINITY, |c| c.value);
                va.min(vb)
            };
            let a = axis_min(coord(next.x - 1, next.y), coord(next.x + 1, next.y));
            let b = axis_min(coord(next.x, next.y - 1), coord(next.x, next.y + 1));

            let t = if (a - b).abs() >= h || !a.is_finite() || !b.is_finite() {
                a.min(b) + h
            } else {
                (a + b + (2.0 * h * h - (a - b) * (a - b)).sqrt()) / 2.0
            };

            if t > radius_limit {
                continue;
            }
            let improves = field.cells.get(&next).map_or(true, |cell| t < cell.value);
            if improves {
                field.cells.insert(
                    next,
                    FmmCell {
                        state: FmmState::Narrow,
                        value: t,
                    },
                );
                narrow_band.push(t, next);
            }
        }
    }

    field.total_retry_count = retry;
    field
}

/// Fast marching: propagate the arrival-time field from the start, then
/// descend it from the goal back to the start.
pub(crate) fn find_fast_marching(
    grid: &NavGrid,
    start: Coord,
    goal: Coord,
    cost_fn: CostRef,
    max_retry: i32,
    debug_mode: bool,
) -> Route {
    let radius = start.distance(goal) * 1.5;
    let field = fmm_compute(grid, start, cost_fn, radius.max(1.0), max_retry);

    let mut route = Route::new();
    if debug_mode {
        for &c in &field.visit_order {
            route.add_visited(c);
        }
    }
    route.set_total_retry_count(field.total_retry_count);

    let Some(goal_cell) = field.cells.get(&goal) else {
        route.push(start);
        route.set_success(false);
        return route;
    };
    route.set_cost(goal_cell.value);

    // Gradient descent over arrival times; T strictly decreases toward the
    // seed, so the walk is bounded by the field size.
    let mut chain = vec![goal];
    let mut current = goal;
    let mut steps = 0;
    while current != start && steps < max_retry {
        steps += 1;
        let mut best: Option<(Coord, f32)> = None;
        for next in grid.neighbors(current.x, current.y) {
            let Some(cell) = field.cells.get(&next) else {
                continue;
            };
            if best.map_or(true, |(_, v)| cell.value < v) {
                best = Some((next, cell.value));
            }
        }
        let Some((next, _)) = best else {
            break;
        };
        chain.push(next);
        current = next;
    }

    if current != start {
        route.push(start);
        route.set_success(false);
        return route;
    }

    chain.reverse();
    for c in chain {
        route.push(c);
    }
    route.set_success(true);
    route
}
