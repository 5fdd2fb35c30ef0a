use crate::{
    cost_of, dstar_cost, euclidean_heuristic, ChangedFn, Coord, CoordMap, CostFn, Frontier,
    HeuristicFn, Key, MoveFn, NavGrid, Route,
};
use log::{debug, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A cloneable cancellation handle for [DStarLite::find_loop].
///
/// Level-triggered: while cancelled, the drive loop exits at the next step
/// boundary; clearing it re-arms the loop for a later call.
#[derive(Debug, Default, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Retry caps, the counters observing the last run, and the cancellation
/// signal of one planner instance.
///
/// Caps default to values derived from the start/goal deltas and can be
/// overridden; a non-positive cap is rejected and the previous value kept.
#[derive(Debug, Clone)]
pub struct LoopControl {
    compute_max_retry: i32,
    reconstruct_max_retry: i32,
    real_loop_max_retry: i32,
    proto_compute_retry_count: i32,
    real_compute_retry_count: i32,
    reconstruct_retry_count: i32,
    real_loop_retry_count: i32,
    cancel: CancelToken,
}

impl LoopControl {
    /// Caps derived from the planning distance between `start` and `goal`.
    #[must_use]
    pub fn derive(start: Coord, goal: Coord) -> Self {
        let dx = (goal.x - start.x).abs();
        let dy = (goal.y - start.y).abs();
        Self {
            compute_max_retry: (8 * dx * dy).max(64),
            reconstruct_max_retry: (2 * (dx + dy)).max(16),
            real_loop_max_retry: (dx * dy).max(32),
            proto_compute_retry_count: 0,
            real_compute_retry_count: 0,
            reconstruct_retry_count: 0,
            real_loop_retry_count: 0,
            cancel: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn compute_max_retry(&self) -> i32 {
        self.compute_max_retry
    }

    #[must_use]
    pub fn reconstruct_max_retry(&self) -> i32 {
        self.reconstruct_max_retry
    }

    #[must_use]
    pub fn real_loop_max_retry(&self) -> i32 {
        self.real_loop_max_retry
    }

    /// Iterations of the last start-phase compute.
    #[must_use]
    pub fn proto_compute_retry_count(&self) -> i32 {
        self.proto_compute_retry_count
    }

    /// Iterations of the last replanning compute.
    #[must_use]
    pub fn real_compute_retry_count(&self) -> i32 {
        self.real_compute_retry_count
    }

    #[must_use]
    pub fn reconstruct_retry_count(&self) -> i32 {
        self.reconstruct_retry_count
    }

    #[must_use]
    pub fn real_loop_retry_count(&self) -> i32 {
        self.real_loop_retry_count
    }

    fn reset_counters(&mut self) {
        self.proto_compute_retry_count = 0;
        self.real_compute_retry_count = 0;
        self.reconstruct_retry_count = 0;
        self.real_loop_retry_count = 0;
    }

    fn set_cap(slot: &mut i32, value: i32) -> bool {
        if value <= 0 {
            return false;
        }
        *slot = value;
        true
    }
}

/// The D* Lite incremental planner.
///
/// The instance owns its grid, the g/rhs estimate tables, the frontier, and
/// the proto/real routes. A client plans once with [DStarLite::find], or
/// plans with [DStarLite::find_proto] and then drives an agent with
/// [DStarLite::find_loop] while feeding obstacle changes through the
/// changed-cells callback; single cells edited between plans are folded in
/// with [DStarLite::update_vertex_range] plus
/// [DStarLite::compute_shortest_path].
pub struct DStarLite {
    grid: NavGrid,
    start: Coord,
    goal: Coord,
    km: f32,
    g: CoordMap<f32>,
    rhs: CoordMap<f32>,
    frontier: Frontier,
    cost_fn: CostFn,
    heuristic_fn: HeuristicFn,
    move_fn: Option<MoveFn>,
    changed_fn: Option<ChangedFn>,
    interval: Duration,
    max_range: i32,
    control: LoopControl,
    proto_route: Route,
    real_route: Option<Route>,
    debug_mode: bool,
    update_count: CoordMap<i32>,
}

impl DStarLite {
    /// A planner over `grid` with the default cost (Euclidean step length,
    /// `+∞` into blocked cells) and heuristic (Euclidean distance).
    #[must_use]
    pub fn new(grid: NavGrid, start: Coord, goal: Coord) -> Self {
        let mut dsl = Self {
            grid,
            start,
            goal,
            km: 0.0,
            g: CoordMap::default(),
            rhs: CoordMap::default(),
            frontier: Frontier::new(),
            cost_fn: Arc::new(dstar_cost),
            heuristic_fn: Arc::new(euclidean_heuristic),
            move_fn: None,
            changed_fn: None,
            interval: Duration::ZERO,
            max_range: 1,
            control: LoopControl::derive(start, goal),
            proto_route: Route::new(),
            real_route: None,
            debug_mode: false,
            update_count: CoordMap::default(),
        };
        dsl.init();
        dsl
    }

    #[must_use]
    pub fn grid(&self) -> &NavGrid {
        &self.grid
    }

    /// The grid is written by the client between plans; the planner only
    /// reads it.
    pub fn grid_mut(&mut self) -> &mut NavGrid {
        &mut self.grid
    }

    #[must_use]
    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn set_start(&mut self, start: Coord) {
        self.start = start;
    }

    #[must_use]
    pub fn goal(&self) -> Coord {
        self.goal
    }

    pub fn set_goal(&mut self, goal: Coord) {
        self.goal = goal;
    }

    #[must_use]
    pub fn km(&self) -> f32 {
        self.km
    }

    #[must_use]
    pub fn max_range(&self) -> i32 {
        self.max_range
    }

    /// Chebyshev radius used when the drive loop widens a changed-cell
    /// update. Negative values are rejected.
    pub fn set_max_range(&mut self, range: i32) -> bool {
        if range < 0 {
            return false;
        }
        self.max_range = range;
        true
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Per-step delay of the drive loop; zero yields instead of sleeping.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn set_cost_fn(&mut self, cost_fn: CostFn) {
        self.cost_fn = cost_fn;
    }

    pub fn set_heuristic_fn(&mut self, heuristic_fn: HeuristicFn) {
        self.heuristic_fn = heuristic_fn;
    }

    pub fn set_move_fn(&mut self, move_fn: Option<MoveFn>) {
        self.move_fn = move_fn;
    }

    pub fn set_changed_fn(&mut self, changed_fn: Option<ChangedFn>) {
        self.changed_fn = changed_fn;
    }

    #[must_use]
    pub fn debug_mode_enabled(&self) -> bool {
        self.debug_mode
    }

    /// Debug mode records every vertex update into the update-count table
    /// and the proto route's visited log.
    pub fn set_debug_mode_enabled(&mut self, enabled: bool) {
        self.debug_mode = enabled;
    }

    #[must_use]
    pub fn control(&self) -> &LoopControl {
        &self.control
    }

    pub fn set_compute_max_retry(&mut self, value: i32) -> bool {
        LoopControl::set_cap(&mut self.control.compute_max_retry, value)
    }

    pub fn set_reconstruct_max_retry(&mut self, value: i32) -> bool {
        LoopControl::set_cap(&mut self.control.reconstruct_max_retry, value)
    }

    pub fn set_real_loop_max_retry(&mut self, value: i32) -> bool {
        LoopControl::set_cap(&mut self.control.real_loop_max_retry, value)
    }

    /// A handle that cancels a running [DStarLite::find_loop] from another
    /// thread.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.control.cancel.clone()
    }

    /// The g estimate of `c`; `+∞` when untouched.
    #[must_use]
    pub fn g_of(&self, c: Coord) -> f32 {
        cost_of(&self.g, c)
    }

    /// The one-step lookahead estimate of `c`; `+∞` when untouched.
    #[must_use]
    pub fn rhs_of(&self, c: Coord) -> f32 {
        cost_of(&self.rhs, c)
    }

    #[must_use]
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    #[must_use]
    pub fn proto_route(&self) -> &Route {
        &self.proto_route
    }

    #[must_use]
    pub fn real_route(&self) -> Option<&Route> {
        self.real_route.as_ref()
    }

    /// How many times `c` was updated since the last reset (debug mode).
    #[must_use]
    pub fn update_count_of(&self, c: Coord) -> i32 {
        self.update_count.get(&c).copied().unwrap_or(0)
    }

    fn cost_at(&self, from: Coord, to: Coord) -> f32 {
        let cost = (self.cost_fn)(&self.grid, from, to);
        if cost < 0.0 {
            warn!("cost callback returned {cost} for {from} -> {to}; clamping to 0");
            return 0.0;
        }
        cost
    }

    /// The frontier priority of `s`:
    /// `(min(g, rhs) + h(start, s) + km, min(g, rhs))`.
    #[must_use]
    pub fn calculate_key(&self, s: Coord) -> Key {
        let k2 = self.g_of(s).min(self.rhs_of(s));
        let h = (self.heuristic_fn)(self.start, s);
        Key::new(k2 + h + self.km, k2)
    }

    /// Seed the search: zero bias, `rhs(goal) = 0`, goal on the frontier.
    fn init(&mut self) {
        self.km = 0.0;
        self.rhs.insert(self.goal, 0.0);
        let key = self.calculate_key(self.goal);
        self.frontier.push(key, self.goal);
    }

    /// Drop all derived state (estimate tables, frontier, routes, counters)
    /// and re-seed. Start, goal, callbacks, and caps survive.
    pub fn reset(&mut self) {
        self.g.clear();
        self.rhs.clear();
        self.frontier.clear();
        self.proto_route = Route::new();
        self.real_route = None;
        self.update_count.clear();
        self.control.reset_counters();
        self.init();
    }

    /// Reconcile `u` after an edge or estimate change: recompute its
    /// lookahead over all neighbors, then queue it iff locally inconsistent.
    pub fn update_vertex(&mut self, u: Coord) {
        if self.debug_mode {
            *self.update_count.entry(u).or_insert(0) += 1;
            self.proto_route.add_visited(u);
        }

        if u != self.goal {
            let mut min_rhs = f32::INFINITY;
            for s in self.grid.neighbors_all(u.x, u.y) {
                let total = self.cost_at(u, s) + self.g_of(s);
                if total < min_rhs {
                    min_rhs = total;
                }
            }
            self.rhs.insert(u, min_rhs);
        }

        self.frontier.remove(u);

        let g_u = self.g_of(u);
        let rhs_u = self.rhs_of(u);
        if g_u != rhs_u {
            let key = self.calculate_key(u);
            trace!("queue {u} g={g_u} rhs={rhs_u} key=({}, {})", key.k1, key.k2);
            self.frontier.push(key, u);
        }
    }

    /// [DStarLite::update_vertex] over every cell within Chebyshev distance
    /// `range` of `s`. A range below 1 updates only `s`. Used when a terrain
    /// edit can affect costs beyond the edited cell.
    pub fn update_vertex_range(&mut self, s: Coord, range: i32) {
        if range < 1 {
            self.update_vertex(s);
            return;
        }
        for c in self.grid.neighbors_all_range(s.x, s.y, range) {
            self.update_vertex(c);
        }
    }

    /// [DStarLite::update_vertex_range] with the instance's `max_range`.
    pub fn update_vertex_auto_range(&mut self, s: Coord) {
        self.update_vertex_range(s, self.max_range);
    }

    /// Update every coord of `route`.
    pub fn update_vertex_by_route(&mut self, route: &Route) {
        for &c in route.coords() {
            self.update_vertex(c);
        }
    }

    /// Reconcile the frontier until the start cell is locally consistent and
    /// no queued key undercuts it, the frontier drains, or the compute cap
    /// is hit. Iterations land in the proto or replanning counter depending
    /// on whether a proto route exists yet.
    pub fn compute_shortest_path(&mut self) {
        let proto_phase = self.proto_route.is_empty();
        let mut loops = 0;

        while loops < self.control.compute_max_retry {
            let Some(k_old) = self.frontier.top_key() else {
                break;
            };
            let start_key = self.calculate_key(self.start);
            if k_old >= start_key && self.rhs_of(self.start) == self.g_of(self.start) {
                break;
            }
            loops += 1;

            let Some(u) = self.frontier.pop() else {
                break;
            };
            let k_new = self.calculate_key(u);
            if k_old < k_new {
                // The key went stale while u sat queued.
                self.frontier.push(k_new, u);
                continue;
            }

            let g_u = self.g_of(u);
            let rhs_u = self.rhs_of(u);
            if g_u > rhs_u {
                // Overconsistent: the estimate improves to the lookahead.
                self.g.insert(u, rhs_u);
                for s in self.grid.neighbors_all(u.x, u.y) {
                    self.update_vertex(s);
                }
            } else {
                // Underconsistent: invalidate and re-derive u with its
                // neighborhood.
                self.g.insert(u, f32::INFINITY);
                let mut cells = self.grid.neighbors_all(u.x, u.y);
                cells.push(u);
                for s in cells {
                    self.update_vertex(s);
                }
            }
        }

        if proto_phase {
            self.control.proto_compute_retry_count = loops;
        } else {
            self.control.real_compute_retry_count = loops;
        }
        debug!(
            "compute_shortest_path: {loops} iterations, frontier {} entries, g(start)={}",
            self.frontier.len(),
            self.g_of(self.start)
        );
    }

    /// The neighbor of `current` minimizing `cost + g`, with its step cost.
    /// `None` when every candidate is unreachable.
    fn fetch_next(&self, current: Coord) -> Option<(Coord, f32)> {
        let mut best: Option<(Coord, f32, f32)> = None;
        for s in self.grid.neighbors_all(current.x, current.y) {
            let step = self.cost_at(current, s);
            let total = step + self.g_of(s);
            if best.map_or(true, |(_, t, _)| total < t) {
                best = Some((s, total, step));
            }
        }
        let (next, total, step) = best?;
        total.is_finite().then_some((next, step))
    }

    /// Extract the proto route by greedy descent of `cost + g` from the
    /// start. Partial on cap hit, failed when the start (or any step) has no
    /// finite estimate.
    pub fn reconstruct_route(&mut self) -> bool {
        self.proto_route.clear_coords();
        self.proto_route.set_cost(0.0);
        self.proto_route.push(self.start);
        self.proto_route
            .set_total_retry_count(self.control.proto_compute_retry_count);

        if !self.g_of(self.start).is_finite() {
            self.proto_route.set_success(false);
            return false;
        }

        let mut current = self.start;
        let mut loops = 0;
        while current != self.goal && loops < self.control.reconstruct_max_retry {
            loops += 1;
            let Some((next, step)) = self.fetch_next(current) else {
                self.control.reconstruct_retry_count = loops;
                self.proto_route.set_success(false);
                return false;
            };
            self.proto_route.add_cost(step);
            self.proto_route.push(next);
            current = next;
        }

        self.control.reconstruct_retry_count = loops;
        let success = current == self.goal;
        self.proto_route.set_success(success);
        success
    }

    /// One-shot shortest path: rebuild state, converge, extract. The
    /// returned route reports failure in-band (`success == false` with a
    /// start-only or partial path).
    pub fn find(&mut self) -> Route {
        self.reset();
        self.compute_shortest_path();
        self.reconstruct_route();
        self.proto_route.clone()
    }

    /// Plan the proto route, keeping all planner state so later obstacle
    /// edits replan incrementally instead of from scratch.
    pub fn find_proto(&mut self) -> bool {
        self.reset();
        self.compute_shortest_path();
        self.reconstruct_route()
    }

    /// Drive an agent from the start along the continuously replanned path.
    ///
    /// Each step: pick the best neighbor, commit it to the real route (and
    /// the move hook), suspend for `interval` (or yield), then poll the
    /// changed-cells callback; reported changes bias `km`, update the
    /// affected vertices (widened by `max_range`), and re-converge. The loop
    /// ends at the goal, on an unreachable cell, on the loop cap, or when
    /// the cancel token trips; the real route records the traversal either
    /// way, with `success` set iff the goal was reached.
    ///
    /// [DStarLite::find_proto] must have run first.
    pub fn find_loop(&mut self) {
        let mut s_last = self.start;
        let mut current = self.start;
        let mut route = Route::new();
        route.push(current);

        let mut loops = 0;
        while loops < self.control.real_loop_max_retry && !self.control.cancel.is_cancelled() {
            if current == self.goal {
                break;
            }
            if !self.rhs_of(current).is_finite() {
                debug!("find_loop: {current} has no finite lookahead, giving up");
                break;
            }
            let Some((next, step)) = self.fetch_next(current) else {
                debug!("find_loop: no viable neighbor at {current}");
                break;
            };
            loops += 1;

            route.add_cost(step);
            route.push(next);
            trace!("find_loop: step {loops} -> {next}");
            if let Some(move_fn) = self.move_fn.as_mut() {
                move_fn(next);
            }

            if self.interval.is_zero() {
                thread::yield_now();
            } else {
                thread::sleep(self.interval);
            }
            if self.control.cancel.is_cancelled() {
                break;
            }

            if let Some(changed_fn) = self.changed_fn.as_mut() {
                let changed = changed_fn(&mut self.grid);
                if !changed.is_empty() {
                    self.km += (self.heuristic_fn)(s_last, current);
                    s_last = current;
                    debug!(
                        "find_loop: {} changed cells, km now {}",
                        changed.len(),
                        self.km
                    );
                    for c in changed {
                        self.update_vertex_auto_range(c);
                    }
                    self.compute_shortest_path();
                }
            }

            current = next;
        }

        self.control.real_loop_retry_count = loops;
        route.set_total_retry_count(loops);
        route.set_success(current == self.goal);
        self.real_route = Some(route);
    }

    /// [DStarLite::find_proto] followed by [DStarLite::find_loop].
    pub fn find_full(&mut self) {
        if self.find_proto() {
            self.find_loop();
        }
    }
}

impl std::fmt::Debug for DStarLite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DStarLite")
            .field("start", &self.start)
            .field("goal", &self.goal)
            .field("km", &self.km)
            .field("frontier_len", &self.frontier.len())
            .field("max_range", &self.max_range)
            .field("debug_mode", &self.debug_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{coord, DirMode};
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    fn open_grid() -> NavGrid {
        NavGrid::with_size(10, 10, DirMode::Dir8)
    }

    /// The 10×10 grid bisected at x = 5, passable only at (5, 0).
    fn wall_grid() -> NavGrid {
        let mut grid = open_grid();
        for y in 1..10 {
            grid.block(5, y);
        }
        grid
    }

    #[test]
    fn test_open_grid_diagonal() {
        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(9, 9));
        let route = dsl.find();

        assert!(route.success());
        assert_eq!(route.len(), 10);
        assert_eq!(route.get(0), Some(coord(0, 0)));
        assert_eq!(route.last(), Some(coord(9, 9)));
        assert_relative_eq!(
            route.cost(),
            9.0 * std::f32::consts::SQRT_2,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_wall_route_passes_the_gap() {
        let mut dsl = DStarLite::new(wall_grid(), coord(0, 0), coord(9, 9));
        let route = dsl.find();

        assert!(route.success());
        assert!(route.contains(coord(5, 0)));
        for &c in route.coords() {
            assert!(!dsl.grid().is_blocked(c.x, c.y));
        }
    }

    #[test]
    fn test_incremental_reroute_through_moved_gap() {
        let mut dsl = DStarLite::new(wall_grid(), coord(0, 0), coord(9, 9));
        let first = dsl.find();
        assert!(first.success());

        dsl.grid_mut().block(5, 0);
        dsl.grid_mut().unblock(5, 1);
        dsl.update_vertex_range(coord(5, 0), 1);
        dsl.update_vertex_range(coord(5, 1), 1);

        let second = dsl.find();
        assert!(second.success());
        assert!(second.contains(coord(5, 1)));
        assert!(!second.contains(coord(5, 0)));
    }

    #[test]
    fn test_enclosed_start_fails_with_start_only_route() {
        let mut grid = open_grid();
        for c in grid.neighbors_all(0, 0) {
            grid.block(c.x, c.y);
        }
        let mut dsl = DStarLite::new(grid, coord(0, 0), coord(9, 9));
        let route = dsl.find();

        assert!(!route.success());
        assert_eq!(route.coords(), &vec![coord(0, 0)]);
    }

    #[test]
    fn test_blocked_goal_is_no_path() {
        let mut grid = open_grid();
        grid.block(9, 9);
        let mut dsl = DStarLite::new(grid, coord(0, 0), coord(9, 9));
        let route = dsl.find();
        assert!(!route.success());
    }

    #[test]
    fn test_reverse_plan_has_equal_length() {
        let mut forward = DStarLite::new(wall_grid(), coord(0, 0), coord(9, 9));
        let there = forward.find();

        let mut backward = DStarLite::new(wall_grid(), coord(9, 9), coord(0, 0));
        let back = backward.find();

        assert!(there.success());
        assert!(back.success());
        assert_eq!(there.len(), back.len());
        assert_relative_eq!(there.cost(), back.cost(), epsilon = 1e-4);
    }

    #[test]
    fn test_corridor_round_trip_reverses() {
        let grid = NavGrid::with_size(5, 1, DirMode::Dir4);
        let mut forward = DStarLite::new(grid.clone(), coord(0, 0), coord(4, 0));
        let there = forward.find();
        let mut backward = DStarLite::new(grid, coord(4, 0), coord(0, 0));
        let back = backward.find();

        assert!(there.success() && back.success());
        let mut reversed = back.coords().clone();
        reversed.reverse();
        assert_eq!(there.coords(), &reversed);
    }

    #[test]
    fn test_find_proto_is_idempotent() {
        let mut dsl = DStarLite::new(wall_grid(), coord(0, 0), coord(9, 9));
        assert!(dsl.find_proto());
        let first = dsl.proto_route().clone();
        assert!(dsl.find_proto());
        assert_eq!(first.coords(), dsl.proto_route().coords());
        assert_eq!(first.cost(), dsl.proto_route().cost());
    }

    #[test]
    fn test_incremental_update_expands_less_than_replanning() {
        let mut dsl = DStarLite::new(
            NavGrid::with_size(15, 15, DirMode::Dir8),
            coord(0, 0),
            coord(14, 14),
        );
        assert!(dsl.find_proto());
        let full = dsl.control().proto_compute_retry_count();
        assert!(full > 0);
        assert!(!dsl.proto_route().contains(coord(1, 12)));

        dsl.grid_mut().block(1, 12);
        dsl.update_vertex_range(coord(1, 12), 1);
        dsl.compute_shortest_path();

        let incremental = dsl.control().real_compute_retry_count();
        assert!(incremental < full);
        assert!(dsl.reconstruct_route());
    }

    #[test]
    fn test_frontier_holds_only_inconsistent_cells() {
        let mut dsl = DStarLite::new(wall_grid(), coord(0, 0), coord(9, 9));
        assert!(dsl.find_proto());

        // Reached cells settle; whatever stays queued is inconsistent with a
        // current key.
        assert_eq!(dsl.g_of(coord(0, 0)), dsl.rhs_of(coord(0, 0)));
        for y in 0..10 {
            for x in 0..10 {
                let c = coord(x, y);
                if let Some(key) = dsl.frontier().key_of(c) {
                    assert_ne!(dsl.g_of(c), dsl.rhs_of(c), "{c} queued but consistent");
                    assert!(key.k1 >= key.k2);
                    assert!(key.k1 >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_update_vertex_requeues_with_current_key() {
        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(9, 9));
        assert!(dsl.find_proto());

        dsl.grid_mut().block(4, 4);
        dsl.update_vertex(coord(4, 5));
        match dsl.frontier().key_of(coord(4, 5)) {
            Some(key) => assert_eq!(key, dsl.calculate_key(coord(4, 5))),
            None => assert_eq!(dsl.g_of(coord(4, 5)), dsl.rhs_of(coord(4, 5))),
        }
    }

    #[test]
    fn test_compute_cap_yields_failed_route() {
        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(9, 9));
        assert!(dsl.set_compute_max_retry(1));
        let route = dsl.find();
        assert!(!route.success());
        assert_eq!(dsl.control().proto_compute_retry_count(), 1);
    }

    #[test]
    fn test_reconstruct_cap_yields_partial_route() {
        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(9, 9));
        assert!(dsl.set_reconstruct_max_retry(3));
        let route = dsl.find();
        assert!(!route.success());
        assert_eq!(route.len(), 4);
    }

    #[test]
    fn test_cap_setters_reject_non_positive_values() {
        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(9, 9));
        let before = dsl.control().compute_max_retry();
        assert!(!dsl.set_compute_max_retry(0));
        assert!(!dsl.set_real_loop_max_retry(-3));
        assert_eq!(dsl.control().compute_max_retry(), before);
    }

    #[test]
    fn test_negative_cost_is_clamped_and_terminates() {
        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(9, 9));
        dsl.set_cost_fn(Arc::new(|grid: &NavGrid, _from, to: Coord| {
            if grid.is_blocked(to.x, to.y) {
                f32::INFINITY
            } else {
                -3.0
            }
        }));
        let _ = dsl.find();
        for y in 0..10 {
            for x in 0..10 {
                assert!(dsl.rhs_of(coord(x, y)) >= 0.0);
            }
        }
    }

    #[test]
    fn test_dynamic_loop_reroutes_around_new_obstacle() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(7, 6));
        assert!(dsl.find_proto());
        let proto = dsl.proto_route().clone();
        assert!(proto.contains(coord(3, 2)));

        let mut calls = 0;
        dsl.set_changed_fn(Some(Box::new(move |grid: &mut NavGrid| {
            calls += 1;
            if calls == 2 {
                grid.block(3, 2);
                vec![coord(3, 2)]
            } else {
                Vec::new()
            }
        })));
        let moved = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&moved);
        dsl.set_move_fn(Some(Box::new(move |c| sink.lock().unwrap().push(c))));
        dsl.set_interval(Duration::from_millis(1));

        dsl.find_loop();

        let real = dsl.real_route().expect("loop ran");
        assert!(real.success());
        assert_eq!(real.last(), Some(coord(7, 6)));
        assert!(!real.contains(coord(3, 2)));
        assert_ne!(real.coords(), proto.coords());
        assert!(dsl.km() >= 1.0);
        assert_eq!(moved.lock().unwrap().len(), real.len() - 1);
    }

    #[test]
    fn test_find_full_without_changes_follows_proto() {
        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(9, 9));
        dsl.find_full();
        let real = dsl.real_route().expect("loop ran");
        assert!(real.success());
        assert_eq!(real.coords(), dsl.proto_route().coords());
    }

    #[test]
    fn test_cancel_token_stops_the_loop_and_is_reusable() {
        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(9, 9));
        assert!(dsl.find_proto());

        let token = dsl.cancel_token();
        token.cancel();
        dsl.find_loop();
        let cut = dsl.real_route().expect("loop ran");
        assert!(!cut.success());
        assert_eq!(cut.coords(), &vec![coord(0, 0)]);

        // Clearing the token re-arms the instance without a rebuild.
        token.clear();
        dsl.find_loop();
        assert!(dsl.real_route().expect("loop ran").success());
    }

    #[test]
    fn test_cancel_mid_loop_keeps_partial_route() {
        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(9, 9));
        assert!(dsl.find_proto());

        let token = dsl.cancel_token();
        let mut calls = 0;
        dsl.set_changed_fn(Some(Box::new(move |_grid: &mut NavGrid| {
            calls += 1;
            if calls == 3 {
                token.cancel();
            }
            Vec::new()
        })));
        dsl.find_loop();

        let real = dsl.real_route().expect("loop ran");
        assert!(!real.success());
        assert!(real.len() > 1);
        assert!(real.len() < 10);
    }

    #[test]
    fn test_loop_runs_on_a_worker_thread() {
        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(9, 9));
        assert!(dsl.find_proto());
        let handle = thread::spawn(move || {
            dsl.find_loop();
            dsl
        });
        let dsl = handle.join().unwrap();
        assert!(dsl.real_route().unwrap().success());
    }

    #[test]
    fn test_reset_preserves_configuration() {
        let mut dsl = DStarLite::new(wall_grid(), coord(0, 0), coord(9, 9));
        dsl.set_debug_mode_enabled(true);
        let route = dsl.find();
        assert!(route.success());
        assert!(dsl.update_count_of(coord(5, 0)) > 0);

        dsl.reset();
        assert_eq!(dsl.km(), 0.0);
        assert_eq!(dsl.control().proto_compute_retry_count(), 0);
        assert!(dsl.proto_route().is_empty());
        assert!(dsl.real_route().is_none());
        assert!(dsl.debug_mode_enabled());
        assert!(dsl.find().success());
    }

    #[test]
    fn test_debug_mode_populates_visited_diagnostics() {
        let mut dsl = DStarLite::new(open_grid(), coord(0, 0), coord(9, 9));
        dsl.set_debug_mode_enabled(true);
        let route = dsl.find();
        assert!(route.success());
        assert!(!dsl.proto_route().visited_order().is_empty());
    }

    #[test]
    fn test_start_equals_goal() {
        let mut dsl = DStarLite::new(open_grid(), coord(4, 4), coord(4, 4));
        let route = dsl.find();
        assert!(route.success());
        assert_eq!(route.coords(), &vec![coord(4, 4)]);
    }
}
