#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{Coord, CoordList, CoordMap};
use bevy_math::Vec2;

/// One of the eight grid step directions, or `Unknown` for a zero step.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RouteDir {
    #[default]
    Unknown,
    Right,
    UpRight,
    Up,
    UpLeft,
    Left,
    DownLeft,
    Down,
    DownRight,
}

impl RouteDir {
    /// Classify a step by the sign of its delta.
    #[must_use]
    pub fn from_delta(delta: Coord) -> Self {
        match (delta.x.signum(), delta.y.signum()) {
            (1, 0) => RouteDir::Right,
            (1, 1) => RouteDir::UpRight,
            (0, 1) => RouteDir::Up,
            (-1, 1) => RouteDir::UpLeft,
            (-1, 0) => RouteDir::Left,
            (-1, -1) => RouteDir::DownLeft,
            (0, -1) => RouteDir::Down,
            (1, -1) => RouteDir::DownRight,
            _ => RouteDir::Unknown,
        }
    }

    /// The unit delta of this direction; zero for `Unknown`.
    #[must_use]
    pub fn to_delta(self) -> Coord {
        match self {
            RouteDir::Unknown => Coord::ZERO,
            RouteDir::Right => Coord::new(1, 0),
            RouteDir::UpRight => Coord::new(1, 1),
            RouteDir::Up => Coord::new(0, 1),
            RouteDir::UpLeft => Coord::new(-1, 1),
            RouteDir::Left => Coord::new(-1, 0),
            RouteDir::DownLeft => Coord::new(-1, -1),
            RouteDir::Down => Coord::new(0, -1),
            RouteDir::DownRight => Coord::new(1, -1),
        }
    }

    /// The direction whose bearing is nearest to `degree`.
    #[must_use]
    pub fn from_degree(degree: f64) -> Self {
        if degree.is_nan() {
            return RouteDir::Unknown;
        }
        let sector = (((degree.rem_euclid(360.0)) + 22.5) / 45.0) as usize % 8;
        [
            RouteDir::Right,
            RouteDir::UpRight,
            RouteDir::Up,
            RouteDir::UpLeft,
            RouteDir::Left,
            RouteDir::DownLeft,
            RouteDir::Down,
            RouteDir::DownRight,
        ][sector]
    }
}

/// A planned or traversed path across a grid.
///
/// `coords` is the path itself, start first. The visited log and per-cell
/// visit counts are diagnostics, only populated when a planner runs in debug
/// mode. Failure is in-band: a route with `success == false` carries whatever
/// partial path the producer could assemble plus its retry counter.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Route {
    coords: CoordList,
    visited_order: CoordList,
    visited_count: CoordMap<i32>,
    cost: f32,
    success: bool,
    total_retry_count: i32,
    avg_dir: Vec2,
    vec_count: i32,
}

impl Route {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn coords(&self) -> &CoordList {
        &self.coords
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Coord> {
        self.coords.get(index).copied()
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<Coord> {
        self.coords.last().copied()
    }

    #[inline]
    pub fn push(&mut self, c: Coord) {
        self.coords.push(c);
    }

    pub fn insert(&mut self, index: usize, c: Coord) {
        self.coords.insert(index.min(self.coords.len()), c);
    }

    pub fn remove_at(&mut self, index: usize) {
        if index < self.coords.len() {
            self.coords.remove(index);
        }
    }

    /// Remove the first occurrence of `c`, if present.
    pub fn remove_value(&mut self, c: Coord) {
        if let Some(i) = self.find(c) {
            self.coords.remove(i);
        }
    }

    #[must_use]
    pub fn contains(&self, c: Coord) -> bool {
        self.coords.contains(&c)
    }

    #[must_use]
    pub fn find(&self, c: Coord) -> Option<usize> {
        self.coords.iter().position(|&p| p == c)
    }

    /// A new route holding `coords[start..end]`. Diagnostics and flags are
    /// not carried over.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Route {
        let end = end.min(self.coords.len());
        let start = start.min(end);
        Route {
            coords: self.coords[start..end].to_vec(),
            ..Route::default()
        }
    }

    /// Append all of `other`'s coords.
    pub fn append(&mut self, other: &Route) {
        self.coords.extend_from_slice(&other.coords);
    }

    /// Append `other`, collapsing a shared seam: when `other` starts on this
    /// route's last coord, that coord is not duplicated. Interior duplicates
    /// are left alone.
    pub fn append_dedup(&mut self, other: &Route) {
        let skip_first = match (self.last(), other.coords.first()) {
            (Some(a), Some(&b)) => a == b,
            _ => false,
        };
        let tail = if skip_first { &other.coords[1..] } else { &other.coords[..] };
        self.coords.extend_from_slice(tail);
    }

    pub fn clear_coords(&mut self) {
        self.coords.clear();
    }

    /// Log a visit of `c`: appended to the visit order, and its multiplicity
    /// bumped.
    pub fn add_visited(&mut self, c: Coord) {
        self.visited_order.push(c);
        *self.visited_count.entry(c).or_insert(0) += 1;
    }

    pub fn clear_visited(&mut self) {
        self.visited_order.clear();
        self.visited_count.clear();
    }

    #[must_use]
    pub fn visited_order(&self) -> &CoordList {
        &self.visited_order
    }

    #[must_use]
    pub fn visited_count(&self) -> &CoordMap<i32> {
        &self.visited_count
    }

    #[must_use]
    pub fn visit_count_of(&self, c: Coord) -> i32 {
        self.visited_count.get(&c).copied().unwrap_or(0)
    }

    #[inline]
    #[must_use]
    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn set_cost(&mut self, cost: f32) {
        self.cost = cost;
    }

    pub fn add_cost(&mut self, cost: f32) {
        self.cost += cost;
    }

    #[inline]
    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    pub fn set_success(&mut self, success: bool) {
        self.success = success;
    }

    #[inline]
    #[must_use]
    pub fn total_retry_count(&self) -> i32 {
        self.total_retry_count
    }

    pub fn set_total_retry_count(&mut self, count: i32) {
        self.total_retry_count = count;
    }

    /// The sign-normalized delta of the step starting at `index`.
    #[must_use]
    pub fn step_delta(&self, index: usize) -> Option<Coord> {
        let a = self.get(index)?;
        let b = self.get(index + 1)?;
        let d = b - a;
        Some(Coord::new(d.x.signum(), d.y.signum()))
    }

    /// The direction of the step starting at `index`.
    #[must_use]
    pub fn direction_at(&self, index: usize) -> RouteDir {
        self.step_delta(index).map(RouteDir::from_delta).unwrap_or_default()
    }

    /// Fold a step vector into the running direction mean.
    pub fn update_average_vector(&mut self, from: Coord, to: Coord) {
        let v = (to - from).as_vec2();
        let n = self.vec_count as f32;
        self.avg_dir = (self.avg_dir * n + v) / (n + 1.0);
        self.vec_count += 1;
    }

    #[must_use]
    pub fn average_vector(&self) -> (Vec2, i32) {
        (self.avg_dir, self.vec_count)
    }

    /// Bearing of the running direction mean in degrees, `[0, 360)`.
    /// NaN when no step has been folded in yet.
    #[must_use]
    pub fn average_degree(&self) -> f64 {
        if self.vec_count == 0 || self.avg_dir == Vec2::ZERO {
            return f64::NAN;
        }
        let mut deg = (self.avg_dir.y as f64).atan2(self.avg_dir.x as f64).to_degrees();
        if deg < 0.0 {
            deg += 360.0;
        }
        deg
    }

    /// Mean bearing of the last `history` steps of the path, in degrees.
    /// NaN when the path holds no step.
    #[must_use]
    pub fn average_degree_by_history(&self, history: usize) -> f64 {
        let steps = self.coords.len().saturating_sub(1);
        if steps == 0 {
            return f64::NAN;
        }
        let take = history.clamp(1, steps);
        let mut sum = Vec2::ZERO;
        for i in (steps - take)..steps {
            sum += (self.coords[i + 1] - self.coords[i]).as_vec2();
        }
        if sum == Vec2::ZERO {
            return f64::NAN;
        }
        let mut deg = (sum.y as f64).atan2(sum.x as f64).to_degrees();
        if deg < 0.0 {
            deg += 360.0;
        }
        deg
    }

    /// The direction nearest the mean bearing of the last `history` steps.
    #[must_use]
    pub fn average_facing(&self, history: usize) -> RouteDir {
        RouteDir::from_degree(self.average_degree_by_history(history))
    }

    /// Whether the `from → to` step deviates from the running direction mean
    /// by at least `threshold_deg` degrees.
    #[must_use]
    pub fn has_changed(&self, from: Coord, to: Coord, threshold_deg: f64) -> bool {
        self.has_changed_with_angle(from, to, threshold_deg).0
    }

    /// [Route::has_changed], also reporting the deviation angle in degrees.
    #[must_use]
    pub fn has_changed_with_angle(
        &self,
        from: Coord,
        to: Coord,
        threshold_deg: f64,
    ) -> (bool, f64) {
        let step = from.degree(to);
        let avg = self.average_degree();
        if step.is_nan() || avg.is_nan() {
            return (false, 0.0);
        }
        let mut diff = (step - avg).abs() % 360.0;
        if diff > 180.0 {
            diff = 360.0 - diff;
        }
        (diff >= threshold_deg, diff)
    }

    /// Rebuild `coords` start → goal from a predecessor map. Returns false
    /// and leaves `coords` cleared when the predecessor chain does not reach
    /// `start`.
    pub fn reconstruct(&mut self, came_from: &CoordMap<Coord>, start: Coord, goal: Coord) -> bool {
        self.coords.clear();
        let mut current = goal;
        self.coords.push(current);
        // A well-formed chain is at most one entry per predecessor.
        let mut remaining = came_from.len() + 1;
        while current != start {
            if remaining == 0 {
                self.coords.clear();
                return false;
            }
            remaining -= 1;
            match came_from.get(&current) {
                Some(&prev) => {
                    current = prev;
                    self.coords.push(current);
                }
                None => {
                    self.coords.clear();
                    return false;
                }
            }
        }
        self.coords.reverse();
        true
    }
}
