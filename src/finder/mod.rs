//! One-shot pathfinding over a [NavGrid], behind a tag-dispatched runner.
//!
//! Every algorithm shares the same contract: default cost of `1.0` between
//! passable neighbors (`+∞` into blocked cells), Euclidean default heuristic,
//! failure reported in-band through the returned route's `success` flag and
//! retry counter, and a best-effort partial route when the retry cap cuts the
//! search short.

mod astar;
mod bfs;
mod dfs;
mod dijkstra;
mod fast_marching;
mod fringe;
mod greedy_best_first;
mod ida_star;
mod rta_star;
mod sma_star;
mod weighted_astar;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{
    euclidean_heuristic, manhattan_heuristic, unit_cost, Coord, CostFn, DStarLite, HeuristicFn,
    NavGrid, Route,
};
use log::debug;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Borrowed callback forms the algorithm modules work against.
pub(crate) type CostRef<'a> = &'a (dyn Fn(&NavGrid, Coord, Coord) -> f32);
pub(crate) type HeuristicRef<'a> = &'a (dyn Fn(Coord, Coord) -> f32);

/// Selects which search [Finder::run] dispatches to.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    #[default]
    AStar,
    Dijkstra,
    Bfs,
    Dfs,
    IdaStar,
    WeightedAStar,
    RtaStar,
    SmaStar,
    FringeSearch,
    FastMarching,
    GreedyBestFirst,
    DStarLite,
}

impl Algorithm {
    pub const ALL: [Algorithm; 12] = [
        Algorithm::AStar,
        Algorithm::Dijkstra,
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::IdaStar,
        Algorithm::WeightedAStar,
        Algorithm::RtaStar,
        Algorithm::SmaStar,
        Algorithm::FringeSearch,
        Algorithm::FastMarching,
        Algorithm::GreedyBestFirst,
        Algorithm::DStarLite,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::AStar => "astar",
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::IdaStar => "ida-star",
            Algorithm::WeightedAStar => "weighted-astar",
            Algorithm::RtaStar => "rta-star",
            Algorithm::SmaStar => "sma-star",
            Algorithm::FringeSearch => "fringe-search",
            Algorithm::FastMarching => "fast-marching",
            Algorithm::GreedyBestFirst => "greedy-best-first",
            Algorithm::DStarLite => "dstar-lite",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized algorithm tag string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm tag: {0:?}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

/// Algorithm-specific parameters, tagged by the algorithm they configure.
/// A missing or mismatched variant falls back to the documented defaults.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlgorithmParams {
    /// `weight ≥ 1`; default `1.5`.
    WeightedAStar { weight: f32 },
    /// Lookahead depth; default `3`.
    RtaStar { depth_limit: i32 },
    /// Maximum frontier entries held in memory; default `64`.
    SmaStar { memory_limit: usize },
    /// Threshold band width δ; default `0.5`.
    FringeSearch { delta_epsilon: f32 },
}

pub(crate) const DEFAULT_WEIGHT: f32 = 1.5;
pub(crate) const DEFAULT_DEPTH_LIMIT: i32 = 3;
pub(crate) const DEFAULT_MEMORY_LIMIT: usize = 64;
pub(crate) const DEFAULT_DELTA_EPSILON: f32 = 0.5;

/// Configuration for a one-shot pathfinding run.
#[derive(Clone)]
pub struct Finder {
    grid: NavGrid,
    start: Coord,
    goal: Coord,
    algorithm: Algorithm,
    params: Option<AlgorithmParams>,
    cost_fn: Option<CostFn>,
    heuristic_fn: Option<HeuristicFn>,
    max_retry: i32,
    debug_mode: bool,
}

impl Finder {
    pub const DEFAULT_MAX_RETRY: i32 = 10_000;

    /// An A* finder with default cost, heuristic, and retry cap.
    #[must_use]
    pub fn new(grid: NavGrid, start: Coord, goal: Coord) -> Self {
        Self {
            grid,
            start,
            goal,
            algorithm: Algorithm::AStar,
            params: None,
            cost_fn: None,
            heuristic_fn: None,
            max_retry: Self::DEFAULT_MAX_RETRY,
            debug_mode: false,
        }
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> &mut Self {
        self.algorithm = algorithm;
        self
    }

    pub fn set_params(&mut self, params: Option<AlgorithmParams>) -> &mut Self {
        self.params = params;
        self
    }

    pub fn set_cost_fn(&mut self, cost_fn: Option<CostFn>) -> &mut Self {
        self.cost_fn = cost_fn;
        self
    }

    pub fn set_heuristic_fn(&mut self, heuristic_fn: Option<HeuristicFn>) -> &mut Self {
        self.heuristic_fn = heuristic_fn;
        self
    }

    #[must_use]
    pub fn max_retry(&self) -> i32 {
        self.max_retry
    }

    pub fn set_max_retry(&mut self, max_retry: i32) -> &mut Self {
        self.max_retry = max_retry;
        self
    }

    pub fn set_debug_mode_enabled(&mut self, enabled: bool) -> &mut Self {
        self.debug_mode = enabled;
        self
    }

    fn weight(&self) -> f32 {
        match self.params {
            Some(AlgorithmParams::WeightedAStar { weight }) if weight >= 1.0 => weight,
            _ => DEFAULT_WEIGHT,
        }
    }

    fn depth_limit(&self) -> i32 {
        match self.params {
            Some(AlgorithmParams::RtaStar { depth_limit }) if depth_limit > 0 => depth_limit,
            _ => DEFAULT_DEPTH_LIMIT,
        }
    }

    fn memory_limit(&self) -> usize {
        match self.params {
            Some(AlgorithmParams::SmaStar { memory_limit }) if memory_limit > 0 => memory_limit,
            _ => DEFAULT_MEMORY_LIMIT,
        }
    }

    fn delta_epsilon(&self) -> f32 {
        match self.params {
            Some(AlgorithmParams::FringeSearch { delta_epsilon }) if delta_epsilon > 0.0 => {
                delta_epsilon
            }
            _ => DEFAULT_DELTA_EPSILON,
        }
    }

    /// Run the configured search. A non-positive retry cap fails immediately
    /// with a start-only route.
    #[must_use]
    pub fn run(&self) -> Route {
        if self.max_retry <= 0 {
            let mut route = Route::new();
            route.push(self.start);
            route.set_success(false);
            return route;
        }

        debug!(
            "finder: {} from {} to {} (cap {})",
            self.algorithm, self.start, self.goal, self.max_retry
        );

        if self.algorithm == Algorithm::DStarLite {
            let mut dsl = DStarLite::new(self.grid.clone(), self.start, self.goal);
            if let Some(cost_fn) = &self.cost_fn {
                dsl.set_cost_fn(cost_fn.clone());
            }
            if let Some(heuristic_fn) = &self.heuristic_fn {
                dsl.set_heuristic_fn(heuristic_fn.clone());
            }
            dsl.set_compute_max_retry(self.max_retry);
            dsl.set_debug_mode_enabled(self.debug_mode);
            return dsl.find();
        }

        let default_cost: CostRef = &unit_cost;
        let cost_fn: CostRef = match &self.cost_fn {
            Some(f) => f.as_ref(),
            None => default_cost,
        };
        // IDA* traditionally deepens over the Manhattan estimate.
        let default_heuristic: HeuristicRef = if self.algorithm == Algorithm::IdaStar {
            &manhattan_heuristic
        } else {
            &euclidean_heuristic
        };
        let heuristic_fn: HeuristicRef = match &self.heuristic_fn {
            Some(f) => f.as_ref(),
            None => default_heuristic,
        };

        let grid = &self.grid;
        let (start, goal) = (self.start, self.goal);
        let (cap, dbg) = (self.max_retry, self.debug_mode);

        match self.algorithm {
            Algorithm::AStar => astar::find_astar(grid, start, goal, cost_fn, heuristic_fn, cap, dbg),
            Algorithm::Dijkstra => dijkstra::find_dijkstra(grid, start, goal, cost_fn, cap, dbg),
            Algorithm::Bfs => bfs::find_bfs(grid, start, goal, cap, dbg),
            Algorithm::Dfs => dfs::find_dfs(grid, start, goal, cap, dbg),
            Algorithm::IdaStar => {
                ida_star::find_ida_star(grid, start, goal, cost_fn, heuristic_fn, cap, dbg)
            }
            Algorithm::WeightedAStar => weighted_astar::find_weighted_astar(
                grid,
                start,
                goal,
                cost_fn,
                heuristic_fn,
                self.weight(),
                cap,
                dbg,
            ),
            Algorithm::RtaStar => rta_star::find_rta_star(
                grid,
                start,
                goal,
                cost_fn,
                heuristic_fn,
                self.depth_limit(),
                cap,
                dbg,
            ),
            Algorithm::SmaStar => sma_star::find_sma_star(
                grid,
                start,
                goal,
                cost_fn,
                heuristic_fn,
                self.memory_limit(),
                cap,
                dbg,
            ),
            Algorithm::FringeSearch => fringe::find_fringe_search(
                grid,
                start,
                goal,
                cost_fn,
                heuristic_fn,
                self.delta_epsilon(),
                cap,
                dbg,
            ),
            Algorithm::FastMarching => {
                fast_marching::find_fast_marching(grid, start, goal, cost_fn, cap, dbg)
            }
            Algorithm::GreedyBestFirst => {
                greedy_best_first::find_greedy_best_first(grid, start, goal, heuristic_fn, cap, dbg)
            }
            Algorithm::DStarLite => unreachable!("dispatched above"),
        }
    }
}

impl fmt::Debug for Finder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finder")
            .field("start", &self.start)
            .field("goal", &self.goal)
            .field("algorithm", &self.algorithm)
            .field("params", &self.params)
            .field("max_retry", &self.max_retry)
            .field("debug_mode", &self.debug_mode)
            .finish_non_exhaustive()
    }
}
