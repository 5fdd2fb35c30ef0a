//! gridnav
//! =======
//!
//! Shortest-path planning on 2D integer grids with dynamic obstacles.
//! The core is an incremental D* Lite planner ([DStarLite]) that keeps its
//! cost estimates alive across obstacle edits, so a single changed cell
//! updates only the locally affected frontier instead of forcing a replan
//! from scratch, and that can drive an agent step by step while obstacles
//! keep moving ([DStarLite::find_loop]). A family of one-shot searches
//! (A*, Dijkstra, BFS/DFS, IDA*, weighted A*, RTA*, SMA*, fringe search,
//! fast marching, greedy best-first) shares the same grid, cost, and route
//! contracts behind a tag-dispatched [Finder].

mod cell;
mod coord;
mod coord_map;
mod cost;
mod cost_queue;
mod dstar_lite;
mod finder;
mod frontier;
mod grid;
mod key;
mod route;

pub use self::{
    cell::*, coord::*, coord_map::*, cost::*, cost_queue::*, dstar_lite::*, finder::*,
    frontier::*, grid::*, key::*, route::*,
};

/// The library version, as baked in at compile time.
#[must_use]
pub fn version_string() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
