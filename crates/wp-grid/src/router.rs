//! Routing trait and the A* / Dijkstra implementations.
//!
//! # Pluggability
//!
//! The oracle and the replanning executor call routing via the [`Router`]
//! trait.  [`AStarRouter`] is the default; [`DijkstraRouter`] runs the same
//! search with a zero heuristic and is kept for cross-checking A*.
//!
//! # Cost model
//!
//! Axis-aligned moves cost `1.0`, diagonal moves `√2`.  With
//! [`Heuristic::Auto`] A* uses the octile distance on 8-connected grids and
//! Manhattan on 4-connected ones; both are consistent for their adjacency,
//! so A* returns the same cost as Dijkstra.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use wp_core::Pos;

use crate::{GridError, GridMap, GridResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Cells from source to destination inclusive.  Empty when unreachable.
    pub cells: Vec<Pos>,
    /// Total path cost; `f64::INFINITY` when unreachable.
    pub cost: f64,
    /// Nodes popped from the open list (search effort diagnostic).
    pub nodes_expanded: usize,
}

impl Route {
    /// The "no path" result: empty path, infinite cost.
    pub fn unreachable(nodes_expanded: usize) -> Self {
        Self { cells: Vec::new(), cost: f64::INFINITY, nodes_expanded }
    }

    pub fn is_reachable(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Number of moves (cells minus one); zero for trivial or unreachable.
    pub fn moves(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one oracle can be shared by
/// solvers evaluating candidates on Rayon worker threads.
pub trait Router: Send + Sync {
    /// Shortest path from `from` to `to`.
    ///
    /// Returns `Err` only for out-of-bounds endpoints.  An impassable endpoint
    /// or a disconnected goal yields [`Route::unreachable`].
    fn route<G: GridMap>(&self, grid: &G, from: Pos, to: Pos) -> GridResult<Route>;
}

// ── Heuristics ────────────────────────────────────────────────────────────────

/// A* heuristic selection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heuristic {
    /// Octile when the grid allows diagonals, Manhattan otherwise.
    #[default]
    Auto,
    /// `|dx| + |dy|`.  Inadmissible on 8-connected grids.
    Manhattan,
    /// Octile distance.
    Octile,
    /// Always zero (Dijkstra).
    Zero,
}

impl Heuristic {
    /// Resolve `Auto` against the grid's adjacency.
    fn resolve(self, diagonal: bool) -> Heuristic {
        match self {
            Heuristic::Auto if diagonal => Heuristic::Octile,
            Heuristic::Auto => Heuristic::Manhattan,
            other => other,
        }
    }

    #[inline]
    fn estimate(self, from: Pos, goal: Pos) -> f64 {
        match self {
            Heuristic::Manhattan => from.manhattan(goal),
            Heuristic::Octile    => from.octile(goal),
            Heuristic::Zero | Heuristic::Auto => 0.0,
        }
    }
}

// ── Routers ───────────────────────────────────────────────────────────────────

/// Best-first search ordered by `g + h`.
#[derive(Copy, Clone, Debug, Default)]
pub struct AStarRouter {
    pub heuristic: Heuristic,
}

impl AStarRouter {
    pub fn with_heuristic(heuristic: Heuristic) -> Self {
        Self { heuristic }
    }
}

impl Router for AStarRouter {
    fn route<G: GridMap>(&self, grid: &G, from: Pos, to: Pos) -> GridResult<Route> {
        search(grid, from, to, self.heuristic.resolve(grid.diagonal()))
    }
}

/// Uniform-cost search; the reference A* is checked against.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route<G: GridMap>(&self, grid: &G, from: Pos, to: Pos) -> GridResult<Route> {
        search(grid, from, to, Heuristic::Zero)
    }
}

// ── Search internals ──────────────────────────────────────────────────────────

/// Open-list entry.  Ordered so that `BinaryHeap` (a max-heap) pops the
/// lowest `f` first, preferring deeper nodes (higher `g`) on ties and then
/// the smaller position for deterministic expansion order.
#[derive(Copy, Clone, Debug)]
struct Frontier {
    f:   f64,
    g:   f64,
    pos: Pos,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| self.g.total_cmp(&other.g))
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

const NO_PREV: u32 = u32::MAX;

fn search<G: GridMap>(grid: &G, from: Pos, to: Pos, heuristic: Heuristic) -> GridResult<Route> {
    for p in [from, to] {
        if !grid.in_bounds(p) {
            return Err(GridError::OutOfBounds(p));
        }
    }
    if !grid.passable(from) || !grid.passable(to) {
        return Ok(Route::unreachable(0));
    }
    if from == to {
        return Ok(Route { cells: vec![from], cost: 0.0, nodes_expanded: 0 });
    }

    let width = grid.width();
    let idx = |p: Pos| (p.y * width + p.x) as usize;

    // g[c] = best known cost to reach cell c; prev[c] = predecessor cell.
    let mut g    = vec![f64::INFINITY; grid.cell_count()];
    let mut prev = vec![NO_PREV; grid.cell_count()];
    let mut open = BinaryHeap::new();
    let mut nodes_expanded = 0usize;

    g[idx(from)] = 0.0;
    open.push(Frontier { f: heuristic.estimate(from, to), g: 0.0, pos: from });

    while let Some(Frontier { g: cost, pos, .. }) = open.pop() {
        // Skip stale open-list entries.
        if cost > g[idx(pos)] {
            continue;
        }
        nodes_expanded += 1;

        if pos == to {
            let cells = reconstruct(&prev, from, to, |c| grid.pos_of(wp_core::CellId(c)), idx);
            return Ok(Route { cells, cost, nodes_expanded });
        }

        for next in grid.neighbors(pos) {
            let ng = cost + pos.step_cost_to(next);
            let ni = idx(next);
            if ng < g[ni] {
                g[ni]    = ng;
                prev[ni] = idx(pos) as u32;
                open.push(Frontier { f: ng + heuristic.estimate(next, to), g: ng, pos: next });
            }
        }
    }

    Ok(Route::unreachable(nodes_expanded))
}

fn reconstruct(
    prev:   &[u32],
    from:   Pos,
    to:     Pos,
    pos_of: impl Fn(u32) -> Pos,
    idx:    impl Fn(Pos) -> usize,
) -> Vec<Pos> {
    let mut cells = vec![to];
    let mut cur = to;
    while cur != from {
        let p = prev[idx(cur)];
        debug_assert_ne!(p, NO_PREV, "broken predecessor chain at {cur}");
        cur = pos_of(p);
        cells.push(cur);
    }
    cells.reverse();
    cells
}
