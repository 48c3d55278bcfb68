//! Memoizing waypoint distance oracle.
//!
//! A [`DistanceOracle`] binds a grid, a router and an indexed list of
//! waypoints.  Tour solvers see it only through [`Distances`]: the cost of
//! travelling between waypoint `i` and waypoint `j`.
//!
//! # Caching
//!
//! Each unordered pair `{i, j}` is routed at most once.  The cache key is
//! `(min(i, j), max(i, j))`; the stored cell sequence runs from the smaller
//! index to the larger and is reversed on the way out when `i > j`.  Both
//! directions therefore agree exactly, which makes the oracle symmetric by
//! construction.
//!
//! The cache sits behind a `Mutex` so one oracle can serve Rayon workers.
//! Entries are `Arc<Leg>` so the lock is held only for the map lookup, never
//! while copying cells.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rustc_hash::FxHashMap;
use tracing::trace;

use wp_core::{DistanceMatrix, Distances, Pos};

use crate::{AStarRouter, GridError, GridMap, GridResult, Router};

/// One cached shortest path between two waypoints.
#[derive(Clone, Debug, PartialEq)]
pub struct Leg {
    /// Path cost, `f64::INFINITY` when unreachable.
    pub cost:  f64,
    /// Cells from the lower-indexed waypoint to the higher-indexed one.
    pub cells: Vec<Pos>,
}

/// Lazily computed, cached pairwise waypoint distances on a grid.
pub struct DistanceOracle<'g, G: GridMap, R: Router = AStarRouter> {
    grid:      &'g G,
    router:    R,
    waypoints: Vec<Pos>,
    cache:     Mutex<FxHashMap<(u32, u32), Arc<Leg>>>,
    hits:      AtomicUsize,
    misses:    AtomicUsize,
}

impl<'g, G: GridMap> DistanceOracle<'g, G, AStarRouter> {
    /// Oracle using A* with the grid-appropriate heuristic.
    pub fn new(grid: &'g G, waypoints: Vec<Pos>) -> GridResult<Self> {
        Self::with_router(grid, waypoints, AStarRouter::default())
    }
}

impl<'g, G: GridMap, R: Router> DistanceOracle<'g, G, R> {
    /// Oracle using an explicit router.
    ///
    /// Fails if any waypoint is outside the grid.  Waypoints on obstacle
    /// cells are accepted; every leg touching them is unreachable.
    pub fn with_router(grid: &'g G, waypoints: Vec<Pos>, router: R) -> GridResult<Self> {
        if let Some(&p) = waypoints.iter().find(|&&p| !grid.in_bounds(p)) {
            return Err(GridError::OutOfBounds(p));
        }
        Ok(Self {
            grid,
            router,
            waypoints,
            cache: Mutex::new(FxHashMap::default()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        })
    }

    pub fn grid(&self) -> &'g G {
        self.grid
    }

    pub fn waypoints(&self) -> &[Pos] {
        &self.waypoints
    }

    /// Position of waypoint `i`.
    pub fn waypoint(&self, i: usize) -> GridResult<Pos> {
        self.waypoints
            .get(i)
            .copied()
            .ok_or(GridError::WaypointIndex { index: i, len: self.waypoints.len() })
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Shortest-path cost between waypoints `i` and `j`.  Zero when
    /// `i == j`, `f64::INFINITY` when unreachable.
    pub fn try_distance(&self, i: usize, j: usize) -> GridResult<f64> {
        if i == j {
            self.waypoint(i)?;
            return Ok(0.0);
        }
        Ok(self.leg(i, j)?.cost)
    }

    /// Cell sequence from waypoint `i` to waypoint `j`, endpoints included.
    ///
    /// `[waypoint(i)]` when `i == j`; empty when unreachable.
    pub fn path(&self, i: usize, j: usize) -> GridResult<Vec<Pos>> {
        if i == j {
            return Ok(vec![self.waypoint(i)?]);
        }
        let leg = self.leg(i, j)?;
        let mut cells = leg.cells.clone();
        if i > j {
            cells.reverse();
        }
        Ok(cells)
    }

    /// Expand a waypoint visiting order into one continuous cell path.
    ///
    /// Consecutive legs share their junction waypoint, which appears once.
    /// When `closed` the final leg back to `order[0]` is appended.  Fails with
    /// [`GridError::UnreachableLeg`] if any leg has no path.
    pub fn expand_tour(&self, order: &[usize], closed: bool) -> GridResult<Vec<Pos>> {
        let Some(&first) = order.first() else {
            return Ok(Vec::new());
        };
        let mut cells = vec![self.waypoint(first)?];
        let last = order[order.len() - 1];
        let closing = (closed && order.len() > 1).then_some((last, first));
        let hops = order.windows(2).map(|w| (w[0], w[1])).chain(closing);
        for (a, b) in hops {
            let leg = self.path(a, b)?;
            if leg.is_empty() {
                return Err(GridError::UnreachableLeg { from: a, to: b });
            }
            cells.extend_from_slice(&leg[1..]);
        }
        Ok(cells)
    }

    /// Full `n × n` matrix, routing every uncached pair once.
    pub fn matrix(&self) -> DistanceMatrix {
        DistanceMatrix::symmetric_from_fn(self.waypoints.len(), |i, j| self.distance(i, j))
    }

    // ── Cache bookkeeping ─────────────────────────────────────────────────

    /// Number of distinct pairs routed so far.
    pub fn cache_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// `(hits, misses)` since construction or the last [`clear_cache`](Self::clear_cache).
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    pub fn clear_cache(&self) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    fn leg(&self, i: usize, j: usize) -> GridResult<Arc<Leg>> {
        let (lo, hi) = (i.min(j), i.max(j));
        let (from, to) = (self.waypoint(lo)?, self.waypoint(hi)?);
        let key = (lo as u32, hi as u32);

        if let Some(leg) = self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(leg));
        }

        // Route outside the lock.  Two threads may race on the same pair;
        // both compute the same leg and the second insert is a no-op.
        let route = self.router.route(self.grid, from, to)?;
        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(lo, hi, cost = route.cost, expanded = route.nodes_expanded, "routed waypoint pair");

        let leg = Arc::new(Leg { cost: route.cost, cells: route.cells });
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(key).or_insert(leg)))
    }
}

impl<G: GridMap, R: Router> Distances for DistanceOracle<'_, G, R> {
    fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Out-of-range indices are a caller bug; they report `f64::INFINITY`
    /// rather than panicking inside a solver.
    fn distance(&self, i: usize, j: usize) -> f64 {
        self.try_distance(i, j).unwrap_or(f64::INFINITY)
    }
}

/// Build an oracle over `waypoints` and return it as a distance function.
///
/// Convenience for callers that want `d(i, j)` without naming the oracle type.
pub fn distance_function<'g, G: GridMap>(
    grid:      &'g G,
    waypoints: Vec<Pos>,
) -> GridResult<impl Fn(usize, usize) -> f64 + 'g> {
    let oracle = DistanceOracle::new(grid, waypoints)?;
    Ok(move |i, j| oracle.distance(i, j))
}
