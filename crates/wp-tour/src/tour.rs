//! Tour representation, length evaluation, and solve results.
//!
//! # Tour shape
//!
//! Whether the return edge `last → first` counts toward the length is an
//! explicit [`TourShape`] threaded through every solver, never inferred.
//! `Open` (depot → … → last waypoint) is the default.
//!
//! # Infinite edges
//!
//! An unreachable pair has distance `f64::INFINITY`.  Lengths simply sum to
//! infinity; comparisons with `<` stay well defined, so a finite tour always
//! beats an infinite one and two infinite tours never "improve" on each
//! other.

use std::time::Duration;

use wp_core::Distances;

use crate::{TourError, TourResult};

/// Whether a tour returns to its first waypoint.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TourShape {
    /// Hamiltonian path from the depot; no return edge.
    #[default]
    Open,
    /// Hamiltonian cycle; the `last → first` edge is included.
    Closed,
}

impl TourShape {
    #[inline]
    pub fn is_closed(self) -> bool {
        self == TourShape::Closed
    }
}

/// Sum of consecutive distances along `order`, plus the return edge when
/// `shape` is closed.  Zero for fewer than two waypoints.
pub fn tour_length<D: Distances + ?Sized>(order: &[usize], dist: &D, shape: TourShape) -> f64 {
    if order.len() < 2 {
        return 0.0;
    }
    let path: f64 = order.windows(2).map(|w| dist.distance(w[0], w[1])).sum();
    if shape.is_closed() {
        path + dist.distance(order[order.len() - 1], order[0])
    } else {
        path
    }
}

/// Check that `order` is a permutation of `0..n` beginning with `start`.
pub fn validate_tour(order: &[usize], n: usize, start: usize) -> TourResult<()> {
    if order.len() != n {
        return Err(TourError::InvalidTour(format!("length {} != {n}", order.len())));
    }
    if order.first() != Some(&start) {
        return Err(TourError::InvalidTour(format!("does not start at {start}")));
    }
    let mut seen = vec![false; n];
    for &v in order {
        match seen.get_mut(v) {
            Some(s) if !*s => *s = true,
            Some(_) => return Err(TourError::InvalidTour(format!("index {v} repeated"))),
            None    => return Err(TourError::InvalidTour(format!("index {v} out of range"))),
        }
    }
    Ok(())
}

/// `[start, 0, 1, …]` skipping `start`: the fallback order when nothing
/// better is available.
pub fn identity_order(n: usize, start: usize) -> Vec<usize> {
    std::iter::once(start).chain((0..n).filter(|&i| i != start)).collect()
}

/// Rotate a cyclic order in place so that it begins with `start`.
///
/// No-op if `start` is absent.
pub fn rotate_to_start(order: &mut [usize], start: usize) {
    if let Some(pos) = order.iter().position(|&v| v == start) {
        order.rotate_left(pos);
    }
}

/// Validate `(n, start)` for a solve call and return `n`.
pub(crate) fn check_instance<D: Distances + ?Sized>(dist: &D, start: usize) -> TourResult<usize> {
    let n = dist.len();
    if n == 0 {
        return Err(TourError::EmptyInstance);
    }
    if start >= n {
        return Err(TourError::StartOutOfRange { start, n });
    }
    Ok(n)
}

// ── Results ───────────────────────────────────────────────────────────────────

/// A solver's answer.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Solution {
    /// Permutation of `0..n` beginning with the requested start.
    pub order:  Vec<usize>,
    /// `tour_length(order, dist, shape)`.
    pub length: f64,
    pub stats:  SolveStats,
}

impl Solution {
    /// Build a solution, computing its length under `shape`.
    pub(crate) fn evaluate<D: Distances + ?Sized>(
        order: Vec<usize>,
        dist:  &D,
        shape: TourShape,
        stats: SolveStats,
    ) -> Self {
        let length = tour_length(&order, dist, shape);
        Self { order, length, stats }
    }

    /// The identity tour for `n ≤ 2`, where every order is optimal.
    pub(crate) fn trivial<D: Distances + ?Sized>(
        dist:      &D,
        start:     usize,
        shape:     TourShape,
        algorithm: &'static str,
    ) -> Self {
        Self::evaluate(identity_order(dist.len(), start), dist, shape, SolveStats::new(algorithm))
    }

    /// Exhaustive answer for `n ≤ 3`: at most two candidate orders.
    pub(crate) fn small_instance<D: Distances + ?Sized>(
        dist:      &D,
        start:     usize,
        shape:     TourShape,
        algorithm: &'static str,
    ) -> Self {
        let fwd = identity_order(dist.len(), start);
        if fwd.len() < 3 {
            return Self::trivial(dist, start, shape, algorithm);
        }
        let rev = vec![fwd[0], fwd[2], fwd[1]];
        let best = if tour_length(&rev, dist, shape) < tour_length(&fwd, dist, shape) { rev } else { fwd };
        Self::evaluate(best, dist, shape, SolveStats::new(algorithm))
    }
}

/// Diagnostics common to all solver families.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SolveStats {
    /// Short family name, e.g. `"exact"` or `"ant_colony"`.
    pub algorithm:        &'static str,
    /// Main-loop iterations performed (generations, ACO iterations, …).
    pub iterations:       usize,
    pub elapsed:          Duration,
    /// `true` if a time budget or cancellation cut the search short.
    pub budget_exhausted: bool,
    pub detail:           StatsDetail,
}

impl SolveStats {
    pub fn new(algorithm: &'static str) -> Self {
        Self {
            algorithm,
            iterations: 0,
            elapsed: Duration::ZERO,
            budget_exhausted: false,
            detail: StatsDetail::None,
        }
    }
}

/// Family-specific diagnostics.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StatsDetail {
    #[default]
    None,
    Exact {
        /// DP states evaluated (memo lookups included).
        dp_calls:  usize,
        /// Lookups answered from the arena.
        dp_hits:   usize,
        /// `false` when the deadline interrupted the DP.
        completed: bool,
    },
    LocalSearch {
        /// Improving 2-opt reversals applied.
        swaps: usize,
    },
    Hybrid(Composition),
}

/// How a hybrid solution was put together.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Composition {
    /// Family of the construction phase.
    pub base:             &'static str,
    /// Construction runs performed.
    pub starts:           usize,
    /// Best length after construction, before polishing.
    pub initial_length:   f64,
    pub polish_max_swaps: usize,
    pub polish_max_time:  Option<Duration>,
    /// Improving reversals the polish actually applied.
    pub polish_swaps:     usize,
}
