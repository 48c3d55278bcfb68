//! Nearest-neighbour construction and 2-opt improvement.
//!
//! # 2-opt neighbourhood
//!
//! A move reverses `order[i..=j]` for `1 ≤ i < j < n`; position 0 (the
//! depot) never moves.  Removed edges are `(order[i-1], order[i])` and
//! `(order[j], next)` where `next` is `order[j+1]`, the depot when the tour
//! is closed and `j` is last, or nothing for an open tour's tail.
//!
//! Search is first-improvement: the first improving reversal is applied and
//! the scan restarts.  A reversal is applied only when it lowers the tour
//! length by more than [`IMPROVEMENT_EPS`], so the output is never longer
//! than the input.  The boundary-edge delta is computed first; the reversed
//! segment's interior is re-summed only for boundary-improving candidates,
//! which keeps the guarantee on asymmetric inputs at no cost for symmetric
//! ones.

use tracing::debug;

use wp_core::{Deadline, Distances};

use crate::tour::check_instance;
use crate::{LocalSearchConfig, Solution, SolveStats, StatsDetail, TourResult, TourShape, TourSolver, tour_length};

/// Minimum length reduction for a reversal to count as improving.
pub const IMPROVEMENT_EPS: f64 = 1e-10;

/// Result of one [`two_opt`] run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Improvement {
    /// Improving reversals applied.
    pub swaps:       usize,
    /// `true` if the deadline stopped the search before a local optimum.
    pub interrupted: bool,
}

/// Greedy tour: from `start`, repeatedly move to the closest unvisited
/// waypoint.  Ties go to the lower index; when every remaining edge is
/// infinite the lowest-indexed unvisited waypoint is taken.
pub fn nearest_neighbor<D: Distances + ?Sized>(dist: &D, start: usize) -> Vec<usize> {
    let n = dist.len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut cur = start;
    visited[cur] = true;
    order.push(cur);

    for _ in 1..n {
        let mut best: Option<(usize, f64)> = None;
        for j in (0..n).filter(|&j| !visited[j]) {
            let d = dist.distance(cur, j);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        let Some((next, _)) = best else { break };
        visited[next] = true;
        order.push(next);
        cur = next;
    }
    order
}

/// Improve `order` in place by 2-opt reversals.
///
/// Stops at a local optimum, after `max_swaps` improving reversals, or when
/// `deadline` expires (checked once per scan).
pub fn two_opt<D: Distances + ?Sized>(
    order:     &mut [usize],
    dist:      &D,
    shape:     TourShape,
    max_swaps: usize,
    deadline:  &Deadline,
) -> Improvement {
    let len = order.len();
    let mut out = Improvement::default();
    if len < 3 {
        return out;
    }

    'scan: while out.swaps < max_swaps {
        if deadline.expired() {
            out.interrupted = true;
            break;
        }
        for i in 1..len - 1 {
            for j in i + 1..len {
                if reversal_improves(order, dist, shape, i, j) {
                    order[i..=j].reverse();
                    out.swaps += 1;
                    continue 'scan;
                }
            }
        }
        // Full scan without an improving move: local optimum.
        break;
    }
    out
}

fn reversal_improves<D: Distances + ?Sized>(
    order: &[usize],
    dist:  &D,
    shape: TourShape,
    i:     usize,
    j:     usize,
) -> bool {
    let (prev, a, b) = (order[i - 1], order[i], order[j]);
    let next = match order.get(j + 1) {
        Some(&v) => Some(v),
        None if shape.is_closed() => Some(order[0]),
        None => None,
    };
    let old_edges = dist.distance(prev, a) + next.map_or(0.0, |nx| dist.distance(b, nx));
    let new_edges = dist.distance(prev, b) + next.map_or(0.0, |nx| dist.distance(a, nx));
    if new_edges >= old_edges {
        return false;
    }
    let segment = &order[i..=j];
    let old_inner: f64 = segment.windows(2).map(|w| dist.distance(w[0], w[1])).sum();
    let new_inner: f64 = segment.windows(2).map(|w| dist.distance(w[1], w[0])).sum();
    new_edges + new_inner < old_edges + old_inner - IMPROVEMENT_EPS
}

/// Nearest neighbour from `start`, then 2-opt under `config`'s budgets.
pub fn nn_then_two_opt<D: Distances + ?Sized>(
    dist:     &D,
    start:    usize,
    shape:    TourShape,
    config:   &LocalSearchConfig,
    deadline: &Deadline,
) -> (Vec<usize>, Improvement) {
    let mut order = nearest_neighbor(dist, start);
    let before = tour_length(&order, dist, shape);
    let imp = two_opt(&mut order, dist, shape, config.max_swaps, deadline);
    let after = tour_length(&order, dist, shape);
    debug_assert!(after <= before + 1e-6, "2-opt lengthened the tour: {before} -> {after}");
    (order, imp)
}

// ── Solvers ───────────────────────────────────────────────────────────────────

/// Nearest neighbour followed by 2-opt.
#[derive(Clone, Debug, Default)]
pub struct LocalSearchSolver {
    config: LocalSearchConfig,
}

impl LocalSearchSolver {
    pub fn new(config: LocalSearchConfig) -> TourResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl TourSolver for LocalSearchSolver {
    fn name(&self) -> &'static str {
        "local_search"
    }

    fn default_deadline(&self) -> Deadline {
        Deadline::from_limit(self.config.max_time)
    }

    fn solve_within<D: Distances + ?Sized>(
        &self,
        dist:     &D,
        start:    usize,
        shape:    TourShape,
        deadline: &Deadline,
    ) -> TourResult<Solution> {
        let n = check_instance(dist, start)?;
        if n <= 2 {
            return Ok(Solution::trivial(dist, start, shape, self.name()));
        }
        let (order, imp) = nn_then_two_opt(dist, start, shape, &self.config, deadline);

        let mut stats = SolveStats::new(self.name());
        stats.iterations = 1;
        stats.elapsed = deadline.elapsed();
        stats.budget_exhausted = imp.interrupted;
        stats.detail = StatsDetail::LocalSearch { swaps: imp.swaps };
        let sol = Solution::evaluate(order, dist, shape, stats);
        debug!(event = "solve_end", algorithm = self.name(), n, length = sol.length, swaps = imp.swaps);
        Ok(sol)
    }
}

/// Nearest neighbour alone; no improvement phase.
#[derive(Copy, Clone, Debug, Default)]
pub struct GreedySolver;

impl TourSolver for GreedySolver {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn solve_within<D: Distances + ?Sized>(
        &self,
        dist:     &D,
        start:    usize,
        shape:    TourShape,
        deadline: &Deadline,
    ) -> TourResult<Solution> {
        check_instance(dist, start)?;
        let mut stats = SolveStats::new(self.name());
        stats.iterations = 1;
        stats.elapsed = deadline.elapsed();
        Ok(Solution::evaluate(nearest_neighbor(dist, start), dist, shape, stats))
    }
}
