//! Held–Karp bitmask dynamic programme.
//!
//! `dp(S, i)` is the cheapest path that leaves `start`, visits exactly the
//! set `S` (which contains `start` and `i`), and ends at `i`:
//!
//! ```text
//! dp({start, i}, i) = d(start, i)
//! dp(S, i)          = min_{j ∈ S \ {start, i}} dp(S \ {i}, j) + d(j, i)
//! ```
//!
//! The memo is an arena owned by one call and dropped when it returns.  The
//! deadline is checked on every DP call; an interrupted sub-problem is never
//! stored, so every arena entry is exact and predecessor walks from a
//! completed endpoint are always valid.

use rustc_hash::FxHashMap;
use tracing::debug;

use wp_core::{Deadline, Distances};

use crate::tour::check_instance;
use crate::{ExactConfig, Solution, SolveStats, StatsDetail, TourResult, TourShape, TourSolver, identity_order};

/// Optimal tours for small instances.
#[derive(Clone, Debug, Default)]
pub struct ExactSolver {
    config: ExactConfig,
}

impl ExactSolver {
    pub fn new(config: ExactConfig) -> TourResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExactConfig {
        &self.config
    }
}

impl TourSolver for ExactSolver {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn default_deadline(&self) -> Deadline {
        Deadline::from_limit(self.config.time_limit)
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
        if n > self.config.max_nodes {
            debug!(event = "solve_skipped", algorithm = self.name(), n, max_nodes = self.config.max_nodes);
            let mut stats = SolveStats::new(self.name());
            stats.budget_exhausted = true;
            stats.detail = StatsDetail::Exact { dp_calls: 0, dp_hits: 0, completed: false };
            return Ok(Solution::evaluate(identity_order(n, start), dist, shape, stats));
        }
        debug!(event = "solve_start", algorithm = self.name(), n, start);

        let mut hk = HeldKarp {
            dist,
            start,
            deadline,
            arena: FxHashMap::default(),
            calls: 0,
            hits:  0,
        };
        let full: u64 = (1u64 << n) - 1;

        // Best completed endpoint, including the return edge when closed.
        let mut best: Option<(f64, usize)> = None;
        let mut completed = true;
        let mut endpoints = 0usize;
        for end in (0..n).filter(|&i| i != start) {
            let Some(cost) = hk.dp(full, end) else {
                completed = false;
                break;
            };
            endpoints += 1;
            let total = if shape.is_closed() { cost + dist.distance(end, start) } else { cost };
            if best.is_none_or(|(b, _)| total < b) {
                best = Some((total, end));
            }
        }

        let order = match best {
            Some((cost, end)) if cost.is_finite() => hk.reconstruct(full, end),
            _ => None,
        }
        .unwrap_or_else(|| identity_order(n, start));

        let mut stats = SolveStats::new(self.name());
        stats.iterations = endpoints;
        stats.elapsed = deadline.elapsed();
        stats.budget_exhausted = !completed;
        stats.detail = StatsDetail::Exact { dp_calls: hk.calls, dp_hits: hk.hits, completed };
        let sol = Solution::evaluate(order, dist, shape, stats);

        debug!(
            event = "solve_end",
            algorithm = self.name(),
            length = sol.length,
            dp_calls = hk.calls,
            dp_hits = hk.hits,
            completed,
        );
        Ok(sol)
    }
}

// ── DP internals ──────────────────────────────────────────────────────────────

struct HeldKarp<'a, D: Distances + ?Sized> {
    dist:     &'a D,
    start:    usize,
    deadline: &'a Deadline,
    /// `(mask, end) → (cost, predecessor)`.
    arena:    FxHashMap<(u64, usize), (f64, usize)>,
    calls:    usize,
    hits:     usize,
}

impl<D: Distances + ?Sized> HeldKarp<'_, D> {
    /// `None` when the deadline expired before the value was known.
    fn dp(&mut self, mask: u64, i: usize) -> Option<f64> {
        self.calls += 1;
        if let Some(&(cost, _)) = self.arena.get(&(mask, i)) {
            self.hits += 1;
            return Some(cost);
        }
        if self.deadline.expired() {
            return None;
        }

        let start_bit = 1u64 << self.start;
        let prev_mask = mask & !(1u64 << i);
        let entry = if prev_mask == start_bit {
            (self.dist.distance(self.start, i), self.start)
        } else {
            let mut best = (f64::INFINITY, usize::MAX);
            let mut rest = prev_mask & !start_bit;
            while rest != 0 {
                let j = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                let cand = self.dp(prev_mask, j)? + self.dist.distance(j, i);
                // Keep some predecessor even when every candidate is infinite.
                if cand < best.0 || best.1 == usize::MAX {
                    best = (cand, j);
                }
            }
            best
        };

        self.arena.insert((mask, i), entry);
        Some(entry.0)
    }

    /// Walk predecessors from `(full, end)` back to `start`.
    fn reconstruct(&self, full: u64, end: usize) -> Option<Vec<usize>> {
        let mut order = vec![end];
        let (mut mask, mut cur) = (full, end);
        while cur != self.start {
            let &(_, prev) = self.arena.get(&(mask, cur))?;
            mask &= !(1u64 << cur);
            cur = prev;
            order.push(cur);
        }
        order.reverse();
        Some(order)
    }
}
