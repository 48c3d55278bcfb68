//! Exploration-then-exploitation compositions.
//!
//! A hybrid solve runs its base method `starting_point_count` times, keeps
//! the shortest result, and polishes it with a 2-opt pass whose budget
//! (`polish_max_swaps`, `polish_max_time`) is larger than the plain local
//! search default.  The [`Composition`] in the stats records exactly what
//! was run.
//!
//! # Starting points
//!
//! - Nearest neighbour starts from `start`, then `n/2`, `n/4`, `n/8`, …,
//!   then the remaining indices in ascending order, skipping duplicates.
//!   Tours built from another node are rotated so they begin at `start`.
//! - Metaheuristic bases are re-run with seeds `seed, seed + 1, …`.

use tracing::debug;

use wp_core::{Deadline, Distances};

use crate::population::snapshot;
use crate::tour::check_instance;
use crate::{
    AntColonySolver, AntLionSolver, BaseAlgorithm, Composition, GeneticSolver, HybridConfig, Solution,
    SolveStats, StatsDetail, TourResult, TourShape, TourSolver, nearest_neighbor, rotate_to_start,
    tour_length, two_opt,
};

#[derive(Clone, Debug, Default)]
pub struct HybridSolver {
    config: HybridConfig,
}

impl HybridSolver {
    pub fn new(config: HybridConfig) -> TourResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HybridConfig {
        &self.config
    }
}

impl TourSolver for HybridSolver {
    fn name(&self) -> &'static str {
        "hybrid"
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
        let cfg = &self.config;
        let m = snapshot(dist);
        let base = cfg.base.name();
        debug!(event = "solve_start", algorithm = self.name(), base, n, starts = cfg.starting_point_count);

        // ── Exploration ───────────────────────────────────────────────────
        let mut best: Option<(Vec<usize>, f64)> = None;
        let mut starts = 0;
        let mut consider = |order: Vec<usize>| {
            let len = tour_length(&order, &m, shape);
            if best.as_ref().is_none_or(|(_, b)| len < *b) {
                best = Some((order, len));
            }
        };
        match &cfg.base {
            BaseAlgorithm::NearestNeighbor => {
                for sp in start_points(n, start, cfg.starting_point_count) {
                    let mut order = nearest_neighbor(&m, sp);
                    rotate_to_start(&mut order, start);
                    consider(order);
                    starts += 1;
                }
            }
            BaseAlgorithm::Genetic(c) => {
                for k in 0..cfg.starting_point_count as u64 {
                    let mut c = c.clone();
                    c.seed = c.seed.wrapping_add(k);
                    consider(GeneticSolver::new(c)?.solve_within(&m, start, shape, deadline)?.order);
                    starts += 1;
                }
            }
            BaseAlgorithm::AntColony(c) => {
                for k in 0..cfg.starting_point_count as u64 {
                    let mut c = c.clone();
                    c.seed = c.seed.wrapping_add(k);
                    let solver = AntColonySolver::new(c)?;
                    let sub = deadline.sub(solver.config().time_budget);
                    consider(solver.solve_within(&m, start, shape, &sub)?.order);
                    starts += 1;
                }
            }
            BaseAlgorithm::AntLion(c) => {
                for k in 0..cfg.starting_point_count as u64 {
                    let mut c = c.clone();
                    c.seed = c.seed.wrapping_add(k);
                    let solver = AntLionSolver::new(c)?;
                    let sub = deadline.sub(solver.config().time_budget);
                    consider(solver.solve_within(&m, start, shape, &sub)?.order);
                    starts += 1;
                }
            }
        }
        let (mut order, initial_length) = match best {
            Some(b) => b,
            None => {
                let order = nearest_neighbor(&m, start);
                let len = tour_length(&order, &m, shape);
                (order, len)
            }
        };

        // ── Exploitation ──────────────────────────────────────────────────
        let polish_deadline = deadline.sub(cfg.polish_max_time);
        let imp = two_opt(&mut order, &m, shape, cfg.polish_max_swaps, &polish_deadline);

        let composition = Composition {
            base,
            starts,
            initial_length,
            polish_max_swaps: cfg.polish_max_swaps,
            polish_max_time:  cfg.polish_max_time,
            polish_swaps:     imp.swaps,
        };
        let mut stats = SolveStats::new(self.name());
        stats.iterations = starts;
        stats.elapsed = deadline.elapsed();
        stats.budget_exhausted = imp.interrupted;
        stats.detail = StatsDetail::Hybrid(composition);
        let sol = Solution::evaluate(order, dist, shape, stats);

        debug!(
            event = "solve_end",
            algorithm = self.name(),
            base,
            starts,
            initial_length,
            length = sol.length,
            polish_swaps = imp.swaps,
        );
        Ok(sol)
    }
}

/// Up to `count` distinct construction starts for nearest neighbour.
pub(crate) fn start_points(n: usize, start: usize, count: usize) -> Vec<usize> {
    let halvings = std::iter::successors(Some(n / 2), |&k| (k > 1).then_some(k / 2));
    let mut points: Vec<usize> = Vec::with_capacity(count.min(n));
    for p in std::iter::once(start).chain(halvings).chain(0..n) {
        if points.len() == count.min(n) {
            break;
        }
        if !points.contains(&p) {
            points.push(p);
        }
    }
    points
}
