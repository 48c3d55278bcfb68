//! Genetic algorithm over depot-anchored permutations.
//!
//! Each generation: binary-tournament selection of a full parent pool,
//! order crossover on consecutive parent pairs with probability
//! `crossover_rate`, swap mutation with probability `mutation_rate`, then
//! wholesale replacement.  The best individual ever seen is tracked
//! separately, so elitism does not depend on it surviving in the
//! population.

use tracing::debug;

use wp_core::{Deadline, Distances, SolverRng};

use crate::population::{argmin, lengths, random_tour, snapshot};
use crate::tour::check_instance;
use crate::{GeneticConfig, Solution, SolveStats, TourResult, TourShape, TourSolver};

/// Tours shorter than this are returned unchanged by crossover and mutation.
const MIN_OPERATOR_LEN: usize = 4;

#[derive(Clone, Debug, Default)]
pub struct GeneticSolver {
    config: GeneticConfig,
}

impl GeneticSolver {
    pub fn new(config: GeneticConfig) -> TourResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }
}

impl TourSolver for GeneticSolver {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn solve_within<D: Distances + ?Sized>(
        &self,
        dist:     &D,
        start:    usize,
        shape:    TourShape,
        deadline: &Deadline,
    ) -> TourResult<Solution> {
        let n = check_instance(dist, start)?;
        if n <= 3 {
            return Ok(Solution::small_instance(dist, start, shape, self.name()));
        }
        let cfg = &self.config;
        let m = snapshot(dist);
        let mut rng = SolverRng::new(cfg.seed);
        debug!(event = "solve_start", algorithm = self.name(), n, population = cfg.population_size);

        let mut pop: Vec<Vec<usize>> =
            (0..cfg.population_size).map(|_| random_tour(n, start, &mut rng)).collect();
        let mut scores = lengths(&pop, &m, shape);
        let i = argmin(&scores);
        let (mut best, mut best_len) = (pop[i].clone(), scores[i]);

        let mut generations = 0;
        let mut interrupted = false;
        for _ in 0..cfg.generations {
            if deadline.expired() {
                interrupted = true;
                break;
            }

            let parents: Vec<usize> =
                (0..cfg.population_size).map(|_| tournament(&scores, &mut rng)).collect();

            let mut children = Vec::with_capacity(cfg.population_size + 1);
            for k in (0..parents.len()).step_by(2) {
                let p1 = &pop[parents[k]];
                // An odd pool pairs its last parent with the first.
                let p2 = &pop[parents[(k + 1) % parents.len()]];
                let (mut c1, mut c2) = if rng.gen_bool(cfg.crossover_rate) {
                    (order_crossover(p1, p2, &mut rng), order_crossover(p2, p1, &mut rng))
                } else {
                    (p1.clone(), p2.clone())
                };
                swap_mutation(&mut c1, cfg.mutation_rate, &mut rng);
                swap_mutation(&mut c2, cfg.mutation_rate, &mut rng);
                children.push(c1);
                children.push(c2);
            }
            children.truncate(cfg.population_size);

            pop = children;
            scores = lengths(&pop, &m, shape);
            let i = argmin(&scores);
            if scores[i] < best_len {
                best.clone_from(&pop[i]);
                best_len = scores[i];
            }
            generations += 1;
        }

        let mut stats = SolveStats::new(self.name());
        stats.iterations = generations;
        stats.elapsed = deadline.elapsed();
        stats.budget_exhausted = interrupted;
        let sol = Solution::evaluate(best, dist, shape, stats);
        debug!(event = "solve_end", algorithm = self.name(), generations, length = sol.length);
        Ok(sol)
    }
}

// ── Operators ─────────────────────────────────────────────────────────────────

/// Index of the better of two uniformly drawn individuals.
fn tournament(scores: &[f64], rng: &mut SolverRng) -> usize {
    let a = rng.gen_range(0..scores.len());
    let b = rng.gen_range(0..scores.len());
    if scores[a] < scores[b] { a } else { b }
}

/// Order crossover (OX).
///
/// Copies `p1[a..b]` for a random `1 ≤ a < b < n - 1`, then fills the
/// remaining positions left to right with the missing genes in `p2` order.
/// Position 0 keeps the depot because `a ≥ 1` and `p2[0]` is the depot.
pub(crate) fn order_crossover(p1: &[usize], p2: &[usize], rng: &mut SolverRng) -> Vec<usize> {
    let n = p1.len();
    if n < MIN_OPERATOR_LEN {
        return p1.to_vec();
    }
    let (a, b) = rng.distinct_pair(1, n - 1);

    let mut taken = vec![false; n];
    for &g in &p1[a..b] {
        taken[g] = true;
    }
    let mut fill = p2.iter().copied().filter(|&g| !taken[g]);

    let mut child = Vec::with_capacity(n);
    for pos in 0..n {
        if (a..b).contains(&pos) {
            child.push(p1[pos]);
        } else if let Some(g) = fill.next() {
            child.push(g);
        }
    }
    child
}

/// With probability `rate`, swap two distinct non-depot positions.
pub(crate) fn swap_mutation(tour: &mut [usize], rate: f64, rng: &mut SolverRng) {
    if tour.len() < MIN_OPERATOR_LEN || !rng.gen_bool(rate) {
        return;
    }
    let (i, j) = rng.distinct_pair(1, tour.len());
    tour.swap(i, j);
}
