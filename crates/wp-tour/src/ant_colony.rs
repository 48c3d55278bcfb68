//! Ant colony optimisation.
//!
//! # Iteration
//!
//! 1. Every ant builds a tour.  From node `i` the next node `j` is drawn
//!    with probability proportional to `τ(i,j)^α · η(i,j)^β`, where
//!    `η = 1 / max(d, 1e-10)`.  Unreachable edges have `η = 0` and are never
//!    drawn; when every remaining weight is zero the ant moves to the nearest
//!    unvisited node instead.
//! 2. All pheromone evaporates: `τ ← (1 - ρ) τ`.
//! 3. Each finite-length tour deposits `q / length` on its edges, in both
//!    directions.
//!
//! Steps 2 and 3 run only after every ant of the iteration has finished,
//! so the `parallel` feature cannot change the result.
//!
//! # Start nodes
//!
//! For a closed tour the cycle's rotation is irrelevant, so ant 0 starts at
//! the depot and the others at random non-depot nodes; tours are rotated to
//! the depot afterwards.  An open tour must begin at the depot, so every ant
//! starts there.

use tracing::{debug, trace};

use wp_core::{Deadline, DistanceMatrix, Distances, SolverRng};

use crate::population::{build_batch, child_rngs, snapshot};
use crate::tour::check_instance;
use crate::{AntColonyConfig, Solution, SolveStats, TourResult, TourShape, TourSolver, rotate_to_start, tour_length};

/// Distances below this are treated as this for desirability.
const MIN_DISTANCE: f64 = 1e-10;

#[derive(Clone, Debug, Default)]
pub struct AntColonySolver {
    config: AntColonyConfig,
}

impl AntColonySolver {
    pub fn new(config: AntColonyConfig) -> TourResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AntColonyConfig {
        &self.config
    }
}

impl TourSolver for AntColonySolver {
    fn name(&self) -> &'static str {
        "ant_colony"
    }

    fn default_deadline(&self) -> Deadline {
        Deadline::from_limit(self.config.time_budget)
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
        let mut colony = Colony::new(&m, cfg);
        let mut rng = SolverRng::new(cfg.seed);
        debug!(event = "solve_start", algorithm = self.name(), n, ants = cfg.num_ants);

        let mut best: Option<(Vec<usize>, f64)> = None;
        let mut iterations = 0;
        let mut interrupted = false;
        for it in 0..cfg.iterations {
            if deadline.expired() {
                interrupted = true;
                break;
            }

            let colony_ref = &colony;
            let tours = build_batch(child_rngs(&mut rng, cfg.num_ants), |k, mut r| {
                let first = match shape {
                    TourShape::Closed if k > 0 => {
                        // Uniform over the n - 1 non-depot nodes.
                        let v = r.gen_range(0..n - 1);
                        if v >= start { v + 1 } else { v }
                    }
                    _ => start,
                };
                let mut tour = colony_ref.construct(first, &mut r);
                rotate_to_start(&mut tour, start);
                let len = tour_length(&tour, &m, shape);
                (tour, len)
            });

            for (tour, len) in &tours {
                if best.as_ref().is_none_or(|(_, b)| *len < *b) {
                    best = Some((tour.clone(), *len));
                }
            }
            colony.evaporate(cfg.rho);
            for (tour, len) in &tours {
                colony.deposit(tour, *len, cfg.deposit_constant, shape);
            }
            iterations += 1;
            trace!(iteration = it, best = best.as_ref().map_or(f64::INFINITY, |(_, l)| *l));
        }

        // Zero iterations (or an already-expired deadline): fall back to a
        // pheromone-free greedy tour.
        let order = match best {
            Some((tour, _)) => tour,
            None => crate::nearest_neighbor(&m, start),
        };
        let mut stats = SolveStats::new(self.name());
        stats.iterations = iterations;
        stats.elapsed = deadline.elapsed();
        stats.budget_exhausted = interrupted;
        let sol = Solution::evaluate(order, dist, shape, stats);
        debug!(event = "solve_end", algorithm = self.name(), iterations, length = sol.length);
        Ok(sol)
    }
}

// ── Pheromone state ───────────────────────────────────────────────────────────

/// Pheromone and desirability matrices for one solve.
struct Colony<'m> {
    dist:  &'m DistanceMatrix,
    n:     usize,
    alpha: f64,
    beta:  f64,
    /// Row-major `τ(i, j)`.
    tau:   Vec<f64>,
    /// Row-major `η(i, j)`; zero for unreachable pairs.
    eta:   Vec<f64>,
}

impl<'m> Colony<'m> {
    fn new(dist: &'m DistanceMatrix, cfg: &AntColonyConfig) -> Self {
        let n = dist.len();
        // τ0 = 1 / (n · d) for the first usable pair, else 1 / n.
        let scale = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .map(|(i, j)| dist.distance(i, j))
            .find(|d| d.is_finite() && *d > MIN_DISTANCE)
            .unwrap_or(1.0);
        let tau0 = 1.0 / (n as f64 * scale).max(MIN_DISTANCE);

        let eta = (0..n * n)
            .map(|c| 1.0 / dist.distance(c / n, c % n).max(MIN_DISTANCE))
            .collect();
        Self { dist, n, alpha: cfg.alpha, beta: cfg.beta, tau: vec![tau0; n * n], eta }
    }

    #[inline]
    fn weight(&self, i: usize, j: usize) -> f64 {
        let c = i * self.n + j;
        self.tau[c].powf(self.alpha) * self.eta[c].powf(self.beta)
    }

    /// One ant's tour from `first`, visiting every node once.
    fn construct(&self, first: usize, rng: &mut SolverRng) -> Vec<usize> {
        let n = self.n;
        let mut visited = vec![false; n];
        let mut tour = Vec::with_capacity(n);
        let mut cur = first;
        visited[cur] = true;
        tour.push(cur);

        let mut weights = Vec::with_capacity(n);
        for _ in 1..n {
            weights.clear();
            weights.extend((0..n).filter(|&j| !visited[j]).map(|j| (j, self.weight(cur, j))));
            let total: f64 = weights.iter().map(|&(_, w)| w).sum();

            let next = if total > 0.0 && total.is_finite() {
                let r = rng.unit() * total;
                let mut acc = 0.0;
                let mut pick = weights[weights.len() - 1].0;
                for &(j, w) in &weights {
                    acc += w;
                    if r <= acc {
                        pick = j;
                        break;
                    }
                }
                pick
            } else {
                self.nearest_unvisited(cur, &visited)
            };
            visited[next] = true;
            tour.push(next);
            cur = next;
        }
        tour
    }

    fn nearest_unvisited(&self, from: usize, visited: &[bool]) -> usize {
        let mut best: Option<(usize, f64)> = None;
        for j in (0..self.n).filter(|&j| !visited[j]) {
            let d = self.dist.distance(from, j);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        best.map_or(from, |(j, _)| j)
    }

    fn evaporate(&mut self, rho: f64) {
        for t in &mut self.tau {
            *t *= 1.0 - rho;
        }
    }

    fn deposit(&mut self, tour: &[usize], length: f64, q: f64, shape: TourShape) {
        if !length.is_finite() {
            return;
        }
        let delta = q / length.max(MIN_DISTANCE);
        let n = self.n;
        let closing = shape.is_closed().then(|| (tour[tour.len() - 1], tour[0]));
        for (a, b) in tour.windows(2).map(|w| (w[0], w[1])).chain(closing) {
            self.tau[a * n + b] += delta;
            self.tau[b * n + a] += delta;
        }
    }
}
