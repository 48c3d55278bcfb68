//! Ant lion optimisation.
//!
//! The population holds `population_size` ant lions (tours) and one elite,
//! the best tour ever seen.  Each iteration every ant `i`:
//!
//! 1. picks a source: the elite with probability `elite_probability`,
//!    otherwise an ant lion chosen by the configured [`Selection`];
//! 2. random-walks from it: a swap of two non-depot positions, then a
//!    segment reversal, each applied with the iteration's mutation rate
//!    (decaying linearly from `initial_mutation_rate` to
//!    `final_mutation_rate`);
//! 3. is polished by up to `polish_swaps` 2-opt reversals.
//!
//! Ant `i` replaces ant lion `i` if it is shorter, and the elite is updated
//! from the ant lions afterwards.

use tracing::debug;

use wp_core::{Deadline, DistanceMatrix, Distances, SolverRng};

use crate::population::{argmin, build_batch, child_rngs, lengths, random_tour, snapshot};
use crate::tour::check_instance;
use crate::{AntLionConfig, Selection, Solution, SolveStats, TourResult, TourShape, TourSolver, tour_length, two_opt};

/// 2-opt budget for polishing the random initial ant lions.
const INITIAL_POLISH_SWAPS: usize = 5;

#[derive(Clone, Debug, Default)]
pub struct AntLionSolver {
    config: AntLionConfig,
}

impl AntLionSolver {
    pub fn new(config: AntLionConfig) -> TourResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AntLionConfig {
        &self.config
    }
}

impl TourSolver for AntLionSolver {
    fn name(&self) -> &'static str {
        "ant_lion"
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
        let mut rng = SolverRng::new(cfg.seed);
        debug!(event = "solve_start", algorithm = self.name(), n, population = cfg.population_size);

        let mut lions: Vec<Vec<usize>> = (0..cfg.population_size)
            .map(|_| {
                let mut t = random_tour(n, start, &mut rng);
                two_opt(&mut t, &m, shape, INITIAL_POLISH_SWAPS, deadline);
                t
            })
            .collect();
        let mut lion_lens = lengths(&lions, &m, shape);
        let e = argmin(&lion_lens);
        let (mut elite, mut elite_len) = (lions[e].clone(), lion_lens[e]);

        let mut iterations = 0;
        let mut interrupted = false;
        for it in 0..cfg.iterations {
            if deadline.expired() {
                interrupted = true;
                break;
            }
            let rate = cfg.mutation_rate_at(it);

            // Sources are drawn on the solver RNG so the batch below only
            // reads shared state.  `None` walks around the elite.
            let sources: Vec<Option<usize>> = (0..cfg.population_size)
                .map(|_| {
                    (!rng.gen_bool(cfg.elite_probability))
                        .then(|| select(cfg.selection, &lion_lens, &mut rng))
                })
                .collect();

            let (lions_ref, elite_ref) = (&lions, &elite);
            let ants = build_batch(child_rngs(&mut rng, cfg.population_size), |k, mut r| {
                let source = match sources[k] {
                    Some(i) => &lions_ref[i],
                    None    => elite_ref,
                };
                let ant = walk(source, rate, cfg.polish_swaps, &m, shape, deadline, &mut r);
                let len = tour_length(&ant, &m, shape);
                (ant, len)
            });

            for (i, (ant, len)) in ants.into_iter().enumerate() {
                if len < lion_lens[i] {
                    lions[i] = ant;
                    lion_lens[i] = len;
                }
            }
            let b = argmin(&lion_lens);
            if lion_lens[b] < elite_len {
                elite.clone_from(&lions[b]);
                elite_len = lion_lens[b];
            }
            iterations += 1;
        }

        let mut stats = SolveStats::new(self.name());
        stats.iterations = iterations;
        stats.elapsed = deadline.elapsed();
        stats.budget_exhausted = interrupted;
        let sol = Solution::evaluate(elite, dist, shape, stats);
        debug!(event = "solve_end", algorithm = self.name(), iterations, length = sol.length);
        Ok(sol)
    }
}

/// Pick a non-elite source ant lion.
fn select(selection: Selection, lens: &[f64], rng: &mut SolverRng) -> usize {
    match selection {
        Selection::Uniform => rng.gen_range(0..lens.len()),
        Selection::Tournament => {
            let a = rng.gen_range(0..lens.len());
            let b = rng.gen_range(0..lens.len());
            if lens[a] < lens[b] { a } else { b }
        }
        Selection::RouletteWheel => {
            // Fitness 1 / length; unreachable tours get zero weight.
            let fitness = |l: f64| if l.is_finite() { 1.0 / l.max(1e-10) } else { 0.0 };
            let total: f64 = lens.iter().map(|&l| fitness(l)).sum();
            if total <= 0.0 || !total.is_finite() {
                return rng.gen_range(0..lens.len());
            }
            let r = rng.unit() * total;
            let mut acc = 0.0;
            for (i, &l) in lens.iter().enumerate() {
                acc += fitness(l);
                if r <= acc {
                    return i;
                }
            }
            lens.len() - 1
        }
    }
}

/// Random walk around `source`, then a short 2-opt polish.
fn walk(
    source:       &[usize],
    rate:         f64,
    polish_swaps: usize,
    dist:         &DistanceMatrix,
    shape:        TourShape,
    deadline:     &Deadline,
    rng:          &mut SolverRng,
) -> Vec<usize> {
    let mut ant = source.to_vec();
    let n = ant.len();
    if rng.gen_bool(rate) {
        let (i, j) = rng.distinct_pair(1, n);
        ant.swap(i, j);
    }
    if rng.gen_bool(rate) {
        let (i, j) = rng.distinct_pair(1, n);
        ant[i..=j].reverse();
    }
    if polish_swaps > 0 {
        two_opt(&mut ant, dist, shape, polish_swaps, deadline);
    }
    ant
}
