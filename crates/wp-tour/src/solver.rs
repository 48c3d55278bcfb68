//! The solver trait and configuration-driven dispatch.
//!
//! # Budgets
//!
//! Every solver derives a [`Deadline`] from its own config
//! ([`TourSolver::default_deadline`]).  Callers that need to stop a solve
//! from another thread pass a [`CancelToken`] through
//! [`TourSolver::solve_cancellable`]; the token is checked at the same loop
//! boundaries as the wall-clock limit.

use wp_core::{CancelToken, Deadline, Distances};

use crate::{
    AntColonyConfig, AntColonySolver, AntLionConfig, AntLionSolver, ExactConfig, ExactSolver,
    GeneticConfig, GeneticSolver, GreedySolver, HybridConfig, HybridSolver, LocalSearchConfig,
    LocalSearchSolver, Solution, TourResult, TourShape,
};

/// A tour optimisation algorithm.
///
/// # Contract
///
/// For every valid input (`n ≥ 1`, `start < n`) the returned
/// [`Solution::order`] is a permutation of `0..n` beginning with `start`,
/// and [`Solution::length`] equals `tour_length(order, dist, shape)`.  An
/// exhausted budget is never an error.
pub trait TourSolver {
    /// Short family name reported in [`SolveStats`](crate::SolveStats).
    fn name(&self) -> &'static str;

    /// The budget implied by this solver's configuration.
    fn default_deadline(&self) -> Deadline {
        Deadline::none()
    }

    /// Solve under an explicit deadline.
    fn solve_within<D: Distances + ?Sized>(
        &self,
        dist:     &D,
        start:    usize,
        shape:    TourShape,
        deadline: &Deadline,
    ) -> TourResult<Solution>;

    /// Solve under the configured budget.
    fn solve<D: Distances + ?Sized>(
        &self,
        dist:  &D,
        start: usize,
        shape: TourShape,
    ) -> TourResult<Solution> {
        self.solve_within(dist, start, shape, &self.default_deadline())
    }

    /// Solve under the configured budget, also stopping when `token` fires.
    fn solve_cancellable<D: Distances + ?Sized>(
        &self,
        dist:  &D,
        start: usize,
        shape: TourShape,
        token: CancelToken,
    ) -> TourResult<Solution> {
        self.solve_within(dist, start, shape, &self.default_deadline().with_cancel(token))
    }
}

/// Closed set of solver families with their configurations.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverConfig {
    Exact(ExactConfig),
    /// Nearest neighbour only, no improvement phase.
    Greedy,
    LocalSearch(LocalSearchConfig),
    Genetic(GeneticConfig),
    AntColony(AntColonyConfig),
    AntLion(AntLionConfig),
    Hybrid(HybridConfig),
}

impl SolverConfig {
    pub fn name(&self) -> &'static str {
        match self {
            SolverConfig::Exact(_)       => "exact",
            SolverConfig::Greedy         => "greedy",
            SolverConfig::LocalSearch(_) => "local_search",
            SolverConfig::Genetic(_)     => "genetic",
            SolverConfig::AntColony(_)   => "ant_colony",
            SolverConfig::AntLion(_)     => "ant_lion",
            SolverConfig::Hybrid(_)      => "hybrid",
        }
    }
}

/// Build the solver `config` describes and run it.
///
/// Configuration errors surface before any work is done.
pub fn solve_with<D: Distances + ?Sized>(
    config: &SolverConfig,
    dist:   &D,
    start:  usize,
    shape:  TourShape,
) -> TourResult<Solution> {
    match config {
        SolverConfig::Exact(c)       => ExactSolver::new(c.clone())?.solve(dist, start, shape),
        SolverConfig::Greedy         => GreedySolver.solve(dist, start, shape),
        SolverConfig::LocalSearch(c) => LocalSearchSolver::new(c.clone())?.solve(dist, start, shape),
        SolverConfig::Genetic(c)     => GeneticSolver::new(c.clone())?.solve(dist, start, shape),
        SolverConfig::AntColony(c)   => AntColonySolver::new(c.clone())?.solve(dist, start, shape),
        SolverConfig::AntLion(c)     => AntLionSolver::new(c.clone())?.solve(dist, start, shape),
        SolverConfig::Hybrid(c)      => HybridSolver::new(c.clone())?.solve(dist, start, shape),
    }
}
