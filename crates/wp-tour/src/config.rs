//! Validated configuration records, one per solver family.
//!
//! Defaults carry the tuned values used throughout the workspace.  Solver
//! constructors call `validate()` eagerly, so a solver that exists always
//! holds a usable configuration.

use std::time::Duration;

use wp_core::{CoreError, CoreResult};
use wp_core::error::{check_at_least, check_positive, check_probability};

fn check_budget(field: &'static str, budget: Option<Duration>) -> CoreResult<()> {
    match budget {
        Some(d) if d.is_zero() => Err(CoreError::config(field, "time budget must be non-zero")),
        _ => Ok(()),
    }
}

fn check_non_negative(field: &'static str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::config(field, format!("{value} must be finite and >= 0")))
    }
}

// ── Exact ─────────────────────────────────────────────────────────────────────

/// Held–Karp options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExactConfig {
    /// Wall-clock budget, checked once per DP call.  `None` = unbounded.
    pub time_limit: Option<Duration>,
    /// Larger instances skip the DP (O(n²·2ⁿ) memory) and return the
    /// identity order with `budget_exhausted` set.
    pub max_nodes:  usize,
}

impl Default for ExactConfig {
    fn default() -> Self {
        Self { time_limit: Some(Duration::from_secs(30)), max_nodes: 20 }
    }
}

impl ExactConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_budget("time_limit", self.time_limit)?;
        check_at_least("max_nodes", self.max_nodes, 1)?;
        if self.max_nodes > 63 {
            return Err(CoreError::config("max_nodes", "bitmask DP supports at most 63 nodes"));
        }
        Ok(())
    }
}

// ── Local search ──────────────────────────────────────────────────────────────

/// Nearest-neighbour + 2-opt options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LocalSearchConfig {
    /// Maximum improving reversals applied.
    pub max_swaps: usize,
    pub max_time:  Option<Duration>,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self { max_swaps: 1000, max_time: Some(Duration::from_secs(1)) }
    }
}

impl LocalSearchConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_budget("max_time", self.max_time)
    }
}

// ── Genetic ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeneticConfig {
    pub population_size: usize,
    pub generations:     usize,
    /// Probability of applying order crossover to a parent pair.
    pub crossover_rate:  f64,
    /// Probability of a swap mutation per child.
    pub mutation_rate:   f64,
    pub seed:            u64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 48,
            generations:     200,
            crossover_rate:  0.9,
            mutation_rate:   0.2,
            seed:            0,
        }
    }
}

impl GeneticConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_at_least("population_size", self.population_size, 2)?;
        check_probability("crossover_rate", self.crossover_rate)?;
        check_probability("mutation_rate", self.mutation_rate)
    }
}

// ── Ant colony ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AntColonyConfig {
    pub num_ants:         usize,
    pub iterations:       usize,
    /// Pheromone exponent.
    pub alpha:            f64,
    /// Desirability (1/distance) exponent.
    pub beta:             f64,
    /// Evaporation rate in `(0, 1]`.
    pub rho:              f64,
    /// Deposit numerator `q` in `q / length`.
    pub deposit_constant: f64,
    pub seed:             u64,
    /// Checked once per iteration.  `None` = iteration count only.
    pub time_budget:      Option<Duration>,
}

impl Default for AntColonyConfig {
    fn default() -> Self {
        Self {
            num_ants:         10,
            iterations:       50,
            alpha:            1.0,
            beta:             2.0,
            rho:              0.1,
            deposit_constant: 100.0,
            seed:             0,
            time_budget:      None,
        }
    }
}

impl AntColonyConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_at_least("num_ants", self.num_ants, 1)?;
        check_non_negative("alpha", self.alpha)?;
        check_non_negative("beta", self.beta)?;
        check_probability("rho", self.rho)?;
        if self.rho == 0.0 {
            return Err(CoreError::config("rho", "evaporation rate must be > 0"));
        }
        check_positive("deposit_constant", self.deposit_constant)?;
        check_budget("time_budget", self.time_budget)
    }
}

// ── Ant lion ──────────────────────────────────────────────────────────────────

/// How a non-elite source ant lion is picked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Uniformly at random.
    #[default]
    Uniform,
    /// Better of two uniform picks.
    Tournament,
    /// Probability proportional to `1 / length`.
    RouletteWheel,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AntLionConfig {
    pub population_size:       usize,
    pub iterations:            usize,
    pub seed:                  u64,
    pub time_budget:           Option<Duration>,
    /// Probability an ant walks around the elite instead of a selected lion.
    pub elite_probability:     f64,
    pub selection:             Selection,
    /// Per-operator perturbation probability at the first iteration.
    pub initial_mutation_rate: f64,
    /// Perturbation probability at the last iteration (linear decay).
    pub final_mutation_rate:   f64,
    /// 2-opt swap budget for polishing each ant; `0` disables polishing.
    pub polish_swaps:          usize,
}

impl Default for AntLionConfig {
    fn default() -> Self {
        Self {
            population_size:       20,
            iterations:            100,
            seed:                  0,
            time_budget:           None,
            elite_probability:     0.5,
            selection:             Selection::Uniform,
            initial_mutation_rate: 0.3,
            final_mutation_rate:   0.1,
            polish_swaps:          3,
        }
    }
}

impl AntLionConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_at_least("population_size", self.population_size, 1)?;
        check_probability("elite_probability", self.elite_probability)?;
        check_probability("initial_mutation_rate", self.initial_mutation_rate)?;
        check_probability("final_mutation_rate", self.final_mutation_rate)?;
        check_budget("time_budget", self.time_budget)
    }

    /// Mutation probability for iteration `it` of `self.iterations`.
    pub fn mutation_rate_at(&self, it: usize) -> f64 {
        if self.iterations <= 1 {
            return self.initial_mutation_rate;
        }
        let frac = it as f64 / (self.iterations - 1) as f64;
        self.initial_mutation_rate + (self.final_mutation_rate - self.initial_mutation_rate) * frac
    }
}

// ── Hybrid ────────────────────────────────────────────────────────────────────

/// Construction phase of a hybrid solve.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaseAlgorithm {
    /// Nearest neighbour from several spread-out starting waypoints.
    #[default]
    NearestNeighbor,
    /// Full GA runs with seeds `seed, seed + 1, …`.
    Genetic(GeneticConfig),
    AntColony(AntColonyConfig),
    AntLion(AntLionConfig),
}

impl BaseAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            BaseAlgorithm::NearestNeighbor => "nearest_neighbor",
            BaseAlgorithm::Genetic(_)      => "genetic",
            BaseAlgorithm::AntColony(_)    => "ant_colony",
            BaseAlgorithm::AntLion(_)      => "ant_lion",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HybridConfig {
    pub base:                 BaseAlgorithm,
    /// Construction runs; the best result is polished.
    pub starting_point_count: usize,
    pub polish_max_swaps:     usize,
    pub polish_max_time:      Option<Duration>,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            base:                 BaseAlgorithm::NearestNeighbor,
            starting_point_count: 3,
            polish_max_swaps:     3000,
            polish_max_time:      Some(Duration::from_secs(3)),
        }
    }
}

impl HybridConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_at_least("starting_point_count", self.starting_point_count, 1)?;
        check_budget("polish_max_time", self.polish_max_time)?;
        match &self.base {
            BaseAlgorithm::NearestNeighbor => Ok(()),
            BaseAlgorithm::Genetic(c)      => c.validate(),
            BaseAlgorithm::AntColony(c)    => c.validate(),
            BaseAlgorithm::AntLion(c)      => c.validate(),
        }
    }
}
