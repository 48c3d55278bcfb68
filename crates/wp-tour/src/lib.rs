//! `wp-tour` — tour optimisation over a waypoint distance function.
//!
//! Every solver consumes a [`Distances`][wp_core::Distances] implementation
//! (typically a `wp_grid::DistanceOracle`) and returns a [`Solution`]: a
//! permutation of `0..n` starting at the requested depot, its length, and
//! per-family statistics.  Solvers never see the grid.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                 |
//! |-------------------|----------------------------------------------------------|
//! | [`tour`]          | `TourShape`, `tour_length`, `Solution`, `SolveStats`     |
//! | [`config`]        | Validated per-family configuration records               |
//! | [`solver`]        | `TourSolver` trait, `SolverConfig`, `solve_with`         |
//! | [`exact`]         | Held–Karp bitmask DP with a call-owned arena             |
//! | [`local_search`]  | Nearest neighbour, 2-opt, `LocalSearchSolver`            |
//! | [`genetic`]       | Tournament selection, order crossover, swap mutation     |
//! | [`ant_colony`]    | Pheromone-guided probabilistic construction              |
//! | [`ant_lion`]      | Elite-guided random walks over a tour population         |
//! | [`hybrid`]        | Multi-start construction followed by an extended polish  |
//! | [`error`]         | `TourError`, `TourResult<T>`                             |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Ant construction and fitness evaluation run on Rayon.       |
//! | `serde`    | `Serialize`/`Deserialize` on configs, `Serialize` on stats. |
//!
//! # Quick start
//!
//! ```
//! use wp_core::DistanceMatrix;
//! use wp_tour::{LocalSearchConfig, LocalSearchSolver, TourShape, TourSolver};
//!
//! let d = DistanceMatrix::from_rows(&[
//!     vec![0.0, 1.0, 2.0, 3.0],
//!     vec![1.0, 0.0, 1.0, 2.0],
//!     vec![2.0, 1.0, 0.0, 1.0],
//!     vec![3.0, 2.0, 1.0, 0.0],
//! ]).unwrap();
//! let sol = LocalSearchSolver::new(LocalSearchConfig::default())
//!     .unwrap()
//!     .solve(&d, 0, TourShape::Open)
//!     .unwrap();
//! assert_eq!(sol.order, vec![0, 1, 2, 3]);
//! assert_eq!(sol.length, 3.0);
//! ```

pub mod ant_colony;
pub mod ant_lion;
pub mod config;
pub mod error;
pub mod exact;
pub mod genetic;
pub mod hybrid;
pub mod local_search;
mod population;
pub mod solver;
pub mod tour;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use ant_colony::AntColonySolver;
pub use ant_lion::AntLionSolver;
pub use config::{
    AntColonyConfig, AntLionConfig, BaseAlgorithm, ExactConfig, GeneticConfig, HybridConfig,
    LocalSearchConfig, Selection,
};
pub use error::{TourError, TourResult};
pub use exact::ExactSolver;
pub use genetic::GeneticSolver;
pub use hybrid::HybridSolver;
pub use local_search::{
    GreedySolver, Improvement, LocalSearchSolver, nearest_neighbor, nn_then_two_opt, two_opt,
};
pub use solver::{SolverConfig, TourSolver, solve_with};
pub use tour::{
    Composition, Solution, SolveStats, StatsDetail, TourShape, identity_order, rotate_to_start,
    tour_length, validate_tour,
};
