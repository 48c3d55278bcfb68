//! `wp-grid` — obstacle grid, shortest paths, and the waypoint distance oracle.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                     |
//! |------------|--------------------------------------------------------------|
//! | [`grid`]   | `GridMap` trait, `GridGraph`, `GridGraphBuilder`, `BlockedView` |
//! | [`router`] | `Router` trait, `Route`, `Heuristic`, `AStarRouter`, `DijkstraRouter` |
//! | [`oracle`] | `DistanceOracle`, `Leg`, `distance_function`                 |
//! | [`error`]  | `GridError`, `GridResult<T>`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
pub mod grid;
pub mod oracle;
pub mod router;

#[cfg(test)]
mod tests;

pub use error::{GridError, GridResult};
pub use grid::{BlockedView, GridGraph, GridGraphBuilder, GridMap};
pub use oracle::{DistanceOracle, Leg, distance_function};
pub use router::{AStarRouter, DijkstraRouter, Heuristic, Route, Router};
