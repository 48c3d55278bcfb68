//! `wp-core` — foundational types for the waypoint-tour workspace.
//!
//! This crate is a dependency of every other `wp-*` crate.  It intentionally
//! has no `wp-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `CellId`                                   |
//! | [`pos`]         | `Pos`, Manhattan / octile distance, step costs        |
//! | [`time`]        | `SimTime` (simulated, totally ordered)                |
//! | [`deadline`]    | `Deadline`, `CancelToken`                             |
//! | [`dist`]        | `Distances` trait, `DistanceMatrix`                   |
//! | [`rng`]         | `SolverRng` (per invocation), `SimRng` (per run)      |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod deadline;
pub mod dist;
pub mod error;
pub mod ids;
pub mod pos;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use deadline::{CancelToken, Deadline};
pub use dist::{DistanceMatrix, Distances};
pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, CellId};
pub use pos::Pos;
pub use rng::{SimRng, SolverRng};
pub use time::SimTime;
