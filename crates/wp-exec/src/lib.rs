//! `wp-exec` — discrete-event execution of grid paths by several agents.
//!
//! Agents move over a shared grid in logical time.  Every free cell is a
//! capacity-one resource, so an agent that needs an occupied cell waits, and
//! each positive wait is recorded as a collision.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`queue`]      | `EventQueue`: `BTreeMap<SimTime, VecDeque<E>>`, FIFO ties  |
//! | [`cells`]      | `CellPool`, `CellResource`: capacity-one cells, FIFO waits |
//! | [`stats`]      | `CollisionStats`, `AgentOutcome`                           |
//! | [`executor`]   | `Executor`, `ExecConfig`: agents on fixed cell paths       |
//! | [`replan`]     | `ReplanExecutor`: orders, transient blockages, replanning  |
//! | [`observer`]   | `ExecObserver` callbacks, `NoopObserver`                   |
//! | [`error`]      | `ExecError`, `ExecResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                        |
//! |---------|---------------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on configs, `Serialize` on reports. |

pub mod cells;
pub mod error;
pub mod executor;
pub mod observer;
pub mod queue;
pub mod replan;
pub mod stats;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cells::{Acquire, CellPool, CellResource};
pub use error::{ExecError, ExecResult};
pub use executor::{ExecConfig, Executor, simulate, theoretical_makespan};
pub use observer::{ExecObserver, NoopObserver};
pub use queue::EventQueue;
pub use replan::{BlockerConfig, ForcedBlock, Order, OrderReport, ReplanConfig, ReplanExecutor, ReplanReport};
pub use stats::{AgentOutcome, CollisionStats};
