//! Executor error type.

use thiserror::Error;

use wp_core::{AgentId, CoreError, Pos};
use wp_grid::GridError;

/// Errors produced by `wp-exec`.
///
/// These describe malformed input only.  Contention outcomes (deadlock,
/// cutoff, a route that never reopens) are reported per agent in the run's
/// statistics.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{agent} path step {index} at {pos} is not a free cell")]
    NotFree { agent: AgentId, index: usize, pos: Pos },

    #[error("{agent} path step {index} is not adjacent to the step after it")]
    NotAdjacent { agent: AgentId, index: usize },

    #[error("order {order} endpoint {pos} is not a free cell")]
    OrderEndpoint { order: u32, pos: Pos },

    #[error("{0} is not a managed cell")]
    UnknownCell(Pos),

    #[error("{agent} released {cell} without holding it")]
    NotHolder { cell: Pos, agent: AgentId },

    #[error("too many agents: {0}")]
    TooManyAgents(usize),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type ExecResult<T> = Result<T, ExecError>;
