//! Grid-subsystem error type.

use thiserror::Error;

use wp_core::Pos;

/// Errors produced by `wp-grid`.
///
/// An unreachable goal is *not* an error: routers return
/// [`Route::unreachable`][crate::Route::unreachable] and the oracle reports
/// `f64::INFINITY`.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid dimensions {width}x{height} must both be positive")]
    EmptyGrid { width: i32, height: i32 },

    #[error("position {0} is outside the grid")]
    OutOfBounds(Pos),

    #[error("waypoint index {index} out of range for {len} waypoints")]
    WaypointIndex { index: usize, len: usize },

    #[error("no path between waypoints {from} and {to}")]
    UnreachableLeg { from: usize, to: usize },
}

pub type GridResult<T> = Result<T, GridError>;
