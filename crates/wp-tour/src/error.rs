//! Tour-solver error type.

use thiserror::Error;

use wp_core::CoreError;

/// Errors produced by `wp-tour`.
///
/// Only invalid *input* is an error.  An exhausted time budget is reported
/// through [`SolveStats::budget_exhausted`][crate::SolveStats], and
/// unreachable pairs surface as an infinite tour length.
#[derive(Debug, Error)]
pub enum TourError {
    #[error("instance has no waypoints")]
    EmptyInstance,

    #[error("start index {start} out of range for {n} waypoints")]
    StartOutOfRange { start: usize, n: usize },

    #[error("invalid tour: {0}")]
    InvalidTour(String),

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type TourResult<T> = Result<T, TourError>;
