//! Workspace base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// Errors shared by all `wp-*` crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configuration field is outside its valid domain.
    #[error("invalid {field}: {reason}")]
    InvalidConfig {
        field:  &'static str,
        reason: String,
    },
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidConfig`].
    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        CoreError::InvalidConfig { field, reason: reason.into() }
    }
}

/// Shorthand result type for `wp-core`.
pub type CoreResult<T> = Result<T, CoreError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Require `value` to lie in `[0, 1]`.
pub fn check_probability(field: &'static str, value: f64) -> CoreResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::config(field, format!("{value} is not a probability in [0, 1]")))
    }
}

/// Require `value` to be finite and strictly positive.
pub fn check_positive(field: &'static str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::config(field, format!("{value} must be finite and > 0")))
    }
}

/// Require a count to be at least `min`.
pub fn check_at_least(field: &'static str, value: usize, min: usize) -> CoreResult<()> {
    if value >= min {
        Ok(())
    } else {
        Err(CoreError::config(field, format!("{value} must be at least {min}")))
    }
}
