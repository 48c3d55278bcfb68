//! Simulated (logical) time.
//!
//! # Design
//!
//! The executor advances a logical clock, never the wall clock.  Moves take a
//! fixed fractional duration (`step_time`, e.g. 0.2), so time is an `f64`
//! rather than an integer tick.  `SimTime` wraps it with a *total* order
//! (`f64::total_cmp`) so it can key a `BTreeMap` event queue directly.
//!
//! Constructing a `SimTime` from `NaN` is a logic error; the executor only
//! ever adds finite, non-negative durations to `SimTime::ZERO`.

use std::cmp::Ordering;
use std::fmt;

/// An absolute simulated instant.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// The raw value in simulated time units.
    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self` (negative if `earlier > self`).
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}", self.0)
    }
}
