//! Grid coordinate type and the distance heuristics built on it.
//!
//! Coordinates are signed so that neighbour arithmetic (`x - 1`) never wraps;
//! bounds checking belongs to the grid, not to `Pos`.

use std::f64::consts::SQRT_2;

/// Cost of one axis-aligned move.
pub const AXIS_STEP: f64 = 1.0;

/// Cost of one diagonal move.
pub const DIAGONAL_STEP: f64 = SQRT_2;

/// A cell coordinate on a rectangular grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return `self` shifted by `(dx, dy)`.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Pos {
        Pos::new(self.x + dx, self.y + dy)
    }

    /// `|dx| + |dy|`, admissible on 4-connected grids.
    #[inline]
    pub fn manhattan(self, other: Pos) -> f64 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        f64::from(dx + dy)
    }

    /// Octile distance: exact on an empty 8-connected grid with √2
    /// diagonals, hence admissible with obstacles.
    #[inline]
    pub fn octile(self, other: Pos) -> f64 {
        let dx = f64::from((self.x - other.x).unsigned_abs());
        let dy = f64::from((self.y - other.y).unsigned_abs());
        (dx + dy) + (DIAGONAL_STEP - 2.0) * dx.min(dy)
    }

    /// `true` if `other` differs from `self` in both coordinates.
    #[inline]
    pub fn is_diagonal_to(self, other: Pos) -> bool {
        self.x != other.x && self.y != other.y
    }

    /// Edge weight for a single move between adjacent cells.
    #[inline]
    pub fn step_cost_to(self, other: Pos) -> f64 {
        if self.is_diagonal_to(other) { DIAGONAL_STEP } else { AXIS_STEP }
    }
}

impl From<(i32, i32)> for Pos {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Pos::new(x, y)
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
