//! The distance abstraction consumed by every tour solver.
//!
//! Solvers see waypoints only as indices `0..len()`.  Where the numbers come
//! from (grid shortest paths, a hand-written matrix) is irrelevant to them.
//!
//! # Conventions
//!
//! - `distance(i, i) == 0.0`.
//! - `f64::INFINITY` means "no usable edge" (unreachable pair).  Solvers must
//!   tolerate it; it is never an error.
//! - Implementations are `Sync` so solvers may evaluate candidates on Rayon's
//!   pool (the `parallel` feature of `wp-tour`).

/// Pairwise distance over waypoint indices `0..len()`.
pub trait Distances: Sync {
    /// Number of waypoints.
    fn len(&self) -> usize;

    /// Cost of travelling from waypoint `i` to waypoint `j`.
    fn distance(&self, i: usize, j: usize) -> f64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── DistanceMatrix ────────────────────────────────────────────────────────────

/// Dense row-major `n × n` distance table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMatrix {
    n:     usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    /// Build from explicit rows.  Returns `None` if the rows are not square.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let n = rows.len();
        if rows.iter().any(|r| r.len() != n) {
            return None;
        }
        let cells = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Some(Self { n, cells })
    }

    /// Evaluate `f(i, j)` for every ordered pair; the diagonal is forced to 0.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut cells = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    cells[i * n + j] = f(i, j);
                }
            }
        }
        Self { n, cells }
    }

    /// Evaluate `f(i, j)` for `i < j` only and mirror it, halving the calls
    /// for symmetric sources such as grid shortest paths.
    pub fn symmetric_from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut cells = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = f(i, j);
                cells[i * n + j] = d;
                cells[j * n + i] = d;
            }
        }
        Self { n, cells }
    }

    /// Row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.cells[i * self.n..(i + 1) * self.n]
    }

    /// `true` if `d(i, j) == d(j, i)` for every pair.
    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (0..i).all(|j| self.cells[i * self.n + j] == self.cells[j * self.n + i]))
    }
}

impl Distances for DistanceMatrix {
    #[inline]
    fn len(&self) -> usize {
        self.n
    }

    #[inline]
    fn distance(&self, i: usize, j: usize) -> f64 {
        self.cells[i * self.n + j]
    }
}
