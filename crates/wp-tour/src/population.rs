//! Shared plumbing for the population-based solvers.
//!
//! Individuals (chromosomes, ants) are built and scored independently, so
//! with the `parallel` feature both steps run on Rayon.  Each individual
//! gets its own child RNG, derived sequentially from the solver RNG before
//! the batch starts; serial and parallel builds therefore produce the same
//! tours.

use wp_core::{DistanceMatrix, Distances, SolverRng};

use crate::{TourShape, tour_length};

/// Dense snapshot of `dist`, so hot loops index a `Vec` instead of calling
/// back into a (possibly locking) oracle.
pub(crate) fn snapshot<D: Distances + ?Sized>(dist: &D) -> DistanceMatrix {
    DistanceMatrix::from_fn(dist.len(), |i, j| dist.distance(i, j))
}

/// `count` child RNGs for one batch.
pub(crate) fn child_rngs(rng: &mut SolverRng, count: usize) -> Vec<SolverRng> {
    (0..count as u64).map(|k| rng.child(k)).collect()
}

/// Run `build(k, rng_k)` for every child RNG, preserving order.
pub(crate) fn build_batch<T, F>(rngs: Vec<SolverRng>, build: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize, SolverRng) -> T + Sync + Send,
{
    #[cfg(not(feature = "parallel"))]
    {
        rngs.into_iter().enumerate().map(|(k, r)| build(k, r)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        rngs.into_par_iter().enumerate().map(|(k, r)| build(k, r)).collect()
    }
}

/// Length of every tour in `tours`.
pub(crate) fn lengths(tours: &[Vec<usize>], dist: &DistanceMatrix, shape: TourShape) -> Vec<f64> {
    #[cfg(not(feature = "parallel"))]
    {
        tours.iter().map(|t| tour_length(t, dist, shape)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        tours.par_iter().map(|t| tour_length(t, dist, shape)).collect()
    }
}

/// Index of the shortest entry; ties go to the lowest index.  Infinite
/// lengths are valid entries.
pub(crate) fn argmin(lengths: &[f64]) -> usize {
    let mut best = 0;
    for (i, &l) in lengths.iter().enumerate().skip(1) {
        if l < lengths[best] {
            best = i;
        }
    }
    best
}

/// A uniformly random permutation of `0..n` with `start` fixed in front.
pub(crate) fn random_tour(n: usize, start: usize, rng: &mut SolverRng) -> Vec<usize> {
    let mut tour = crate::identity_order(n, start);
    rng.shuffle(&mut tour[1..]);
    tour
}
