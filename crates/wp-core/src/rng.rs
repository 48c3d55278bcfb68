//! Deterministic per-invocation and per-run RNG wrappers.
//!
//! # Determinism strategy
//!
//! No solver touches a global or thread-local generator.  Each solver call
//! constructs its own [`SolverRng`] from the seed in its config, so repeated
//! or concurrent calls never perturb each other's sequences.
//!
//! Work that may run in parallel (ant construction, fitness evaluation)
//! draws from *child* generators derived sequentially from the parent:
//!
//!   child_seed = parent.next_u64() XOR (k * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive `k` uniformly across the seed space.  Because
//! children are derived before the parallel section, serial and parallel runs
//! consume identical random streams.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── SolverRng ─────────────────────────────────────────────────────────────────

/// Random source owned by exactly one solver invocation.
///
/// Never share one across threads: hand each Rayon task its own
/// [`child`](Self::child), derived before the parallel section.
pub struct SolverRng(SmallRng);

impl SolverRng {
    pub fn new(seed: u64) -> Self {
        SolverRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent child stream for worker / ant / individual `k`.
    pub fn child(&mut self, k: u64) -> SolverRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ k.wrapping_mul(MIXING_CONSTANT);
        SolverRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Uniform sample in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Two distinct indices drawn uniformly from `lo..hi`, returned in
    /// ascending order.
    ///
    /// # Panics
    /// Panics if the range holds fewer than two values.
    pub fn distinct_pair(&mut self, lo: usize, hi: usize) -> (usize, usize) {
        assert!(hi >= lo + 2, "distinct_pair needs at least two candidates");
        let a = self.0.gen_range(lo..hi);
        // Draw from a range one shorter and skip over `a`.
        let mut b = self.0.gen_range(lo..hi - 1);
        if b >= a {
            b += 1;
        }
        (a.min(b), a.max(b))
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// Choose a random element from a slice; `None` if empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for exogenous processes (transient cell blockages).
///
/// Used only inside the single-threaded event loop.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
