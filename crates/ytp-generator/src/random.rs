//! Injectable randomness.
//!
//! Every decision in a run draws from a [`RandomSource`]. Production code uses
//! a [`StdRng`]; tests substitute scripted sources to force specific branches.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The draws the pipeline makes.
pub trait RandomSource {
    /// Uniform integer in `[lo, hi]`.
    fn int_inclusive(&mut self, lo: u32, hi: u32) -> u32;

    /// Uniform float in `[lo, hi]`; `lo` when the range is empty.
    fn float_range(&mut self, lo: f64, hi: f64) -> f64;

    /// Uniform index into a non-empty collection of length `len`.
    fn index(&mut self, len: usize) -> usize;

    /// Seed for an independent per-task generator.
    fn seed(&mut self) -> u64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn int_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.random_range(lo..=hi)
    }

    fn float_range(&mut self, lo: f64, hi: f64) -> f64 {
        if lo.is_nan() || hi.is_nan() || hi <= lo {
            return lo;
        }
        self.random_range(lo..=hi)
    }

    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.random_range(0..len)
    }

    fn seed(&mut self) -> u64 {
        self.random()
    }
}

/// Master generator for a run; entropy-seeded unless `seed` is given.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// One seed per task, drawn in index order before any task starts.
pub fn derive_task_seeds<R: RandomSource + ?Sized>(master: &mut R, count: u32) -> Vec<u64> {
    (0..count).map(|_| master.seed()).collect()
}
