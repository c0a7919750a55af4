//! Random source abstraction.
//!
//! Generation only needs two operations: a uniform integer in a half-open
//! range and a uniform shuffle. Unbounded ranges (`max == UNBOUNDED`) are
//! answered with `min + steps`, where `steps` follows a geometric
//! distribution. Each extra step is taken with probability
//! `mean / (mean + 1)`, which terminates almost surely while leaving every
//! length reachable.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::bounds::UNBOUNDED;

/// Default mean of the extra length drawn for unbounded repetitions.
pub const DEFAULT_TYPICAL_EXTRA_LENGTH: usize = 8;

pub trait RandomSource {
    /// Uniform integer in `[min, max)`. When `max` is [`UNBOUNDED`] the result
    /// is `min` plus a geometric step count. An empty range yields `min`.
    fn range(&mut self, min: usize, max: usize) -> usize;

    /// Uniform random permutation of `items`.
    fn shuffle<T>(&mut self, items: &mut [T]);
}

/// [`RandomSource`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct Random<R = StdRng> {
    rng: R,
    typical_extra_length: usize,
}

impl Random<StdRng> {
    /// Deterministic source, for reproducible fixtures.
    pub fn seeded(seed: u64) -> Self {
        Random::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Random::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Random<R> {
    pub fn new(rng: R) -> Self {
        Random { rng, typical_extra_length: DEFAULT_TYPICAL_EXTRA_LENGTH }
    }

    /// Mean number of extra characters/repetitions drawn for unbounded ranges.
    pub fn with_typical_extra_length(mut self, typical_extra_length: usize) -> Self {
        self.typical_extra_length = typical_extra_length;
        self
    }

    fn geometric_steps(&mut self) -> usize {
        if self.typical_extra_length == 0 {
            return 0;
        }
        let mean = self.typical_extra_length as f64;
        let p_continue = mean / (mean + 1.0);
        let mut steps: usize = 0;
        while self.rng.gen_bool(p_continue) {
            steps = steps.saturating_add(1);
        }
        steps
    }
}

impl<R: Rng> RandomSource for Random<R> {
    fn range(&mut self, min: usize, max: usize) -> usize {
        if max == UNBOUNDED {
            return min.saturating_add(self.geometric_steps()).min(UNBOUNDED - 1);
        }
        if max <= min.saturating_add(1) {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_stays_in_half_open_interval() {
        let mut random = Random::seeded(7);
        for _ in 0..500 {
            let v = random.range(3, 9);
            assert!((3..9).contains(&v));
        }
        assert_eq!(random.range(4, 4), 4);
        assert_eq!(random.range(4, 5), 4);
    }

    #[test]
    fn unbounded_range_has_configurable_mean() {
        let mut random = Random::seeded(11).with_typical_extra_length(4);
        let draws: Vec<usize> = (0..4000).map(|_| random.range(10, UNBOUNDED)).collect();
        assert!(draws.iter().all(|&v| v >= 10));
        let mean = draws.iter().map(|&v| (v - 10) as f64).sum::<f64>() / draws.len() as f64;
        assert!(mean > 3.0 && mean < 5.0, "mean was {mean}");

        let mut fixed = Random::seeded(11).with_typical_extra_length(0);
        assert_eq!(fixed.range(10, UNBOUNDED), 10);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut random = Random::seeded(3);
        let mut items: Vec<u32> = (0..20).collect();
        random.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn seeded_sources_are_reproducible() {
        let mut a = Random::seeded(42);
        let mut b = Random::seeded(42);
        let xs: Vec<usize> = (0..16).map(|_| a.range(0, 1000)).collect();
        let ys: Vec<usize> = (0..16).map(|_| b.range(0, 1000)).collect();
        assert_eq!(xs, ys);
    }
}
