//! Random source used by the roll and sample handlers.
//!
//! Handlers never call `rand` directly: they draw through the [`RandomSource`]
//! trait so tests can replace the generator with a mock and check exactly how
//! many draws a command performs.

use mockall::automock;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Bounded-integer random generator.
#[automock]
pub trait RandomSource {
    /// Returns a uniformly distributed integer in `[0, bound)`.
    ///
    /// `bound` is always greater than zero.
    fn below(&mut self, bound: usize) -> usize;
}

/// [`RandomSource`] backed by a [`StdRng`].
///
/// `StdRng` is `Send`, so a generator can live inside a dispatcher shared
/// between tokio tasks.
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Creates a generator seeded from the operating system entropy.
    pub fn new() -> Self {
        StdRandom {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a deterministic generator.
    pub fn seeded(seed: u64) -> Self {
        StdRandom {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for StdRandom {
    fn below(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}
