//! Rarefaction by repeated random subsampling.

use std::num::NonZeroUsize;

use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};
use rayon::prelude::*;

/// Returns the mean number of distinct categories over `iterations` random subsamples of
/// `depth` individuals drawn without replacement.
///
/// Returns `None` if `iterations` is zero, since no estimate can then be made.
pub fn rarefy_monte_carlo<R>(
    counts: &[usize],
    depth: usize,
    iterations: usize,
    rng: &mut R,
) -> Option<f64>
where
    R: Rng + ?Sized,
{
    let iterations = NonZeroUsize::new(iterations)?;
    let pool = Pool::new(counts);

    let estimate = pool.endpoint(depth).unwrap_or_else(|| {
        let mut seen = pool.seen_buffer();
        let distinct = (0..iterations.get())
            .map(|_| pool.draw(depth, rng, &mut seen))
            .sum::<usize>();

        distinct as f64 / iterations.get() as f64
    });

    Some(estimate)
}

/// Parallel rarefaction by random subsampling with reproducible random streams.
///
/// Every iteration uses its own generator, seeded from the base seed, a caller-provided stream
/// key and the iteration index, so the estimate for a given seed does not depend on how
/// iterations are scheduled across threads.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MonteCarlo {
    iterations: NonZeroUsize,
    seed: u64,
}

impl MonteCarlo {
    /// Creates a new estimator.
    pub fn new(iterations: NonZeroUsize, seed: u64) -> Self {
        Self { iterations, seed }
    }

    /// Returns the number of iterations per estimate.
    pub fn iterations(&self) -> NonZeroUsize {
        self.iterations
    }

    /// Returns the base seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the mean number of distinct categories at `depth`.
    pub fn rarefy(&self, pool: &Pool, depth: usize, stream: u64) -> f64 {
        if let Some(endpoint) = pool.endpoint(depth) {
            return endpoint;
        }

        let stream_seed = mix(mix(self.seed ^ mix(stream)) ^ depth as u64);

        let distinct = (0..self.iterations.get())
            .into_par_iter()
            .map_init(
                || pool.seen_buffer(),
                |seen, iteration| {
                    let mut rng = StdRng::seed_from_u64(mix(stream_seed ^ iteration as u64));
                    pool.draw(depth, &mut rng, seen)
                },
            )
            .sum::<usize>();

        distinct as f64 / self.iterations.get() as f64
    }
}

/// The individuals of a profile, each tagged with its category.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    tags: Vec<usize>,
    categories: usize,
}

impl Pool {
    /// Expands per-category counts into tagged individuals.
    pub fn new(counts: &[usize]) -> Self {
        let tags = counts
            .iter()
            .enumerate()
            .flat_map(|(category, &count)| std::iter::repeat(category).take(count))
            .collect();

        Self {
            tags,
            categories: counts.len(),
        }
    }

    /// Returns the number of individuals.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if there are no individuals.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the exact richness when no sampling is required.
    fn endpoint(&self, depth: usize) -> Option<f64> {
        if depth == 0 {
            Some(0.0)
        } else if depth >= self.len() {
            Some(self.categories as f64)
        } else {
            None
        }
    }

    fn seen_buffer(&self) -> Vec<bool> {
        vec![false; self.categories]
    }

    /// Draws `depth < len` individuals and returns the number of distinct categories among them.
    fn draw<R>(&self, depth: usize, rng: &mut R, seen: &mut [bool]) -> usize
    where
        R: Rng + ?Sized,
    {
        seen.fill(false);

        index::sample(rng, self.tags.len(), depth)
            .into_iter()
            .filter(|&i| !std::mem::replace(&mut seen[self.tags[i]], true))
            .count()
    }
}

/// SplitMix64 finalizer, used to derive independent seeds.
fn mix(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
