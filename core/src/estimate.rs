//! Richness estimators.
//!
//! Expected richness at a depth at or below the observed total abundance is found by
//! interpolation, either analytically ([`analytic`]) or by random subsampling ([`monte_carlo`]).
//! Beyond the observed total, richness is extrapolated with the Chao1 model ([`chao1`]).
//!
//! The [`Estimator`] combines one [`Interpolation`] and one [`Extrapolation`] method, and
//! dispatches on depth.

use std::{collections::BTreeMap, fmt, num::NonZeroUsize};

use crate::profile::Profile;

pub mod analytic;
pub use analytic::{rarefy, Analytic};

pub mod chao1;
pub use chao1::{extrapolate, Chao1};

pub mod monte_carlo;
pub use monte_carlo::{rarefy_monte_carlo, MonteCarlo, Pool};

/// Default number of random subsamples per depth.
pub const DEFAULT_ITERATIONS: usize = 100;

/// Interpolation method for depths at or below the total abundance.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Interpolation {
    /// Exact expectation from hypergeometric probabilities.
    #[default]
    Analytic,
    /// Mean over random subsamples.
    MonteCarlo {
        /// Number of subsamples per depth.
        iterations: usize,
        /// Base seed of the random streams.
        seed: u64,
    },
}

/// Extrapolation method for depths above the total abundance.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Extrapolation {
    /// No extrapolation.
    #[default]
    None,
    /// Chao1-based extrapolation.
    Chao1,
}

/// How an estimate was obtained.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    /// Depth below the total abundance.
    Interpolated,
    /// Depth equal to the total abundance.
    Observed,
    /// Depth above the total abundance.
    Extrapolated,
}

impl Method {
    /// Returns the name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Interpolated => "interpolated",
            Method::Observed => "observed",
            Method::Extrapolated => "extrapolated",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A richness estimator combining interpolation and extrapolation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Estimator {
    interpolator: Interpolator,
    extrapolation: Extrapolation,
}

impl Estimator {
    /// Creates a new estimator.
    ///
    /// Returns an error if random subsampling is requested with zero iterations.
    pub fn new(
        interpolation: Interpolation,
        extrapolation: Extrapolation,
    ) -> Result<Self, EstimatorError> {
        let interpolator = match interpolation {
            Interpolation::Analytic => Interpolator::Analytic,
            Interpolation::MonteCarlo { iterations, seed } => NonZeroUsize::new(iterations)
                .map(|iterations| Interpolator::MonteCarlo(MonteCarlo::new(iterations, seed)))
                .ok_or(EstimatorError::NoIterations)?,
        };

        Ok(Self {
            interpolator,
            extrapolation,
        })
    }

    /// Returns the extrapolation method.
    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Returns the interpolation method.
    pub fn interpolation(&self) -> Interpolation {
        match self.interpolator {
            Interpolator::Analytic => Interpolation::Analytic,
            Interpolator::MonteCarlo(monte_carlo) => Interpolation::MonteCarlo {
                iterations: monte_carlo.iterations().get(),
                seed: monte_carlo.seed(),
            },
        }
    }

    /// Prepares the estimator for a profile.
    ///
    /// The `stream` distinguishes the random streams of different profiles for random
    /// subsampling, and is otherwise unused.
    pub fn prepare<'a>(&'a self, profile: &'a Profile, stream: u64) -> Prepared<'a> {
        let frequency_counts = FrequencyCounts::from_counts(profile.counts());

        let interpolator = match self.interpolator {
            Interpolator::Analytic => PreparedInterpolator::Analytic(
                Analytic::from_frequency_counts(frequency_counts.clone()),
            ),
            Interpolator::MonteCarlo(ref monte_carlo) => {
                PreparedInterpolator::MonteCarlo(monte_carlo, Pool::new(profile.counts()))
            }
        };

        let chao1 = match self.extrapolation {
            Extrapolation::Chao1 => Some(Chao1::from_frequency_counts(&frequency_counts)),
            Extrapolation::None => None,
        };

        Prepared {
            profile,
            stream,
            interpolator,
            chao1,
        }
    }
}

impl Default for Estimator {
    fn default() -> Self {
        Self {
            interpolator: Interpolator::Analytic,
            extrapolation: Extrapolation::None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Interpolator {
    Analytic,
    MonteCarlo(MonteCarlo),
}

/// An [`Estimator`] prepared for a single profile.
#[derive(Debug)]
pub struct Prepared<'a> {
    profile: &'a Profile,
    stream: u64,
    interpolator: PreparedInterpolator<'a>,
    chao1: Option<Chao1>,
}

#[derive(Debug)]
enum PreparedInterpolator<'a> {
    Analytic(Analytic),
    MonteCarlo(&'a MonteCarlo, Pool),
}

impl Prepared<'_> {
    /// Returns the estimated richness at `depth` and how it was obtained.
    ///
    /// Without extrapolation, depths above the total abundance are given the observed richness.
    pub fn estimate(&self, depth: usize) -> (f64, Method) {
        let total = self.profile.total_abundance();

        if depth > total {
            let richness = match &self.chao1 {
                Some(chao1) => chao1.extrapolate(depth),
                None => self.profile.observed_richness() as f64,
            };

            return (richness, Method::Extrapolated);
        }

        let richness = match &self.interpolator {
            PreparedInterpolator::Analytic(analytic) => analytic.rarefy(depth),
            PreparedInterpolator::MonteCarlo(monte_carlo, pool) => {
                monte_carlo.rarefy(pool, depth, self.stream)
            }
        };

        let method = if depth == total {
            Method::Observed
        } else {
            Method::Interpolated
        };

        (richness, method)
    }
}

/// The number of categories per abundance.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct FrequencyCounts {
    counts: BTreeMap<usize, usize>,
    total: usize,
    observed: usize,
}

impl FrequencyCounts {
    pub fn from_counts(counts: &[usize]) -> Self {
        let mut frequency_counts = BTreeMap::new();
        for &count in counts.iter().filter(|&&count| count > 0) {
            *frequency_counts.entry(count).or_insert(0) += 1;
        }

        Self {
            total: counts.iter().sum(),
            observed: frequency_counts.values().sum(),
            counts: frequency_counts,
        }
    }

    /// Returns the number of categories with the provided abundance.
    pub fn get(&self, abundance: usize) -> usize {
        self.counts.get(&abundance).copied().unwrap_or(0)
    }

    /// Returns an iterator over abundances and their number of categories.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().map(|(&abundance, &categories)| (abundance, categories))
    }

    pub fn observed(&self) -> usize {
        self.observed
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// An error associated with setting up an estimator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EstimatorError {
    /// Random subsampling was requested with zero iterations.
    NoIterations,
}

impl fmt::Display for EstimatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatorError::NoIterations => {
                f.write_str("random subsampling requires at least one iteration")
            }
        }
    }
}

impl std::error::Error for EstimatorError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(counts: &[usize]) -> Profile {
        Profile::new(counts.to_vec()).unwrap()
    }

    #[test]
    fn test_frequency_counts() {
        let frequency_counts = FrequencyCounts::from_counts(&[3, 1, 2, 1, 5, 2, 1]);

        assert_eq!(frequency_counts.get(1), 3);
        assert_eq!(frequency_counts.get(2), 2);
        assert_eq!(frequency_counts.get(4), 0);
        assert_eq!(frequency_counts.total(), 15);
        assert_eq!(frequency_counts.observed(), 7);
        assert_eq!(
            frequency_counts.iter().collect::<Vec<_>>(),
            [(1, 3), (2, 2), (3, 1), (5, 1)]
        );
    }

    #[test]
    fn test_zero_iterations_is_an_error() {
        let interpolation = Interpolation::MonteCarlo {
            iterations: 0,
            seed: 0,
        };

        assert_eq!(
            Estimator::new(interpolation, Extrapolation::None),
            Err(EstimatorError::NoIterations)
        );
    }

    #[test]
    fn test_dispatch_on_depth() {
        let estimator = Estimator::new(Interpolation::Analytic, Extrapolation::Chao1).unwrap();
        let profile = profile(&[1, 1, 2, 3, 5]);
        let prepared = estimator.prepare(&profile, 0);

        assert_eq!(prepared.estimate(0), (0.0, Method::Interpolated));
        assert_eq!(prepared.estimate(1), (1.0, Method::Interpolated));
        assert_eq!(prepared.estimate(12), (5.0, Method::Observed));

        let (richness, method) = prepared.estimate(20);
        assert_eq!(method, Method::Extrapolated);
        assert_approx_eq!(richness, 5.919361, epsilon = 1e-6);
    }

    #[test]
    fn test_without_extrapolation_is_flat_above_total() {
        let estimator = Estimator::default();
        let profile = profile(&[1, 1, 2, 3, 5]);

        assert_eq!(
            estimator.prepare(&profile, 0).estimate(100),
            (5.0, Method::Extrapolated)
        );
    }

    #[test]
    fn test_monte_carlo_dispatch() {
        let interpolation = Interpolation::MonteCarlo {
            iterations: 2000,
            seed: 1,
        };
        let estimator = Estimator::new(interpolation, Extrapolation::None).unwrap();
        let profile = profile(&[3, 2, 5]);
        let prepared = estimator.prepare(&profile, 0);

        assert_eq!(estimator.interpolation(), interpolation);
        assert_eq!(prepared.estimate(1), (1.0, Method::Interpolated));
        assert_eq!(prepared.estimate(10), (3.0, Method::Observed));

        let (richness, _) = prepared.estimate(3);
        assert_approx_eq!(richness, rarefy(&[3, 2, 5], 3), epsilon = 0.1);
    }
}
