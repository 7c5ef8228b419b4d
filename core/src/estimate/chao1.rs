//! Extrapolation with the Chao1 unseen-species estimator.

use crate::profile::Profile;

use super::FrequencyCounts;

/// Returns the expected number of distinct categories in a sample of `depth` individuals,
/// extrapolated from the observed counts.
///
/// A `depth` at or below the total abundance returns the observed richness.
pub fn extrapolate(counts: &[usize], depth: usize) -> f64 {
    Chao1::from_counts(counts).extrapolate(depth)
}

/// The Chao1 model of a single profile.
///
/// The number of unseen categories is estimated from singletons f₁ and doubletons f₂ as
/// (n - 1) / n · f₁² / (2f₂), or with the bias-corrected (n - 1) / n · f₁(f₁ - 1) / 2 when there
/// are no doubletons. See Chao (1987) and Chao et al. (2014).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chao1 {
    total: usize,
    observed: usize,
    singletons: usize,
    unseen: f64,
}

impl Chao1 {
    /// Creates the model from per-category counts.
    pub fn from_counts(counts: &[usize]) -> Self {
        Self::from_frequency_counts(&FrequencyCounts::from_counts(counts))
    }

    pub(super) fn from_frequency_counts(frequency_counts: &FrequencyCounts) -> Self {
        let total = frequency_counts.total();
        let singletons = frequency_counts.get(1);
        let doubletons = frequency_counts.get(2);

        Self {
            total,
            observed: frequency_counts.observed(),
            singletons,
            unseen: unseen(total, singletons, doubletons),
        }
    }

    /// Returns the estimated number of categories present but not observed.
    pub fn unseen(&self) -> f64 {
        self.unseen
    }

    /// Returns the Chao1 estimate of total richness.
    ///
    /// This is the limit of the extrapolated richness as the depth grows.
    pub fn asymptote(&self) -> f64 {
        self.observed as f64 + self.unseen
    }

    /// Returns the extrapolated richness at `depth`.
    pub fn extrapolate(&self, depth: usize) -> f64 {
        let observed = self.observed as f64;

        if depth <= self.total || self.singletons == 0 || self.unseen <= 0.0 {
            return observed;
        }

        let n = self.total as f64;
        let f1 = self.singletons as f64;
        let additional = (depth - self.total) as f64;

        // (1 - f₁ / (n f̂₀ + f₁))^m, in log space for large m
        let remaining = (additional * (-f1 / (n * self.unseen + f1)).ln_1p()).exp();

        observed + self.unseen * (1.0 - remaining)
    }
}

impl From<&Profile> for Chao1 {
    fn from(profile: &Profile) -> Self {
        Self::from_counts(profile.counts())
    }
}

fn unseen(total: usize, singletons: usize, doubletons: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let correction = (total - 1) as f64 / total as f64;
    let f1 = singletons as f64;

    if doubletons > 0 {
        correction * f1 * f1 / (2.0 * doubletons as f64)
    } else {
        correction * f1 * (f1 - 1.0).max(0.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Four singletons, no doubletons, six categories, twenty individuals
    const NO_DOUBLETONS: [usize; 6] = [1, 1, 1, 1, 8, 8];

    #[test]
    fn test_unseen_without_doubletons_is_bias_corrected() {
        let chao1 = Chao1::from_counts(&NO_DOUBLETONS);

        assert_approx_eq!(chao1.unseen(), 19.0 / 20.0 * 4.0 * 3.0 / 2.0, epsilon = 1e-12);
        assert_approx_eq!(chao1.asymptote(), 11.7, epsilon = 1e-12);
    }

    #[test]
    fn test_extrapolate_without_doubletons() {
        let extrapolated = extrapolate(&NO_DOUBLETONS, 40);

        assert!(extrapolated > 6.0);
        assert!(extrapolated <= 6.0 + 5.7);
        assert_approx_eq!(extrapolated, 8.840226, epsilon = 1e-6);
    }

    #[test]
    fn test_extrapolate_with_doubletons() {
        let counts = [1, 1, 2, 3, 5];
        let chao1 = Chao1::from_counts(&counts);

        assert_approx_eq!(chao1.unseen(), 11.0 / 12.0 * 4.0 / 2.0, epsilon = 1e-12);
        assert_approx_eq!(chao1.extrapolate(20), 5.919361, epsilon = 1e-6);
    }

    #[test]
    fn test_within_observed_total_is_observed_richness() {
        assert_eq!(extrapolate(&NO_DOUBLETONS, 20), 6.0);
        assert_eq!(extrapolate(&NO_DOUBLETONS, 5), 6.0);
    }

    #[test]
    fn test_no_singletons_is_flat() {
        assert_eq!(extrapolate(&[2, 3, 4], 50), 3.0);
        assert_eq!(Chao1::from_counts(&[2, 3, 4]).unseen(), 0.0);
    }

    #[test]
    fn test_single_singleton_without_doubletons_is_flat() {
        assert_eq!(extrapolate(&[1, 5, 7], 100), 3.0);
    }

    #[test]
    fn test_empty_profile() {
        assert_eq!(extrapolate(&[], 10), 0.0);
        assert_eq!(Chao1::from_counts(&[]).asymptote(), 0.0);
    }

    #[test]
    fn test_monotone_and_bounded() {
        let counts = [1, 1, 1, 1, 1, 2, 2, 3, 7, 12];
        let chao1 = Chao1::from_counts(&counts);
        let total = counts.iter().sum::<usize>();

        let extrapolated = (total..total * 100)
            .step_by(7)
            .map(|depth| chao1.extrapolate(depth))
            .collect::<Vec<_>>();

        assert!(extrapolated.windows(2).all(|w| w[0] <= w[1]));
        assert!(extrapolated.iter().all(|&x| x <= chao1.asymptote()));
        assert_approx_eq!(chao1.extrapolate(usize::MAX / 2), chao1.asymptote(), epsilon = 1e-9);
    }
}
