//! Analytic rarefaction.

use crate::utils::miss_probability;

use super::FrequencyCounts;

/// Returns the expected number of distinct categories in a random subsample of `depth`
/// individuals drawn without replacement.
///
/// This is the Hurlbert rarefaction formula: the observed richness minus, for every category,
/// the hypergeometric probability that the category is entirely absent from the subsample.
/// A `depth` at or above the total abundance returns the observed richness.
pub fn rarefy(counts: &[usize], depth: usize) -> f64 {
    Analytic::new(counts).rarefy(depth)
}

/// Analytic rarefaction of a single profile.
///
/// Categories sharing an abundance also share their miss probability, so these are computed
/// once per distinct abundance.
#[derive(Clone, Debug, PartialEq)]
pub struct Analytic {
    frequency_counts: FrequencyCounts,
}

impl Analytic {
    /// Creates a new rarefaction of the provided per-category counts.
    pub fn new(counts: &[usize]) -> Self {
        Self::from_frequency_counts(FrequencyCounts::from_counts(counts))
    }

    pub(super) fn from_frequency_counts(frequency_counts: FrequencyCounts) -> Self {
        Self { frequency_counts }
    }

    /// Returns the expected richness at `depth`.
    pub fn rarefy(&self, depth: usize) -> f64 {
        let total = self.frequency_counts.total();
        let observed = self.frequency_counts.observed() as f64;

        if depth == 0 {
            0.0
        } else if depth >= total {
            observed
        } else if depth == 1 {
            // A single individual always belongs to exactly one category
            1.0
        } else {
            let missed = self
                .frequency_counts
                .iter()
                .map(|(abundance, categories)| {
                    categories as f64
                        * miss_probability(total as u64, abundance as u64, depth as u64)
                })
                .sum::<f64>();

            (observed - missed).clamp(0.0, observed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let counts = [3, 2, 5];

        assert_eq!(rarefy(&counts, 0), 0.0);
        assert_eq!(rarefy(&counts, 1), 1.0);
        assert_eq!(rarefy(&counts, 10), 3.0);
        assert_eq!(rarefy(&counts, 25), 3.0);
    }

    #[test]
    fn test_two_categories_at_total() {
        assert_eq!(rarefy(&[3, 2], 5), 2.0);
    }

    #[test]
    fn test_empty_profile() {
        assert_eq!(rarefy(&[], 0), 0.0);
        assert_eq!(rarefy(&[], 3), 0.0);
    }

    #[test]
    fn test_interior_values() {
        let counts = [3, 2, 5];

        assert_approx_eq!(rarefy(&counts, 2), 1.688889, epsilon = 1e-6);
        assert_approx_eq!(rarefy(&counts, 3), 2.158333, epsilon = 1e-6);
        assert_approx_eq!(rarefy(&counts, 6), 2.833333, epsilon = 1e-6);
        assert_approx_eq!(rarefy(&counts, 8), 2.977778, epsilon = 1e-6);
        assert_approx_eq!(rarefy(&counts, 9), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_repeated_abundances() {
        let counts = [1, 4, 1];

        assert_approx_eq!(rarefy(&counts, 2), 1.6, epsilon = 1e-9);
        assert_approx_eq!(rarefy(&counts, 4), 2.333333, epsilon = 1e-6);
        assert_approx_eq!(rarefy(&counts, 5), 2.666667, epsilon = 1e-6);
    }

    #[test]
    fn test_single_category() {
        for depth in 1..=10 {
            assert_eq!(rarefy(&[10], depth), 1.0);
        }
    }

    #[test]
    fn test_depth_one_is_one() {
        for counts in [vec![1], vec![1, 1, 1], vec![7, 3, 1, 1, 900], vec![2; 50]] {
            assert_eq!(rarefy(&counts, 1), 1.0);
        }
    }

    #[test]
    fn test_monotone_in_depth() {
        let counts = [1, 1, 1, 2, 2, 3, 5, 8, 13, 21, 34, 55];
        let total = counts.iter().sum::<usize>();

        let rarefied = (0..=total).map(|d| rarefy(&counts, d)).collect::<Vec<_>>();

        assert!(rarefied.windows(2).all(|w| w[0] <= w[1] + 1e-12));
        assert!(rarefied.iter().all(|&r| r <= counts.len() as f64));
    }

    #[test]
    fn test_large_totals() {
        // One dominant category and many singletons
        let mut counts = vec![1; 1000];
        counts.push(999_000);

        // Each singleton is seen with probability depth / total
        let expected = 1.0 + 1000.0 * 0.5;
        assert_approx_eq!(rarefy(&counts, 500_000), expected, epsilon = 1e-3);
    }
}
