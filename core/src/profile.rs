//! Per-sample abundance profiles.

use std::{borrow::Borrow, fmt};

use indexmap::IndexMap;

mod builder;
pub use builder::{Builder, Registered};

/// An opaque sample identifier.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SampleId(pub String);

impl From<&str> for SampleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SampleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for SampleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SampleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The abundances of the categories observed in a single sample.
///
/// Every count is positive; a profile without any counts is a valid, degenerate profile.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    counts: Vec<usize>,
    total: usize,
}

impl Profile {
    /// Creates a new profile from per-category counts.
    ///
    /// Returns an error if any count is zero.
    pub fn new(counts: Vec<usize>) -> Result<Self, ProfileError> {
        if let Some(index) = counts.iter().position(|&count| count == 0) {
            Err(ProfileError::ZeroAbundance { index })
        } else {
            Ok(Self::new_unchecked(counts))
        }
    }

    pub(crate) fn new_unchecked(counts: Vec<usize>) -> Self {
        let total = counts.iter().sum();

        Self { counts, total }
    }

    /// Creates a profile without any observed categories.
    pub fn empty() -> Self {
        Self::new_unchecked(Vec::new())
    }

    /// Returns the per-category counts.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Returns the number of individuals across all categories.
    pub fn total_abundance(&self) -> usize {
        self.total
    }

    /// Returns the number of distinct categories.
    pub fn observed_richness(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if no individuals were observed.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Returns the number of categories observed exactly once.
    pub fn singletons(&self) -> usize {
        self.frequency_count(1)
    }

    /// Returns the number of categories observed exactly twice.
    pub fn doubletons(&self) -> usize {
        self.frequency_count(2)
    }

    fn frequency_count(&self, abundance: usize) -> usize {
        self.counts.iter().filter(|&&count| count == abundance).count()
    }
}

impl TryFrom<Vec<usize>> for Profile {
    type Error = ProfileError;

    fn try_from(counts: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(counts)
    }
}

/// Profiles of several samples, in the order their samples were first seen.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Profiles(IndexMap<SampleId, Profile>);

impl Profiles {
    /// Returns the profile of a sample.
    pub fn get(&self, sample: &str) -> Option<&Profile> {
        self.0.get(sample)
    }

    /// Inserts a profile, returning the previous profile of the sample if any.
    ///
    /// A new sample is placed last, a replaced sample keeps its position.
    pub fn insert<S>(&mut self, sample: S, profile: Profile) -> Option<Profile>
    where
        S: Into<SampleId>,
    {
        self.0.insert(sample.into(), profile)
    }

    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over samples and their profiles in order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, SampleId, Profile> {
        self.0.iter()
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the largest total abundance of any sample, or zero if there are no samples.
    pub fn max_total_abundance(&self) -> usize {
        self.0
            .values()
            .map(Profile::total_abundance)
            .max()
            .unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a Profiles {
    type Item = (&'a SampleId, &'a Profile);
    type IntoIter = indexmap::map::Iter<'a, SampleId, Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S> FromIterator<(S, Profile)> for Profiles
where
    S: Into<SampleId>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (S, Profile)>,
    {
        Self(
            iter.into_iter()
                .map(|(sample, profile)| (sample.into(), profile))
                .collect(),
        )
    }
}

/// An error associated with constructing a profile.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProfileError {
    /// A category was given an abundance of zero.
    ZeroAbundance {
        /// Index of the offending category.
        index: usize,
    },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::ZeroAbundance { index } => {
                write!(f, "abundance of category at index {index} is zero")
            }
        }
    }
}

impl std::error::Error for ProfileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_summaries() {
        let profile = Profile::new(vec![3, 1, 2, 1, 5, 2, 1]).unwrap();

        assert_eq!(profile.total_abundance(), 15);
        assert_eq!(profile.observed_richness(), 7);
        assert_eq!(profile.singletons(), 3);
        assert_eq!(profile.doubletons(), 2);
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_empty_profile() {
        let profile = Profile::empty();

        assert_eq!(profile.total_abundance(), 0);
        assert_eq!(profile.observed_richness(), 0);
        assert!(profile.is_empty());
    }

    #[test]
    fn test_zero_abundance_is_rejected() {
        assert_eq!(
            Profile::new(vec![3, 0, 2]),
            Err(ProfileError::ZeroAbundance { index: 1 })
        );
    }

    #[test]
    fn test_profiles_keep_insertion_order() {
        let profiles = Profiles::from_iter([
            ("b", Profile::new(vec![1, 2]).unwrap()),
            ("a", Profile::new(vec![10]).unwrap()),
            ("c", Profile::empty()),
        ]);

        let samples = profiles
            .iter()
            .map(|(sample, _)| sample.0.as_str())
            .collect::<Vec<_>>();
        assert_eq!(samples, ["b", "a", "c"]);
        assert_eq!(profiles.max_total_abundance(), 10);
        assert_eq!(profiles.get("a").map(Profile::total_abundance), Some(10));
    }

    #[test]
    fn test_max_total_abundance_of_no_profiles() {
        assert_eq!(Profiles::default().max_total_abundance(), 0);
    }
}
