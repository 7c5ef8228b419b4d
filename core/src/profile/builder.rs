//! Grouping of tagged abundances into profiles.

use indexmap::IndexMap;

use super::{Profile, Profiles, SampleId};

/// The outcome of adding an abundance to a [`Builder`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Registered {
    /// The abundance was recorded for a category not previously seen in the sample.
    New,
    /// The abundance was added to an existing category of the sample.
    Aggregated,
    /// The abundance was not positive; only the sample itself was registered.
    NonPositive,
}

/// A builder to collect `(sample, category, abundance)` triples into [`Profiles`].
///
/// Samples and categories keep the order in which they were first added. Repeated
/// `(sample, category)` pairs are summed. A sample for which no positive abundance is ever
/// added still gets an (empty) profile.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    samples: IndexMap<SampleId, IndexMap<String, usize>>,
}

impl Builder {
    /// Adds an abundance for a category in a sample.
    pub fn add<S, C>(&mut self, sample: S, category: C, abundance: i64) -> Registered
    where
        S: AsRef<str>,
        C: AsRef<str>,
    {
        let categories = self.categories_mut(sample.as_ref());

        match usize::try_from(abundance) {
            Ok(abundance) if abundance > 0 => {
                if let Some(count) = categories.get_mut(category.as_ref()) {
                    *count += abundance;
                    Registered::Aggregated
                } else {
                    categories.insert(category.as_ref().to_string(), abundance);
                    Registered::New
                }
            }
            _ => Registered::NonPositive,
        }
    }

    /// Finishes building, returning the profiles.
    pub fn build(self) -> Profiles {
        self.samples
            .into_iter()
            .map(|(sample, categories)| {
                let counts = categories.into_values().collect();
                (sample, Profile::new_unchecked(counts))
            })
            .collect()
    }

    /// Returns true if no sample has been registered.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn categories_mut(&mut self, sample: &str) -> &mut IndexMap<String, usize> {
        self.samples.entry(SampleId::from(sample)).or_default()
    }
}
