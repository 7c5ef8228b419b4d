//! Rarefaction curves across samples.

use std::fmt;

use rayon::prelude::*;

use crate::{
    depth::select_depths,
    estimate::{Estimator, EstimatorError, Extrapolation, Interpolation, Method},
    profile::{Profile, Profiles, SampleId},
};

/// Default number of depths per sample.
pub const DEFAULT_NUM_POINTS: usize = 10;

/// The estimated richness of a sample at a single depth.
#[derive(Clone, Debug, PartialEq)]
pub struct RichnessEstimate {
    /// The sample.
    pub sample: SampleId,
    /// The subsampling depth.
    pub depth: usize,
    /// The expected number of distinct categories at `depth`.
    pub richness: f64,
    /// How the estimate was obtained.
    pub method: Method,
}

/// Rarefaction and extrapolation of richness across samples.
///
/// Use [`Builder`] to construct.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rarefaction {
    num_points: usize,
    estimator: Estimator,
    extrapolate_to: Option<usize>,
}

impl Rarefaction {
    /// Returns a builder with default settings.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the estimator.
    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Returns the number of depths per sample.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Returns the estimated richness of each sample at its selected depths.
    ///
    /// Estimates are ordered by sample, in the order of the profiles, and then by increasing
    /// depth. Samples are processed in parallel on the current rayon pool.
    pub fn run(&self, profiles: &Profiles) -> Vec<RichnessEstimate> {
        let extrapolate_to = self.extrapolate_to(profiles);

        log::debug!(
            "Estimating richness of {} samples using {:?} interpolation and {:?} extrapolation",
            profiles.len(),
            self.estimator.interpolation(),
            self.estimator.extrapolation(),
        );

        let samples = profiles.iter().collect::<Vec<_>>();

        samples
            .into_par_iter()
            .enumerate()
            .map(|(stream, (sample, profile))| {
                self.run_sample(sample, profile, stream as u64, extrapolate_to)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    /// Returns the depth up to which samples are extrapolated, if any.
    fn extrapolate_to(&self, profiles: &Profiles) -> Option<usize> {
        match self.estimator.extrapolation() {
            Extrapolation::Chao1 => Some(
                self.extrapolate_to
                    .unwrap_or_else(|| profiles.max_total_abundance()),
            ),
            Extrapolation::None => None,
        }
    }

    fn run_sample(
        &self,
        sample: &SampleId,
        profile: &Profile,
        stream: u64,
        extrapolate_to: Option<usize>,
    ) -> Vec<RichnessEstimate> {
        let total = profile.total_abundance();

        if total == 0 {
            log::debug!("Sample '{sample}' has no positive abundances");

            return vec![RichnessEstimate {
                sample: sample.clone(),
                depth: 0,
                richness: 0.0,
                method: Method::Observed,
            }];
        }

        let upper_bound = extrapolate_to.map_or(total, |depth| depth.max(total));
        let depths = select_depths(total, self.num_points, upper_bound);

        log::debug!(
            "Selected {} depths up to {upper_bound} for sample '{sample}' \
            with total abundance {total}",
            depths.len(),
        );
        log::trace!("Depths for sample '{sample}': {:?}", depths.as_slice());

        let prepared = self.estimator.prepare(profile, stream);

        depths
            .iter()
            .map(|&depth| {
                let (richness, method) = prepared.estimate(depth);

                RichnessEstimate {
                    sample: sample.clone(),
                    depth,
                    richness,
                    method,
                }
            })
            .collect()
    }
}

impl Default for Rarefaction {
    fn default() -> Self {
        Self {
            num_points: DEFAULT_NUM_POINTS,
            estimator: Estimator::default(),
            extrapolate_to: None,
        }
    }
}

/// A builder for [`Rarefaction`].
#[derive(Clone, Debug)]
pub struct Builder {
    num_points: usize,
    interpolation: Interpolation,
    extrapolation: Extrapolation,
    extrapolate_to: Option<usize>,
}

impl Builder {
    /// Builds the rarefaction.
    ///
    /// Returns an error if random subsampling is requested with zero iterations.
    pub fn build(self) -> Result<Rarefaction, BuildError> {
        let estimator = Estimator::new(self.interpolation, self.extrapolation)?;

        Ok(Rarefaction {
            num_points: self.num_points.max(1),
            estimator,
            extrapolate_to: self.extrapolate_to,
        })
    }

    /// Sets the extrapolation method.
    pub fn set_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Sets the depth up to which samples are extrapolated.
    ///
    /// By default, this is the largest total abundance of any sample. Has no effect without
    /// extrapolation, and samples with a larger total abundance are never extrapolated.
    pub fn set_extrapolate_to(mut self, depth: usize) -> Self {
        self.extrapolate_to = Some(depth);
        self
    }

    /// Sets the interpolation method.
    pub fn set_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets the maximum number of depths per sample.
    ///
    /// Zero is treated as one.
    pub fn set_num_points(mut self, num_points: usize) -> Self {
        self.num_points = num_points;
        self
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            num_points: DEFAULT_NUM_POINTS,
            interpolation: Interpolation::default(),
            extrapolation: Extrapolation::default(),
            extrapolate_to: None,
        }
    }
}

/// An error associated with building a [`Rarefaction`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildError {
    /// Random subsampling was requested with zero iterations.
    NoIterations,
}

impl From<EstimatorError> for BuildError {
    fn from(error: EstimatorError) -> Self {
        match error {
            EstimatorError::NoIterations => BuildError::NoIterations,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::NoIterations => {
                f.write_str("number of iterations must be positive for random subsampling")
            }
        }
    }
}

impl std::error::Error for BuildError {}
