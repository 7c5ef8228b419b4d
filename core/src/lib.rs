#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Tools for rarefaction and extrapolation of clonotype richness.
//!
//! This serves as the core library implementation for the `rarefaction` CLI, but can also be used
//! as a free-standing library for estimating richness at varying sampling depths.
//!
//! # Overview
//!
//! Per-sample abundances are collected into [`Profiles`], for instance from tagged rows using a
//! [`profile::Builder`]. For each profile, a bounded set of subsampling depths is chosen by
//! [`select_depths`], and the expected number of distinct categories at each depth is estimated.
//! Below the observed total abundance this is done by interpolation, either analytically with
//! [`rarefy`] or by random subsampling with [`rarefy_monte_carlo`]; above it, by Chao1
//! extrapolation with [`extrapolate`]. The [`Rarefaction`] ties these together across samples.
//!
//! # Example
//!
//! Let's create a profile with three categories, and find its expected richness at a few
//! depths.
//!
//! ```
//! use rarefaction_core::{rarefy, select_depths, Profile};
//!
//! // Three categories with abundances 3, 2, and 5
//! let profile = Profile::new(vec![3, 2, 5]).expect("abundances are positive");
//!
//! // Select three depths
//! let depths = select_depths(profile.total_abundance(), 3, profile.total_abundance());
//! assert_eq!(depths.as_slice(), [1, 6, 10]);
//!
//! // Estimate richness
//! let richness = depths
//!     .iter()
//!     .map(|&depth| rarefy(profile.counts(), depth))
//!     .collect::<Vec<_>>();
//!
//! assert_eq!(richness[0], 1.0);
//! assert!((richness[1] - 2.833333).abs() < 1e-6);
//! assert_eq!(richness[2], 3.0);
//! ```

#[cfg(test)]
#[macro_use]
pub(crate) mod approx;

pub mod depth;
pub use depth::{select_depths, DepthSet};

pub mod estimate;
pub use estimate::{
    extrapolate, rarefy, rarefy_monte_carlo, Estimator, Extrapolation, Interpolation, Method,
};

pub mod profile;
pub use profile::{Profile, Profiles, SampleId};

pub mod rarefaction;
pub use rarefaction::{Rarefaction, RichnessEstimate};

pub mod utils;
