//! Selection of subsampling depths.

use std::{collections::BTreeSet, ops::Deref};

/// A strictly increasing set of subsampling depths for one profile.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepthSet(Vec<usize>);

impl DepthSet {
    /// Returns the depths as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Returns the largest depth.
    pub fn max(&self) -> Option<usize> {
        self.0.last().copied()
    }
}

impl Deref for DepthSet {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<BTreeSet<usize>> for DepthSet {
    fn from(depths: BTreeSet<usize>) -> Self {
        Self(depths.into_iter().collect())
    }
}

impl From<DepthSet> for Vec<usize> {
    fn from(depths: DepthSet) -> Self {
        depths.0
    }
}

impl<'a> IntoIterator for &'a DepthSet {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Selects at most `num_points` subsampling depths for a profile with `total` individuals.
///
/// The depths always include 1 and `total` when `total > 1` and more than one point is requested.
/// Interior points below `total` are split between linear and logarithmic spacing, the latter
/// being dense at small depths where richness changes the fastest. Small totals that cannot
/// accommodate the budget are filled with the smallest unused integers instead, and the result
/// may then have fewer than `num_points` depths.
///
/// An `upper_bound` above `total` enables extrapolation: part of the interior budget then goes to
/// linearly spaced depths in `(total, upper_bound]`, proportionally to `1 - total / upper_bound`.
/// An `upper_bound` below `total` is treated as `total`.
///
/// A `num_points` of zero is treated as one, in which case the single depth is `upper_bound`.
pub fn select_depths(total: usize, num_points: usize, upper_bound: usize) -> DepthSet {
    let num_points = num_points.max(1);
    let upper_bound = upper_bound.max(total);

    match (total, num_points) {
        (0, _) => DepthSet(vec![0]),
        (1, _) => DepthSet(vec![1]),
        (_, 1) => DepthSet(vec![upper_bound]),
        (_, 2) => DepthSet(vec![1, total]),
        (_, _) => {
            let (interpolated, extrapolated) = split_budget(total, upper_bound, num_points - 2);

            let mut depths = BTreeSet::from([1, total]);
            add_interpolation_depths(&mut depths, total, interpolated);
            add_extrapolation_depths(&mut depths, total, upper_bound, extrapolated);

            DepthSet::from(depths)
        }
    }
}

/// Splits the interior budget into numbers of depths below and above `total`.
fn split_budget(total: usize, upper_bound: usize, budget: usize) -> (usize, usize) {
    let available_below = total.saturating_sub(2);

    if upper_bound <= total {
        return (budget.min(available_below), 0);
    }

    let available_above = upper_bound - total;
    let ratio = total as f64 / upper_bound as f64;
    let target_below = (budget as f64 * ratio).round() as usize;

    let above = budget
        .saturating_sub(target_below)
        .max(1)
        .min(available_above);
    let below = (budget - above).min(available_below);

    // Whatever the interpolation range cannot hold is given to extrapolation
    let above = (budget - below).min(available_above);

    (below, above)
}

fn add_interpolation_depths(depths: &mut BTreeSet<usize>, total: usize, budget: usize) {
    if budget == 0 {
        return;
    }

    let linear = (budget + 1) / 2;
    let logarithmic = budget - linear;

    let mut interior = linear_spaced(1.0, total as f64, linear)
        .chain(log_spaced(2.0, (total - 1) as f64, logarithmic))
        .map(|x| x.round() as usize)
        .filter(|&depth| 1 < depth && depth < total)
        .collect::<BTreeSet<_>>();

    for depth in 2..total {
        if interior.len() >= budget {
            break;
        }
        interior.insert(depth);
    }

    depths.extend(interior);
}

fn add_extrapolation_depths(
    depths: &mut BTreeSet<usize>,
    total: usize,
    upper_bound: usize,
    budget: usize,
) {
    if budget == 0 {
        return;
    }

    let extrapolated = linear_spaced(total as f64, upper_bound as f64, budget - 1)
        .map(|x| x.round() as usize)
        .chain(std::iter::once(upper_bound));

    depths.extend(extrapolated);
}

/// Returns `n` evenly spaced points strictly between `from` and `to`.
fn linear_spaced(from: f64, to: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = (to - from) / (n + 1) as f64;

    (1..=n).map(move |i| from + i as f64 * step)
}

/// Returns `n` geometrically spaced points from `from` to `to`, both included when `n > 1`.
fn log_spaced(from: f64, to: f64, n: usize) -> impl Iterator<Item = f64> {
    let (ln_from, ln_to) = (from.ln(), to.ln());
    let step = if n > 1 {
        (ln_to - ln_from) / (n - 1) as f64
    } else {
        0.0
    };

    (0..n).map(move |i| (ln_from + i as f64 * step).exp())
}
