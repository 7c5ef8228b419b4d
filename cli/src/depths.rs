use std::io::{self, Write as _};

use anyhow::Error;

use clap::Parser;

use rarefaction_core::{rarefaction::DEFAULT_NUM_POINTS, select_depths};

/// Print the subsampling depths selected for a total abundance.
#[derive(Debug, Parser)]
pub struct Depths {
    /// Total abundance of the sample.
    #[arg(short = 'T', long, value_name = "INT")]
    total: usize,

    /// Maximum number of depths.
    ///
    /// Values below one are treated as one.
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_NUM_POINTS as i64,
        allow_negative_numbers = true,
        value_name = "INT"
    )]
    num_points: i64,

    /// Largest depth to select.
    ///
    /// Depths above the total abundance are extrapolated. By default, this is the total
    /// abundance, and values below the total abundance are treated as such.
    #[arg(short = 'u', long, value_name = "INT")]
    upper_bound: Option<usize>,
}

impl Depths {
    pub fn run(self) -> Result<(), Error> {
        let num_points = num_points(self.num_points);
        let upper_bound = self.upper_bound.unwrap_or(self.total);

        let depths = select_depths(self.total, num_points, upper_bound);

        let mut writer = io::stdout().lock();
        for depth in &depths {
            writeln!(writer, "{depth}")?;
        }

        Ok(())
    }
}

/// Returns the number of points as a positive integer, with a warning if it was not.
pub fn num_points(num_points: i64) -> usize {
    match usize::try_from(num_points) {
        Ok(num_points) if num_points > 0 => num_points,
        _ => {
            log::warn!("Number of points must be positive, found {num_points}; using 1.");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tests::{parse_subcmd, try_parse_subcmd};

    #[test]
    fn test_parse_defaults() {
        let args = parse_subcmd::<Depths>("rarefaction depths --total 100");

        assert_eq!(args.total, 100);
        assert_eq!(args.num_points, 10);
        assert_eq!(args.upper_bound, None);
    }

    #[test]
    fn test_total_is_required() {
        assert!(try_parse_subcmd::<Depths>("rarefaction depths -n 5").is_err());
    }

    #[test]
    fn test_parse_negative_num_points() {
        let args = parse_subcmd::<Depths>("rarefaction depths --total 100 -n -5");

        assert_eq!(args.num_points, -5);
    }

    #[test]
    fn test_num_points_clamped() {
        assert_eq!(num_points(-5), 1);
        assert_eq!(num_points(0), 1);
        assert_eq!(num_points(1), 1);
        assert_eq!(num_points(20), 20);
    }
}
