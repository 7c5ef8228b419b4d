use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::{Context, Error};

use clap::{Parser, ValueEnum};

use rarefaction_core::{
    estimate::DEFAULT_ITERATIONS, rarefaction::DEFAULT_NUM_POINTS, Extrapolation, Interpolation,
    Rarefaction, RichnessEstimate,
};

use crate::{
    depths::num_points,
    output::{self, format_real},
    reader::Reader,
    Input,
};

/// The output header.
pub const HEADER: [&str; 3] = [
    "pl7_app_sampleId",
    "subsampling_depth",
    "mean_unique_clonotypes",
];

/// Estimate clonotype richness at a range of subsampling depths.
#[derive(Debug, Parser)]
pub struct Curve {
    /// Input clonotype abundances.
    ///
    /// Tab-separated, with a header and the columns sample, clonotype key, and abundance. The input
    /// may be gzip compressed. If no file is provided, stdin will be used.
    #[arg(value_name = "PATH")]
    input: Option<PathBuf>,

    /// Maximum number of subsampling depths per sample.
    ///
    /// Samples with small total abundances may get fewer depths. Values below one are treated as
    /// one.
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_NUM_POINTS as i64,
        allow_negative_numbers = true,
        value_name = "INT"
    )]
    num_points: i64,

    /// Method used below the total abundance of a sample.
    #[arg(short = 'm', long, value_enum, default_value_t = Method::Analytic)]
    method: Method,

    /// Number of random subsamples per depth.
    ///
    /// Only used with the 'monte-carlo' method.
    #[arg(short = 'i', long, default_value_t = DEFAULT_ITERATIONS, value_name = "INT")]
    num_iterations: usize,

    /// Seed for random subsampling.
    ///
    /// Only used with the 'monte-carlo' method. Results are reproducible for a given seed,
    /// regardless of the number of threads.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    seed: u64,

    /// Extrapolate richness above the total abundance of each sample.
    ///
    /// Uses the Chao1 estimator. Samples are extrapolated up to the largest total abundance
    /// across samples, unless '--extrapolate-to' is set.
    #[arg(short = 'e', long)]
    extrapolate: bool,

    /// Depth to extrapolate samples to.
    ///
    /// Implies '--extrapolate'. Samples with a larger total abundance are not extrapolated.
    #[arg(long, value_name = "INT")]
    extrapolate_to: Option<usize>,

    /// Number of decimals in estimated richness.
    #[arg(short = 'p', long, default_value_t = 2, value_name = "INT")]
    precision: usize,

    /// Add a column with the method of each estimate.
    ///
    /// The method is 'interpolated' below the total abundance, 'observed' at the total abundance,
    /// and 'extrapolated' above the total abundance.
    #[arg(long)]
    with_method: bool,

    /// Output file.
    ///
    /// If no file is provided, stdout will be used.
    #[arg(short = 'o', long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Promote warnings to errors.
    ///
    /// By default, rows with too few columns, or with non-integer or negative abundances, are
    /// skipped with a warning. Using this flag will cause an error instead.
    #[arg(long)]
    strict: bool,

    /// Number of threads to use.
    #[arg(short = 't', long, default_value_t = NonZeroUsize::new(4).unwrap(), value_name = "INT")]
    threads: NonZeroUsize,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    /// Exact expectation from hypergeometric probabilities.
    Analytic,
    /// Mean of random subsamples without replacement.
    MonteCarlo,
}

impl Curve {
    pub fn run(self) -> Result<(), Error> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads.get())
            .build_global()
            .context("Failed to set up thread pool")?;
        log::debug!("Using {} threads", self.threads);

        let rarefaction = self.rarefaction()?;

        let input = Input::new(self.input)?;
        let profiles = Reader::from_input(&input)?
            .set_strict(self.strict)
            .read_profiles()?;
        log::info!("Read abundances of {} samples from {input}", profiles.len());

        let estimates = rarefaction.run(&profiles);

        let mut writer = output::writer(self.output.as_deref())?;
        write_estimates(&mut writer, &estimates, self.precision, self.with_method)?;
        writer.flush()?;

        Ok(())
    }

    fn rarefaction(&self) -> Result<Rarefaction, Error> {
        let interpolation = match self.method {
            Method::Analytic => Interpolation::Analytic,
            Method::MonteCarlo => Interpolation::MonteCarlo {
                iterations: self.num_iterations,
                seed: self.seed,
            },
        };

        let mut builder = Rarefaction::builder()
            .set_num_points(num_points(self.num_points))
            .set_interpolation(interpolation);

        if self.extrapolate || self.extrapolate_to.is_some() {
            builder = builder.set_extrapolation(Extrapolation::Chao1);
        }
        if let Some(depth) = self.extrapolate_to {
            builder = builder.set_extrapolate_to(depth);
        }

        Ok(builder.build()?)
    }
}

fn write_estimates<W>(
    writer: &mut csv::Writer<W>,
    estimates: &[RichnessEstimate],
    precision: usize,
    with_method: bool,
) -> Result<(), Error>
where
    W: std::io::Write,
{
    if with_method {
        writer.write_record(HEADER.iter().chain(&["method"]))?;
    } else {
        writer.write_record(HEADER)?;
    }

    for estimate in estimates {
        let depth = estimate.depth.to_string();
        let richness = format_real(estimate.richness, precision);
        let record = [estimate.sample.0.as_str(), depth.as_str(), richness.as_str()];

        if with_method {
            writer.write_record(record.iter().chain(&[estimate.method.name()]))?;
        } else {
            writer.write_record(record)?;
        }
    }

    Ok(())
}
