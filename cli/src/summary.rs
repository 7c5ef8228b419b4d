use std::path::PathBuf;

use anyhow::Error;

use clap::Parser;

use rarefaction_core::{estimate::Chao1, Profile, SampleId};

use crate::{
    output::{self, format_real},
    reader::Reader,
    Input,
};

/// The output header.
pub const HEADER: [&str; 6] = [
    "pl7_app_sampleId",
    "total_abundance",
    "observed_richness",
    "singletons",
    "doubletons",
    "chao1",
];

/// Summarize clonotype abundances per sample.
///
/// For each sample, prints the total abundance, the number of observed clonotypes, the number of
/// clonotypes seen once and twice, and the Chao1 estimate of total richness.
#[derive(Debug, Parser)]
pub struct Summary {
    /// Input clonotype abundances.
    ///
    /// Tab-separated, with a header and the columns sample, clonotype key, and abundance. The input
    /// may be gzip compressed. If no file is provided, stdin will be used.
    #[arg(value_name = "PATH")]
    input: Option<PathBuf>,

    /// Number of decimals in the Chao1 estimate.
    #[arg(short = 'p', long, default_value_t = 2, value_name = "INT")]
    precision: usize,

    /// Output file.
    ///
    /// If no file is provided, stdout will be used.
    #[arg(short = 'o', long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Promote warnings to errors.
    #[arg(long)]
    strict: bool,
}

impl Summary {
    pub fn run(self) -> Result<(), Error> {
        let input = Input::new(self.input)?;
        let profiles = Reader::from_input(&input)?
            .set_strict(self.strict)
            .read_profiles()?;

        let mut writer = output::writer(self.output.as_deref())?;
        writer.write_record(HEADER)?;
        for (sample, profile) in &profiles {
            writer.write_record(summarize(sample, profile, self.precision))?;
        }
        writer.flush()?;

        Ok(())
    }
}

fn summarize(sample: &SampleId, profile: &Profile, precision: usize) -> [String; 6] {
    let chao1 = Chao1::from(profile).asymptote();

    [
        sample.to_string(),
        profile.total_abundance().to_string(),
        profile.observed_richness().to_string(),
        profile.singletons().to_string(),
        profile.doubletons().to_string(),
        format_real(chao1, precision),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tests::parse_subcmd;

    #[test]
    fn test_parse() {
        let args = parse_subcmd::<Summary>("rarefaction summary -p 4 input.tsv.gz");

        assert_eq!(args.input, Some(PathBuf::from("input.tsv.gz")));
        assert_eq!(args.precision, 4);
    }

    #[test]
    fn test_summarize() {
        let profile = Profile::new(vec![1, 1, 1, 1, 8, 8]).unwrap();

        assert_eq!(
            summarize(&SampleId::from("S1"), &profile, 2),
            ["S1", "20", "6", "4", "0", "11.70"]
        );
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(
            summarize(&SampleId::from("S1"), &Profile::empty(), 1),
            ["S1", "0", "0", "0", "0", "0.0"]
        );
    }
}
