//! Reading tab-separated clonotype abundances into profiles.

use std::{fmt, io};

use anyhow::{anyhow, Context, Error};

use rarefaction_core::{
    profile::{Builder, Registered},
    Profiles,
};

use crate::Input;

/// The expected header of the input.
pub const HEADER: [&str; 3] = ["pl7_app_sampleId", "clonotypeKey", "abundance"];

/// A reader of rows of sample, clonotype key, and abundance.
pub struct Reader<R> {
    inner: csv::Reader<R>,
    warnings: Warnings,
    strict: bool,
}

impl Reader<Box<dyn io::BufRead>> {
    pub fn from_input(input: &Input) -> Result<Self, Error> {
        let reader = input
            .open()
            .with_context(|| format!("Failed to open input from {input}"))?;

        Ok(Self::new(reader))
    }
}

impl<R> Reader<R>
where
    R: io::Read,
{
    pub fn new(reader: R) -> Self {
        let inner = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);

        Self {
            inner,
            warnings: Warnings::default(),
            strict: false,
        }
    }

    /// Reads all rows, grouping abundances by sample.
    ///
    /// Malformed rows are skipped with a warning, or cause an error in strict mode. It is an
    /// error if no sample remains.
    pub fn read_profiles(&mut self) -> Result<Profiles, Error> {
        self.check_header()?;

        let mut builder = Builder::default();
        let mut record = csv::StringRecord::new();
        let mut row = 0;

        while self.inner.read_record(&mut record)? {
            row += 1;

            let (sample, clonotype, abundance) = match parse_row(&record) {
                Ok(parsed) => parsed,
                Err(error) => {
                    self.handle(row, error)?;
                    continue;
                }
            };

            if abundance < 0 {
                self.handle(row, ParseRowError::NegativeAbundance(abundance))?;
            }

            if builder.add(sample, clonotype, abundance) == Registered::Aggregated {
                log::trace!("Summed repeated clonotype '{clonotype}' in sample '{sample}'");
            }
        }

        log::debug!("Read {row} rows");
        self.warnings.summarize();

        if builder.is_empty() {
            Err(anyhow!(
                "No valid data found in the input file to process after the header."
            ))
        } else {
            Ok(builder.build())
        }
    }

    /// Sets strict mode, in which malformed rows cause an error.
    pub fn set_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn check_header(&mut self) -> Result<(), Error> {
        let header = self.inner.headers()?;

        if !header.is_empty() && header.iter().take(HEADER.len()).ne(HEADER) {
            let found = header.iter().collect::<Vec<_>>().join(", ");
            let expected = HEADER.join(", ");

            log::warn!(
                "Input file header '{found}' does not look as expected ('{expected}'). \
                Assuming the first three columns are sample, clonotype key, and abundance."
            );
        }

        Ok(())
    }

    fn handle(&mut self, row: usize, error: ParseRowError) -> Result<(), Error> {
        if self.strict {
            Err(anyhow!("Row {row} (after header): {error}"))
        } else {
            self.warnings.warn_once(row, &error);
            Ok(())
        }
    }
}

fn parse_row(record: &csv::StringRecord) -> Result<(&str, &str, i64), ParseRowError> {
    match (record.get(0), record.get(1), record.get(2)) {
        (Some(sample), Some(clonotype), Some(abundance)) => abundance
            .trim()
            .parse::<i64>()
            .map(|abundance| (sample.trim(), clonotype.trim(), abundance))
            .map_err(|_| ParseRowError::NonIntegerAbundance(abundance.to_string())),
        _ => Err(ParseRowError::MissingColumns(record.len())),
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseRowError {
    MissingColumns(usize),
    NonIntegerAbundance(String),
    NegativeAbundance(i64),
}

impl ParseRowError {
    fn kind(&self) -> ParseRowErrorKind {
        match self {
            Self::MissingColumns(_) => ParseRowErrorKind::MissingColumns,
            Self::NonIntegerAbundance(_) => ParseRowErrorKind::NonIntegerAbundance,
            Self::NegativeAbundance(_) => ParseRowErrorKind::NegativeAbundance,
        }
    }
}

impl fmt::Display for ParseRowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumns(found) => {
                write!(f, "Expected at least 3 columns, found {found}")
            }
            Self::NonIntegerAbundance(raw) => write!(f, "Non-integer abundance '{raw}'"),
            Self::NegativeAbundance(value) => {
                write!(f, "Negative abundance ({value}) not allowed")
            }
        }
    }
}

impl std::error::Error for ParseRowError {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
enum ParseRowErrorKind {
    MissingColumns = 0,
    NonIntegerAbundance = 1,
    NegativeAbundance = 2,
}

impl ParseRowErrorKind {
    const N: usize = 3;
    const VARIANTS: [ParseRowErrorKind; Self::N] = [
        Self::MissingColumns,
        Self::NonIntegerAbundance,
        Self::NegativeAbundance,
    ];

    fn reason(&self) -> &'static str {
        match self {
            Self::MissingColumns => "too few columns",
            Self::NonIntegerAbundance => "non-integer abundance",
            Self::NegativeAbundance => "negative abundance",
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Warnings {
    counts: [usize; ParseRowErrorKind::N],
}

impl Warnings {
    fn count(&self, kind: ParseRowErrorKind) -> usize {
        self.counts[kind as u8 as usize]
    }

    fn count_mut(&mut self, kind: ParseRowErrorKind) -> &mut usize {
        &mut self.counts[kind as u8 as usize]
    }

    fn warn_once(&mut self, row: usize, error: &ParseRowError) {
        let kind = error.kind();

        if self.count(kind) == 0 {
            log::warn!(
                "Row {row} (after header): {error}. Skipping row. \
                This warning will be shown only once, with a summary at the end."
            );
        }

        *self.count_mut(kind) += 1;
    }

    fn summarize(&self) {
        for kind in ParseRowErrorKind::VARIANTS {
            let count = self.count(kind);

            if count > 0 {
                let reason = kind.reason();

                log::warn!("Skipped {count} rows due to {reason}.");
            }
        }
    }
}
