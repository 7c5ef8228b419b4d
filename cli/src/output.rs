//! Tab-separated output.

use std::{fs::File, io, path::Path};

use anyhow::{Context, Error};

/// A tab-separated writer to either a file or stdout.
pub type Writer = csv::Writer<Box<dyn io::Write>>;

/// Creates a writer to the provided path, or to stdout if no path is provided.
pub fn writer(path: Option<&Path>) -> Result<Writer, Error> {
    let inner: Box<dyn io::Write> = match path {
        Some(path) => Box::new(io::BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file at '{}'", path.display())
        })?)),
        None => Box::new(io::stdout().lock()),
    };

    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(inner))
}

/// Formats a real number with a fixed number of decimals.
pub fn format_real(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(1.0, 2), "1.00");
        assert_eq!(format_real(2.833333, 2), "2.83");
        assert_eq!(format_real(2.833333, 0), "3");
        assert_eq!(format_real(0.0, 4), "0.0000");
    }
}
