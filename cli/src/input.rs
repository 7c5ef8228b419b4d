//! Input sources.

use std::{
    env, fmt,
    fs::File,
    io::{self, IsTerminal as _},
    path::PathBuf,
};

use flate2::bufread::MultiGzDecoder;

/// An input source for reading.
#[derive(Debug)]
pub enum Input {
    /// A path from which to read a file.
    Path(PathBuf),
    /// Stdin.
    Stdin,
}

impl Input {
    /// By default, creating an `Input` checks that either a path is provided, or that input is
    /// available via stdin, instead of hanging.
    ///
    /// In some contexts, e.g. testing, this can cause issues, and so it may be disabled by setting
    /// this environment variable, or by using [`Input::new_unchecked`].
    pub const ENV_KEY_DISABLE_CHECK: &'static str = "RAREFACTION_ALLOW_STDIN";

    /// Creates a new input source.
    pub fn new(input: Option<PathBuf>) -> io::Result<Self> {
        let check = env::var(Self::ENV_KEY_DISABLE_CHECK).is_err();

        if input.is_some() && !io::stdin().is_terminal() && check {
            Err(io::Error::new(
                io::ErrorKind::Other,
                "received input both via file and stdin",
            ))
        } else if input.is_none() && io::stdin().is_terminal() && check {
            Err(io::Error::new(
                io::ErrorKind::Other,
                "received no input via file or stdin",
            ))
        } else {
            Ok(Self::new_unchecked(input))
        }
    }

    /// Creates a new input source without checking that any data is available.
    pub fn new_unchecked(input: Option<PathBuf>) -> Self {
        if let Some(path) = input {
            Self::Path(path)
        } else {
            Self::Stdin
        }
    }

    /// Opens the input for reading, transparently decompressing gzip.
    pub fn open(&self) -> io::Result<Box<dyn io::BufRead>> {
        let mut reader: Box<dyn io::BufRead> = match self {
            Input::Path(path) => Box::new(io::BufReader::new(File::open(path)?)),
            Input::Stdin => Box::new(io::stdin().lock()),
        };

        match CompressionMethod::detect(&mut reader)? {
            Some(CompressionMethod::Gzip) => {
                log::debug!("Detected gzip compressed input");

                Ok(Box::new(io::BufReader::new(MultiGzDecoder::new(reader))))
            }
            None => Ok(reader),
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Path(path) => write!(f, "'{}'", path.display()),
            Input::Stdin => f.write_str("stdin"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CompressionMethod {
    Gzip,
}

impl CompressionMethod {
    fn detect<R>(reader: &mut R) -> io::Result<Option<Self>>
    where
        R: io::BufRead,
    {
        const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

        let src = reader.fill_buf()?;

        if let Some(buf) = src.get(..GZIP_MAGIC_NUMBER.len()) {
            if buf == GZIP_MAGIC_NUMBER {
                return Ok(Some(CompressionMethod::Gzip));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Read as _, Write as _};

    use flate2::{write::GzEncoder, Compression};

    #[test]
    fn test_detect_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"a\tb\tc\n").unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(
            CompressionMethod::detect(&mut &compressed[..]).unwrap(),
            Some(CompressionMethod::Gzip)
        );

        let mut decoded = String::new();
        MultiGzDecoder::new(&compressed[..])
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "a\tb\tc\n");
    }

    #[test]
    fn test_detect_plain() {
        assert_eq!(
            CompressionMethod::detect(&mut &b"a\tb\tc\n"[..]).unwrap(),
            None
        );
        assert_eq!(CompressionMethod::detect(&mut &b""[..]).unwrap(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Input::new_unchecked(Some(PathBuf::from("x.tsv"))).to_string(),
            "'x.tsv'"
        );
        assert_eq!(Input::new_unchecked(None).to_string(), "stdin");
    }
}
