// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Input sources.
//!
//! An [`InputDescriptor`] names one input file. Opening it yields a buffered
//! byte stream that is transparently gzip-decompressed when the file name
//! ends in `.gz`. The stream owns the file handle and the decoder, so both are
//! released as soon as the caller drops it at the end of that input.

use crate::error::OpenError;
use flate2::bufread::MultiGzDecoder;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Input name used when no input is given on the command line.
pub const DEFAULT_INPUT: &str = "telemetry.json";

/// File name suffix of gzip-compressed inputs.
pub const GZIP_SUFFIX: &str = ".gz";

/// Buffered, possibly decompressing, byte stream of one input.
pub type SourceReader = Box<dyn BufRead + Send>;

/// Compression applied to an input, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Plain text
    None,
    /// Gzip (.gz)
    Gzip,
}

impl Compression {
    /// Detect compression from the file name suffix.
    pub fn from_path(path: &Path) -> Self {
        let is_gzip = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(GZIP_SUFFIX));
        if is_gzip {
            Compression::Gzip
        } else {
            Compression::None
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
        }
    }
}

/// One input to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    path: PathBuf,
    compression: Compression,
}

impl InputDescriptor {
    /// Describe the input at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let compression = Compression::from_path(&path);
        Self { path, compression }
    }

    /// Input path as given.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compression derived from the path.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Whether the input is decompressed before line splitting.
    pub fn is_compressed(&self) -> bool {
        self.compression != Compression::None
    }

    /// Open the input for reading.
    ///
    /// For gzip inputs the header is checked here, so an input that is not
    /// actually gzip fails with [`OpenError::Decompress`] instead of being read
    /// as raw text.
    pub fn open(&self) -> Result<SourceReader, OpenError> {
        let file = File::open(&self.path).map_err(|source| OpenError::Io {
            path: self.path.clone(),
            source,
        })?;

        match self.compression {
            Compression::None => Ok(Box::new(BufReader::new(file))),
            Compression::Gzip => {
                let decoder = MultiGzDecoder::new(BufReader::new(file));
                let mut reader = BufReader::new(decoder);
                // The first fill parses the gzip header.
                let _ = reader.fill_buf().map_err(|source| OpenError::Decompress {
                    path: self.path.clone(),
                    source,
                })?;
                Ok(Box::new(reader))
            }
        }
    }
}

/// Map command line arguments to inputs, falling back to `default_input`
/// when none were given.
pub fn inputs_or_default(paths: Vec<PathBuf>, default_input: &Path) -> Vec<InputDescriptor> {
    if paths.is_empty() {
        vec![InputDescriptor::new(default_input)]
    } else {
        paths.into_iter().map(InputDescriptor::new).collect()
    }
}
