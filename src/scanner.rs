// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Newline-delimited record scanner.
//!
//! [`LineScanner`] yields one record (line) at a time out of a single owned
//! buffer. The buffer grows to the longest record seen, never past the
//! configured maximum, and is handed from one input to the next with
//! [`LineScanner::into_buffer`] and [`LineScanner::with_buffer`].

use crate::error::ScanError;
use std::io::{BufRead, ErrorKind};

/// Default maximum record size (10 MiB).
pub const DEFAULT_MAX_RECORD_SIZE: usize = 10 * 1024 * 1024;

/// Line scanner over a buffered byte stream.
pub struct LineScanner<R> {
    reader: R,
    buffer: Vec<u8>,
    max_record_size: usize,
    records_read: u64,
    done: bool,
}

impl<R: BufRead> LineScanner<R> {
    /// Create a scanner with a fresh buffer.
    pub fn new(reader: R, max_record_size: usize) -> Self {
        Self::with_buffer(reader, max_record_size, Vec::new())
    }

    /// Create a scanner reusing the allocation of `buffer`.
    pub fn with_buffer(reader: R, max_record_size: usize, mut buffer: Vec<u8>) -> Self {
        buffer.clear();
        Self {
            reader,
            buffer,
            max_record_size,
            records_read: 0,
            done: false,
        }
    }

    /// Number of records yielded so far. After a record is returned this is
    /// its 1-based line number.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Release the reader and return the buffer for reuse.
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at end of stream. The trailing `\n` and a `\r`
    /// before it are not part of the record. A final line without a
    /// delimiter is a record if it is not empty. Errors are fatal: once one
    /// is returned every later call returns `Ok(None)`.
    pub fn next_record(&mut self) -> Result<Option<&[u8]>, ScanError> {
        if self.done {
            return Ok(None);
        }
        self.buffer.clear();

        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Err(ScanError::Io(e));
                }
            };

            if available.is_empty() {
                self.done = true;
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                break;
            }

            let newline = available.iter().position(|&b| b == b'\n');
            let chunk = match newline {
                Some(pos) => &available[..pos],
                None => available,
            };
            if self.buffer.len() + chunk.len() > self.max_record_size {
                self.done = true;
                return Err(ScanError::RecordTooLong {
                    limit: self.max_record_size,
                });
            }
            self.buffer.extend_from_slice(chunk);

            match newline {
                Some(pos) => {
                    self.reader.consume(pos + 1);
                    break;
                }
                None => {
                    let consumed = chunk.len();
                    self.reader.consume(consumed);
                }
            }
        }

        if self.buffer.last() == Some(&b'\r') {
            let _ = self.buffer.pop();
        }
        self.records_read += 1;
        Ok(Some(self.buffer.as_slice()))
    }
}
