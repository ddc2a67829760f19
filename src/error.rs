// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the replay pipeline.
//!
//! Every error below except [`Error`] is scoped to a single input or a single
//! record: the replay controller logs it and moves on. [`Error`] covers setup
//! failures (configuration, endpoint, connection) that end the process.

use crate::signal::SignalKind;
use std::path::PathBuf;
use thiserror::Error;

/// Setup errors. These are the only errors that terminate a run.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    ConfigRead {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`crate::config::Config`]
    #[error("Failed to parse configuration file {path}: {source}")]
    ConfigParse {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying YAML error
        source: serde_yaml::Error,
    },

    /// The endpoint address is not a valid URI
    #[error("Invalid endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        /// Endpoint as given
        endpoint: String,
        /// Transport error
        source: tonic::transport::Error,
    },

    /// The outbound connection could not be established
    #[error("Failed to connect to {endpoint}: {source}")]
    Connect {
        /// Endpoint as given
        endpoint: String,
        /// Transport error
        source: tonic::transport::Error,
    },
}

/// Failure to open an input. The whole input is skipped.
#[derive(Error, Debug)]
pub enum OpenError {
    /// Missing file, permission denied, or any other open failure
    #[error("Failed to open {path}: {source}")]
    Io {
        /// Input path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The gzip header is invalid
    #[error("Failed to open gzip stream {path}: {source}")]
    Decompress {
        /// Input path
        path: PathBuf,
        /// Underlying decoder error
        source: std::io::Error,
    },
}

/// Fatal line scanner error. The remaining records of the input are abandoned.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A record is longer than the configured maximum
    #[error("Record exceeds the maximum size of {limit} bytes")]
    RecordTooLong {
        /// Configured maximum record size
        limit: usize,
    },

    /// The underlying stream failed (including corrupt compressed data)
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single export call failed. The record is not counted.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The receiver (or the transport) returned an error status
    #[error("Failed to send {kind}: {status}")]
    Rpc {
        /// Signal kind of the rejected batch
        kind: SignalKind,
        /// gRPC status
        status: tonic::Status,
    },
}

impl ExportError {
    /// Signal kind of the failed export.
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::Rpc { kind, .. } => *kind,
        }
    }
}

/// Result type for setup operations
pub type Result<T> = std::result::Result<T, Error>;
