// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Replays recorded OpenTelemetry telemetry to an OTLP/gRPC receiver.
//!
//! Inputs are newline-delimited OTLP/JSON files, optionally gzip-compressed.
//! Each line is classified as traces, metrics or logs, decoded into the
//! matching export request and sent with the matching export call:
//!
//! ```text
//! InputDescriptor ──open──▶ LineScanner ──record──▶ classify ──batch──▶ SignalExporter
//! ```
//!
//! One record is in flight at a time, inputs are replayed in order, and a bad
//! line, a failed export or an unreadable input never stops the run.

pub mod cli;
pub mod config;
pub mod error;
pub mod exporter;
pub mod replay;
pub mod scanner;
pub mod signal;
pub mod source;

pub use config::Config;
pub use error::{Error, ExportError, OpenError, ScanError};
pub use exporter::{GrpcExporter, SignalExporter};
pub use replay::{InputReport, InputState, Replayer, RunSummary, SignalCounts};
pub use scanner::{LineScanner, DEFAULT_MAX_RECORD_SIZE};
pub use signal::{classify, Classification, SignalBatch, SignalKind};
pub use source::{Compression, InputDescriptor};
