// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Replay controller.
//!
//! Drives every input through open, line scanning, classification and
//! export, one record at a time. Failures stay in the smallest scope they
//! belong to: an unparseable line or a failed export affects only that line,
//! an open or scanner failure affects only that input.

use crate::error::{OpenError, ScanError};
use crate::exporter::SignalExporter;
use crate::scanner::LineScanner;
use crate::signal::{classify, Classification, SignalKind};
use crate::source::InputDescriptor;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Batches successfully sent for one input, per signal kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalCounts {
    /// Trace export requests sent
    pub traces: u64,
    /// Metrics export requests sent
    pub metrics: u64,
    /// Logs export requests sent
    pub logs: u64,
}

impl SignalCounts {
    /// Count one successful export of `kind`.
    pub fn record(&mut self, kind: SignalKind) {
        match kind {
            SignalKind::Traces => self.traces += 1,
            SignalKind::Metrics => self.metrics += 1,
            SignalKind::Logs => self.logs += 1,
        }
    }
}

/// Terminal state of one input.
#[derive(Debug)]
pub enum InputState {
    /// Every record was read
    Finished,
    /// The input could not be opened; nothing was read
    OpenFailed(OpenError),
    /// The scanner failed; records after the failure were abandoned
    Aborted(ScanError),
}

/// What happened to one input.
#[derive(Debug)]
pub struct InputReport {
    /// Input path
    pub path: PathBuf,
    /// How processing ended
    pub state: InputState,
    /// Successful exports
    pub counts: SignalCounts,
    /// Records that classified as no signal kind
    pub unparseable: u64,
    /// Records whose export call failed
    pub export_failures: u64,
}

impl InputReport {
    fn new(input: &InputDescriptor) -> Self {
        Self {
            path: input.path().to_path_buf(),
            state: InputState::Finished,
            counts: SignalCounts::default(),
            unparseable: 0,
            export_failures: 0,
        }
    }

    /// Whether all records of the input were read.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, InputState::Finished)
    }
}

/// Reports for every input of a run, in input order.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Per-input reports
    pub inputs: Vec<InputReport>,
}

impl RunSummary {
    /// Number of inputs read to the end.
    pub fn finished_inputs(&self) -> usize {
        self.inputs.iter().filter(|r| r.is_finished()).count()
    }
}

/// Replays inputs to a [`SignalExporter`].
pub struct Replayer<E> {
    exporter: E,
    max_record_size: usize,
    /// Scanner buffer, carried from one input to the next.
    buffer: Vec<u8>,
}

impl<E: SignalExporter> Replayer<E> {
    /// Create a replayer exporting through `exporter`.
    pub fn new(exporter: E, max_record_size: usize) -> Self {
        Self {
            exporter,
            max_record_size,
            buffer: Vec::new(),
        }
    }

    /// Replay all inputs in order, then log the completion marker.
    pub async fn run(&mut self, inputs: &[InputDescriptor]) -> RunSummary {
        let mut summary = RunSummary::default();
        for input in inputs {
            summary.inputs.push(self.replay_input(input).await);
        }
        info!(
            inputs = summary.inputs.len(),
            finished = summary.finished_inputs(),
            "Done"
        );
        summary
    }

    /// Replay one input.
    pub async fn replay_input(&mut self, input: &InputDescriptor) -> InputReport {
        let mut report = InputReport::new(input);
        let file = input.path().display().to_string();

        let reader = match input.open() {
            Ok(reader) => reader,
            Err(err) => {
                error!(file = %file, error = %err, "Failed to open file");
                report.state = InputState::OpenFailed(err);
                return report;
            }
        };
        debug!(file = %file, compression = %input.compression(), "Replaying input");

        let mut scanner = LineScanner::with_buffer(
            reader,
            self.max_record_size,
            std::mem::take(&mut self.buffer),
        );

        loop {
            let line = scanner.records_read() + 1;
            let classification = match scanner.next_record() {
                Ok(Some(record)) => classify(record),
                Ok(None) => break,
                Err(err) => {
                    error!(
                        file = %file,
                        line,
                        error = %err,
                        "Failed to read input"
                    );
                    report.state = InputState::Aborted(err);
                    break;
                }
            };

            let batch = match classification {
                Classification::Signal(batch) => batch,
                Classification::Unparseable => {
                    info!(file = %file, line, "Failed to parse");
                    report.unparseable += 1;
                    continue;
                }
            };

            let kind = batch.kind();
            debug!(
                file = %file,
                line,
                kind = %kind,
                items = batch.item_count(),
                metrics = batch.metric_count(),
                bytes = batch.encoded_len(),
                "Exporting"
            );
            match self.exporter.export(batch).await {
                Ok(()) => report.counts.record(kind),
                Err(err) => {
                    error!(file = %file, line, kind = %kind, error = %err, "Failed to send");
                    report.export_failures += 1;
                }
            }
        }

        // Drops the reader, closing the file before the next input.
        self.buffer = scanner.into_buffer();

        info!(
            file = %file,
            traces = report.counts.traces,
            metrics = report.counts.metrics,
            logs = report.counts.logs,
            "Finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::signal::SignalBatch;
    use async_trait::async_trait;

    const TRACE: &str = r#"{"resourceSpans":[{"scopeSpans":[{"scope":{"name":"t"},"spans":[{"traceId":"5b8efff798038103d269b633813fc60c","spanId":"eee19b7ec3c1b174","name":"op","startTimeUnixNano":"1544712660000000000","endTimeUnixNano":"1544712661000000000"}]}]}]}"#;
    const LOG: &str = r#"{"resourceLogs":[{"scopeLogs":[{"scope":{"name":"t"},"logRecords":[{"timeUnixNano":"1544712660300000000","severityText":"INFO"}]}]}]}"#;

    #[derive(Default)]
    struct Recording {
        sent: Vec<SignalKind>,
    }

    #[async_trait]
    impl SignalExporter for Recording {
        async fn export(&mut self, batch: SignalBatch) -> Result<(), ExportError> {
            self.sent.push(batch.kind());
            Ok(())
        }
    }

    #[test]
    fn test_signal_counts() {
        let mut counts = SignalCounts::default();
        counts.record(SignalKind::Logs);
        counts.record(SignalKind::Logs);
        counts.record(SignalKind::Traces);
        assert_eq!(
            counts,
            SignalCounts {
                traces: 1,
                metrics: 0,
                logs: 2
            }
        );
    }

    #[tokio::test]
    async fn test_replay_input_counts_and_buffer_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.json");
        std::fs::write(&path, format!("{TRACE}\n\n{LOG}\n{LOG}")).unwrap();

        let mut replayer = Replayer::new(Recording::default(), 1024);
        let report = replayer.replay_input(&InputDescriptor::new(&path)).await;

        assert!(report.is_finished());
        assert_eq!(
            report.counts,
            SignalCounts {
                traces: 1,
                metrics: 0,
                logs: 2
            }
        );
        assert_eq!(report.unparseable, 1);
        assert_eq!(
            replayer.exporter.sent,
            vec![SignalKind::Traces, SignalKind::Logs, SignalKind::Logs]
        );
        assert!(replayer.buffer.capacity() >= TRACE.len());
    }

    #[tokio::test]
    async fn test_open_failure_reports_no_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut replayer = Replayer::new(Recording::default(), 1024);
        let report = replayer
            .replay_input(&InputDescriptor::new(dir.path().join("absent.json")))
            .await;

        assert!(matches!(report.state, InputState::OpenFailed(_)));
        assert_eq!(report.counts, SignalCounts::default());
        assert!(replayer.exporter.sent.is_empty());
    }
}
