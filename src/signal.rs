// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Signal classification and decoding.
//!
//! A record is decoded as an OTLP/JSON export request of each signal kind in
//! turn (traces, then metrics, then logs). The first kind whose decoded
//! request contains at least one element wins. Decode errors are not
//! reported: a record that yields no populated request of any kind is
//! [`Classification::Unparseable`].
//!
//! No discriminating field is inspected. An OTLP/JSON envelope of one kind
//! decodes as an *empty* request of the other kinds, because unknown fields
//! are ignored, and the non-empty rule together with the fixed order is what
//! tells them apart.

use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::metrics::v1::metric::Data;
use opentelemetry_proto::tonic::metrics::v1::Metric;
use prost::Message;
use std::fmt;

/// OpenTelemetry signal kinds, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// OpenTelemetry traces signal
    Traces,
    /// OpenTelemetry metrics signal
    Metrics,
    /// OpenTelemetry logs signal
    Logs,
}

impl SignalKind {
    /// Order in which a record is tried against each kind.
    pub const PRIORITY: [SignalKind; 3] =
        [SignalKind::Traces, SignalKind::Metrics, SignalKind::Logs];

    /// Lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Traces => "traces",
            SignalKind::Metrics => "metrics",
            SignalKind::Logs => "logs",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded export request of one signal kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalBatch {
    /// Trace export request
    Traces(ExportTraceServiceRequest),
    /// Metrics export request
    Metrics(ExportMetricsServiceRequest),
    /// Logs export request
    Logs(ExportLogsServiceRequest),
}

impl SignalBatch {
    /// Kind of the batch.
    pub fn kind(&self) -> SignalKind {
        match self {
            SignalBatch::Traces(_) => SignalKind::Traces,
            SignalBatch::Metrics(_) => SignalKind::Metrics,
            SignalBatch::Logs(_) => SignalKind::Logs,
        }
    }

    /// Number of elements: spans, metric data points or log records.
    /// A batch is only forwarded when this is non-zero.
    pub fn item_count(&self) -> usize {
        match self {
            SignalBatch::Traces(request) => request
                .resource_spans
                .iter()
                .flat_map(|rs| &rs.scope_spans)
                .map(|ss| ss.spans.len())
                .sum(),
            SignalBatch::Metrics(_) => self.data_point_count(),
            SignalBatch::Logs(request) => request
                .resource_logs
                .iter()
                .flat_map(|rl| &rl.scope_logs)
                .map(|sl| sl.log_records.len())
                .sum(),
        }
    }

    /// Number of metrics, with or without data points. Zero for traces and
    /// logs.
    pub fn metric_count(&self) -> usize {
        match self {
            SignalBatch::Metrics(request) => request
                .resource_metrics
                .iter()
                .flat_map(|rm| &rm.scope_metrics)
                .map(|sm| sm.metrics.len())
                .sum(),
            SignalBatch::Traces(_) | SignalBatch::Logs(_) => 0,
        }
    }

    /// Number of metric data points. Zero for traces and logs.
    pub fn data_point_count(&self) -> usize {
        match self {
            SignalBatch::Metrics(request) => request
                .resource_metrics
                .iter()
                .flat_map(|rm| &rm.scope_metrics)
                .flat_map(|sm| &sm.metrics)
                .map(metric_data_points)
                .sum(),
            SignalBatch::Traces(_) | SignalBatch::Logs(_) => 0,
        }
    }

    /// Size of the request in the protobuf wire encoding.
    pub fn encoded_len(&self) -> usize {
        match self {
            SignalBatch::Traces(request) => request.encoded_len(),
            SignalBatch::Metrics(request) => request.encoded_len(),
            SignalBatch::Logs(request) => request.encoded_len(),
        }
    }
}

fn metric_data_points(metric: &Metric) -> usize {
    match &metric.data {
        Some(Data::Gauge(gauge)) => gauge.data_points.len(),
        Some(Data::Sum(sum)) => sum.data_points.len(),
        Some(Data::Histogram(histogram)) => histogram.data_points.len(),
        Some(Data::ExponentialHistogram(histogram)) => histogram.data_points.len(),
        Some(Data::Summary(summary)) => summary.data_points.len(),
        None => 0,
    }
}

/// Outcome of classifying one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The record decoded into a non-empty batch
    Signal(SignalBatch),
    /// No kind produced a non-empty batch
    Unparseable,
}

/// Decode `record` as an export request of `kind`.
///
/// Returns `None` when decoding fails or when the request has no spans,
/// metric data points or log records. Metrics without data points do not
/// count.
pub fn decode(kind: SignalKind, record: &[u8]) -> Option<SignalBatch> {
    let batch = match kind {
        SignalKind::Traces => SignalBatch::Traces(serde_json::from_slice(record).ok()?),
        SignalKind::Metrics => SignalBatch::Metrics(serde_json::from_slice(record).ok()?),
        SignalKind::Logs => SignalBatch::Logs(serde_json::from_slice(record).ok()?),
    };
    (batch.item_count() > 0).then_some(batch)
}

/// Classify a record, trying each kind in [`SignalKind::PRIORITY`] order.
pub fn classify(record: &[u8]) -> Classification {
    SignalKind::PRIORITY
        .iter()
        .find_map(|&kind| decode(kind, record))
        .map_or(Classification::Unparseable, Classification::Signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry_proto::tonic::metrics::v1::{
        Gauge, NumberDataPoint, ResourceMetrics, ScopeMetrics, Sum,
    };

    const TRACE: &str = r#"{"resourceSpans":[{"scopeSpans":[{"scope":{"name":"replay-test"},"spans":[{"traceId":"5b8efff798038103d269b633813fc60c","spanId":"eee19b7ec3c1b174","name":"GET /cart","startTimeUnixNano":"1544712660000000000","endTimeUnixNano":"1544712661000000000"},{"traceId":"5b8efff798038103d269b633813fc60c","spanId":"eee19b7ec3c1b175","name":"SELECT cart","startTimeUnixNano":"1544712660100000000","endTimeUnixNano":"1544712660900000000"}]}]}]}"#;

    const METRIC: &str = r#"{"resourceMetrics":[{"scopeMetrics":[{"scope":{"name":"replay-test"},"metrics":[{"name":"requests","unit":"1","description":"served requests","gauge":{"dataPoints":[{"timeUnixNano":"1544712660300000000","asDouble":12.5},{"timeUnixNano":"1544712661300000000","asDouble":14.0}]}}]}]}]}"#;

    const LOG: &str = r#"{"resourceLogs":[{"scopeLogs":[{"scope":{"name":"replay-test"},"logRecords":[{"timeUnixNano":"1544712660300000000","severityText":"INFO"}]}]}]}"#;

    fn kind_of(record: &str) -> Option<SignalKind> {
        match classify(record.as_bytes()) {
            Classification::Signal(batch) => Some(batch.kind()),
            Classification::Unparseable => None,
        }
    }

    #[test]
    fn test_single_kind_records() {
        assert_eq!(kind_of(TRACE), Some(SignalKind::Traces));
        assert_eq!(kind_of(METRIC), Some(SignalKind::Metrics));
        assert_eq!(kind_of(LOG), Some(SignalKind::Logs));
    }

    #[test]
    fn test_item_counts() {
        let Classification::Signal(batch) = classify(TRACE.as_bytes()) else {
            panic!("trace record must classify");
        };
        assert_eq!(batch.item_count(), 2);
        assert_eq!(batch.data_point_count(), 0);
        assert!(batch.encoded_len() > 0);

        let Classification::Signal(batch) = classify(METRIC.as_bytes()) else {
            panic!("metric record must classify");
        };
        assert_eq!(batch.item_count(), 2);
        assert_eq!(batch.metric_count(), 1);

        let Classification::Signal(batch) = classify(LOG.as_bytes()) else {
            panic!("log record must classify");
        };
        assert_eq!(batch.item_count(), 1);
        assert_eq!(batch.metric_count(), 0);
    }

    #[test]
    fn test_metrics_without_data_points_are_unparseable() {
        for record in [
            r#"{"resourceMetrics":[{"scopeMetrics":[{"metrics":[{"name":"requests"}]}]}]}"#,
            r#"{"resourceMetrics":[{"scopeMetrics":[{"metrics":[{"name":"requests","gauge":{"dataPoints":[]}}]}]}]}"#,
        ] {
            assert!(decode(SignalKind::Metrics, record.as_bytes()).is_none());
            assert_eq!(kind_of(record), None, "record {record:?}");
        }
    }

    #[test]
    fn test_empty_envelopes_are_unparseable() {
        for record in [
            "",
            "   ",
            "not json",
            "{}",
            "[]",
            r#"{"resourceSpans":[]}"#,
            r#"{"resourceSpans":[{"scopeSpans":[{"spans":[]}]}]}"#,
            r#"{"resourceMetrics":[{"scopeMetrics":[{"metrics":[]}]}]}"#,
            r#"{"resourceLogs":[{"scopeLogs":[]}]}"#,
            r#"{"resourceSpans":[],"resourceMetrics":[],"resourceLogs":[]}"#,
        ] {
            assert_eq!(kind_of(record), None, "record {record:?}");
        }
    }

    #[test]
    fn test_decode_rejects_other_kinds() {
        assert!(decode(SignalKind::Metrics, TRACE.as_bytes()).is_none());
        assert!(decode(SignalKind::Logs, TRACE.as_bytes()).is_none());
        assert!(decode(SignalKind::Traces, LOG.as_bytes()).is_none());
        assert!(decode(SignalKind::Logs, LOG.as_bytes()).is_some());
    }

    #[test]
    fn test_priority_traces_over_logs() {
        let spans = &TRACE[1..TRACE.len() - 1];
        let logs = &LOG[1..LOG.len() - 1];
        let record = format!("{{{logs},{spans}}}");
        assert_eq!(kind_of(&record), Some(SignalKind::Traces));
    }

    #[test]
    fn test_priority_traces_over_metrics() {
        let spans = &TRACE[1..TRACE.len() - 1];
        let metrics = &METRIC[1..METRIC.len() - 1];
        let record = format!("{{{metrics},{spans}}}");
        assert_eq!(kind_of(&record), Some(SignalKind::Traces));
        assert!(decode(SignalKind::Metrics, record.as_bytes()).is_some());
    }

    #[test]
    fn test_priority_metrics_over_logs() {
        let metrics = &METRIC[1..METRIC.len() - 1];
        let logs = &LOG[1..LOG.len() - 1];
        let record = format!("{{{logs},{metrics}}}");
        assert_eq!(kind_of(&record), Some(SignalKind::Metrics));
    }

    #[test]
    fn test_priority_with_empty_higher_kind() {
        // Traces present but empty: falls through to logs.
        let logs = &LOG[1..LOG.len() - 1];
        let record = format!(r#"{{"resourceSpans":[{{"scopeSpans":[]}}],{logs}}}"#);
        assert_eq!(kind_of(&record), Some(SignalKind::Logs));
    }

    #[test]
    fn test_data_point_count() {
        let point = NumberDataPoint::default();
        let request = ExportMetricsServiceRequest {
            resource_metrics: vec![ResourceMetrics {
                scope_metrics: vec![ScopeMetrics {
                    metrics: vec![
                        Metric {
                            name: "temperature".into(),
                            data: Some(Data::Gauge(Gauge {
                                data_points: vec![point.clone(), point.clone(), point.clone()],
                                ..Default::default()
                            })),
                            ..Default::default()
                        },
                        Metric {
                            name: "requests".into(),
                            data: Some(Data::Sum(Sum {
                                data_points: vec![point],
                                ..Default::default()
                            })),
                            ..Default::default()
                        },
                        Metric {
                            name: "no_data".into(),
                            ..Default::default()
                        },
                    ],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        };
        let batch = SignalBatch::Metrics(request);
        assert_eq!(batch.metric_count(), 3);
        assert_eq!(batch.data_point_count(), 4);
        assert_eq!(batch.item_count(), 4);
    }

    #[test]
    fn test_kind_display() {
        let names: Vec<String> = SignalKind::PRIORITY.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["traces", "metrics", "logs"]);
    }
}
