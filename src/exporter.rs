// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Export dispatch.
//!
//! [`SignalExporter`] is the seam between the replay controller and the
//! outbound protocol. [`GrpcExporter`] implements it with the OTLP/gRPC
//! clients, all three sharing one channel for the whole run. Each call is a
//! single unary export; there is no batching and no retry.

use crate::config::Config;
use crate::error::{Error, ExportError};
use crate::signal::{SignalBatch, SignalKind};
use async_trait::async_trait;
use opentelemetry_proto::tonic::collector::logs::v1::logs_service_client::LogsServiceClient;
use opentelemetry_proto::tonic::collector::metrics::v1::metrics_service_client::MetricsServiceClient;
use opentelemetry_proto::tonic::collector::trace::v1::trace_service_client::TraceServiceClient;
use tonic::transport::{Channel, Endpoint};

/// Sends one decoded batch to the remote endpoint.
#[async_trait]
pub trait SignalExporter {
    /// Export `batch` with the call matching its kind.
    async fn export(&mut self, batch: SignalBatch) -> Result<(), ExportError>;
}

/// OTLP/gRPC exporter over a single shared channel.
#[derive(Debug, Clone)]
pub struct GrpcExporter {
    traces: TraceServiceClient<Channel>,
    metrics: MetricsServiceClient<Channel>,
    logs: LogsServiceClient<Channel>,
}

impl GrpcExporter {
    /// Connect to the configured endpoint.
    ///
    /// The connection is plaintext and unauthenticated. Failure here is fatal
    /// for the run: no record could ever be forwarded.
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let uri = config.endpoint_uri();
        let mut endpoint =
            Endpoint::from_shared(uri).map_err(|source| Error::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        if let Some(timeout) = config.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }

        let channel = endpoint.connect().await.map_err(|source| Error::Connect {
            endpoint: config.endpoint.clone(),
            source,
        })?;
        tracing::debug!(endpoint = %config.endpoint, "Connected to OTLP receiver");
        Ok(Self::from_channel(channel))
    }

    /// Build the three signal clients over an existing channel.
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            traces: TraceServiceClient::new(channel.clone()),
            metrics: MetricsServiceClient::new(channel.clone()),
            logs: LogsServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl SignalExporter for GrpcExporter {
    async fn export(&mut self, batch: SignalBatch) -> Result<(), ExportError> {
        let kind = batch.kind();
        let rpc_error = |status| ExportError::Rpc { kind, status };

        // The receiver may accept a request while rejecting some of its
        // items; that is still a successful export.
        let rejected = match batch {
            SignalBatch::Traces(request) => self
                .traces
                .export(request)
                .await
                .map_err(rpc_error)?
                .into_inner()
                .partial_success
                .map(|p| (p.rejected_spans, p.error_message)),
            SignalBatch::Metrics(request) => self
                .metrics
                .export(request)
                .await
                .map_err(rpc_error)?
                .into_inner()
                .partial_success
                .map(|p| (p.rejected_data_points, p.error_message)),
            SignalBatch::Logs(request) => self
                .logs
                .export(request)
                .await
                .map_err(rpc_error)?
                .into_inner()
                .partial_success
                .map(|p| (p.rejected_log_records, p.error_message)),
        };

        if let Some((count, message)) = rejected {
            if count > 0 || !message.is_empty() {
                log_partial_success(kind, count, &message);
            }
        }
        Ok(())
    }
}

fn log_partial_success(kind: SignalKind, rejected: i64, message: &str) {
    tracing::warn!(
        kind = %kind,
        rejected,
        error_message = message,
        "Receiver partially rejected export"
    );
}
