// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::Parser;
use otlp_replay::cli::Args;
use otlp_replay::{GrpcExporter, Replayer};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init(args.log_filter())?;

    let (config, inputs) = args.resolve()?;
    let exporter = GrpcExporter::connect(&config).await?;

    let mut replayer = Replayer::new(exporter, config.max_record_size);
    let _summary = replayer.run(&inputs).await;

    Ok(())
}

/// Installs the log subscriber. `RUST_LOG` overrides the verbosity flags.
fn init(default_filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
