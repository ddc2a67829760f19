// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Command line interface.

use crate::config::Config;
use crate::error::Error;
use crate::source::{inputs_or_default, InputDescriptor};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Replay OTLP/JSON telemetry files to an OTLP/gRPC receiver.
#[derive(Debug, Parser)]
#[command(name = "otlp-replay", version, about)]
pub struct Args {
    /// The address of the OTLP receiver [default: localhost:4317]
    #[arg(short = 'o', long = "output", value_name = "ADDR")]
    pub output: Option<String>,

    /// YAML configuration file; command line flags take precedence
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum size of one input line in bytes [default: 10485760]
    #[arg(long, value_name = "BYTES")]
    pub max_record_size: Option<usize>,

    /// Timeout for connecting to the receiver, e.g. "5s"
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub connect_timeout: Option<Duration>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Input files, newline-delimited OTLP/JSON, optionally .gz
    /// [default: telemetry.json]
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

impl Args {
    /// Default log filter for the verbosity level.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Resolve the configuration (defaults, then file, then flags) and the
    /// inputs to replay.
    pub fn resolve(self) -> Result<(Config, Vec<InputDescriptor>), Error> {
        let mut config = match &self.config {
            Some(path) => Config::from_yaml_file(path)?,
            None => Config::default(),
        };
        if let Some(output) = self.output {
            config.endpoint = output;
        }
        if let Some(max_record_size) = self.max_record_size {
            config.max_record_size = max_record_size;
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout = Some(timeout);
        }
        config.validate()?;

        let inputs = inputs_or_default(self.files, &config.default_input);
        Ok((config, inputs))
    }
}
