// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Configuration for a replay run.

use crate::error::Error;
use crate::scanner::DEFAULT_MAX_RECORD_SIZE;
use crate::source::DEFAULT_INPUT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default OTLP/gRPC receiver address.
pub const DEFAULT_ENDPOINT: &str = "localhost:4317";

/// Configuration for a replay run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Address of the OTLP/gRPC receiver. `http://` is assumed when no
    /// scheme is given.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Maximum size of one input line, in bytes.
    #[serde(default = "default_max_record_size")]
    pub max_record_size: usize,

    /// Input replayed when no input is named on the command line.
    #[serde(default = "default_input")]
    pub default_input: PathBuf,

    /// Timeout for establishing the connection.
    /// If not set, the transport default applies.
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub connect_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_record_size: default_max_record_size(),
            default_input: default_input(),
            connect_timeout: None,
        }
    }
}

impl Config {
    /// Load a configuration from a YAML file. Missing fields take their
    /// defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the configuration for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::Config("endpoint must not be empty".to_string()));
        }
        if self.max_record_size == 0 {
            return Err(Error::Config(
                "max_record_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Endpoint as a URI, adding the `http://` scheme when none is given.
    pub fn endpoint_uri(&self) -> String {
        let endpoint = self.endpoint.trim();
        if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("http://{endpoint}")
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_max_record_size() -> usize {
    DEFAULT_MAX_RECORD_SIZE
}

fn default_input() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT)
}
