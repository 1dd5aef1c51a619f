//! Error types for the CLI runtime.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] graft_config::ConfigError),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: Utf8PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    WriteFile { path: Utf8PathBuf, source: io::Error },
    #[error("failed to serialise result: {0}")]
    Serialise(serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
