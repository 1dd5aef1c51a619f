use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// A configuration file is not valid JSON of the expected shape.
    #[error("invalid configuration in {path}: {source}")]
    Json {
        /// File being parsed.
        path: Utf8PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// A configuration value is out of range.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Offending key.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}
