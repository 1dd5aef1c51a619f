//! Configuration for the graft command-line tool.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. a `graft.json` file, or the `graft` key of a `package.json`, found by
//!    searching upwards from the directory of the file being transformed
//! 3. explicit overrides, usually taken from command-line flags
//!
//! ```json
//! { "parser": "typescript", "prefer_simple_replacement": true }
//! ```

mod defaults;
mod error;
mod logging;
mod parser;

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use defaults::{
    CONFIG_FILE_NAME, DEFAULT_LOG_FILTER, PACKAGE_JSON_KEY, default_log_filter_string,
    default_log_format, default_parser,
};
pub use error::ConfigError;
pub use logging::{LogFormat, LogFormatParseError};
pub use parser::{ParserKind, ParserKindParseError};

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    log_filter: String,
    log_format: LogFormat,
    parser: ParserKind,
    prefer_simple_replacement: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            parser: default_parser(),
            prefer_simple_replacement: false,
        }
    }
}

/// Values that replace configured ones when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Log filter expression.
    pub log_filter: Option<String>,
    /// Log output format.
    pub log_format: Option<LogFormat>,
    /// Parser selection.
    pub parser: Option<ParserKind>,
    /// Whether to emit text-spliced output when possible.
    pub prefer_simple_replacement: Option<bool>,
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Parser selection.
    #[must_use]
    pub const fn parser(&self) -> ParserKind {
        self.parser
    }

    /// Whether transforms emit text-spliced output when every replacement
    /// allowed it.
    #[must_use]
    pub const fn prefer_simple_replacement(&self) -> bool {
        self.prefer_simple_replacement
    }

    /// Parses configuration from JSON text; `origin` names the source in
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON or unknown keys, and
    /// [`ConfigError::InvalidValue`] for an empty log filter.
    pub fn from_json(text: &str, origin: &Utf8Path) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: origin.to_owned(),
            source,
        })?;
        config.validate()
    }

    /// Reads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`Config::from_json`].
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = read(path)?;
        Self::from_json(&text, path)
    }

    /// Searches `start` and its ancestors for configuration.
    ///
    /// In each directory a `graft.json` wins over the `graft` key of a
    /// `package.json`. Returns the configuration and the file it came from,
    /// or `None` when nothing was found.
    ///
    /// # Errors
    ///
    /// Returns read and parse errors of the first candidate file found.
    pub fn discover(start: &Utf8Path) -> Result<Option<(Self, Utf8PathBuf)>, ConfigError> {
        for directory in start.ancestors() {
            let dedicated = directory.join(CONFIG_FILE_NAME);
            if dedicated.is_file() {
                debug!(target: "graft::config", path = %dedicated, "found configuration");
                return Self::load(&dedicated).map(|config| Some((config, dedicated)));
            }
            let package = directory.join("package.json");
            if package.is_file()
                && let Some(config) = Self::from_package_json(&package)?
            {
                debug!(target: "graft::config", path = %package, "found configuration");
                return Ok(Some((config, package)));
            }
        }
        Ok(None)
    }

    /// Reads the `graft` key of a `package.json`, if it has one.
    fn from_package_json(path: &Utf8Path) -> Result<Option<Self>, ConfigError> {
        let text = read(path)?;
        let json_error = |source| ConfigError::Json {
            path: path.to_owned(),
            source,
        };
        let mut manifest: serde_json::Value = serde_json::from_str(&text).map_err(json_error)?;
        let Some(section) = manifest
            .as_object_mut()
            .and_then(|fields| fields.remove(PACKAGE_JSON_KEY))
        else {
            return Ok(None);
        };
        let config: Self = serde_json::from_value(section).map_err(json_error)?;
        config.validate().map(Some)
    }

    /// This configuration with `overrides` applied.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(filter) = &overrides.log_filter {
            self.log_filter.clone_from(filter);
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        if let Some(parser) = overrides.parser {
            self.parser = parser;
        }
        if let Some(prefer) = overrides.prefer_simple_replacement {
            self.prefer_simple_replacement = prefer;
        }
        self
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "log_filter",
                message: "must not be empty".to_owned(),
            });
        }
        Ok(self)
    }
}

fn read(path: &Utf8Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source: io::Error| ConfigError::Io {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests;
