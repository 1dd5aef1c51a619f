//! Logging setup for the `graft` binary.
//!
//! Diagnostics always go to stderr: stdout carries matches and transformed
//! sources and must stay clean when piped.

use std::io::{self, IsTerminal};

use graft_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Failures while setting up logging.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The filter directive does not parse.
    #[error("invalid log filter `{filter}`: {message}")]
    Filter {
        /// Directive as configured.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// A global subscriber was registered by someone else first.
    #[error("cannot install log subscriber: {0}")]
    Install(#[from] SetGlobalDefaultError),
}

/// Installs the process-wide subscriber described by `config`.
///
/// Only the first call installs anything; the returned format is the one in
/// effect, which may differ from `config` on later calls.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a foreign
/// subscriber is already registered.
pub fn initialise(config: &Config) -> Result<LogFormat, TelemetryError> {
    INSTALLED_FORMAT
        .get_or_try_init(|| -> Result<LogFormat, TelemetryError> {
            install(config.log_filter(), config.log_format())?;
            Ok(config.log_format())
        })
        .copied()
}

fn install(filter: &str, format: LogFormat) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(filter).map_err(|error| TelemetryError::Filter {
        filter: filter.to_owned(),
        message: error.to_string(),
    })?;
    let colour = !format.is_structured() && io::stderr().is_terminal();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(colour)
        .with_timer(UtcTime::rfc_3339());

    match format {
        LogFormat::Json => set_global_default(
            builder
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .finish(),
        )?,
        LogFormat::Compact => set_global_default(builder.compact().finish())?,
    }
    Ok(())
}
