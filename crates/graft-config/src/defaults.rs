use crate::logging::LogFormat;
use crate::parser::ParserKind;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// File name searched for when discovering configuration.
pub const CONFIG_FILE_NAME: &str = "graft.json";

/// Key holding configuration inside `package.json`.
pub const PACKAGE_JSON_KEY: &str = "graft";

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default parser selection.
#[must_use]
pub const fn default_parser() -> ParserKind {
    ParserKind::Auto
}
