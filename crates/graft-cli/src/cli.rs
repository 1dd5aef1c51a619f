//! CLI argument definitions for graft.

use camino::Utf8PathBuf;
use clap::Parser;
use graft_config::{ConfigOverrides, LogFormat, ParserKind};

/// Structural search and replace for JavaScript and TypeScript.
#[derive(Parser, Debug)]
#[command(name = "graft", version)]
pub(crate) struct Cli {
    /// Pattern to search for.
    #[arg(short, long, value_name = "PATTERN")]
    pub(crate) find: String,
    /// Replacement for every match; without one matches are only listed.
    #[arg(short, long, value_name = "PATTERN")]
    pub(crate) replace: Option<String>,
    /// Writes transformed files in place instead of printing them.
    #[arg(short, long, requires = "replace")]
    pub(crate) write: bool,
    /// Emits one JSON object per file.
    #[arg(long)]
    pub(crate) json: bool,
    /// Reads configuration from this file instead of searching for one.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<Utf8PathBuf>,
    /// Grammar used to parse files.
    #[arg(long, value_name = "PARSER")]
    pub(crate) parser: Option<ParserKind>,
    /// Keeps untouched text byte for byte when every replacement allows it.
    #[arg(long)]
    pub(crate) prefer_simple_replacement: bool,
    /// Tracing filter expression.
    #[arg(long, value_name = "FILTER")]
    pub(crate) log_filter: Option<String>,
    /// Log output format.
    #[arg(long, value_name = "FORMAT")]
    pub(crate) log_format: Option<LogFormat>,
    /// Files to transform.
    #[arg(value_name = "FILE", required = true)]
    pub(crate) files: Vec<Utf8PathBuf>,
}

impl Cli {
    /// Configuration values given on the command line.
    pub(crate) fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            log_filter: self.log_filter.clone(),
            log_format: self.log_format,
            parser: self.parser,
            prefer_simple_replacement: self.prefer_simple_replacement.then_some(true),
        }
    }
}
