//! Command-line runtime for graft.
//!
//! Each file named on the command line is transformed independently: a
//! file that fails to read or parse is reported on stderr and the run
//! carries on, exiting with a failure status at the end.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::process::ExitCode;

use camino::Utf8Path;
use clap::Parser;
use graft::{FindOptions, RunOptions, Transform, TransformResult, run_transform};
use graft_config::{Config, ConfigOverrides, ParserKind};
use graft_syntax::SupportedLanguage;
use tracing::{debug, info};

mod cli;
mod errors;
mod output;
pub mod telemetry;

use cli::Cli;
use errors::AppError;

/// Configuration source chosen on the command line.
struct ConfigSource {
    explicit: Option<Config>,
    overrides: ConfigOverrides,
}

impl ConfigSource {
    fn new(cli: &Cli) -> Result<Self, AppError> {
        let explicit = cli.config.as_deref().map(Config::load).transpose()?;
        Ok(Self {
            explicit,
            overrides: cli.overrides(),
        })
    }

    /// Configuration in effect for files under `directory`.
    fn resolve(&self, directory: &Utf8Path) -> Result<Config, AppError> {
        if let Some(config) = &self.explicit {
            return Ok(config.clone().with_overrides(&self.overrides));
        }
        let discovered = Config::discover(directory)?
            .map(|(config, _)| config)
            .unwrap_or_default();
        Ok(discovered.with_overrides(&self.overrides))
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };
    match execute(&cli, stdout, stderr) {
        Ok(code) => code,
        Err(error) => {
            writeln!(stderr, "graft: {error}").ok();
            ExitCode::FAILURE
        }
    }
}

fn report_usage(error: &clap::Error, stdout: &mut impl Write, stderr: &mut impl Write) -> ExitCode {
    let rendered = error.render();
    if error.use_stderr() {
        write!(stderr, "{rendered}").ok();
        return ExitCode::from(2);
    }
    write!(stdout, "{rendered}").ok();
    ExitCode::SUCCESS
}

fn execute(cli: &Cli, stdout: &mut impl Write, stderr: &mut impl Write) -> Result<ExitCode, AppError> {
    let source = ConfigSource::new(cli)?;
    let base = source.resolve(Utf8Path::new("."))?;
    let log_format = telemetry::initialise(&base)?;
    debug!(target: "graft::cli", %log_format, files = cli.files.len(), "starting run");

    let transform = Transform::FindReplace {
        find: cli.find.clone(),
        replace: cli.replace.clone(),
        options: FindOptions::new(),
    };
    let mut failed = false;
    for file in &cli.files {
        let outcome = process_file(cli, &source, &transform, file);
        let result = match outcome {
            Ok(result) => result,
            Err(error) => {
                writeln!(stderr, "graft: {error}")?;
                failed = true;
                continue;
            }
        };
        if let Some(error) = &result.error {
            writeln!(stderr, "graft: {}: {error}", result.file)?;
            failed = true;
        }
        if cli.json {
            output::write_json(stdout, &result)?;
        } else {
            output::write_human(stdout, &result, cli.write)?;
        }
    }
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn process_file(
    cli: &Cli,
    source: &ConfigSource,
    transform: &Transform,
    file: &Utf8Path,
) -> Result<TransformResult, AppError> {
    let directory = file.parent().filter(|dir| !dir.as_str().is_empty());
    let config = source.resolve(directory.unwrap_or(Utf8Path::new(".")))?;
    let text = fs::read_to_string(file).map_err(|source_error| AppError::ReadFile {
        path: file.to_owned(),
        source: source_error,
    })?;
    let mut options = RunOptions::new(file, text);
    options.language = language_for(config.parser(), file);
    options.prefer_simple_replacement = config.prefer_simple_replacement();
    debug!(target: "graft::cli", file = %file, language = %options.language, "transforming");

    let result = run_transform(transform, options);
    if cli.write
        && let Some(transformed) = &result.transformed
    {
        fs::write(file, transformed).map_err(|source_error| AppError::WriteFile {
            path: file.to_owned(),
            source: source_error,
        })?;
        info!(target: "graft::cli", file = %file, "wrote transformed file");
    }
    Ok(result)
}

fn language_for(parser: ParserKind, file: &Utf8Path) -> SupportedLanguage {
    match parser {
        ParserKind::Typescript => SupportedLanguage::TypeScript,
        ParserKind::Tsx => SupportedLanguage::Tsx,
        ParserKind::Auto => file
            .extension()
            .and_then(SupportedLanguage::from_extension)
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests;
