//! Rendering of per-file transform results.

use std::io::Write;

use graft::{FoundMatch, TransformResult};
use serde::Serialize;

use crate::errors::AppError;

/// JSON form of one file's result.
#[derive(Debug, Serialize)]
pub(crate) struct FileReport<'a> {
    file: &'a str,
    matches: Vec<MatchReport<'a>>,
    changed: bool,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    reports: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct MatchReport<'a> {
    line: Option<u32>,
    column: Option<u32>,
    code: &'a str,
    captures: &'a std::collections::BTreeMap<String, String>,
}

impl<'a> From<&'a FoundMatch> for MatchReport<'a> {
    fn from(found: &'a FoundMatch) -> Self {
        Self {
            line: found.location.as_ref().map(|location| location.start_line),
            column: found.location.as_ref().map(|location| location.start_column),
            code: &found.code,
            captures: &found.captures,
        }
    }
}

impl<'a> From<&'a TransformResult> for FileReport<'a> {
    fn from(result: &'a TransformResult) -> Self {
        Self {
            file: result.file.as_str(),
            matches: result.matches.iter().map(MatchReport::from).collect(),
            changed: result.transformed.is_some(),
            reports: &result.reports,
            error: result.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Writes `result` as a single JSON line.
pub(crate) fn write_json(out: &mut impl Write, result: &TransformResult) -> Result<(), AppError> {
    let line = serde_json::to_string(&FileReport::from(result)).map_err(AppError::Serialise)?;
    writeln!(out, "{line}")?;
    Ok(())
}

/// Writes `result` for a terminal reader.
///
/// Matches are listed as `file:line:column: code`; transformed sources are
/// printed in full under a `==> file <==` header unless `written`.
pub(crate) fn write_human(
    out: &mut impl Write,
    result: &TransformResult,
    written: bool,
) -> Result<(), AppError> {
    for report in &result.reports {
        writeln!(out, "{}: {report}", result.file)?;
    }
    match (&result.transformed, written) {
        (Some(_), true) => writeln!(out, "updated {}", result.file)?,
        (Some(source), false) => {
            writeln!(out, "==> {} <==", result.file)?;
            write!(out, "{source}")?;
            if !source.ends_with('\n') {
                writeln!(out)?;
            }
        }
        (None, _) => {
            for found in &result.matches {
                let position = found.location.as_ref().map_or_else(String::new, |location| {
                    format!(":{}:{}", location.start_line, location.start_column)
                });
                let first_line = found.code.lines().next().unwrap_or_default();
                writeln!(out, "{}{position}: {first_line}", result.file)?;
            }
        }
    }
    Ok(())
}
