use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Grammar used to parse source files.
///
/// `Auto` picks the grammar from each file's extension.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ParserKind {
    /// Choose per file: `.ts`, `.mts` and `.cts` use TypeScript, anything
    /// else TSX.
    #[default]
    Auto,
    /// TypeScript without JSX.
    #[strum(to_string = "typescript", serialize = "ts")]
    #[serde(alias = "ts")]
    Typescript,
    /// TypeScript with JSX; also accepts plain JavaScript.
    #[strum(to_string = "tsx", serialize = "js", serialize = "jsx")]
    #[serde(alias = "js", alias = "jsx")]
    Tsx,
}

/// Errors encountered while parsing a [`ParserKind`] from text.
pub type ParserKindParseError = strum::ParseError;
