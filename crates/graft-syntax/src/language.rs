//! Grammar flavours of the TypeScript family.
//!
//! Both flavours produce the same node vocabulary, so nothing past the
//! parser needs to know which one was used. They differ in how `<` after an
//! expression start is read: as a type assertion in TypeScript, as a JSX
//! element in TSX.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Grammar a document is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupportedLanguage {
    /// TypeScript without JSX.
    TypeScript,
    /// TypeScript with JSX. Plain JavaScript parses with it too.
    #[default]
    Tsx,
}

const EXTENSIONS: &[(&str, SupportedLanguage)] = &[
    ("ts", SupportedLanguage::TypeScript),
    ("mts", SupportedLanguage::TypeScript),
    ("cts", SupportedLanguage::TypeScript),
    ("tsx", SupportedLanguage::Tsx),
    ("js", SupportedLanguage::Tsx),
    ("jsx", SupportedLanguage::Tsx),
    ("mjs", SupportedLanguage::Tsx),
    ("cjs", SupportedLanguage::Tsx),
];

const NAMES: &[(&str, SupportedLanguage)] = &[
    ("typescript", SupportedLanguage::TypeScript),
    ("ts", SupportedLanguage::TypeScript),
    ("tsx", SupportedLanguage::Tsx),
    ("javascript", SupportedLanguage::Tsx),
    ("js", SupportedLanguage::Tsx),
    ("jsx", SupportedLanguage::Tsx),
];

fn lookup(table: &[(&str, SupportedLanguage)], key: &str) -> Option<SupportedLanguage> {
    table
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
        .map(|(_, language)| *language)
}

impl SupportedLanguage {
    /// Grammar for files with extension `ext` (without the dot).
    ///
    /// ```
    /// use graft_syntax::SupportedLanguage;
    ///
    /// assert_eq!(
    ///     SupportedLanguage::from_extension("mts"),
    ///     Some(SupportedLanguage::TypeScript)
    /// );
    /// assert_eq!(SupportedLanguage::from_extension("css"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        lookup(EXTENSIONS, ext)
    }

    /// File extensions parsed with this grammar.
    pub fn extensions(self) -> impl Iterator<Item = &'static str> {
        EXTENSIONS
            .iter()
            .filter(move |(_, language)| *language == self)
            .map(|(ext, _)| *ext)
    }

    /// Grammar handle for the Tree-sitter parser.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        let grammar = match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT,
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX,
        };
        grammar.into()
    }

    /// Canonical lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A language name that is not recognised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown language `{name}`, expected typescript or tsx")]
pub struct LanguageParseError {
    name: String,
}

impl LanguageParseError {
    /// The rejected name, trimmed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for SupportedLanguage {
    type Err = LanguageParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let name = input.trim();
        lookup(NAMES, name).ok_or_else(|| LanguageParseError {
            name: name.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cts", Some(SupportedLanguage::TypeScript))]
    #[case("TS", Some(SupportedLanguage::TypeScript))]
    #[case("mjs", Some(SupportedLanguage::Tsx))]
    #[case("jsx", Some(SupportedLanguage::Tsx))]
    #[case("vue", None)]
    #[case("", None)]
    fn extensions_select_grammars(#[case] ext: &str, #[case] expected: Option<SupportedLanguage>) {
        assert_eq!(SupportedLanguage::from_extension(ext), expected);
    }

    #[test]
    fn every_extension_maps_back_to_its_grammar() {
        for language in [SupportedLanguage::TypeScript, SupportedLanguage::Tsx] {
            for ext in language.extensions() {
                assert_eq!(SupportedLanguage::from_extension(ext), Some(language));
            }
        }
        assert_eq!(
            SupportedLanguage::TypeScript.extensions().collect::<Vec<_>>(),
            ["ts", "mts", "cts"]
        );
    }

    #[rstest]
    #[case(" JavaScript ", SupportedLanguage::Tsx)]
    #[case("ts", SupportedLanguage::TypeScript)]
    fn names_parse(#[case] input: &str, #[case] expected: SupportedLanguage) {
        assert_eq!(input.parse::<SupportedLanguage>(), Ok(expected));
    }

    #[test]
    fn unknown_names_are_reported_trimmed() {
        let err = " python "
            .parse::<SupportedLanguage>()
            .err()
            .unwrap_or_else(|| panic!("python should not parse"));
        assert_eq!(err.name(), "python");
        assert_eq!(
            err.to_string(),
            "unknown language `python`, expected typescript or tsx"
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for language in [SupportedLanguage::TypeScript, SupportedLanguage::Tsx] {
            assert_eq!(language.to_string().parse::<SupportedLanguage>(), Ok(language));
        }
    }
}
