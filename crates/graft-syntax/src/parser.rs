//! Thin wrapper over the Tree-sitter parser.
//!
//! Tree-sitter always produces a tree, marking unparseable input with
//! `ERROR` and zero-width `MISSING` nodes. Callers in this crate reject any
//! source with such nodes, so the wrapper reports them in source order with
//! one-based positions.

use std::ops::Range;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::position::point_to_one_based;

/// Longest token text quoted in an error message.
const TOKEN_PREVIEW_CHARS: usize = 24;

/// A parsed source together with its tree.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
    language: SupportedLanguage,
}

impl ParseResult {
    /// Source text that was parsed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Grammar flavour used.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Root of the Tree-sitter tree.
    #[must_use]
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Whether the tree contains error or missing nodes.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// The earliest syntax error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<SyntaxErrorInfo> {
        self.errors().into_iter().next()
    }

    /// Every syntax error in source order.
    ///
    /// Errors nested inside an `ERROR` node are folded into it.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        let mut pending = vec![self.tree.root_node()];
        while let Some(node) = pending.pop() {
            if node.is_error() || node.is_missing() {
                errors.push(SyntaxErrorInfo::from_node(node, &self.source));
                continue;
            }
            if !node.has_error() {
                continue;
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            pending.extend(children.into_iter().rev());
        }
        errors
    }
}

/// A syntax error located in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the offending node; empty for missing tokens.
    pub byte_range: Range<usize>,
    /// One-based line where the error starts.
    pub line: u32,
    /// One-based column where the error starts.
    pub column: u32,
    /// Description naming the missing or unexpected token.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let byte_range = node.byte_range();
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            source
                .get(byte_range.clone())
                .and_then(|text| text.split_whitespace().next())
                .map_or_else(
                    || "unexpected end of input".to_owned(),
                    |token| format!("unexpected `{}`", preview(token)),
                )
        };
        let (line, column) = point_to_one_based(node.start_position());
        Self {
            byte_range,
            line,
            column,
            message,
        }
    }
}

fn preview(token: &str) -> String {
    if token.chars().count() <= TOKEN_PREVIEW_CHARS {
        return token.to_owned();
    }
    let head: String = token.chars().take(TOKEN_PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Tree-sitter parser configured for one grammar flavour.
pub struct Parser {
    inner: tree_sitter::Parser,
    language: SupportedLanguage,
}

impl Parser {
    /// Creates a parser for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::ParserInit`] when the grammar is
    /// incompatible with the linked Tree-sitter runtime.
    pub fn new(language: SupportedLanguage) -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.tree_sitter_language())
            .map_err(|err| SyntaxError::parser_init(language, err.to_string()))?;
        Ok(Self { inner, language })
    }

    /// Grammar flavour this parser uses.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Parses `source`. Syntax errors are part of the result, not a
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Parse`] if Tree-sitter gives up without
    /// a tree.
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse(self.language, "parser produced no tree"))?;
        Ok(ParseResult {
            tree,
            source: source.to_owned(),
            language: self.language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(language: SupportedLanguage, source: &str) -> ParseResult {
        Parser::new(language)
            .and_then(|mut parser| parser.parse(source))
            .unwrap_or_else(|err| panic!("{err}"))
    }

    #[rstest]
    #[case(SupportedLanguage::TypeScript, "function hello(): string { return 'hi'; }")]
    #[case(SupportedLanguage::TypeScript, "const n = <number>value;")]
    #[case(SupportedLanguage::Tsx, "const el = <div className=\"a\">{x}</div>;")]
    #[case(SupportedLanguage::Tsx, "import x, { y } from 'y'")]
    fn valid_sources_have_no_errors(#[case] language: SupportedLanguage, #[case] source: &str) {
        let result = parse(language, source);
        assert!(!result.has_errors());
        assert!(result.first_error().is_none());
        assert_eq!(result.language(), language);
    }

    #[rstest]
    #[case(SupportedLanguage::TypeScript, "function broken( {")]
    #[case(SupportedLanguage::Tsx, "const = ;")]
    #[case(SupportedLanguage::Tsx, "<div>")]
    fn invalid_sources_report_errors(#[case] language: SupportedLanguage, #[case] source: &str) {
        let result = parse(language, source);
        assert!(result.has_errors());
        assert!(!result.errors().is_empty());
    }

    #[test]
    fn errors_are_located_one_based() {
        let result = parse(SupportedLanguage::Tsx, "function test() {\n    let x = \n}");
        let error = result
            .first_error()
            .unwrap_or_else(|| panic!("expected an error"));
        assert!(error.line >= 1);
        assert!(error.column >= 1);
        assert!(!error.message.is_empty());
    }

    #[test]
    fn long_tokens_are_shortened() {
        let token = "x".repeat(40);
        assert_eq!(preview(&token).chars().count(), TOKEN_PREVIEW_CHARS + 3);
        assert_eq!(preview("ok"), "ok");
    }
}
