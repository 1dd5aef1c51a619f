//! The parser/generator interface the engine is written against.

use crate::error::SyntaxError;
use crate::kinds;
use crate::language::SupportedLanguage;
use crate::position::Location;
use crate::template::{PatternTree, parse_pattern};
use crate::tree::{Ast, Comment, NodeId};

/// Parses documents and patterns, generates code and classifies node kinds.
///
/// The matching and replacement engine only talks to syntax through this
/// trait.
pub trait Backend {
    /// Grammar flavour this backend parses.
    fn language(&self) -> SupportedLanguage;

    /// Parses a complete document.
    ///
    /// # Errors
    ///
    /// Returns an error when the source does not parse cleanly.
    fn parse(&self, source: &str) -> Result<Ast, SyntaxError>;

    /// Parses a pattern snippet.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::PatternSyntax`] for unparsable snippets.
    fn parse_pattern(&self, source: &str) -> Result<PatternTree, SyntaxError>;

    /// Generates source text for a node, comments included.
    fn generate(&self, ast: &Ast, node: NodeId) -> String {
        ast.text_with_comments(node)
    }

    /// Location of a node in the source it was parsed from.
    fn location(&self, ast: &Ast, node: NodeId) -> Option<Location> {
        ast.location(node)
    }

    /// Leading followed by trailing comments of a node.
    fn comments<'a>(&self, ast: &'a Ast, node: NodeId) -> Vec<&'a Comment> {
        ast.leading_comments(node)
            .iter()
            .chain(ast.trailing_comments(node))
            .collect()
    }

    /// Returns whether nodes of `kind` are statements.
    fn is_statement(&self, kind: &str) -> bool;

    /// Returns whether nodes of `kind` are expressions.
    fn is_expression(&self, kind: &str) -> bool;
}

/// [`Backend`] built on the Tree-sitter TypeScript grammars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeSitterBackend {
    language: SupportedLanguage,
}

impl TreeSitterBackend {
    /// Creates a backend for the given grammar flavour.
    #[must_use]
    pub const fn new(language: SupportedLanguage) -> Self {
        Self { language }
    }
}

impl Backend for TreeSitterBackend {
    fn language(&self) -> SupportedLanguage {
        self.language
    }

    fn parse(&self, source: &str) -> Result<Ast, SyntaxError> {
        Ast::parse(self.language, source)
    }

    fn parse_pattern(&self, source: &str) -> Result<PatternTree, SyntaxError> {
        parse_pattern(self.language, source)
    }

    fn is_statement(&self, kind: &str) -> bool {
        kinds::is_statement(kind)
    }

    fn is_expression(&self, kind: &str) -> bool {
        kinds::is_expression(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_includes_comments() {
        let backend = TreeSitterBackend::default();
        let ast = backend
            .parse("// lead\nfoo();")
            .unwrap_or_else(|err| panic!("{err}"));
        let statement = ast.children(ast.root()).first().copied();
        let node = statement.unwrap_or_else(|| panic!("no statement"));
        assert_eq!(backend.generate(&ast, node), "// lead\nfoo();");
        assert_eq!(backend.comments(&ast, node).len(), 1);
        assert!(backend.is_statement(ast.kind(node)));
    }

    #[test]
    fn locations_are_one_based() {
        let backend = TreeSitterBackend::new(SupportedLanguage::TypeScript);
        let ast = backend
            .parse("let a;\nfoo(a);")
            .unwrap_or_else(|err| panic!("{err}"));
        let statement = ast.children(ast.root()).get(1).copied();
        let node = statement.unwrap_or_else(|| panic!("no statement"));
        let location = backend
            .location(&ast, node)
            .unwrap_or_else(|| panic!("no location"));
        assert_eq!((location.start_line, location.start_column), (2, 1));
    }
}
