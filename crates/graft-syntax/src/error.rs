//! Error types for parsing, template parsing and tree surgery.
//!
//! Parse failures carry a rendered code frame so callers can surface the
//! offending source without re-reading it.

use thiserror::Error;

use crate::language::SupportedLanguage;

/// Failure of a backend operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// The grammar could not be loaded into a parser.
    #[error("cannot load the {language} grammar: {message}")]
    ParserInit {
        /// Grammar that was requested.
        language: SupportedLanguage,
        /// Reason reported by Tree-sitter.
        message: String,
    },

    /// A document contains syntax errors.
    #[error("{language} source has syntax errors: {message}")]
    Parse {
        /// Grammar the document was parsed with.
        language: SupportedLanguage,
        /// First error, followed by a code frame when one could be built.
        message: String,
    },

    /// A pattern snippet parses neither as statements nor as an expression.
    #[error("invalid pattern: {message}\n{frame}")]
    PatternSyntax {
        /// First syntax error in the snippet.
        message: String,
        /// Code frame pointing at the offending line and column.
        frame: String,
    },

    /// A node was used after it was pruned from its tree.
    #[error("node `{kind}` was removed from its tree and can no longer be used")]
    Detached {
        /// Kind of the pruned node.
        kind: &'static str,
    },

    /// More than one node was spliced into a position that holds one node.
    #[error("cannot splice {count} nodes into a single-node position of `{parent}`")]
    InvalidSplice {
        /// Kind of the parent node.
        parent: &'static str,
        /// Number of nodes that were supplied.
        count: usize,
    },

    /// An invariant of the arena was broken.
    #[error("syntax tree invariant violated: {message}")]
    Internal {
        /// What was found.
        message: String,
    },
}

impl SyntaxError {
    /// Grammar loading failed.
    #[must_use]
    pub fn parser_init(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParserInit {
            language,
            message: message.into(),
        }
    }

    /// A document failed to parse.
    #[must_use]
    pub fn parse(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::Parse {
            language,
            message: message.into(),
        }
    }

    /// A pattern snippet failed to parse.
    #[must_use]
    pub fn pattern_syntax(message: impl Into<String>, frame: impl Into<String>) -> Self {
        Self::PatternSyntax {
            message: message.into(),
            frame: frame.into(),
        }
    }

    /// A pruned node of kind `kind` was used.
    #[must_use]
    pub const fn detached(kind: &'static str) -> Self {
        Self::Detached { kind }
    }

    /// `count` nodes were offered to a single-node slot of `parent`.
    #[must_use]
    pub const fn invalid_splice(parent: &'static str, count: usize) -> Self {
        Self::InvalidSplice { parent, count }
    }

    /// An arena invariant does not hold.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
