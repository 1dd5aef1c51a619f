//! Error types for matching, replacement and transforms.

use graft_syntax::SyntaxError;
use thiserror::Error;

/// Errors raised by the engine.
///
/// A pattern that does not match is never an error; matchers report it as
/// `None`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraftError {
    /// A parse, pattern syntax or tree surgery error from the backend.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A placeholder or replacement node sits where the grammar cannot hold
    /// it.
    #[error("{message}")]
    PatternPosition {
        /// Description of the offending position.
        message: String,
    },

    /// An import pattern does not have the shape an import helper requires.
    #[error("{message}")]
    ImportShape {
        /// Description of the expected shape.
        message: String,
    },

    /// A single-match accessor was used on a wrapper without matches.
    #[error("{operation} requires a match, but there are none")]
    MissingMatch {
        /// The accessor that was called.
        operation: &'static str,
    },

    /// The wrapper's capture is not a string capture.
    #[error("{placeholder} is not a string capture")]
    NotAStringCapture {
        /// Placeholder the wrapper is scoped to.
        placeholder: String,
    },

    /// An error raised while applying a pattern, annotated with the role of
    /// that pattern and its source text.
    #[error("invalid {role}: {error}\n\n{pattern}")]
    Framed {
        /// Role of the pattern, such as `find pattern`.
        role: &'static str,
        /// Source text of the pattern.
        pattern: String,
        /// The underlying error.
        #[source]
        error: Box<GraftError>,
    },

    /// A transform was cancelled through its abort signal.
    #[error("transform aborted")]
    Aborted,

    /// A transform callback reported a failure.
    #[error("{message}")]
    Transform {
        /// Message supplied by the callback.
        message: String,
    },
}

impl GraftError {
    /// Creates a new `PatternPosition` error.
    #[must_use]
    pub fn pattern_position(message: impl Into<String>) -> Self {
        Self::PatternPosition {
            message: message.into(),
        }
    }

    /// Creates a new `ImportShape` error.
    #[must_use]
    pub fn import_shape(message: impl Into<String>) -> Self {
        Self::ImportShape {
            message: message.into(),
        }
    }

    /// Creates a new `MissingMatch` error.
    #[must_use]
    pub const fn missing_match(operation: &'static str) -> Self {
        Self::MissingMatch { operation }
    }

    /// Creates a new `Transform` error.
    #[must_use]
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }

    /// Annotates an error with the role and source of the pattern being
    /// applied.
    ///
    /// Errors that already carry a frame are returned unchanged so nested
    /// operations report the innermost pattern.
    #[must_use]
    pub fn framed(self, role: &'static str, pattern: &str) -> Self {
        match self {
            Self::Framed { .. } | Self::Aborted | Self::Transform { .. } => self,
            other => Self::Framed {
                role,
                pattern: pattern.to_owned(),
                error: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, looking through frames.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Framed { error, .. } => error.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_keeps_the_innermost_pattern() {
        let error = GraftError::pattern_position("bad")
            .framed("replace pattern", "$$a")
            .framed("find pattern", "$a");
        let GraftError::Framed { role, pattern, .. } = &error else {
            panic!("expected a framed error");
        };
        assert_eq!((*role, pattern.as_str()), ("replace pattern", "$$a"));
        assert!(matches!(
            error.root_cause(),
            GraftError::PatternPosition { .. }
        ));
    }

    #[test]
    fn framed_errors_show_role_and_source() {
        let error = GraftError::pattern_position("oops").framed("find pattern", "foo($$a)");
        assert_eq!(error.to_string(), "invalid find pattern: oops\n\nfoo($$a)");
    }
}
