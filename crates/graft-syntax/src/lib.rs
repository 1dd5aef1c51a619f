//! Tree-sitter powered syntax backend for the graft structural search and
//! replace engine.
//!
//! This crate turns TypeScript, TSX and JavaScript sources into an owned,
//! lossless syntax arena ([`Ast`]) that the engine can both match against
//! and edit in place:
//!
//! - **Parsing** via [`Ast::parse`], which rejects sources with syntax
//!   errors and reports them with a code frame
//! - **Pattern snippets** via [`parse_pattern`], which accepts statements,
//!   expressions, and marker-extracted fragments
//! - **Generation** by printing node parts, so untouched code keeps its
//!   original formatting
//! - **Tree surgery** (replace, prune, insert) that maintains list
//!   separators such as commas and statement indentation
//! - **Literal helpers** for comparing strings, numbers and regexes by value
//!
//! The [`Backend`] trait bundles these capabilities behind the interface the
//! engine consumes; [`TreeSitterBackend`] is its implementation.
//!
//! # Example
//!
//! ```
//! use graft_syntax::{Ast, SupportedLanguage};
//!
//! let ast = Ast::parse(SupportedLanguage::Tsx, "foo(a, b);")?;
//! assert_eq!(ast.to_source(), "foo(a, b);");
//! # Ok::<(), graft_syntax::SyntaxError>(())
//! ```

mod backend;
mod error;
mod frame;
pub mod kinds;
mod language;
pub mod literal;
mod lower;
mod parser;
mod position;
mod print;
mod template;
mod tree;

pub use backend::{Backend, TreeSitterBackend};
pub use error::SyntaxError;
pub use frame::code_frame;
pub use kinds::ListStyle;
pub use language::{LanguageParseError, SupportedLanguage};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use position::{Location, offset_to_one_based};
pub use template::{PatternTree, parse_pattern};
pub use tree::{Ast, Comment, NodeId, Part};
