//! Structural search and replace for JavaScript and TypeScript.
//!
//! Patterns are ordinary code snippets in which identifiers starting with
//! `$` are placeholders:
//!
//! - `$name` captures any single node; repeated uses must match equivalent
//!   code
//! - `$$name` captures a run of list elements, `$$$name` the rest of a list
//! - `$_` and `$_name` match without capturing
//! - `'$name'` in a string literal captures the string's value
//! - `$Maybe($x)`, `$Or(...)` and `$And(...)` combine sub-patterns
//!
//! Matching ignores formatting and comments. Quote styles and numeric
//! spellings do not matter, and statements in a block need the same order
//! but not the same layout.
//!
//! The entry point is [`Astx`], a set of matches over a shared document.
//! Searches return new wrappers, captures are exposed as wrappers of their
//! own, and [`Astx::replace`] rewrites every match from a replacement
//! pattern in which the same placeholders stand for the captured code.
//! [`run_transform`] packages this for one file at a time.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use graft::Astx;
//! use graft_syntax::TreeSitterBackend;
//!
//! let root = Astx::parse(Rc::new(TreeSitterBackend::default()), "foo(1, 2);")?;
//! let calls = root.find("foo($$args)")?;
//! calls.replace("bar($$args)")?;
//! assert_eq!(root.source(), "bar(1, 2);");
//! # Ok::<(), graft::GraftError>(())
//! ```

mod astx;
mod bindings;
mod error;
mod find;
mod imports;
mod matcher;
mod placeholder;
mod replace;
mod replacement;
mod simple_replacements;
mod transform;

pub use astx::{Astx, Query, QueryPredicate, Replacement, ReplacementCallback};
pub use bindings::{Bindings, Match, merge_bindings};
pub use error::GraftError;
pub use find::{FindOptions, closest, destruct, find};
pub use imports::ImportReplacer;
pub use matcher::{Conditions, MatchEnv, Matcher, NodeView, Predicate};
pub use placeholder::{
    Placeholder, PlaceholderKind, classify, classify_string, escape_identifier, is_escaped,
    unescape_identifier,
};
pub use replacement::Generator;
pub use simple_replacements::SimpleReplacements;
pub use transform::{
    AbortSignal, FoundMatch, RunOptions, Transform, TransformCallback, TransformContext,
    TransformOutcome, TransformResult, run_transform,
};

#[cfg(test)]
mod tests;
