//! Search drivers: `find`, `closest` and `destruct`.
//!
//! The drivers never mutate the document. They differ only in which nodes
//! they offer to the matcher:
//!
//! - `find` tries every node below the roots, roots included, in pre-order.
//!   Matches nested inside other matches are reported too. A pattern with
//!   several roots is tried against runs of consecutive siblings instead.
//! - `closest` walks up from each start node and reports the first ancestor
//!   that matches, once even when several starts lead to it.
//! - `destruct` tries exactly the given nodes.

use std::collections::HashSet;
use std::fmt;

use graft_syntax::{Ast, ListStyle, NodeId};
use tracing::debug;

use crate::bindings::{Bindings, Match};
use crate::error::GraftError;
use crate::matcher::{Conditions, MatchEnv, Matcher, NodeView, significant_children};

/// Options accepted by `find` and `destruct`.
#[derive(Clone, Default)]
pub struct FindOptions {
    conditions: Conditions,
}

impl FindOptions {
    /// Creates options without conditions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires every node bound to `placeholder` to satisfy `condition`.
    ///
    /// For array placeholders each captured node is checked.
    #[must_use]
    pub fn where_capture(
        mut self,
        placeholder: impl Into<String>,
        condition: impl Fn(NodeView<'_>) -> bool + 'static,
    ) -> Self {
        self.conditions
            .insert(placeholder.into(), std::rc::Rc::new(condition));
        self
    }

    /// Conditions keyed by placeholder.
    #[must_use]
    pub const fn conditions(&self) -> &Conditions {
        &self.conditions
    }
}

impl fmt::Debug for FindOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindOptions")
            .field("conditions", &self.conditions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Finds every match of `matcher` at or below `roots`.
///
/// # Errors
///
/// Propagates pattern position errors raised while matching.
pub fn find(
    ast: &Ast,
    roots: &[NodeId],
    matcher: &Matcher,
    options: &FindOptions,
    initial: &Bindings,
) -> Result<Vec<Match>, GraftError> {
    let env = MatchEnv::new(ast, options.conditions());
    let mut visited = HashSet::new();
    let mut matches = Vec::new();
    for root in roots {
        for node in ast.descendants(*root) {
            if !visited.insert(node) {
                continue;
            }
            if matcher.root_count() == 1 {
                if let Some(bindings) = matcher.match_node(&env, node, initial.clone())? {
                    matches.push(Match::new(vec![node], bindings));
                }
            } else {
                find_runs(&env, node, matcher, initial, &mut matches)?;
            }
        }
    }
    debug!(target: "graft::find", matches = matches.len(), "find complete");
    Ok(matches)
}

/// Tries a multi-root pattern against runs of children of `parent`, taking
/// the shortest run at each start and resuming after it.
fn find_runs(
    env: &MatchEnv<'_>,
    parent: NodeId,
    matcher: &Matcher,
    initial: &Bindings,
    matches: &mut Vec<Match>,
) -> Result<(), GraftError> {
    let ast = env.ast();
    if ast.list_style(parent) == ListStyle::Single {
        return Ok(());
    }
    let children: Vec<NodeId> = significant_children(ast, parent)
        .into_iter()
        .map(|(_, child)| child)
        .collect();
    let mut start = 0;
    'starts: while start < children.len() {
        for end in start.saturating_add(1)..=children.len() {
            let Some(run) = children.get(start..end) else {
                break;
            };
            if let Some(bindings) = matcher.match_nodes(env, run, initial.clone())? {
                matches.push(Match::new(run.to_vec(), bindings));
                start = end;
                continue 'starts;
            }
        }
        start = start.saturating_add(1);
    }
    Ok(())
}

/// Finds, for each start node, the nearest strict ancestor that matches.
///
/// # Errors
///
/// Propagates pattern position errors raised while matching.
pub fn closest(
    ast: &Ast,
    starts: &[NodeId],
    matcher: &Matcher,
    options: &FindOptions,
    initial: &Bindings,
) -> Result<Vec<Match>, GraftError> {
    let env = MatchEnv::new(ast, options.conditions());
    let mut found = HashSet::new();
    let mut matches = Vec::new();
    for start in starts {
        for ancestor in ast.ancestors(*start) {
            let Some(bindings) = matcher.match_node(&env, ancestor, initial.clone())? else {
                continue;
            };
            if found.insert(ancestor) {
                matches.push(Match::new(vec![ancestor], bindings));
            }
            break;
        }
    }
    debug!(target: "graft::find", matches = matches.len(), "closest complete");
    Ok(matches)
}

/// Matches the given nodes themselves.
///
/// A single-root pattern is tried against each node; a multi-root pattern
/// is matched against the whole sequence.
///
/// # Errors
///
/// Propagates pattern position errors raised while matching.
pub fn destruct(
    ast: &Ast,
    paths: &[NodeId],
    matcher: &Matcher,
    options: &FindOptions,
    initial: &Bindings,
) -> Result<Vec<Match>, GraftError> {
    let env = MatchEnv::new(ast, options.conditions());
    if matcher.root_count() != 1 {
        let found = matcher.match_nodes(&env, paths, initial.clone())?;
        return Ok(found
            .map(|bindings| vec![Match::new(paths.to_vec(), bindings)])
            .unwrap_or_default());
    }
    let mut matches = Vec::new();
    for path in paths {
        if let Some(bindings) = matcher.match_node(&env, *path, initial.clone())? {
            matches.push(Match::new(vec![*path], bindings));
        }
    }
    Ok(matches)
}
