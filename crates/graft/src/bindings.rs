//! Captured values and match records.

use std::collections::BTreeMap;

use graft_syntax::NodeId;

use crate::placeholder::{Placeholder, PlaceholderKind};

/// Values bound to named placeholders during a match.
///
/// Keys are the full placeholder text, sigils included (`$a`, `$$a`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    captures: BTreeMap<String, NodeId>,
    array_captures: BTreeMap<String, Vec<NodeId>>,
    string_captures: BTreeMap<String, String>,
}

impl Bindings {
    /// Creates an empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node bound to a single-node placeholder.
    #[must_use]
    pub fn capture(&self, key: &str) -> Option<NodeId> {
        self.captures.get(key).copied()
    }

    /// Nodes bound to an array or rest placeholder.
    #[must_use]
    pub fn array_capture(&self, key: &str) -> Option<&[NodeId]> {
        self.array_captures.get(key).map(Vec::as_slice)
    }

    /// Content bound to a string placeholder.
    #[must_use]
    pub fn string_capture(&self, key: &str) -> Option<&str> {
        self.string_captures.get(key).map(String::as_str)
    }

    /// All single-node captures.
    #[must_use]
    pub const fn captures(&self) -> &BTreeMap<String, NodeId> {
        &self.captures
    }

    /// All array and rest captures.
    #[must_use]
    pub const fn array_captures(&self) -> &BTreeMap<String, Vec<NodeId>> {
        &self.array_captures
    }

    /// All string captures.
    #[must_use]
    pub const fn string_captures(&self) -> &BTreeMap<String, String> {
        &self.string_captures
    }

    /// Returns whether nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty() && self.array_captures.is_empty() && self.string_captures.is_empty()
    }

    /// Every bound key, without duplicates.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .captures
            .keys()
            .chain(self.array_captures.keys())
            .chain(self.string_captures.keys())
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Overlays `other` onto these bindings; its values win on conflicts.
    pub fn extend(&mut self, other: &Self) {
        self.captures
            .extend(other.captures.iter().map(|(key, node)| (key.clone(), *node)));
        self.array_captures.extend(
            other
                .array_captures
                .iter()
                .map(|(key, nodes)| (key.clone(), nodes.clone())),
        );
        self.string_captures.extend(
            other
                .string_captures
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
    }

    pub(crate) fn insert_capture(&mut self, key: &str, node: NodeId) {
        self.captures.insert(key.to_owned(), node);
    }

    pub(crate) fn insert_array_capture(&mut self, key: &str, nodes: Vec<NodeId>) {
        self.array_captures.insert(key.to_owned(), nodes);
    }

    pub(crate) fn insert_string_capture(&mut self, key: &str, value: impl Into<String>) {
        self.string_captures.insert(key.to_owned(), value.into());
    }

    /// Returns whether the placeholder's bare name is already bound with a
    /// different arity.
    pub(crate) fn conflicts_with(&self, placeholder: &Placeholder) -> bool {
        let Some(name) = placeholder.name() else {
            return false;
        };
        [
            PlaceholderKind::Node,
            PlaceholderKind::Array,
            PlaceholderKind::Rest,
        ]
        .into_iter()
        .filter(|kind| *kind != placeholder.kind())
        .any(|kind| {
            let key = format!("{}{name}", "$".repeat(kind.sigils()));
            self.captures.contains_key(&key) || self.array_captures.contains_key(&key)
        })
    }
}

/// One successful application of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    paths: Vec<NodeId>,
    bindings: Bindings,
}

impl Match {
    /// Creates a match over the given paths.
    #[must_use]
    pub const fn new(paths: Vec<NodeId>, bindings: Bindings) -> Self {
        Self { paths, bindings }
    }

    /// First matched node, if any.
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        self.paths.first().copied()
    }

    /// Every matched node in source order.
    #[must_use]
    pub fn paths(&self) -> &[NodeId] {
        &self.paths
    }

    /// Captures bound by the match.
    #[must_use]
    pub const fn bindings(&self) -> &Bindings {
        &self.bindings
    }
}

/// Merges the bindings of several matches, later ones winning.
#[must_use]
pub fn merge_bindings<'a>(matches: impl IntoIterator<Item = &'a Match>) -> Bindings {
    let mut merged = Bindings::new();
    for each in matches {
        merged.extend(each.bindings());
    }
    merged
}
