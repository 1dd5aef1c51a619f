//! Owned, lossless syntax arena.
//!
//! An [`Ast`] owns every node of one parsed document. Nodes are addressed by
//! copyable [`NodeId`] handles and store their content as an ordered list of
//! [`Part`]s: tokens, the whitespace between them, and child nodes. Printing
//! concatenates the parts, so an unmodified tree reproduces its source byte
//! for byte and edits only disturb the text they touch.
//!
//! Mutation keeps node identity stable: replacing a node moves the new
//! content into the old slot, so every handle that pointed at the replaced
//! position sees the replacement. Handles into pruned subtrees are detached
//! and refuse further mutation.

use std::collections::HashMap;
use std::ops::Range;

use crate::error::SyntaxError;
use crate::kinds::{ListStyle, list_style_of_kind};
use crate::language::SupportedLanguage;
use crate::position::Location;
use crate::print::Printer;

/// Handle to a node inside an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the arena index of the node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One piece of a node's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Literal token text such as a keyword, operator or bracket.
    Token(String),
    /// Whitespace, or a comment that could not be attached to a node.
    Trivia(String),
    /// A named child node.
    Child {
        /// Grammar field the child occupies, if any.
        field: Option<&'static str>,
        /// The child node.
        node: NodeId,
    },
}

/// A comment attached to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    text: String,
    gap: String,
}

impl Comment {
    /// Creates a comment from its source text and the whitespace separating
    /// it from the node it is attached to.
    #[must_use]
    pub fn new(text: impl Into<String>, gap: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            gap: gap.into(),
        }
    }

    /// Source text of the comment, delimiters included.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whitespace between the comment and its node.
    #[must_use]
    pub fn gap(&self) -> &str {
        &self.gap
    }

    /// Returns whether this is a `//` comment.
    #[must_use]
    pub fn is_line(&self) -> bool {
        self.text.starts_with("//")
    }

    /// Returns the comment body without delimiters.
    #[must_use]
    pub fn value(&self) -> &str {
        if let Some(body) = self.text.strip_prefix("//") {
            return body;
        }
        self.text
            .strip_prefix("/*")
            .and_then(|body| body.strip_suffix("*/"))
            .unwrap_or(&self.text)
    }

    /// Returns whether this is the empty block comment `/**/`.
    #[must_use]
    pub fn is_empty_block(&self) -> bool {
        self.text == "/**/"
    }

    /// Copy of the comment for attachment to another node.
    ///
    /// Line comments lose trailing whitespace, and the gap is normalised to
    /// a newline after line comments and a space otherwise.
    #[must_use]
    pub fn transferred(&self) -> Self {
        if self.is_line() {
            Self::new(self.text.trim_end(), "\n")
        } else {
            let gap = if self.gap.contains('\n') { "\n" } else { " " };
            Self::new(self.text.clone(), gap)
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: &'static str,
    pub(crate) parts: Vec<Part>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) leading: Vec<Comment>,
    pub(crate) trailing: Vec<Comment>,
    pub(crate) span: Option<Range<usize>>,
    pub(crate) detached: bool,
}

impl NodeData {
    pub(crate) const fn new(kind: &'static str, span: Option<Range<usize>>) -> Self {
        Self {
            kind,
            parts: Vec::new(),
            parent: None,
            leading: Vec::new(),
            trailing: Vec::new(),
            span,
            detached: false,
        }
    }

    fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.parts.iter().filter_map(|part| match part {
            Part::Child { node, .. } => Some(*node),
            Part::Token(_) | Part::Trivia(_) => None,
        })
    }
}

/// A parsed document, or a parsed pattern snippet.
#[derive(Debug, Clone)]
pub struct Ast {
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: NodeId,
    pub(crate) source: String,
    pub(crate) prefix: String,
    pub(crate) suffix: String,
    pub(crate) language: SupportedLanguage,
}

impl Ast {
    pub(crate) fn empty(language: SupportedLanguage, source: &str) -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId(0),
            source: source.to_owned(),
            prefix: String::new(),
            suffix: String::new(),
            language,
        }
    }

    /// Parses `source` into an arena.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Parse`] with a code frame when the source
    /// contains syntax errors.
    pub fn parse(language: SupportedLanguage, source: &str) -> Result<Self, SyntaxError> {
        crate::lower::parse_document(language, source)
    }

    /// Root node of the document.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Source text the arena was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Grammar flavour the arena was parsed with.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Number of nodes ever allocated, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0)
    }

    pub(crate) fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        id
    }

    // ---- reading -------------------------------------------------------

    /// Kind tag of a node, or `""` for an unknown handle.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &'static str {
        self.data(id).map_or("", |data| data.kind)
    }

    /// Content parts of a node.
    #[must_use]
    pub fn parts(&self, id: NodeId) -> &[Part] {
        self.data(id).map_or(&[], |data| data.parts.as_slice())
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).and_then(|data| data.parent)
    }

    /// Grammar field through which the parent reaches this node.
    #[must_use]
    pub fn field(&self, id: NodeId) -> Option<&'static str> {
        let parent = self.parent(id)?;
        self.parts(parent).iter().find_map(|part| match part {
            Part::Child { field, node } if *node == id => *field,
            _ => None,
        })
    }

    /// Original byte range of a node; `None` for generated nodes.
    #[must_use]
    pub fn span(&self, id: NodeId) -> Option<Range<usize>> {
        self.data(id).and_then(|data| data.span.clone())
    }

    /// Returns whether the node, or one of its ancestors, has been removed
    /// from the tree.
    #[must_use]
    pub fn is_detached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            let Some(data) = self.data(node) else {
                return true;
            };
            if data.detached {
                return true;
            }
            current = data.parent;
        }
        false
    }

    /// Named children in source order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.data(id)
            .map(|data| data.child_ids().collect())
            .unwrap_or_default()
    }

    /// Named children with the fields they occupy.
    #[must_use]
    pub fn fields(&self, id: NodeId) -> Vec<(Option<&'static str>, NodeId)> {
        self.parts(id)
            .iter()
            .filter_map(|part| match part {
                Part::Child { field, node } => Some((*field, *node)),
                Part::Token(_) | Part::Trivia(_) => None,
            })
            .collect()
    }

    /// First child in the named field.
    #[must_use]
    pub fn child_by_field(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.parts(id).iter().find_map(|part| match part {
            Part::Child { field, node } if *field == Some(name) => Some(*node),
            _ => None,
        })
    }

    /// Anonymous tokens directly inside a node.
    #[must_use]
    pub fn tokens(&self, id: NodeId) -> Vec<&str> {
        self.parts(id)
            .iter()
            .filter_map(|part| match part {
                Part::Token(text) => Some(text.as_str()),
                Part::Trivia(_) | Part::Child { .. } => None,
            })
            .collect()
    }

    /// Returns whether the node directly holds the given token.
    #[must_use]
    pub fn has_token(&self, id: NodeId, token: &str) -> bool {
        self.tokens(id).contains(&token)
    }

    /// Returns whether the node has no child nodes.
    #[must_use]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.data(id)
            .is_some_and(|data| data.child_ids().next().is_none())
    }

    /// Text of a leaf made of a single token.
    #[must_use]
    pub fn leaf_text(&self, id: NodeId) -> Option<&str> {
        match self.parts(id) {
            [Part::Token(text)] => Some(text),
            _ => None,
        }
    }

    /// Comments printed before the node.
    #[must_use]
    pub fn leading_comments(&self, id: NodeId) -> &[Comment] {
        self.data(id).map_or(&[], |data| data.leading.as_slice())
    }

    /// Comments printed after the node.
    #[must_use]
    pub fn trailing_comments(&self, id: NodeId) -> &[Comment] {
        self.data(id).map_or(&[], |data| data.trailing.as_slice())
    }

    /// The node and all of its descendants in pre-order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            let mut children = self.children(node);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Strict ancestors, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// Source text of a node, without its own comments.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        let mut printer = Printer::new(self);
        printer.node(id, false);
        printer.finish()
    }

    /// Source text of a node including its leading and trailing comments.
    #[must_use]
    pub fn text_with_comments(&self, id: NodeId) -> String {
        let mut printer = Printer::new(self);
        printer.node(id, true);
        printer.finish()
    }

    /// Regenerates the whole document.
    #[must_use]
    pub fn to_source(&self) -> String {
        let mut printer = Printer::new(self);
        printer.raw(&self.prefix);
        printer.node(self.root, true);
        printer.raw(&self.suffix);
        printer.finish()
    }

    /// Line and column location of a node parsed from source.
    #[must_use]
    pub fn location(&self, id: NodeId) -> Option<Location> {
        self.span(id)
            .map(|range| Location::from_range(&self.source, range))
    }

    // ---- building ------------------------------------------------------

    /// Creates a detached node from parts, adopting its children.
    pub fn create_node(&mut self, kind: &'static str, parts: Vec<Part>) -> NodeId {
        let id = self.alloc(NodeData::new(kind, None));
        self.set_parts(id, parts);
        id
    }

    /// Creates a detached single-token node.
    pub fn create_leaf(&mut self, kind: &'static str, text: impl Into<String>) -> NodeId {
        self.create_node(kind, vec![Part::Token(text.into())])
    }

    /// Appends an anonymous token to the end of a node.
    pub fn push_token(&mut self, id: NodeId, token: impl Into<String>) {
        if let Some(data) = self.data_mut(id) {
            data.parts.push(Part::Token(token.into()));
        }
    }

    pub(crate) fn set_parts(&mut self, id: NodeId, parts: Vec<Part>) {
        let children: Vec<NodeId> = parts
            .iter()
            .filter_map(|part| match part {
                Part::Child { node, .. } => Some(*node),
                Part::Token(_) | Part::Trivia(_) => None,
            })
            .collect();
        if let Some(data) = self.data_mut(id) {
            data.parts = parts;
        }
        self.adopt(id, &children);
    }

    fn adopt(&mut self, parent: NodeId, children: &[NodeId]) {
        for child in children {
            if let Some(data) = self.data_mut(*child) {
                data.parent = Some(parent);
                data.detached = false;
            }
        }
    }

    /// Changes the kind tag of a node.
    pub fn set_kind(&mut self, id: NodeId, kind: &'static str) {
        if let Some(data) = self.data_mut(id) {
            data.kind = kind;
        }
    }

    /// Removes and returns the leading comments of a node.
    pub fn take_leading_comments(&mut self, id: NodeId) -> Vec<Comment> {
        self.data_mut(id)
            .map(|data| std::mem::take(&mut data.leading))
            .unwrap_or_default()
    }

    /// Removes and returns the trailing comments of a node.
    pub fn take_trailing_comments(&mut self, id: NodeId) -> Vec<Comment> {
        self.data_mut(id)
            .map(|data| std::mem::take(&mut data.trailing))
            .unwrap_or_default()
    }

    /// Inserts comments before the existing leading comments.
    pub fn prepend_leading_comments(&mut self, id: NodeId, comments: Vec<Comment>) {
        if let Some(data) = self.data_mut(id) {
            let existing = std::mem::replace(&mut data.leading, comments);
            data.leading.extend(existing);
        }
    }

    /// Adds comments after the existing leading comments.
    pub fn append_leading_comments(&mut self, id: NodeId, comments: Vec<Comment>) {
        if let Some(data) = self.data_mut(id) {
            data.leading.extend(comments);
        }
    }

    /// Adds comments after the existing trailing comments.
    pub fn append_trailing_comments(&mut self, id: NodeId, comments: Vec<Comment>) {
        if let Some(data) = self.data_mut(id) {
            data.trailing.extend(comments);
        }
    }

    /// Deep-copies a subtree within this arena. The copy has no parent.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Detached`] if `id` was pruned.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId, SyntaxError> {
        self.ensure_attached(id)?;
        let nodes = self.subtree_data(id);
        Ok(self.copy_nodes(nodes))
    }

    /// Deep-copies a subtree of another arena into this one.
    pub fn import_subtree(&mut self, other: &Self, id: NodeId) -> NodeId {
        let nodes = other.subtree_data(id);
        self.copy_nodes(nodes)
    }

    fn subtree_data(&self, id: NodeId) -> Vec<(NodeId, NodeData)> {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.data(node).map(|data| (node, data.clone())))
            .collect()
    }

    fn copy_nodes(&mut self, nodes: Vec<(NodeId, NodeData)>) -> NodeId {
        let base = self.nodes.len();
        let table: HashMap<NodeId, NodeId> = nodes
            .iter()
            .enumerate()
            .map(|(offset, (old, _))| (*old, NodeId(base.saturating_add(offset))))
            .collect();
        let remap = |old: NodeId| table.get(&old).copied().unwrap_or(old);
        let copies: Vec<NodeData> = nodes
            .into_iter()
            .map(|(_, data)| NodeData {
                kind: data.kind,
                parts: data
                    .parts
                    .into_iter()
                    .map(|part| match part {
                        Part::Child { field, node } => Part::Child {
                            field,
                            node: remap(node),
                        },
                        other => other,
                    })
                    .collect(),
                parent: data.parent.map(remap),
                leading: data.leading,
                trailing: data.trailing,
                span: None,
                detached: false,
            })
            .collect();
        let root = NodeId(base);
        self.nodes.extend(copies);
        if let Some(data) = self.data_mut(root) {
            data.parent = None;
        }
        root
    }

    // ---- surgery -------------------------------------------------------

    fn ensure_attached(&self, id: NodeId) -> Result<(), SyntaxError> {
        if self.is_detached(id) {
            Err(SyntaxError::detached(self.kind(id)))
        } else {
            Ok(())
        }
    }

    /// Separator style of the list a node's children form.
    #[must_use]
    pub fn list_style(&self, parent: NodeId) -> ListStyle {
        match list_style_of_kind(self.kind(parent)) {
            ListStyle::Single if self.has_token(parent, ",") => ListStyle::Comma,
            style => style,
        }
    }

    fn slot(&self, id: NodeId) -> Result<(NodeId, usize), SyntaxError> {
        let parent = self
            .parent(id)
            .ok_or_else(|| SyntaxError::invalid_splice(self.kind(id), 2))?;
        let index = self
            .parts(parent)
            .iter()
            .position(|part| matches!(part, Part::Child { node, .. } if *node == id))
            .ok_or_else(|| SyntaxError::internal_error("node missing from its parent"))?;
        Ok((parent, index))
    }

    /// Replaces a node with zero or more detached nodes.
    ///
    /// The first replacement takes over the identity of `target`; further
    /// replacements are inserted after it as list siblings. An empty
    /// replacement prunes `target`.
    ///
    /// # Errors
    ///
    /// Fails if `target` was pruned, or if several nodes are spliced into a
    /// position that holds a single node.
    pub fn replace(&mut self, target: NodeId, with: &[NodeId]) -> Result<(), SyntaxError> {
        self.ensure_attached(target)?;
        let Some((first, rest)) = with.split_first() else {
            return self.prune(target);
        };
        if !rest.is_empty() {
            let parent = self.parent(target);
            let style = parent.map_or(ListStyle::Single, |node| self.list_style(node));
            if style == ListStyle::Single {
                let kind = parent.map_or(self.kind(target), |node| self.kind(node));
                return Err(SyntaxError::invalid_splice(kind, with.len()));
            }
        }
        self.move_into(target, *first);
        if rest.is_empty() {
            Ok(())
        } else {
            self.insert_after(target, rest)
        }
    }

    fn move_into(&mut self, target: NodeId, source: NodeId) {
        let old_children = self.children(target);
        for child in &old_children {
            if let Some(data) = self.data_mut(*child) {
                data.detached = true;
            }
        }
        let Some(moved) = self.data_mut(source).map(|data| {
            data.detached = true;
            (
                data.kind,
                std::mem::take(&mut data.parts),
                std::mem::take(&mut data.leading),
                std::mem::take(&mut data.trailing),
            )
        }) else {
            return;
        };
        let (kind, parts, leading, trailing) = moved;
        if let Some(data) = self.data_mut(target) {
            data.kind = kind;
            data.leading = leading;
            data.trailing = trailing;
            data.span = None;
        }
        self.set_parts(target, parts);
    }

    /// Removes a node from its parent together with its list separator.
    ///
    /// # Errors
    ///
    /// Fails if `target` was already pruned.
    pub fn prune(&mut self, target: NodeId) -> Result<(), SyntaxError> {
        self.ensure_attached(target)?;
        if self.parent(target).is_none() {
            if let Some(data) = self.data_mut(target) {
                data.parts.clear();
                data.leading.clear();
                data.trailing.clear();
            }
            return Ok(());
        }
        let (parent, index) = self.slot(target)?;
        let style = self.list_style(parent);
        let range = removal_range(self.parts(parent), index, style);
        if let Some(data) = self.data_mut(parent) {
            data.parts.drain(range);
        }
        if let Some(data) = self.data_mut(target) {
            data.detached = true;
        }
        Ok(())
    }

    /// Inserts detached nodes as list siblings after `anchor`.
    ///
    /// # Errors
    ///
    /// Fails if `anchor` was pruned or its parent is not a list.
    pub fn insert_after(&mut self, anchor: NodeId, nodes: &[NodeId]) -> Result<(), SyntaxError> {
        self.insert_near(anchor, nodes, true)
    }

    /// Inserts detached nodes as list siblings before `anchor`.
    ///
    /// # Errors
    ///
    /// Fails if `anchor` was pruned or its parent is not a list.
    pub fn insert_before(&mut self, anchor: NodeId, nodes: &[NodeId]) -> Result<(), SyntaxError> {
        self.insert_near(anchor, nodes, false)
    }

    fn insert_near(
        &mut self,
        anchor: NodeId,
        nodes: &[NodeId],
        after: bool,
    ) -> Result<(), SyntaxError> {
        self.ensure_attached(anchor)?;
        if nodes.is_empty() {
            return Ok(());
        }
        let (parent, index) = self.slot(anchor)?;
        let style = self.list_style(parent);
        if style == ListStyle::Single {
            return Err(SyntaxError::invalid_splice(self.kind(parent), nodes.len()));
        }
        let field = self.field(anchor);
        let separator = self.separator(parent, index, style);
        let mut inserted = Vec::new();
        for node in nodes {
            if after {
                inserted.extend(separator.iter().cloned());
                inserted.push(Part::Child { field, node: *node });
            } else {
                inserted.push(Part::Child { field, node: *node });
                inserted.extend(separator.iter().cloned());
            }
        }
        let at = if after { index.saturating_add(1) } else { index };
        if let Some(data) = self.data_mut(parent) {
            data.parts.splice(at..at, inserted);
        }
        self.adopt(parent, nodes);
        Ok(())
    }

    /// Appends detached nodes to the end of a list node.
    ///
    /// # Errors
    ///
    /// Fails if `parent` was pruned or is not a list.
    pub fn append_children(&mut self, parent: NodeId, nodes: &[NodeId]) -> Result<(), SyntaxError> {
        if let Some(last) = self.children(parent).last() {
            return self.insert_after(*last, nodes);
        }
        self.fill_empty_list(parent, nodes)
    }

    /// Prepends detached nodes to the start of a list node.
    ///
    /// # Errors
    ///
    /// Fails if `parent` was pruned or is not a list.
    pub fn prepend_children(
        &mut self,
        parent: NodeId,
        nodes: &[NodeId],
    ) -> Result<(), SyntaxError> {
        if let Some(first) = self.children(parent).first() {
            return self.insert_before(*first, nodes);
        }
        self.fill_empty_list(parent, nodes)
    }

    fn fill_empty_list(&mut self, parent: NodeId, nodes: &[NodeId]) -> Result<(), SyntaxError> {
        self.ensure_attached(parent)?;
        let style = self.list_style(parent);
        if style == ListStyle::Single && nodes.len() > 1 {
            return Err(SyntaxError::invalid_splice(self.kind(parent), nodes.len()));
        }
        let separator = match style {
            ListStyle::Comma => vec![Part::Token(",".to_owned()), Part::Trivia(" ".to_owned())],
            ListStyle::Lines => vec![Part::Trivia("\n".to_owned())],
            ListStyle::Spaced => vec![Part::Trivia(" ".to_owned())],
            ListStyle::Adjacent | ListStyle::Single => Vec::new(),
        };
        let mut inserted = Vec::new();
        for (position, node) in nodes.iter().enumerate() {
            if position > 0 {
                inserted.extend(separator.iter().cloned());
            }
            inserted.push(Part::Child {
                field: None,
                node: *node,
            });
        }
        let parts = self.parts(parent);
        let at = parts
            .iter()
            .rposition(|part| {
                matches!(part, Part::Token(text) if matches!(text.as_str(), "}" | ")" | "]" | ">"))
            })
            .unwrap_or(parts.len());
        if let Some(data) = self.data_mut(parent) {
            data.parts.splice(at..at, inserted);
        }
        self.adopt(parent, nodes);
        Ok(())
    }

    fn separator(&self, parent: NodeId, index: usize, style: ListStyle) -> Vec<Part> {
        let parts = self.parts(parent);
        match style {
            ListStyle::Comma => {
                let spacing = parts
                    .iter()
                    .position(|part| matches!(part, Part::Token(text) if text == ","))
                    .and_then(|comma| parts.get(comma.saturating_add(1)))
                    .and_then(|part| match part {
                        Part::Trivia(text) if text.trim().is_empty() => Some(text.clone()),
                        _ => None,
                    })
                    .unwrap_or_else(|| " ".to_owned());
                vec![Part::Token(",".to_owned()), Part::Trivia(spacing)]
            }
            ListStyle::Lines => {
                let indent = index
                    .checked_sub(1)
                    .and_then(|before| parts.get(before))
                    .and_then(|part| match part {
                        Part::Trivia(text) => text.rfind('\n').and_then(|at| text.get(at..)),
                        _ => None,
                    })
                    .unwrap_or("\n");
                vec![Part::Trivia(indent.to_owned())]
            }
            ListStyle::Spaced => vec![Part::Trivia(" ".to_owned())],
            ListStyle::Adjacent | ListStyle::Single => Vec::new(),
        }
    }
}

fn is_trivia(part: Option<&Part>) -> bool {
    matches!(part, Some(Part::Trivia(_)))
}

fn is_comma(part: Option<&Part>) -> bool {
    matches!(part, Some(Part::Token(text)) if text == ",")
}

/// Range of parts to drop when removing the child at `index`.
fn removal_range(parts: &[Part], index: usize, style: ListStyle) -> Range<usize> {
    let next = index.saturating_add(1);
    match style {
        ListStyle::Comma => {
            let mut end = next;
            while is_trivia(parts.get(end)) {
                end = end.saturating_add(1);
            }
            if is_comma(parts.get(end)) {
                end = end.saturating_add(1);
                if is_trivia(parts.get(end)) {
                    end = end.saturating_add(1);
                }
                return index..end;
            }
            let mut start = index;
            while start > 0 && is_trivia(start.checked_sub(1).and_then(|at| parts.get(at))) {
                start = start.saturating_sub(1);
            }
            let before_comma = start.checked_sub(1);
            if before_comma.is_some_and(|at| is_comma(parts.get(at))) {
                start = start.saturating_sub(1);
                if start > 0 && is_trivia(start.checked_sub(1).and_then(|at| parts.get(at))) {
                    start = start.saturating_sub(1);
                }
                return start..next;
            }
            index..next
        }
        ListStyle::Lines | ListStyle::Spaced => {
            if index > 0 && is_trivia(index.checked_sub(1).and_then(|at| parts.get(at))) {
                index.saturating_sub(1)..next
            } else if is_trivia(parts.get(next)) {
                index..next.saturating_add(1)
            } else {
                index..next
            }
        }
        ListStyle::Adjacent | ListStyle::Single => index..next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(source: &str) -> Ast {
        Ast::parse(SupportedLanguage::Tsx, source)
            .unwrap_or_else(|err| panic!("parse failed: {err}"))
    }

    fn find(ast: &Ast, kind: &str, text: &str) -> NodeId {
        ast.descendants(ast.root())
            .into_iter()
            .find(|id| ast.kind(*id) == kind && ast.text(*id) == text)
            .unwrap_or_else(|| panic!("no {kind} `{text}`"))
    }

    #[rstest]
    #[case("const a = 1;\n")]
    #[case("  foo(a,  b) // trailing\n\n/* lead */ bar();\n")]
    #[case("<div a=\"1\">{x} text</div>;")]
    #[case("import x, { y as z } from 'm'\n")]
    fn untouched_trees_print_their_source(#[case] source: &str) {
        assert_eq!(parse(source).to_source(), source);
    }

    #[rstest]
    #[case("foo(a, b, c)", "b", "foo(a, c)")]
    #[case("foo(a, b, c)", "c", "foo(a, b)")]
    #[case("foo(a, b, c)", "a", "foo(b, c)")]
    #[case("foo(a)", "a", "foo()")]
    fn pruning_comma_list_elements_removes_separators(
        #[case] source: &str,
        #[case] target: &str,
        #[case] expected: &str,
    ) {
        let mut ast = parse(source);
        let node = find(&ast, "identifier", target);
        ast.prune(node).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(ast.to_source(), expected);
    }

    #[test]
    fn pruning_statements_removes_their_line() {
        let mut ast = parse("function f() {\n  a();\n  b();\n}");
        let call = find(&ast, "expression_statement", "a();");
        ast.prune(call).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(ast.to_source(), "function f() {\n  b();\n}");
        assert!(ast.is_detached(call));
        assert!(matches!(ast.prune(call), Err(SyntaxError::Detached { .. })));
    }

    #[test]
    fn replace_keeps_node_identity() {
        let mut ast = parse("x + y");
        let left = find(&ast, "identifier", "x");
        let fresh = ast.create_leaf("number", "42");
        ast.replace(left, &[fresh]).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(ast.kind(left), "number");
        assert_eq!(ast.to_source(), "42 + y");
    }

    #[test]
    fn replace_splices_several_nodes_into_lists() {
        let mut ast = parse("foo(a, b)");
        let target = find(&ast, "identifier", "a");
        let first = ast.create_leaf("identifier", "x");
        let second = ast.create_leaf("identifier", "y");
        ast.replace(target, &[first, second])
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(ast.to_source(), "foo(x, y, b)");
    }

    #[test]
    fn replace_rejects_several_nodes_in_single_positions() {
        let mut ast = parse("x + y");
        let target = find(&ast, "identifier", "x");
        let first = ast.create_leaf("identifier", "a");
        let second = ast.create_leaf("identifier", "b");
        let result = ast.replace(target, &[first, second]);
        assert!(matches!(result, Err(SyntaxError::InvalidSplice { count: 2, .. })));
    }

    #[test]
    fn statements_are_inserted_on_indented_lines() {
        let mut ast = parse("function f() {\n  a();\n}");
        let anchor = find(&ast, "expression_statement", "a();");
        let source = parse("b();");
        let first = source.children(source.root()).first().copied();
        let statement = ast.import_subtree(&source, first.unwrap_or_else(|| panic!("empty")));
        ast.insert_after(anchor, &[statement])
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(ast.to_source(), "function f() {\n  a();\n  b();\n}");
    }

    #[test]
    fn clones_are_independent_of_their_source() {
        let mut ast = parse("foo(a)");
        let call = find(&ast, "call_expression", "foo(a)");
        let copy = ast.clone_subtree(call).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(ast.text(copy), "foo(a)");
        assert_eq!(ast.parent(copy), None);
        assert_ne!(copy, call);
    }

    #[test]
    fn appending_to_an_empty_list_goes_before_the_closing_bracket() {
        let mut ast = parse("foo()");
        let arguments = find(&ast, "arguments", "()");
        let arg = ast.create_leaf("identifier", "a");
        ast.append_children(arguments, &[arg])
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(ast.to_source(), "foo(a)");
    }

    #[test]
    fn pushed_tokens_print_after_the_last_child() {
        let mut ast = parse("let a = 1\n");
        let declaration = find(&ast, "lexical_declaration", "let a = 1");
        ast.push_token(declaration, ";");
        assert_eq!(ast.to_source(), "let a = 1;\n");
    }
}
