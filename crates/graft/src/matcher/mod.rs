//! Compilation of patterns into matchers.
//!
//! A pattern node compiles to a rule chosen in this order:
//!
//! 1. string and template literals compare by cooked value, and a literal
//!    whose whole content is a placeholder captures the string;
//! 2. placeholder-shaped nodes (identifiers, and wrappers whose only content
//!    is a placeholder identifier) capture the candidate node;
//! 3. the calls `$Or(..)`, `$And(..)` and `$Maybe(..)` (alias `$Optional`)
//!    combine rules, and a default value written `$Maybe(..)` also lets the
//!    node match when the default is absent;
//! 4. regexes, numbers and other leaves compare by value;
//! 5. anything else matches structurally, children in list-shaped nodes
//!    being matched by the backtracking sequence matcher.

pub(crate) mod equivalence;
mod sequence;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use graft_syntax::literal::{NumericValue, cooked_string, numeric_value, regex_parts};
use graft_syntax::{Ast, ListStyle, NodeId, PatternTree, kinds};
use tracing::{debug, trace};

use crate::bindings::Bindings;
use crate::error::GraftError;
use crate::placeholder::{Placeholder, classify, classify_string, unescape_identifier};

pub(crate) use sequence::match_list;

/// Condition a captured node must satisfy.
pub type Predicate = Rc<dyn Fn(NodeView<'_>) -> bool>;

/// Conditions keyed by placeholder text (`$a`, `$$a`).
pub type Conditions = BTreeMap<String, Predicate>;

/// Read-only view of a node handed to capture conditions.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    ast: &'a Ast,
    node: NodeId,
}

impl<'a> NodeView<'a> {
    /// Creates a view of `node`.
    #[must_use]
    pub const fn new(ast: &'a Ast, node: NodeId) -> Self {
        Self { ast, node }
    }

    /// The arena holding the node.
    #[must_use]
    pub const fn ast(&self) -> &'a Ast {
        self.ast
    }

    /// The viewed node.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Kind tag of the node.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.ast.kind(self.node)
    }

    /// Source text of the node.
    #[must_use]
    pub fn text(&self) -> String {
        self.ast.text(self.node)
    }

    /// Cooked value when the node is a string literal.
    #[must_use]
    pub fn string_value(&self) -> Option<String> {
        cooked_string(self.ast, self.node)
    }

    /// View of the parent node.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.ast.parent(self.node).map(|parent| Self::new(self.ast, parent))
    }

    /// Views of the named children.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.ast
            .children(self.node)
            .into_iter()
            .map(|child| Self::new(self.ast, child))
            .collect()
    }
}

impl fmt::Debug for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeView")
            .field("kind", &self.kind())
            .field("node", &self.node)
            .finish()
    }
}

/// The document being searched plus the capture conditions in force.
pub struct MatchEnv<'a> {
    ast: &'a Ast,
    conditions: &'a Conditions,
}

impl<'a> MatchEnv<'a> {
    /// Creates an environment for matching against `ast`.
    #[must_use]
    pub const fn new(ast: &'a Ast, conditions: &'a Conditions) -> Self {
        Self { ast, conditions }
    }

    /// The searched document.
    #[must_use]
    pub const fn ast(&self) -> &'a Ast {
        self.ast
    }

    fn accepts(&self, key: &str, node: NodeId) -> bool {
        self.conditions
            .get(key)
            .is_none_or(|condition| condition(NodeView::new(self.ast, node)))
    }
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    roots: Vec<FieldRule>,
}

impl Matcher {
    /// Compiles every root of a parsed pattern.
    #[must_use]
    pub fn compile(pattern: &PatternTree) -> Self {
        let ast = pattern.ast();
        let roots: Vec<FieldRule> = pattern
            .roots()
            .iter()
            .map(|root| FieldRule {
                field: None,
                rule: Rule::compile(ast, *root),
            })
            .collect();
        debug!(
            target: "graft::match",
            roots = roots.len(),
            pattern = pattern.source(),
            "compiled matcher"
        );
        Self { roots }
    }

    /// Number of pattern roots.
    #[must_use]
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Matches a single-root pattern against one node.
    ///
    /// Patterns with several roots are matched as a sequence of one node.
    ///
    /// # Errors
    ///
    /// Returns [`GraftError::PatternPosition`] when an array placeholder is
    /// reached where a single node is required.
    pub fn match_node(
        &self,
        env: &MatchEnv<'_>,
        node: NodeId,
        bindings: Bindings,
    ) -> Result<Option<Bindings>, GraftError> {
        match self.roots.as_slice() {
            [single] => single.rule.matches(env, node, bindings),
            _ => self.match_nodes(env, &[node], bindings),
        }
    }

    /// Matches the pattern roots against a run of sibling nodes.
    ///
    /// # Errors
    ///
    /// Returns [`GraftError::PatternPosition`] when an array placeholder is
    /// reached where a single node is required.
    pub fn match_nodes(
        &self,
        env: &MatchEnv<'_>,
        nodes: &[NodeId],
        bindings: Bindings,
    ) -> Result<Option<Bindings>, GraftError> {
        let candidates: Vec<(Option<&'static str>, NodeId)> =
            nodes.iter().map(|node| (None, *node)).collect();
        match_list(env, &self.roots, &candidates, bindings, false)
    }
}

/// A pattern element together with the grammar field it occupies.
#[derive(Debug, Clone)]
pub(crate) struct FieldRule {
    pub(crate) field: Option<&'static str>,
    pub(crate) rule: Rule,
}

#[derive(Debug, Clone)]
pub(crate) enum Rule {
    Capture(Placeholder),
    Splice(Placeholder),
    String(StringRule),
    Regex { pattern: String, flags: String },
    Number(NumericValue),
    Leaf { kind: &'static str, text: String },
    Node(NodeRule),
    Or(Vec<Rule>),
    And(Vec<Rule>),
    Maybe(Box<Rule>),
}

#[derive(Debug, Clone)]
pub(crate) enum StringRule {
    Exact(String),
    Capture(Placeholder),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeRule {
    kind: &'static str,
    tokens: Vec<String>,
    children: Vec<FieldRule>,
    list: bool,
    unordered: bool,
}

impl Rule {
    pub(crate) fn compile(ast: &Ast, node: NodeId) -> Self {
        if let Some(rule) = compile_string(ast, node) {
            return rule;
        }
        if let Some(placeholder) = node_placeholder(ast, node) {
            return if placeholder.kind().is_splice() {
                Self::Splice(placeholder)
            } else {
                Self::Capture(placeholder)
            };
        }
        if let Some(rule) = compile_composite(ast, node) {
            return rule;
        }
        if let Some(rule) = compile_optional_default(ast, node) {
            return rule;
        }
        match ast.kind(node) {
            "regex" => {
                if let Some((pattern, flags)) = regex_parts(ast, node) {
                    return Self::Regex { pattern, flags };
                }
            }
            "number" => {
                if let Some(value) = numeric_value(&ast.text(node)) {
                    return Self::Number(value);
                }
            }
            _ => {}
        }
        if ast.is_leaf(node) {
            return Self::Leaf {
                kind: ast.kind(node),
                text: unescape_identifier(&leaf_text(ast, node)).to_owned(),
            };
        }
        Self::Node(NodeRule::compile(ast, node))
    }

    pub(crate) const fn as_splice(&self) -> Option<&Placeholder> {
        match self {
            Self::Splice(placeholder) => Some(placeholder),
            _ => None,
        }
    }

    pub(crate) fn matches(
        &self,
        env: &MatchEnv<'_>,
        node: NodeId,
        bindings: Bindings,
    ) -> Result<Option<Bindings>, GraftError> {
        let ast = env.ast;
        match self {
            Self::Capture(placeholder) => Ok(bind_node(env, placeholder, node, bindings)),
            Self::Splice(placeholder) => Err(GraftError::pattern_position(format!(
                "array capture placeholder {} is in an invalid position",
                placeholder.text()
            ))),
            Self::String(rule) => Ok(rule.matches(env, node, bindings)),
            Self::Regex { pattern, flags } => Ok(regex_parts(ast, node)
                .filter(|(candidate, candidate_flags)| {
                    candidate == pattern && candidate_flags == flags
                })
                .map(|_| bindings)),
            Self::Number(value) => {
                let same = ast.kind(node) == "number"
                    && numeric_value(&ast.text(node)).as_ref() == Some(value);
                Ok(same.then_some(bindings))
            }
            Self::Leaf { kind, text } => {
                let same = ast.kind(node) == *kind && leaf_text(ast, node) == *text;
                Ok(same.then_some(bindings))
            }
            Self::Node(rule) => rule.matches(env, node, bindings),
            Self::Or(alternatives) => {
                for alternative in alternatives {
                    if let Some(bound) = alternative.matches(env, node, bindings.clone())? {
                        return Ok(Some(bound));
                    }
                }
                Ok(None)
            }
            Self::And(all) => {
                let mut current = bindings;
                for rule in all {
                    let Some(next) = rule.matches(env, node, current)? else {
                        return Ok(None);
                    };
                    current = next;
                }
                Ok(Some(current))
            }
            Self::Maybe(inner) => inner.matches(env, node, bindings),
        }
    }
}

impl StringRule {
    fn matches(&self, env: &MatchEnv<'_>, node: NodeId, bindings: Bindings) -> Option<Bindings> {
        let value = cooked_string(env.ast, node)?;
        match self {
            Self::Exact(expected) => (value == *expected).then_some(bindings),
            Self::Capture(placeholder) => {
                let Some(key) = placeholder.key() else {
                    return Some(bindings);
                };
                if let Some(existing) = bindings.string_capture(key) {
                    let same = existing == value;
                    return same.then_some(bindings);
                }
                let mut bound = bind_node(env, placeholder, node, bindings)?;
                bound.insert_string_capture(key, value);
                Some(bound)
            }
        }
    }
}

impl NodeRule {
    fn compile(ast: &Ast, node: NodeId) -> Self {
        let kind = ast.kind(node);
        Self {
            kind,
            tokens: significant_tokens(ast, node)
                .into_iter()
                .map(str::to_owned)
                .collect(),
            children: significant_children(ast, node)
                .into_iter()
                .map(|(field, child)| FieldRule {
                    field,
                    rule: Rule::compile(ast, child),
                })
                .collect(),
            list: ast.list_style(node) != ListStyle::Single,
            unordered: kinds::is_unordered_list(kind),
        }
    }

    fn matches(
        &self,
        env: &MatchEnv<'_>,
        node: NodeId,
        bindings: Bindings,
    ) -> Result<Option<Bindings>, GraftError> {
        let ast = env.ast;
        if ast.kind(node) != self.kind
            || !self
                .tokens
                .iter()
                .map(String::as_str)
                .eq(significant_tokens(ast, node))
        {
            return Ok(None);
        }
        let candidates = significant_children(ast, node);
        if self.list {
            return match_list(env, &self.children, &candidates, bindings, self.unordered);
        }
        if candidates.len() != self.children.len() {
            return Ok(None);
        }
        let mut current = bindings;
        for (pattern, (field, candidate)) in self.children.iter().zip(candidates) {
            if pattern.field != field {
                return Ok(None);
            }
            let Some(next) = pattern.rule.matches(env, candidate, current)? else {
                return Ok(None);
            };
            current = next;
        }
        Ok(Some(current))
    }
}

fn compile_string(ast: &Ast, node: NodeId) -> Option<Rule> {
    let value = cooked_string(ast, node)?;
    let rule = classify_string(&value).map_or(StringRule::Exact(value), StringRule::Capture);
    Some(Rule::String(rule))
}

/// Recognises `$Or(..)`, `$And(..)` and `$Maybe(..)`, also when written as
/// a statement. `$Optional(..)` is read as `$Maybe(..)`.
fn compile_composite(ast: &Ast, node: NodeId) -> Option<Rule> {
    if ast.kind(node) == "expression_statement" {
        let fields = ast.fields(node);
        let &[(_, call)] = fields.as_slice() else {
            return None;
        };
        let (name, rules) = composite_arguments(ast, call)?;
        let wrap = |rule: Rule| {
            Rule::Node(NodeRule {
                kind: "expression_statement",
                tokens: Vec::new(),
                children: vec![FieldRule { field: None, rule }],
                list: false,
                unordered: false,
            })
        };
        return build_composite(name, rules.into_iter().map(wrap).collect());
    }
    let (name, arguments) = composite_arguments(ast, node)?;
    build_composite(name, arguments)
}

fn composite_arguments(ast: &Ast, node: NodeId) -> Option<(&'static str, Vec<Rule>)> {
    if ast.kind(node) != "call_expression" {
        return None;
    }
    let function = ast.child_by_field(node, "function")?;
    let name = match ast.leaf_text(function)? {
        "$Or" => "$Or",
        "$And" => "$And",
        "$Maybe" | "$Optional" => "$Maybe",
        _ => return None,
    };
    let arguments = ast.child_by_field(node, "arguments")?;
    if ast.kind(arguments) != "arguments" {
        return None;
    }
    let rules = ast
        .children(arguments)
        .into_iter()
        .map(|argument| Rule::compile(ast, argument))
        .collect();
    Some((name, rules))
}

fn build_composite(name: &str, mut rules: Vec<Rule>) -> Option<Rule> {
    match name {
        "$Or" => Some(Rule::Or(rules)),
        "$And" => Some(Rule::And(rules)),
        "$Maybe" if rules.len() == 1 => rules.pop().map(|rule| Rule::Maybe(Box::new(rule))),
        _ => None,
    }
}

/// Compiles a node whose default value is `$Maybe(..)` into a choice
/// between the node with that default and the node without one.
///
/// Parameters, declarators and fields keep their kind when the default is
/// left out; destructuring defaults collapse to their left side.
fn compile_optional_default(ast: &Ast, node: NodeId) -> Option<Rule> {
    let (value_field, bare_field) = match ast.kind(node) {
        "required_parameter" | "optional_parameter" | "variable_declarator"
        | "public_field_definition" => ("value", None),
        "assignment_pattern" | "object_assignment_pattern" => ("right", Some("left")),
        _ => return None,
    };
    let value = ast.child_by_field(node, value_field)?;
    if !matches!(compile_composite(ast, value), Some(Rule::Maybe(_))) {
        return None;
    }
    let present = NodeRule::compile(ast, node);
    let absent = match bare_field {
        Some(field) => Rule::compile(ast, ast.child_by_field(node, field)?),
        None => {
            let mut without = present.clone();
            without.tokens.retain(|token| token != "=");
            without
                .children
                .retain(|child| child.field != Some(value_field));
            Rule::Node(without)
        }
    };
    Some(Rule::Or(vec![Rule::Node(present), absent]))
}

/// Returns the placeholder a node stands for, if the node is nothing but a
/// placeholder in a position that allows substitution.
pub(crate) fn node_placeholder(ast: &Ast, node: NodeId) -> Option<Placeholder> {
    let kind = ast.kind(node);
    if kinds::is_identifier_like(kind) {
        return ast.leaf_text(node).and_then(classify);
    }
    let (splice_only, allowed): (bool, &[&str]) = match kind {
        "expression_statement" | "public_field_definition" | "property_signature" => {
            (false, &[";", ",", ""])
        }
        "required_parameter" | "type_parameter" | "import_specifier" | "export_specifier"
        | "jsx_attribute" => (false, &[]),
        "spread_element" | "rest_pattern" => (true, &["..."]),
        "jsx_expression" => (true, &["{", "}"]),
        _ => return None,
    };
    if !ast.tokens(node).iter().all(|token| allowed.contains(token)) {
        return None;
    }
    let fields = ast.fields(node);
    let &[(_, only)] = fields.as_slice() else {
        return None;
    };
    if !kinds::is_identifier_like(ast.kind(only)) {
        return None;
    }
    let placeholder = ast.leaf_text(only).and_then(classify)?;
    (!splice_only || placeholder.kind().is_splice()).then_some(placeholder)
}

fn bind_node(
    env: &MatchEnv<'_>,
    placeholder: &Placeholder,
    node: NodeId,
    bindings: Bindings,
) -> Option<Bindings> {
    let Some(key) = placeholder.key() else {
        return Some(bindings);
    };
    if bindings.conflicts_with(placeholder) {
        return None;
    }
    if let Some(existing) = bindings.capture(key) {
        let same = equivalence::equivalent(env.ast, existing, env.ast, node);
        return same.then_some(bindings);
    }
    if !env.accepts(key, node) {
        return None;
    }
    trace!(
        target: "graft::match",
        placeholder = key,
        kind = env.ast.kind(node),
        "bound capture"
    );
    let mut bound = bindings;
    bound.insert_capture(key, node);
    Some(bound)
}

pub(crate) fn bind_splice(
    env: &MatchEnv<'_>,
    placeholder: &Placeholder,
    nodes: Vec<NodeId>,
    bindings: Bindings,
) -> Option<Bindings> {
    let Some(key) = placeholder.key() else {
        return Some(bindings);
    };
    if bindings.conflicts_with(placeholder) {
        return None;
    }
    if let Some(existing) = bindings.array_capture(key) {
        let same = existing.len() == nodes.len()
            && existing
                .iter()
                .zip(&nodes)
                .all(|(left, right)| equivalence::equivalent(env.ast, *left, env.ast, *right));
        return same.then_some(bindings);
    }
    if !nodes.iter().all(|node| env.accepts(key, *node)) {
        return None;
    }
    trace!(
        target: "graft::match",
        placeholder = key,
        count = nodes.len(),
        "bound array capture"
    );
    let mut bound = bindings;
    bound.insert_array_capture(key, nodes);
    Some(bound)
}

/// Leaf text used for comparison; JSX text ignores surrounding whitespace.
fn leaf_text(ast: &Ast, node: NodeId) -> String {
    let text = ast.text(node);
    if ast.kind(node) == "jsx_text" {
        text.trim().to_owned()
    } else {
        text
    }
}

/// Tokens that take part in matching; separators do not.
pub(crate) fn significant_tokens(ast: &Ast, node: NodeId) -> Vec<&str> {
    ast.tokens(node)
        .into_iter()
        .filter(|token| !matches!(*token, "," | ";" | ""))
        .collect()
}

/// Children that take part in matching; whitespace-only JSX text does not.
pub(crate) fn significant_children(ast: &Ast, node: NodeId) -> Vec<(Option<&'static str>, NodeId)> {
    ast.fields(node)
        .into_iter()
        .filter(|(_, child)| !(ast.kind(*child) == "jsx_text" && ast.text(*child).trim().is_empty()))
        .collect()
}
