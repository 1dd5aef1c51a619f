//! Compilation of replacement patterns into generators.
//!
//! A replacement pattern is compiled once into a tree of templates that
//! mirrors the pattern. Generating for a match instantiates the templates in
//! the document arena:
//!
//! - node placeholders are replaced by copies of the captured node, or keep
//!   the pattern's own text when nothing was captured under that name;
//! - array placeholders splice copies of every captured node;
//! - string literals holding only a placeholder take the captured string
//!   value, re-quoted with the pattern's quote style;
//! - escaped identifiers (`$_$foo`) become the literal `$foo`;
//! - subtrees without placeholders are copied verbatim.
//!
//! Comments on placeholder nodes in the pattern are carried onto whatever
//! they generate.

mod convert;

use graft_syntax::kinds::OperandSlot;
use graft_syntax::literal::{Quote, cooked_string, escape_content};
use graft_syntax::{Ast, Backend, ListStyle, NodeId, Part, PatternTree, kinds};
use tracing::trace;

use crate::bindings::Bindings;
use crate::error::GraftError;
use crate::imports::shape::{ImportShape, needs_normalising};
use crate::matcher::node_placeholder;
use crate::placeholder::{Placeholder, classify_string, is_escaped, unescape_identifier};

pub(crate) use convert::{operator_of, parenthesize_for, terminate, to_expression, to_statement};

/// A compiled replacement pattern.
#[derive(Debug, Clone)]
pub struct Generator {
    pattern: PatternTree,
    roots: Vec<Template>,
}

#[derive(Debug, Clone)]
enum Template {
    Capture {
        placeholder: Placeholder,
        pattern: NodeId,
        statement: bool,
    },
    Splice {
        placeholder: Placeholder,
        pattern: NodeId,
        statement: bool,
    },
    StringContent {
        placeholder: Placeholder,
        quote: Quote,
        pattern: NodeId,
    },
    Escaped {
        pattern: NodeId,
        text: String,
    },
    Node {
        pattern: NodeId,
        children: Vec<Template>,
    },
    Copy {
        pattern: NodeId,
    },
}

/// Everything a template needs while generating.
struct Scope<'a> {
    pattern: &'a Ast,
    bindings: &'a Bindings,
    backend: &'a dyn Backend,
}

impl Generator {
    /// Compiles a parsed replacement pattern.
    #[must_use]
    pub fn compile(pattern: PatternTree) -> Self {
        let roots = pattern
            .roots()
            .iter()
            .map(|root| Template::compile(pattern.ast(), *root))
            .collect();
        Self { pattern, roots }
    }

    /// Source text of the replacement pattern.
    #[must_use]
    pub fn source(&self) -> &str {
        self.pattern.source()
    }

    /// Instantiates the replacement in `doc` for one match.
    ///
    /// Returns the detached generated nodes, ready to be spliced in.
    ///
    /// # Errors
    ///
    /// Returns [`GraftError::PatternPosition`] when an array placeholder
    /// expands to several nodes where only one fits, and syntax errors when
    /// a rewritten import does not parse.
    pub fn generate(
        &self,
        doc: &mut Ast,
        bindings: &Bindings,
        backend: &dyn Backend,
    ) -> Result<Vec<NodeId>, GraftError> {
        let scope = Scope {
            pattern: self.pattern.ast(),
            bindings,
            backend,
        };
        let mut generated = Vec::new();
        for root in &self.roots {
            generated.extend(root.generate(&scope, doc)?);
        }
        trace!(
            target: "graft::replace",
            nodes = generated.len(),
            pattern = self.pattern.source(),
            "generated replacement"
        );
        Ok(generated)
    }
}

impl Template {
    fn compile(ast: &Ast, node: NodeId) -> Self {
        if let Some(value) = cooked_string(ast, node)
            && let Some(placeholder) = classify_string(&value)
        {
            return Self::StringContent {
                placeholder,
                quote: Quote::of(ast, node).unwrap_or(Quote::Single),
                pattern: node,
            };
        }
        if let Some(placeholder) = node_placeholder(ast, node) {
            let statement = ast.kind(node) == "expression_statement";
            return if placeholder.kind().is_splice() {
                Self::Splice {
                    placeholder,
                    pattern: node,
                    statement,
                }
            } else {
                Self::Capture {
                    placeholder,
                    pattern: node,
                    statement,
                }
            };
        }
        if kinds::is_identifier_like(ast.kind(node))
            && let Some(text) = ast.leaf_text(node)
            && is_escaped(text)
        {
            return Self::Escaped {
                pattern: node,
                text: unescape_identifier(text).to_owned(),
            };
        }
        let children: Vec<Self> = ast
            .children(node)
            .into_iter()
            .map(|child| Self::compile(ast, child))
            .collect();
        if children.iter().all(|child| matches!(child, Self::Copy { .. })) {
            return Self::Copy { pattern: node };
        }
        Self::Node {
            pattern: node,
            children,
        }
    }

    const fn pattern_node(&self) -> NodeId {
        match self {
            Self::Capture { pattern, .. }
            | Self::Splice { pattern, .. }
            | Self::StringContent { pattern, .. }
            | Self::Escaped { pattern, .. }
            | Self::Node { pattern, .. }
            | Self::Copy { pattern } => *pattern,
        }
    }

    fn generate(&self, scope: &Scope<'_>, doc: &mut Ast) -> Result<Vec<NodeId>, GraftError> {
        match self {
            Self::Capture {
                placeholder,
                pattern,
                statement,
            } => {
                let captured = placeholder.key().and_then(|key| scope.bindings.capture(key));
                let node = clone_or_import(doc, captured, scope.pattern, *pattern)?;
                copy_comments(scope.pattern, *pattern, doc, node, node);
                let converted = if *statement {
                    let semicolon = scope.pattern.has_token(*pattern, ";");
                    to_statement(doc, scope.backend, node, semicolon)?
                } else if scope.pattern.parent(*pattern).is_some() {
                    to_expression(doc, node)
                } else {
                    node
                };
                Ok(vec![converted])
            }
            Self::Splice {
                placeholder,
                pattern,
                statement,
            } => {
                let captured = placeholder
                    .key()
                    .and_then(|key| scope.bindings.array_capture(key));
                let Some(nodes) = captured else {
                    return Ok(vec![doc.import_subtree(scope.pattern, *pattern)]);
                };
                let semicolon = scope.pattern.has_token(*pattern, ";");
                let mut copies = Vec::with_capacity(nodes.len());
                for node in nodes {
                    let copy = doc.clone_subtree(*node)?;
                    copies.push(if *statement {
                        to_statement(doc, scope.backend, copy, semicolon)?
                    } else {
                        copy
                    });
                }
                if let (Some(first), Some(last)) = (copies.first(), copies.last()) {
                    copy_comments(scope.pattern, *pattern, doc, *first, *last);
                }
                Ok(copies)
            }
            Self::StringContent {
                placeholder,
                quote,
                pattern,
            } => {
                let value = placeholder.key().and_then(|key| {
                    scope
                        .bindings
                        .string_capture(key)
                        .map(str::to_owned)
                        .or_else(|| {
                            scope
                                .bindings
                                .capture(key)
                                .and_then(|node| cooked_string(doc, node))
                        })
                });
                let Some(content) = value else {
                    return Ok(vec![doc.import_subtree(scope.pattern, *pattern)]);
                };
                let node = string_literal(doc, &content, *quote);
                copy_comments(scope.pattern, *pattern, doc, node, node);
                Ok(vec![node])
            }
            Self::Escaped { pattern, text } => {
                let node = doc.create_leaf(scope.pattern.kind(*pattern), text.clone());
                copy_comments(scope.pattern, *pattern, doc, node, node);
                Ok(vec![node])
            }
            Self::Copy { pattern } => Ok(vec![doc.import_subtree(scope.pattern, *pattern)]),
            Self::Node { pattern, children } => {
                let node = generate_node(scope, doc, *pattern, children)?;
                if doc.kind(node) == "import_statement" && needs_normalising(doc, node) {
                    return Ok(vec![normalise_import(scope, doc, node)?]);
                }
                Ok(vec![node])
            }
        }
    }

    fn describe(&self, pattern: &Ast) -> String {
        match self {
            Self::Capture { placeholder, .. } | Self::Splice { placeholder, .. } => {
                placeholder.text().to_owned()
            }
            _ => pattern.text(self.pattern_node()),
        }
    }
}

/// Builds a copy of a pattern node whose children are generated.
///
/// The node's own tokens and spacing come from the pattern; each child slot
/// is filled with whatever its template generates.
fn generate_node(
    scope: &Scope<'_>,
    doc: &mut Ast,
    pattern: NodeId,
    children: &[Template],
) -> Result<NodeId, GraftError> {
    let kind = scope.pattern.kind(pattern);
    let mut parts = Vec::new();
    let mut slots = Vec::new();
    for part in scope.pattern.parts(pattern) {
        match part {
            Part::Token(token) => parts.push(Part::Token(token.clone())),
            Part::Trivia(trivia) => parts.push(Part::Trivia(trivia.clone())),
            Part::Child { field, node } => {
                let slot = doc.create_leaf(scope.pattern.kind(*node), "");
                parts.push(Part::Child {
                    field: *field,
                    node: slot,
                });
                slots.push(slot);
            }
        }
    }
    let shell = doc.create_node(kind, parts);
    copy_comments(scope.pattern, pattern, doc, shell, shell);
    let single = doc.list_style(shell) == ListStyle::Single;
    let operator = operator_of(scope.pattern, pattern);
    for (slot, template) in slots.iter().zip(children) {
        let generated = template.generate(scope, doc)?;
        if single && generated.len() != 1 {
            return Err(GraftError::pattern_position(format!(
                "array capture placeholder {} is in an invalid position",
                template.describe(scope.pattern)
            )));
        }
        let fitted: Vec<NodeId> = generated
            .into_iter()
            .map(|node| {
                let slot_info = OperandSlot {
                    parent_kind: kind,
                    parent_operator: operator.as_deref(),
                    field: doc.field(*slot),
                };
                parenthesize_for(doc, node, slot_info)
            })
            .collect();
        doc.replace(*slot, &fitted)?;
    }
    Ok(shell)
}

/// Re-renders a generated import whose specifiers came from destructuring
/// captures, and parses it back.
fn normalise_import(scope: &Scope<'_>, doc: &mut Ast, node: NodeId) -> Result<NodeId, GraftError> {
    let Some(shape) = ImportShape::of_statement(doc, node) else {
        return Ok(node);
    };
    let text = shape.render();
    let parsed = scope.backend.parse(&text)?;
    let Some(statement) = parsed.children(parsed.root()).first().copied() else {
        return Ok(node);
    };
    let imported = doc.import_subtree(&parsed, statement);
    let leading = doc.take_leading_comments(node);
    let trailing = doc.take_trailing_comments(node);
    doc.append_leading_comments(imported, leading);
    doc.append_trailing_comments(imported, trailing);
    Ok(imported)
}

fn clone_or_import(
    doc: &mut Ast,
    captured: Option<NodeId>,
    pattern: &Ast,
    fallback: NodeId,
) -> Result<NodeId, GraftError> {
    let Some(node) = captured else {
        return Ok(doc.import_subtree(pattern, fallback));
    };
    Ok(doc.clone_subtree(node)?)
}

/// Builds a string or template literal holding `content`.
fn string_literal(doc: &mut Ast, content: &str, quote: Quote) -> NodeId {
    let delimiter = match quote {
        Quote::Single => "'",
        Quote::Double => "\"",
        Quote::Backtick => "`",
    };
    let escaped = escape_content(content, quote);
    let mut parts = vec![Part::Token(delimiter.to_owned())];
    if !escaped.is_empty() {
        let fragment = doc.create_leaf("string_fragment", escaped);
        parts.push(Part::Child {
            field: None,
            node: fragment,
        });
    }
    parts.push(Part::Token(delimiter.to_owned()));
    let kind = if quote == Quote::Backtick {
        "template_string"
    } else {
        "string"
    };
    doc.create_node(kind, parts)
}

/// Carries a pattern node's comments onto generated nodes, leading comments
/// before `first` and trailing ones after `last`.
fn copy_comments(pattern: &Ast, from: NodeId, doc: &mut Ast, first: NodeId, last: NodeId) {
    let leading: Vec<_> = pattern
        .leading_comments(from)
        .iter()
        .map(graft_syntax::Comment::transferred)
        .collect();
    let trailing: Vec<_> = pattern
        .trailing_comments(from)
        .iter()
        .map(graft_syntax::Comment::transferred)
        .collect();
    doc.prepend_leading_comments(first, leading);
    doc.append_trailing_comments(last, trailing);
}
