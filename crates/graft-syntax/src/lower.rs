//! Lowering of Tree-sitter trees into the owned arena.
//!
//! Every byte of the source ends up in exactly one part: anonymous children
//! become tokens, gaps between children become trivia, and named children
//! are lowered recursively. Comments are attached to the closest node they
//! describe so that they travel with it through later edits.

use tracing::debug;

use crate::error::SyntaxError;
use crate::frame::code_frame;
use crate::language::SupportedLanguage;
use crate::parser::{ParseResult, Parser};
use crate::tree::{Ast, Comment, NodeData, NodeId, Part};

/// Parses a complete document, rejecting sources with syntax errors.
pub(crate) fn parse_document(
    language: SupportedLanguage,
    source: &str,
) -> Result<Ast, SyntaxError> {
    let result = Parser::new(language)?.parse(source)?;
    if let Some(error) = result.first_error() {
        let frame = code_frame(source, error.line, error.column);
        return Err(SyntaxError::parse(
            language,
            format!(
                "{} at {}:{}\n{frame}",
                error.message, error.line, error.column
            ),
        ));
    }
    Ok(lower(&result))
}

/// Converts a parse result into an arena.
pub(crate) fn lower(result: &ParseResult) -> Ast {
    let source = result.source();
    let root = result.root_node();
    let mut ast = Ast::empty(result.language(), source);
    let id = lower_node(&mut ast, root, source);
    ast.root = id;
    ast.prefix = slice(source, 0, root.start_byte());
    ast.suffix = slice(source, root.end_byte(), source.len());
    debug!(
        target: "graft_syntax::lower",
        language = %result.language(),
        nodes = ast.len(),
        "lowered syntax tree"
    );
    ast
}

fn slice(source: &str, start: usize, end: usize) -> String {
    source.get(start..end).unwrap_or_default().to_owned()
}

enum Raw {
    Part(Part),
    Comment(String),
}

fn lower_node(ast: &mut Ast, node: tree_sitter::Node<'_>, source: &str) -> NodeId {
    let id = ast.alloc(NodeData::new(node.kind(), Some(node.byte_range())));
    if node.child_count() == 0 {
        let text = slice(source, node.start_byte(), node.end_byte());
        ast.set_parts(id, vec![Part::Token(text)]);
        return id;
    }

    let mut raw = Vec::new();
    let mut position = node.start_byte();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if child.start_byte() > position {
                raw.push(Raw::Part(Part::Trivia(slice(
                    source,
                    position,
                    child.start_byte(),
                ))));
            }
            let text = slice(source, child.start_byte(), child.end_byte());
            if child.kind() == "comment" {
                raw.push(Raw::Comment(text));
            } else if child.is_named() {
                let field = cursor.field_name();
                let lowered = lower_node(ast, child, source);
                raw.push(Raw::Part(Part::Child {
                    field,
                    node: lowered,
                }));
            } else {
                raw.push(Raw::Part(Part::Token(text)));
            }
            position = position.max(child.end_byte());
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    if node.end_byte() > position {
        raw.push(Raw::Part(Part::Trivia(slice(
            source,
            position,
            node.end_byte(),
        ))));
    }

    let parts = attach_comments(ast, raw);
    ast.set_parts(id, parts);
    id
}

enum Item {
    Part(Part),
    Pending(String),
}

/// Distributes comments among the children they sit next to.
///
/// In order of preference a comment becomes a trailing comment of the child
/// it follows on the same line, a leading comment of the child it precedes,
/// or a trailing comment of the child it follows. Comments separated from
/// every child by a token stay in place as trivia.
fn attach_comments(ast: &mut Ast, raw: Vec<Raw>) -> Vec<Part> {
    let mut items: Vec<Item> = Vec::with_capacity(raw.len());
    for entry in raw {
        match entry {
            Raw::Comment(text) => {
                if !attach_same_line(ast, &mut items, &text) {
                    items.push(Item::Pending(text));
                }
            }
            Raw::Part(Part::Child { field, node }) => {
                let leading = collect_leading(&mut items);
                if !leading.is_empty() {
                    ast.prepend_leading_comments(node, leading);
                }
                items.push(Item::Part(Part::Child { field, node }));
            }
            Raw::Part(part) => items.push(Item::Part(part)),
        }
    }

    let mut parts: Vec<Part> = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Item::Part(part) => parts.push(part),
            Item::Pending(text) => {
                if !attach_trailing(ast, &mut parts, &text) {
                    parts.push(Part::Trivia(text));
                }
            }
        }
    }
    parts
}

fn previous_child(items: &[Item], gap_allowed: bool) -> Option<(NodeId, Option<String>)> {
    match items.last()? {
        Item::Part(Part::Child { node, .. }) => Some((*node, None)),
        Item::Part(Part::Trivia(gap)) if gap_allowed => {
            let before = items.len().checked_sub(2).and_then(|at| items.get(at))?;
            match before {
                Item::Part(Part::Child { node, .. }) => Some((*node, Some(gap.clone()))),
                _ => None,
            }
        }
        _ => None,
    }
}

fn attach_same_line(ast: &mut Ast, items: &mut Vec<Item>, text: &str) -> bool {
    let Some((node, gap)) = previous_child(items, true) else {
        return false;
    };
    if gap.as_deref().is_some_and(|value| value.contains('\n')) {
        return false;
    }
    if gap.is_some() {
        items.pop();
    }
    ast.append_trailing_comments(node, vec![Comment::new(text, gap.unwrap_or_default())]);
    true
}

fn collect_leading(items: &mut Vec<Item>) -> Vec<Comment> {
    let mut leading = Vec::new();
    loop {
        match items.last() {
            Some(Item::Pending(_)) => {
                if let Some(Item::Pending(text)) = items.pop() {
                    leading.push(Comment::new(text, ""));
                }
            }
            Some(Item::Part(Part::Trivia(_)))
                if matches!(
                    items.len().checked_sub(2).and_then(|at| items.get(at)),
                    Some(Item::Pending(_))
                ) =>
            {
                let gap = match items.pop() {
                    Some(Item::Part(Part::Trivia(gap))) => gap,
                    _ => String::new(),
                };
                if let Some(Item::Pending(text)) = items.pop() {
                    leading.push(Comment::new(text, gap));
                }
            }
            _ => break,
        }
    }
    leading.reverse();
    leading
}

fn attach_trailing(ast: &mut Ast, parts: &mut Vec<Part>, text: &str) -> bool {
    let (node, gap) = match parts.last() {
        Some(Part::Child { node, .. }) => (*node, None),
        Some(Part::Trivia(gap)) => {
            match parts.len().checked_sub(2).and_then(|at| parts.get(at)) {
                Some(Part::Child { node, .. }) => (*node, Some(gap.clone())),
                _ => return false,
            }
        }
        _ => return false,
    };
    if gap.is_some() {
        parts.pop();
    }
    ast.append_trailing_comments(node, vec![Comment::new(text, gap.unwrap_or_default())]);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Ast {
        parse_document(SupportedLanguage::Tsx, source)
            .unwrap_or_else(|err| panic!("parse failed: {err}"))
    }

    fn statements(ast: &Ast) -> Vec<NodeId> {
        ast.children(ast.root())
    }

    #[test]
    fn leading_comments_attach_to_the_next_statement() {
        let ast = parse("// first\n// second\nfoo();\n");
        let first = statements(&ast).first().copied();
        let statement = first.unwrap_or_else(|| panic!("no statement"));
        let comments: Vec<&str> = ast
            .leading_comments(statement)
            .iter()
            .map(Comment::text)
            .collect();
        assert_eq!(comments, ["// first", "// second"]);
        assert_eq!(ast.text(statement), "foo();");
    }

    #[test]
    fn same_line_comments_trail_the_previous_node() {
        let ast = parse("foo(); // done\nbar();\n");
        let first = statements(&ast).first().copied();
        let statement = first.unwrap_or_else(|| panic!("no statement"));
        let trailing = ast.trailing_comments(statement);
        assert_eq!(trailing.len(), 1);
        assert!(trailing.iter().all(|comment| comment.value() == " done"));
    }

    #[test]
    fn comments_between_tokens_stay_in_place() {
        let source = "foo(a, /* x */ b)";
        let ast = parse(source);
        assert_eq!(ast.to_source(), source);
    }

    #[test]
    fn invalid_sources_are_rejected_with_a_frame() {
        let result = parse_document(SupportedLanguage::Tsx, "const = ;");
        let message = result.map(|_| ()).map_err(|err| err.to_string());
        assert!(message.is_err_and(|text| text.contains("| const = ;")));
    }
}
