//! Coercions between statements and expressions, and parenthesisation.

use graft_syntax::kinds::{OperandSlot, needs_parens, takes_semicolon};
use graft_syntax::{Ast, Backend, NodeId, Part};

use crate::error::GraftError;

/// Converts a generated node so it can stand where a statement is required.
///
/// Named class and function expressions become declarations, other
/// expressions are wrapped in an expression statement, and statements are
/// returned unchanged.
///
/// # Errors
///
/// Returns [`GraftError::PatternPosition`] for nodes that are neither
/// statements nor expressions.
pub(crate) fn to_statement(
    doc: &mut Ast,
    backend: &dyn Backend,
    node: NodeId,
    semicolon: bool,
) -> Result<NodeId, GraftError> {
    let kind = doc.kind(node);
    let declaration = match kind {
        "class" => Some("class_declaration"),
        "function_expression" | "function" => Some("function_declaration"),
        "generator_function" => Some("generator_function_declaration"),
        _ => None,
    };
    if let Some(declaration) = declaration
        && doc.child_by_field(node, "name").is_some()
    {
        doc.set_kind(node, declaration);
        return Ok(node);
    }
    if backend.is_statement(kind) {
        return Ok(node);
    }
    if !backend.is_expression(kind) {
        return Err(GraftError::pattern_position(format!(
            "converting {kind} to statement isn't supported"
        )));
    }
    let inner = if ambiguous_at_statement_start(kind) {
        wrap_in_parens(doc, node)
    } else {
        node
    };
    let leading = doc.take_leading_comments(inner);
    let trailing = doc.take_trailing_comments(inner);
    let mut parts = vec![Part::Child {
        field: None,
        node: inner,
    }];
    if semicolon {
        parts.push(Part::Token(";".to_owned()));
    }
    let statement = doc.create_node("expression_statement", parts);
    doc.append_leading_comments(statement, leading);
    doc.append_trailing_comments(statement, trailing);
    Ok(statement)
}

/// Ends a generated statement with `;` when its kind takes one and it
/// lacks it.
pub(crate) fn terminate(doc: &mut Ast, statement: NodeId) {
    let kind = doc.kind(statement);
    let terminated = match kind {
        "export_statement" => doc.child_by_field(statement, "declaration").is_none(),
        _ => takes_semicolon(kind),
    };
    if terminated && !doc.has_token(statement, ";") {
        doc.push_token(statement, ";");
    }
}

/// Expressions that a statement cannot begin with unparenthesised.
fn ambiguous_at_statement_start(kind: &str) -> bool {
    matches!(
        kind,
        "object" | "function_expression" | "function" | "class" | "generator_function"
    )
}

/// Converts a generated node so it can stand where an expression is
/// required.
///
/// Expression statements are unwrapped and declarations become the
/// matching expressions; anything else is returned unchanged.
pub(crate) fn to_expression(doc: &mut Ast, node: NodeId) -> NodeId {
    match doc.kind(node) {
        "expression_statement" => {
            let Some(expression) = doc.children(node).first().copied() else {
                return node;
            };
            let leading = doc.take_leading_comments(node);
            let trailing = doc.take_trailing_comments(node);
            doc.prepend_leading_comments(expression, leading);
            doc.append_trailing_comments(expression, trailing);
            expression
        }
        "class_declaration" => {
            doc.set_kind(node, "class");
            node
        }
        "function_declaration" => {
            doc.set_kind(node, "function_expression");
            node
        }
        "generator_function_declaration" => {
            doc.set_kind(node, "generator_function");
            node
        }
        _ => node,
    }
}

/// Wraps `node` in parentheses when it binds more loosely than the slot it
/// is about to fill.
pub(crate) fn parenthesize_for(doc: &mut Ast, node: NodeId, slot: OperandSlot<'_>) -> NodeId {
    let kind = doc.kind(node);
    let operator = operator_of(doc, node);
    if needs_parens(slot, kind, operator.as_deref()) {
        wrap_in_parens(doc, node)
    } else {
        node
    }
}

/// Operator token of a binary expression.
pub(crate) fn operator_of(ast: &Ast, node: NodeId) -> Option<String> {
    if ast.kind(node) != "binary_expression" {
        return None;
    }
    ast.tokens(node).first().map(|token| (*token).to_owned())
}

fn wrap_in_parens(doc: &mut Ast, node: NodeId) -> NodeId {
    let leading = doc.take_leading_comments(node);
    let trailing = doc.take_trailing_comments(node);
    let wrapped = doc.create_node(
        "parenthesized_expression",
        vec![
            Part::Token("(".to_owned()),
            Part::Child { field: None, node },
            Part::Token(")".to_owned()),
        ],
    );
    doc.append_leading_comments(wrapped, leading);
    doc.append_trailing_comments(wrapped, trailing);
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_syntax::{SupportedLanguage, TreeSitterBackend};

    fn parse_expression(doc: &mut Ast, source: &str) -> NodeId {
        let parsed = Ast::parse(SupportedLanguage::Tsx, source).unwrap_or_else(|err| panic!("{err}"));
        let expression = parsed
            .children(parsed.root())
            .first()
            .and_then(|statement| parsed.children(*statement).first().copied())
            .unwrap_or_else(|| panic!("no expression in {source}"));
        doc.import_subtree(&parsed, expression)
    }

    fn empty_doc() -> Ast {
        Ast::parse(SupportedLanguage::Tsx, "").unwrap_or_else(|err| panic!("{err}"))
    }

    #[test]
    fn expressions_become_statements() {
        let backend = TreeSitterBackend::default();
        let mut doc = empty_doc();
        let call = parse_expression(&mut doc, "foo(1)");
        let statement = to_statement(&mut doc, &backend, call, true)
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(doc.kind(statement), "expression_statement");
        assert_eq!(doc.text(statement), "foo(1);");
    }

    #[test]
    fn named_class_expressions_become_declarations() {
        let backend = TreeSitterBackend::default();
        let mut doc = empty_doc();
        let class = parse_expression(&mut doc, "(class A {})");
        let inner = doc
            .children(class)
            .first()
            .copied()
            .unwrap_or_else(|| panic!("no class"));
        let statement = to_statement(&mut doc, &backend, inner, false)
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(doc.kind(statement), "class_declaration");
    }

    #[test]
    fn objects_are_parenthesised_as_statements() {
        let backend = TreeSitterBackend::default();
        let mut doc = empty_doc();
        let object = parse_expression(&mut doc, "x = { a: 1 }");
        let value = doc
            .child_by_field(object, "right")
            .unwrap_or_else(|| panic!("no object"));
        let copy = doc
            .clone_subtree(value)
            .unwrap_or_else(|err| panic!("{err}"));
        let statement = to_statement(&mut doc, &backend, copy, false)
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(doc.text(statement), "({ a: 1 })");
    }

    #[test]
    fn unsupported_nodes_are_rejected() {
        let backend = TreeSitterBackend::default();
        let mut doc = empty_doc();
        let pair = doc.create_leaf("pair", "a: 1");
        let result = to_statement(&mut doc, &backend, pair, false);
        assert!(matches!(
            result,
            Err(GraftError::PatternPosition { message }) if message.contains("pair")
        ));
    }

    #[test]
    fn looser_operands_are_parenthesised() {
        let mut doc = empty_doc();
        let sum = parse_expression(&mut doc, "a + b");
        let slot = OperandSlot {
            parent_kind: "binary_expression",
            parent_operator: Some("*"),
            field: Some("left"),
        };
        let wrapped = parenthesize_for(&mut doc, sum, slot);
        assert_eq!(doc.text(wrapped), "(a + b)");
    }
}
