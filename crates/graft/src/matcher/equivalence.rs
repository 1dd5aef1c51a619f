//! Structural equivalence of captured nodes.
//!
//! A placeholder that occurs several times in a pattern must bind
//! equivalent nodes each time. Equivalence ignores formatting and comments,
//! compares string literals by value regardless of quotes, numbers by value,
//! and treats identifier-shaped JSX names (`a`, `a.b`, `a:b`) by their
//! normalised spelling.

use graft_syntax::literal::{cooked_string, numeric_value};
use graft_syntax::{Ast, NodeId};

use super::{significant_children, significant_tokens};

/// Returns whether two nodes, possibly from different arenas, are
/// equivalent.
pub(crate) fn equivalent(left_ast: &Ast, left: NodeId, right_ast: &Ast, right: NodeId) -> bool {
    if std::ptr::eq(left_ast, right_ast) && left == right {
        return true;
    }
    let left_inner = transparent_inner(left_ast, left);
    let right_inner = transparent_inner(right_ast, right);
    if left_inner != left || right_inner != right {
        return equivalent(left_ast, left_inner, right_ast, right_inner);
    }
    if let (Some(left_value), Some(right_value)) =
        (cooked_string(left_ast, left), cooked_string(right_ast, right))
    {
        return left_value == right_value;
    }
    if let (Some(left_name), Some(right_name)) =
        (jsx_name(left_ast, left), jsx_name(right_ast, right))
    {
        return left_name == right_name;
    }
    let kind = left_ast.kind(left);
    if kind != right_ast.kind(right) {
        return false;
    }
    if kind == "number" {
        return numeric_value(&left_ast.text(left)) == numeric_value(&right_ast.text(right));
    }
    let left_children = significant_children(left_ast, left);
    let right_children = significant_children(right_ast, right);
    if left_children.is_empty() && right_children.is_empty() {
        return left_ast.text(left).trim() == right_ast.text(right).trim();
    }
    left_children.len() == right_children.len()
        && significant_tokens(left_ast, left) == significant_tokens(right_ast, right)
        && left_children
            .iter()
            .zip(&right_children)
            .all(|((left_field, left_child), (right_field, right_child))| {
                left_field == right_field
                    && equivalent(left_ast, *left_child, right_ast, *right_child)
            })
}

/// Looks through wrappers that add nothing but a terminator: a bare
/// parameter or an expression statement.
fn transparent_inner(ast: &Ast, node: NodeId) -> NodeId {
    if !matches!(ast.kind(node), "required_parameter" | "expression_statement")
        || !significant_tokens(ast, node).is_empty()
    {
        return node;
    }
    let fields = ast.fields(node);
    match fields.as_slice() {
        &[(_, only)] => only,
        _ => node,
    }
}

/// Normalised spelling of an identifier-shaped JSX name.
fn jsx_name(ast: &Ast, node: NodeId) -> Option<String> {
    let separator = match ast.kind(node) {
        "identifier" | "property_identifier" => {
            return ast.leaf_text(node).map(str::to_owned);
        }
        "member_expression" | "nested_identifier" => ".",
        "jsx_namespace_name" => ":",
        _ => return None,
    };
    let tokens = ast.tokens(node);
    if tokens.iter().any(|token| *token != separator) {
        return None;
    }
    let parts: Option<Vec<String>> = ast
        .children(node)
        .into_iter()
        .map(|child| jsx_name(ast, child))
        .collect();
    parts.map(|names| names.join(separator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_syntax::SupportedLanguage;
    use rstest::rstest;

    fn expression(ast: &Ast, index: usize) -> NodeId {
        let statement = ast
            .children(ast.root())
            .get(index)
            .copied()
            .unwrap_or_else(|| panic!("missing statement {index}"));
        ast.children(statement)
            .first()
            .copied()
            .unwrap_or_else(|| panic!("empty statement {index}"))
    }

    #[rstest]
    #[case("'a';\n\"a\";", true)]
    #[case("'a';\n`a`;", true)]
    #[case("'a';\n'b';", false)]
    #[case("0x10;\n16;", true)]
    #[case("foo( 1 ,2 );\nfoo(1, 2);", true)]
    #[case("foo(1, 2);\nfoo(2, 1);", false)]
    #[case("a.b;\na.b;", true)]
    #[case("a.b;\na?.b;", false)]
    #[case("a + b;\na - b;", false)]
    #[case("function f(a) {}\na;", false)]
    fn equivalence_ignores_spelling(#[case] source: &str, #[case] expected: bool) {
        let ast = Ast::parse(SupportedLanguage::Tsx, source).unwrap_or_else(|err| panic!("{err}"));
        let left = expression(&ast, 0);
        let right = expression(&ast, 1);
        assert_eq!(equivalent(&ast, left, &ast, right), expected);
    }
}
