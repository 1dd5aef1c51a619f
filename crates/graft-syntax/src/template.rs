//! Parsing of pattern snippets.
//!
//! A pattern is a small piece of source that may be a list of statements, a
//! single statement, or an expression. Statements are tried first; a single
//! expression statement is unwrapped to its expression, and sources that do
//! not parse as statements (object literals, for instance) are retried as a
//! parenthesised expression.
//!
//! A node carrying the empty block comment `/**/` as a leading comment is
//! extracted as the whole pattern, which lets a pattern name a node that
//! cannot stand on its own:
//!
//! ```text
//! class A { /**/ foo() {} }
//! ```

use crate::error::SyntaxError;
use crate::frame::code_frame;
use crate::language::SupportedLanguage;
use crate::lower::lower;
use crate::parser::{Parser, SyntaxErrorInfo};
use crate::tree::{Ast, NodeId};

/// A parsed pattern: an arena plus the pattern's root nodes.
///
/// Roots have no parent inside the arena.
#[derive(Debug, Clone)]
pub struct PatternTree {
    ast: Ast,
    roots: Vec<NodeId>,
    source: String,
}

impl PatternTree {
    /// Builds a pattern from arena roots.
    #[must_use]
    pub fn new(ast: Ast, roots: Vec<NodeId>, source: impl Into<String>) -> Self {
        Self {
            ast,
            roots,
            source: source.into(),
        }
    }

    /// Arena holding the pattern nodes.
    #[must_use]
    pub const fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Pattern roots in source order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Source text the pattern was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns whether the pattern is a single node.
    #[must_use]
    pub const fn is_single(&self) -> bool {
        self.roots.len() == 1
    }
}

/// Parses a pattern snippet.
///
/// # Errors
///
/// Returns [`SyntaxError::PatternSyntax`] with a code frame when the
/// source parses neither as statements nor as an expression.
pub fn parse_pattern(language: SupportedLanguage, source: &str) -> Result<PatternTree, SyntaxError> {
    let mut parser = Parser::new(language)?;
    let result = parser.parse(source)?;
    let tree = match result.first_error() {
        None => from_statements(&mut parser, lower(&result), source)?,
        Some(error) => parse_expression(&mut parser, source)?
            .ok_or_else(|| pattern_syntax_error(source, &error))?,
    };
    Ok(extract_marker(tree))
}

fn pattern_syntax_error(source: &str, error: &SyntaxErrorInfo) -> SyntaxError {
    SyntaxError::pattern_syntax(
        format!("{} at {}:{}", error.message, error.line, error.column),
        code_frame(source, error.line, error.column),
    )
}

fn from_statements(
    parser: &mut Parser,
    mut ast: Ast,
    source: &str,
) -> Result<PatternTree, SyntaxError> {
    let statements = ast.children(ast.root());
    match statements.as_slice() {
        [] => parse_expression(parser, source)?.ok_or_else(|| {
            SyntaxError::pattern_syntax("pattern is empty", code_frame(source, 1, 1))
        }),
        [block] if ast.kind(*block) == "statement_block" => {
            if let Some(tree) = parse_expression(parser, source)? {
                return Ok(tree);
            }
            let root = ast.clone_subtree(*block)?;
            Ok(PatternTree::new(ast, vec![root], source))
        }
        [statement] if ast.kind(*statement) == "expression_statement" => {
            let root = unwrap_expression_statement(&mut ast, *statement)?;
            Ok(PatternTree::new(ast, vec![root], source))
        }
        many => {
            let mut roots = Vec::with_capacity(many.len());
            for statement in many {
                roots.push(ast.clone_subtree(*statement)?);
            }
            Ok(PatternTree::new(ast, roots, source))
        }
    }
}

/// Copies the expression out of an expression statement, carrying the
/// statement's comments over to the copy.
fn unwrap_expression_statement(ast: &mut Ast, statement: NodeId) -> Result<NodeId, SyntaxError> {
    let Some(expression) = ast.children(statement).first().copied() else {
        return ast.clone_subtree(statement);
    };
    let root = ast.clone_subtree(expression)?;
    let leading = ast.leading_comments(statement).to_vec();
    let trailing = ast.trailing_comments(statement).to_vec();
    ast.prepend_leading_comments(root, leading);
    ast.append_trailing_comments(root, trailing);
    Ok(root)
}

/// Parses `source` as a parenthesised expression.
///
/// Returns `Ok(None)` when that parse has errors too.
fn parse_expression(parser: &mut Parser, source: &str) -> Result<Option<PatternTree>, SyntaxError> {
    let wrapped = format!("({source}\n)");
    let result = parser.parse(&wrapped)?;
    if result.has_errors() {
        return Ok(None);
    }
    let mut ast = lower(&result);
    let inner = ast
        .children(ast.root())
        .first()
        .copied()
        .filter(|statement| ast.kind(*statement) == "expression_statement")
        .and_then(|statement| ast.children(statement).first().copied())
        .filter(|parenthesized| ast.kind(*parenthesized) == "parenthesized_expression")
        .and_then(|parenthesized| ast.children(parenthesized).first().copied());
    let Some(expression) = inner else {
        return Ok(None);
    };
    let root = ast.clone_subtree(expression)?;
    Ok(Some(PatternTree::new(ast, vec![root], source)))
}

fn extract_marker(mut tree: PatternTree) -> PatternTree {
    let marked = tree
        .roots
        .iter()
        .flat_map(|root| tree.ast.descendants(*root))
        .find(|node| {
            tree.ast
                .leading_comments(*node)
                .iter()
                .any(crate::tree::Comment::is_empty_block)
        });
    let Some(node) = marked else {
        return tree;
    };
    let Ok(root) = tree.ast.clone_subtree(node) else {
        return tree;
    };
    let kept: Vec<_> = tree
        .ast
        .take_leading_comments(root)
        .into_iter()
        .filter(|comment| !comment.is_empty_block())
        .collect();
    tree.ast.append_leading_comments(root, kept);
    tree.roots = vec![root];
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pattern(source: &str) -> PatternTree {
        parse_pattern(SupportedLanguage::Tsx, source)
            .unwrap_or_else(|err| panic!("pattern failed: {err}"))
    }

    fn root_kinds(tree: &PatternTree) -> Vec<&'static str> {
        tree.roots().iter().map(|root| tree.ast().kind(*root)).collect()
    }

    #[rstest]
    #[case("$a + $b", vec!["binary_expression"])]
    #[case("const x = 1", vec!["lexical_declaration"])]
    #[case("foo(); bar();", vec!["expression_statement", "expression_statement"])]
    #[case("{ a: 1, ...$$rest }", vec!["object"])]
    #[case("{ $$a, c, $b, e: 5, f }", vec!["object"])]
    #[case("{ foo(); }", vec!["statement_block"])]
    #[case("class A { /**/ foo() {} }", vec!["method_definition"])]
    fn patterns_parse_to_expected_roots(#[case] source: &str, #[case] expected: Vec<&str>) {
        assert_eq!(root_kinds(&pattern(source)), expected);
    }

    #[test]
    fn unwrapped_expressions_keep_statement_comments() {
        let tree = pattern("// this is a test \n$b + $a");
        let root = tree.roots().first().copied().unwrap_or_else(|| panic!("no root"));
        let comments = tree.ast().leading_comments(root);
        assert_eq!(comments.len(), 1);
        assert_eq!(tree.ast().text(root), "$b + $a");
        assert_eq!(tree.ast().parent(root), None);
    }

    #[test]
    fn marker_comment_is_removed_from_the_extracted_node() {
        let tree = pattern("class A { /**/ foo() {} }");
        let root = tree.roots().first().copied().unwrap_or_else(|| panic!("no root"));
        assert!(tree.ast().leading_comments(root).is_empty());
        assert_eq!(tree.ast().text(root), "foo() {}");
    }

    #[test]
    fn invalid_patterns_report_a_framed_syntax_error() {
        let result = parse_pattern(SupportedLanguage::Tsx, "foo(");
        let Err(SyntaxError::PatternSyntax { frame, .. }) = result else {
            panic!("expected a pattern syntax error");
        };
        assert!(frame.contains("foo("));
    }
}
