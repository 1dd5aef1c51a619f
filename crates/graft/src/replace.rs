//! Splicing generated nodes into the document.

use graft_syntax::kinds::OperandSlot;
use graft_syntax::{Ast, Backend, Comment, NodeId};
use tracing::debug;

use crate::error::GraftError;
use crate::replacement::{operator_of, parenthesize_for, terminate, to_expression, to_statement};
use crate::simple_replacements::SimpleReplacements;

/// Replaces the matched `paths` by `generated`.
///
/// The generated nodes take the place of the first path and the remaining
/// paths are pruned; with nothing generated every path is pruned. A path
/// that is the whole expression of an expression statement stands for the
/// statement. Generated nodes are coerced to the statement or expression
/// form the position needs, and the first path's leading comments and the
/// last path's trailing comments move onto the replacement.
///
/// # Errors
///
/// Fails when a generated node cannot take the position's form, or when a
/// path was already pruned.
pub(crate) fn replace_paths(
    doc: &mut Ast,
    simple: &mut SimpleReplacements,
    backend: &dyn Backend,
    paths: &[NodeId],
    generated: Vec<NodeId>,
) -> Result<(), GraftError> {
    let targets: Vec<NodeId> = paths.iter().map(|path| statement_target(doc, *path)).collect();
    let (Some(first), Some(last)) = (targets.first().copied(), targets.last().copied()) else {
        return Ok(());
    };
    let fitted = fit(doc, backend, first, generated)?;
    if hoist_line_comments(doc, backend, first, &fitted) {
        simple.bail();
    } else {
        record_simple(doc, simple, &targets, &fitted);
    }

    if let (Some(head), Some(tail)) = (fitted.first().copied(), fitted.last().copied()) {
        let leading = doc.take_leading_comments(first);
        let trailing = doc.take_trailing_comments(last);
        doc.prepend_leading_comments(head, leading);
        doc.append_trailing_comments(tail, trailing);
    }
    doc.replace(first, &fitted)?;
    for target in targets.iter().skip(1) {
        doc.prune(*target)?;
    }
    debug!(
        target: "graft::replace",
        paths = paths.len(),
        nodes = fitted.len(),
        "replaced match"
    );
    Ok(())
}

/// Prunes the matched `paths`.
///
/// # Errors
///
/// Fails when a path was already pruned.
pub(crate) fn remove_paths(
    doc: &mut Ast,
    simple: &mut SimpleReplacements,
    paths: &[NodeId],
) -> Result<(), GraftError> {
    simple.bail();
    for path in paths {
        let target = statement_target(doc, *path);
        doc.prune(target)?;
    }
    Ok(())
}

fn statement_target(doc: &Ast, path: NodeId) -> NodeId {
    doc.parent(path)
        .filter(|parent| {
            doc.kind(*parent) == "expression_statement" && doc.children(*parent).len() == 1
        })
        .unwrap_or(path)
}

/// Coerces generated nodes to the form `target` occupies.
fn fit(
    doc: &mut Ast,
    backend: &dyn Backend,
    target: NodeId,
    generated: Vec<NodeId>,
) -> Result<Vec<NodeId>, GraftError> {
    let kind = doc.kind(target);
    let mut fitted = Vec::with_capacity(generated.len());
    if backend.is_statement(kind) {
        let terminated = doc.has_token(target, ";");
        let semicolon = kind != "expression_statement" || terminated;
        for node in generated {
            let statement = to_statement(doc, backend, node, semicolon)?;
            if terminated {
                terminate(doc, statement);
            }
            fitted.push(statement);
        }
        return Ok(fitted);
    }
    let slot_parent = doc.parent(target);
    for node in generated {
        let expression = if backend.is_expression(kind) {
            to_expression(doc, node)
        } else {
            node
        };
        let Some(parent) = slot_parent else {
            fitted.push(expression);
            continue;
        };
        let operator = operator_of(doc, parent);
        let slot = OperandSlot {
            parent_kind: doc.kind(parent),
            parent_operator: operator.as_deref(),
            field: doc.field(target),
        };
        fitted.push(parenthesize_for(doc, expression, slot));
    }
    Ok(fitted)
}

/// Moves line comments leading generated expressions to the end of the
/// statement holding `target`, so they cannot cut the expression in two.
///
/// Returns whether any comment moved.
fn hoist_line_comments(
    doc: &mut Ast,
    backend: &dyn Backend,
    target: NodeId,
    fitted: &[NodeId],
) -> bool {
    if backend.is_statement(doc.kind(target)) {
        return false;
    }
    let Some(holder) = doc
        .ancestors(target)
        .into_iter()
        .find(|node| backend.is_statement(doc.kind(*node)))
    else {
        return false;
    };
    let mut moved = Vec::new();
    for node in fitted {
        let (line, block): (Vec<Comment>, Vec<Comment>) = doc
            .take_leading_comments(*node)
            .into_iter()
            .partition(Comment::is_line);
        doc.append_leading_comments(*node, block);
        moved.extend(
            line.iter()
                .map(|comment| Comment::new(comment.text().trim_end(), " ")),
        );
    }
    if moved.is_empty() {
        return false;
    }
    doc.append_trailing_comments(holder, moved);
    true
}

fn record_simple(doc: &Ast, simple: &mut SimpleReplacements, targets: &[NodeId], fitted: &[NodeId]) {
    let (&[target], &[node]) = (targets, fitted) else {
        simple.bail();
        return;
    };
    let Some(span) = doc.span(target) else {
        simple.bail();
        return;
    };
    simple.record(span, doc.text_with_comments(node));
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_syntax::TreeSitterBackend;

    fn first_expression(doc: &Ast) -> NodeId {
        doc.children(doc.root())
            .first()
            .and_then(|statement| doc.children(*statement).first().copied())
            .unwrap_or_else(|| panic!("no expression"))
    }

    #[test]
    fn replacing_an_expression_statement_keeps_its_semicolon() {
        let backend = TreeSitterBackend::default();
        let source = "foo(1);\nbar();";
        let mut doc = backend.parse(source).unwrap_or_else(|err| panic!("{err}"));
        let mut simple = SimpleReplacements::new(source);
        let call = first_expression(&doc);
        let replacement = doc.create_leaf("identifier", "baz");
        replace_paths(&mut doc, &mut simple, &backend, &[call], vec![replacement])
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(doc.to_source(), "baz;\nbar();");
        assert_eq!(simple.apply().as_deref(), Some("baz;\nbar();"));
    }

    #[test]
    fn empty_replacement_prunes() {
        let backend = TreeSitterBackend::default();
        let source = "foo(1);\nbar();";
        let mut doc = backend.parse(source).unwrap_or_else(|err| panic!("{err}"));
        let mut simple = SimpleReplacements::new(source);
        let call = first_expression(&doc);
        replace_paths(&mut doc, &mut simple, &backend, &[call], Vec::new())
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(doc.to_source(), "bar();");
        assert!(simple.is_bailed());
    }

    #[test]
    fn looser_replacements_are_parenthesised() {
        let backend = TreeSitterBackend::default();
        let source = "a * b;";
        let mut doc = backend.parse(source).unwrap_or_else(|err| panic!("{err}"));
        let mut simple = SimpleReplacements::new(source);
        let product = first_expression(&doc);
        let left = doc
            .child_by_field(product, "left")
            .unwrap_or_else(|| panic!("no left operand"));
        let sum = backend.parse("x + y").unwrap_or_else(|err| panic!("{err}"));
        let generated = doc.import_subtree(&sum, first_expression(&sum));
        replace_paths(&mut doc, &mut simple, &backend, &[left], vec![generated])
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(doc.to_source(), "(x + y) * b;");
    }

    #[test]
    fn replacing_a_declaration_keeps_its_semicolon() {
        let backend = TreeSitterBackend::default();
        let source = "const a = b;\n(c)();";
        let mut doc = backend.parse(source).unwrap_or_else(|err| panic!("{err}"));
        let mut simple = SimpleReplacements::new(source);
        let declaration = doc
            .children(doc.root())
            .first()
            .copied()
            .unwrap_or_else(|| panic!("no declaration"));
        let fresh = backend.parse("const a = d").unwrap_or_else(|err| panic!("{err}"));
        let statement = fresh.children(fresh.root()).first().copied();
        let generated = doc.import_subtree(&fresh, statement.unwrap_or_else(|| panic!("empty")));
        replace_paths(&mut doc, &mut simple, &backend, &[declaration], vec![generated])
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(doc.to_source(), "const a = d;\n(c)();");
        assert_eq!(simple.apply().as_deref(), Some("const a = d;\n(c)();"));
    }

    #[test]
    fn line_comments_before_inner_expressions_trail_the_statement() {
        let backend = TreeSitterBackend::default();
        let source = "const a = 1 + 2";
        let mut doc = backend.parse(source).unwrap_or_else(|err| panic!("{err}"));
        let mut simple = SimpleReplacements::new(source);
        let sum = doc
            .descendants(doc.root())
            .into_iter()
            .find(|node| doc.kind(*node) == "binary_expression")
            .unwrap_or_else(|| panic!("no sum"));
        let fresh = backend
            .parse("// swapped \n2 + 1")
            .unwrap_or_else(|err| panic!("{err}"));
        let statement = fresh.children(fresh.root()).first().copied();
        let generated = doc.import_subtree(&fresh, statement.unwrap_or_else(|| panic!("empty")));
        replace_paths(&mut doc, &mut simple, &backend, &[sum], vec![generated])
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(doc.to_source(), "const a = 2 + 1 // swapped");
        assert!(simple.is_bailed());
    }
}
