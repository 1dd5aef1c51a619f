//! Code generation by concatenating node parts.

use crate::tree::{Ast, Comment, NodeId, Part};

/// Accumulates the text of nodes.
///
/// A `//` comment must be followed by a line break, so after emitting one the
/// printer inserts a newline before the next text that does not begin with
/// one.
pub(crate) struct Printer<'a> {
    ast: &'a Ast,
    out: String,
    after_line_comment: bool,
}

impl<'a> Printer<'a> {
    pub(crate) const fn new(ast: &'a Ast) -> Self {
        Self {
            ast,
            out: String::new(),
            after_line_comment: false,
        }
    }

    pub(crate) fn node(&mut self, id: NodeId, with_comments: bool) {
        if with_comments {
            for comment in self.ast.leading_comments(id) {
                self.comment(comment);
                self.raw(comment.gap());
            }
        }
        for part in self.ast.parts(id) {
            match part {
                Part::Token(text) | Part::Trivia(text) => self.raw(text),
                Part::Child { node, .. } => self.node(*node, true),
            }
        }
        if with_comments {
            for comment in self.ast.trailing_comments(id) {
                self.raw(comment.gap());
                self.comment(comment);
            }
        }
    }

    fn comment(&mut self, comment: &Comment) {
        self.raw(comment.text());
        if comment.is_line() {
            self.after_line_comment = true;
        }
    }

    pub(crate) fn raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.after_line_comment {
            if !text.starts_with('\n') && !text.starts_with("\r\n") {
                self.out.push('\n');
            }
            self.after_line_comment = false;
        }
        self.out.push_str(text);
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}
