//! Text-splice fast path for replacements.
//!
//! While every replacement swaps one original node for one generated node,
//! the edits can be applied to the original source text directly, leaving
//! everything else byte-for-byte untouched. Any replacement of another
//! shape sets a one-way bail latch and the caller falls back to
//! regenerating the document from the tree.

use std::ops::Range;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    range: Range<usize>,
    text: String,
}

/// Accumulated source edits for one document.
#[derive(Debug, Clone)]
pub struct SimpleReplacements {
    source: String,
    edits: Vec<Edit>,
    bailed: bool,
}

impl SimpleReplacements {
    /// Starts recording edits against `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edits: Vec::new(),
            bailed: false,
        }
    }

    /// Records that `range` of the original source now reads `text`.
    ///
    /// Edits inside `range` are superseded. An edit that partially overlaps
    /// `range` cannot be represented and bails.
    pub fn record(&mut self, range: Range<usize>, text: String) {
        if self.bailed {
            return;
        }
        if range.end > self.source.len() || range.start > range.end {
            self.bail();
            return;
        }
        self.edits
            .retain(|edit| !(range.start <= edit.range.start && edit.range.end <= range.end));
        let overlaps = self
            .edits
            .iter()
            .any(|edit| edit.range.start < range.end && range.start < edit.range.end);
        if overlaps {
            self.bail();
            return;
        }
        self.edits.push(Edit { range, text });
    }

    /// Gives up on the fast path for the rest of the transform.
    pub fn bail(&mut self) {
        if !self.bailed {
            debug!(target: "graft::replace", "simple replacement fast path bailed");
        }
        self.bailed = true;
        self.edits.clear();
    }

    /// Whether the fast path has been abandoned.
    #[must_use]
    pub const fn is_bailed(&self) -> bool {
        self.bailed
    }

    /// Number of pending edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether no edit was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies the recorded edits to the original source.
    ///
    /// Returns `None` once bailed.
    #[must_use]
    pub fn apply(&self) -> Option<String> {
        if self.bailed {
            return None;
        }
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        edits.sort_by_key(|edit| edit.range.start);
        let mut output = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for edit in edits {
            output.push_str(self.source.get(cursor..edit.range.start)?);
            output.push_str(&edit.text);
            cursor = edit.range.end;
        }
        output.push_str(self.source.get(cursor..)?);
        Some(output)
    }
}
