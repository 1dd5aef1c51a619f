//! One-based positions for messages and match reports.
//!
//! Tree-sitter counts rows and columns from zero; everything user-facing in
//! graft counts from one. Columns are byte offsets within the line.

use std::ops::Range;

/// Shifts a Tree-sitter point to one-based `(line, column)`.
#[must_use]
pub(crate) fn point_to_one_based(point: tree_sitter::Point) -> (u32, u32) {
    let one_based =
        |zero_based: usize| u32::try_from(zero_based.saturating_add(1)).unwrap_or(u32::MAX);
    (one_based(point.row), one_based(point.column))
}

/// Converts a byte offset into one-based line and column numbers.
///
/// Columns count bytes, matching Tree-sitter's convention.
#[must_use]
pub fn offset_to_one_based(source: &str, offset: usize) -> (u32, u32) {
    let clamped = offset.min(source.len());
    let before = source.get(..clamped).unwrap_or(source);
    let row = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |index| index.saturating_add(1));
    point_to_one_based(tree_sitter::Point {
        row,
        column: clamped.saturating_sub(line_start),
    })
}

/// Start and end of a node in the source it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Byte range of the node.
    pub byte_range: Range<usize>,
    /// One-based line of the first byte.
    pub start_line: u32,
    /// One-based column of the first byte.
    pub start_column: u32,
    /// One-based line of the last byte.
    pub end_line: u32,
    /// One-based column just past the last byte.
    pub end_column: u32,
}

impl Location {
    /// Computes the location of `byte_range` within `source`.
    #[must_use]
    pub fn from_range(source: &str, byte_range: Range<usize>) -> Self {
        let (start_line, start_column) = offset_to_one_based(source, byte_range.start);
        let (end_line, end_column) = offset_to_one_based(source, byte_range.end);
        Self {
            byte_range,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }
}
