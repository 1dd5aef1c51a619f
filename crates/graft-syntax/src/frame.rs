//! Code frames for error messages.
//!
//! A frame shows a couple of lines around the offending position with a caret
//! under the failing column:
//!
//! ```text
//!   1 | const a = (
//! > 2 |   foo bar
//!     |       ^
//!   3 | )
//! ```

const CONTEXT_LINES: usize = 2;

/// Renders a code frame for the one-based `line` and `column` in `source`.
#[must_use]
pub fn code_frame(source: &str, line: u32, column: u32) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let target = usize::try_from(line)
        .unwrap_or(usize::MAX)
        .clamp(1, lines.len().max(1));
    let first = target.saturating_sub(CONTEXT_LINES).max(1);
    let last = target.saturating_add(CONTEXT_LINES).min(lines.len().max(1));
    let gutter = last.to_string().len();

    let mut frame = String::new();
    for number in first..=last {
        let text = lines.get(number.saturating_sub(1)).copied().unwrap_or_default();
        let marker = if number == target { '>' } else { ' ' };
        frame.push_str(&format!("{marker} {number:>gutter$} | {text}\n"));
        if number == target {
            let indent = usize::try_from(column).unwrap_or(1).saturating_sub(1);
            frame.push_str(&format!("  {:>gutter$} | {:indent$}^\n", "", ""));
        }
    }
    frame.truncate(frame.trim_end().len());
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_marks_the_failing_column() {
        let frame = code_frame("const a = (\n  foo bar\n)", 2, 7);
        insta::assert_snapshot!(frame, @r"
          1 | const a = (
        > 2 |   foo bar
            |       ^
          3 | )
        ");
    }

    #[test]
    fn frame_handles_single_line_sources() {
        let frame = code_frame("$$$", 1, 1);
        assert!(frame.starts_with("> 1 | $$$"));
        assert!(frame.ends_with('^'));
    }
}
