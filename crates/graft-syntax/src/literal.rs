//! Values of string, template, regex and numeric literals.
//!
//! Matching compares literals by meaning rather than spelling: `'a'`, `"a"`
//! and `` `a` `` are the same string, `0x10` and `16` the same number, and
//! `/x/gi` the same regex as `/x/ig`. Replacement needs the reverse
//! direction: turning a cooked value back into source text for a chosen
//! quote style.

use crate::tree::{Ast, NodeId};

/// Quote style of a generated string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    /// `'...'`
    Single,
    /// `"..."`
    Double,
    /// `` `...` ``
    Backtick,
}

impl Quote {
    /// Detects the quote style of a string or template literal node.
    #[must_use]
    pub fn of(ast: &Ast, id: NodeId) -> Option<Self> {
        match ast.kind(id) {
            "template_string" => Some(Self::Backtick),
            "string" => match ast.tokens(id).first().copied() {
                Some("\"") => Some(Self::Double),
                Some("'") => Some(Self::Single),
                _ => None,
            },
            _ => None,
        }
    }

    const fn delimiter(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
            Self::Backtick => '`',
        }
    }
}

/// Numeric value of a number literal, comparable across spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericValue {
    /// IEEE-754 bits of an ordinary number.
    Number(u64),
    /// Decimal digits of a `BigInt` literal.
    BigInt(String),
}

/// Returns the cooked value of a string, or of a template literal without
/// substitutions.
///
/// Returns `None` for any other node, including templates with `${...}`.
#[must_use]
pub fn cooked_string(ast: &Ast, id: NodeId) -> Option<String> {
    if !matches!(ast.kind(id), "string" | "template_string") {
        return None;
    }
    let mut value = String::new();
    for child in ast.children(id) {
        let text = ast.text(child);
        match ast.kind(child) {
            "string_fragment" | "template_chars" | "unescaped_single_string_fragment"
            | "unescaped_double_string_fragment" => value.push_str(&text),
            "escape_sequence" => value.push_str(&unescape(&text)),
            _ => return None,
        }
    }
    Some(value)
}

/// Returns the raw source content between the delimiters of a string or
/// template literal.
#[must_use]
pub fn raw_string_content(ast: &Ast, id: NodeId) -> Option<String> {
    if !matches!(ast.kind(id), "string" | "template_string") {
        return None;
    }
    let text = ast.text(id);
    let mut chars = text.chars();
    chars.next()?;
    chars.next_back()?;
    Some(chars.as_str().to_owned())
}

/// Decodes one escape sequence such as `\n`, `\x41` or `\u{1F600}`.
#[must_use]
pub fn unescape(sequence: &str) -> String {
    let Some(body) = sequence.strip_prefix('\\') else {
        return sequence.to_owned();
    };
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest = chars.as_str();
    match first {
        'n' => "\n".to_owned(),
        't' => "\t".to_owned(),
        'r' => "\r".to_owned(),
        'b' => "\u{8}".to_owned(),
        'f' => "\u{c}".to_owned(),
        'v' => "\u{b}".to_owned(),
        '0' if rest.is_empty() => "\0".to_owned(),
        '\n' | '\r' | '\u{2028}' | '\u{2029}' => String::new(),
        'x' => hex_char(rest).unwrap_or_else(|| sequence.to_owned()),
        'u' => {
            let digits = rest
                .strip_prefix('{')
                .and_then(|inner| inner.strip_suffix('}'))
                .unwrap_or(rest);
            hex_char(digits).unwrap_or_else(|| sequence.to_owned())
        }
        other => other.to_string(),
    }
}

fn hex_char(digits: &str) -> Option<String> {
    let code = u32::from_str_radix(digits, 16).ok()?;
    char::from_u32(code).map(String::from)
}

/// Renders `value` as a literal in the given quote style.
#[must_use]
pub fn quote_string(value: &str, quote: Quote) -> String {
    let delimiter = quote.delimiter();
    let mut out = String::with_capacity(value.len().saturating_add(2));
    out.push(delimiter);
    out.push_str(&escape_content(value, quote));
    out.push(delimiter);
    out
}

/// Escapes `value` for use between the delimiters of `quote`.
#[must_use]
pub fn escape_content(value: &str, quote: Quote) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '$' if quote == Quote::Backtick && chars.peek() == Some(&'{') => out.push_str("\\$"),
            '\n' if quote != Quote::Backtick => out.push_str("\\n"),
            '\r' if quote != Quote::Backtick => out.push_str("\\r"),
            c if c == quote.delimiter() => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Returns the pattern and sorted flags of a regex literal.
#[must_use]
pub fn regex_parts(ast: &Ast, id: NodeId) -> Option<(String, String)> {
    if ast.kind(id) != "regex" {
        return None;
    }
    let pattern = ast.child_by_field(id, "pattern").map(|node| ast.text(node))?;
    let mut flags: Vec<char> = ast
        .child_by_field(id, "flags")
        .map(|node| ast.text(node))
        .unwrap_or_default()
        .chars()
        .collect();
    flags.sort_unstable();
    Some((pattern, flags.into_iter().collect()))
}

/// Parses the value of a numeric literal.
///
/// Handles separators, hexadecimal, octal and binary prefixes and `BigInt`
/// suffixes.
#[must_use]
pub fn numeric_value(text: &str) -> Option<NumericValue> {
    let cleaned: String = text.chars().filter(|ch| *ch != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    if let Some(digits) = lower.strip_suffix('n') {
        let value = radix_integer(digits).or_else(|| digits.parse::<u128>().ok())?;
        return Some(NumericValue::BigInt(value.to_string()));
    }
    if let Some(value) = radix_integer(&lower) {
        return decimal_bits(&value.to_string());
    }
    decimal_bits(&lower)
}

fn radix_integer(text: &str) -> Option<u128> {
    let (radix, digits) = if let Some(rest) = text.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = text.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = text.strip_prefix("0b") {
        (2, rest)
    } else if text.len() > 1 && text.starts_with('0') && text.chars().all(|c| c.is_ascii_digit()) {
        // Legacy octal such as `017`.
        (8, text.get(1..)?)
    } else {
        return None;
    };
    u128::from_str_radix(digits, radix).ok()
}

fn decimal_bits(text: &str) -> Option<NumericValue> {
    text.parse::<f64>()
        .ok()
        .map(|value| NumericValue::Number(value.to_bits()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("16", "0x10")]
    #[case("8", "0o10")]
    #[case("1000", "1_000")]
    #[case("1.5", "15e-1")]
    #[case("15", "017")]
    fn numbers_compare_by_value(#[case] left: &str, #[case] right: &str) {
        assert_eq!(numeric_value(left), numeric_value(right));
    }

    #[test]
    fn bigints_differ_from_numbers() {
        assert_ne!(numeric_value("1n"), numeric_value("1"));
        assert_eq!(numeric_value("0x10n"), numeric_value("16n"));
    }

    #[rstest]
    #[case("\\n", "\n")]
    #[case("\\x41", "A")]
    #[case("\\u0042", "B")]
    #[case("\\u{1F600}", "\u{1F600}")]
    #[case("\\'", "'")]
    #[case("\\q", "q")]
    fn escapes_decode(#[case] sequence: &str, #[case] expected: &str) {
        assert_eq!(unescape(sequence), expected);
    }

    #[rstest]
    #[case("it's", Quote::Single, "'it\\'s'")]
    #[case("it's", Quote::Double, "\"it's\"")]
    #[case("a`${b}", Quote::Backtick, "`a\\`\\${b}`")]
    #[case("line\nbreak", Quote::Single, "'line\\nbreak'")]
    fn strings_are_quoted_for_their_delimiter(
        #[case] value: &str,
        #[case] quote: Quote,
        #[case] expected: &str,
    ) {
        assert_eq!(quote_string(value, quote), expected);
    }
}
