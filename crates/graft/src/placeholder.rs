//! Recognition of placeholder identifiers.
//!
//! A placeholder is an identifier made of one to three `$` sigils followed
//! by a name:
//!
//! | Text       | Meaning                                   |
//! |------------|-------------------------------------------|
//! | `$a`       | captures one node                         |
//! | `$$a`      | captures a run of sibling nodes           |
//! | `$$$a`     | captures the remaining sibling nodes      |
//! | `$_`, `$_a`| wildcard of the same arity, never bound   |
//! | `$_$a`     | the literal identifier `$a`               |
//!
//! Names consist of ASCII letters, digits and underscores and start with a
//! letter or digit.

/// Arity of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// `$name`: exactly one node.
    Node,
    /// `$$name`: zero or more consecutive siblings.
    Array,
    /// `$$$name`: zero or more consecutive siblings, preferring the longest
    /// run.
    Rest,
}

impl PlaceholderKind {
    /// Number of `$` sigils that introduce this kind.
    #[must_use]
    pub const fn sigils(self) -> usize {
        match self {
            Self::Node => 1,
            Self::Array => 2,
            Self::Rest => 3,
        }
    }

    /// Returns whether the placeholder stands for a run of siblings.
    #[must_use]
    pub const fn is_splice(self) -> bool {
        matches!(self, Self::Array | Self::Rest)
    }
}

/// A recognised placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    kind: PlaceholderKind,
    name: Option<String>,
    text: String,
}

impl Placeholder {
    /// Arity of the placeholder.
    #[must_use]
    pub const fn kind(&self) -> PlaceholderKind {
        self.kind
    }

    /// Bare name, or `None` for wildcards.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Full placeholder text including sigils.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Key under which the capture is stored, or `None` for wildcards.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.name.as_ref().map(|_| self.text.as_str())
    }

    /// Returns whether the placeholder matches without binding.
    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        self.name.is_none()
    }
}

/// Classifies identifier text as a placeholder.
///
/// Returns `None` for ordinary identifiers and for escaped literals such as
/// `$_$foo`.
#[must_use]
pub fn classify(text: &str) -> Option<Placeholder> {
    let sigils = text.chars().take_while(|ch| *ch == '$').count();
    let kind = match sigils {
        1 => PlaceholderKind::Node,
        2 => PlaceholderKind::Array,
        3 => PlaceholderKind::Rest,
        _ => return None,
    };
    let rest = text.get(sigils..)?;
    if let Some(after) = rest.strip_prefix('_') {
        if !is_name_tail(after) {
            return None;
        }
        return Some(Placeholder {
            kind,
            name: None,
            text: text.to_owned(),
        });
    }
    let first = rest.chars().next()?;
    if !first.is_ascii_alphanumeric() || !is_name_tail(rest) {
        return None;
    }
    Some(Placeholder {
        kind,
        name: Some(rest.to_owned()),
        text: text.to_owned(),
    })
}

fn is_name_tail(text: &str) -> bool {
    text.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Classifies the content of a string literal.
///
/// Only single-node placeholders are meaningful inside strings.
#[must_use]
pub fn classify_string(content: &str) -> Option<Placeholder> {
    classify(content).filter(|placeholder| placeholder.kind() == PlaceholderKind::Node)
}

/// Returns the literal identifier an escaped pattern identifier stands for.
///
/// `$_$foo` becomes `$foo`; any other text is returned unchanged.
#[must_use]
pub fn unescape_identifier(text: &str) -> &str {
    match text.strip_prefix("$_") {
        Some(rest) if rest.starts_with('$') => rest,
        _ => text,
    }
}

/// Escapes an identifier so a pattern treats it literally.
#[must_use]
pub fn escape_identifier(text: &str) -> String {
    if classify(text).is_some() || unescape_identifier(text) != text {
        format!("$_{text}")
    } else {
        text.to_owned()
    }
}

/// Returns whether identifier text is an escaped literal.
#[must_use]
pub fn is_escaped(text: &str) -> bool {
    unescape_identifier(text) != text
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("$a", Some((PlaceholderKind::Node, Some("a"))))]
    #[case("$$items", Some((PlaceholderKind::Array, Some("items"))))]
    #[case("$$$rest", Some((PlaceholderKind::Rest, Some("rest"))))]
    #[case("$1", Some((PlaceholderKind::Node, Some("1"))))]
    #[case("$_", Some((PlaceholderKind::Node, None)))]
    #[case("$$_ignored", Some((PlaceholderKind::Array, None)))]
    #[case("$$$_", Some((PlaceholderKind::Rest, None)))]
    #[case("$_$foo", None)]
    #[case("$$$$a", None)]
    #[case("$", None)]
    #[case("foo", None)]
    #[case("$a-b", None)]
    fn identifiers_are_classified(
        #[case] text: &str,
        #[case] expected: Option<(PlaceholderKind, Option<&str>)>,
    ) {
        let actual = classify(text).map(|placeholder| {
            (placeholder.kind(), placeholder.name().map(str::to_owned))
        });
        let wanted = expected.map(|(kind, name)| (kind, name.map(str::to_owned)));
        assert_eq!(actual, wanted);
    }

    #[test]
    fn keys_include_sigils_and_wildcards_have_none() {
        let named = classify("$$a").unwrap_or_else(|| panic!("not a placeholder"));
        assert_eq!(named.key(), Some("$$a"));
        let wildcard = classify("$_a").unwrap_or_else(|| panic!("not a placeholder"));
        assert!(wildcard.is_wildcard());
        assert_eq!(wildcard.key(), None);
    }

    #[rstest]
    #[case("$foo", "$_$foo")]
    #[case("$$foo", "$_$$foo")]
    #[case("foo", "foo")]
    fn escaping_round_trips(#[case] literal: &str, #[case] escaped: &str) {
        assert_eq!(escape_identifier(literal), escaped);
        assert_eq!(unescape_identifier(escaped), literal);
    }

    #[test]
    fn strings_only_hold_single_node_placeholders() {
        assert!(classify_string("$s").is_some());
        assert!(classify_string("$$s").is_none());
        assert!(classify_string("hello $s").is_none());
    }
}
