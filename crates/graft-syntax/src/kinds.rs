//! Node-kind vocabulary of the TypeScript grammar family.
//!
//! The engine never hard-codes grammar details outside this module: which
//! kinds are statements, which are expressions, which hold lists of siblings
//! and how those lists are separated, and how tightly operators bind.

/// How siblings inside a list-shaped parent are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// Elements separated by `,` tokens (arguments, object members, ...).
    Comma,
    /// Elements on their own lines (statement lists, class bodies).
    Lines,
    /// Elements separated by a single space (JSX attributes).
    Spaced,
    /// Elements placed directly next to each other (JSX children).
    Adjacent,
    /// Not a list: the position holds exactly one node.
    Single,
}

const IDENTIFIER_LIKE: &[&str] = &[
    "identifier",
    "property_identifier",
    "shorthand_property_identifier",
    "shorthand_property_identifier_pattern",
    "type_identifier",
    "statement_identifier",
];

const STATEMENTS: &[&str] = &[
    "expression_statement",
    "lexical_declaration",
    "variable_declaration",
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "if_statement",
    "for_statement",
    "for_in_statement",
    "while_statement",
    "do_statement",
    "try_statement",
    "with_statement",
    "return_statement",
    "throw_statement",
    "break_statement",
    "continue_statement",
    "debugger_statement",
    "labeled_statement",
    "switch_statement",
    "statement_block",
    "empty_statement",
    "import_statement",
    "export_statement",
    "interface_declaration",
    "type_alias_declaration",
    "enum_declaration",
    "module",
    "internal_module",
    "ambient_declaration",
    "function_signature",
];

const EXPRESSIONS: &[&str] = &[
    "identifier",
    "this",
    "super",
    "number",
    "string",
    "template_string",
    "regex",
    "true",
    "false",
    "null",
    "undefined",
    "object",
    "array",
    "function",
    "function_expression",
    "generator_function",
    "arrow_function",
    "class",
    "call_expression",
    "new_expression",
    "member_expression",
    "subscript_expression",
    "assignment_expression",
    "augmented_assignment_expression",
    "await_expression",
    "unary_expression",
    "binary_expression",
    "ternary_expression",
    "update_expression",
    "sequence_expression",
    "parenthesized_expression",
    "yield_expression",
    "as_expression",
    "satisfies_expression",
    "non_null_expression",
    "type_assertion",
    "instantiation_expression",
    "jsx_element",
    "jsx_self_closing_element",
    "meta_property",
];

const COMMA_LISTS: &[&str] = &[
    "arguments",
    "formal_parameters",
    "array",
    "array_pattern",
    "object",
    "object_pattern",
    "named_imports",
    "export_clause",
    "import_clause",
    "type_arguments",
    "type_parameters",
    "object_type",
    "tuple_type",
    "enum_body",
    "lexical_declaration",
    "variable_declaration",
    "sequence_expression",
    "implements_clause",
    "extends_clause",
    "extends_type_clause",
];

const STATEMENT_LISTS: &[&str] = &[
    "program",
    "statement_block",
    "class_body",
    "switch_body",
    "switch_case",
    "switch_default",
    "interface_body",
];

/// Kinds whose members may appear in any order without changing meaning.
const UNORDERED_LISTS: &[&str] = &[
    "object",
    "object_pattern",
    "object_type",
    "interface_body",
    "jsx_opening_element",
    "jsx_self_closing_element",
];

/// Statements that end in `;` unless automatic semicolon insertion applies.
const SEMICOLON_TERMINATED: &[&str] = &[
    "expression_statement",
    "lexical_declaration",
    "variable_declaration",
    "return_statement",
    "throw_statement",
    "break_statement",
    "continue_statement",
    "debugger_statement",
    "do_statement",
    "import_statement",
    "type_alias_declaration",
];

/// Returns whether `kind` is a bare name token that can hold a placeholder.
#[must_use]
pub fn is_identifier_like(kind: &str) -> bool {
    IDENTIFIER_LIKE.contains(&kind)
}

/// Returns whether `kind` is a statement or declaration.
#[must_use]
pub fn is_statement(kind: &str) -> bool {
    STATEMENTS.contains(&kind)
}

/// Returns whether statements of `kind` are terminated by a semicolon.
///
/// Export statements depend on what they export, so they are left to the
/// caller.
#[must_use]
pub fn takes_semicolon(kind: &str) -> bool {
    SEMICOLON_TERMINATED.contains(&kind)
}

/// Returns whether `kind` is an expression.
#[must_use]
pub fn is_expression(kind: &str) -> bool {
    EXPRESSIONS.contains(&kind)
}

/// Returns whether members of `kind` may be matched in any order.
#[must_use]
pub fn is_unordered_list(kind: &str) -> bool {
    UNORDERED_LISTS.contains(&kind)
}

/// Returns the separator style of a parent kind, ignoring its tokens.
///
/// Callers that can inspect the parent should also treat any parent holding
/// a `,` token as a comma list.
#[must_use]
pub fn list_style_of_kind(kind: &str) -> ListStyle {
    if STATEMENT_LISTS.contains(&kind) {
        ListStyle::Lines
    } else if COMMA_LISTS.contains(&kind) {
        ListStyle::Comma
    } else {
        match kind {
            "jsx_opening_element" | "jsx_self_closing_element" => ListStyle::Spaced,
            "jsx_element" => ListStyle::Adjacent,
            _ => ListStyle::Single,
        }
    }
}

/// Binding strength of an expression, higher binds tighter.
///
/// `operator` is the operator token of binary expressions.
#[must_use]
pub fn precedence(kind: &str, operator: Option<&str>) -> u8 {
    match kind {
        "sequence_expression" => 1,
        "assignment_expression"
        | "augmented_assignment_expression"
        | "arrow_function"
        | "yield_expression" => 2,
        "ternary_expression" => 3,
        "binary_expression" => operator.map_or(12, binary_precedence),
        "as_expression" | "satisfies_expression" => 10,
        "unary_expression" | "await_expression" | "type_assertion" => 15,
        "update_expression" => 16,
        "new_expression" => 17,
        "call_expression" | "member_expression" | "subscript_expression"
        | "non_null_expression" | "instantiation_expression" => 18,
        _ => 20,
    }
}

fn binary_precedence(operator: &str) -> u8 {
    match operator {
        "??" | "||" => 4,
        "&&" => 5,
        "|" => 6,
        "^" => 7,
        "&" => 8,
        "==" | "!=" | "===" | "!==" => 9,
        "<" | ">" | "<=" | ">=" | "instanceof" | "in" => 10,
        "<<" | ">>" | ">>>" => 11,
        "+" | "-" => 12,
        "*" | "/" | "%" => 13,
        "**" => 14,
        _ => 12,
    }
}

/// Describes the slot a substituted expression lands in.
#[derive(Debug, Clone, Copy)]
pub struct OperandSlot<'a> {
    /// Kind of the parent node.
    pub parent_kind: &'a str,
    /// Operator token of the parent, for binary expressions.
    pub parent_operator: Option<&'a str>,
    /// Field the child occupies in the parent.
    pub field: Option<&'a str>,
}

/// Returns whether an expression of `kind` needs parentheses in `slot`.
#[must_use]
pub fn needs_parens(slot: OperandSlot<'_>, kind: &str, operator: Option<&str>) -> bool {
    if !is_expression(kind) || kind == "parenthesized_expression" {
        return false;
    }
    let child = precedence(kind, operator);
    match (slot.parent_kind, slot.field) {
        ("binary_expression", Some("left")) => {
            let parent = precedence(slot.parent_kind, slot.parent_operator);
            child < parent || (child == parent && slot.parent_operator == Some("**"))
        }
        ("binary_expression", Some("right")) => {
            let parent = precedence(slot.parent_kind, slot.parent_operator);
            child < parent || (child == parent && slot.parent_operator != Some("**"))
        }
        ("unary_expression" | "await_expression", Some("argument") | None) => child < 15,
        ("update_expression", Some("argument")) => child < 16,
        ("member_expression" | "subscript_expression", Some("object"))
        | ("call_expression", Some("function"))
        | ("non_null_expression", None) => child < 18,
        ("new_expression", Some("constructor")) => child < 18,
        ("ternary_expression", Some("condition")) => child <= 3,
        ("ternary_expression", _) | ("arguments" | "array", _) | ("pair", Some("value")) => child < 2,
        ("spread_element", _) => child < 2,
        _ => false,
    }
}
