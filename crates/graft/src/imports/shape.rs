//! Flat model of an import declaration.
//!
//! Import edits are done by reading a declaration into an [`ImportShape`],
//! changing it, and rendering it back to text for the backend to parse.

use graft_syntax::{Ast, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ImportShape {
    pub(crate) type_only: bool,
    pub(crate) default: Option<String>,
    pub(crate) namespace: Option<String>,
    pub(crate) named: Vec<String>,
    pub(crate) source: String,
    pub(crate) semicolon: bool,
}

/// Imported name, local alias and `type` marker of one specifier.
pub(crate) type Member = (String, Option<String>, bool);

/// Reads a member of a specifier list.
///
/// Destructuring members (`{ a: b }`, as spliced in from a `require`
/// pattern) read as `a` aliased to `b`.
pub(crate) fn member_parts(ast: &Ast, member: NodeId) -> Option<Member> {
    let field_text = |field: &str| ast.child_by_field(member, field).map(|node| ast.text(node));
    match ast.kind(member) {
        "import_specifier" => Some((
            field_text("name")?,
            field_text("alias"),
            ast.has_token(member, "type"),
        )),
        "pair_pattern" | "pair" => Some((field_text("key")?, field_text("value"), false)),
        "shorthand_property_identifier_pattern" | "shorthand_property_identifier"
        | "identifier" => Some((ast.text(member), None, false)),
        _ => None,
    }
}

/// Canonical text of a named specifier.
pub(crate) fn specifier_text(name: &str, alias: Option<&str>, typed: bool) -> String {
    let prefix = if typed { "type " } else { "" };
    match alias {
        Some(local) if local != name => format!("{prefix}{name} as {local}"),
        _ => format!("{prefix}{name}"),
    }
}

impl ImportShape {
    /// Reads an `import_statement`.
    ///
    /// A `default` specifier with an alias becomes the default import.
    pub(crate) fn of_statement(ast: &Ast, statement: NodeId) -> Option<Self> {
        if ast.kind(statement) != "import_statement" {
            return None;
        }
        let source = ast.text(ast.child_by_field(statement, "source")?);
        let mut shape = Self {
            type_only: ast.has_token(statement, "type"),
            source,
            semicolon: ast.has_token(statement, ";"),
            ..Self::default()
        };
        let clauses = ast
            .children(statement)
            .into_iter()
            .filter(|child| ast.kind(*child) == "import_clause");
        for clause in clauses {
            for part in ast.children(clause) {
                match ast.kind(part) {
                    "identifier" => shape.default = Some(ast.text(part)),
                    "namespace_import" => {
                        shape.namespace = ast.children(part).first().map(|name| ast.text(*name));
                    }
                    "named_imports" | "object_pattern" | "object" => {
                        for (name, alias, typed) in ast
                            .children(part)
                            .into_iter()
                            .filter_map(|member| member_parts(ast, member))
                        {
                            shape.add_named(&name, alias.as_deref(), typed);
                        }
                    }
                    _ => {}
                }
            }
        }
        Some(shape)
    }

    /// Adds a named specifier, routing `default as x` to the default slot.
    pub(crate) fn add_named(&mut self, name: &str, alias: Option<&str>, typed: bool) {
        if name == "default"
            && self.default.is_none()
            && let Some(local) = alias
        {
            self.default = Some(local.to_owned());
            return;
        }
        let specifier = specifier_text(name, alias, typed);
        if !self.named.contains(&specifier) {
            self.named.push(specifier);
        }
    }

    /// Whether the declaration imports no bindings.
    pub(crate) const fn is_empty(&self) -> bool {
        self.default.is_none() && self.namespace.is_none() && self.named.is_empty()
    }

    /// Module specifier without its quotes.
    pub(crate) fn source_value(&self) -> &str {
        self.source.trim_matches(|ch| matches!(ch, '\'' | '"'))
    }

    /// Whether `wanted` can be merged into this declaration.
    ///
    /// Both must import from the same module with the same kind, must not
    /// disagree on the default or namespace name, and the result must not
    /// combine a namespace import with named imports.
    pub(crate) fn can_absorb(&self, wanted: &Self) -> bool {
        let agrees = |mine: Option<&String>, theirs: Option<&String>| {
            mine.is_none() || theirs.is_none() || mine == theirs
        };
        if self.source_value() != wanted.source_value()
            || self.type_only != wanted.type_only
            || !agrees(self.default.as_ref(), wanted.default.as_ref())
            || !agrees(self.namespace.as_ref(), wanted.namespace.as_ref())
        {
            return false;
        }
        let merged = self.merged_with(wanted);
        merged.namespace.is_none() || merged.named.is_empty()
    }

    /// This declaration plus whatever `wanted` imports that it lacks.
    pub(crate) fn merged_with(&self, wanted: &Self) -> Self {
        let mut merged = self.clone();
        if merged.default.is_none() {
            merged.default.clone_from(&wanted.default);
        }
        if merged.namespace.is_none() {
            merged.namespace.clone_from(&wanted.namespace);
        }
        for specifier in &wanted.named {
            if !merged.named.contains(specifier) {
                merged.named.push(specifier.clone());
            }
        }
        merged
    }

    pub(crate) fn render(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(default) = &self.default {
            clauses.push(default.clone());
        }
        if let Some(namespace) = &self.namespace {
            clauses.push(format!("* as {namespace}"));
        }
        if !self.named.is_empty() {
            clauses.push(format!("{{ {} }}", self.named.join(", ")));
        }
        let terminator = if self.semicolon { ";" } else { "" };
        if clauses.is_empty() {
            return format!("import {}{terminator}", self.source);
        }
        let keyword = if self.type_only { "import type" } else { "import" };
        format!(
            "{keyword} {} from {}{terminator}",
            clauses.join(", "),
            self.source
        )
    }
}

/// Whether a generated import needs rewriting to be well formed: its
/// specifier list holds destructuring members, or a `default` specifier
/// that belongs in front.
pub(crate) fn needs_normalising(ast: &Ast, statement: NodeId) -> bool {
    ast.descendants(statement).into_iter().any(|node| {
        let Some(parent) = ast.parent(node) else {
            return false;
        };
        match ast.kind(parent) {
            "named_imports" => ast.kind(node) != "import_specifier",
            "import_specifier" => {
                ast.field(node) == Some("name")
                    && ast.text(node) == "default"
                    && ast.child_by_field(parent, "alias").is_some()
            }
            "import_clause" => matches!(ast.kind(node), "object_pattern" | "object"),
            _ => false,
        }
    })
}
