//! Import declaration helpers.
//!
//! Import patterns are matched piecewise rather than structurally: the
//! module specifier, the default import, the namespace import and the
//! named specifiers are matched separately, so `import { b } from 'x'`
//! finds `import a, { c, b } from 'x'`. Named specifiers match in any
//! order and extra specifiers are ignored. A `default as $x` specifier in a
//! pattern matches the default import.

pub(crate) mod shape;

use graft_syntax::{Ast, Backend, NodeId};
use tracing::debug;

use crate::astx::Astx;
use crate::bindings::{Bindings, Match};
use crate::error::GraftError;
use crate::matcher::{Conditions, FieldRule, MatchEnv, Rule, match_list};
use crate::placeholder::classify;
use crate::replacement::Generator;

use shape::{ImportShape, member_parts, specifier_text};

/// The parts of an import declaration that take part in matching.
struct ImportParts {
    node: NodeId,
    source: NodeId,
    type_only: bool,
    default: Option<NodeId>,
    namespace: Option<NodeId>,
    named: Vec<(Option<&'static str>, NodeId)>,
}

impl ImportParts {
    fn read(ast: &Ast, node: NodeId) -> Option<Self> {
        if ast.kind(node) != "import_statement" {
            return None;
        }
        let mut parts = Self {
            node,
            source: ast.child_by_field(node, "source")?,
            type_only: ast.has_token(node, "type"),
            default: None,
            namespace: None,
            named: Vec::new(),
        };
        let clauses = ast
            .children(node)
            .into_iter()
            .filter(|child| ast.kind(*child) == "import_clause");
        for clause in clauses {
            for part in ast.children(clause) {
                match ast.kind(part) {
                    "identifier" => parts.default = Some(part),
                    "namespace_import" => parts.namespace = ast.children(part).first().copied(),
                    "named_imports" => {
                        for specifier in ast.children(part) {
                            if is_default_alias(ast, specifier) {
                                parts.default = ast.child_by_field(specifier, "alias");
                            } else {
                                parts.named.push((ast.field(specifier), specifier));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Some(parts)
    }
}

fn is_default_alias(ast: &Ast, specifier: NodeId) -> bool {
    ast.kind(specifier) == "import_specifier"
        && ast
            .child_by_field(specifier, "name")
            .is_some_and(|name| ast.text(name) == "default")
        && ast.child_by_field(specifier, "alias").is_some()
}

/// One compiled import declaration of an import pattern.
struct ImportPattern {
    source: Rule,
    type_only: bool,
    default: Option<Rule>,
    namespace: Option<Rule>,
    named: Vec<FieldRule>,
    specifiers: usize,
    shape: ImportShape,
}

impl ImportPattern {
    fn compile(ast: &Ast, node: NodeId) -> Result<Self, GraftError> {
        let parts = ImportParts::read(ast, node).ok_or_else(|| {
            GraftError::import_shape(format!(
                "pattern must contain only import declarations, found {}",
                ast.kind(node)
            ))
        })?;
        let named: Vec<FieldRule> = parts
            .named
            .iter()
            .map(|(field, specifier)| FieldRule {
                field: *field,
                rule: Rule::compile(ast, *specifier),
            })
            .collect();
        let specifiers = usize::from(parts.default.is_some())
            + usize::from(parts.namespace.is_some())
            + named.len();
        Ok(Self {
            source: Rule::compile(ast, parts.source),
            type_only: parts.type_only,
            default: parts.default.map(|name| Rule::compile(ast, name)),
            namespace: parts.namespace.map(|name| Rule::compile(ast, name)),
            named,
            specifiers,
            shape: ImportShape::of_statement(ast, node).unwrap_or_default(),
        })
    }

    fn matches(
        &self,
        env: &MatchEnv<'_>,
        candidate: &ImportParts,
        bindings: Bindings,
    ) -> Result<Option<Bindings>, GraftError> {
        if candidate.type_only != self.type_only {
            return Ok(None);
        }
        let Some(with_source) = self.source.matches(env, candidate.source, bindings)? else {
            return Ok(None);
        };
        let Some(with_default) =
            match_optional(env, self.default.as_ref(), candidate.default, with_source)?
        else {
            return Ok(None);
        };
        let Some(with_namespace) =
            match_optional(env, self.namespace.as_ref(), candidate.namespace, with_default)?
        else {
            return Ok(None);
        };
        let mut patterns = self.named.clone();
        if patterns.iter().all(|pattern| pattern.rule.as_splice().is_none())
            && let Some(rest) = classify("$$_")
        {
            patterns.push(FieldRule {
                field: None,
                rule: Rule::Splice(rest),
            });
        }
        match_list(env, &patterns, &candidate.named, with_namespace, true)
    }

    /// What is left of a matched declaration once this pattern's
    /// specifiers are taken out, or `None` when nothing is.
    fn remaining(
        &self,
        env: &MatchEnv<'_>,
        candidate: &ImportParts,
        bindings: &Bindings,
    ) -> Result<Option<ImportShape>, GraftError> {
        let ast = env.ast();
        if self.specifiers == 0 {
            return Ok(None);
        }
        let mut shape = ImportShape::of_statement(ast, candidate.node).unwrap_or_default();
        if self.default.is_some() {
            shape.default = None;
        }
        if self.namespace.is_some() {
            shape.namespace = None;
        }
        let mut dropped = Vec::new();
        for (_, specifier) in &candidate.named {
            if self.removes(env, *specifier, bindings)?
                && let Some((name, alias, typed)) = member_parts(ast, *specifier)
            {
                dropped.push(specifier_text(&name, alias.as_deref(), typed));
            }
        }
        shape.named.retain(|specifier| !dropped.contains(specifier));
        Ok((!shape.is_empty()).then_some(shape))
    }

    fn removes(
        &self,
        env: &MatchEnv<'_>,
        specifier: NodeId,
        bindings: &Bindings,
    ) -> Result<bool, GraftError> {
        for pattern in &self.named {
            if let Some(placeholder) = pattern.rule.as_splice() {
                let captured = placeholder
                    .key()
                    .and_then(|key| bindings.array_capture(key))
                    .is_some_and(|nodes| nodes.contains(&specifier));
                if captured {
                    return Ok(true);
                }
                continue;
            }
            if pattern.rule.matches(env, specifier, bindings.clone())?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn match_optional(
    env: &MatchEnv<'_>,
    pattern: Option<&Rule>,
    candidate: Option<NodeId>,
    bindings: Bindings,
) -> Result<Option<Bindings>, GraftError> {
    let Some(rule) = pattern else {
        return Ok(Some(bindings));
    };
    let Some(node) = candidate else {
        return Ok(None);
    };
    rule.matches(env, node, bindings)
}

fn top_level_imports(ast: &Ast) -> Vec<ImportParts> {
    ast.children(ast.root())
        .into_iter()
        .filter_map(|node| ImportParts::read(ast, node))
        .collect()
}

/// Matches compiled import declarations against the document.
///
/// A single declaration yields every import it matches. Several
/// declarations must all match, in order and sharing captures, and yield
/// one match holding every matched import.
fn match_imports(doc: &Ast, patterns: &[ImportPattern]) -> Result<Vec<Match>, GraftError> {
    let conditions = Conditions::new();
    let env = MatchEnv::new(doc, &conditions);
    let candidates = top_level_imports(doc);
    if let [single] = patterns {
        let mut matches = Vec::new();
        for candidate in &candidates {
            if let Some(bindings) = single.matches(&env, candidate, Bindings::new())? {
                matches.push(Match::new(vec![candidate.node], bindings));
            }
        }
        return Ok(matches);
    }
    let mut paths = Vec::with_capacity(patterns.len());
    let mut bindings = Bindings::new();
    for pattern in patterns {
        let mut hit = None;
        for candidate in &candidates {
            if let Some(bound) = pattern.matches(&env, candidate, bindings.clone())? {
                hit = Some((candidate.node, bound));
                break;
            }
        }
        let Some((node, bound)) = hit else {
            return Ok(Vec::new());
        };
        paths.push(node);
        bindings = bound;
    }
    Ok(vec![Match::new(paths, bindings)])
}

/// Parses a rendered import and copies it into `doc`.
fn parse_import(doc: &mut Ast, backend: &dyn Backend, text: &str) -> Result<NodeId, GraftError> {
    let parsed = backend.parse(text)?;
    let Some(statement) = parsed.children(parsed.root()).first().copied() else {
        return Err(GraftError::import_shape(format!(
            "cannot build an import declaration from {text}"
        )));
    };
    Ok(doc.import_subtree(&parsed, statement))
}

/// Swaps `node` for a freshly parsed rendering of `shape`, keeping the
/// declaration's comments.
fn rewrite(
    doc: &mut Ast,
    backend: &dyn Backend,
    node: NodeId,
    shape: &ImportShape,
) -> Result<(), GraftError> {
    let replacement = parse_import(doc, backend, &shape.render())?;
    let leading = doc.take_leading_comments(node);
    let trailing = doc.take_trailing_comments(node);
    doc.append_leading_comments(replacement, leading);
    doc.append_trailing_comments(replacement, trailing);
    doc.replace(node, &[replacement])?;
    Ok(())
}

/// Pending `replace_import` operation; see [`Astx::replace_import`].
#[derive(Debug)]
pub struct ImportReplacer<'a> {
    astx: &'a Astx,
    pattern: String,
    found: Astx,
}

impl ImportReplacer<'_> {
    /// Imports the pattern matched.
    #[must_use]
    pub const fn found(&self) -> &Astx {
        &self.found
    }

    /// Removes the matched specifier and adds the imports of `replacement`,
    /// generated with the captures of each match.
    ///
    /// Returns whether anything was replaced.
    ///
    /// # Errors
    ///
    /// Returns replacement pattern errors framed with the pattern.
    pub fn with(self, replacement: &str) -> Result<bool, GraftError> {
        if !self.found.matched() {
            return Ok(false);
        }
        let backend = self.astx.backend();
        let pattern = backend
            .parse_pattern(replacement)
            .map_err(|err| GraftError::from(err).framed("replace import replacement", replacement))?;
        let generator = Generator::compile(pattern);
        let mut texts = Vec::new();
        for current in self.found.matches() {
            let mut doc = self.astx.ast_mut();
            let generated = generator
                .generate(&mut doc, current.bindings(), backend)
                .map_err(|err| err.framed("replace import replacement", replacement))?;
            texts.extend(generated.into_iter().map(|node| doc.text(node)));
        }
        self.astx.remove_imports(&self.pattern)?;
        for text in texts {
            self.astx.add_imports(&text)?;
        }
        debug!(
            target: "graft::imports",
            pattern = self.pattern,
            replacement,
            "replaced import"
        );
        Ok(true)
    }
}

impl Astx {
    fn compile_imports(&self, pattern: &str) -> Result<Vec<ImportPattern>, GraftError> {
        let tree = self.backend().parse_pattern(pattern)?;
        tree.roots()
            .iter()
            .map(|root| ImportPattern::compile(tree.ast(), *root))
            .collect()
    }

    /// Finds top-level imports matching an import pattern.
    ///
    /// # Errors
    ///
    /// Returns pattern errors framed with the pattern, including
    /// [`GraftError::ImportShape`] for patterns that are not imports.
    pub fn find_imports(&self, pattern: &str) -> Result<Self, GraftError> {
        self.find_imports_unframed(pattern)
            .map_err(|err| err.framed("find imports pattern", pattern))
    }

    fn find_imports_unframed(&self, pattern: &str) -> Result<Self, GraftError> {
        let compiled = self.compile_imports(pattern)?;
        let matches = match_imports(&self.ast(), &compiled)?;
        Ok(self.derive(matches))
    }

    /// Adds the imports of `pattern` that are not already present.
    ///
    /// A missing import is merged into an existing declaration of the same
    /// module and kind when the grammar allows, and otherwise inserted
    /// after the last import. Returns the imports matching `pattern`
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns pattern errors framed with the pattern.
    pub fn add_imports(&self, pattern: &str) -> Result<Self, GraftError> {
        self.add_imports_unframed(pattern)
            .map_err(|err| err.framed("add imports pattern", pattern))
    }

    fn add_imports_unframed(&self, pattern: &str) -> Result<Self, GraftError> {
        let compiled = self.compile_imports(pattern)?;
        for import in &compiled {
            let present = !match_imports(&self.ast(), std::slice::from_ref(import))?.is_empty();
            if !present {
                self.add_import(&import.shape)?;
            }
        }
        self.find_imports_unframed(pattern)
    }

    fn add_import(&self, wanted: &ImportShape) -> Result<(), GraftError> {
        self.bail_simple();
        let backend = self.backend();
        let mut doc = self.ast_mut();
        let root = doc.root();
        let statements = doc.children(root);
        let existing = statements.iter().find_map(|node| {
            ImportShape::of_statement(&doc, *node)
                .filter(|shape| shape.can_absorb(wanted))
                .map(|shape| (*node, shape))
        });
        if let Some((node, shape)) = existing {
            debug!(target: "graft::imports", source = wanted.source, "merging import");
            return rewrite(&mut doc, backend, node, &shape.merged_with(wanted));
        }
        debug!(target: "graft::imports", source = wanted.source, "inserting import");
        let inserted = parse_import(&mut doc, backend, &wanted.render())?;
        let last_import = statements
            .iter()
            .rev()
            .find(|node| doc.kind(**node) == "import_statement")
            .copied();
        if let Some(anchor) = last_import {
            doc.insert_after(anchor, &[inserted])?;
        } else {
            doc.prepend_children(root, &[inserted])?;
        }
        Ok(())
    }

    /// Removes the specifiers `pattern` matches, and declarations left
    /// empty. A pattern without specifiers removes whole declarations.
    ///
    /// Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns pattern errors framed with the pattern.
    pub fn remove_imports(&self, pattern: &str) -> Result<bool, GraftError> {
        self.remove_imports_unframed(pattern)
            .map_err(|err| err.framed("remove imports pattern", pattern))
    }

    fn remove_imports_unframed(&self, pattern: &str) -> Result<bool, GraftError> {
        let compiled = self.compile_imports(pattern)?;
        let mut removed = false;
        for import in &compiled {
            let edits = {
                let doc = self.ast();
                let conditions = Conditions::new();
                let env = MatchEnv::new(&doc, &conditions);
                let mut edits = Vec::new();
                for candidate in top_level_imports(&doc) {
                    if let Some(bindings) = import.matches(&env, &candidate, Bindings::new())? {
                        edits.push((candidate.node, import.remaining(&env, &candidate, &bindings)?));
                    }
                }
                edits
            };
            if edits.is_empty() {
                continue;
            }
            removed = true;
            self.bail_simple();
            let backend = self.backend();
            let mut doc = self.ast_mut();
            for (node, remaining) in edits {
                if let Some(shape) = remaining {
                    rewrite(&mut doc, backend, node, &shape)?;
                } else {
                    doc.prune(node)?;
                }
            }
        }
        Ok(removed)
    }

    /// Starts replacing one import specifier; finish with
    /// [`ImportReplacer::with`].
    ///
    /// # Errors
    ///
    /// Returns [`GraftError::ImportShape`] unless `pattern` is exactly one
    /// import declaration with at most one specifier.
    pub fn replace_import(&self, pattern: &str) -> Result<ImportReplacer<'_>, GraftError> {
        let frame = |err: GraftError| err.framed("replace import pattern", pattern);
        let compiled = self.compile_imports(pattern).map_err(frame)?;
        let [import] = compiled.as_slice() else {
            return Err(frame(GraftError::import_shape(
                "pattern must contain exactly one import declaration",
            )));
        };
        if import.specifiers > 1 {
            return Err(frame(GraftError::import_shape(
                "pattern may not contain more than one import specifier",
            )));
        }
        let found = self.find_imports_unframed(pattern).map_err(frame)?;
        Ok(ImportReplacer {
            astx: self,
            pattern: pattern.to_owned(),
            found,
        })
    }
}
