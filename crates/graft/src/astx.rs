//! The fluent query wrapper.
//!
//! An [`Astx`] holds zero or more matches over one document. Queries derive
//! new wrappers whose matches inherit the captures of the wrapper they were
//! derived from, so a nested `find` can refer back to outer captures.
//! Wrappers are cheap handles: every wrapper derived from the same parse
//! shares the document, and a replacement made through one is visible
//! through all of them.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::rc::Rc;

use graft_syntax::literal::cooked_string;
use graft_syntax::{Ast, Backend, NodeId, PatternTree};
use tracing::debug;

use crate::bindings::{Bindings, Match, merge_bindings};
use crate::error::GraftError;
use crate::find::{FindOptions, closest, destruct, find};
use crate::matcher::Matcher;
use crate::replace::{remove_paths, replace_paths};
use crate::replacement::Generator;
use crate::simple_replacements::SimpleReplacements;

/// Predicate deciding whether a candidate wrapper matches.
pub type QueryPredicate = Rc<dyn Fn(&Astx) -> bool>;

/// Callback producing a replacement for one match.
pub type ReplacementCallback = Rc<dyn Fn(&Astx, &dyn Backend) -> Result<Replacement, GraftError>>;

/// What `find`, `closest` and `destruct` look for.
#[derive(Clone)]
pub enum Query {
    /// Pattern source text.
    Source(String),
    /// An already parsed pattern.
    Pattern(PatternTree),
    /// Arbitrary logic over a candidate.
    Predicate(QueryPredicate),
}

impl Query {
    /// Wraps a predicate.
    #[must_use]
    pub fn predicate(predicate: impl Fn(&Astx) -> bool + 'static) -> Self {
        Self::Predicate(Rc::new(predicate))
    }
}

impl From<&str> for Query {
    fn from(source: &str) -> Self {
        Self::Source(source.to_owned())
    }
}

impl From<String> for Query {
    fn from(source: String) -> Self {
        Self::Source(source)
    }
}

impl From<PatternTree> for Query {
    fn from(pattern: PatternTree) -> Self {
        Self::Pattern(pattern)
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(source) => f.debug_tuple("Source").field(source).finish(),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.source()).finish(),
            Self::Predicate(_) => f.write_str("Predicate"),
        }
    }
}

/// What matches are replaced with.
#[derive(Clone)]
pub enum Replacement {
    /// Replacement pattern source text. Blank text removes the matches.
    Code(String),
    /// An already parsed replacement pattern.
    Pattern(PatternTree),
    /// Copies of the nodes a wrapper holds, typically a capture.
    Nodes(Astx),
    /// Computes the replacement per match.
    Callback(ReplacementCallback),
}

impl Replacement {
    /// Wraps a per-match callback.
    #[must_use]
    pub fn callback(
        callback: impl Fn(&Astx, &dyn Backend) -> Result<Self, GraftError> + 'static,
    ) -> Self {
        Self::Callback(Rc::new(callback))
    }
}

impl From<&str> for Replacement {
    fn from(code: &str) -> Self {
        Self::Code(code.to_owned())
    }
}

impl From<String> for Replacement {
    fn from(code: String) -> Self {
        Self::Code(code)
    }
}

impl From<PatternTree> for Replacement {
    fn from(pattern: PatternTree) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<Astx> for Replacement {
    fn from(nodes: Astx) -> Self {
        Self::Nodes(nodes)
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => f.debug_tuple("Code").field(code).finish(),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.source()).finish(),
            Self::Nodes(nodes) => f.debug_tuple("Nodes").field(nodes).finish(),
            Self::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// Document state shared by every wrapper derived from one parse.
pub(crate) struct Context {
    backend: Rc<dyn Backend>,
    doc: RefCell<Ast>,
    simple: RefCell<SimpleReplacements>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Driver {
    Find,
    Closest,
    Destruct,
}

impl Driver {
    const fn role(self) -> &'static str {
        match self {
            Self::Find => "find pattern",
            Self::Closest => "closest pattern",
            Self::Destruct => "destruct pattern",
        }
    }
}

enum Compiled {
    Generator(Generator),
    Nothing,
    PerMatch,
}

/// A set of matches over a shared document.
#[derive(Clone)]
pub struct Astx {
    context: Rc<Context>,
    matches: Vec<Match>,
    with_captures: Vec<Match>,
    placeholder: Option<String>,
}

impl fmt::Debug for Astx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Astx")
            .field("matches", &self.matches)
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}

impl Astx {
    /// Parses `source` and wraps the document root.
    ///
    /// # Errors
    ///
    /// Returns the backend's parse error.
    pub fn parse(backend: Rc<dyn Backend>, source: &str) -> Result<Self, GraftError> {
        let doc = backend.parse(source)?;
        Ok(Self::from_ast(backend, doc))
    }

    /// Wraps the root of an already parsed document.
    #[must_use]
    pub fn from_ast(backend: Rc<dyn Backend>, doc: Ast) -> Self {
        let root = doc.root();
        let simple = SimpleReplacements::new(doc.source());
        Self {
            context: Rc::new(Context {
                backend,
                doc: RefCell::new(doc),
                simple: RefCell::new(simple),
            }),
            matches: vec![Match::new(vec![root], Bindings::new())],
            with_captures: Vec::new(),
            placeholder: None,
        }
    }

    /// A wrapper over new matches whose captures inherit from this one.
    pub(crate) fn derive(&self, matches: Vec<Match>) -> Self {
        Self {
            context: Rc::clone(&self.context),
            matches,
            with_captures: self.matches.clone(),
            placeholder: None,
        }
    }

    /// A wrapper over a subset of this wrapper's matches.
    fn narrow(&self, matches: Vec<Match>) -> Self {
        Self {
            context: Rc::clone(&self.context),
            matches,
            with_captures: self.with_captures.clone(),
            placeholder: self.placeholder.clone(),
        }
    }

    /// The backend the document was parsed with.
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.context.backend.as_ref()
    }

    /// Read access to the document.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a replacement of the same document.
    #[must_use]
    pub fn ast(&self) -> Ref<'_, Ast> {
        self.context.doc.borrow()
    }

    pub(crate) fn ast_mut(&self) -> RefMut<'_, Ast> {
        self.context.doc.borrow_mut()
    }

    pub(crate) fn bail_simple(&self) {
        self.context.simple.borrow_mut().bail();
    }

    /// The document as edited by the text-splice fast path, unless the
    /// fast path was abandoned.
    #[must_use]
    pub fn simple_output(&self) -> Option<String> {
        self.context.simple.borrow().apply()
    }

    /// Regenerates the whole document.
    #[must_use]
    pub fn source(&self) -> String {
        self.context.doc.borrow().to_source()
    }

    /// Number of matches held.
    #[must_use]
    pub fn size(&self) -> usize {
        self.matches.len()
    }

    /// The matches held.
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Whether any match is held.
    #[must_use]
    pub fn matched(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Matches inherited from the enclosing wrapper.
    #[must_use]
    pub fn with_captures(&self) -> &[Match] {
        &self.with_captures
    }

    /// Placeholder this wrapper is scoped to, for capture wrappers.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// One single-match wrapper per match, or per captured node for
    /// capture wrappers.
    pub fn iter(&self) -> impl Iterator<Item = Self> + '_ {
        self.matches
            .iter()
            .flat_map(move |current| {
                if self.placeholder.is_some() && current.paths().len() != 1 {
                    current
                        .paths()
                        .iter()
                        .map(|path| Match::new(vec![*path], current.bindings().clone()))
                        .collect()
                } else {
                    vec![current.clone()]
                }
            })
            .map(move |single| self.narrow(vec![single]))
    }

    /// The `index`th element of [`Astx::iter`], or an empty wrapper.
    #[must_use]
    pub fn at(&self, index: usize) -> Self {
        self.iter()
            .nth(index)
            .unwrap_or_else(|| self.narrow(Vec::new()))
    }

    fn require(&self, operation: &'static str) -> Result<&Match, GraftError> {
        self.matches
            .first()
            .ok_or(GraftError::missing_match(operation))
    }

    /// Wrapper over the first match.
    ///
    /// # Errors
    ///
    /// Returns [`GraftError::MissingMatch`] without matches.
    pub fn first(&self) -> Result<Self, GraftError> {
        let current = self.require("first")?;
        Ok(self.narrow(vec![current.clone()]))
    }

    /// First node of the first match.
    ///
    /// # Errors
    ///
    /// Returns [`GraftError::MissingMatch`] without matches.
    pub fn node(&self) -> Result<NodeId, GraftError> {
        self.require("node")?
            .node()
            .ok_or(GraftError::missing_match("node"))
    }

    /// Every node of the first match.
    ///
    /// # Errors
    ///
    /// Returns [`GraftError::MissingMatch`] without matches.
    pub fn path(&self) -> Result<&[NodeId], GraftError> {
        Ok(self.require("path")?.paths())
    }

    /// First node of each match.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeId> {
        self.matches.iter().filter_map(Match::node).collect()
    }

    /// Every node of every match.
    #[must_use]
    pub fn paths(&self) -> Vec<NodeId> {
        self.matches
            .iter()
            .flat_map(|current| current.paths().iter().copied())
            .collect()
    }

    /// Generated code of the first match, one line per matched node.
    ///
    /// # Errors
    ///
    /// Returns [`GraftError::MissingMatch`] without matches.
    pub fn code(&self) -> Result<String, GraftError> {
        let current = self.require("code")?;
        let doc = self.context.doc.borrow();
        let parts: Vec<String> = current
            .paths()
            .iter()
            .map(|path| self.context.backend.generate(&doc, *path))
            .collect();
        Ok(parts.join("\n"))
    }

    /// String value of the first match: the string capture of a capture
    /// wrapper, or the cooked value of a string literal.
    ///
    /// # Errors
    ///
    /// Returns [`GraftError::MissingMatch`] without matches and
    /// [`GraftError::NotAStringCapture`] when there is no string value.
    pub fn string_value(&self) -> Result<String, GraftError> {
        let current = self.require("string_value")?;
        if let Some(key) = &self.placeholder
            && let Some(value) = current.bindings().string_capture(key)
        {
            return Ok(value.to_owned());
        }
        let doc = self.context.doc.borrow();
        let node = current.node();
        node.and_then(|id| cooked_string(&doc, id))
            .ok_or_else(|| GraftError::NotAStringCapture {
                placeholder: self
                    .placeholder
                    .clone()
                    .or_else(|| node.map(|id| doc.text(id)))
                    .unwrap_or_default(),
            })
    }

    /// Names of every capture bound by any match, sorted.
    #[must_use]
    pub fn capture_names(&self) -> Vec<String> {
        let names: BTreeSet<String> = self
            .matches
            .iter()
            .flat_map(|current| current.bindings().keys())
            .collect();
        names.into_iter().collect()
    }

    /// A wrapper over the nodes bound to `placeholder` in every match.
    ///
    /// Array captures yield one match holding the whole run. Matches that
    /// did not bind the placeholder contribute nothing, so the result may be
    /// empty.
    #[must_use]
    pub fn get_capture(&self, placeholder: &str) -> Self {
        let matches = self
            .matches
            .iter()
            .filter_map(|current| {
                let bindings = current.bindings();
                bindings
                    .capture(placeholder)
                    .map(|node| vec![node])
                    .or_else(|| bindings.array_capture(placeholder).map(<[NodeId]>::to_vec))
                    .map(|paths| Match::new(paths, bindings.clone()))
            })
            .collect();
        Self {
            context: Rc::clone(&self.context),
            matches,
            with_captures: self.matches.clone(),
            placeholder: Some(placeholder.to_owned()),
        }
    }

    /// Keeps the matches for which `predicate` holds.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&Self) -> bool) -> Self {
        let kept = self
            .matches
            .iter()
            .filter(|current| predicate(&self.narrow(vec![(*current).clone()])))
            .cloned()
            .collect();
        self.narrow(kept)
    }

    /// Applies `f` to each single-match wrapper.
    #[must_use]
    pub fn map<T>(&self, mut f: impl FnMut(&Self) -> T) -> Vec<T> {
        self.iter().map(|single| f(&single)).collect()
    }

    /// Concatenates the matches of the wrappers `f` returns.
    #[must_use]
    pub fn flat_map(&self, mut f: impl FnMut(&Self) -> Self) -> Self {
        let matches = self
            .iter()
            .flat_map(|single| f(&single).matches)
            .collect();
        self.narrow(matches)
    }

    /// Finds matches at or below every held match.
    ///
    /// # Errors
    ///
    /// Returns pattern syntax and position errors framed with the pattern.
    pub fn find(&self, query: impl Into<Query>) -> Result<Self, GraftError> {
        self.search(query.into(), &FindOptions::default(), Driver::Find)
    }

    /// [`Astx::find`] with capture conditions.
    ///
    /// # Errors
    ///
    /// Returns pattern syntax and position errors framed with the pattern.
    pub fn find_with(
        &self,
        query: impl Into<Query>,
        options: &FindOptions,
    ) -> Result<Self, GraftError> {
        self.search(query.into(), options, Driver::Find)
    }

    /// Finds the nearest matching strict ancestor of every held node.
    ///
    /// # Errors
    ///
    /// Returns pattern syntax and position errors framed with the pattern,
    /// including for patterns of more than one node.
    pub fn closest(&self, query: impl Into<Query>) -> Result<Self, GraftError> {
        self.search(query.into(), &FindOptions::default(), Driver::Closest)
    }

    /// Matches the held nodes themselves.
    ///
    /// # Errors
    ///
    /// Returns pattern syntax and position errors framed with the pattern.
    pub fn destruct(&self, query: impl Into<Query>) -> Result<Self, GraftError> {
        self.search(query.into(), &FindOptions::default(), Driver::Destruct)
    }

    /// [`Astx::destruct`] with capture conditions.
    ///
    /// # Errors
    ///
    /// Returns pattern syntax and position errors framed with the pattern.
    pub fn destruct_with(
        &self,
        query: impl Into<Query>,
        options: &FindOptions,
    ) -> Result<Self, GraftError> {
        self.search(query.into(), options, Driver::Destruct)
    }

    fn search(
        &self,
        query: Query,
        options: &FindOptions,
        driver: Driver,
    ) -> Result<Self, GraftError> {
        let found = match query {
            Query::Predicate(predicate) => self.search_predicate(predicate.as_ref(), driver),
            Query::Source(source) => {
                let pattern = self
                    .context
                    .backend
                    .parse_pattern(&source)
                    .map_err(|err| GraftError::from(err).framed(driver.role(), &source))?;
                self.search_pattern(&pattern, options, driver)
                    .map_err(|err| err.framed(driver.role(), &source))?
            }
            Query::Pattern(pattern) => self
                .search_pattern(&pattern, options, driver)
                .map_err(|err| err.framed(driver.role(), pattern.source()))?,
        };
        Ok(self.derive(found))
    }

    /// Per held match: its live paths and the bindings a nested search
    /// starts from.
    fn scopes(&self, doc: &Ast) -> Vec<(Vec<NodeId>, Bindings)> {
        let inherited = merge_bindings(&self.with_captures);
        self.matches
            .iter()
            .map(|current| {
                let mut initial = inherited.clone();
                initial.extend(current.bindings());
                let live = current
                    .paths()
                    .iter()
                    .copied()
                    .filter(|path| !doc.is_detached(*path))
                    .collect();
                (live, initial)
            })
            .collect()
    }

    fn search_pattern(
        &self,
        pattern: &PatternTree,
        options: &FindOptions,
        driver: Driver,
    ) -> Result<Vec<Match>, GraftError> {
        if driver == Driver::Closest && !pattern.is_single() {
            return Err(GraftError::pattern_position(
                "closest requires a pattern of a single node",
            ));
        }
        let matcher = Matcher::compile(pattern);
        let doc = self.context.doc.borrow();
        let mut found = Vec::new();
        for (roots, initial) in self.scopes(&doc) {
            let matches = match driver {
                Driver::Find => find(&doc, &roots, &matcher, options, &initial)?,
                Driver::Closest => closest(&doc, &roots, &matcher, options, &initial)?,
                Driver::Destruct => destruct(&doc, &roots, &matcher, options, &initial)?,
            };
            found.extend(matches);
        }
        debug!(
            target: "graft::find",
            role = driver.role(),
            pattern = pattern.source(),
            matches = found.len(),
            "pattern search complete"
        );
        Ok(found)
    }

    fn search_predicate(&self, predicate: &dyn Fn(&Self) -> bool, driver: Driver) -> Vec<Match> {
        let groups: Vec<(Vec<NodeId>, Bindings)> = {
            let doc = self.context.doc.borrow();
            self.scopes(&doc)
                .into_iter()
                .flat_map(|(roots, initial)| match driver {
                    Driver::Find => {
                        let nodes: Vec<NodeId> =
                            roots.iter().flat_map(|root| doc.descendants(*root)).collect();
                        vec![(nodes, initial)]
                    }
                    Driver::Closest => roots
                        .iter()
                        .map(|root| (doc.ancestors(*root), initial.clone()))
                        .collect(),
                    Driver::Destruct => vec![(roots, initial)],
                })
                .collect()
        };
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for (nodes, initial) in groups {
            for node in nodes {
                if driver == Driver::Find && !seen.insert(node) {
                    continue;
                }
                let candidate = Match::new(vec![node], initial.clone());
                if !predicate(&self.derive(vec![candidate.clone()])) {
                    continue;
                }
                if driver == Driver::Closest {
                    if seen.insert(node) {
                        found.push(candidate);
                    }
                    break;
                }
                found.push(candidate);
            }
        }
        found
    }

    /// Replaces every match, last match first.
    ///
    /// # Errors
    ///
    /// Returns replacement pattern errors framed with the pattern, and
    /// errors returned by replacement callbacks.
    pub fn replace(&self, with: impl Into<Replacement>) -> Result<(), GraftError> {
        let replacement = with.into();
        let compiled = self.compile_replacement(&replacement)?;
        for current in self.matches.iter().rev() {
            let generated = self.generate_for(&replacement, &compiled, current)?;
            let mut doc = self.context.doc.borrow_mut();
            let mut simple = self.context.simple.borrow_mut();
            replace_paths(
                &mut doc,
                &mut simple,
                self.context.backend.as_ref(),
                current.paths(),
                generated,
            )
            .map_err(|err| match &compiled {
                Compiled::Generator(generator) => err.framed("replace pattern", generator.source()),
                Compiled::Nothing | Compiled::PerMatch => err,
            })?;
        }
        debug!(
            target: "graft::replace",
            matches = self.matches.len(),
            "replace complete"
        );
        Ok(())
    }

    /// Removes every match, last match first.
    ///
    /// # Errors
    ///
    /// Fails when a matched node was already removed.
    pub fn remove(&self) -> Result<(), GraftError> {
        for current in self.matches.iter().rev() {
            let mut doc = self.context.doc.borrow_mut();
            let mut simple = self.context.simple.borrow_mut();
            remove_paths(&mut doc, &mut simple, current.paths())?;
        }
        Ok(())
    }

    fn compile_replacement(&self, replacement: &Replacement) -> Result<Compiled, GraftError> {
        match replacement {
            Replacement::Code(code) if code.trim().is_empty() => Ok(Compiled::Nothing),
            Replacement::Code(code) => {
                let pattern = self
                    .context
                    .backend
                    .parse_pattern(code)
                    .map_err(|err| GraftError::from(err).framed("replace pattern", code))?;
                Ok(Compiled::Generator(Generator::compile(pattern)))
            }
            Replacement::Pattern(pattern) => Ok(Compiled::Generator(Generator::compile(
                pattern.clone(),
            ))),
            Replacement::Nodes(_) | Replacement::Callback(_) => Ok(Compiled::PerMatch),
        }
    }

    fn generate_for(
        &self,
        replacement: &Replacement,
        compiled: &Compiled,
        current: &Match,
    ) -> Result<Vec<NodeId>, GraftError> {
        match compiled {
            Compiled::Generator(generator) => self.run_generator(generator, current.bindings()),
            Compiled::Nothing => Ok(Vec::new()),
            Compiled::PerMatch => {
                let single = self.narrow(vec![current.clone()]);
                let resolved = resolve(replacement, &single)?;
                match self.compile_replacement(&resolved)? {
                    Compiled::Generator(generator) => {
                        self.run_generator(&generator, current.bindings())
                    }
                    Compiled::Nothing => Ok(Vec::new()),
                    Compiled::PerMatch => self.copy_nodes(&resolved),
                }
            }
        }
    }

    fn run_generator(
        &self,
        generator: &Generator,
        bindings: &Bindings,
    ) -> Result<Vec<NodeId>, GraftError> {
        let mut doc = self.context.doc.borrow_mut();
        generator
            .generate(&mut doc, bindings, self.context.backend.as_ref())
            .map_err(|err| err.framed("replace pattern", generator.source()))
    }

    /// Copies the nodes held by a `Replacement::Nodes` wrapper into this
    /// document.
    fn copy_nodes(&self, replacement: &Replacement) -> Result<Vec<NodeId>, GraftError> {
        let Replacement::Nodes(source) = replacement else {
            return Ok(Vec::new());
        };
        let paths = source.paths();
        let mut doc = self.context.doc.borrow_mut();
        if Rc::ptr_eq(&source.context, &self.context) {
            let mut copies = Vec::with_capacity(paths.len());
            for path in paths {
                copies.push(doc.clone_subtree(path)?);
            }
            return Ok(copies);
        }
        let other = source.context.doc.borrow();
        Ok(paths
            .into_iter()
            .map(|path| doc.import_subtree(&other, path))
            .collect())
    }
}

/// Follows replacement callbacks until a concrete replacement comes back.
fn resolve(replacement: &Replacement, single: &Astx) -> Result<Replacement, GraftError> {
    let mut current = replacement.clone();
    while let Replacement::Callback(callback) = &current {
        let next = callback(single, single.backend())?;
        current = next;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_syntax::TreeSitterBackend;

    fn parse(source: &str) -> Astx {
        Astx::parse(Rc::new(TreeSitterBackend::default()), source)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    #[test]
    fn captures_are_reachable_by_name() {
        let astx = parse("foo(1, 2);\nfoo(3);");
        let calls = astx
            .find("foo($$args)")
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(calls.size(), 2);
        let args = calls.get_capture("$$args");
        assert_eq!(args.placeholder(), Some("$$args"));
        let texts: Vec<String> = args
            .iter()
            .map(|arg| arg.code().unwrap_or_else(|err| panic!("{err}")))
            .collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn empty_wrappers_yield_empty_captures() {
        let astx = parse("bar();");
        let none = astx.find("foo($a)").unwrap_or_else(|err| panic!("{err}"));
        assert!(!none.matched());
        assert_eq!(none.get_capture("$a").size(), 0);
        assert!(matches!(
            none.code(),
            Err(GraftError::MissingMatch { operation: "code" })
        ));
    }

    #[test]
    fn nested_finds_see_outer_captures() {
        let astx = parse("function f(a) { return a + b; }");
        let functions = astx
            .find("function $name($param) { $$body }")
            .unwrap_or_else(|err| panic!("{err}"));
        let uses = functions
            .find("$param + $other")
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(uses.size(), 1);
        assert_eq!(
            uses.get_capture("$other")
                .code()
                .unwrap_or_else(|err| panic!("{err}")),
            "b"
        );
    }

    #[test]
    fn predicates_select_nodes() {
        let astx = parse("a; b; c;");
        let found = astx
            .find(Query::predicate(|candidate| {
                candidate.code().is_ok_and(|code| code == "b")
            }))
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(found.size(), 1);
    }

    #[test]
    fn string_values_come_from_string_captures() {
        let astx = parse("t.string(\"foo\");");
        let found = astx
            .find("t.string('$s')")
            .unwrap_or_else(|err| panic!("{err}"));
        let value = found
            .get_capture("$s")
            .string_value()
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(value, "foo");
    }

    #[test]
    fn find_errors_are_framed() {
        let astx = parse("foo();");
        let err = astx
            .find("foo(")
            .err()
            .unwrap_or_else(|| panic!("expected an error"));
        assert!(matches!(err, GraftError::Framed { role: "find pattern", .. }));
    }

    #[test]
    fn capture_wrappers_can_replace_matches() {
        let astx = parse("wrap(inner(1));");
        let found = astx
            .find("wrap($x)")
            .unwrap_or_else(|err| panic!("{err}"));
        let inner = found.get_capture("$x");
        found
            .replace(Replacement::Nodes(inner))
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(astx.source(), "inner(1);");
    }

    #[test]
    fn remove_prunes_statements() {
        let astx = parse("a();\nb();\nc();");
        astx.find("b()")
            .and_then(|found| found.remove())
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(astx.source(), "a();\nc();");
    }
}
