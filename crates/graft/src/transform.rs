//! Running one transform over one source file.
//!
//! [`run_transform`] never fails: parse errors, pattern errors and callback
//! failures are captured in the returned [`TransformResult`] so a caller
//! processing many files can report them per file and carry on.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use graft_syntax::{Backend, Location, SupportedLanguage, TreeSitterBackend};
use tracing::{debug, warn};

use crate::astx::{Astx, Replacement};
use crate::bindings::{Bindings, Match};
use crate::error::GraftError;
use crate::find::FindOptions;

/// Shared cancellation flag.
///
/// Checked before and after parsing and before and after running the
/// transform; an operation already under way runs to completion.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    /// Creates a signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal.
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a transform callback asks the runner to do with the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// Emit the edited document.
    Regenerate,
    /// Leave the file alone.
    Unchanged,
    /// Emit this text instead.
    Source(String),
}

/// Transform callback.
pub type TransformCallback =
    Box<dyn Fn(&mut TransformContext<'_>) -> Result<TransformOutcome, GraftError>>;

/// A transform to apply to one file.
pub enum Transform {
    /// Find a pattern, optionally replacing every match.
    FindReplace {
        /// Find pattern source.
        find: String,
        /// Replacement pattern source; without one only matches are
        /// reported.
        replace: Option<String>,
        /// Capture conditions.
        options: FindOptions,
    },
    /// Arbitrary logic over the parsed file.
    Callback(TransformCallback),
}

impl Transform {
    /// A find-only transform.
    #[must_use]
    pub fn find(pattern: impl Into<String>) -> Self {
        Self::FindReplace {
            find: pattern.into(),
            replace: None,
            options: FindOptions::default(),
        }
    }

    /// A find-and-replace transform.
    #[must_use]
    pub fn find_replace(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::FindReplace {
            find: pattern.into(),
            replace: Some(replacement.into()),
            options: FindOptions::default(),
        }
    }

    /// A callback transform.
    #[must_use]
    pub fn callback(
        callback: impl Fn(&mut TransformContext<'_>) -> Result<TransformOutcome, GraftError> + 'static,
    ) -> Self {
        Self::Callback(Box::new(callback))
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindReplace {
                find,
                replace,
                options,
            } => f
                .debug_struct("FindReplace")
                .field("find", find)
                .field("replace", replace)
                .field("options", options)
                .finish(),
            Self::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// What a transform callback can see and record.
#[derive(Debug)]
pub struct TransformContext<'a> {
    astx: Astx,
    source: &'a str,
    file: &'a Utf8Path,
    reports: Vec<String>,
    marked: Vec<FoundMatch>,
}

impl TransformContext<'_> {
    /// Wrapper over the document root.
    #[must_use]
    pub const fn astx(&self) -> &Astx {
        &self.astx
    }

    /// Original source text.
    #[must_use]
    pub const fn source(&self) -> &str {
        self.source
    }

    /// Path of the file being transformed.
    #[must_use]
    pub const fn file(&self) -> &Utf8Path {
        self.file
    }

    /// Records a message for the caller.
    pub fn report(&mut self, message: impl Into<String>) {
        self.reports.push(message.into());
    }

    /// Records the matches of `found` as results of the transform, as
    /// they read now.
    pub fn mark(&mut self, found: &Astx) {
        self.marked.extend(summarize(found, found.matches()));
    }
}

/// Inputs of [`run_transform`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Path reported in the result.
    pub file: Utf8PathBuf,
    /// Source text to transform.
    pub source: String,
    /// Grammar flavour to parse with.
    pub language: SupportedLanguage,
    /// Emit text-spliced output when every replacement allowed it.
    pub prefer_simple_replacement: bool,
    /// Cancellation flag.
    pub abort: Option<AbortSignal>,
}

impl RunOptions {
    /// Options for `source`, with the language detected from `file`.
    #[must_use]
    pub fn new(file: impl Into<Utf8PathBuf>, source: impl Into<String>) -> Self {
        let path = file.into();
        let language = path
            .extension()
            .and_then(SupportedLanguage::from_extension)
            .unwrap_or_default();
        Self {
            file: path,
            source: source.into(),
            language,
            prefer_simple_replacement: false,
            abort: None,
        }
    }
}

/// A match as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundMatch {
    /// Location of the first matched node.
    pub location: Option<Location>,
    /// Code of the matched nodes.
    pub code: String,
    /// Code of every capture, array captures joined with `, `.
    pub captures: BTreeMap<String, String>,
}

/// Outcome of running a transform over one file.
#[derive(Debug)]
pub struct TransformResult {
    /// Path of the file.
    pub file: Utf8PathBuf,
    /// Original source.
    pub source: String,
    /// New source, when the transform changed the file.
    pub transformed: Option<String>,
    /// Messages reported by the transform.
    pub reports: Vec<String>,
    /// Matches found or marked by the transform.
    pub matches: Vec<FoundMatch>,
    /// The failure, when the transform failed.
    pub error: Option<GraftError>,
}

struct Executed {
    transformed: Option<String>,
    reports: Vec<String>,
    matches: Vec<FoundMatch>,
}

/// Applies `transform` to one source file.
#[must_use]
pub fn run_transform(transform: &Transform, options: RunOptions) -> TransformResult {
    let mut result = TransformResult {
        file: options.file.clone(),
        source: options.source.clone(),
        transformed: None,
        reports: Vec::new(),
        matches: Vec::new(),
        error: None,
    };
    match execute(transform, &options) {
        Ok(executed) => {
            debug!(
                target: "graft::transform",
                file = %options.file,
                matches = executed.matches.len(),
                changed = executed.transformed.is_some(),
                "transform complete"
            );
            result.transformed = executed.transformed;
            result.reports = executed.reports;
            result.matches = executed.matches;
        }
        Err(error) => {
            warn!(target: "graft::transform", file = %options.file, %error, "transform failed");
            result.error = Some(error);
        }
    }
    result
}

fn check_abort(options: &RunOptions) -> Result<(), GraftError> {
    if options.abort.as_ref().is_some_and(AbortSignal::is_aborted) {
        return Err(GraftError::Aborted);
    }
    Ok(())
}

fn execute(transform: &Transform, options: &RunOptions) -> Result<Executed, GraftError> {
    check_abort(options)?;
    let backend: Rc<dyn Backend> = Rc::new(TreeSitterBackend::new(options.language));
    let astx = Astx::parse(backend, &options.source)?;
    check_abort(options)?;
    let (outcome, reports, matches) = match transform {
        Transform::FindReplace {
            find,
            replace,
            options: find_options,
        } => {
            let found = astx.find_with(find.as_str(), find_options)?;
            let matches = summarize(&astx, found.matches());
            let outcome = match replace {
                Some(replacement) if found.matched() => {
                    found.replace(Replacement::from(replacement.as_str()))?;
                    TransformOutcome::Regenerate
                }
                _ => TransformOutcome::Unchanged,
            };
            (outcome, Vec::new(), matches)
        }
        Transform::Callback(callback) => {
            let mut context = TransformContext {
                astx: astx.clone(),
                source: &options.source,
                file: &options.file,
                reports: Vec::new(),
                marked: Vec::new(),
            };
            let outcome = callback(&mut context)?;
            (outcome, context.reports, context.marked)
        }
    };
    check_abort(options)?;
    let transformed = match outcome {
        TransformOutcome::Unchanged => None,
        TransformOutcome::Source(text) => Some(text),
        TransformOutcome::Regenerate => Some(output(&astx, options.prefer_simple_replacement)),
    }
    .filter(|text| *text != options.source);
    Ok(Executed {
        transformed,
        reports,
        matches,
    })
}

fn output(astx: &Astx, prefer_simple: bool) -> String {
    if prefer_simple && let Some(spliced) = astx.simple_output() {
        debug!(target: "graft::transform", "using simple replacements");
        return spliced;
    }
    astx.source()
}

/// Describes matches for the caller.
fn summarize(astx: &Astx, matches: &[Match]) -> Vec<FoundMatch> {
    let doc = astx.ast();
    let backend = astx.backend();
    matches
        .iter()
        .map(|found| {
            let codes: Vec<String> = found
                .paths()
                .iter()
                .map(|path| backend.generate(&doc, *path))
                .collect();
            FoundMatch {
                location: found.node().and_then(|node| backend.location(&doc, node)),
                code: codes.join("\n"),
                captures: capture_codes(&doc, backend, found.bindings()),
            }
        })
        .collect()
}

fn capture_codes(
    doc: &graft_syntax::Ast,
    backend: &dyn Backend,
    bindings: &Bindings,
) -> BTreeMap<String, String> {
    let mut codes: BTreeMap<String, String> = bindings
        .captures()
        .iter()
        .map(|(key, node)| (key.clone(), backend.generate(doc, *node)))
        .collect();
    for (key, nodes) in bindings.array_captures() {
        let parts: Vec<String> = nodes
            .iter()
            .map(|node| backend.generate(doc, *node))
            .collect();
        codes.insert(key.clone(), parts.join(", "));
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn run(transform: &Transform, source: &str) -> TransformResult {
        run_transform(transform, RunOptions::new("input.ts", source))
    }

    #[test]
    fn find_only_reports_matches_without_output() {
        let result = run(&Transform::find("foo($a)"), "foo(1);\nfoo(bar);");
        assert!(result.error.is_none());
        assert!(result.transformed.is_none());
        let captures: Vec<&str> = result
            .matches
            .iter()
            .filter_map(|found| found.captures.get("$a").map(String::as_str))
            .collect();
        assert_eq!(captures, vec!["1", "bar"]);
        let lines: Vec<u32> = result
            .matches
            .iter()
            .filter_map(|found| found.location.as_ref().map(|loc| loc.start_line))
            .collect();
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn replacement_produces_new_source() {
        let result = run(&Transform::find_replace("foo($a)", "bar($a)"), "foo(1);\n");
        assert_eq!(result.transformed.as_deref(), Some("bar(1);\n"));
        assert_eq!(
            result.matches.first().map(|found| found.code.as_str()),
            Some("foo(1)")
        );
    }

    #[rstest]
    #[case("baz($a)")]
    #[case("$a")]
    fn unmatched_patterns_leave_the_file_alone(#[case] pattern: &str) {
        let transform = Transform::find_replace("missing($a)", pattern);
        let result = run(&transform, "foo(1);");
        assert!(result.transformed.is_none());
        assert!(result.matches.is_empty());
    }

    #[test]
    fn identical_output_is_not_a_change() {
        let result = run(&Transform::find_replace("foo($a)", "foo($a)"), "foo(1);");
        assert!(result.transformed.is_none());
        assert_eq!(result.matches.len(), 1);
    }

    #[test]
    fn parse_errors_are_captured() {
        let result = run(&Transform::find("foo"), "foo(;");
        assert!(matches!(result.error, Some(GraftError::Syntax(_))));
        assert!(result.transformed.is_none());
    }

    #[test]
    fn aborted_runs_report_the_abort() {
        let signal = AbortSignal::new();
        signal.abort();
        let mut options = RunOptions::new("input.ts", "foo(1);");
        options.abort = Some(signal);
        let result = run_transform(&Transform::find("foo($a)"), options);
        assert!(matches!(result.error, Some(GraftError::Aborted)));
    }

    #[test]
    fn callbacks_report_and_mark() {
        let transform = Transform::callback(|context| {
            let calls = context.astx().find("console.log($$args)")?;
            context.report(format!("{} calls in {}", calls.size(), context.file()));
            context.mark(&calls);
            calls.remove()?;
            Ok(TransformOutcome::Regenerate)
        });
        let result = run(&transform, "console.log(a, b);\nkeep();\n");
        assert_eq!(result.reports, vec!["1 calls in input.ts".to_owned()]);
        assert_eq!(
            result
                .matches
                .first()
                .and_then(|found| found.captures.get("$$args"))
                .map(String::as_str),
            Some("a, b")
        );
        assert_eq!(result.transformed.as_deref(), Some("keep();\n"));
    }

    #[test]
    fn callback_errors_are_captured() {
        let transform =
            Transform::callback(|_context| Err(GraftError::transform("refusing to run")));
        let result = run(&transform, "foo();");
        assert_eq!(
            result.error.map(|err| err.to_string()).as_deref(),
            Some("refusing to run")
        );
    }

    #[test]
    fn callbacks_may_return_text() {
        let transform =
            Transform::callback(|_context| Ok(TransformOutcome::Source("// gone\n".to_owned())));
        let result = run(&transform, "foo();");
        assert_eq!(result.transformed.as_deref(), Some("// gone\n"));
    }

    #[test]
    fn simple_replacements_keep_surrounding_text() {
        let mut options = RunOptions::new("input.ts", "foo(1);   // note\nother( x );\n");
        options.prefer_simple_replacement = true;
        let result = run_transform(&Transform::find_replace("foo($a)", "bar($a)"), options);
        assert_eq!(
            result.transformed.as_deref(),
            Some("bar(1);   // note\nother( x );\n")
        );
    }
}
