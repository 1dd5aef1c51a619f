//! Unit tests for matching and replacement through [`Astx`].

use std::rc::Rc;

use graft_syntax::TreeSitterBackend;
use rstest::rstest;

use crate::{Astx, FindOptions, GraftError, Replacement};

fn parse(source: &str) -> Astx {
    Astx::parse(Rc::new(TreeSitterBackend::default()), source)
        .unwrap_or_else(|err| panic!("parse: {err}"))
}

fn count(pattern: &str, source: &str) -> usize {
    parse(source)
        .find(pattern)
        .unwrap_or_else(|err| panic!("find: {err}"))
        .size()
}

fn rewrite(source: &str, pattern: &str, replacement: &str) -> String {
    let root = parse(source);
    root.find(pattern)
        .and_then(|found| found.replace(replacement))
        .unwrap_or_else(|err| panic!("replace: {err}"));
    root.source()
}

// =============================================================================
// Matching
// =============================================================================

#[rstest]
#[case("$a + $a", "1 + 1", 1)]
#[case("$a + $a", "1 + 2", 0)]
#[case("$a + $a", "foo(x) + foo( x )", 1)]
#[case("$_ + $_", "1 + 2", 1)]
#[case("$_x + $_x", "1 + 2", 1)]
fn repeated_captures_must_agree(#[case] pattern: &str, #[case] source: &str, #[case] expected: usize) {
    assert_eq!(count(pattern, source), expected);
}

#[rstest]
#[case("`foo`", "x = 'foo';", 1)]
#[case("`foo`", "x = `foo`;", 1)]
#[case("'foo'", "x = `foo`;", 1)]
#[case("\"foo\"", "x = 'foo';", 1)]
#[case("'foo'", "x = 'bar';", 0)]
#[case("`foo${x}`", "y = 'foo';", 0)]
fn strings_match_regardless_of_quotes(
    #[case] pattern: &str,
    #[case] source: &str,
    #[case] expected: usize,
) {
    assert_eq!(count(pattern, source), expected);
}

#[rstest]
#[case("x = 10", "x = 0xa;", 1)]
#[case("x = 1.5", "x = 1.50;", 1)]
#[case("x = 1", "x = 2;", 0)]
#[case("/a+/gi", "r = /a+/ig;", 1)]
#[case("/a+/g", "r = /a+/i;", 0)]
fn literals_compare_by_value(#[case] pattern: &str, #[case] source: &str, #[case] expected: usize) {
    assert_eq!(count(pattern, source), expected);
}

#[test]
fn escaped_placeholders_match_literally() {
    assert_eq!(count("$_$foo()", "$foo();\nbar();"), 1);
    assert_eq!(count("$_$foo()", "bar();"), 0);
}

#[test]
fn segment_captures_absorb_gaps_in_objects() {
    let root = parse("x = {a: 1, ...x, b: 2, c, ...d, e: 5, f};");
    let found = root
        .find("{ $$a, c, $b, e: 5, f }")
        .unwrap_or_else(|err| panic!("find: {err}"));
    assert_eq!(found.size(), 1);
    let segment: Vec<String> = found
        .get_capture("$$a")
        .iter()
        .map(|item| item.code().unwrap_or_else(|err| panic!("{err}")))
        .collect();
    assert_eq!(segment, vec!["a: 1", "...x", "b: 2"]);
    assert_eq!(
        found
            .get_capture("$b")
            .code()
            .unwrap_or_else(|err| panic!("{err}")),
        "...d"
    );
}

#[rstest]
#[case("{ $$a, c, $b, e: 5, f }", "x = {a: 1, b: 2, c, e: 5, f};", 0)]
#[case("{ $$a, c, $b, e: 5, f }", "x = {a: 1, b: 2, c, ...d, e: 5 };", 0)]
#[case("{ c, f, $$rest }", "x = {a: 1, c, b: 2, f, g};", 1)]
#[case("{ f, c, $$rest }", "x = {a: 1, c, b: 2, f, g};", 0)]
fn object_members_keep_their_pattern_order(
    #[case] pattern: &str,
    #[case] source: &str,
    #[case] expected: usize,
) {
    assert_eq!(count(pattern, source), expected);
}

#[test]
fn segment_captures_collect_members_around_anchors() {
    let root = parse("x = {a: 1, c, b: 2, f, g};");
    let found = root
        .find("{ c, f, $$rest }")
        .unwrap_or_else(|err| panic!("find: {err}"));
    let rest: Vec<String> = found
        .get_capture("$$rest")
        .iter()
        .map(|item| item.code().unwrap_or_else(|err| panic!("{err}")))
        .collect();
    assert_eq!(rest, vec!["a: 1", "b: 2", "g"]);
}

#[test]
fn nested_object_segments_capture_their_own_members() {
    let source = "const a = {foo: 'bar', baz: 'qux', glorm: {a: 1, b: 2, c: 3, d: 4, ...qlom}};\n\
                  const b = {foo: 'bar', glorm: {a: 1, c: 3}};";
    let root = parse(source);
    let found = root
        .find("{foo: 'bar', glorm: {a: 1, b: 2, ...$$inner}, ...$$outer}")
        .unwrap_or_else(|err| panic!("find: {err}"));
    assert_eq!(found.size(), 1);
    let codes = |name: &str| -> Vec<String> {
        found
            .get_capture(name)
            .iter()
            .map(|item| item.code().unwrap_or_else(|err| panic!("{err}")))
            .collect()
    };
    assert_eq!(codes("$$inner"), vec!["c: 3", "d: 4", "...qlom"]);
    assert_eq!(codes("$$outer"), vec!["baz: 'qux'"]);
}

#[rstest]
#[case("function x(bar) { }", 1)]
#[case("function y(bar = 2) { }", 1)]
#[case("function w(bar = 2, baz) { }", 0)]
fn optional_defaults_match_when_absent(#[case] source: &str, #[case] expected: usize) {
    assert_eq!(count("function $f($a = $Optional($b)) { }", source), expected);
    assert_eq!(count("function $f($a = $Maybe($b)) { }", source), expected);
}

#[test]
fn absent_optional_defaults_leave_their_capture_unbound() {
    let root = parse("function x(bar) { }\nfunction y(bar = 2) { }");
    let found = root
        .find("function $f($a = $Optional($b)) { }")
        .unwrap_or_else(|err| panic!("find: {err}"));
    assert_eq!(found.size(), 2);
    let code = |wrapper: Astx| wrapper.code().unwrap_or_else(|err| panic!("{err}"));
    let first = found.at(0);
    assert_eq!(code(first.get_capture("$a")), "bar");
    assert_eq!(first.get_capture("$b").size(), 0);
    assert_eq!(code(found.at(1).get_capture("$b")), "2");
}

#[rstest]
#[case("const { a = $Maybe(1) } = obj;", "const { a } = obj;", 1)]
#[case("const [x = $Maybe($d)] = list;", "const [x] = list;", 1)]
#[case("let $v = $Maybe($init);", "let v;", 1)]
#[case("let $v = $Maybe(1);", "let v = 2;", 0)]
fn optional_defaults_in_declarations(
    #[case] pattern: &str,
    #[case] source: &str,
    #[case] expected: usize,
) {
    assert_eq!(count(pattern, source), expected);
}

#[rstest]
#[case("foo($$a, 3)", "foo(1, 2, 3);", 1)]
#[case("foo($$a, 3)", "foo(3);", 1)]
#[case("foo($$a, 3)", "foo(1, 2);", 0)]
#[case("foo(1, $$$rest)", "foo(1, 2, 3);", 1)]
#[case("foo($a)", "foo(1, 2);", 0)]
fn argument_lists_splice(#[case] pattern: &str, #[case] source: &str, #[case] expected: usize) {
    assert_eq!(count(pattern, source), expected);
}

#[test]
fn statement_sequences_match_consecutive_statements() {
    let source = "const a = 1;\nconst b = 2;\nuse(a, b);";
    assert_eq!(count("const a = 1;\nconst b = 2;", source), 1);
    assert_eq!(count("const a = 1;\nuse(a, b);", source), 0);
}

#[test]
fn nested_matches_are_reported() {
    assert_eq!(count("$a + 1", "(x + 1) + 1;"), 2);
}

#[test]
fn conditions_restrict_captures() {
    let root = parse("foo(1);\nfoo(bar);");
    let options = FindOptions::new().where_capture("$a", |view| view.kind() == "number");
    let found = root
        .find_with("foo($a)", &options)
        .unwrap_or_else(|err| panic!("find: {err}"));
    assert_eq!(found.code().unwrap_or_else(|err| panic!("{err}")), "foo(1)");
}

#[test]
fn closest_walks_to_the_nearest_ancestor() {
    let root = parse("function outer() { function inner() { target(); } }");
    let call = root
        .find("target()")
        .unwrap_or_else(|err| panic!("find: {err}"));
    let enclosing = call
        .closest("function $name() { $$body }")
        .unwrap_or_else(|err| panic!("closest: {err}"));
    assert_eq!(
        enclosing
            .get_capture("$name")
            .code()
            .unwrap_or_else(|err| panic!("{err}")),
        "inner"
    );
}

#[test]
fn destruct_only_tries_held_nodes() {
    let root = parse("foo(bar(1));");
    let calls = root.find("$f($x)").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(calls.size(), 2);
    let outer = calls
        .destruct("foo($x)")
        .unwrap_or_else(|err| panic!("destruct: {err}"));
    assert_eq!(outer.size(), 1);
}

#[test]
fn empty_documents_yield_no_matches() {
    assert_eq!(count("foo($a)", ""), 0);
}

#[test]
fn splices_in_single_positions_are_rejected() {
    let err = parse("x.y;")
        .find("$$a.y")
        .err()
        .unwrap_or_else(|| panic!("expected an error"));
    assert!(matches!(
        err.root_cause(),
        GraftError::PatternPosition { .. }
    ));
}

// =============================================================================
// Replacement
// =============================================================================

#[rstest]
#[case("foo(1, 2);", "foo($$args)", "bar($$args)", "bar(1, 2);")]
#[case("a + b;", "$x + $y", "$y + $x", "b + a;")]
#[case("f(a + b);", "f($x)", "$x * 2", "(a + b) * 2;")]
#[case("x = 'a';", "'$s'", "\"$s\"", "x = \"a\";")]
fn replacements_substitute_captures(
    #[case] source: &str,
    #[case] pattern: &str,
    #[case] replacement: &str,
    #[case] expected: &str,
) {
    assert_eq!(rewrite(source, pattern, replacement), expected);
}

#[test]
fn identity_replacements_preserve_source() {
    let source = "foo(a, b);\nconst x = [1, 2];";
    assert_eq!(rewrite(source, "foo($$args)", "foo($$args)"), source);
}

#[rstest]
#[case("const a = b;\n(c)();", "const $x = $y", "const $x = $y")]
#[case("function f() {\n  return 1;\n}\n[2].map(g);", "return $v", "return $v")]
#[case("import a from 'x';\n(b)();", "import $a from 'x'", "import $a from 'x'")]
#[case("export { a };\n(b)();", "export { $a }", "export { $a }")]
fn identity_replacements_keep_statement_semicolons(
    #[case] source: &str,
    #[case] pattern: &str,
    #[case] replacement: &str,
) {
    assert_eq!(rewrite(source, pattern, replacement), source);
}

#[test]
fn rewritten_declarations_keep_their_semicolons() {
    assert_eq!(
        rewrite("let a = 1;\n(f)();", "let $x = $v", "const $x = $v"),
        "const a = 1;\n(f)();"
    );
}

#[test]
fn leading_line_comments_of_inner_replacements_trail_the_statement() {
    assert_eq!(
        rewrite("const a = 1 + 2", "$a + $b", "// this is a test \n$b + $a"),
        "const a = 2 + 1 // this is a test"
    );
}

#[test]
fn nested_matches_are_rewritten_inside_out() {
    assert_eq!(
        rewrite("x = a + 1 + 1;", "$v + 1", "inc($v)"),
        "x = inc(inc(a));"
    );
}

#[test]
fn comments_follow_extracted_captures() {
    assert_eq!(
        rewrite("// keep\nt.string('foo');", "t.string('$s')", "$s"),
        "// keep\n'foo';"
    );
}

#[test]
fn expressions_become_statements_where_needed() {
    assert_eq!(
        rewrite("wrap(function f() {});", "wrap($fn)", "$fn"),
        "function f() {}"
    );
}

#[test]
fn blank_replacements_remove_matches() {
    assert_eq!(rewrite("debug(1);\nkeep();", "debug($$a)", ""), "keep();");
}

#[test]
fn callbacks_choose_replacements_per_match() {
    let root = parse("log(1);\nlog('a');");
    let found = root.find("log($x)").unwrap_or_else(|err| panic!("{err}"));
    found
        .replace(Replacement::callback(|single, _backend| {
            let code = single.get_capture("$x").code()?;
            Ok(Replacement::from(format!("print({code}, {})", code.len())))
        }))
        .unwrap_or_else(|err| panic!("replace: {err}"));
    assert_eq!(root.source(), "print(1, 1);\nprint('a', 3);");
}

#[test]
fn replace_pattern_errors_are_framed() {
    let root = parse("foo(1);");
    let err = root
        .find("foo($a)")
        .and_then(|found| found.replace("bar($a"))
        .err()
        .unwrap_or_else(|| panic!("expected an error"));
    assert!(matches!(
        err,
        GraftError::Framed {
            role: "replace pattern",
            ..
        }
    ));
}
