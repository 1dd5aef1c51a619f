//! Unit tests for the CLI runtime.

use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::run;

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn file(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(&path, contents).unwrap_or_else(|err| panic!("write: {err}"));
        path
    }
}

#[fixture]
fn workspace() -> Workspace {
    let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .unwrap_or_else(|path| panic!("non UTF-8 temp dir: {}", path.display()));
    Workspace { _dir: dir, root }
}

fn invoke(args: &[&str]) -> (ExitCode, String, String) {
    let argv: Vec<OsString> = std::iter::once("graft")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run(argv, &mut stdout, &mut stderr);
    (
        code,
        String::from_utf8_lossy(&stdout).into_owned(),
        String::from_utf8_lossy(&stderr).into_owned(),
    )
}

#[rstest]
fn find_lists_matches(workspace: Workspace) {
    let file = workspace.file("app.ts", "foo(1);\nbar();\nfoo(2);\n");
    let (code, stdout, _) = invoke(&["--find", "foo($a)", file.as_str()]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(stdout, format!("{file}:1:1: foo(1)\n{file}:3:1: foo(2)\n"));
}

#[rstest]
fn replace_prints_transformed_source(workspace: Workspace) {
    let file = workspace.file("app.ts", "foo(1);\n");
    let (code, stdout, _) = invoke(&["-f", "foo($a)", "-r", "bar($a)", file.as_str()]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(stdout, format!("==> {file} <==\nbar(1);\n"));
    let on_disk = fs::read_to_string(&file).unwrap_or_else(|err| panic!("read: {err}"));
    assert_eq!(on_disk, "foo(1);\n");
}

#[rstest]
fn write_updates_files_in_place(workspace: Workspace) {
    let file = workspace.file("app.ts", "foo(1);\n");
    let (code, stdout, _) = invoke(&["-f", "foo($a)", "-r", "bar($a)", "--write", file.as_str()]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(stdout, format!("updated {file}\n"));
    let on_disk = fs::read_to_string(&file).unwrap_or_else(|err| panic!("read: {err}"));
    assert_eq!(on_disk, "bar(1);\n");
}

#[rstest]
fn json_output_describes_each_file(workspace: Workspace) {
    let file = workspace.file("app.ts", "foo(1);\n");
    let (code, stdout, _) = invoke(&["--json", "-f", "foo($a)", file.as_str()]);
    assert_eq!(code, ExitCode::SUCCESS);
    let value: serde_json::Value =
        serde_json::from_str(stdout.trim()).unwrap_or_else(|err| panic!("json: {err}"));
    let field = |pointer: &str| value.pointer(pointer).cloned().unwrap_or_default();
    assert_eq!(field("/file"), file.as_str());
    assert_eq!(field("/changed"), false);
    assert_eq!(field("/matches/0/captures/$a"), "1");
    assert_eq!(field("/matches/0/line"), 1);
}

#[rstest]
fn broken_files_fail_without_stopping_the_run(workspace: Workspace) {
    let broken = workspace.file("broken.ts", "foo(;\n");
    let good = workspace.file("good.ts", "foo(1);\n");
    let (code, stdout, stderr) = invoke(&["-f", "foo($a)", broken.as_str(), good.as_str()]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(stderr.contains(broken.as_str()), "stderr: {stderr}");
    assert!(stdout.contains(&format!("{good}:1:1: foo(1)")), "stdout: {stdout}");
}

#[rstest]
fn missing_files_are_reported(workspace: Workspace) {
    let missing = workspace.root.join("missing.ts");
    let (code, _, stderr) = invoke(&["-f", "foo", missing.as_str()]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(stderr.contains("failed to read"), "stderr: {stderr}");
}

#[rstest]
fn discovered_configuration_applies(workspace: Workspace) {
    workspace.file("graft.json", r#"{ "prefer_simple_replacement": true }"#);
    let file = workspace.file("app.ts", "foo( 1 );   // keep\n");
    let (code, stdout, _) = invoke(&["-f", "foo($a)", "-r", "bar($a)", file.as_str()]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(stdout, format!("==> {file} <==\nbar(1);   // keep\n"));
}

#[test]
fn write_requires_a_replacement() {
    let (code, _, stderr) = invoke(&["-f", "foo", "--write", "a.ts"]);
    assert_eq!(code, ExitCode::from(2));
    assert!(stderr.contains("--replace"), "stderr: {stderr}");
}
