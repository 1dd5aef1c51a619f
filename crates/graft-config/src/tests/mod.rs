//! Unit tests for configuration loading.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{Config, ConfigError, ConfigOverrides, LogFormat, ParserKind};

#[fixture]
fn workspace() -> TempDir {
    tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"))
}

fn root_of(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .unwrap_or_else(|path| panic!("non UTF-8 temp dir: {}", path.display()))
}

fn write(path: &Utf8Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap_or_else(|err| panic!("mkdir: {err}"));
    }
    fs::write(path, contents).unwrap_or_else(|err| panic!("write: {err}"));
}

#[test]
fn defaults_are_quiet_and_automatic() {
    let config = Config::default();
    assert_eq!(config.log_filter(), "warn");
    assert_eq!(config.log_format(), LogFormat::Compact);
    assert_eq!(config.parser(), ParserKind::Auto);
    assert!(!config.prefer_simple_replacement());
}

#[rstest]
#[case("tsx", ParserKind::Tsx)]
#[case("JS", ParserKind::Tsx)]
#[case("ts", ParserKind::Typescript)]
#[case("typescript", ParserKind::Typescript)]
#[case("auto", ParserKind::Auto)]
fn parser_names_parse(#[case] name: &str, #[case] expected: ParserKind) {
    assert_eq!(name.parse::<ParserKind>().ok(), Some(expected));
}

#[rstest]
#[case("json", LogFormat::Json, true)]
#[case("Compact", LogFormat::Compact, false)]
fn log_formats_parse(#[case] name: &str, #[case] expected: LogFormat, #[case] structured: bool) {
    assert_eq!(name.parse::<LogFormat>().ok(), Some(expected));
    assert_eq!(expected.is_structured(), structured);
}

#[test]
fn partial_json_keeps_defaults() {
    let config = Config::from_json(
        r#"{ "parser": "ts", "prefer_simple_replacement": true }"#,
        Utf8Path::new("graft.json"),
    )
    .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(config.parser(), ParserKind::Typescript);
    assert!(config.prefer_simple_replacement());
    assert_eq!(config.log_filter(), "warn");
}

#[rstest]
#[case(r#"{ "parsre": "ts" }"#)]
#[case("not json")]
fn malformed_json_is_rejected(#[case] text: &str) {
    let err = Config::from_json(text, Utf8Path::new("graft.json"))
        .err()
        .unwrap_or_else(|| panic!("expected an error"));
    assert!(matches!(err, ConfigError::Json { .. }));
}

#[test]
fn empty_log_filters_are_rejected() {
    let err = Config::from_json(r#"{ "log_filter": " " }"#, Utf8Path::new("graft.json"))
        .err()
        .unwrap_or_else(|| panic!("expected an error"));
    assert!(matches!(err, ConfigError::InvalidValue { key: "log_filter", .. }));
}

#[rstest]
fn discovery_walks_up_to_the_nearest_file(workspace: TempDir) {
    let root = root_of(&workspace);
    write(&root.join("graft.json"), r#"{ "parser": "tsx" }"#);
    write(
        &root.join("pkg/package.json"),
        r#"{ "name": "pkg", "graft": { "parser": "typescript" } }"#,
    );
    let nested = root.join("pkg/src/deep");
    fs::create_dir_all(&nested).unwrap_or_else(|err| panic!("mkdir: {err}"));

    let (config, origin) = Config::discover(&nested)
        .unwrap_or_else(|err| panic!("{err}"))
        .unwrap_or_else(|| panic!("expected configuration"));
    assert_eq!(config.parser(), ParserKind::Typescript);
    assert_eq!(origin, root.join("pkg/package.json"));
}

#[rstest]
fn package_json_without_the_key_is_skipped(workspace: TempDir) {
    let root = root_of(&workspace);
    write(&root.join("graft.json"), r#"{ "prefer_simple_replacement": true }"#);
    write(&root.join("app/package.json"), r#"{ "name": "app" }"#);

    let (config, origin) = Config::discover(&root.join("app"))
        .unwrap_or_else(|err| panic!("{err}"))
        .unwrap_or_else(|| panic!("expected configuration"));
    assert!(config.prefer_simple_replacement());
    assert_eq!(origin, root.join("graft.json"));
}

#[test]
fn missing_files_report_io_errors() {
    let err = Config::load(Utf8Path::new("/definitely/not/here/graft.json"))
        .err()
        .unwrap_or_else(|| panic!("expected an error"));
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn overrides_win_over_loaded_values() {
    let overrides = ConfigOverrides {
        log_format: Some(LogFormat::Json),
        prefer_simple_replacement: Some(false),
        ..ConfigOverrides::default()
    };
    let config = Config::from_json(
        r#"{ "prefer_simple_replacement": true, "log_filter": "debug" }"#,
        Utf8Path::new("graft.json"),
    )
    .unwrap_or_else(|err| panic!("{err}"))
    .with_overrides(&overrides);
    assert_eq!(config.log_format(), LogFormat::Json);
    assert!(!config.prefer_simple_replacement());
    assert_eq!(config.log_filter(), "debug");
}
