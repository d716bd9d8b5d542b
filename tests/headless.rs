use std::fs;

use axion_host::content::ContentSource;
use axion_host::headless;
use axion_host::model::config::AppConfig;

fn config() -> AppConfig {
    AppConfig::from_layers(None).unwrap()
}

#[test]
fn bundled_page_runs_clean() {
    let mut out = Vec::new();
    let report = headless::run(&config(), ContentSource::Bundled, &mut out).unwrap();

    assert_eq!(report.capabilities, vec!["System".to_string()]);
    assert!(!report.failed());
    assert!(!report.outcomes.is_empty());

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("capabilities: System\n"));
    assert!(text.contains("page: Axion"));
    assert!(text.contains("System.getInfo ->"));
}

#[test]
fn missing_capability_marks_the_run_failed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.toml");
    fs::write(
        &path,
        r#"
[page]
title = "Camera"
requires = ["Camera"]

[[startup]]
capability = "Camera"
method = "snap"
"#,
    )
    .unwrap();

    let mut out = Vec::new();
    let report = headless::run(&config(), ContentSource::File(path), &mut out).unwrap();

    assert!(report.failed());
    assert_eq!(report.missing, vec!["Camera".to_string()]);
    assert_eq!(report.outcomes.len(), 1);
    assert!(!report.outcomes[0].is_ok());

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("capability not registered: Camera"));
}

#[test]
fn exit_call_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.toml");
    fs::write(
        &path,
        r#"
[page]
title = "Bye"

[[startup]]
capability = "System"
method = "exit"
"#,
    )
    .unwrap();

    let mut out = Vec::new();
    let report = headless::run(&config(), ContentSource::File(path), &mut out).unwrap();

    assert!(!report.failed());
    assert!(report.exit_requested);
}

#[test]
fn unreadable_page_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut out = Vec::new();
    let result = headless::run(
        &config(),
        ContentSource::File(dir.path().join("absent.toml")),
        &mut out,
    );
    assert!(result.is_err());
}
