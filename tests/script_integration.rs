//! Edit scripts loaded from disk and applied to parsed documents.

use std::fs;
use swift_surgeon::config::StepResult;
use swift_surgeon::{apply_script, load_config, load_script, parse, ApplicationError, ConfigError};
use tempfile::TempDir;

const SOURCE: &str = "struct Point {\n    let x: Int\n    let y: Int\n}\n";

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_script_steps_see_previous_results() {
    let dir = TempDir::new().unwrap();
    let script_path = write(
        &dir,
        "edits.toml",
        r#"
[meta]
name = "reshape point"

[[steps]]
id = "drop-x"
declaration = "1.1"
operation = { type = "delete" }

[[steps]]
id = "add-z"
declaration = "1.1"
operation = { type = "insert", text = "let z: Int", position = "after" }

[[steps]]
id = "document-point"
declaration = "1"
operation = { type = "document", text = "A point on a line." }
"#,
    );

    let script = load_script(&script_path).unwrap();
    assert_eq!(script.meta.name, "reshape point");
    assert_eq!(script.steps.len(), 3);

    let tree = parse("point.swift", SOURCE).tree;
    let outcome = apply_script(&tree, &script, &Default::default()).unwrap();
    assert_eq!(
        outcome.tree.render(),
        "/// A point on a line.\nstruct Point {\n    let y: Int\n    let z: Int\n}\n"
    );
    assert_eq!(outcome.results.len(), 3);
    assert!(matches!(
        &outcome.results[0],
        StepResult::Deleted { id, removed, .. } if id == "drop-x" && removed == "\n    let x: Int"
    ));
    assert!(matches!(&outcome.results[1], StepResult::Inserted { count: 1, .. }));
    assert!(matches!(&outcome.results[2], StepResult::Documented { target, .. } if target.path.to_string() == "1"));
    // The input snapshot is untouched.
    assert_eq!(tree.render(), SOURCE);
}

#[test]
fn test_invalid_script_reports_every_issue() {
    let dir = TempDir::new().unwrap();
    let script_path = write(
        &dir,
        "bad.toml",
        r#"
[[steps]]
id = "both"
path = "3"
declaration = "1"
operation = { type = "delete" }

[[steps]]
id = "neither"
operation = { type = "delete" }
"#,
    );

    let err = load_script(&script_path).unwrap_err();
    assert_eq!(err.path(), Some(script_path.as_path()));
    let ConfigError::Validation { source, .. } = &err else {
        panic!("expected a validation error, got {err}");
    };
    assert_eq!(source.issues.len(), 2);
}

#[test]
fn test_script_with_unknown_operation_is_rejected() {
    let dir = TempDir::new().unwrap();
    let script_path = write(
        &dir,
        "unknown.toml",
        r#"
[[steps]]
id = "rename"
path = "3"
operation = { type = "rename", to = "Q" }
"#,
    );
    assert!(matches!(
        load_script(&script_path),
        Err(ConfigError::Toml { .. })
    ));
}

#[test]
fn test_stale_path_stops_the_script() {
    let dir = TempDir::new().unwrap();
    let script_path = write(
        &dir,
        "stale.toml",
        r#"
[[steps]]
id = "drop-first"
declaration = "1.1"
operation = { type = "delete" }

[[steps]]
id = "drop-second"
declaration = "1.2"
operation = { type = "delete" }
"#,
    );
    let script = load_script(&script_path).unwrap();
    let tree = parse("point.swift", SOURCE).tree;
    let err = apply_script(&tree, &script, &Default::default()).unwrap_err();
    assert!(matches!(err, ApplicationError::Operation { ref id, .. } if id == "drop-second"));
}

#[test]
fn test_config_file_drives_engine_and_extractor() {
    let dir = TempDir::new().unwrap();
    let config_path = write(
        &dir,
        "surgeon.toml",
        r#"
[diagnostics]
context_radius = 0
reposition_unexpected_code = false

[mutation]
allow_item_swap = false

[output]
format = "json"
"#,
    );
    let config = load_config(&config_path).unwrap();
    let options = config.extractor_options();
    assert_eq!(options.context_radius, 0);
    assert!(!options.reposition);
    assert!(!config.engine().policy().allow_item_swap);
    assert_eq!(config.output.format, swift_surgeon::OutputFormat::Json);

    let out_of_range = write(&dir, "wide.toml", "[diagnostics]\ncontext_radius = 11\n");
    let err = load_config(&out_of_range).unwrap_err();
    assert!(err.to_string().contains("context_radius"), "{err}");
}
