//! Failures reported by the binary.

use predicates::prelude::*;

use crate::common::TestProject;
use crate::meshmerge;

#[test]
fn test_help() {
    meshmerge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("plan"));
}

#[test]
fn test_missing_input_file() {
    let project = TestProject::new().unwrap();

    meshmerge()
        .current_dir(project.path())
        .args(["merge", "-i", "missing.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing.yaml"))
        .stderr(predicate::str::contains("suggestion"));
}

#[test]
fn test_empty_directory() {
    let project = TestProject::new().unwrap();

    meshmerge()
        .current_dir(project.path())
        .args(["plan", "-i", "manifests"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input files found"));
}

#[test]
fn test_distinct_names_are_distinct_resources() {
    let project = TestProject::new().unwrap();
    project.write_manifest("a.yaml", "network:\n  schemaVersion: 1.0.0-preview2\n  name: a\n").unwrap();
    project.write_manifest("b.yaml", "network:\n  schemaVersion: 1.0.0-preview2\n  name: b\n").unwrap();

    meshmerge()
        .current_dir(project.path())
        .args(["merge", "-i", "manifests", "-o", "out"])
        .assert()
        .success();
    assert_eq!(project.output_files().unwrap().len(), 2);
}

#[test]
fn test_malformed_document() {
    let project = TestProject::new().unwrap();
    project
        .write_manifest("two.yaml", "network:\n  name: a\nvolume:\n  name: b\n")
        .unwrap();

    meshmerge()
        .current_dir(project.path())
        .args(["merge", "-i", "manifests", "-o", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed document"))
        .stderr(predicate::str::contains("two.yaml"));
}

#[test]
fn test_coercion_error() {
    let project = TestProject::new().unwrap();
    project
        .write_manifest(
            "app.yaml",
            "application:\n  schemaVersion: 1.0.0-preview2\n  name: app\n  properties:\n    services:\n      - name: web\n        properties:\n          replicaCount: many\n",
        )
        .unwrap();

    meshmerge()
        .current_dir(project.path())
        .args(["merge", "-i", "manifests", "-o", "out", "--format", "arm-json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot coerce 'many'"));

    assert!(!project.out_dir().join("arm_rp.json").exists());
}

#[test]
fn test_invalid_parameters() {
    let project = TestProject::with_samples().unwrap();

    meshmerge()
        .current_dir(project.path())
        .args(["merge", "-i", "manifests", "--parameters", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid parameters"));
}

#[test]
fn test_unknown_schema_version() {
    let project = TestProject::new().unwrap();
    project.write_manifest("net.yaml", "network:\n  schemaVersion: 0.1\n  name: n\n").unwrap();

    meshmerge()
        .current_dir(project.path())
        .args(["merge", "-i", "manifests", "-o", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown resource type 'network'"));
}

#[test]
fn test_bad_settings_file() {
    let project = TestProject::with_samples().unwrap();
    project.write_file("settings.toml", "primary_key = \"\"\n").unwrap();

    meshmerge()
        .current_dir(project.path())
        .args(["--settings", "settings.toml", "plan", "-i", "manifests"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("primary_key must not be empty"));
}

#[test]
fn test_output_dir_over_inputs() {
    let project = TestProject::with_samples().unwrap();

    for output_dir in ["manifests", "."] {
        meshmerge()
            .current_dir(project.path())
            .args(["merge", "-i", "manifests", "-o", output_dir])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("refusing to clear"));
    }
    assert!(project.manifests_dir().join("app_base.yaml").exists());
}
