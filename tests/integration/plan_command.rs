//! `meshmerge plan` end to end.

use predicates::prelude::*;

use crate::common::TestProject;
use crate::meshmerge;

#[test]
fn test_plan_text() {
    let project = TestProject::with_samples().unwrap();

    meshmerge()
        .current_dir(project.path())
        .args(["plan", "-i", "manifests"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  1. secret/shopSecret"))
        .stdout(predicate::str::contains("  2. secretValue/shopSecret/v1"))
        .stdout(predicate::str::contains("  5. application/shop"))
        .stdout(predicate::str::contains("depends on: (nothing)"));

    assert!(!project.path().join("meshDeploy").exists());
}

#[test]
fn test_plan_json() {
    let project = TestProject::with_samples().unwrap();

    let output = meshmerge()
        .current_dir(project.path())
        .args(["plan", "-i", "manifests", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let steps = plan["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 5);
    assert_eq!(steps[1]["type"], "secretValue");
    assert_eq!(
        steps[1]["dependsOn"],
        serde_json::json!(["Microsoft.ServiceFabricMesh/secrets/shopSecret"])
    );
    assert_eq!(steps[4]["order"], 5);
    assert_eq!(steps[4]["sources"].as_array().unwrap().len(), 2);
}
