//! Per-resource document output through the orchestrator.

use anyhow::Result;
use serde_json::json;
use std::fs;

use meshmerge_cli::config::MergeSettings;
use meshmerge_cli::core::MeshMergeError;
use meshmerge_cli::merge::SequenceMergePolicy;
use meshmerge_cli::orchestrator::{
    DocumentEncoding, MergeOrchestrator, MergeRequest, OutputFormat,
};
use meshmerge_cli::parameters::ParameterSet;
use meshmerge_cli::test_utils::init_test_logging;

use crate::common::TestProject;

const SF: &str = "Microsoft.ServiceFabricMesh";

fn orchestrator() -> MergeOrchestrator {
    init_test_logging(None);
    MergeOrchestrator::new(MergeSettings::builtin().unwrap())
}

fn request(project: &TestProject, inputs: Vec<String>) -> MergeRequest {
    let mut request = MergeRequest::new(inputs);
    request.output_dir = project.out_dir();
    request
}

#[test]
fn test_files_numbered_in_kind_order() -> Result<()> {
    let project = TestProject::new()?;
    let app = project.write_manifest(
        "app.yaml",
        "application:\n  schemaVersion: 1.0.0-preview2\n  name: shop\n",
    )?;
    let secret = project.write_manifest(
        "secret.yaml",
        "secret:\n  schemaVersion: 1.0.0-preview2\n  name: key\n",
    )?;
    let network = project.write_manifest(
        "network.yaml",
        "network:\n  schemaVersion: 1.0.0-preview2\n  name: net\n",
    )?;

    // Input order: secret, application, network
    let inputs = [secret, app, network].iter().map(|p| p.display().to_string()).collect();
    let mut request = request(&project, inputs);
    request.prefix = "merged-".to_string();

    let report = orchestrator().run(&request)?;

    assert_eq!(
        project.output_files()?,
        vec![
            "merged-0001_secret_key.json",
            "merged-0002_network_net.json",
            "merged-0003_application_shop.json",
        ]
    );
    let written: Vec<_> = report
        .files_written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(written, project.output_files()?);
    Ok(())
}

#[test]
fn test_document_contents() -> Result<()> {
    let project = TestProject::with_samples()?;
    let request = request(&project, vec![project.manifests_dir().display().to_string()]);

    let report = orchestrator().run(&request)?;
    assert_eq!(report.input_files, 6);
    assert_eq!(report.resources.len(), 5);

    let files = project.output_files()?;
    assert_eq!(
        files,
        vec![
            "0001_secret_shopSecret.json",
            "0002_secretValue_shopSecret_v1.json",
            "0003_volume_shopVolume.json",
            "0004_network_shopNetwork.json",
            "0005_application_shop.json",
        ]
    );

    let value = project.read_json("0002_secretValue_shopSecret_v1.json")?;
    assert_eq!(value["type"], "secretValue");
    assert_eq!(value["name"], "shopSecret/v1");
    assert_eq!(value["api-version"], "2018-09-01-preview");
    assert_eq!(value["fullyQualifiedResourceName"], format!("{SF}/secrets/values/shopSecret/v1"));
    assert_eq!(value["description"]["name"], "shopSecret/v1");

    let app = project.read_json("0005_application_shop.json")?;
    let services = &app["description"]["properties"]["services"];
    assert_eq!(services.as_array().unwrap().len(), 2);
    assert_eq!(services[0]["name"], "web");
    assert_eq!(services[0]["properties"]["replicaCount"], 1);
    assert_eq!(services[1]["name"], "worker");
    assert_eq!(services[1]["properties"]["replicaCount"], 2);

    let code = &services[1]["properties"]["codePackages"][0];
    assert_eq!(code["resources"]["requests"]["cpu"], 1.0);
    assert_eq!(code["volumeRefs"][0]["readOnly"], false);
    Ok(())
}

#[test]
fn test_yaml_output_and_description_filter() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(
        "net.yaml",
        "network:\n  schemaVersion: 1.0.0-preview1\n  name: net\n  properties:\n    kind: Local\n",
    )?;

    let mut request = request(&project, vec![project.manifests_dir().display().to_string()]);
    request.output_format = OutputFormat::PerResourceDocuments(DocumentEncoding::Yaml);
    request.description_filter = Some("properties".to_string());

    orchestrator().run(&request)?;

    assert_eq!(project.output_files()?, vec!["0001_network_net.yaml"]);
    let content = fs::read_to_string(project.out_dir().join("0001_network_net.yaml"))?;
    let value: serde_json::Value = serde_yaml::from_str(&content)?;
    assert_eq!(value["api-version"], "2018-07-01-preview");
    assert_eq!(value["description"], json!({"kind": "Local"}));
    Ok(())
}

#[test]
fn test_output_dir_is_cleared() -> Result<()> {
    let project = TestProject::with_samples()?;
    fs::create_dir_all(project.out_dir())?;
    fs::write(project.out_dir().join("stale.json"), "{}")?;

    let request = request(&project, vec![project.manifests_dir().display().to_string()]);
    orchestrator().run(&request)?;

    assert!(!project.out_dir().join("stale.json").exists());
    assert_eq!(project.output_files()?.len(), 5);
    Ok(())
}

#[test]
fn test_failed_merge_leaves_output_untouched() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("a.yaml", "network:\n  name: net\n  properties:\n    kind: Local\n")?;
    project.write_manifest("b.yaml", "network:\n  name: net\n  properties:\n    - Local\n")?;
    fs::create_dir_all(project.out_dir())?;
    fs::write(project.out_dir().join("previous.json"), "{}")?;

    let request = request(&project, vec![project.manifests_dir().display().to_string()]);
    let err = orchestrator().run(&request).unwrap_err();

    assert!(matches!(err, MeshMergeError::IncompatibleMerge { .. }), "got {err:?}");
    assert!(project.out_dir().join("previous.json").exists());
    Ok(())
}

#[test]
fn test_parameters_substituted() -> Result<()> {
    let project = TestProject::with_samples()?;
    let mut request = request(&project, vec![project.manifests_dir().display().to_string()]);
    request.parameters = Some(ParameterSet::from_source(
        r#"{"parameters": {"storageKey": {"value": "s3cr3t"}}}"#,
    )?);

    let report = orchestrator().run(&request)?;
    assert_eq!(report.unresolved_parameters, vec!["image"]);

    let value = project.read_json("0002_secretValue_shopSecret_v1.json")?;
    assert_eq!(value["description"]["properties"]["value"], "s3cr3t");
    let app = project.read_json("0005_application_shop.json")?;
    assert_eq!(
        app["description"]["properties"]["services"][0]["properties"]["codePackages"][0]["image"],
        "[parameters('image')]"
    );
    Ok(())
}

#[test]
fn test_match_by_key_patches_list_items() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(
        "a.yaml",
        "application:\n  schemaVersion: 1.0.0-preview2\n  name: app\n  properties:\n    services:\n      - name: web\n        properties:\n          replicaCount: '1'\n",
    )?;
    project.write_manifest(
        "b.yaml",
        "application:\n  name: app\n  properties:\n    services:\n      - name: web\n        properties:\n          replicaCount: '3'\n",
    )?;

    let inputs = vec![project.manifests_dir().display().to_string()];

    let mut appended = request(&project, inputs.clone());
    appended.sequence_policy = SequenceMergePolicy::Append;
    orchestrator().run(&appended)?;
    let app = project.read_json("0001_application_app.json")?;
    assert_eq!(app["description"]["properties"]["services"].as_array().unwrap().len(), 2);

    let mut matched = request(&project, inputs);
    matched.sequence_policy = SequenceMergePolicy::MatchByKey;
    orchestrator().run(&matched)?;
    let app = project.read_json("0001_application_app.json")?;
    let services = app["description"]["properties"]["services"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["properties"]["replicaCount"], 3);
    Ok(())
}

#[test]
fn test_missing_primary_key() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("a.yaml", "network:\n  properties:\n    kind: Local\n")?;

    let request = request(&project, vec![project.manifests_dir().display().to_string()]);
    let err = orchestrator().run(&request).unwrap_err();
    assert!(matches!(err, MeshMergeError::MissingPrimaryKey { .. }), "got {err:?}");
    Ok(())
}

#[test]
fn test_unknown_kind() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("a.yaml", "service:\n  name: x\n")?;

    let request = request(&project, vec![project.manifests_dir().display().to_string()]);
    let err = orchestrator().run(&request).unwrap_err();
    assert!(matches!(err, MeshMergeError::UnknownResourceType { .. }), "got {err:?}");
    Ok(())
}

#[test]
fn test_parameterized_names_become_identity() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(
        "net.yaml",
        "network:\n  schemaVersion: 1.0.0-preview2\n  name: \"[parameters('netName')]\"\n",
    )?;
    project.write_manifest(
        "app.yaml",
        "application:\n  schemaVersion: 1.0.0-preview2\n  name: \"[parameters('appName')]\"\n",
    )?;

    let mut request = request(&project, vec![project.manifests_dir().display().to_string()]);
    request.parameters =
        Some(ParameterSet::from_source(r#"{"netName": "web", "appName": "shop"}"#)?);
    let report = orchestrator().run(&request)?;

    assert!(report.unresolved_parameters.is_empty());
    assert_eq!(
        project.output_files()?,
        vec!["0001_network_web.json", "0002_application_shop.json"]
    );
    let network = project.read_json("0001_network_web.json")?;
    assert_eq!(network["name"], "web");
    assert_eq!(network["fullyQualifiedResourceName"], format!("{SF}/networks/web"));
    assert_eq!(network["description"]["name"], "web");
    Ok(())
}

#[test]
fn test_substituted_names_must_stay_distinct() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("a.yaml", "network:\n  name: web\n")?;
    project.write_manifest("b.yaml", "network:\n  name: \"[parameters('netName')]\"\n")?;
    fs::create_dir_all(project.out_dir())?;
    fs::write(project.out_dir().join("previous.json"), "{}")?;

    let mut request = request(&project, vec![project.manifests_dir().display().to_string()]);
    request.parameters = Some(ParameterSet::from_source(r#"{"netName": "web"}"#)?);
    let err = orchestrator().run(&request).unwrap_err();

    assert!(
        matches!(err, MeshMergeError::DuplicateResource { ref resource, .. } if resource == "network/web"),
        "got {err:?}"
    );
    assert!(project.out_dir().join("previous.json").exists());
    Ok(())
}

#[test]
fn test_output_dir_holding_inputs_is_refused() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("net.yaml", "network:\n  schemaVersion: 1.0.0-preview2\n  name: net\n")?;
    project.write_manifest("notes.txt", "keep me")?;

    for output_dir in [project.manifests_dir(), project.path().to_path_buf()] {
        let mut request = request(&project, vec![project.manifests_dir().display().to_string()]);
        request.output_dir = output_dir;
        let err = orchestrator().run(&request).unwrap_err();
        assert!(matches!(err, MeshMergeError::ConfigError { .. }), "got {err:?}");
    }

    assert!(project.manifests_dir().join("net.yaml").exists());
    assert!(project.manifests_dir().join("notes.txt").exists());
    Ok(())
}
