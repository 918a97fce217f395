//! Consolidated ARM template output through the orchestrator.

use anyhow::Result;
use serde_json::json;

use meshmerge_cli::config::MergeSettings;
use meshmerge_cli::core::MeshMergeError;
use meshmerge_cli::orchestrator::{MergeOrchestrator, MergeRequest, OutputFormat};
use meshmerge_cli::parameters::ParameterSet;

use crate::common::TestProject;

const SF: &str = "Microsoft.ServiceFabricMesh";

fn arm_request(project: &TestProject) -> MergeRequest {
    let mut request = MergeRequest::new(vec![project.manifests_dir().display().to_string()]);
    request.output_format = OutputFormat::ConsolidatedArmTemplate;
    request.output_dir = project.out_dir();
    request
}

fn run(request: &MergeRequest) -> meshmerge_cli::core::Result<()> {
    MergeOrchestrator::new(MergeSettings::builtin().unwrap()).run(request).map(|_| ())
}

#[test]
fn test_template_for_sample_set() -> Result<()> {
    let project = TestProject::with_samples()?;
    let mut request = arm_request(&project);
    request.region = "northeurope".to_string();
    run(&request)?;

    assert_eq!(project.output_files()?, vec!["arm_rp.json"]);
    let template = project.read_json("arm_rp.json")?;

    assert_eq!(template["contentVersion"], "1.0.0.0");
    assert_eq!(template["parameters"]["location"]["defaultValue"], "northeurope");

    let resources = template["resources"].as_array().unwrap();
    let names: Vec<_> = resources.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["shopSecret", "shopSecret/v1", "shopVolume", "shopNetwork", "shop"]);

    assert_eq!(resources[0]["dependsOn"], json!([]));
    assert_eq!(resources[1]["dependsOn"], json!([format!("{SF}/secrets/shopSecret")]));
    assert_eq!(resources[2]["dependsOn"], json!([format!("{SF}/secrets/values/shopSecret/v1")]));
    assert_eq!(resources[3]["dependsOn"], json!([]));
    assert_eq!(
        resources[4]["dependsOn"],
        json!([
            format!("{SF}/secrets/values/shopSecret/v1"),
            format!("{SF}/volumes/shopVolume"),
            format!("{SF}/networks/shopNetwork"),
        ])
    );

    for resource in resources {
        assert_eq!(resource["location"], "[parameters('location')]");
        assert_eq!(resource["apiVersion"], "2018-09-01-preview");
    }
    Ok(())
}

#[test]
fn test_refs_become_resource_ids() -> Result<()> {
    let project = TestProject::with_samples()?;
    run(&arm_request(&project))?;

    let template = project.read_json("arm_rp.json")?;
    let services = &template["resources"][4]["properties"]["services"];
    assert_eq!(
        services[0]["properties"]["networkRefs"][0]["name"],
        format!("[resourceId('{SF}/networks', 'shopNetwork')]")
    );
    let volume_ref = &services[1]["properties"]["codePackages"][0]["volumeRefs"][0];
    assert_eq!(volume_ref["name"], format!("[resourceId('{SF}/volumes', 'shopVolume')]"));
    assert_eq!(volume_ref["destinationPath"], "/data");
    assert_eq!(volume_ref["readOnly"], false);
    Ok(())
}

#[test]
fn test_unresolved_parameters_declared() -> Result<()> {
    let project = TestProject::with_samples()?;
    run(&arm_request(&project))?;

    let template = project.read_json("arm_rp.json")?;
    let keys: Vec<_> = template["parameters"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["location", "image", "storageKey"]);
    assert_eq!(template["parameters"]["storageKey"]["type"], "string");
    Ok(())
}

#[test]
fn test_substituted_parameters_not_declared() -> Result<()> {
    let project = TestProject::with_samples()?;
    let params = project.write_file(
        "params.yaml",
        "storageKey: s3cr3t\nimage:\n  value: shop/web:1.0\n",
    )?;
    let mut request = arm_request(&project);
    request.parameters = Some(ParameterSet::from_file(&params)?);
    request.prefix = "prod-".to_string();
    run(&request)?;

    assert_eq!(project.output_files()?, vec!["prod-arm_rp.json"]);
    let template = project.read_json("prod-arm_rp.json")?;
    let keys: Vec<_> = template["parameters"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["location"]);
    assert_eq!(template["resources"][1]["properties"]["value"], "s3cr3t");
    assert_eq!(
        template["resources"][4]["properties"]["services"][0]["properties"]["codePackages"][0]
            ["image"],
        "shop/web:1.0"
    );
    Ok(())
}

#[test]
fn test_failure_writes_nothing() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(
        "net.yaml",
        "network:\n  schemaVersion: 1.0.0-preview2\n  name: good\n",
    )?;
    project.write_manifest("vol.yaml", "volume:\n  schemaVersion: 9.9.9\n  name: bad\n")?;

    let err = run(&arm_request(&project)).unwrap_err();
    assert!(matches!(err, MeshMergeError::UnknownResourceType { .. }), "got {err:?}");
    assert!(!project.out_dir().join("arm_rp.json").exists());
    Ok(())
}

#[test]
fn test_parameterized_names_in_template() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(
        "net.yaml",
        "network:\n  schemaVersion: 1.0.0-preview2\n  name: \"[parameters('netName')]\"\n",
    )?;
    project.write_manifest(
        "app.yaml",
        "application:\n  schemaVersion: 1.0.0-preview2\n  name: \"[parameters('appName')]\"\n",
    )?;
    let mut request = arm_request(&project);
    request.parameters =
        Some(ParameterSet::from_source(r#"{"netName": "web", "appName": "shop"}"#)?);
    run(&request)?;

    let template = project.read_json("arm_rp.json")?;
    let resources = template["resources"].as_array().unwrap();
    assert_eq!(resources[0]["name"], "web");
    assert_eq!(resources[1]["name"], "shop");
    assert_eq!(resources[1]["dependsOn"], json!([format!("{SF}/networks/web")]));
    Ok(())
}
