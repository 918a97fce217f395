//! Creation plans computed without writing output.

use anyhow::Result;

use meshmerge_cli::config::MergeSettings;
use meshmerge_cli::core::ResourceKind;
use meshmerge_cli::orchestrator::{MergeOrchestrator, MergeRequest};

use crate::common::TestProject;

#[test]
fn test_plan_for_sample_set() -> Result<()> {
    let project = TestProject::with_samples()?;
    let mut request = MergeRequest::new(vec![project.manifests_dir().display().to_string()]);
    request.output_dir = project.out_dir();

    let plan = MergeOrchestrator::new(MergeSettings::builtin()?).plan(&request)?;

    let order: Vec<_> = plan.steps.iter().map(|s| (s.order, s.kind, s.name.as_str())).collect();
    assert_eq!(
        order,
        vec![
            (1, ResourceKind::Secret, "shopSecret"),
            (2, ResourceKind::SecretValue, "shopSecret/v1"),
            (3, ResourceKind::Volume, "shopVolume"),
            (4, ResourceKind::Network, "shopNetwork"),
            (5, ResourceKind::Application, "shop"),
        ]
    );

    let app = &plan.steps[4];
    assert_eq!(app.depends_on.len(), 3);
    assert_eq!(app.sources.len(), 2);
    assert!(app.sources[0].ends_with("app_base.yaml"));
    assert!(app.sources[1].ends_with("app_patch.yaml"));

    // Planning never touches the output directory
    assert!(!project.out_dir().exists());
    Ok(())
}

#[test]
fn test_plan_text_lists_dependencies() -> Result<()> {
    let project = TestProject::with_samples()?;
    let request = MergeRequest::new(vec![project.manifests_dir().display().to_string()]);

    let text = MergeOrchestrator::new(MergeSettings::builtin()?).plan(&request)?.render_text();

    assert!(text.contains("  1. secret/shopSecret\n"));
    assert!(text.contains("  5. application/shop\n"));
    assert!(text.contains(
        "     depends on: Microsoft.ServiceFabricMesh/secrets/values/shopSecret/v1\n"
    ));
    Ok(())
}
