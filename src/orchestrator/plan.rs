//! Creation plans: what a merge run would deploy, and in which order.

use serde::Serialize;
use std::fmt::Write as _;

use crate::core::ResourceKind;

/// One resource in creation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    /// 1-based position in the creation order
    pub order: usize,
    /// Resource kind
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    /// Resource name
    pub name: String,
    /// `{ArmResourceType}/{name}`
    #[serde(rename = "fullyQualifiedResourceName")]
    pub full_name: String,
    /// Fully-qualified names this resource depends on
    pub depends_on: Vec<String>,
    /// Input files that contributed to the resource, in merge order
    pub sources: Vec<String>,
}

/// Ordered creation plan for a batch of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergePlan {
    /// Steps in creation order
    pub steps: Vec<PlanStep>,
}

impl MergePlan {
    /// Human-readable rendering, one resource per block.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            let _ = writeln!(out, "{:>3}. {}/{}", step.order, step.kind, step.name);
            let _ = writeln!(out, "     resource:   {}", step.full_name);
            if step.depends_on.is_empty() {
                let _ = writeln!(out, "     depends on: (nothing)");
            } else {
                for (i, dep) in step.depends_on.iter().enumerate() {
                    let label = if i == 0 { "depends on:" } else { "" };
                    let _ = writeln!(out, "     {label:<11} {dep}");
                }
            }
            let _ = writeln!(out, "     sources:    {}", step.sources.join(", "));
        }
        out
    }
}
