//! The `plan` command: merge in memory and print the creation order.

use anyhow::Result;
use clap::{Args, ValueEnum};

use super::common::InputArgs;
use crate::config::MergeSettings;
use crate::orchestrator::MergeOrchestrator;

/// Output formats accepted by `plan --format`
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    /// Human-readable listing
    Text,
    /// JSON for automation
    Json,
}

/// Print resources in creation order with their dependencies.
#[derive(Args, Debug)]
pub struct PlanCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "text")]
    format: PlanFormat,
}

impl PlanCommand {
    /// Compute the plan and print it to stdout.
    pub fn execute(self, settings: MergeSettings) -> Result<()> {
        let request = self.input.to_request()?;
        let plan = MergeOrchestrator::new(settings).plan(&request)?;

        match self.format {
            PlanFormat::Text => print!("{}", plan.render_text()),
            PlanFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        }
        Ok(())
    }
}
