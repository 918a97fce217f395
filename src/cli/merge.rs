//! The `merge` command.
//!
//! ```bash
//! meshmerge merge -i app.yaml -i network.yaml --prefix merged- --output-dir out
//! meshmerge merge -i manifests/ --format arm-json --region eastus
//! ```

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use super::common::InputArgs;
use crate::config::MergeSettings;
use crate::constants::{DEFAULT_OUTPUT_DIR, DEFAULT_REGION};
use crate::orchestrator::{DocumentEncoding, MergeOrchestrator, OutputFormat};

/// Output formats accepted by `--format`
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MergeFormat {
    /// One JSON document per resource
    SfJson,
    /// One YAML document per resource
    SfYaml,
    /// A single ARM deployment template
    ArmJson,
}

impl From<MergeFormat> for OutputFormat {
    fn from(format: MergeFormat) -> Self {
        match format {
            MergeFormat::SfJson => Self::PerResourceDocuments(DocumentEncoding::Json),
            MergeFormat::SfYaml => Self::PerResourceDocuments(DocumentEncoding::Yaml),
            MergeFormat::ArmJson => Self::ConsolidatedArmTemplate,
        }
    }
}

/// Merge partial manifests into deployable documents.
#[derive(Args, Debug)]
pub struct MergeCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "sf-json")]
    format: MergeFormat,

    /// Directory receiving the output.
    ///
    /// For per-resource formats the directory is cleared once every resource
    /// has merged, before the first file is written. A failed merge leaves it
    /// untouched, and a directory holding any input file is never cleared.
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Prefix for every output file name.
    #[arg(long, default_value = "")]
    prefix: String,

    /// Default value of the ARM template `location` parameter.
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,

    /// Use only this field of each resource body as the `description`.
    #[arg(long, value_name = "KEY")]
    description_filter: Option<String>,
}

impl MergeCommand {
    /// Run the merge and print a summary unless `quiet`.
    pub fn execute(self, settings: MergeSettings, quiet: bool) -> Result<()> {
        let mut request = self.input.to_request()?;
        request.output_format = self.format.into();
        request.output_dir = self.output_dir;
        request.prefix = self.prefix;
        request.region = self.region;
        request.description_filter = self.description_filter;

        let orchestrator = MergeOrchestrator::new(settings);
        let report = orchestrator.run(&request)?;

        if !quiet {
            println!(
                "{} Merged {} resource(s) from {} file(s)",
                "✓".green(),
                report.resources.len(),
                report.input_files
            );
            for path in &report.files_written {
                println!("  {}", path.display());
            }
            if !report.unresolved_parameters.is_empty() {
                println!(
                    "{} Unresolved parameters: {}",
                    "⚠".yellow(),
                    report.unresolved_parameters.join(", ")
                );
            }
        }
        Ok(())
    }
}
