//! Command-line interface for meshmerge.
//!
//! # Available Commands
//!
//! - `merge` - Merge partial manifests and write per-resource documents or an ARM template
//! - `plan` - Print the creation order and dependencies without writing anything
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--settings` - Settings file overlaid on the built-in defaults
//!   (falls back to the `MESHMERGE_SETTINGS` environment variable)
//!
//! Log output goes to stderr; command results go to stdout.
//!
//! # Example
//!
//! ```bash
//! # Per-resource JSON documents into ./meshDeploy
//! meshmerge merge -i app.yaml,network.yaml
//!
//! # One ARM template with parameters applied
//! meshmerge merge -i manifests/ --format arm-json --parameters params.json
//!
//! # Inspect creation order
//! meshmerge plan -i 'manifests/**/*.yaml' --format json
//! ```

pub mod common;
mod merge;
mod plan;


pub use merge::{MergeCommand, MergeFormat};
pub use plan::{PlanCommand, PlanFormat};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::MergeSettings;

/// Main CLI application structure for meshmerge
#[derive(Parser, Debug)]
#[command(
    name = "meshmerge",
    about = "Merge partial Service Fabric Mesh manifests into deployable documents",
    version,
    long_about = "meshmerge combines YAML fragments describing mesh resources, resolves the \
                  dependencies between them and emits either numbered per-resource documents \
                  or a single ARM deployment template."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Settings file overlaid on the built-in defaults.
    ///
    /// When absent, the file named by `MESHMERGE_SETTINGS` is used if set.
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge partial manifests and write the result.
    ///
    /// See [`MergeCommand`] for options.
    Merge(MergeCommand),

    /// Show the resource creation order and dependencies.
    ///
    /// See [`PlanCommand`] for options.
    Plan(PlanCommand),
}

impl Cli {
    /// Initialise logging, load settings and run the selected command.
    pub fn execute(self) -> Result<()> {
        self.init_logging();

        let settings = MergeSettings::load(self.settings.as_deref())?;

        match self.command {
            Commands::Merge(cmd) => cmd.execute(settings, self.quiet),
            Commands::Plan(cmd) => cmd.execute(settings),
        }
    }

    /// The log filter implied by the verbosity flags.
    ///
    /// `None` means `RUST_LOG` decides, with `info` when it is unset.
    #[must_use]
    pub fn log_directive(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    fn init_logging(&self) {
        let filter = match self.log_directive() {
            Some(directive) => EnvFilter::new(directive),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };

        // A subscriber may already be installed when running inside tests.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}
