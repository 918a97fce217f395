//! Arguments shared by the commands that read manifests

use anyhow::Result;
use clap::Args;

use crate::orchestrator::MergeRequest;
use crate::parameters::ParameterSet;

/// Where manifests come from and how placeholders are filled
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Input files, directories or glob patterns.
    ///
    /// Repeat the flag or pass a comma-separated list. Directories are
    /// scanned recursively for `.yaml`/`.yml` files.
    #[arg(short, long = "input", value_name = "PATHS", required = true)]
    pub inputs: Vec<String>,

    /// Parameter values as a JSON/YAML file or inline JSON.
    ///
    /// Accepts `{"parameters": {"x": {"value": v}}}`, `{"x": {"value": v}}`
    /// or `{"x": v}`.
    #[arg(short, long, value_name = "FILE|JSON")]
    pub parameters: Option<String>,

    /// Patch list items whose `name` matches instead of appending them.
    #[arg(long)]
    pub match_sequence_items: bool,
}

impl InputArgs {
    /// A merge request over these inputs with default output options.
    pub fn to_request(&self) -> Result<MergeRequest> {
        let mut request = MergeRequest::new(self.inputs.clone());
        if let Some(source) = &self.parameters {
            request.parameters = Some(ParameterSet::from_source(source)?);
        }
        if self.match_sequence_items {
            request.sequence_policy = crate::merge::SequenceMergePolicy::MatchByKey;
        }
        Ok(request)
    }
}
