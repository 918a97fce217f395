//! Merge orchestration
//!
//! Drives one run of the pipeline end to end:
//!
//! 1. **Discover** input files (files, directories, globs)
//! 2. **Parse** each file into a [`PartialDocument`]
//! 3. **Group** partials by `(kind, primary key)` in first-seen order
//! 4. **Merge** each group with the [`MergeEngine`]
//! 5. **Substitute** `[parameters('<name>')]` placeholders; the ones without a value are reported.
//!    A resource whose primary key was a placeholder is re-keyed under the substituted name
//! 6. **Order** resources by kind: `secret, secretValue, volume, network, gateway, application`
//! 7. **Write** per-resource documents or one consolidated ARM template
//!
//! # Output atomicity
//!
//! A consolidated template is only written after every resource merged,
//! converted and resolved. Per-resource documents are written one by one
//! into a freshly cleared output directory; files written before a failure
//! stay on disk. The directory is only cleared once every resource merged,
//! and never when it holds any of the input files.
//!
//! # Examples
//!
//! ```rust,no_run
//! use meshmerge_cli::config::MergeSettings;
//! use meshmerge_cli::orchestrator::{MergeOrchestrator, MergeRequest, OutputFormat};
//!
//! # fn example() -> meshmerge_cli::core::Result<()> {
//! let orchestrator = MergeOrchestrator::new(MergeSettings::builtin()?);
//! let mut request = MergeRequest::new(vec!["manifests/".to_string()]);
//! request.output_format = OutputFormat::ConsolidatedArmTemplate;
//! request.output_dir = "deploy".into();
//!
//! let report = orchestrator.run(&request)?;
//! println!("wrote {} file(s)", report.files_written.len());
//! # Ok(())
//! # }
//! ```

pub mod output;
pub mod plan;

pub use output::{DocumentEncoding, per_resource_file_name, sanitize_name};
pub use plan::{MergePlan, PlanStep};

use indexmap::IndexMap;
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::arm::ArmTemplateGenerator;
use crate::config::{MergeSettings, ResourceTypeTable};
use crate::constants::{ARM_TEMPLATE_FILE_NAME, DEFAULT_OUTPUT_DIR, DEFAULT_REGION};
use crate::convert::Converter;
use crate::core::{MeshMergeError, ResourceIdentity, ResourceKind, Result};
use crate::document::{DocumentNode, PartialDocument};
use crate::document::parser::read_partial_document;
use crate::merge::{MergeEngine, MergedResourceMap, SequenceMergePolicy};
use crate::parameters::ParameterSet;
use crate::resolver::{DependencyResolver, schema_version};
use crate::utils::fs::{discover_inputs, ensure_disjoint, ensure_dir, reset_dir, safe_write};

/// What a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One numbered document per resource
    PerResourceDocuments(DocumentEncoding),
    /// A single ARM deployment template
    ConsolidatedArmTemplate,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::PerResourceDocuments(DocumentEncoding::Json)
    }
}

/// Inputs and options of one merge run
#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// Files, directories or glob patterns; entries may be comma-separated lists
    pub inputs: Vec<String>,
    /// Output format
    pub output_format: OutputFormat,
    /// Values for `[parameters('<name>')]` placeholders
    pub parameters: Option<ParameterSet>,
    /// Directory receiving the output
    pub output_dir: PathBuf,
    /// Prepended to every output file name
    pub prefix: String,
    /// Default value of the template `location` parameter
    pub region: String,
    /// How sequences from different partials are combined
    pub sequence_policy: SequenceMergePolicy,
    /// Narrow per-resource `description` to this field of the resource body
    pub description_filter: Option<String>,
}

impl MergeRequest {
    /// A request over `inputs` with default options.
    pub fn new(inputs: Vec<String>) -> Self {
        Self {
            inputs,
            output_format: OutputFormat::default(),
            parameters: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            prefix: String::new(),
            region: DEFAULT_REGION.to_string(),
            sequence_policy: SequenceMergePolicy::default(),
            description_filter: None,
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Number of input files parsed
    pub input_files: usize,
    /// Merged resources in emission order
    pub resources: Vec<ResourceIdentity>,
    /// Files written, in write order
    pub files_written: Vec<PathBuf>,
    /// Placeholder names with no parameter value, in first-occurrence order
    pub unresolved_parameters: Vec<String>,
}

/// Merged resources together with the partials they came from
#[derive(Debug, Clone, Default)]
pub struct MergedBatch {
    /// Merged trees in creation-kind order
    pub resources: MergedResourceMap,
    /// Source files per resource, in merge order
    pub sources: IndexMap<ResourceIdentity, Vec<String>>,
    /// Number of input files parsed
    pub input_files: usize,
    /// Discovered input paths, in merge order
    pub input_paths: Vec<PathBuf>,
    /// Placeholder names with no parameter value
    pub unresolved_parameters: Vec<String>,
}

/// Runs the merge pipeline with one set of settings
#[derive(Debug, Clone)]
pub struct MergeOrchestrator {
    settings: MergeSettings,
    types: ResourceTypeTable,
    converter: Converter,
}

impl MergeOrchestrator {
    /// Create an orchestrator; lookup tables and coercion rules come from `settings`.
    pub fn new(settings: MergeSettings) -> Self {
        let types = settings.type_table();
        let converter = Converter::new(settings.primitive_properties.clone());
        Self {
            settings,
            types,
            converter,
        }
    }

    /// The settings in effect.
    pub fn settings(&self) -> &MergeSettings {
        &self.settings
    }

    /// Execute `request`, writing its output.
    pub fn run(&self, request: &MergeRequest) -> Result<MergeReport> {
        let batch = self.merge_inputs(request)?;

        let files_written = match request.output_format {
            OutputFormat::PerResourceDocuments(encoding) => {
                self.write_per_resource(&batch, request, encoding)?
            }
            OutputFormat::ConsolidatedArmTemplate => {
                vec![self.write_arm_template(&batch.resources, request)?]
            }
        };

        info!(
            "Merged {} resource(s) from {} file(s); wrote {} file(s) to {}",
            batch.resources.len(),
            batch.input_files,
            files_written.len(),
            request.output_dir.display()
        );

        Ok(MergeReport {
            input_files: batch.input_files,
            resources: batch.resources.keys().cloned().collect(),
            files_written,
            unresolved_parameters: batch.unresolved_parameters,
        })
    }

    /// Merge everything in `request` and compute the creation plan without writing.
    pub fn plan(&self, request: &MergeRequest) -> Result<MergePlan> {
        let batch = self.merge_inputs(request)?;
        let resolver = DependencyResolver::new(&self.types);
        let edges = resolver.resolve(&batch.resources)?;
        let order = resolver.creation_order(&batch.resources)?;

        let steps = order
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                let identity = ResourceIdentity::new(node.kind, node.name.clone());
                PlanStep {
                    order: index + 1,
                    kind: node.kind,
                    name: node.name,
                    depends_on: edges.get(&node.full_name).cloned().unwrap_or_default(),
                    full_name: node.full_name,
                    sources: batch.sources.get(&identity).cloned().unwrap_or_default(),
                }
            })
            .collect();

        Ok(MergePlan {
            steps,
        })
    }

    /// Discover, parse, group, merge and substitute; the result is in kind order.
    pub fn merge_inputs(&self, request: &MergeRequest) -> Result<MergedBatch> {
        let files = discover_inputs(&request.inputs, &self.settings.input_extensions)?;
        let partials =
            files.iter().map(|file| read_partial_document(file)).collect::<Result<Vec<_>>>()?;
        let input_files = partials.len();

        let groups = self.group(partials)?;
        let engine = MergeEngine::new(request.sequence_policy);
        let primary_key = self.settings.primary_key.as_str();
        let no_parameters = ParameterSet::default();
        let parameters = match request.parameters.as_ref() {
            Some(parameters) if parameters.is_empty() => {
                warn!("Parameter source {} defines no values", parameters.source_name());
                parameters
            }
            Some(parameters) => {
                debug!("Using {} parameter(s) from {}", parameters.len(), parameters.source_name());
                parameters
            }
            None => &no_parameters,
        };

        let mut resources = MergedResourceMap::with_capacity(groups.len());
        let mut sources: IndexMap<ResourceIdentity, Vec<String>> =
            IndexMap::with_capacity(groups.len());
        let mut unresolved: Vec<String> = Vec::new();

        for (identity, partials) in groups {
            debug!("Merging {} partial(s) for {identity}", partials.len());
            let mut merged = engine.merge(&partials, identity.kind.as_str(), Some(primary_key))?;

            let outcome = parameters.substitute(&mut merged);
            if outcome.replaced > 0 {
                debug!("Substituted {} parameter(s) in {identity}", outcome.replaced);
            }
            for name in outcome.unresolved {
                if !unresolved.contains(&name) {
                    warn!("Parameter '{name}' referenced by {identity} has no value");
                    unresolved.push(name);
                }
            }

            let partial_sources: Vec<String> =
                partials.iter().map(|partial| partial.source.clone()).collect();
            let identity = rekey(identity, &merged, primary_key, &partial_sources)?;
            if let Some(earlier) = sources.get(&identity) {
                return Err(MeshMergeError::DuplicateResource {
                    resource: identity.to_string(),
                    first: join_sources(earlier),
                    second: join_sources(&partial_sources),
                });
            }

            sources.insert(identity.clone(), partial_sources);
            resources.insert(identity, merged);
        }

        resources.sort_by(|a, _, b, _| a.kind.creation_rank().cmp(&b.kind.creation_rank()));
        sources.sort_by(|a, _, b, _| a.kind.creation_rank().cmp(&b.kind.creation_rank()));

        Ok(MergedBatch {
            resources,
            sources,
            input_files,
            input_paths: files,
            unresolved_parameters: unresolved,
        })
    }

    /// Group partials by resource identity in first-seen order.
    pub fn group(
        &self,
        partials: Vec<PartialDocument>,
    ) -> Result<IndexMap<ResourceIdentity, Vec<PartialDocument>>> {
        let primary_key = self.settings.primary_key.as_str();
        let mut groups: IndexMap<ResourceIdentity, Vec<PartialDocument>> = IndexMap::new();

        for partial in partials {
            let (kind, _) = partial.single_entry()?;
            let kind: ResourceKind = kind.parse()?;
            let name = partial.primary_key_value(primary_key)?.ok_or_else(|| {
                MeshMergeError::MissingPrimaryKey {
                    file: partial.source.clone(),
                    kind: kind.to_string(),
                    key: primary_key.to_string(),
                }
            })?;
            let identity = ResourceIdentity::new(kind, name);
            groups.entry(identity).or_default().push(partial);
        }

        Ok(groups)
    }

    fn write_per_resource(
        &self,
        batch: &MergedBatch,
        request: &MergeRequest,
        encoding: DocumentEncoding,
    ) -> Result<Vec<PathBuf>> {
        ensure_disjoint(&request.output_dir, &batch.input_paths)?;
        reset_dir(&request.output_dir)?;
        let resolver = DependencyResolver::new(&self.types);

        let mut written = Vec::with_capacity(batch.resources.len());
        for (index, (identity, document)) in batch.resources.iter().enumerate() {
            let kind = identity.kind;
            let schema = schema_version(identity, document);
            let description = self.converter.convert_filtered(
                document,
                kind.as_str(),
                request.description_filter.as_deref(),
            )?;

            let output = json!({
                "type": kind,
                "name": identity.name,
                "api-version": self.types.api_version(kind, schema)?,
                "fullyQualifiedResourceName": resolver.full_name(identity, document)?,
                "description": description,
            });

            let file_name = per_resource_file_name(
                &request.prefix,
                index + 1,
                kind,
                &identity.name,
                encoding,
            );
            let path = request.output_dir.join(file_name);
            safe_write(&path, &encoding.render(&output)?)?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }

        Ok(written)
    }

    fn write_arm_template(
        &self,
        resources: &MergedResourceMap,
        request: &MergeRequest,
    ) -> Result<PathBuf> {
        let generator = ArmTemplateGenerator::new(&self.types, &self.converter);
        let template = generator.generate(resources, &request.region)?;
        let text = output::render_json(&template)?;

        ensure_dir(&request.output_dir)?;
        let path = request.output_dir.join(format!("{}{ARM_TEMPLATE_FILE_NAME}", request.prefix));
        safe_write(&path, &text)?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Identity of a merged resource after substitution.
///
/// Grouping happens on the primary key as written; a substituted placeholder
/// moves the resource to the key's new value.
fn rekey(
    identity: ResourceIdentity,
    merged: &DocumentNode,
    primary_key: &str,
    sources: &[String],
) -> Result<ResourceIdentity> {
    let name = merged
        .get(identity.kind.as_str())
        .and_then(|body| body.get(primary_key))
        .and_then(DocumentNode::as_scalar)
        .ok_or_else(|| MeshMergeError::MissingPrimaryKey {
            file: join_sources(sources),
            kind: identity.kind.to_string(),
            key: primary_key.to_string(),
        })?;
    if name == identity.name {
        return Ok(identity);
    }
    debug!("{identity} is named '{name}' after substitution");
    Ok(ResourceIdentity::new(identity.kind, name))
}

fn join_sources(sources: &[String]) -> String {
    sources.join(", ")
}
