//! Constants shared across the merge pipeline.
//!
//! Output naming, template header values and CLI defaults live here so the
//! orchestrator, the template generator and the CLI agree on them.

/// `$schema` of a consolidated deployment template.
pub const ARM_TEMPLATE_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2015-01-01/deploymentTemplate.json#";

/// `contentVersion` of a consolidated deployment template.
pub const ARM_CONTENT_VERSION: &str = "1.0.0.0";

/// Name of the template parameter every resource's `location` is bound to.
pub const ARM_LOCATION_PARAMETER: &str = "location";

/// File name (after the prefix) of the consolidated template.
pub const ARM_TEMPLATE_FILE_NAME: &str = "arm_rp.json";

/// Default deployment region.
pub const DEFAULT_REGION: &str = "westus";

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "meshDeploy";

/// Width of the zero-padded sequence number in per-resource file names.
pub const SEQUENCE_WIDTH: usize = 4;
