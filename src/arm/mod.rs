//! Consolidated ARM deployment template generation.
//!
//! The generator turns a merged resource map into a single template:
//!
//! ```json
//! {
//!   "$schema": "https://schema.management.azure.com/schemas/2015-01-01/deploymentTemplate.json#",
//!   "contentVersion": "1.0.0.0",
//!   "parameters": { "location": { "type": "string", "defaultValue": "<region>", ... } },
//!   "resources": [
//!     { "apiVersion": "...", "name": "...", "type": "...",
//!       "location": "[parameters('location')]", "dependsOn": [...], ...body }
//!   ]
//! }
//! ```
//!
//! Resources are emitted in the order of the input map. Inside application
//! services, every `<kind>Refs` list is rewritten so that each referenced name
//! becomes a `[resourceId('<armType>', ...)]` expression.

use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::config::ResourceTypeTable;
use crate::constants::{ARM_CONTENT_VERSION, ARM_LOCATION_PARAMETER, ARM_TEMPLATE_SCHEMA};
use crate::convert::Converter;
use crate::core::{MeshMergeError, ResourceIdentity, ResourceKind, Result};
use crate::document::DocumentNode;
use crate::merge::MergedResourceMap;
use crate::parameters::referenced_parameters;
use crate::resolver::{DependencyResolver, schema_version};

/// Builds consolidated ARM templates from merged resources
#[derive(Debug, Clone, Copy)]
pub struct ArmTemplateGenerator<'a> {
    types: &'a ResourceTypeTable,
    converter: &'a Converter,
}

impl<'a> ArmTemplateGenerator<'a> {
    /// Create a generator using the injected type table and converter.
    pub fn new(types: &'a ResourceTypeTable, converter: &'a Converter) -> Self {
        Self {
            types,
            converter,
        }
    }

    /// Generate the template for `resources`, deployed to `region`.
    pub fn generate(&self, resources: &MergedResourceMap, region: &str) -> Result<Value> {
        for (identity, document) in resources {
            resource_name(identity, document)?;
        }

        let resolver = DependencyResolver::new(self.types);
        let edges = resolver.resolve(resources)?;

        let mut emitted = Vec::with_capacity(resources.len());
        for (identity, document) in resources {
            let full_name = resolver.full_name(identity, document)?;
            let depends_on = edges.get(&full_name).cloned().unwrap_or_default();
            emitted.push(self.resource(identity, document, depends_on)?);
        }

        let mut parameters = Map::new();
        parameters.insert(
            ARM_LOCATION_PARAMETER.to_string(),
            json!({
                "type": "string",
                "defaultValue": region,
                "metadata": {"description": "Location of the resources."}
            }),
        );
        for name in unresolved_parameters(&emitted) {
            warn!("Template references parameter '{name}' that has no value; declaring it");
            parameters.insert(
                name.clone(),
                json!({
                    "type": "string",
                    "metadata": {"description": format!("Value for parameter '{name}'.")}
                }),
            );
        }

        Ok(json!({
            "$schema": ARM_TEMPLATE_SCHEMA,
            "contentVersion": ARM_CONTENT_VERSION,
            "parameters": parameters,
            "resources": emitted,
        }))
    }

    fn resource(
        &self,
        identity: &ResourceIdentity,
        document: &DocumentNode,
        depends_on: Vec<String>,
    ) -> Result<Value> {
        let kind = identity.kind;
        let schema = schema_version(identity, document);
        let name = resource_name(identity, document)?;
        debug!("Generating template resource {identity}");

        let Value::Object(mut root) = self.converter.convert(document)? else {
            return Err(MeshMergeError::malformed(kind.as_str(), "document is not a mapping"));
        };
        let Some(Value::Object(mut body)) = root.remove(kind.as_str()) else {
            return Err(MeshMergeError::malformed(kind.as_str(), "resource body is not a mapping"));
        };
        body.remove("name");
        body.remove("schemaVersion");

        if kind == ResourceKind::Application {
            self.rewrite_service_refs(&mut body, schema)?;
        }

        let mut resource = Map::new();
        resource.insert("apiVersion".to_string(), json!(self.types.api_version(kind, schema)?));
        resource.insert("name".to_string(), json!(name));
        resource.insert("type".to_string(), json!(self.types.arm_type(kind, schema)?));
        resource.insert(
            "location".to_string(),
            json!(format!("[parameters('{ARM_LOCATION_PARAMETER}')]")),
        );
        resource.insert("dependsOn".to_string(), json!(depends_on));
        for (key, value) in body {
            resource.entry(key).or_insert(value);
        }
        Ok(Value::Object(resource))
    }

    fn rewrite_service_refs(
        &self,
        body: &mut Map<String, Value>,
        schema: Option<&str>,
    ) -> Result<()> {
        let nested = matches!(
            body.get("properties"),
            Some(Value::Object(properties)) if properties.contains_key("services")
        );
        let services = if nested {
            body.get_mut("properties").and_then(|properties| properties.get_mut("services"))
        } else {
            body.get_mut("services")
        };
        let Some(Value::Array(services)) = services else {
            return Ok(());
        };
        for service in services {
            self.rewrite_refs(service, schema)?;
        }
        Ok(())
    }

    fn rewrite_refs(&self, value: &mut Value, schema: Option<&str>) -> Result<()> {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    match ref_kind(key) {
                        Some(Ok(kind)) => {
                            let arm_type = self.types.arm_type(kind, schema)?;
                            self.rewrite_ref_list(child, arm_type, schema)?;
                        }
                        Some(Err(prefix)) => {
                            warn!("Leaving '{key}' untouched: '{prefix}' is not a resource kind");
                            self.rewrite_refs(child, schema)?;
                        }
                        None => self.rewrite_refs(child, schema)?,
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.rewrite_refs(item, schema)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Rewrite every entry of a `<kind>Refs` list, then look for refs nested in the entries.
    fn rewrite_ref_list(
        &self,
        value: &mut Value,
        arm_type: &str,
        schema: Option<&str>,
    ) -> Result<()> {
        let Value::Array(items) = value else {
            return self.rewrite_refs(value, schema);
        };
        for item in items {
            match item {
                Value::String(name) => rewrite_ref(name, arm_type),
                Value::Object(entry) => {
                    if let Some(Value::String(name)) = entry.get_mut("name") {
                        rewrite_ref(name, arm_type);
                    }
                }
                _ => {}
            }
            self.rewrite_refs(item, schema)?;
        }
        Ok(())
    }
}

/// The `name` field of a resource body.
fn resource_name<'d>(
    identity: &ResourceIdentity,
    document: &'d DocumentNode,
) -> Result<&'d str> {
    document
        .get(identity.kind.as_str())
        .and_then(|body| body.get("name"))
        .and_then(DocumentNode::as_scalar)
        .ok_or_else(|| MeshMergeError::MissingResourceName {
            kind: identity.kind.to_string(),
        })
}

/// Kind named by a `<kind>Refs` key; `Err(prefix)` when the prefix is not a kind.
fn ref_kind(key: &str) -> Option<std::result::Result<ResourceKind, &str>> {
    let prefix = key.strip_suffix("Refs").filter(|p| !p.is_empty())?;
    Some(prefix.parse::<ResourceKind>().map_err(|_| prefix))
}

fn rewrite_ref(name: &mut String, arm_type: &str) {
    if name.starts_with('[') {
        return;
    }
    *name = resource_id_expression(arm_type, name);
}

/// `[resourceId('<armType>', '<seg1>', '<seg2>', ...)]` for a possibly nested name.
pub fn resource_id_expression(arm_type: &str, name: &str) -> String {
    let segments = name
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("'{segment}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[resourceId('{arm_type}', {segments})]")
}

/// Parameters referenced by emitted resources, other than `location`, sorted.
fn unresolved_parameters(resources: &[Value]) -> BTreeSet<String> {
    fn collect(value: &Value, names: &mut BTreeSet<String>) {
        match value {
            Value::String(text) => {
                for name in referenced_parameters(text) {
                    if name != ARM_LOCATION_PARAMETER {
                        names.insert(name.to_string());
                    }
                }
            }
            Value::Array(items) => items.iter().for_each(|item| collect(item, names)),
            Value::Object(map) => map.values().for_each(|item| collect(item, names)),
            _ => {}
        }
    }

    let mut names = BTreeSet::new();
    for resource in resources {
        collect(resource, &mut names);
    }
    names
}
