//! Template parameter values and `[parameters('<name>')]` substitution.
//!
//! Merged documents may contain placeholders of the exact form
//! `[parameters('<name>')]`. When a parameter source is supplied, every such
//! scalar is replaced before conversion. Placeholders without a value are
//! left untouched and reported back to the caller.
//!
//! A source is either inline JSON or a path to a JSON/YAML file, and may use
//! any of these shapes:
//!
//! ```json
//! {"$schema": "...", "contentVersion": "1.0.0.0", "parameters": {"replicas": {"value": 3}}}
//! {"replicas": {"value": 3}}
//! {"replicas": 3}
//! ```

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;

use crate::core::{MeshMergeError, Result};
use crate::document::DocumentNode;

fn exact_reference_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[parameters\('([^']+)'\)\]$").ok()).as_ref()
}

fn embedded_reference_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"parameters\('([^']+)'\)").ok()).as_ref()
}

/// The parameter name if `raw` is exactly `[parameters('<name>')]`.
pub fn parameter_reference(raw: &str) -> Option<&str> {
    exact_reference_regex()?.captures(raw)?.get(1).map(|m| m.as_str())
}

/// Every parameter name referenced anywhere inside `text`.
///
/// Unlike [`parameter_reference`] this also finds references embedded in
/// larger template expressions such as `[concat(parameters('a'), '-x')]`.
pub fn referenced_parameters(text: &str) -> Vec<&str> {
    let Some(re) = embedded_reference_regex() else {
        return Vec::new();
    };
    re.captures_iter(text).filter_map(|caps| caps.get(1)).map(|m| m.as_str()).collect()
}

/// Outcome of a substitution pass over one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    /// Number of placeholders replaced
    pub replaced: usize,
    /// Names of placeholders without a value, in document order
    pub unresolved: Vec<String>,
}

/// Named parameter values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: IndexMap<String, Value>,
    source_name: String,
}

impl ParameterSet {
    /// Load parameters from inline JSON or from a file path.
    ///
    /// Text starting with `{` is parsed as inline JSON; anything else is
    /// treated as a path (with `~` and environment variables expanded).
    pub fn from_source(source: &str) -> Result<Self> {
        let trimmed = source.trim();
        if trimmed.starts_with('{') {
            let value: Value =
                serde_json::from_str(trimmed).map_err(|e| MeshMergeError::ParameterError {
                    source_name: "inline parameters".to_string(),
                    reason: e.to_string(),
                })?;
            return Self::from_value(value, "inline parameters");
        }

        let expanded = shellexpand::full(trimmed)
            .map_err(|e| MeshMergeError::ParameterError {
                source_name: trimmed.to_string(),
                reason: e.to_string(),
            })?
            .into_owned();
        Self::from_file(Path::new(&expanded))
    }

    /// Load parameters from a JSON or YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| MeshMergeError::fs("reading", path, e))?;
        let source_name = path.display().to_string();
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let value: Value = if is_json {
            serde_json::from_str(&content).map_err(|e| MeshMergeError::ParameterError {
                source_name: source_name.clone(),
                reason: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| MeshMergeError::ParameterError {
                source_name: source_name.clone(),
                reason: e.to_string(),
            })?
        };
        Self::from_value(value, &source_name)
    }

    /// Build a set from an already parsed value.
    pub fn from_value(value: Value, source_name: &str) -> Result<Self> {
        let error = |reason: String| MeshMergeError::ParameterError {
            source_name: source_name.to_string(),
            reason,
        };

        let Value::Object(mut root) = value else {
            return Err(error("expected an object of parameter values".to_string()));
        };

        let is_parameter_file = matches!(root.get("parameters"), Some(Value::Object(_)))
            && root
                .keys()
                .all(|key| matches!(key.as_str(), "parameters" | "$schema" | "contentVersion"));
        let entries = if is_parameter_file {
            match root.remove("parameters") {
                Some(Value::Object(inner)) => inner,
                _ => serde_json::Map::new(),
            }
        } else {
            root
        };

        let mut values = IndexMap::with_capacity(entries.len());
        for (name, entry) in entries {
            let value = match entry {
                Value::Object(mut wrapper) if wrapper.contains_key("value") => {
                    wrapper.remove("value").unwrap_or(Value::Null)
                }
                Value::Object(wrapper) if wrapper.contains_key("reference") => {
                    return Err(error(format!(
                        "parameter '{name}' uses a reference, which cannot be resolved locally"
                    )));
                }
                other => other,
            };
            values.insert(name, value);
        }

        Ok(Self {
            values,
            source_name: source_name.to_string(),
        })
    }

    /// Where these parameters came from.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Value of parameter `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every exact `[parameters('<name>')]` scalar in `node`.
    ///
    /// Primitive values replace the scalar text; objects and arrays replace
    /// the whole node.
    pub fn substitute(&self, node: &mut DocumentNode) -> Substitution {
        let mut outcome = Substitution::default();
        node.visit_scalars_mut(&mut |leaf| {
            let Some(name) = leaf.as_scalar().and_then(parameter_reference).map(str::to_string)
            else {
                return;
            };
            match self.values.get(&name) {
                Some(value) => {
                    *leaf = DocumentNode::from_json(value);
                    outcome.replaced += 1;
                }
                None => outcome.unresolved.push(name),
            }
        });
        outcome
    }
}
