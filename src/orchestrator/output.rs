//! Output encodings and per-resource file naming.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::SEQUENCE_WIDTH;
use crate::core::{MeshMergeError, ResourceKind, Result};

/// Encoding of per-resource documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentEncoding {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl DocumentEncoding {
    /// File extension without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Render `document` in this encoding, ending with a newline.
    pub fn render(self, document: &Value) -> Result<String> {
        match self {
            Self::Json => render_json(document),
            Self::Yaml => serde_yaml::to_string(document).map_err(|e| {
                MeshMergeError::SerializationError {
                    format: "yaml".to_string(),
                    reason: e.to_string(),
                }
            }),
        }
    }
}

/// Pretty JSON with a trailing newline.
pub fn render_json(document: &Value) -> Result<String> {
    let mut text =
        serde_json::to_string_pretty(document).map_err(|e| MeshMergeError::SerializationError {
            format: "json".to_string(),
            reason: e.to_string(),
        })?;
    text.push('\n');
    Ok(text)
}

/// Make a resource name safe for use in a file name.
///
/// Runs of `/` and `\` collapse into a single `_`; any other character
/// outside `[A-Za-z0-9_.-]` becomes `_`.
pub fn sanitize_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if c == '/' || c == '\\' {
            if !in_separator {
                sanitized.push('_');
            }
            in_separator = true;
            continue;
        }
        in_separator = false;
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
            sanitized.push(c);
        } else {
            sanitized.push('_');
        }
    }
    sanitized
}

/// `{prefix}{sequence:04}_{kind}_{sanitizedName}.{ext}`
pub fn per_resource_file_name(
    prefix: &str,
    sequence: usize,
    kind: ResourceKind,
    name: &str,
    encoding: DocumentEncoding,
) -> String {
    format!(
        "{prefix}{sequence:0width$}_{kind}_{}.{}",
        sanitize_name(name),
        encoding.extension(),
        width = SEQUENCE_WIDTH
    )
}
