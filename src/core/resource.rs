//! Resource kinds and identities
//!
//! A mesh deployment is described by resources of six fixed kinds. The kind
//! decides where a resource sits in the creation order and which other
//! resources it depends on; the `(kind, name)` pair identifies the merge unit
//! that partial documents are grouped into.
//!
//! # Examples
//!
//! ```rust
//! use meshmerge_cli::core::ResourceKind;
//!
//! let kind: ResourceKind = "secretValue".parse().unwrap();
//! assert_eq!(kind, ResourceKind::SecretValue);
//! assert_eq!(kind.to_string(), "secretValue");
//! assert!(ResourceKind::Secret.creation_rank() < kind.creation_rank());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::MeshMergeError;

/// Enumeration of the resource kinds understood by the pipeline
///
/// Serialized in camelCase (`secretValue`) to match the top-level keys of the
/// input documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    /// Secret container, e.g. a key vault reference
    Secret,
    /// A versioned value stored in a secret (`secretName/valueName`)
    SecretValue,
    /// Persistent volume
    Volume,
    /// Network that applications attach to
    Network,
    /// Ingress gateway between networks
    Gateway,
    /// Application made of services
    Application,
}

impl ResourceKind {
    /// Every kind in creation order.
    ///
    /// Resources are created in this order so that anything a resource may
    /// reference already exists when it is deployed.
    pub const CREATION_ORDER: [ResourceKind; 6] = [
        ResourceKind::Secret,
        ResourceKind::SecretValue,
        ResourceKind::Volume,
        ResourceKind::Network,
        ResourceKind::Gateway,
        ResourceKind::Application,
    ];

    /// The document key for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secret => "secret",
            Self::SecretValue => "secretValue",
            Self::Volume => "volume",
            Self::Network => "network",
            Self::Gateway => "gateway",
            Self::Application => "application",
        }
    }

    /// Position of this kind in [`Self::CREATION_ORDER`].
    pub fn creation_rank(self) -> usize {
        Self::CREATION_ORDER.iter().position(|k| *k == self).unwrap_or(usize::MAX)
    }

    /// Kinds this kind depends on.
    ///
    /// The rules are static: a resource depends on every resource of these
    /// kinds present in the same batch, regardless of document content.
    pub const fn depends_on(self) -> &'static [ResourceKind] {
        match self {
            Self::Application => &[Self::Network, Self::SecretValue, Self::Volume],
            Self::Volume => &[Self::SecretValue],
            Self::SecretValue => &[Self::Secret],
            Self::Network | Self::Secret | Self::Gateway => &[],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = MeshMergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::CREATION_ORDER.into_iter().find(|kind| kind.as_str() == s).ok_or_else(|| {
            MeshMergeError::UnknownResourceType {
                kind: s.to_string(),
                schema_version: None,
            }
        })
    }
}

/// Identity of a merge unit: resource kind plus primary-key value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentity {
    /// Resource kind
    pub kind: ResourceKind,
    /// Primary-key value (the resource name)
    pub name: String,
}

impl ResourceIdentity {
    /// Create a new identity.
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}
