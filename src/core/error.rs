//! Error handling for meshmerge
//!
//! This module provides the error types and user-friendly error reporting for the
//! merge pipeline. The error system follows two principles:
//! 1. **Strongly-typed errors** so library callers can react to a precise failure kind
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`MeshMergeError`] - Enumerated error types for every failure in the pipeline
//! - [`ErrorContext`] - Wrapper that adds details and suggestions for terminal display
//!
//! # Error Categories
//!
//! - **Document shape**: [`MeshMergeError::MalformedDocument`], [`MeshMergeError::ParseError`]
//! - **Identity**: [`MeshMergeError::MissingPrimaryKey`], [`MeshMergeError::PrimaryKeyMismatch`],
//!   [`MeshMergeError::DuplicateResource`]
//! - **Merging**: [`MeshMergeError::IncompatibleMerge`]
//! - **Conversion**: [`MeshMergeError::CoercionError`]
//! - **Resolution**: [`MeshMergeError::UnknownResourceType`], [`MeshMergeError::MissingResourceName`]
//! - **Environment**: [`MeshMergeError::FileSystemError`], [`MeshMergeError::ConfigError`],
//!   [`MeshMergeError::ParameterError`], [`MeshMergeError::SerializationError`]
//!
//! Every pipeline error is fatal to the current run. Nothing is retried and nothing is
//! silently degraded; each variant carries the source file, resource kind or document
//! path needed to report an actionable message.
//!
//! # Examples
//!
//! ```rust,no_run
//! use meshmerge_cli::core::{MeshMergeError, user_friendly_error};
//!
//! let error = MeshMergeError::MissingResourceName {
//!     kind: "network".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, MeshMergeError>;

/// The main error type for meshmerge operations
///
/// Variants mirror the failure modes of the merge pipeline stages: parsing,
/// identity verification, tree merging, type coercion, dependency resolution
/// and output generation.
#[derive(Error, Debug)]
pub enum MeshMergeError {
    /// A partial document does not have the expected shape
    ///
    /// Raised when the root is not a single-entry mapping keyed by the resource
    /// kind, when the resource body is not a mapping, or when a mapping key is
    /// not a scalar.
    #[error("Malformed document '{file}': {reason}")]
    MalformedDocument {
        /// Source file of the offending document
        file: String,
        /// What is wrong with the document
        reason: String,
    },

    /// The input file is not valid YAML/JSON
    #[error("Failed to parse '{file}': {reason}")]
    ParseError {
        /// Source file that failed to parse
        file: String,
        /// Parser message
        reason: String,
    },

    /// A partial document lacks the primary key field
    #[error("Missing primary key '{key}' for {kind} resource in '{file}'")]
    MissingPrimaryKey {
        /// Source file of the offending document
        file: String,
        /// Resource kind being merged
        kind: String,
        /// Name of the primary key field
        key: String,
    },

    /// Two partial documents of one merge unit disagree on the primary key
    #[error(
        "Primary key mismatch for {kind} resource in '{file}': expected {key} '{expected}', found '{found}'"
    )]
    PrimaryKeyMismatch {
        /// Source file of the offending document
        file: String,
        /// Resource kind being merged
        kind: String,
        /// Name of the primary key field
        key: String,
        /// Value established by the first partial
        expected: String,
        /// Value carried by the offending partial
        found: String,
    },

    /// Two merge units end up with the same identity after parameter substitution
    #[error("Resource {resource} is defined twice: by '{first}' and by '{second}'")]
    DuplicateResource {
        /// `kind/name` shared by both units
        resource: String,
        /// Sources of the unit merged first
        first: String,
        /// Sources of the colliding unit
        second: String,
    },

    /// The same path holds different node kinds in two partial documents
    #[error("Cannot merge {found} from '{file}' into {expected} at '{path}'")]
    IncompatibleMerge {
        /// Source file whose node could not be merged
        file: String,
        /// Document path of the conflict
        path: String,
        /// Node kind already present in the merged tree
        expected: String,
        /// Node kind found in the source document
        found: String,
    },

    /// A primitive property could not be coerced to its configured type
    #[error("Cannot coerce '{value}' at '{path}' to {target}")]
    CoercionError {
        /// Rule path that matched the value
        path: String,
        /// Raw string value
        value: String,
        /// Target primitive type
        target: String,
    },

    /// No ARM resource type is registered for a kind / schema version pair
    #[error(
        "Unknown resource type '{kind}' for schema version '{}'",
        .schema_version.as_deref().unwrap_or("<none>")
    )]
    UnknownResourceType {
        /// Resource kind that was looked up
        kind: String,
        /// Schema version declared by the resource, if any
        schema_version: Option<String>,
    },

    /// A resource reached output generation without a `name`
    #[error("Resource of kind '{kind}' has no name")]
    MissingResourceName {
        /// Resource kind lacking the name
        kind: String,
    },

    /// The parameter source could not be read or has an unsupported shape
    #[error("Invalid parameters in '{source_name}': {reason}")]
    ParameterError {
        /// File path or `<inline>` for inline JSON
        source_name: String,
        /// Why the parameters were rejected
        reason: String,
    },

    /// Settings could not be loaded
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// A file system operation failed
    #[error("File system error while {operation} '{path}'")]
    FileSystemError {
        /// The file system operation that failed
        operation: String,
        /// Path where the error occurred
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// An output document could not be serialized
    #[error("Failed to serialize {format} output: {reason}")]
    SerializationError {
        /// Output format being produced
        format: String,
        /// Serializer message
        reason: String,
    },

    /// The input specification matched no files
    #[error("No input files found for: {inputs}")]
    NoInputFiles {
        /// Rendered input specification
        inputs: String,
    },
}

impl MeshMergeError {
    /// Build a [`MeshMergeError::FileSystemError`] for `path`.
    pub fn fs(operation: impl Into<String>, path: &Path, source: std::io::Error) -> Self {
        Self::FileSystemError {
            operation: operation.into(),
            path: path.display().to_string(),
            source,
        }
    }

    /// Build a [`MeshMergeError::MalformedDocument`].
    pub fn malformed(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Details are printed in yellow, suggestions in green, the error itself in
/// bold red.
#[derive(Debug)]
pub struct ErrorContext {
    /// Headline message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`MeshMergeError`]
    #[must_use]
    pub fn new(error: &MeshMergeError) -> Self {
        Self {
            message: error.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// [`MeshMergeError`] values anywhere in the chain get tailored suggestions;
/// anything else is shown with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(merge_error) = error.chain().find_map(|e| e.downcast_ref::<MeshMergeError>()) {
        let context = create_error_context(merge_error);
        let headline = error.to_string();
        if headline != context.message {
            return ErrorContext {
                message: format!("{headline}: {}", context.message),
                ..context
            };
        }
        return context;
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext {
        message,
        suggestion: None,
        details: None,
    }
}

fn create_error_context(error: &MeshMergeError) -> ErrorContext {
    let context = ErrorContext::new(error);
    match error {
        MeshMergeError::MalformedDocument { .. } => context
            .with_suggestion(
                "Each input file must contain exactly one top-level key naming the resource kind, e.g. 'application:'",
            )
            .with_details("Supported kinds: secret, secretValue, volume, network, gateway, application"),
        MeshMergeError::ParseError { .. } => context
            .with_suggestion("Check the YAML syntax: indentation, quoting and list markers"),
        MeshMergeError::MissingPrimaryKey { key, .. } => context.with_suggestion(format!(
            "Add a '{key}' field to the resource body so fragments can be matched"
        )),
        MeshMergeError::PrimaryKeyMismatch { .. } => context.with_details(
            "Fragments are merged only when kind and name are identical",
        ),
        MeshMergeError::DuplicateResource { .. } => context
            .with_suggestion("Give each resource a distinct name in the parameter values")
            .with_details("Names are compared after '[parameters(...)]' placeholders are substituted"),
        MeshMergeError::IncompatibleMerge { .. } => context
            .with_suggestion("Make sure every fragment uses the same structure (map, list or value) at this path")
            .with_details("Fragments are merged in input order; later files patch earlier ones"),
        MeshMergeError::CoercionError { .. } => context.with_suggestion(
            "Fix the value or adjust the primitive_properties rules in the settings file",
        ),
        MeshMergeError::UnknownResourceType { .. } => context
            .with_suggestion("Set 'schemaVersion' to a registered version such as '1.0.0-preview2'")
            .with_details("Schema versions and ARM types are configured in the [arm_types] settings table"),
        MeshMergeError::MissingResourceName { .. } => {
            context.with_suggestion("Add a 'name' field to the resource body")
        }
        MeshMergeError::ParameterError { .. } => context.with_suggestion(
            "Parameters must be a JSON/YAML object, e.g. {\"parameters\": {\"name\": {\"value\": \"x\"}}}",
        ),
        MeshMergeError::ConfigError { .. } => context
            .with_suggestion("Check the settings file passed with --settings or MESHMERGE_SETTINGS"),
        MeshMergeError::FileSystemError { source, .. } => match source.kind() {
            std::io::ErrorKind::PermissionDenied => context
                .with_suggestion("Check file ownership and permissions")
                .with_details(source.to_string()),
            std::io::ErrorKind::NotFound => context
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(source.to_string()),
            _ => context.with_details(source.to_string()),
        },
        MeshMergeError::SerializationError { .. } => context,
        MeshMergeError::NoInputFiles { .. } => context.with_suggestion(
            "Pass files, directories or glob patterns with --input, e.g. --input app.yaml,network.yaml",
        ),
    }
}
