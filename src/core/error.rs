//! Compile errors.
//!
//! Parse-level problems in references are never errors (they are "not a
//! reference"). Everything here aborts a compile: validation failures carry a
//! remediation hint, graph failures name the offending nodes.

use super::parser::ValidationError;
use super::reference::ReferenceType;
use super::types::Backend;
use std::path::PathBuf;
use thiserror::Error;

/// Error raised while loading, resolving or sorting a project.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The description file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The description could not be deserialized.
    #[error("{format} parse error: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// Backend-independent structural problems.
    #[error("{} validation error(s):\n{}", .0.len(), render_validation(.0))]
    Validation(Vec<ValidationError>),

    /// A resource kind the selected backend cannot express.
    #[error("{feature} not supported by the {backend} backend\n  hint: {hint}")]
    Unsupported {
        backend: Backend,
        feature: String,
        hint: String,
    },

    /// A backend legality rule was violated.
    #[error("invalid {backend} project: {message}\n  hint: {hint}")]
    Invalid {
        backend: Backend,
        message: String,
        hint: String,
    },

    /// Two declarations produced the same node id.
    #[error("duplicate resource id '{id}'")]
    DuplicateResource { id: String },

    /// A reference named a property its type does not expose.
    #[error("unknown property '{property}' for @{ref_type} reference (accepted: {})", .accepted.join(", "))]
    UnknownProperty {
        ref_type: ReferenceType,
        property: String,
        accepted: Vec<&'static str>,
    },

    /// A cron target did not resolve to exactly one container or function.
    #[error("cron '{cron}' target '{target}': {reason}")]
    CronTarget {
        cron: String,
        target: String,
        reason: String,
    },

    /// A `depends_on` id is absent from the node set.
    #[error("resource '{node}' depends on unknown '{missing}'")]
    DanglingDependency { node: String, missing: String },

    /// The graph has no valid order.
    #[error("dependency cycle detected involving: {}", .nodes.join(", "))]
    Cycle { nodes: Vec<String> },

    /// Canonical JSON encoding failed.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn render_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  ERROR: {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CompileError>;
