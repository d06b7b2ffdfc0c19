//! Core compiler logic — types, parsing, references, resolution, ordering, generation.

pub mod codegen;
pub mod error;
pub mod graph;
pub mod hasher;
pub mod naming;
pub mod parser;
pub mod reference;
pub mod resolved;
pub mod resolver;
pub mod types;

use error::{CompileError, Result};
use resolved::ResolvedConfig;
use types::ProjectDescription;

/// Validate, resolve and order a project description.
///
/// Structural validation errors, backend legality violations and graph
/// failures all abort; no partial config is returned.
pub fn compile(desc: &ProjectDescription) -> Result<ResolvedConfig> {
    let errors = parser::validate_description(desc);
    if !errors.is_empty() {
        return Err(CompileError::Validation(errors));
    }
    graph::order(resolver::resolve(desc)?)
}
