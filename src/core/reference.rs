//! Cross-resource reference parsing.
//!
//! A reference is a whole string value of the form `@type/name[.property]`.
//! Parsing is permissive: anything that does not match, including unknown
//! types, is simply "not a reference". Property validation happens only when
//! a reference is resolved to an output.

use super::error::{CompileError, Result};
use super::naming::{capitalize, sanitize_identifier};
use super::types::ProjectDescription;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@([a-z]+)/([a-z0-9-]+)(?:\.([a-zA-Z]+))?$").expect("reference pattern is valid")
});

/// Resource types a reference may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    Secret,
    Database,
    Bucket,
    Cache,
    Container,
    Function,
    Topic,
    Queue,
}

impl ReferenceType {
    /// Every reference type, in declaration order.
    pub const ALL: [ReferenceType; 8] = [
        Self::Secret,
        Self::Database,
        Self::Bucket,
        Self::Cache,
        Self::Container,
        Self::Function,
        Self::Topic,
        Self::Queue,
    ];

    /// Parse a type token (case-sensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == token)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secret => "secret",
            Self::Database => "database",
            Self::Bucket => "bucket",
            Self::Cache => "cache",
            Self::Container => "container",
            Self::Function => "function",
            Self::Topic => "topic",
            Self::Queue => "queue",
        }
    }

    /// Output identifier used when no property is given.
    pub fn default_output(self) -> &'static str {
        match self {
            Self::Secret => "secretId",
            Self::Database => "connectionString",
            Self::Bucket => "name",
            Self::Cache => "host",
            Self::Container | Self::Function => "url",
            Self::Topic | Self::Queue => "name",
        }
    }

    /// Property → output identifier table, excluding the implicit default.
    fn properties(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Secret => &[
                ("id", "secretId"),
                ("name", "secretName"),
                ("version", "secretVersion"),
            ],
            Self::Database => &[
                ("url", "connectionString"),
                ("host", "host"),
                ("port", "port"),
                ("instance", "instanceName"),
                ("name", "databaseName"),
            ],
            Self::Bucket => &[("url", "url")],
            Self::Cache => &[("port", "port"), ("url", "connectionString")],
            Self::Container => &[("name", "serviceName")],
            Self::Function => &[("name", "functionName")],
            Self::Topic => &[("id", "topicId")],
            Self::Queue => &[("id", "queueId")],
        }
    }

    /// Accepted property names, default first.
    pub fn accepted_properties(self) -> Vec<&'static str> {
        let mut accepted = vec![self.default_output()];
        for (property, _) in self.properties() {
            if !accepted.contains(property) {
                accepted.push(property);
            }
        }
        accepted
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `@type/name[.property]` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub ref_type: ReferenceType,
    pub name: String,
    pub property: Option<String>,
}

impl Reference {
    /// `{type}-{name}`; matches the id of the node the reference targets.
    pub fn resource_id(&self) -> String {
        format!("{}-{}", self.ref_type, self.name)
    }

    /// Resolved output identifier for this reference.
    pub fn output_name(&self) -> Result<&'static str> {
        output_name(self.ref_type, self.property.as_deref())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}/{}", self.ref_type, self.name)?;
        if let Some(ref property) = self.property {
            write!(f, ".{}", property)?;
        }
        Ok(())
    }
}

/// Parse a value as a reference. Never fails; non-references yield `None`.
pub fn parse(value: &str) -> Option<Reference> {
    let caps = REFERENCE_PATTERN.captures(value)?;
    let ref_type = ReferenceType::from_token(caps.get(1)?.as_str())?;
    Some(Reference {
        ref_type,
        name: caps.get(2)?.as_str().to_string(),
        property: caps.get(3).map(|m| m.as_str().to_string()),
    })
}

/// True when `value` parses as a reference.
pub fn is_reference(value: &str) -> bool {
    parse(value).is_some()
}

/// Resolve a property to its output identifier.
///
/// `None` selects the type's default. An unknown property is an error naming
/// the property and the accepted set.
pub fn output_name(ref_type: ReferenceType, property: Option<&str>) -> Result<&'static str> {
    let Some(property) = property else {
        return Ok(ref_type.default_output());
    };
    if property == ref_type.default_output() {
        return Ok(ref_type.default_output());
    }
    ref_type
        .properties()
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, output)| *output)
        .ok_or_else(|| CompileError::UnknownProperty {
            ref_type,
            property: property.to_string(),
            accepted: ref_type.accepted_properties(),
        })
}

/// Flat-backend placeholder: `${sanitizedName}{OutputName}`.
pub fn resolve_to_interpolation(reference: &Reference) -> Result<String> {
    let output = reference.output_name()?;
    Ok(format!(
        "${{{}{}}}",
        sanitize_identifier(&reference.name),
        capitalize(output)
    ))
}

// ============================================================================
// Batch helpers
// ============================================================================

/// Every reference found among the map's values, in declaration order.
pub fn extract_references(values: &IndexMap<String, String>) -> Vec<Reference> {
    values.values().filter_map(|v| parse(v)).collect()
}

/// Result of resolving an env-style map.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvResolution<T> {
    /// References encountered, in declaration order
    pub references: Vec<Reference>,
    /// Copy of the input with references replaced
    pub values: IndexMap<String, T>,
}

/// Resolve every reference in `values` with `resolve`; everything else,
/// malformed `@...` tokens included, goes through `literal` unchanged.
pub fn resolve_env_with<T>(
    values: &IndexMap<String, String>,
    mut resolve: impl FnMut(&Reference) -> Result<T>,
    literal: impl Fn(&str) -> T,
) -> Result<EnvResolution<T>> {
    let mut references = Vec::new();
    let mut resolved = IndexMap::with_capacity(values.len());
    for (key, value) in values {
        let out = match parse(value) {
            Some(reference) => {
                let out = resolve(&reference)?;
                references.push(reference);
                out
            }
            None => literal(value),
        };
        resolved.insert(key.clone(), out);
    }
    Ok(EnvResolution {
        references,
        values: resolved,
    })
}

/// Resolve a map to flat-backend interpolation text.
pub fn resolve_env_map(values: &IndexMap<String, String>) -> Result<EnvResolution<String>> {
    resolve_env_with(values, resolve_to_interpolation, str::to_string)
}

// ============================================================================
// Secret pre-flight
// ============================================================================

/// Names of every `@secret/...` referenced from an env or secrets map,
/// first-seen order, deduplicated.
pub fn referenced_secrets(desc: &ProjectDescription) -> Vec<String> {
    let mut maps: Vec<&IndexMap<String, String>> = Vec::new();
    for network in &desc.networks {
        for c in &network.containers {
            maps.extend([&c.env, &c.secrets]);
        }
        for f in &network.functions {
            maps.extend([&f.env, &f.secrets]);
        }
        for u in &network.uis {
            maps.extend([&u.env, &u.secrets]);
        }
    }
    for k in desc.kernel.iter().chain(desc.hybrid_kernel.iter()) {
        maps.extend([&k.env, &k.secrets]);
    }

    let mut names = IndexSet::new();
    for map in maps {
        for reference in extract_references(map) {
            if reference.ref_type == ReferenceType::Secret {
                names.insert(reference.name);
            }
        }
    }
    names.into_iter().collect()
}

/// Referenced secrets with no top-level declaration.
pub fn missing_secrets(desc: &ProjectDescription) -> Vec<String> {
    referenced_secrets(desc)
        .into_iter()
        .filter(|name| !desc.secrets.iter().any(|s| &s.name == name))
        .collect()
}
