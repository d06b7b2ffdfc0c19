//! Project description parsing and validation.
//!
//! Loads a description from YAML, TOML or JSON and validates the structural
//! constraints every backend shares:
//! - project name must be a valid resource name
//! - resource names use the reference name charset `[a-z0-9-]`
//! - names are unique within their scope
//! - load balancer routes have a path and a backend

use super::error::{CompileError, Result};
use super::types::*;
use std::collections::HashSet;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Serialization format of a description file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    /// Pick a format from a file extension. Unknown extensions are YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Toml,
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// Parse a description file from disk.
pub fn parse_description_file(path: &Path) -> Result<ProjectDescription> {
    let content = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_description(&content, Format::from_path(path))
}

/// Parse a description from a string.
pub fn parse_description(text: &str, format: Format) -> Result<ProjectDescription> {
    let parsed = match format {
        Format::Yaml => serde_yaml_ng::from_str(text).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| CompileError::Parse {
        format: format.label(),
        message,
    })
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Tracks names within one scope and reports bad or duplicate ones.
struct Scope<'a> {
    label: &'a str,
    seen: HashSet<&'a str>,
}

impl<'a> Scope<'a> {
    fn new(label: &'a str) -> Self {
        Self {
            label,
            seen: HashSet::new(),
        }
    }

    fn check(&mut self, kind: &str, name: &'a str, errors: &mut Vec<ValidationError>) {
        if !is_valid_name(name) {
            errors.push(ValidationError {
                message: format!(
                    "{} name '{}' in {} must match [a-z0-9-]+",
                    kind, name, self.label
                ),
            });
        }
        if !self.seen.insert(name) {
            errors.push(ValidationError {
                message: format!("duplicate {} '{}' in {}", kind, name, self.label),
            });
        }
    }
}

/// Validate a parsed description. Returns a list of errors (empty = valid).
pub fn validate_description(desc: &ProjectDescription) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !is_valid_name(&desc.project.name) {
        errors.push(ValidationError {
            message: format!(
                "project name '{}' must be non-empty and match [a-z0-9-]+",
                desc.project.name
            ),
        });
    }

    if let Some(ref sa) = desc.service_account {
        Scope::new("project").check("service account", &sa.name, &mut errors);
    }
    let mut buckets = Scope::new("buckets");
    for b in &desc.buckets {
        buckets.check("bucket", &b.name, &mut errors);
    }
    let mut secrets = Scope::new("secrets");
    for s in &desc.secrets {
        secrets.check("secret", &s.name, &mut errors);
    }
    let mut topics = Scope::new("topics");
    for t in &desc.topics {
        topics.check("topic", &t.name, &mut errors);
    }
    let mut queues = Scope::new("queues");
    for q in &desc.queues {
        queues.check("queue", &q.name, &mut errors);
    }
    let mut crons = Scope::new("crons");
    for c in &desc.crons {
        crons.check("cron", &c.name, &mut errors);
        if c.schedule.trim().is_empty() {
            errors.push(ValidationError {
                message: format!("cron '{}' has an empty schedule", c.name),
            });
        }
    }

    let mut networks = Scope::new("project");
    for network in &desc.networks {
        networks.check("network", &network.name, &mut errors);
        validate_network(network, &mut errors);
    }

    for kernel in desc.kernel.iter().chain(desc.hybrid_kernel.iter()) {
        if !is_valid_name(&kernel.name) {
            errors.push(ValidationError {
                message: format!("kernel name '{}' must match [a-z0-9-]+", kernel.name),
            });
        }
        if let Some(ref net) = kernel.network {
            if desc.network(net).is_none() {
                errors.push(ValidationError {
                    message: format!("kernel '{}' references unknown network '{}'", kernel.name, net),
                });
            }
        }
    }

    errors
}

fn validate_network(network: &NetworkSpec, errors: &mut Vec<ValidationError>) {
    let label = format!("network '{}'", network.name);
    let mut infra = Scope::new(&label);
    for s in &network.subnets {
        infra.check("subnet", &s.name, errors);
        if s.cidr.trim().is_empty() {
            errors.push(ValidationError {
                message: format!("subnet '{}' has an empty cidr", s.name),
            });
        }
    }
    let mut rules = Scope::new(&label);
    for r in &network.firewall {
        rules.check("firewall rule", &r.name, errors);
    }
    if let Some(ref registry) = network.registry {
        if !is_valid_name(&registry.name) {
            errors.push(ValidationError {
                message: format!("registry name '{}' must match [a-z0-9-]+", registry.name),
            });
        }
    }

    // Containers, functions and UIs are separate scopes: the id prefix
    // keeps them apart. Manifests, which name deployments after the
    // workload alone, reject shared names in the backend profile.
    let mut containers = Scope::new(&label);
    for c in &network.containers {
        containers.check("container", &c.name, errors);
    }
    let mut functions = Scope::new(&label);
    for f in &network.functions {
        functions.check("function", &f.name, errors);
    }
    let mut uis = Scope::new(&label);
    for u in &network.uis {
        uis.check("ui", &u.name, errors);
    }
    let mut data = Scope::new(&label);
    for d in &network.databases {
        data.check("database", &d.name, errors);
    }
    for c in &network.caches {
        data.check("cache", &c.name, errors);
    }

    if let Some(ref lb) = network.load_balancer {
        for route in &lb.routes {
            if route.path.trim().is_empty() {
                errors.push(ValidationError {
                    message: format!("load balancer route in {} has an empty path", label),
                });
            }
            if route.backend.trim().is_empty() {
                errors.push(ValidationError {
                    message: format!(
                        "load balancer route '{}' in {} has no backend",
                        route.path, label
                    ),
                });
            }
        }
    }
}
