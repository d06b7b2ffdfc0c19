//! Resource generators — backend-native code for each resolved node.
//!
//! A [`Registry`] maps a node's type tag to a [`ResourceDefinition`]: a
//! config schema, default config values and a pure `generate` function.
//! Registries are assembled once through [`RegistryBuilder`] and are
//! read-only afterwards. Plugins are typed by the backend they target:
//! 1. `Flat` generators emit Pulumi TypeScript (`gcp:*`)
//! 2. `Construct` generators emit CDKTF TypeScript (`gcp-cdktf:*`)
//! 3. `Manifest` generators emit Kubernetes YAML (`k8s:*`)

pub mod construct;
pub mod flat;
pub mod manifest;
pub(crate) mod render;

use crate::core::resolved::ResolvedResource;
use crate::core::resolver::BackendProfile;
use crate::core::types::Backend;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Code produced for one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    /// Import lines the code needs
    pub imports: Vec<String>,
    /// Declarations
    pub code: String,
    /// Exported output names (`{sanitizedName}{Field}`)
    pub outputs: Vec<String>,
}

/// Recoverable generation failure. Never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("unknown resource type '{type_tag}' for '{id}'")]
    UnknownType { id: String, type_tag: String },

    #[error("'{id}' ({type_tag}) carries a {found} config, expected {expected}")]
    ConfigMismatch {
        id: String,
        type_tag: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot render '{id}': {message}")]
    Render { id: String, message: String },
}

/// Errors raised while assembling a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{backend} generator '{id}' must use the '{prefix}' type prefix")]
    PrefixMismatch {
        id: String,
        backend: Backend,
        prefix: String,
    },

    #[error("generator '{0}' registered twice")]
    Duplicate(String),

    #[error("cannot describe generator '{id}': {message}")]
    Definition { id: String, message: String },
}

/// Pure generator function.
pub type GenerateFn = fn(&ResolvedResource) -> Result<GeneratedArtifact, GenerateError>;

/// Registry entry for one type tag.
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    /// Type tag this definition generates, e.g. `gcp:storage_bucket`
    pub id: String,
    /// JSON schema of the config type
    pub schema: Value,
    /// JSON of the config type's `Default`
    pub default_config: Value,
    pub generate: GenerateFn,
}

impl ResourceDefinition {
    /// Build a definition whose schema and defaults come from `C`.
    pub fn of<C>(id: &str, generate: GenerateFn) -> Result<Self, RegistryError>
    where
        C: JsonSchema + Default + Serialize,
    {
        let describe = |e: serde_json::Error| RegistryError::Definition {
            id: id.to_string(),
            message: e.to_string(),
        };
        Ok(Self {
            id: id.to_string(),
            schema: serde_json::to_value(schemars::schema_for!(C)).map_err(describe)?,
            default_config: serde_json::to_value(C::default()).map_err(describe)?,
            generate,
        })
    }
}

/// A definition tagged with the backend it generates for.
#[derive(Debug, Clone)]
pub enum GeneratorPlugin {
    Flat(ResourceDefinition),
    Construct(ResourceDefinition),
    Manifest(ResourceDefinition),
}

impl GeneratorPlugin {
    pub fn backend(&self) -> Backend {
        match self {
            Self::Flat(_) => Backend::Flat,
            Self::Construct(_) => Backend::Construct,
            Self::Manifest(_) => Backend::Manifest,
        }
    }

    pub fn definition(&self) -> &ResourceDefinition {
        match self {
            Self::Flat(d) | Self::Construct(d) | Self::Manifest(d) => d,
        }
    }

    fn into_definition(self) -> ResourceDefinition {
        match self {
            Self::Flat(d) | Self::Construct(d) | Self::Manifest(d) => d,
        }
    }
}

/// Collects plugins, then freezes them into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: IndexMap<String, ResourceDefinition>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin. Its type tag must carry its backend's prefix and must
    /// not already be registered.
    pub fn register(&mut self, plugin: GeneratorPlugin) -> Result<&mut Self, RegistryError> {
        let backend = plugin.backend();
        let prefix = BackendProfile::for_backend(backend).tag_prefix();
        let id = plugin.definition().id.clone();
        if !id.starts_with(&prefix) {
            return Err(RegistryError::PrefixMismatch { id, backend, prefix });
        }
        if self.definitions.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.definitions.insert(id, plugin.into_definition());
        Ok(self)
    }

    /// Register every plugin in `plugins`.
    pub fn register_all(
        &mut self,
        plugins: impl IntoIterator<Item = GeneratorPlugin>,
    ) -> Result<&mut Self, RegistryError> {
        for plugin in plugins {
            self.register(plugin)?;
        }
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            definitions: self.definitions,
        }
    }
}

/// Immutable type tag → definition table.
#[derive(Debug, Clone)]
pub struct Registry {
    definitions: IndexMap<String, ResourceDefinition>,
}

impl Registry {
    /// Registry holding every built-in generator.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut builder = RegistryBuilder::new();
        builder
            .register_all(flat::plugins()?)?
            .register_all(construct::plugins()?)?
            .register_all(manifest::plugins()?)?;
        Ok(builder.build())
    }

    pub fn get(&self, type_tag: &str) -> Option<&ResourceDefinition> {
        self.definitions.get(type_tag)
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.definitions.contains_key(type_tag)
    }

    /// Registered type tags, in registration order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Generate code for one node.
    pub fn generate(&self, resource: &ResolvedResource) -> Result<GeneratedArtifact, GenerateError> {
        let definition =
            self.get(&resource.resource_type)
                .ok_or_else(|| GenerateError::UnknownType {
                    id: resource.id.clone(),
                    type_tag: resource.resource_type.clone(),
                })?;
        (definition.generate)(resource)
    }
}
