//! Project description schema.
//!
//! Defines the input document: project info, global resources, networks and
//! the workloads declared inside them. All types derive Serialize/Deserialize
//! for YAML/TOML/JSON loading and `JsonSchema` for the `schema` subcommand.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Top-level project description
// ============================================================================

/// Root document — the desired infrastructure of one project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectDescription {
    /// Project identity and backend selection
    pub project: ProjectSection,

    /// Optional runtime service account
    #[serde(default)]
    pub service_account: Option<ServiceAccountSpec>,

    /// Object storage buckets
    #[serde(default)]
    pub buckets: Vec<BucketSpec>,

    /// Secret declarations (values are provisioned out of band)
    #[serde(default)]
    pub secrets: Vec<SecretSpec>,

    /// Pub/sub topics
    #[serde(default)]
    pub topics: Vec<TopicSpec>,

    /// Task queues
    #[serde(default)]
    pub queues: Vec<QueueSpec>,

    /// Networks and everything deployed inside them
    #[serde(default)]
    pub networks: Vec<NetworkSpec>,

    /// Scheduled jobs targeting a container or function
    #[serde(default)]
    pub crons: Vec<CronSpec>,

    /// Always-on kernel running natively on a VM
    #[serde(default)]
    pub kernel: Option<KernelSpec>,

    /// Always-on kernel running as a container service
    #[serde(default)]
    pub hybrid_kernel: Option<KernelSpec>,

    /// Cluster settings, required by the manifest backend
    #[serde(default)]
    pub kubernetes: Option<KubernetesSection>,
}

/// Project identity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectSection {
    /// Project name, used as the construct-backend name prefix
    pub name: String,

    /// Deployment region
    #[serde(default = "default_region")]
    pub region: String,

    /// Cloud provider project id (defaults to the project name)
    #[serde(default)]
    pub cloud_project_id: Option<String>,

    /// Output backend
    pub backend: Backend,
}

fn default_region() -> String {
    "us-central1".to_string()
}

/// The three mutually exclusive output backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// One resource per declaration, placeholder interpolation
    Flat,
    /// Individual constructs, project-prefixed names
    Construct,
    /// Container-orchestrator manifests
    Manifest,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Construct => write!(f, "construct"),
            Self::Manifest => write!(f, "manifest"),
        }
    }
}

// ============================================================================
// Global resources
// ============================================================================

/// Runtime service account.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ServiceAccountSpec {
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    /// IAM roles granted at project level
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Object storage bucket.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BucketSpec {
    pub name: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default = "default_storage_class")]
    pub storage_class: String,

    #[serde(default)]
    pub versioning: bool,

    /// Grant public read access
    #[serde(default)]
    pub public: bool,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_storage_class() -> String {
    "STANDARD".to_string()
}

/// Secret declaration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SecretSpec {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Pub/sub topic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TopicSpec {
    pub name: String,

    /// Message retention duration (e.g. "86400s")
    #[serde(default)]
    pub message_retention: Option<String>,
}

/// Task queue.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueueSpec {
    pub name: String,

    #[serde(default)]
    pub max_dispatches_per_second: Option<f64>,

    #[serde(default)]
    pub max_attempts: Option<u32>,
}

// ============================================================================
// Networks
// ============================================================================

/// A network and the resources declared inside it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NetworkSpec {
    pub name: String,

    #[serde(default)]
    pub subnets: Vec<SubnetSpec>,

    #[serde(default)]
    pub firewall: Vec<FirewallRuleSpec>,

    /// Container image registry for this network's workloads
    #[serde(default)]
    pub registry: Option<RegistrySpec>,

    #[serde(default)]
    pub containers: Vec<ContainerSpec>,

    #[serde(default)]
    pub functions: Vec<FunctionSpec>,

    #[serde(default)]
    pub databases: Vec<DatabaseSpec>,

    #[serde(default)]
    pub caches: Vec<CacheSpec>,

    /// Static or server-rendered frontends
    #[serde(default)]
    pub uis: Vec<UiSpec>,

    #[serde(default)]
    pub load_balancer: Option<LoadBalancerSpec>,
}

/// Subnetwork.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubnetSpec {
    pub name: String,

    /// Primary IPv4 range
    pub cidr: String,

    #[serde(default)]
    pub region: Option<String>,
}

/// Firewall rule.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FirewallRuleSpec {
    pub name: String,

    #[serde(default = "default_protocol")]
    pub protocol: String,

    #[serde(default)]
    pub ports: Vec<String>,

    #[serde(default = "default_source_ranges")]
    pub source_ranges: Vec<String>,
}

fn default_protocol() -> String {
    "tcp".to_string()
}

fn default_source_ranges() -> Vec<String> {
    vec!["0.0.0.0/0".to_string()]
}

/// Artifact registry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RegistrySpec {
    pub name: String,

    #[serde(default = "default_registry_format")]
    pub format: String,
}

fn default_registry_format() -> String {
    "DOCKER".to_string()
}

/// Long-running container service.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContainerSpec {
    pub name: String,

    /// Explicit image; defaults to `{registry-url}/{name}:latest`
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default = "default_container_port")]
    pub port: u16,

    #[serde(default = "default_cpu")]
    pub cpu: String,

    #[serde(default = "default_memory")]
    pub memory: String,

    #[serde(default)]
    pub min_instances: u32,

    #[serde(default = "default_max_instances")]
    pub max_instances: u32,

    /// Environment values; may hold `@type/name[.property]` references
    #[serde(default)]
    pub env: IndexMap<String, String>,

    /// Env var → `@secret/...` reference
    #[serde(default)]
    pub secrets: IndexMap<String, String>,

    #[serde(default)]
    pub allow_unauthenticated: bool,

    /// Explicit dependencies (resource ids or references)
    #[serde(default)]
    pub depends_on: Vec<String>,
}

fn default_container_port() -> u16 {
    8080
}

fn default_cpu() -> String {
    "1".to_string()
}

fn default_memory() -> String {
    "512Mi".to_string()
}

fn default_max_instances() -> u32 {
    10
}

/// Serverless function.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FunctionSpec {
    pub name: String,

    #[serde(default = "default_runtime")]
    pub runtime: String,

    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    /// Source directory; defaults to `functions/{name}`
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default = "default_function_memory")]
    pub memory: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,

    /// Trigger on a topic instead of HTTP (`@topic/name`)
    #[serde(default)]
    pub trigger_topic: Option<String>,

    #[serde(default)]
    pub env: IndexMap<String, String>,

    #[serde(default)]
    pub secrets: IndexMap<String, String>,

    #[serde(default)]
    pub allow_unauthenticated: bool,

    #[serde(default)]
    pub depends_on: Vec<String>,
}

fn default_runtime() -> String {
    "nodejs20".to_string()
}

fn default_entry_point() -> String {
    "handler".to_string()
}

fn default_function_memory() -> String {
    "256Mi".to_string()
}

fn default_timeout() -> u32 {
    60
}

/// Managed SQL database instance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatabaseSpec {
    pub name: String,

    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default = "default_tier")]
    pub tier: String,

    #[serde(default = "default_disk_size")]
    pub disk_size_gb: u32,
}

fn default_engine() -> String {
    "POSTGRES_15".to_string()
}

fn default_tier() -> String {
    "db-f1-micro".to_string()
}

fn default_disk_size() -> u32 {
    10
}

/// Managed in-memory cache.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheSpec {
    pub name: String,

    #[serde(default = "default_cache_tier")]
    pub tier: String,

    #[serde(default = "default_cache_size")]
    pub memory_size_gb: u32,
}

fn default_cache_tier() -> String {
    "BASIC".to_string()
}

fn default_cache_size() -> u32 {
    1
}

/// Frontend served as a container.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UiSpec {
    pub name: String,

    #[serde(default)]
    pub image: Option<String>,

    /// Build context directory
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default = "default_ui_port")]
    pub port: u16,

    #[serde(default)]
    pub env: IndexMap<String, String>,

    #[serde(default)]
    pub secrets: IndexMap<String, String>,

    #[serde(default)]
    pub depends_on: Vec<String>,
}

fn default_ui_port() -> u16 {
    3000
}

/// HTTP(S) load balancer fronting a network's workloads.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoadBalancerSpec {
    /// Defaults to the network name
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub https: bool,

    #[serde(default)]
    pub domain: Option<String>,

    /// Path routing; a default route is built when empty
    #[serde(default)]
    pub routes: Vec<RouteSpec>,

    /// Identity-aware proxy in front of every route
    #[serde(default)]
    pub iap: Option<IapSpec>,
}

/// A load balancer path route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RouteSpec {
    pub path: String,

    /// Name of a container, function or UI in the same network
    pub backend: String,
}

/// Identity-aware proxy settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IapSpec {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Principals allowed through (e.g. `user:alice@example.com`)
    #[serde(default)]
    pub members: Vec<String>,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Scheduled jobs and kernels
// ============================================================================

/// Scheduled HTTP invocation of a container or function.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CronSpec {
    pub name: String,

    /// Cron expression
    pub schedule: String,

    /// `@container/name`, `@function/name`, `network/resource` or `resource`
    pub target: String,

    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    #[serde(default = "default_cron_path")]
    pub path: String,

    #[serde(default = "default_cron_method")]
    pub method: String,

    #[serde(default)]
    pub body: Option<String>,
}

fn default_time_zone() -> String {
    "Etc/UTC".to_string()
}

fn default_cron_path() -> String {
    "/".to_string()
}

fn default_cron_method() -> String {
    "POST".to_string()
}

/// Always-on background service.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KernelSpec {
    #[serde(default = "default_kernel_name")]
    pub name: String,

    /// Network to place the kernel in; defaults to the first network
    #[serde(default)]
    pub network: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    /// VM machine type (native kernel only)
    #[serde(default = "default_machine_type")]
    pub machine_type: String,

    #[serde(default = "default_container_port")]
    pub port: u16,

    #[serde(default)]
    pub env: IndexMap<String, String>,

    #[serde(default)]
    pub secrets: IndexMap<String, String>,
}

fn default_kernel_name() -> String {
    "kernel".to_string()
}

fn default_machine_type() -> String {
    "e2-small".to_string()
}

/// Cluster settings for the manifest backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct KubernetesSection {
    #[serde(default)]
    pub namespace: Option<String>,

    /// Image registry URL (e.g. `ghcr.io/acme`)
    #[serde(default)]
    pub registry: Option<String>,

    #[serde(default)]
    pub ingress_class: Option<String>,

    #[serde(default = "default_replicas")]
    pub replicas: u32,
}

fn default_replicas() -> u32 {
    1
}

// ============================================================================
// Helpers
// ============================================================================

impl ProjectDescription {
    /// Cloud project id, falling back to the project name.
    pub fn cloud_project_id(&self) -> &str {
        self.project
            .cloud_project_id
            .as_deref()
            .unwrap_or(&self.project.name)
    }

    /// Look up a network by name.
    pub fn network(&self, name: &str) -> Option<&NetworkSpec> {
        self.networks.iter().find(|n| n.name == name)
    }

    /// True when any network declares a container, function or UI, or a
    /// kernel of either variant is present.
    pub fn has_workload(&self) -> bool {
        self.kernel.is_some()
            || self.hybrid_kernel.is_some()
            || self.networks.iter().any(|n| {
                !n.containers.is_empty() || !n.functions.is_empty() || !n.uis.is_empty()
            })
    }
}

impl NetworkSpec {
    /// True when the network declares anything that lives inside a VPC:
    /// subnets, firewall rules, databases or caches.
    pub fn has_infrastructure(&self) -> bool {
        !self.subnets.is_empty()
            || !self.firewall.is_empty()
            || !self.databases.is_empty()
            || !self.caches.is_empty()
    }

    /// Find a container by name.
    pub fn container(&self, name: &str) -> Option<&ContainerSpec> {
        self.containers.iter().find(|c| c.name == name)
    }

    /// Find a function by name.
    pub fn function(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Find a UI by name.
    pub fn ui(&self, name: &str) -> Option<&UiSpec> {
        self.uis.iter().find(|u| u.name == name)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_parse_minimal() {
        let yaml = r#"
project:
  name: shop
  backend: flat
"#;
        let desc: ProjectDescription = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(desc.project.name, "shop");
        assert_eq!(desc.project.region, "us-central1");
        assert_eq!(desc.project.backend, Backend::Flat);
        assert_eq!(desc.cloud_project_id(), "shop");
        assert!(desc.networks.is_empty());
        assert!(!desc.has_workload());
    }

    #[test]
    fn test_container_defaults() {
        let yaml = r#"
name: api
env:
  B: "2"
  A: "1"
"#;
        let c: ContainerSpec = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(c.port, 8080);
        assert_eq!(c.memory, "512Mi");
        assert_eq!(c.max_instances, 10);
        assert!(!c.allow_unauthenticated);
        // declaration order is preserved
        let keys: Vec<_> = c.env.keys().cloned().collect();
        assert_eq!(keys, vec!["B", "A"]);
    }

    #[test]
    fn test_backend_display() {
        assert_eq!(Backend::Flat.to_string(), "flat");
        assert_eq!(Backend::Construct.to_string(), "construct");
        assert_eq!(Backend::Manifest.to_string(), "manifest");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let yaml = r#"
project:
  name: shop
  backend: terraform
"#;
        let result: Result<ProjectDescription, _> = serde_yaml_ng::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_network_lookups() {
        let yaml = r#"
name: main
containers:
  - name: api
functions:
  - name: worker
uis:
  - name: web
"#;
        let n: NetworkSpec = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(n.container("api").is_some());
        assert!(n.function("worker").is_some());
        assert!(n.ui("web").is_some());
        assert!(n.container("worker").is_none());
        assert_eq!(n.ui("web").unwrap().port, 3000);
        assert!(!n.has_infrastructure());
    }

    #[test]
    fn test_kernel_defaults() {
        let k: KernelSpec = serde_yaml_ng::from_str("image: kernel:1").unwrap();
        assert_eq!(k.name, "kernel");
        assert_eq!(k.machine_type, "e2-small");
        assert!(k.network.is_none());
    }

    #[test]
    fn test_iap_enabled_by_default() {
        let lb: LoadBalancerSpec = serde_yaml_ng::from_str("iap: {}").unwrap();
        assert!(lb.iap.unwrap().enabled);
        assert!(!lb.https);
        assert!(lb.routes.is_empty());
    }
}
