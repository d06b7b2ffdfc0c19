//! Resolved resource graph — the compiler's output.
//!
//! A `ResolvedConfig` pairs the project info with every `ResolvedResource`
//! produced by a backend resolver and, after sorting, the provisioning order.
//! Each node carries a `ResourceConfig` variant for its logical kind so
//! generators can match on it instead of casting property bags.

use super::types::Backend;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Nodes
// ============================================================================

/// Logical kind of a node. Determines the id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ServiceAccount,
    Bucket,
    Secret,
    Topic,
    Queue,
    Network,
    Subnet,
    Firewall,
    Registry,
    Connector,
    Container,
    Function,
    Database,
    Cache,
    Kernel,
    HybridKernel,
    Ui,
    LoadBalancer,
    Cron,
    Namespace,
    ConfigMap,
    Deployment,
    Service,
    Ingress,
    NetworkPolicy,
}

impl NodeKind {
    /// Prefix of the `{logical-type}-{name}` id.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::ServiceAccount => "service-account",
            Self::Bucket => "bucket",
            Self::Secret => "secret",
            Self::Topic => "topic",
            Self::Queue => "queue",
            Self::Network => "network",
            Self::Subnet => "subnet",
            Self::Firewall => "firewall",
            Self::Registry => "registry",
            Self::Connector => "connector",
            Self::Container => "container",
            Self::Function => "function",
            Self::Database => "database",
            Self::Cache => "cache",
            Self::Kernel | Self::HybridKernel => "kernel",
            Self::Ui => "ui",
            Self::LoadBalancer => "load-balancer",
            Self::Cron => "cron",
            Self::Namespace => "namespace",
            Self::ConfigMap => "config",
            Self::Deployment => "deployment",
            Self::Service => "service",
            Self::Ingress => "ingress",
            Self::NetworkPolicy => "network-policy",
        }
    }

    /// Deterministic node id.
    pub fn node_id(self, name: &str) -> String {
        format!("{}-{}", self.id_prefix(), name)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HybridKernel => write!(f, "hybrid kernel"),
            other => write!(f, "{}", other.id_prefix().replace('-', " ")),
        }
    }
}

/// A single unit of the output graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResolvedResource {
    /// `{logical-type}-{name}`, unique across the resolved set
    pub id: String,

    /// Backend-qualified type tag (e.g. `gcp:storage_bucket`)
    #[serde(rename = "type")]
    pub resource_type: String,

    /// User-facing short name
    pub name: String,

    /// Materialized configuration
    pub config: ResourceConfig,

    /// Ids that must be provisioned first (deduplicated, first-seen order)
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Owning network, for resources declared inside a network block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

/// Project info carried into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectInfo {
    pub name: String,
    pub region: String,
    pub cloud_project_id: String,
    pub backend: Backend,
}

/// Compiler output: nodes plus provisioning order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResolvedConfig {
    pub project: ProjectInfo,
    pub resources: Vec<ResolvedResource>,
    /// Empty until the graph stage runs
    #[serde(default)]
    pub order: Vec<String>,
}

/// An image the orchestration layer must build and push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePlan {
    pub resource_id: String,
    pub image: String,
}

impl ResolvedConfig {
    /// Look up a node by id.
    pub fn get(&self, id: &str) -> Option<&ResolvedResource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Nodes in provisioning order. Falls back to declaration order before
    /// the graph stage has run.
    pub fn ordered(&self) -> Vec<&ResolvedResource> {
        if self.order.is_empty() {
            return self.resources.iter().collect();
        }
        self.order.iter().filter_map(|id| self.get(id)).collect()
    }

    /// Images for container-like nodes, in provisioning order.
    pub fn images(&self) -> Vec<ImagePlan> {
        self.ordered()
            .into_iter()
            .filter_map(|r| {
                r.config.image().map(|image| ImagePlan {
                    resource_id: r.id.clone(),
                    image: image.to_string(),
                })
            })
            .collect()
    }
}

// ============================================================================
// Environment values
// ============================================================================

/// A resolved environment value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EnvValue {
    /// Plain string, passed through unchanged
    Literal(String),
    /// Placeholder text such as `${dbConnectionString}`
    Interpolation(String),
    /// Direct code expression such as `apiService.uri`
    Expression(String),
    /// Orchestrator secret key reference
    SecretKeyRef { name: String, key: String },
}

/// Ordered env var name → resolved value.
pub type EnvMap = IndexMap<String, EnvValue>;

// ============================================================================
// Per-kind configuration
// ============================================================================

/// Materialized configuration, one variant per logical resource kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceConfig {
    ServiceAccount(ServiceAccountConfig),
    Bucket(BucketConfig),
    Secret(SecretConfig),
    Topic(TopicConfig),
    Queue(QueueConfig),
    Network(NetworkConfig),
    Subnet(SubnetConfig),
    Firewall(FirewallConfig),
    Registry(RegistryConfig),
    Connector(ConnectorConfig),
    Container(ContainerConfig),
    Function(FunctionConfig),
    Database(DatabaseConfig),
    Cache(CacheConfig),
    Kernel(KernelConfig),
    Ui(UiConfig),
    LoadBalancer(LoadBalancerConfig),
    Cron(CronConfig),
    Namespace(NamespaceConfig),
    ConfigMap(ConfigMapConfig),
    Deployment(DeploymentConfig),
    Service(ServiceConfig),
    Ingress(IngressConfig),
    NetworkPolicy(NetworkPolicyConfig),
}

impl ResourceConfig {
    /// Variant name, as serialized in the `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceAccount(_) => "service_account",
            Self::Bucket(_) => "bucket",
            Self::Secret(_) => "secret",
            Self::Topic(_) => "topic",
            Self::Queue(_) => "queue",
            Self::Network(_) => "network",
            Self::Subnet(_) => "subnet",
            Self::Firewall(_) => "firewall",
            Self::Registry(_) => "registry",
            Self::Connector(_) => "connector",
            Self::Container(_) => "container",
            Self::Function(_) => "function",
            Self::Database(_) => "database",
            Self::Cache(_) => "cache",
            Self::Kernel(_) => "kernel",
            Self::Ui(_) => "ui",
            Self::LoadBalancer(_) => "load_balancer",
            Self::Cron(_) => "cron",
            Self::Namespace(_) => "namespace",
            Self::ConfigMap(_) => "config_map",
            Self::Deployment(_) => "deployment",
            Self::Service(_) => "service",
            Self::Ingress(_) => "ingress",
            Self::NetworkPolicy(_) => "network_policy",
        }
    }

    /// Container image for nodes the orchestration layer builds.
    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Container(c) => Some(&c.image),
            Self::Kernel(k) => Some(&k.image),
            Self::Ui(u) => Some(&u.image),
            Self::Deployment(d) => Some(&d.image),
            _ => None,
        }
    }

    /// Environment map for workload variants.
    pub fn env(&self) -> Option<&EnvMap> {
        match self {
            Self::Container(c) => Some(&c.env),
            Self::Function(f) => Some(&f.env),
            Self::Kernel(k) => Some(&k.env),
            Self::Ui(u) => Some(&u.env),
            Self::Deployment(d) => Some(&d.env),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceAccountConfig {
    pub account_id: String,
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BucketConfig {
    pub bucket_name: String,
    pub location: String,
    pub storage_class: String,
    pub versioning: bool,
    pub public: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            bucket_name: String::new(),
            location: "US".to_string(),
            storage_class: "STANDARD".to_string(),
            versioning: false,
            public: false,
            cors_origins: vec![],
            namespace: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SecretConfig {
    pub secret_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TopicConfig {
    pub topic_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_retention: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QueueConfig {
    pub queue_name: String,
    pub location: String,
    pub max_dispatches_per_second: f64,
    pub max_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_name: String::new(),
            location: "us-central1".to_string(),
            max_dispatches_per_second: 500.0,
            max_attempts: 100,
            namespace: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkConfig {
    pub network_name: String,
    pub auto_create_subnetworks: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubnetConfig {
    pub subnet_name: String,
    /// Code identifier of the owning network
    pub network: String,
    pub cidr: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FirewallConfig {
    pub rule_name: String,
    pub network: String,
    pub protocol: String,
    #[serde(default)]
    pub ports: Vec<String>,
    pub source_ranges: Vec<String>,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            rule_name: String::new(),
            network: String::new(),
            protocol: "tcp".to_string(),
            ports: vec![],
            source_ranges: vec!["0.0.0.0/0".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegistryConfig {
    pub repository_id: String,
    pub location: String,
    pub format: String,
    /// `{location}-docker.pkg.dev/{project}/{repository}`
    pub url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            repository_id: String::new(),
            location: "us-central1".to_string(),
            format: "DOCKER".to_string(),
            url: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConnectorConfig {
    pub connector_name: String,
    pub network: String,
    pub region: String,
    pub ip_cidr_range: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            connector_name: String::new(),
            network: String::new(),
            region: "us-central1".to_string(),
            ip_cidr_range: "10.8.0.0/28".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContainerConfig {
    pub service_name: String,
    pub image: String,
    pub region: String,
    pub port: u16,
    pub cpu: String,
    pub memory: String,
    pub min_instances: u32,
    pub max_instances: u32,
    #[serde(default)]
    pub env: EnvMap,
    pub allow_unauthenticated: bool,
    /// Code identifier of the VPC connector, when one fronts the network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            image: String::new(),
            region: "us-central1".to_string(),
            port: 8080,
            cpu: "1".to_string(),
            memory: "512Mi".to_string(),
            min_instances: 0,
            max_instances: 10,
            env: EnvMap::new(),
            allow_unauthenticated: false,
            connector: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FunctionConfig {
    pub function_name: String,
    pub region: String,
    pub runtime: String,
    pub entry_point: String,
    pub source: String,
    pub memory: String,
    pub timeout_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_topic: Option<EnvValue>,
    #[serde(default)]
    pub env: EnvMap,
    pub allow_unauthenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            function_name: String::new(),
            region: "us-central1".to_string(),
            runtime: "nodejs20".to_string(),
            entry_point: "handler".to_string(),
            source: String::new(),
            memory: "256Mi".to_string(),
            timeout_seconds: 60,
            trigger_topic: None,
            env: EnvMap::new(),
            allow_unauthenticated: false,
            connector: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DatabaseConfig {
    pub instance_name: String,
    pub region: String,
    pub engine: String,
    pub tier: String,
    pub disk_size_gb: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            instance_name: String::new(),
            region: "us-central1".to_string(),
            engine: "POSTGRES_15".to_string(),
            tier: "db-f1-micro".to_string(),
            disk_size_gb: 10,
            network: None,
            namespace: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CacheConfig {
    pub instance_name: String,
    pub region: String,
    pub tier: String,
    pub memory_size_gb: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            instance_name: String::new(),
            region: "us-central1".to_string(),
            tier: "BASIC".to_string(),
            memory_size_gb: 1,
            network: None,
            namespace: None,
        }
    }
}

/// Which kernel implementation a node uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum KernelVariant {
    /// VM-hosted container
    #[default]
    Native,
    /// Always-on container service
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KernelConfig {
    pub kernel_name: String,
    pub variant: KernelVariant,
    pub image: String,
    pub region: String,
    pub machine_type: String,
    pub port: u16,
    #[serde(default)]
    pub env: EnvMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            kernel_name: String::new(),
            variant: KernelVariant::Native,
            image: String::new(),
            region: "us-central1".to_string(),
            machine_type: "e2-small".to_string(),
            port: 8080,
            env: EnvMap::new(),
            connector: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UiConfig {
    pub service_name: String,
    pub image: String,
    pub region: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub env: EnvMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            image: String::new(),
            region: "us-central1".to_string(),
            port: 3000,
            source: None,
            env: EnvMap::new(),
            connector: None,
        }
    }
}

/// Category a route backend resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RouteBackendKind {
    Ui,
    Container,
    Function,
}

impl RouteBackendKind {
    pub fn node_kind(self) -> NodeKind {
        match self {
            Self::Ui => NodeKind::Ui,
            Self::Container => NodeKind::Container,
            Self::Function => NodeKind::Function,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RouteTarget {
    pub path: String,
    /// User-facing backend name
    pub backend: String,
    pub backend_kind: RouteBackendKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LoadBalancerConfig {
    pub lb_name: String,
    /// Region of the serverless endpoint groups
    pub region: String,
    pub https: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub routes: Vec<RouteTarget>,
    /// IAP members; `None` when IAP is off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iap_members: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CronConfig {
    pub job_name: String,
    pub region: String,
    pub schedule: String,
    pub time_zone: String,
    pub target_kind: RouteBackendKind,
    /// User-facing target name
    pub target: String,
    /// Base URL of the target
    pub target_url: EnvValue,
    pub path: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Default for CronConfig {
    fn default() -> Self {
        Self {
            job_name: String::new(),
            region: "us-central1".to_string(),
            schedule: String::new(),
            time_zone: "Etc/UTC".to_string(),
            target_kind: RouteBackendKind::Container,
            target: String::new(),
            target_url: EnvValue::Literal(String::new()),
            path: "/".to_string(),
            method: "POST".to_string(),
            body: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NamespaceConfig {
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigMapConfig {
    pub map_name: String,
    pub namespace: String,
    #[serde(default)]
    pub data: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeploymentConfig {
    pub deployment_name: String,
    pub namespace: String,
    pub image: String,
    pub port: u16,
    pub replicas: u32,
    #[serde(default)]
    pub env: EnvMap,
    /// Shared config map injected with `envFrom`
    pub config_map: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            deployment_name: String::new(),
            namespace: "default".to_string(),
            image: String::new(),
            port: 8080,
            replicas: 1,
            env: EnvMap::new(),
            config_map: String::new(),
            cpu: None,
            memory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceConfig {
    pub service_name: String,
    pub namespace: String,
    /// `app` label of the pods behind the service
    pub selector: String,
    pub port: u16,
    pub target_port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            namespace: "default".to_string(),
            selector: String::new(),
            port: 80,
            target_port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IngressRule {
    pub path: String,
    pub service: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IngressConfig {
    pub ingress_name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub tls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub rules: Vec<IngressRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkPolicyConfig {
    pub policy_name: String,
    pub namespace: String,
    pub protocol: String,
    #[serde(default)]
    pub ports: Vec<String>,
    pub source_ranges: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, config: ResourceConfig) -> ResolvedResource {
        ResolvedResource {
            id: id.to_string(),
            resource_type: "gcp:test".to_string(),
            name: id.to_string(),
            config,
            depends_on: vec![],
            network: None,
        }
    }

    fn sample() -> ResolvedConfig {
        ResolvedConfig {
            project: ProjectInfo {
                name: "shop".to_string(),
                region: "us-central1".to_string(),
                cloud_project_id: "shop".to_string(),
                backend: Backend::Flat,
            },
            resources: vec![
                node(
                    "container-api",
                    ResourceConfig::Container(ContainerConfig {
                        image: "gcr.io/shop/api:latest".to_string(),
                        ..Default::default()
                    }),
                ),
                node("bucket-files", ResourceConfig::Bucket(BucketConfig::default())),
            ],
            order: vec![],
        }
    }

    #[test]
    fn test_node_ids() {
        assert_eq!(NodeKind::Bucket.node_id("uploads"), "bucket-uploads");
        assert_eq!(NodeKind::ServiceAccount.node_id("runner"), "service-account-runner");
        assert_eq!(NodeKind::LoadBalancer.node_id("main"), "load-balancer-main");
        assert_eq!(NodeKind::HybridKernel.node_id("k"), NodeKind::Kernel.node_id("k"));
    }

    #[test]
    fn test_node_kind_display() {
        assert_eq!(NodeKind::LoadBalancer.to_string(), "load balancer");
        assert_eq!(NodeKind::HybridKernel.to_string(), "hybrid kernel");
    }

    #[test]
    fn test_resource_config_tag() {
        let cfg = ResourceConfig::Bucket(BucketConfig::default());
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["kind"], "bucket");
        assert_eq!(json["storage_class"], "STANDARD");
        assert_eq!(cfg.kind(), "bucket");
    }

    #[test]
    fn test_env_value_serde() {
        let v = EnvValue::Interpolation("${dbConnectionString}".to_string());
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("\"kind\":\"interpolation\""));
        let back: EnvValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_images_and_ordering() {
        let mut config = sample();
        let images = config.images();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].image, "gcr.io/shop/api:latest");

        config.order = vec!["bucket-files".to_string(), "container-api".to_string()];
        let ids: Vec<_> = config.ordered().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["bucket-files", "container-api"]);
    }

    #[test]
    fn test_get_by_id() {
        let config = sample();
        assert!(config.get("bucket-files").is_some());
        assert!(config.get("bucket-missing").is_none());
    }
}
