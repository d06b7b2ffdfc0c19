//! Project description → resolved resource graph.
//!
//! One resolver walks the description in a fixed order and asks a
//! [`BackendProfile`] for everything backend-specific:
//! 1. project info (and, for manifests, namespace + shared config map)
//! 2. global resources: service account, buckets, secrets, topics, queues
//! 3. per network: network, subnets, firewall, connector, registry, kernel,
//!    containers, functions, databases, caches, UIs, load balancer
//! 4. crons
//!
//! Edges come from network membership, the construct infra pipeline, the
//! manifest namespace/config map, explicit `depends_on`, and references found
//! in `env`/`secrets` maps.

mod cron;
mod env;
pub mod profile;
mod routes;
mod workloads;

pub use profile::BackendProfile;
use profile::WorkloadShape;

use super::error::{CompileError, Result};
use super::naming::{code_identifier, image_tag, sanitize_label};
use super::reference::ReferenceType;
use super::resolved::*;
use super::types::*;
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Resolve a description into its node set. `order` is left empty.
pub fn resolve(desc: &ProjectDescription) -> Result<ResolvedConfig> {
    let profile = BackendProfile::for_backend(desc.project.backend);
    profile.check_legality(desc)?;

    let mut resolver = Resolver::new(desc, profile);
    if profile.workload_shape == WorkloadShape::DeploymentService {
        resolver.resolve_cluster()?;
    }
    resolver.resolve_globals()?;
    for network in &desc.networks {
        resolver.resolve_network(network)?;
    }
    for cron in &desc.crons {
        resolver.resolve_cron(cron)?;
    }

    let config = resolver.finish();
    info!(
        project = %config.project.name,
        backend = %config.project.backend,
        nodes = config.resources.len(),
        "resolved project"
    );
    Ok(config)
}

/// Namespace-level objects every manifest node hangs off.
#[derive(Debug, Clone)]
struct Cluster {
    namespace: String,
    namespace_id: String,
    config_map: String,
    config_map_id: String,
    registry: String,
    ingress_class: Option<String>,
    replicas: u32,
}

/// Per-network state shared by the network's workloads.
struct NetworkContext<'n> {
    spec: &'n NetworkSpec,
    network_id: Option<String>,
    /// Ids every workload in the network depends on
    base: IndexSet<String>,
    /// Code identifier of the VPC connector
    connector: Option<String>,
    registry_url: Option<String>,
}

impl<'n> NetworkContext<'n> {
    fn new(spec: &'n NetworkSpec) -> Self {
        Self {
            spec,
            network_id: None,
            base: IndexSet::new(),
            connector: None,
            registry_url: None,
        }
    }

    fn name(&self) -> &'n str {
        &self.spec.name
    }
}

struct Resolver<'a> {
    desc: &'a ProjectDescription,
    profile: &'static BackendProfile,
    project: ProjectInfo,
    resources: Vec<ResolvedResource>,
    ids: HashSet<String>,
    /// Generated construct identifier per container/function name
    identifiers: HashMap<(ReferenceType, String), String>,
    cluster: Option<Cluster>,
}

impl<'a> Resolver<'a> {
    fn new(desc: &'a ProjectDescription, profile: &'static BackendProfile) -> Self {
        let mut identifiers = HashMap::new();
        for network in &desc.networks {
            for c in &network.containers {
                identifiers.insert(
                    (ReferenceType::Container, c.name.clone()),
                    code_identifier(&c.name, "service"),
                );
            }
            for f in &network.functions {
                identifiers.insert(
                    (ReferenceType::Function, f.name.clone()),
                    code_identifier(&f.name, "function"),
                );
            }
        }

        Self {
            desc,
            profile,
            project: ProjectInfo {
                name: desc.project.name.clone(),
                region: desc.project.region.clone(),
                cloud_project_id: desc.cloud_project_id().to_string(),
                backend: desc.project.backend,
            },
            resources: Vec::new(),
            ids: HashSet::new(),
            identifiers,
            cluster: None,
        }
    }

    fn finish(self) -> ResolvedConfig {
        ResolvedConfig {
            project: self.project,
            resources: self.resources,
            order: Vec::new(),
        }
    }

    /// Push a node. Rejects a repeated id.
    fn add(
        &mut self,
        kind: NodeKind,
        name: &str,
        config: ResourceConfig,
        depends_on: IndexSet<String>,
        network: Option<&str>,
    ) -> Result<String> {
        let id = kind.node_id(name);
        if !self.ids.insert(id.clone()) {
            return Err(CompileError::DuplicateResource { id });
        }
        debug!(id = %id, deps = depends_on.len(), "resolved node");
        self.resources.push(ResolvedResource {
            id: id.clone(),
            resource_type: self.profile.type_tag(kind),
            name: name.to_string(),
            config,
            depends_on: depends_on.into_iter().collect(),
            network: network.map(str::to_string),
        });
        Ok(id)
    }

    /// Provider-facing name for a declared resource.
    fn name(&self, name: &str) -> String {
        self.profile.resource_name(&self.desc.project.name, name)
    }

    fn region(&self) -> String {
        self.desc.project.region.clone()
    }

    fn invalid(&self, message: impl Into<String>, hint: impl Into<String>) -> CompileError {
        CompileError::Invalid {
            backend: self.profile.backend,
            message: message.into(),
            hint: hint.into(),
        }
    }

    fn cluster(&self) -> Result<&Cluster> {
        self.cluster.as_ref().ok_or_else(|| {
            self.invalid(
                "cluster objects were not resolved",
                "set `kubernetes.namespace` and `kubernetes.registry`",
            )
        })
    }

    fn namespace(&self) -> Option<String> {
        self.cluster.as_ref().map(|c| c.namespace.clone())
    }

    /// Dependencies of resources outside any network: the namespace on
    /// manifests, nothing otherwise.
    fn scope_deps(&self) -> IndexSet<String> {
        self.cluster
            .iter()
            .map(|c| c.namespace_id.clone())
            .collect()
    }

    /// Default image: `{registry}/{name}:latest`, falling back to the
    /// project's container registry host.
    fn image_for(&self, ctx: &NetworkContext<'_>, explicit: Option<&str>, name: &str) -> String {
        if let Some(image) = explicit {
            return image.to_string();
        }
        let registry = ctx
            .registry_url
            .clone()
            .unwrap_or_else(|| format!("gcr.io/{}", self.desc.cloud_project_id()));
        image_tag(&registry, name, "latest")
    }

    /// Network the kernel (of either variant) lives in.
    fn kernel_network(&self) -> Option<&'a str> {
        let kernel = self.desc.kernel.as_ref().or(self.desc.hybrid_kernel.as_ref())?;
        kernel
            .network
            .as_deref()
            .or_else(|| self.desc.networks.first().map(|n| n.name.as_str()))
    }

    // ========================================================================
    // Cluster scaffolding (manifest)
    // ========================================================================

    fn resolve_cluster(&mut self) -> Result<()> {
        let kubernetes = self.desc.kubernetes.clone().unwrap_or_default();
        let namespace = kubernetes
            .namespace
            .as_deref()
            .map(sanitize_label)
            .ok_or_else(|| self.invalid("no namespace configured", "set `kubernetes.namespace`"))?;
        let registry = kubernetes.registry.clone().ok_or_else(|| {
            self.invalid("no image registry configured", "set `kubernetes.registry`")
        })?;

        let namespace_id = self.add(
            NodeKind::Namespace,
            &namespace,
            ResourceConfig::Namespace(NamespaceConfig {
                namespace: namespace.clone(),
            }),
            IndexSet::new(),
            None,
        )?;

        let project = self.desc.project.name.clone();
        let config_map = format!("{}-config", sanitize_label(&project));
        let mut data = IndexMap::new();
        data.insert("PROJECT_NAME".to_string(), project.clone());
        data.insert("REGION".to_string(), self.region());
        data.insert(
            "CLOUD_PROJECT_ID".to_string(),
            self.desc.cloud_project_id().to_string(),
        );
        let config_map_id = self.add(
            NodeKind::ConfigMap,
            &project,
            ResourceConfig::ConfigMap(ConfigMapConfig {
                map_name: config_map.clone(),
                namespace: namespace.clone(),
                data,
            }),
            IndexSet::from([namespace_id.clone()]),
            None,
        )?;

        self.cluster = Some(Cluster {
            namespace,
            namespace_id,
            config_map,
            config_map_id,
            registry,
            ingress_class: kubernetes.ingress_class,
            replicas: kubernetes.replicas,
        });
        Ok(())
    }

    // ========================================================================
    // Global resources
    // ========================================================================

    fn resolve_globals(&mut self) -> Result<()> {
        let desc = self.desc;
        let namespace = self.namespace();

        if let Some(ref sa) = desc.service_account {
            let config = ServiceAccountConfig {
                account_id: self.name(&sa.name),
                display_name: sa.display_name.clone().unwrap_or_else(|| sa.name.clone()),
                roles: sa.roles.clone(),
                namespace: namespace.clone(),
            };
            let deps = self.scope_deps();
            self.add(
                NodeKind::ServiceAccount,
                &sa.name,
                ResourceConfig::ServiceAccount(config),
                deps,
                None,
            )?;
        }

        for b in &desc.buckets {
            let config = BucketConfig {
                bucket_name: self.name(&b.name),
                location: b
                    .location
                    .clone()
                    .unwrap_or_else(|| desc.project.region.to_uppercase()),
                storage_class: b.storage_class.clone(),
                versioning: b.versioning,
                public: b.public,
                cors_origins: b.cors_origins.clone(),
                namespace: namespace.clone(),
            };
            let deps = self.scope_deps();
            self.add(NodeKind::Bucket, &b.name, ResourceConfig::Bucket(config), deps, None)?;
        }

        for s in &desc.secrets {
            let config = SecretConfig {
                secret_id: self.name(&s.name),
                description: s.description.clone(),
                namespace: namespace.clone(),
            };
            let deps = self.scope_deps();
            self.add(NodeKind::Secret, &s.name, ResourceConfig::Secret(config), deps, None)?;
        }

        for t in &desc.topics {
            let config = TopicConfig {
                topic_name: self.name(&t.name),
                message_retention: t.message_retention.clone(),
                namespace: namespace.clone(),
            };
            let deps = self.scope_deps();
            self.add(NodeKind::Topic, &t.name, ResourceConfig::Topic(config), deps, None)?;
        }

        for q in &desc.queues {
            let defaults = QueueConfig::default();
            let config = QueueConfig {
                queue_name: self.name(&q.name),
                location: self.region(),
                max_dispatches_per_second: q
                    .max_dispatches_per_second
                    .unwrap_or(defaults.max_dispatches_per_second),
                max_attempts: q.max_attempts.unwrap_or(defaults.max_attempts),
                namespace: namespace.clone(),
            };
            let deps = self.scope_deps();
            self.add(NodeKind::Queue, &q.name, ResourceConfig::Queue(config), deps, None)?;
        }

        Ok(())
    }

    // ========================================================================
    // Networks
    // ========================================================================

    fn resolve_network(&mut self, network: &'a NetworkSpec) -> Result<()> {
        let mut ctx = NetworkContext::new(network);
        if self.cluster.is_some() {
            self.resolve_cluster_network(&mut ctx)?;
        } else {
            self.resolve_cloud_network(&mut ctx)?;
        }

        if self.kernel_network() == Some(ctx.name()) {
            self.resolve_kernel(&mut ctx)?;
        }
        for c in &network.containers {
            self.resolve_container(&ctx, c)?;
        }
        for f in &network.functions {
            self.resolve_function(&ctx, f)?;
        }
        for d in &network.databases {
            self.resolve_database(&ctx, d)?;
        }
        for c in &network.caches {
            self.resolve_cache(&ctx, c)?;
        }
        for u in &network.uis {
            self.resolve_ui(&ctx, u)?;
        }
        if let Some(ref lb) = network.load_balancer {
            self.resolve_load_balancer(&ctx, lb)?;
        }
        Ok(())
    }

    /// Network, subnets, firewall, then the connector/registry pipeline.
    ///
    /// On flat projects a network with nothing VPC-bound in it is only a
    /// grouping tag and produces no node.
    fn resolve_cloud_network(&mut self, ctx: &mut NetworkContext<'a>) -> Result<()> {
        let network = ctx.spec;
        let net = network.name.as_str();
        let net_ident = code_identifier(net, "network");

        if self.profile.pipeline || network.has_infrastructure() {
            let network_id = self.add(
                NodeKind::Network,
                net,
                ResourceConfig::Network(NetworkConfig {
                    network_name: self.name(net),
                    auto_create_subnetworks: network.subnets.is_empty(),
                }),
                IndexSet::new(),
                Some(net),
            )?;
            ctx.network_id = Some(network_id);
        }
        let network_deps: IndexSet<String> = ctx.network_id.iter().cloned().collect();

        for s in &network.subnets {
            let config = SubnetConfig {
                subnet_name: self.name(&s.name),
                network: net_ident.clone(),
                cidr: s.cidr.clone(),
                region: s.region.clone().unwrap_or_else(|| self.region()),
            };
            self.add(
                NodeKind::Subnet,
                &s.name,
                ResourceConfig::Subnet(config),
                network_deps.clone(),
                Some(net),
            )?;
        }

        for rule in &network.firewall {
            let config = FirewallConfig {
                rule_name: self.name(&rule.name),
                network: net_ident.clone(),
                protocol: rule.protocol.clone(),
                ports: rule.ports.clone(),
                source_ranges: rule.source_ranges.clone(),
            };
            self.add(
                NodeKind::Firewall,
                &rule.name,
                ResourceConfig::Firewall(config),
                network_deps.clone(),
                Some(net),
            )?;
        }

        if self.profile.pipeline {
            let config = ConnectorConfig {
                connector_name: self.name(&format!("{}-conn", net)),
                network: net_ident,
                region: self.region(),
                ..Default::default()
            };
            let connector_id = self.add(
                NodeKind::Connector,
                net,
                ResourceConfig::Connector(config),
                network_deps,
                Some(net),
            )?;
            ctx.base.insert(connector_id);
            ctx.connector = Some(code_identifier(net, "connector"));
        } else {
            ctx.base.extend(network_deps);
        }

        if let Some(ref registry) = network.registry {
            let repository_id = self.name(&registry.name);
            let url = format!(
                "{}-docker.pkg.dev/{}/{}",
                self.region(),
                self.desc.cloud_project_id(),
                repository_id
            );
            let config = RegistryConfig {
                repository_id,
                location: self.region(),
                format: registry.format.clone(),
                url: url.clone(),
            };
            let registry_id = self.add(
                NodeKind::Registry,
                &registry.name,
                ResourceConfig::Registry(config),
                ctx.base.clone(),
                Some(net),
            )?;
            if self.profile.pipeline {
                ctx.base.insert(registry_id);
            }
            ctx.registry_url = Some(url);
        }
        Ok(())
    }

    /// Manifests have no network objects: firewall rules become network
    /// policies and workloads hang off the namespace and config map.
    fn resolve_cluster_network(&mut self, ctx: &mut NetworkContext<'a>) -> Result<()> {
        let cluster = self.cluster()?.clone();
        let network = ctx.spec;
        let net = network.name.as_str();

        for rule in &network.firewall {
            let config = NetworkPolicyConfig {
                policy_name: sanitize_label(&rule.name),
                namespace: cluster.namespace.clone(),
                protocol: rule.protocol.clone(),
                ports: rule.ports.clone(),
                source_ranges: rule.source_ranges.clone(),
            };
            self.add(
                NodeKind::NetworkPolicy,
                &rule.name,
                ResourceConfig::NetworkPolicy(config),
                IndexSet::from([cluster.namespace_id.clone()]),
                Some(net),
            )?;
        }
        if !network.subnets.is_empty() || network.registry.is_some() {
            debug!(network = net, "subnets and registry have no manifest counterpart");
        }

        ctx.base.insert(cluster.namespace_id);
        ctx.base.insert(cluster.config_map_id);
        ctx.registry_url = Some(cluster.registry);
        Ok(())
    }

    /// Edges of a data resource: its network, or the namespace.
    fn data_deps(&self, ctx: &NetworkContext<'_>) -> IndexSet<String> {
        match ctx.network_id {
            Some(ref id) => IndexSet::from([id.clone()]),
            None => self.scope_deps(),
        }
    }

    fn resolve_database(&mut self, ctx: &NetworkContext<'_>, spec: &DatabaseSpec) -> Result<()> {
        let config = DatabaseConfig {
            instance_name: self.name(&spec.name),
            region: self.region(),
            engine: spec.engine.clone(),
            tier: spec.tier.clone(),
            disk_size_gb: spec.disk_size_gb,
            network: ctx
                .network_id
                .as_ref()
                .map(|_| code_identifier(ctx.name(), "network")),
            namespace: self.namespace(),
        };
        let deps = self.data_deps(ctx);
        self.add(
            NodeKind::Database,
            &spec.name,
            ResourceConfig::Database(config),
            deps,
            Some(ctx.name()),
        )?;
        Ok(())
    }

    fn resolve_cache(&mut self, ctx: &NetworkContext<'_>, spec: &CacheSpec) -> Result<()> {
        let config = CacheConfig {
            instance_name: self.name(&spec.name),
            region: self.region(),
            tier: spec.tier.clone(),
            memory_size_gb: spec.memory_size_gb,
            network: ctx
                .network_id
                .as_ref()
                .map(|_| code_identifier(ctx.name(), "network")),
            namespace: self.namespace(),
        };
        let deps = self.data_deps(ctx);
        self.add(
            NodeKind::Cache,
            &spec.name,
            ResourceConfig::Cache(config),
            deps,
            Some(ctx.name()),
        )?;
        Ok(())
    }
}
