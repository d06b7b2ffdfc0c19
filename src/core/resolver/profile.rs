//! Backend capability descriptors.
//!
//! One resolver serves all three backends; everything that differs between
//! them (type tags, naming, legality, how workloads are shaped) is read from
//! a `BackendProfile`.

use crate::core::error::{CompileError, Result};
use crate::core::naming::{prefixed_name, sanitize_label};
use crate::core::resolved::NodeKind;
use crate::core::types::{Backend, ProjectDescription};
use std::collections::HashMap;

/// A declarable feature a backend may reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Databases,
    Caches,
    Crons,
    Kernel,
    HybridKernel,
    Uis,
}

impl Feature {
    fn label(self) -> &'static str {
        match self {
            Self::Databases => "databases",
            Self::Caches => "caches",
            Self::Crons => "crons",
            Self::Kernel => "kernel",
            Self::HybridKernel => "hybrid_kernel",
            Self::Uis => "uis",
        }
    }

    fn present(self, desc: &ProjectDescription) -> bool {
        match self {
            Self::Databases => desc.networks.iter().any(|n| !n.databases.is_empty()),
            Self::Caches => desc.networks.iter().any(|n| !n.caches.is_empty()),
            Self::Crons => !desc.crons.is_empty(),
            Self::Kernel => desc.kernel.is_some(),
            Self::HybridKernel => desc.hybrid_kernel.is_some(),
            Self::Uis => desc.networks.iter().any(|n| !n.uis.is_empty()),
        }
    }
}

/// A structural requirement checked before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// At least one network
    Network,
    /// At least one container, function, UI or kernel
    Workload,
    /// `kernel` and `hybrid_kernel` are mutually exclusive
    ExclusiveKernels,
    /// IAP on a load balancer needs HTTPS and a domain
    IapHttps,
    /// `kubernetes.namespace` is set
    Namespace,
    /// `kubernetes.registry` is set
    ImageRegistry,
    /// A declared kernel has a network to live in
    KernelNetwork,
    /// No two workloads share a name across the project
    DistinctWorkloadNames,
}

/// How containers, functions, UIs and kernels become nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadShape {
    /// One node per workload
    Single,
    /// A deployment + service pair per workload
    DeploymentService,
}

/// How a reference inside an env map is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceStyle {
    /// `${nameOutput}` placeholders
    Interpolation,
    /// Placeholders, except container/function URLs which become code
    /// expressions on the generated construct
    ConstructExpression,
    /// Secret key refs and in-cluster service URLs
    Cluster,
}

/// Everything the resolver needs to know about a backend.
#[derive(Debug, Clone, Copy)]
pub struct BackendProfile {
    pub backend: Backend,
    type_prefix: &'static str,
    /// Prefix provider-facing names with the project name
    pub prefix_names: bool,
    /// Build the connector → registry → kernel pipeline
    pub pipeline: bool,
    pub workload_shape: WorkloadShape,
    pub reference_style: ReferenceStyle,
    unsupported: &'static [(Feature, &'static str)],
    requirements: &'static [Requirement],
}

const FLAT: BackendProfile = BackendProfile {
    backend: Backend::Flat,
    type_prefix: "gcp",
    prefix_names: false,
    pipeline: false,
    workload_shape: WorkloadShape::Single,
    reference_style: ReferenceStyle::Interpolation,
    unsupported: &[
        (Feature::Kernel, "kernels are provided by the construct backend"),
        (
            Feature::HybridKernel,
            "hybrid kernels are provided by the construct and manifest backends",
        ),
        (Feature::Uis, "UIs are provided by the construct and manifest backends"),
    ],
    requirements: &[Requirement::ExclusiveKernels],
};

const CONSTRUCT: BackendProfile = BackendProfile {
    backend: Backend::Construct,
    type_prefix: "gcp-cdktf",
    prefix_names: true,
    pipeline: true,
    workload_shape: WorkloadShape::Single,
    reference_style: ReferenceStyle::ConstructExpression,
    unsupported: &[
        (Feature::Databases, "remove `databases` or use the flat backend"),
        (Feature::Caches, "remove `caches` or use the flat backend"),
        (Feature::Crons, "remove `crons` or use the flat backend"),
    ],
    requirements: &[
        Requirement::Network,
        Requirement::Workload,
        Requirement::ExclusiveKernels,
        Requirement::IapHttps,
    ],
};

const MANIFEST: BackendProfile = BackendProfile {
    backend: Backend::Manifest,
    type_prefix: "k8s",
    prefix_names: false,
    pipeline: false,
    workload_shape: WorkloadShape::DeploymentService,
    reference_style: ReferenceStyle::Cluster,
    unsupported: &[
        (
            Feature::Kernel,
            "use `hybrid_kernel` instead, or the construct backend for the native kernel",
        ),
        (Feature::Crons, "remove `crons` or use the flat backend"),
    ],
    requirements: &[
        Requirement::Namespace,
        Requirement::ImageRegistry,
        Requirement::ExclusiveKernels,
        Requirement::KernelNetwork,
        Requirement::DistinctWorkloadNames,
    ],
};

impl BackendProfile {
    /// Profile for a backend.
    pub fn for_backend(backend: Backend) -> &'static BackendProfile {
        match backend {
            Backend::Flat => &FLAT,
            Backend::Construct => &CONSTRUCT,
            Backend::Manifest => &MANIFEST,
        }
    }

    /// Backend-qualified type tag, e.g. `gcp-cdktf:storage_bucket`.
    pub fn type_tag(&self, kind: NodeKind) -> String {
        format!("{}:{}", self.type_prefix, self.type_suffix(kind))
    }

    /// Prefix shared by every type tag of this backend (`gcp:`, ...).
    pub fn tag_prefix(&self) -> String {
        format!("{}:", self.type_prefix)
    }

    fn type_suffix(&self, kind: NodeKind) -> &'static str {
        match (self.backend, kind) {
            (Backend::Manifest, NodeKind::Queue) => "tasks_queue",
            (Backend::Manifest, NodeKind::Database) => "sql_instance",
            (Backend::Manifest, NodeKind::Cache) => "redis_instance",
            (_, NodeKind::ServiceAccount) => "service_account",
            (_, NodeKind::Bucket) => "storage_bucket",
            (_, NodeKind::Secret) => "secret",
            (_, NodeKind::Topic) => "pubsub_topic",
            (_, NodeKind::Queue) => "cloud_tasks_queue",
            (_, NodeKind::Network) => "network",
            (_, NodeKind::Subnet) => "subnetwork",
            (_, NodeKind::Firewall) => "firewall",
            (_, NodeKind::Registry) => "artifact_registry",
            (_, NodeKind::Connector) => "vpc_access_connector",
            (_, NodeKind::Container) => "cloud_run_service",
            (_, NodeKind::Function) => "cloudfunctions_function",
            (_, NodeKind::Database) => "sql_database_instance",
            (_, NodeKind::Cache) => "redis_instance",
            (_, NodeKind::Kernel) => "kernel",
            (_, NodeKind::HybridKernel) => "hybrid_kernel",
            (_, NodeKind::Ui) => "ui",
            (_, NodeKind::LoadBalancer) => "load_balancer",
            (_, NodeKind::Cron) => "cloud_scheduler_job",
            (_, NodeKind::Namespace) => "namespace",
            (_, NodeKind::ConfigMap) => "config_map",
            (_, NodeKind::Deployment) => "deployment",
            (_, NodeKind::Service) => "service",
            (_, NodeKind::Ingress) => "ingress",
            (_, NodeKind::NetworkPolicy) => "network_policy",
        }
    }

    /// Provider-facing name for a declared resource.
    pub fn resource_name(&self, project: &str, name: &str) -> String {
        match self.backend {
            Backend::Construct => prefixed_name(project, name),
            Backend::Manifest => sanitize_label(name),
            Backend::Flat => name.to_string(),
        }
    }

    /// Reject descriptions this backend cannot express.
    pub fn check_legality(&self, desc: &ProjectDescription) -> Result<()> {
        for (feature, hint) in self.unsupported {
            if feature.present(desc) {
                return Err(CompileError::Unsupported {
                    backend: self.backend,
                    feature: feature.label().to_string(),
                    hint: hint.to_string(),
                });
            }
        }
        for requirement in self.requirements {
            self.check_requirement(*requirement, desc)?;
        }
        Ok(())
    }

    fn invalid(&self, message: impl Into<String>, hint: impl Into<String>) -> CompileError {
        CompileError::Invalid {
            backend: self.backend,
            message: message.into(),
            hint: hint.into(),
        }
    }

    fn check_requirement(&self, requirement: Requirement, desc: &ProjectDescription) -> Result<()> {
        let kubernetes = desc.kubernetes.as_ref();
        match requirement {
            Requirement::Network if desc.networks.is_empty() => Err(self.invalid(
                "no networks declared",
                "declare at least one entry under `networks`",
            )),
            Requirement::Workload if !desc.has_workload() => Err(self.invalid(
                "nothing to deploy",
                "declare a function, container or UI in a network, or a `kernel`/`hybrid_kernel`",
            )),
            Requirement::ExclusiveKernels if desc.kernel.is_some() && desc.hybrid_kernel.is_some() => {
                Err(self.invalid(
                    "`kernel` and `hybrid_kernel` are mutually exclusive",
                    "keep exactly one of `kernel` or `hybrid_kernel`",
                ))
            }
            Requirement::IapHttps => {
                for network in &desc.networks {
                    let Some(ref lb) = network.load_balancer else {
                        continue;
                    };
                    let iap_on = lb.iap.as_ref().is_some_and(|iap| iap.enabled);
                    if iap_on && (!lb.https || lb.domain.is_none()) {
                        return Err(self.invalid(
                            format!(
                                "identity-aware proxy on the load balancer of network '{}' requires HTTPS",
                                network.name
                            ),
                            "set `https: true` and a `domain` on the load balancer, or disable `iap`",
                        ));
                    }
                }
                Ok(())
            }
            Requirement::Namespace if kubernetes.and_then(|k| k.namespace.as_ref()).is_none() => {
                Err(self.invalid(
                    "no namespace configured",
                    "set `kubernetes.namespace`",
                ))
            }
            Requirement::ImageRegistry if kubernetes.and_then(|k| k.registry.as_ref()).is_none() => {
                Err(self.invalid(
                    "no image registry configured",
                    "set `kubernetes.registry` (e.g. `ghcr.io/acme`)",
                ))
            }
            Requirement::KernelNetwork
                if (desc.kernel.is_some() || desc.hybrid_kernel.is_some())
                    && desc.networks.is_empty() =>
            {
                Err(self.invalid(
                    "a kernel is declared but no network hosts it",
                    "declare a network for the kernel under `networks`",
                ))
            }
            Requirement::DistinctWorkloadNames => check_distinct_workloads(desc)
                .map_err(|(first, second, name)| {
                    self.invalid(
                        format!("{} and {} both become deployment '{}'", first, second, name),
                        "rename one of them; every workload here is a deployment and service named after it",
                    )
                }),
            _ => Ok(()),
        }
    }
}

/// First pair of workloads sharing a name, as `(earlier, later, name)`.
fn check_distinct_workloads(
    desc: &ProjectDescription,
) -> std::result::Result<(), (String, String, String)> {
    let mut workloads: Vec<(String, &str)> = Vec::new();
    for network in &desc.networks {
        let at = |kind: &str, name: &str| format!("{} '{}' in network '{}'", kind, name, network.name);
        workloads.extend(network.containers.iter().map(|c| (at("container", &c.name), c.name.as_str())));
        workloads.extend(network.functions.iter().map(|f| (at("function", &f.name), f.name.as_str())));
        workloads.extend(network.uis.iter().map(|u| (at("ui", &u.name), u.name.as_str())));
    }
    if let Some(ref kernel) = desc.hybrid_kernel {
        workloads.push((format!("hybrid kernel '{}'", kernel.name), kernel.name.as_str()));
    }

    let mut seen: HashMap<&str, String> = HashMap::new();
    for (label, name) in workloads {
        if let Some(first) = seen.get(name) {
            return Err((first.clone(), label, name.to_string()));
        }
        seen.insert(name, label);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::{parse_description, Format};

    fn desc(yaml: &str) -> ProjectDescription {
        parse_description(yaml, Format::Yaml).unwrap()
    }

    #[test]
    fn test_type_tags_differ_per_backend() {
        let kind = NodeKind::Bucket;
        assert_eq!(BackendProfile::for_backend(Backend::Flat).type_tag(kind), "gcp:storage_bucket");
        assert_eq!(
            BackendProfile::for_backend(Backend::Construct).type_tag(kind),
            "gcp-cdktf:storage_bucket"
        );
        assert_eq!(
            BackendProfile::for_backend(Backend::Manifest).type_tag(kind),
            "k8s:storage_bucket"
        );
        assert_eq!(
            BackendProfile::for_backend(Backend::Manifest).type_tag(NodeKind::Queue),
            "k8s:tasks_queue"
        );
    }

    #[test]
    fn test_resource_names() {
        let construct = BackendProfile::for_backend(Backend::Construct);
        assert_eq!(construct.resource_name("shop", "api"), "shop-api");
        let flat = BackendProfile::for_backend(Backend::Flat);
        assert_eq!(flat.resource_name("shop", "api"), "api");
    }

    #[test]
    fn test_construct_rejects_databases() {
        let d = desc(
            r#"
project: {name: shop, backend: construct}
networks:
  - name: main
    containers: [{name: api}]
    databases: [{name: main}]
"#,
        );
        let err = BackendProfile::for_backend(Backend::Construct)
            .check_legality(&d)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("databases not supported by the construct backend"));
        assert!(msg.contains("use the flat backend"));
    }

    #[test]
    fn test_construct_requires_network_and_workload() {
        let d = desc("project: {name: shop, backend: construct}");
        let err = BackendProfile::for_backend(Backend::Construct)
            .check_legality(&d)
            .unwrap_err();
        assert!(err.to_string().contains("no networks declared"));

        let d = desc(
            r#"
project: {name: shop, backend: construct}
networks: [{name: main}]
"#,
        );
        let err = BackendProfile::for_backend(Backend::Construct)
            .check_legality(&d)
            .unwrap_err();
        assert!(err.to_string().contains("nothing to deploy"));
    }

    #[test]
    fn test_exclusive_kernels() {
        let d = desc(
            r#"
project: {name: shop, backend: construct}
kernel: {}
hybrid_kernel: {}
networks: [{name: main}]
"#,
        );
        let err = BackendProfile::for_backend(Backend::Construct)
            .check_legality(&d)
            .unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_iap_requires_https_and_domain() {
        let d = desc(
            r#"
project: {name: shop, backend: construct}
networks:
  - name: main
    containers: [{name: api}]
    load_balancer:
      https: true
      iap: {members: ["user:a@example.com"]}
"#,
        );
        let err = BackendProfile::for_backend(Backend::Construct)
            .check_legality(&d)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("requires HTTPS"));
        assert!(msg.contains("`domain`"));

        let d = desc(
            r#"
project: {name: shop, backend: construct}
networks:
  - name: main
    containers: [{name: api}]
    load_balancer:
      https: true
      domain: shop.example.com
      iap: {members: ["user:a@example.com"]}
"#,
        );
        assert!(BackendProfile::for_backend(Backend::Construct)
            .check_legality(&d)
            .is_ok());
    }

    #[test]
    fn test_manifest_requirements() {
        let d = desc("project: {name: shop, backend: manifest}");
        let err = BackendProfile::for_backend(Backend::Manifest)
            .check_legality(&d)
            .unwrap_err();
        assert!(err.to_string().contains("kubernetes.namespace"));

        let d = desc(
            r#"
project: {name: shop, backend: manifest}
kubernetes: {namespace: shop}
"#,
        );
        let err = BackendProfile::for_backend(Backend::Manifest)
            .check_legality(&d)
            .unwrap_err();
        assert!(err.to_string().contains("kubernetes.registry"));
    }

    #[test]
    fn test_manifest_rejects_native_kernel() {
        let d = desc(
            r#"
project: {name: shop, backend: manifest}
kernel: {}
kubernetes: {namespace: shop, registry: ghcr.io/acme}
"#,
        );
        let err = BackendProfile::for_backend(Backend::Manifest)
            .check_legality(&d)
            .unwrap_err();
        assert!(err.to_string().contains("kernel not supported by the manifest backend"));
    }

    #[test]
    fn test_manifest_kernel_needs_a_network() {
        let d = desc(
            r#"
project: {name: shop, backend: manifest}
kubernetes: {namespace: shop, registry: ghcr.io/acme}
hybrid_kernel: {}
"#,
        );
        let err = BackendProfile::for_backend(Backend::Manifest)
            .check_legality(&d)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("no network hosts it"));
        assert!(msg.contains("declare a network for the kernel"));
    }

    #[test]
    fn test_manifest_rejects_shared_workload_names() {
        let d = desc(
            r#"
project: {name: shop, backend: manifest}
kubernetes: {namespace: shop, registry: ghcr.io/acme}
networks:
  - name: main
    containers: [{name: api}]
    functions: [{name: api}]
"#,
        );
        let err = BackendProfile::for_backend(Backend::Manifest)
            .check_legality(&d)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(
            "container 'api' in network 'main' and function 'api' in network 'main' both become deployment 'api'"
        ));
        assert!(msg.contains("rename one of them"));

        let d = desc(
            r#"
project: {name: shop, backend: manifest}
kubernetes: {namespace: shop, registry: ghcr.io/acme}
hybrid_kernel: {name: web}
networks:
  - name: main
    uis: [{name: web}]
"#,
        );
        let err = BackendProfile::for_backend(Backend::Manifest)
            .check_legality(&d)
            .unwrap_err();
        assert!(err.to_string().contains("hybrid kernel 'web'"));
    }

    #[test]
    fn test_construct_allows_shared_workload_names() {
        let d = desc(
            r#"
project: {name: shop, backend: construct}
networks:
  - name: main
    containers: [{name: api}]
    functions: [{name: api}]
"#,
        );
        assert!(BackendProfile::for_backend(Backend::Construct)
            .check_legality(&d)
            .is_ok());
    }

    #[test]
    fn test_flat_rejects_uis() {
        let d = desc(
            r#"
project: {name: shop, backend: flat}
networks:
  - name: main
    uis: [{name: web}]
"#,
        );
        let err = BackendProfile::for_backend(Backend::Flat)
            .check_legality(&d)
            .unwrap_err();
        assert!(err.to_string().contains("uis not supported by the flat backend"));
    }
}
