//! Containers, functions, UIs and kernels.
//!
//! Cloud backends produce one node per workload; manifests produce a
//! deployment + service pair.

use super::profile::WorkloadShape;
use super::{NetworkContext, Resolver};
use crate::core::error::Result;
use crate::core::naming::sanitize_label;
use crate::core::reference::{self, ReferenceType};
use crate::core::resolved::*;
use crate::core::types::*;
use indexmap::IndexSet;

/// What a deployment + service pair needs from its workload.
struct PodSpec {
    image: String,
    port: u16,
    env: EnvMap,
    cpu: Option<String>,
    memory: Option<String>,
}

impl Resolver<'_> {
    /// Network base ids, reference ids, then explicit `depends_on`.
    fn workload_deps(
        &self,
        ctx: &NetworkContext<'_>,
        references: IndexSet<String>,
        explicit: &[String],
    ) -> IndexSet<String> {
        let mut deps = ctx.base.clone();
        deps.extend(references);
        deps.extend(self.explicit_deps(explicit));
        deps
    }

    fn add_pod(
        &mut self,
        ctx: &NetworkContext<'_>,
        name: &str,
        pod: PodSpec,
        depends_on: IndexSet<String>,
    ) -> Result<()> {
        let cluster = self.cluster()?.clone();
        let label = sanitize_label(name);
        let config = DeploymentConfig {
            deployment_name: label.clone(),
            namespace: cluster.namespace.clone(),
            image: pod.image,
            port: pod.port,
            replicas: cluster.replicas,
            env: pod.env,
            config_map: cluster.config_map.clone(),
            cpu: pod.cpu,
            memory: pod.memory,
        };
        let deployment_id = self.add(
            NodeKind::Deployment,
            name,
            ResourceConfig::Deployment(config),
            depends_on,
            Some(ctx.name()),
        )?;

        let config = ServiceConfig {
            service_name: label.clone(),
            namespace: cluster.namespace,
            selector: label,
            target_port: pod.port,
            ..Default::default()
        };
        self.add(
            NodeKind::Service,
            name,
            ResourceConfig::Service(config),
            IndexSet::from([cluster.namespace_id, deployment_id]),
            Some(ctx.name()),
        )?;
        Ok(())
    }

    pub(super) fn resolve_container(
        &mut self,
        ctx: &NetworkContext<'_>,
        spec: &ContainerSpec,
    ) -> Result<()> {
        let (env, references) = self.resolve_env(&spec.env, &spec.secrets)?;
        let deps = self.workload_deps(ctx, references, &spec.depends_on);
        let image = self.image_for(ctx, spec.image.as_deref(), &spec.name);

        if self.profile.workload_shape == WorkloadShape::DeploymentService {
            let pod = PodSpec {
                image,
                port: spec.port,
                env,
                cpu: Some(spec.cpu.clone()),
                memory: Some(spec.memory.clone()),
            };
            return self.add_pod(ctx, &spec.name, pod, deps);
        }

        let config = ContainerConfig {
            service_name: self.name(&spec.name),
            image,
            region: self.region(),
            port: spec.port,
            cpu: spec.cpu.clone(),
            memory: spec.memory.clone(),
            min_instances: spec.min_instances,
            max_instances: spec.max_instances,
            env,
            allow_unauthenticated: spec.allow_unauthenticated,
            connector: ctx.connector.clone(),
        };
        self.add(
            NodeKind::Container,
            &spec.name,
            ResourceConfig::Container(config),
            deps,
            Some(ctx.name()),
        )?;
        Ok(())
    }

    pub(super) fn resolve_function(
        &mut self,
        ctx: &NetworkContext<'_>,
        spec: &FunctionSpec,
    ) -> Result<()> {
        let (env, mut references) = self.resolve_env(&spec.env, &spec.secrets)?;

        let trigger_topic = match spec.trigger_topic.as_deref() {
            None => None,
            Some(value) => match reference::parse(value) {
                Some(r) if r.ref_type == ReferenceType::Topic => {
                    references.insert(self.reference_node(&r));
                    Some(self.render_reference(&r)?)
                }
                Some(r) => {
                    return Err(self.invalid(
                        format!(
                            "function '{}' trigger_topic must reference a topic, got {}",
                            spec.name, r
                        ),
                        "use `@topic/<name>` or a plain topic name",
                    ))
                }
                None => Some(EnvValue::Literal(value.to_string())),
            },
        };
        let deps = self.workload_deps(ctx, references, &spec.depends_on);

        if self.profile.workload_shape == WorkloadShape::DeploymentService {
            let pod = PodSpec {
                image: self.image_for(ctx, None, &spec.name),
                port: 8080,
                env,
                cpu: None,
                memory: Some(spec.memory.clone()),
            };
            return self.add_pod(ctx, &spec.name, pod, deps);
        }

        let config = FunctionConfig {
            function_name: self.name(&spec.name),
            region: self.region(),
            runtime: spec.runtime.clone(),
            entry_point: spec.entry_point.clone(),
            source: spec
                .source
                .clone()
                .unwrap_or_else(|| format!("functions/{}", spec.name)),
            memory: spec.memory.clone(),
            timeout_seconds: spec.timeout_seconds,
            trigger_topic,
            env,
            allow_unauthenticated: spec.allow_unauthenticated,
            connector: ctx.connector.clone(),
        };
        self.add(
            NodeKind::Function,
            &spec.name,
            ResourceConfig::Function(config),
            deps,
            Some(ctx.name()),
        )?;
        Ok(())
    }

    pub(super) fn resolve_ui(&mut self, ctx: &NetworkContext<'_>, spec: &UiSpec) -> Result<()> {
        let (env, references) = self.resolve_env(&spec.env, &spec.secrets)?;
        let deps = self.workload_deps(ctx, references, &spec.depends_on);
        let image = self.image_for(ctx, spec.image.as_deref(), &spec.name);

        if self.profile.workload_shape == WorkloadShape::DeploymentService {
            let pod = PodSpec {
                image,
                port: spec.port,
                env,
                cpu: None,
                memory: None,
            };
            return self.add_pod(ctx, &spec.name, pod, deps);
        }

        let config = UiConfig {
            service_name: self.name(&spec.name),
            image,
            region: self.region(),
            port: spec.port,
            source: spec.source.clone(),
            env,
            connector: ctx.connector.clone(),
        };
        self.add(
            NodeKind::Ui,
            &spec.name,
            ResourceConfig::Ui(config),
            deps,
            Some(ctx.name()),
        )?;
        Ok(())
    }

    /// The kernel of whichever variant is declared. In the construct
    /// pipeline it becomes infra for the rest of its network.
    pub(super) fn resolve_kernel(&mut self, ctx: &mut NetworkContext<'_>) -> Result<()> {
        let desc = self.desc;
        let (spec, variant, kind) = match (&desc.kernel, &desc.hybrid_kernel) {
            (Some(k), _) => (k, KernelVariant::Native, NodeKind::Kernel),
            (None, Some(k)) => (k, KernelVariant::Hybrid, NodeKind::HybridKernel),
            (None, None) => return Ok(()),
        };

        let (env, references) = self.resolve_env(&spec.env, &spec.secrets)?;
        let deps = self.workload_deps(ctx, references, &[]);
        let image = self.image_for(ctx, spec.image.as_deref(), &spec.name);

        if self.profile.workload_shape == WorkloadShape::DeploymentService {
            let pod = PodSpec {
                image,
                port: spec.port,
                env,
                cpu: None,
                memory: None,
            };
            return self.add_pod(ctx, &spec.name, pod, deps);
        }

        let config = KernelConfig {
            kernel_name: self.name(&spec.name),
            variant,
            image,
            region: self.region(),
            machine_type: spec.machine_type.clone(),
            port: spec.port,
            env,
            connector: ctx.connector.clone(),
        };
        let id = self.add(
            kind,
            &spec.name,
            ResourceConfig::Kernel(config),
            deps,
            Some(ctx.name()),
        )?;
        if self.profile.pipeline {
            ctx.base.insert(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{deps, ids, resolve_yaml};
    use crate::core::error::CompileError;
    use crate::core::resolved::{EnvValue, ResourceConfig};

    #[test]
    fn test_function_defaults_and_trigger() {
        let config = resolve_yaml(
            r#"
project: {name: shop, backend: flat}
topics: [{name: events}]
networks:
  - name: main
    functions:
      - name: on-event
        trigger_topic: "@topic/events"
"#,
        )
        .unwrap();
        let f = config.get("function-on-event").unwrap();
        assert_eq!(f.resource_type, "gcp:cloudfunctions_function");
        assert_eq!(deps(&config, "function-on-event"), vec!["topic-events"]);
        let ResourceConfig::Function(ref c) = f.config else {
            panic!("expected function config");
        };
        assert_eq!(c.source, "functions/on-event");
        assert_eq!(c.runtime, "nodejs20");
        assert_eq!(
            c.trigger_topic,
            Some(EnvValue::Interpolation("${eventsName}".to_string()))
        );
    }

    #[test]
    fn test_function_trigger_must_be_topic() {
        let err = resolve_yaml(
            r#"
project: {name: shop, backend: flat}
buckets: [{name: files}]
networks:
  - name: main
    functions:
      - name: hook
        trigger_topic: "@bucket/files"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Invalid { .. }));
        assert!(err.to_string().contains("@topic/<name>"));
    }

    #[test]
    fn test_construct_workloads_share_connector() {
        let config = resolve_yaml(
            r#"
project: {name: shop, backend: construct}
networks:
  - name: main
    containers: [{name: api, allow_unauthenticated: true}]
    uis: [{name: web, source: ./web}]
"#,
        )
        .unwrap();
        let ResourceConfig::Container(ref c) = config.get("container-api").unwrap().config else {
            panic!("expected container config");
        };
        assert_eq!(c.service_name, "shop-api");
        assert_eq!(c.connector.as_deref(), Some("main_connector"));
        assert!(c.allow_unauthenticated);
        let ui = config.get("ui-web").unwrap();
        assert_eq!(ui.resource_type, "gcp-cdktf:ui");
        assert_eq!(deps(&config, "ui-web"), vec!["connector-main"]);
    }

    #[test]
    fn test_manifest_pairs_for_every_workload() {
        let config = resolve_yaml(
            r#"
project: {name: shop, backend: manifest}
kubernetes: {namespace: shop, registry: ghcr.io/acme, replicas: 3}
hybrid_kernel: {}
networks:
  - name: main
    containers: [{name: api, port: 9000}]
    functions: [{name: hook}]
    uis: [{name: web}]
"#,
        )
        .unwrap();
        assert_eq!(
            ids(&config),
            vec![
                "namespace-shop",
                "config-shop",
                "deployment-kernel",
                "service-kernel",
                "deployment-api",
                "service-api",
                "deployment-hook",
                "service-hook",
                "deployment-web",
                "service-web"
            ]
        );
        let ResourceConfig::Deployment(ref d) = config.get("deployment-api").unwrap().config
        else {
            panic!("expected deployment config");
        };
        assert_eq!(d.replicas, 3);
        assert_eq!(d.port, 9000);
        let ResourceConfig::Service(ref s) = config.get("service-api").unwrap().config else {
            panic!("expected service config");
        };
        assert_eq!(s.port, 80);
        assert_eq!(s.target_port, 9000);
        assert_eq!(s.selector, "api");
    }

    #[test]
    fn test_images_plan() {
        let config = resolve_yaml(
            r#"
project: {name: shop, backend: construct}
networks:
  - name: main
    registry: {name: images}
    containers:
      - name: api
      - name: pinned
        image: nginx:1.27
"#,
        )
        .unwrap();
        let images: Vec<_> = config.images().into_iter().map(|p| p.image).collect();
        assert_eq!(
            images,
            vec![
                "us-central1-docker.pkg.dev/shop/shop-images/api:latest",
                "nginx:1.27"
            ]
        );
    }
}
