//! Kubernetes YAML generators for manifest projects.
//!
//! Cluster-native kinds are emitted as core objects; cloud data services
//! are emitted as Config Connector resources so one `kubectl apply`
//! provisions the whole graph.

use super::render::mismatch;
use super::{GenerateError, GeneratedArtifact, GeneratorPlugin, RegistryError, ResourceDefinition};
use crate::core::resolved::*;
use serde_json::{json, Value};

type Generated = Result<GeneratedArtifact, GenerateError>;

/// Label every generated object carries.
const MANAGED_BY: &str = "stackgraph";

fn to_yaml(r: &ResolvedResource, doc: &Value) -> Generated {
    let code = serde_yaml_ng::to_string(doc).map_err(|e| GenerateError::Render {
        id: r.id.clone(),
        message: e.to_string(),
    })?;
    Ok(GeneratedArtifact {
        imports: vec![],
        code: code.trim_end().to_string(),
        outputs: vec![],
    })
}

fn metadata(name: &str, namespace: Option<&str>) -> Value {
    let mut meta = json!({
        "name": name,
        "labels": {"app.kubernetes.io/managed-by": MANAGED_BY},
    });
    if let Some(ns) = namespace {
        meta["namespace"] = json!(ns);
    }
    meta
}

fn namespace(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Namespace(ref c) = r.config else {
        return Err(mismatch(r, "namespace"));
    };
    to_yaml(
        r,
        &json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": metadata(&c.namespace, None),
        }),
    )
}

fn config_map(r: &ResolvedResource) -> Generated {
    let ResourceConfig::ConfigMap(ref c) = r.config else {
        return Err(mismatch(r, "config_map"));
    };
    to_yaml(
        r,
        &json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": metadata(&c.map_name, Some(&c.namespace)),
            "data": c.data,
        }),
    )
}

fn service_account(r: &ResolvedResource) -> Generated {
    let ResourceConfig::ServiceAccount(ref c) = r.config else {
        return Err(mismatch(r, "service_account"));
    };
    let mut meta = metadata(&c.account_id, c.namespace.as_deref());
    meta["annotations"] = json!({"stackgraph.io/display-name": c.display_name});
    to_yaml(
        r,
        &json!({
            "apiVersion": "v1",
            "kind": "ServiceAccount",
            "metadata": meta,
        }),
    )
}

fn secret(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Secret(ref c) = r.config else {
        return Err(mismatch(r, "secret"));
    };
    let mut meta = metadata(&c.secret_id, c.namespace.as_deref());
    if let Some(ref description) = c.description {
        meta["annotations"] = json!({"stackgraph.io/description": description});
    }
    // payload is filled in out of band
    to_yaml(
        r,
        &json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": meta,
            "type": "Opaque",
            "stringData": {"value": ""},
        }),
    )
}

fn storage_bucket(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Bucket(ref c) = r.config else {
        return Err(mismatch(r, "bucket"));
    };
    let mut spec = json!({
        "location": c.location,
        "storageClass": c.storage_class,
        "uniformBucketLevelAccess": true,
        "versioning": {"enabled": c.versioning},
    });
    if !c.cors_origins.is_empty() {
        spec["cors"] = json!([{
            "origin": c.cors_origins,
            "method": ["GET", "HEAD", "PUT", "POST"],
            "maxAgeSeconds": 3600,
        }]);
    }
    to_yaml(
        r,
        &json!({
            "apiVersion": "storage.cnrm.cloud.google.com/v1beta1",
            "kind": "StorageBucket",
            "metadata": metadata(&c.bucket_name, c.namespace.as_deref()),
            "spec": spec,
        }),
    )
}

fn pubsub_topic(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Topic(ref c) = r.config else {
        return Err(mismatch(r, "topic"));
    };
    let mut doc = json!({
        "apiVersion": "pubsub.cnrm.cloud.google.com/v1beta1",
        "kind": "PubSubTopic",
        "metadata": metadata(&c.topic_name, c.namespace.as_deref()),
    });
    if let Some(ref retention) = c.message_retention {
        doc["spec"] = json!({"messageRetentionDuration": retention});
    }
    to_yaml(r, &doc)
}

fn tasks_queue(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Queue(ref c) = r.config else {
        return Err(mismatch(r, "queue"));
    };
    to_yaml(
        r,
        &json!({
            "apiVersion": "cloudtasks.cnrm.cloud.google.com/v1beta1",
            "kind": "CloudTasksQueue",
            "metadata": metadata(&c.queue_name, c.namespace.as_deref()),
            "spec": {
                "location": c.location,
                "rateLimits": {"maxDispatchesPerSecond": c.max_dispatches_per_second},
                "retryConfig": {"maxAttempts": c.max_attempts},
            },
        }),
    )
}

fn sql_instance(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Database(ref c) = r.config else {
        return Err(mismatch(r, "database"));
    };
    to_yaml(
        r,
        &json!({
            "apiVersion": "sql.cnrm.cloud.google.com/v1beta1",
            "kind": "SQLInstance",
            "metadata": metadata(&c.instance_name, c.namespace.as_deref()),
            "spec": {
                "region": c.region,
                "databaseVersion": c.engine,
                "settings": {"tier": c.tier, "diskSize": c.disk_size_gb},
            },
        }),
    )
}

fn redis_instance(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Cache(ref c) = r.config else {
        return Err(mismatch(r, "cache"));
    };
    to_yaml(
        r,
        &json!({
            "apiVersion": "redis.cnrm.cloud.google.com/v1beta1",
            "kind": "RedisInstance",
            "metadata": metadata(&c.instance_name, c.namespace.as_deref()),
            "spec": {
                "region": c.region,
                "tier": c.tier,
                "memorySizeGb": c.memory_size_gb,
            },
        }),
    )
}

/// One firewall port spec (`"443"` or `"8000-8100"`) as a policy port.
fn policy_port(protocol: &str, port: &str) -> Value {
    let protocol = protocol.to_uppercase();
    match port.split_once('-') {
        Some((start, end)) => match (start.parse::<u16>(), end.parse::<u16>()) {
            (Ok(start), Ok(end)) => json!({"protocol": protocol, "port": start, "endPort": end}),
            _ => json!({"protocol": protocol, "port": port}),
        },
        None => match port.parse::<u16>() {
            Ok(n) => json!({"protocol": protocol, "port": n}),
            Err(_) => json!({"protocol": protocol, "port": port}),
        },
    }
}

fn network_policy(r: &ResolvedResource) -> Generated {
    let ResourceConfig::NetworkPolicy(ref c) = r.config else {
        return Err(mismatch(r, "network_policy"));
    };
    let from: Vec<Value> = c
        .source_ranges
        .iter()
        .map(|cidr| json!({"ipBlock": {"cidr": cidr}}))
        .collect();
    let mut rule = json!({"from": from});
    if !c.ports.is_empty() {
        let ports: Vec<Value> = c.ports.iter().map(|p| policy_port(&c.protocol, p)).collect();
        rule["ports"] = json!(ports);
    }
    to_yaml(
        r,
        &json!({
            "apiVersion": "networking.k8s.io/v1",
            "kind": "NetworkPolicy",
            "metadata": metadata(&c.policy_name, Some(&c.namespace)),
            "spec": {
                "podSelector": {},
                "policyTypes": ["Ingress"],
                "ingress": [rule],
            },
        }),
    )
}

/// Container env entry for one resolved value.
fn env_var(name: &str, value: &EnvValue) -> Value {
    match value {
        EnvValue::SecretKeyRef { name: secret, key } => json!({
            "name": name,
            "valueFrom": {"secretKeyRef": {"name": secret, "key": key}},
        }),
        EnvValue::Literal(v) | EnvValue::Interpolation(v) | EnvValue::Expression(v) => {
            json!({"name": name, "value": v})
        }
    }
}

fn deployment(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Deployment(ref c) = r.config else {
        return Err(mismatch(r, "deployment"));
    };
    let mut container = json!({
        "name": c.deployment_name,
        "image": c.image,
        "ports": [{"containerPort": c.port}],
    });
    if !c.env.is_empty() {
        let env: Vec<Value> = c.env.iter().map(|(k, v)| env_var(k, v)).collect();
        container["env"] = json!(env);
    }
    if !c.config_map.is_empty() {
        container["envFrom"] = json!([{"configMapRef": {"name": c.config_map}}]);
    }
    let mut limits = serde_json::Map::new();
    if let Some(ref cpu) = c.cpu {
        limits.insert("cpu".to_string(), json!(cpu));
    }
    if let Some(ref memory) = c.memory {
        limits.insert("memory".to_string(), json!(memory));
    }
    if !limits.is_empty() {
        container["resources"] = json!({"limits": limits});
    }

    let mut meta = metadata(&c.deployment_name, Some(&c.namespace));
    meta["labels"]["app"] = json!(c.deployment_name);
    to_yaml(
        r,
        &json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": meta,
            "spec": {
                "replicas": c.replicas,
                "selector": {"matchLabels": {"app": c.deployment_name}},
                "template": {
                    "metadata": {"labels": {"app": c.deployment_name}},
                    "spec": {"containers": [container]},
                },
            },
        }),
    )
}

fn service(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Service(ref c) = r.config else {
        return Err(mismatch(r, "service"));
    };
    to_yaml(
        r,
        &json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": metadata(&c.service_name, Some(&c.namespace)),
            "spec": {
                "selector": {"app": c.selector},
                "ports": [{"port": c.port, "targetPort": c.target_port}],
            },
        }),
    )
}

/// Load balancer globs (`/api/*`) become prefix paths (`/api`).
fn prefix_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('*').trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn ingress(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Ingress(ref c) = r.config else {
        return Err(mismatch(r, "ingress"));
    };
    let paths: Vec<Value> = c
        .rules
        .iter()
        .map(|rule| {
            json!({
                "path": prefix_path(&rule.path),
                "pathType": "Prefix",
                "backend": {"service": {"name": rule.service, "port": {"number": rule.port}}},
            })
        })
        .collect();
    let mut http_rule = json!({"http": {"paths": paths}});
    if let Some(ref host) = c.host {
        http_rule["host"] = json!(host);
    }

    let mut spec = json!({});
    if let Some(ref class) = c.class {
        spec["ingressClassName"] = json!(class);
    }
    if let (true, Some(host)) = (c.tls, c.host.as_ref()) {
        spec["tls"] = json!([{
            "hosts": [host],
            "secretName": format!("{}-tls", c.ingress_name),
        }]);
    }
    spec["rules"] = json!([http_rule]);

    to_yaml(
        r,
        &json!({
            "apiVersion": "networking.k8s.io/v1",
            "kind": "Ingress",
            "metadata": metadata(&c.ingress_name, Some(&c.namespace)),
            "spec": spec,
        }),
    )
}

/// Every manifest generator.
pub fn plugins() -> Result<Vec<GeneratorPlugin>, RegistryError> {
    Ok(vec![
        GeneratorPlugin::Manifest(ResourceDefinition::of::<NamespaceConfig>(
            "k8s:namespace",
            namespace,
        )?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<ConfigMapConfig>(
            "k8s:config_map",
            config_map,
        )?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<ServiceAccountConfig>(
            "k8s:service_account",
            service_account,
        )?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<SecretConfig>("k8s:secret", secret)?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<BucketConfig>(
            "k8s:storage_bucket",
            storage_bucket,
        )?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<TopicConfig>(
            "k8s:pubsub_topic",
            pubsub_topic,
        )?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<QueueConfig>(
            "k8s:tasks_queue",
            tasks_queue,
        )?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<DatabaseConfig>(
            "k8s:sql_instance",
            sql_instance,
        )?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<CacheConfig>(
            "k8s:redis_instance",
            redis_instance,
        )?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<NetworkPolicyConfig>(
            "k8s:network_policy",
            network_policy,
        )?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<DeploymentConfig>(
            "k8s:deployment",
            deployment,
        )?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<ServiceConfig>(
            "k8s:service",
            service,
        )?),
        GeneratorPlugin::Manifest(ResourceDefinition::of::<IngressConfig>(
            "k8s:ingress",
            ingress,
        )?),
    ])
}
