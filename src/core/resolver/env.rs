//! Reference rendering and reference-inferred edges.

use super::profile::{ReferenceStyle, WorkloadShape};
use super::Resolver;
use crate::core::error::Result;
use crate::core::naming::sanitize_label;
use crate::core::reference::{self, resolve_to_interpolation, Reference, ReferenceType};
use crate::core::resolved::{EnvMap, EnvValue, NodeKind};
use indexmap::{IndexMap, IndexSet};

/// Key every orchestrator secret stores its payload under.
const SECRET_KEY: &str = "value";

/// Field of a generated construct that carries the given output.
fn construct_field(ref_type: ReferenceType, output: &str) -> &'static str {
    match (ref_type, output) {
        (ReferenceType::Function, "url") => "serviceConfig.uri",
        (_, "url") => "uri",
        _ => "name",
    }
}

impl Resolver<'_> {
    /// Render one reference for the active backend.
    pub(super) fn render_reference(&self, r: &Reference) -> Result<EnvValue> {
        let output = r.output_name()?;
        let is_workload = matches!(r.ref_type, ReferenceType::Container | ReferenceType::Function);

        match self.profile.reference_style {
            ReferenceStyle::ConstructExpression if is_workload => {
                match self.identifiers.get(&(r.ref_type, r.name.clone())) {
                    Some(ident) => Ok(EnvValue::Expression(format!(
                        "{}.{}",
                        ident,
                        construct_field(r.ref_type, output)
                    ))),
                    // not declared here; the dangling edge is reported at sort time
                    None => Ok(EnvValue::Interpolation(resolve_to_interpolation(r)?)),
                }
            }
            ReferenceStyle::Cluster if r.ref_type == ReferenceType::Secret => {
                if output == "secretName" {
                    return Ok(EnvValue::Literal(sanitize_label(&r.name)));
                }
                Ok(EnvValue::SecretKeyRef {
                    name: sanitize_label(&r.name),
                    key: SECRET_KEY.to_string(),
                })
            }
            ReferenceStyle::Cluster if is_workload => {
                let service = sanitize_label(&r.name);
                if output == "url" {
                    let namespace = self.namespace().unwrap_or_else(|| "default".to_string());
                    Ok(EnvValue::Literal(format!(
                        "http://{}.{}.svc.cluster.local",
                        service, namespace
                    )))
                } else {
                    Ok(EnvValue::Literal(service))
                }
            }
            _ => Ok(EnvValue::Interpolation(resolve_to_interpolation(r)?)),
        }
    }

    /// Id of the node a reference points at.
    ///
    /// On manifests a workload is reachable through its deployment.
    pub(super) fn reference_node(&self, r: &Reference) -> String {
        match (self.profile.workload_shape, r.ref_type) {
            (
                WorkloadShape::DeploymentService,
                ReferenceType::Container | ReferenceType::Function,
            ) => NodeKind::Deployment.node_id(&r.name),
            _ => r.resource_id(),
        }
    }

    /// Explicit `depends_on` entries: node ids as given, references mapped
    /// to their node.
    pub(super) fn explicit_deps(&self, entries: &[String]) -> Vec<String> {
        entries
            .iter()
            .map(|entry| match reference::parse(entry) {
                Some(r) => self.reference_node(&r),
                None => entry.clone(),
            })
            .collect()
    }

    /// Resolve a workload's `env` and `secrets` maps into one env map and
    /// the ids its references point at.
    ///
    /// `secrets` entries come after `env`; a key present in both keeps the
    /// `env` position and takes the `secrets` value.
    pub(super) fn resolve_env(
        &self,
        env: &IndexMap<String, String>,
        secrets: &IndexMap<String, String>,
    ) -> Result<(EnvMap, IndexSet<String>)> {
        let mut merged = env.clone();
        for (key, value) in secrets {
            merged.insert(key.clone(), value.clone());
        }
        let resolved = reference::resolve_env_with(
            &merged,
            |r| self.render_reference(r),
            |v| EnvValue::Literal(v.to_string()),
        )?;
        let edges = resolved
            .references
            .iter()
            .map(|r| self.reference_node(r))
            .collect();
        Ok((resolved.values, edges))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::resolve_yaml;
    use crate::core::resolved::{EnvValue, ResourceConfig};

    fn container_env(yaml: &str, id: &str) -> crate::core::resolved::EnvMap {
        let config = resolve_yaml(yaml).unwrap();
        match config.get(id).unwrap().config {
            ResourceConfig::Container(ref c) => c.env.clone(),
            ResourceConfig::Deployment(ref d) => d.env.clone(),
            ref other => panic!("unexpected config {}", other.kind()),
        }
    }

    #[test]
    fn test_construct_workload_references_are_expressions() {
        let env = container_env(
            r#"
project: {name: shop, backend: construct}
secrets: [{name: api-key}]
networks:
  - name: main
    containers:
      - name: web
        env:
          API: "@container/api"
          API_NAME: "@container/api.name"
          HOOK: "@function/hook.url"
          KEY: "@secret/api-key"
          MODE: prod
      - name: api
    functions: [{name: hook}]
"#,
            "container-web",
        );
        assert_eq!(env["API"], EnvValue::Expression("api_service.uri".to_string()));
        assert_eq!(env["API_NAME"], EnvValue::Expression("api_service.name".to_string()));
        assert_eq!(
            env["HOOK"],
            EnvValue::Expression("hook_function.serviceConfig.uri".to_string())
        );
        assert_eq!(
            env["KEY"],
            EnvValue::Interpolation("${api_keySecretId}".to_string())
        );
        assert_eq!(env["MODE"], EnvValue::Literal("prod".to_string()));
    }

    #[test]
    fn test_construct_undeclared_workload_falls_back() {
        let config = resolve_yaml(
            r#"
project: {name: shop, backend: construct}
networks:
  - name: main
    containers:
      - name: web
        env: {API: "@container/ghost"}
"#,
        )
        .unwrap();
        let web = config.get("container-web").unwrap();
        let ResourceConfig::Container(ref c) = web.config else {
            panic!("expected container config");
        };
        assert_eq!(c.env["API"], EnvValue::Interpolation("${ghostUrl}".to_string()));
        assert!(web.depends_on.contains(&"container-ghost".to_string()));
    }

    #[test]
    fn test_manifest_references() {
        let yaml = r#"
project: {name: shop, backend: manifest}
kubernetes: {namespace: prod, registry: ghcr.io/acme}
secrets: [{name: api-key}]
buckets: [{name: files}]
networks:
  - name: main
    containers:
      - name: web
        env:
          API: "@container/api"
          FILES: "@bucket/files"
        secrets:
          KEY: "@secret/api-key"
          KEY_NAME: "@secret/api-key.name"
      - name: api
"#;
        let env = container_env(yaml, "deployment-web");
        assert_eq!(
            env["API"],
            EnvValue::Literal("http://api.prod.svc.cluster.local".to_string())
        );
        assert_eq!(env["FILES"], EnvValue::Interpolation("${filesName}".to_string()));
        assert_eq!(
            env["KEY"],
            EnvValue::SecretKeyRef {
                name: "api-key".to_string(),
                key: "value".to_string()
            }
        );
        assert_eq!(env["KEY_NAME"], EnvValue::Literal("api-key".to_string()));

        let config = resolve_yaml(yaml).unwrap();
        let deps = &config.get("deployment-web").unwrap().depends_on;
        assert_eq!(
            deps,
            &[
                "namespace-prod",
                "config-shop",
                "deployment-api",
                "bucket-files",
                "secret-api-key"
            ]
        );
    }

    #[test]
    fn test_secrets_override_env_key() {
        let env = container_env(
            r#"
project: {name: shop, backend: flat}
secrets: [{name: key}]
networks:
  - name: main
    containers:
      - name: api
        env: {KEY: plain, OTHER: x}
        secrets: {KEY: "@secret/key"}
"#,
            "container-api",
        );
        let keys: Vec<_> = env.keys().cloned().collect();
        assert_eq!(keys, vec!["KEY", "OTHER"]);
        assert_eq!(env["KEY"], EnvValue::Interpolation("${keySecretId}".to_string()));
    }

    #[test]
    fn test_malformed_tokens_pass_through() {
        let env = container_env(
            r#"
project: {name: shop, backend: flat}
networks:
  - name: main
    containers:
      - name: api
        env: {ODD: "@not-valid", MAIL: "ops@example.com"}
"#,
            "container-api",
        );
        assert_eq!(env["ODD"], EnvValue::Literal("@not-valid".to_string()));
        assert_eq!(env["MAIL"], EnvValue::Literal("ops@example.com".to_string()));
    }
}
