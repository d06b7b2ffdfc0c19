//! End-to-end compile and generation tests across the three backends.

use stackgraph::core::codegen::generate_all;
use stackgraph::core::error::CompileError;
use stackgraph::core::parser::{parse_description, parse_description_file, Format};
use stackgraph::core::resolved::{EnvValue, ResolvedConfig, ResourceConfig};
use stackgraph::core::{compile, hasher};
use stackgraph::resources::{Registry, RegistryBuilder};

fn compile_yaml(yaml: &str) -> Result<ResolvedConfig, CompileError> {
    let desc = parse_description(yaml, Format::Yaml)?;
    compile(&desc)
}

const FLAT_SHOP: &str = r#"
project: {name: shop, backend: flat}
secrets: [{name: api-key}]
networks:
  - name: main
    containers:
      - name: api
        env: {API_KEY: "@secret/api-key"}
"#;

#[test]
fn test_flat_secret_before_container() {
    let config = compile_yaml(FLAT_SHOP).unwrap();
    assert_eq!(config.order, vec!["secret-api-key", "container-api"]);

    let report = generate_all(&config, &Registry::builtin().unwrap());
    assert!(report.warnings.is_empty());
    assert!(report.outputs.contains(&"api_keySecretId".to_string()));
    assert!(report.outputs.contains(&"apiUrl".to_string()));
    let program = report.render();
    assert!(program.contains("pulumi.interpolate`${api_keySecretId}`"));
}

#[test]
fn test_databases_are_flat_only() {
    let yaml = |backend: &str| {
        format!(
            "project: {{name: shop, backend: {}}}\nnetworks:\n  - name: main\n    databases: [{{name: orders}}]\n",
            backend
        )
    };
    let err = compile_yaml(&yaml("construct")).unwrap_err();
    assert!(matches!(err, CompileError::Unsupported { .. }));
    assert!(err.to_string().contains("use the flat backend"));

    let config = compile_yaml(&yaml("flat")).unwrap();
    let db = config.get("database-orders").unwrap();
    assert_eq!(db.resource_type, "gcp:sql_database_instance");
    assert_eq!(db.depends_on, vec!["network-main"]);
}

#[test]
fn test_compile_is_deterministic() {
    let first = compile_yaml(FLAT_SHOP).unwrap();
    let second = compile_yaml(FLAT_SHOP).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        hasher::fingerprint(&first).unwrap(),
        hasher::fingerprint(&second).unwrap()
    );

    let changed = compile_yaml(&FLAT_SHOP.replace("name: api\n", "name: api\n        port: 9090\n")).unwrap();
    assert_ne!(
        hasher::fingerprint(&first).unwrap(),
        hasher::fingerprint(&changed).unwrap()
    );
}

#[test]
fn test_construct_container_reference_is_expression() {
    let config = compile_yaml(
        r#"
project: {name: shop, backend: construct}
networks:
  - name: main
    containers:
      - name: web
        env: {API: "@container/api"}
      - name: api
"#,
    )
    .unwrap();
    let web = config.get("container-web").unwrap();
    let ResourceConfig::Container(ref c) = web.config else {
        panic!("expected container config");
    };
    assert_eq!(c.env["API"], EnvValue::Expression("api_service.uri".to_string()));

    let pos = |id: &str| config.order.iter().position(|o| o == id).unwrap();
    assert!(pos("container-api") < pos("container-web"));

    let program = generate_all(&config, &Registry::builtin().unwrap()).render();
    assert!(program.contains("value: api_service.uri"));
}

#[test]
fn test_manifest_deployment_dependencies() {
    let config = compile_yaml(
        r#"
project: {name: shop, backend: manifest}
kubernetes: {namespace: shop, registry: ghcr.io/acme}
networks:
  - name: main
    containers: [{name: api}]
"#,
    )
    .unwrap();
    let deployment = config.get("deployment-api").unwrap();
    assert_eq!(deployment.resource_type, "k8s:deployment");
    assert_eq!(deployment.depends_on, vec!["namespace-shop", "config-shop"]);
    assert_eq!(config.order[0], "namespace-shop");

    let report = generate_all(&config, &Registry::builtin().unwrap());
    assert!(report.warnings.is_empty());
    let manifests = report.render();
    assert!(manifests.contains("kind: Deployment"));
    assert!(manifests.contains("ghcr.io/acme/api:latest"));
}

#[test]
fn test_manifest_kernel_is_never_dropped() {
    let header = "project: {name: shop, backend: manifest}\nkubernetes: {namespace: shop, registry: ghcr.io/acme}\nhybrid_kernel: {}\n";
    let err = compile_yaml(header).unwrap_err();
    assert!(err.to_string().contains("declare a network for the kernel"));

    let config = compile_yaml(&format!("{}networks: [{{name: main}}]\n", header)).unwrap();
    assert!(config.order.contains(&"deployment-kernel".to_string()));
    assert!(config.order.contains(&"service-kernel".to_string()));
}

#[test]
fn test_manifest_shared_workload_name_has_hint() {
    let err = compile_yaml(
        r#"
project: {name: shop, backend: manifest}
kubernetes: {namespace: shop, registry: ghcr.io/acme}
networks:
  - name: main
    containers: [{name: api}]
    functions: [{name: api}]
"#,
    )
    .unwrap_err();
    assert!(!matches!(err, CompileError::DuplicateResource { .. }));
    let msg = err.to_string();
    assert!(msg.contains("both become deployment 'api'"));
    assert!(msg.contains("hint: rename one of them"));
}

#[test]
fn test_reference_cycle_is_rejected() {
    let err = compile_yaml(
        r#"
project: {name: shop, backend: flat}
networks:
  - name: main
    containers:
      - name: a
        env: {B: "@container/b"}
      - name: b
        env: {A: "@container/a"}
"#,
    )
    .unwrap_err();
    let CompileError::Cycle { nodes } = err else {
        panic!("expected cycle, got {err}");
    };
    assert_eq!(nodes, vec!["container-a", "container-b"]);
}

#[test]
fn test_dangling_dependency_is_rejected() {
    let err = compile_yaml(
        r#"
project: {name: shop, backend: flat}
networks:
  - name: main
    containers:
      - name: api
        depends_on: [bucket-ghost]
"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CompileError::DanglingDependency { ref node, ref missing }
            if node == "container-api" && missing == "bucket-ghost"
    ));
}

#[test]
fn test_unknown_property_names_accepted_set() {
    let err = compile_yaml(
        r#"
project: {name: shop, backend: flat}
secrets: [{name: key}]
networks:
  - name: main
    containers:
      - name: api
        env: {K: "@secret/key.colour"}
"#,
    )
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("colour"));
    assert!(msg.contains("secretId"));
}

#[test]
fn test_missing_generator_is_a_warning() {
    let config = compile_yaml(FLAT_SHOP).unwrap();
    let empty = RegistryBuilder::new().build();
    let report = generate_all(&config, &empty);
    assert!(report.blocks.is_empty());
    assert_eq!(report.warnings.len(), 2);
    assert_eq!(report.warnings[0].resource_id, "secret-api-key");
}

#[test]
fn test_parse_from_file() {
    let dir = tempfile::tempdir().unwrap();

    let yaml = dir.path().join("shop.yaml");
    std::fs::write(&yaml, FLAT_SHOP).unwrap();
    let desc = parse_description_file(&yaml).unwrap();
    assert_eq!(desc.project.name, "shop");

    let toml = dir.path().join("shop.toml");
    std::fs::write(
        &toml,
        "[project]\nname = \"shop\"\nbackend = \"flat\"\n\n[[buckets]]\nname = \"files\"\n",
    )
    .unwrap();
    let desc = parse_description_file(&toml).unwrap();
    let config = compile(&desc).unwrap();
    assert_eq!(config.order, vec!["bucket-files"]);
}
