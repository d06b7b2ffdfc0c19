//! Program generation — dispatch ordered nodes to the generator registry.
//!
//! Each node is generated independently. A node whose type has no generator
//! or whose generator fails becomes a warning; the rest of the program is
//! still produced.

use super::resolved::ResolvedConfig;
use super::types::Backend;
use crate::resources::Registry;
use serde::Serialize;
use tracing::{debug, warn};

/// A node that produced no code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationWarning {
    pub resource_id: String,
    pub message: String,
}

/// Code for one node, in provisioning order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub resource_id: String,
    pub resource_type: String,
    pub code: String,
}

/// Everything produced for one resolved config.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub project: String,
    pub backend: Backend,
    pub cloud_project_id: String,
    pub region: String,
    /// Deduplicated, first-seen order
    pub imports: Vec<String>,
    pub blocks: Vec<CodeBlock>,
    pub outputs: Vec<String>,
    pub warnings: Vec<GenerationWarning>,
}

/// Run every node through `registry` in provisioning order.
pub fn generate_all(config: &ResolvedConfig, registry: &Registry) -> GenerationReport {
    let mut report = GenerationReport {
        project: config.project.name.clone(),
        backend: config.project.backend,
        cloud_project_id: config.project.cloud_project_id.clone(),
        region: config.project.region.clone(),
        imports: Vec::new(),
        blocks: Vec::new(),
        outputs: Vec::new(),
        warnings: Vec::new(),
    };

    for resource in config.ordered() {
        match registry.generate(resource) {
            Ok(artifact) => {
                debug!(id = %resource.id, outputs = artifact.outputs.len(), "generated");
                for import in artifact.imports {
                    if !report.imports.contains(&import) {
                        report.imports.push(import);
                    }
                }
                report.outputs.extend(artifact.outputs);
                report.blocks.push(CodeBlock {
                    resource_id: resource.id.clone(),
                    resource_type: resource.resource_type.clone(),
                    code: artifact.code,
                });
            }
            Err(e) => {
                warn!(id = %resource.id, error = %e, "skipping node");
                report.warnings.push(GenerationWarning {
                    resource_id: resource.id.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    report
}

/// `my-shop` → `MyShopStack`
fn stack_class(project: &str) -> String {
    let mut class: String = project
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(super::naming::capitalize)
        .collect();
    if !class.starts_with(|c: char| c.is_ascii_alphabetic()) {
        class.insert(0, 'P');
    }
    class.push_str("Stack");
    class
}

fn indent(code: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    code.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl GenerationReport {
    /// Assemble the blocks into one program for the backend.
    pub fn render(&self) -> String {
        let bodies: Vec<&str> = self.blocks.iter().map(|b| b.code.as_str()).collect();
        match self.backend {
            Backend::Manifest => {
                let mut out = bodies.join("\n---\n");
                out.push('\n');
                out
            }
            Backend::Flat => {
                let mut out = self.imports.join("\n");
                out.push_str("\n\n");
                out.push_str(&bodies.join("\n\n"));
                out.push('\n');
                out
            }
            Backend::Construct => self.render_stack(&bodies),
        }
    }

    fn render_stack(&self, bodies: &[&str]) -> String {
        let class = stack_class(&self.project);
        let mut lines = vec![
            "import { Construct } from \"constructs\";".to_string(),
            "import { App, TerraformStack } from \"cdktf\";".to_string(),
            "import { GoogleProvider } from \"@cdktf/provider-google/lib/provider\";".to_string(),
        ];
        lines.extend(self.imports.iter().cloned());
        lines.push(String::new());
        lines.push(format!("class {} extends TerraformStack {{", class));
        lines.push("  constructor(scope: Construct, id: string) {".to_string());
        lines.push("    super(scope, id);".to_string());
        lines.push(String::new());
        lines.push(format!(
            "    new GoogleProvider(this, \"google\", {{ project: \"{}\", region: \"{}\" }});",
            self.cloud_project_id, self.region
        ));
        for body in bodies {
            lines.push(String::new());
            lines.push(indent(body, 4));
        }
        lines.push("  }".to_string());
        lines.push("}".to_string());
        lines.push(String::new());
        lines.push("const app = new App();".to_string());
        lines.push(format!("new {}(app, \"{}\");", class, self.project));
        lines.push("app.synth();".to_string());
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compile;
    use crate::core::parser::{parse_description, Format};

    fn report(yaml: &str) -> GenerationReport {
        let desc = parse_description(yaml, Format::Yaml).unwrap();
        let config = compile(&desc).unwrap();
        generate_all(&config, &Registry::builtin().unwrap())
    }

    #[test]
    fn test_flat_program() {
        let r = report(
            r#"
project: {name: shop, backend: flat}
secrets: [{name: api-key}]
networks:
  - name: main
    containers:
      - name: api
        env: {API_KEY: "@secret/api-key"}
"#,
        );
        assert!(r.warnings.is_empty());
        let ids: Vec<_> = r.blocks.iter().map(|b| b.resource_id.as_str()).collect();
        assert_eq!(ids, vec!["secret-api-key", "container-api"]);
        let program = r.render();
        assert!(program.starts_with("import * as pulumi from \"@pulumi/pulumi\";\n"));
        let declared = program.find("export const api_keySecretId").unwrap();
        let used = program.find("${api_keySecretId}").unwrap();
        assert!(declared < used);
    }

    #[test]
    fn test_construct_program_is_a_stack() {
        let r = report(
            r#"
project: {name: my-shop, backend: construct, cloud_project_id: acme-prod}
networks:
  - name: main
    containers: [{name: api}]
"#,
        );
        assert!(r.warnings.is_empty());
        let program = r.render();
        assert!(program.contains("class MyShopStack extends TerraformStack {"));
        assert!(program.contains("new GoogleProvider(this, \"google\", { project: \"acme-prod\", region: \"us-central1\" });"));
        assert!(program.contains("    const main_connector = new VpcAccessConnector(this, \"connector-main\""));
        assert!(program.ends_with("new MyShopStack(app, \"my-shop\");\napp.synth();\n"));
    }

    #[test]
    fn test_manifest_documents() {
        let r = report(
            r#"
project: {name: shop, backend: manifest}
kubernetes: {namespace: shop, registry: ghcr.io/acme}
networks:
  - name: main
    containers: [{name: api}]
"#,
        );
        let program = r.render();
        assert_eq!(program.matches("\n---\n").count(), r.blocks.len() - 1);
        assert!(program.starts_with("apiVersion: v1\nkind: Namespace"));
    }

    #[test]
    fn test_unknown_type_becomes_warning() {
        let desc = parse_description(
            "project: {name: shop, backend: flat}\nbuckets: [{name: files}]\nsecrets: [{name: key}]\n",
            Format::Yaml,
        )
        .unwrap();
        let mut config = compile(&desc).unwrap();
        config.resources[0].resource_type = "gcp:mystery".to_string();
        let r = generate_all(&config, &Registry::builtin().unwrap());
        assert_eq!(r.blocks.len(), 1);
        assert_eq!(r.warnings.len(), 1);
        assert_eq!(r.warnings[0].resource_id, "bucket-files");
        assert!(r.warnings[0].message.contains("gcp:mystery"));
    }

    #[test]
    fn test_stack_class_names() {
        assert_eq!(stack_class("shop"), "ShopStack");
        assert_eq!(stack_class("my-shop_v2"), "MyShopV2Stack");
        assert_eq!(stack_class("9lives"), "P9livesStack");
    }
}
