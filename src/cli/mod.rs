//! CLI subcommands — validate, plan, generate, schema, secrets.

use crate::core::codegen::{self, GenerationReport};
use crate::core::resolved::ResolvedConfig;
use crate::core::{compile, graph, hasher, parser, reference, resolver, types};
use crate::resources::Registry;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a project description without generating anything
    Validate {
        /// Path to the project description (.yaml, .toml or .json)
        #[arg(short, long, default_value = "stackgraph.yaml")]
        file: PathBuf,
    },

    /// Show the resolved resource graph in provisioning order
    Plan {
        /// Path to the project description
        #[arg(short, long, default_value = "stackgraph.yaml")]
        file: PathBuf,

        /// Print the resolved config as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate backend-native code or manifests
    Generate {
        /// Path to the project description
        #[arg(short, long, default_value = "stackgraph.yaml")]
        file: PathBuf,

        /// Write the program here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full generation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a JSON schema
    Schema {
        /// Resource type tag (e.g. gcp:storage_bucket); omit for the project description
        #[arg(long)]
        resource: Option<String>,
    },

    /// List secrets referenced by workloads and flag undeclared ones
    Secrets {
        /// Path to the project description
        #[arg(short, long, default_value = "stackgraph.yaml")]
        file: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Plan { file, json } => cmd_plan(&file, json),
        Commands::Generate { file, output, json } => cmd_generate(&file, output.as_deref(), json),
        Commands::Schema { resource } => cmd_schema(resource.as_deref()),
        Commands::Secrets { file } => cmd_secrets(&file),
    }
}

fn load(file: &Path) -> Result<types::ProjectDescription, String> {
    parser::parse_description_file(file).map_err(|e| e.to_string())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let desc = load(file)?;
    let errors = parser::validate_description(&desc);
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        return Err(format!("{} validation error(s)", errors.len()));
    }
    let config = compile(&desc).map_err(|e| e.to_string())?;
    println!(
        "OK: {} ({} backend, {} networks, {} resources)",
        desc.project.name,
        desc.project.backend,
        desc.networks.len(),
        config.resources.len()
    );
    Ok(())
}

fn cmd_plan(file: &Path, json: bool) -> Result<(), String> {
    let desc = load(file)?;
    let config = compile(&desc).map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&config).map_err(|e| e.to_string())?;
        println!("{}", out);
        return Ok(());
    }
    print!("{}", render_plan(&config)?);
    Ok(())
}

/// Human-readable plan: ordered nodes with hashes and edges both ways,
/// images to build, then the fingerprint.
fn render_plan(config: &ResolvedConfig) -> Result<String, String> {
    let hashes = hasher::resource_hashes(config).map_err(|e| e.to_string())?;
    let mut lines = vec![
        format!(
            "Planning: {} ({} backend, {} resources)",
            config.project.name,
            config.project.backend,
            config.resources.len()
        ),
        String::new(),
    ];
    for resource in config.ordered() {
        let hash = hashes.get(&resource.id).map(String::as_str).unwrap_or("");
        lines.push(format!(
            "  + {} ({})  {}",
            resource.id,
            resource.resource_type,
            short_hash(hash)
        ));
        if !resource.depends_on.is_empty() {
            lines.push(format!("      after: {}", resource.depends_on.join(", ")));
        }
        let dependents: Vec<&str> = graph::dependents(&config.resources, &resource.id)
            .into_iter()
            .map(|r| r.id.as_str())
            .collect();
        if !dependents.is_empty() {
            lines.push(format!("      required by: {}", dependents.join(", ")));
        }
    }

    let images = config.images();
    if !images.is_empty() {
        lines.push(String::new());
        lines.push("Images:".to_string());
        for plan in &images {
            lines.push(format!("  {}  {}", plan.resource_id, plan.image));
        }
    }

    let fingerprint = config.fingerprint().map_err(|e| e.to_string())?;
    lines.push(String::new());
    lines.push(format!("Fingerprint: {}", fingerprint));
    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// `blake3:0123456789ab…` → `0123456789ab`
fn short_hash(hash: &str) -> &str {
    let digest = hash.strip_prefix("blake3:").unwrap_or(hash);
    digest.get(..12).unwrap_or(digest)
}

fn cmd_generate(file: &Path, output: Option<&Path>, json: bool) -> Result<(), String> {
    let desc = load(file)?;
    let config = compile(&desc).map_err(|e| e.to_string())?;
    let registry = Registry::builtin().map_err(|e| e.to_string())?;
    let report = codegen::generate_all(&config, &registry);
    print_warnings(&report);

    let text = if json {
        serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?
    } else {
        report.render()
    };
    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
            info!(path = %path.display(), blocks = report.blocks.len(), "wrote program");
            println!(
                "Generated {} resource(s) into {}",
                report.blocks.len(),
                path.display()
            );
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn print_warnings(report: &GenerationReport) {
    for w in &report.warnings {
        eprintln!("  WARNING: {}: {}", w.resource_id, w.message);
    }
}

fn cmd_schema(resource: Option<&str>) -> Result<(), String> {
    let schema = match resource {
        None => serde_json::to_value(schemars::schema_for!(types::ProjectDescription))
            .map_err(|e| e.to_string())?,
        Some(tag) => {
            let registry = Registry::builtin().map_err(|e| e.to_string())?;
            let definition = registry.get(tag).ok_or_else(|| {
                let known: Vec<&str> = registry.types().collect();
                format!("unknown resource type '{}' (known: {})", tag, known.join(", "))
            })?;
            serde_json::json!({
                "type": definition.id,
                "schema": definition.schema,
                "defaults": definition.default_config,
            })
        }
    };
    let out = serde_json::to_string_pretty(&schema).map_err(|e| e.to_string())?;
    println!("{}", out);
    Ok(())
}

fn cmd_secrets(file: &Path) -> Result<(), String> {
    let desc = load(file)?;
    let referenced = reference::referenced_secrets(&desc);
    let missing = reference::missing_secrets(&desc);

    let profile = resolver::BackendProfile::for_backend(desc.project.backend);
    println!(
        "Secrets: {} ({} referenced, {} backend)",
        desc.project.name,
        referenced.len(),
        profile.backend
    );
    for name in &referenced {
        let marker = if missing.contains(name) { "!" } else { " " };
        println!("  {} {}", marker, name);
    }
    if !missing.is_empty() {
        return Err(format!(
            "{} referenced secret(s) not declared: {}",
            missing.len(),
            missing.join(", ")
        ));
    }
    Ok(())
}
