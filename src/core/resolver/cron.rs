//! Scheduled jobs.
//!
//! A cron target resolves strictly: `@container/x`, `@function/x`,
//! `network/resource` or a bare resource name must match exactly one
//! declared container or function.

use super::Resolver;
use crate::core::error::{CompileError, Result};
use crate::core::reference::{self, Reference, ReferenceType};
use crate::core::resolved::*;
use crate::core::types::{CronSpec, NetworkSpec};
use indexmap::IndexSet;

/// Containers and functions named `name` in one network.
fn candidates(network: &NetworkSpec, name: &str) -> Vec<RouteBackendKind> {
    let mut found = Vec::new();
    if network.container(name).is_some() {
        found.push(RouteBackendKind::Container);
    }
    if network.function(name).is_some() {
        found.push(RouteBackendKind::Function);
    }
    found
}

impl Resolver<'_> {
    fn cron_error(&self, cron: &CronSpec, reason: impl Into<String>) -> CompileError {
        CompileError::CronTarget {
            cron: cron.name.clone(),
            target: cron.target.clone(),
            reason: reason.into(),
        }
    }

    /// Resolve a cron target to `(kind, name)`.
    fn cron_target(&self, cron: &CronSpec) -> Result<(RouteBackendKind, String)> {
        let target = cron.target.trim();

        if let Some(r) = reference::parse(target) {
            let kind = match r.ref_type {
                ReferenceType::Container => RouteBackendKind::Container,
                ReferenceType::Function => RouteBackendKind::Function,
                other => {
                    return Err(self.cron_error(
                        cron,
                        format!("@{} cannot be scheduled; target a container or function", other),
                    ))
                }
            };
            let declared = self
                .desc
                .networks
                .iter()
                .any(|n| candidates(n, &r.name).contains(&kind));
            if !declared {
                return Err(self.cron_error(cron, format!("no {} named '{}'", kind_label(kind), r.name)));
            }
            return Ok((kind, r.name));
        }

        let (networks, name): (Vec<&NetworkSpec>, &str) = match target.split_once('/') {
            Some((net, name)) => {
                let network = self
                    .desc
                    .network(net)
                    .ok_or_else(|| self.cron_error(cron, format!("unknown network '{}'", net)))?;
                (vec![network], name)
            }
            None => (self.desc.networks.iter().collect(), target),
        };

        let mut matches: Vec<RouteBackendKind> = Vec::new();
        for network in networks {
            matches.extend(candidates(network, name));
        }
        match matches.as_slice() {
            [kind] => Ok((*kind, name.to_string())),
            [] => Err(self.cron_error(
                cron,
                format!("no container or function named '{}'", name),
            )),
            _ => Err(self.cron_error(
                cron,
                format!(
                    "ambiguous; '{}' matches more than one resource, use @container/{} or @function/{}",
                    name, name, name
                ),
            )),
        }
    }

    pub(super) fn resolve_cron(&mut self, cron: &CronSpec) -> Result<()> {
        let (kind, target) = self.cron_target(cron)?;
        let target_ref = Reference {
            ref_type: match kind {
                RouteBackendKind::Function => ReferenceType::Function,
                _ => ReferenceType::Container,
            },
            name: target.clone(),
            property: None,
        };
        let target_url = self.render_reference(&target_ref)?;
        let target_id = kind.node_kind().node_id(&target);

        let config = CronConfig {
            job_name: self.name(&cron.name),
            region: self.region(),
            schedule: cron.schedule.clone(),
            time_zone: cron.time_zone.clone(),
            target_kind: kind,
            target,
            target_url,
            path: cron.path.clone(),
            method: cron.method.clone(),
            body: cron.body.clone(),
        };
        self.add(
            NodeKind::Cron,
            &cron.name,
            ResourceConfig::Cron(config),
            IndexSet::from([target_id]),
            None,
        )?;
        Ok(())
    }
}

fn kind_label(kind: RouteBackendKind) -> &'static str {
    match kind {
        RouteBackendKind::Container => "container",
        RouteBackendKind::Function => "function",
        RouteBackendKind::Ui => "ui",
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{deps, resolve_yaml};
    use crate::core::error::CompileError;
    use crate::core::resolved::{EnvValue, ResourceConfig, RouteBackendKind};

    const NETWORKS: &str = r#"
networks:
  - name: main
    containers: [{name: api}, {name: both}]
    functions: [{name: hook}, {name: both}]
  - name: jobs
    functions: [{name: nightly}]
"#;

    fn resolve_cron(target: &str) -> crate::core::error::Result<crate::core::resolved::ResolvedConfig> {
        resolve_yaml(&format!(
            "project: {{name: shop, backend: flat}}\ncrons:\n  - {{name: tick, schedule: \"0 * * * *\", target: \"{}\"}}\n{}",
            target, NETWORKS
        ))
    }

    #[test]
    fn test_reference_target() {
        let config = resolve_cron("@function/hook").unwrap();
        assert_eq!(deps(&config, "cron-tick"), vec!["function-hook"]);
        let cron = config.get("cron-tick").unwrap();
        assert_eq!(cron.resource_type, "gcp:cloud_scheduler_job");
        let ResourceConfig::Cron(ref c) = cron.config else {
            panic!("expected cron config");
        };
        assert_eq!(c.target_kind, RouteBackendKind::Function);
        assert_eq!(c.target_url, EnvValue::Interpolation("${hookUrl}".to_string()));
        assert_eq!(c.method, "POST");
    }

    #[test]
    fn test_network_qualified_target() {
        let config = resolve_cron("jobs/nightly").unwrap();
        assert_eq!(deps(&config, "cron-tick"), vec!["function-nightly"]);
    }

    #[test]
    fn test_bare_target() {
        let config = resolve_cron("api").unwrap();
        assert_eq!(deps(&config, "cron-tick"), vec!["container-api"]);
    }

    #[test]
    fn test_ambiguous_target_is_an_error() {
        let err = resolve_cron("both").unwrap_err();
        assert!(matches!(err, CompileError::CronTarget { .. }));
        assert!(err.to_string().contains("ambiguous"));

        // qualifying by type resolves it
        let config = resolve_cron("@container/both").unwrap();
        assert_eq!(deps(&config, "cron-tick"), vec!["container-both"]);
    }

    #[test]
    fn test_missing_target() {
        let err = resolve_cron("ghost").unwrap_err();
        assert!(err.to_string().contains("no container or function named 'ghost'"));

        let err = resolve_cron("@container/hook").unwrap_err();
        assert!(err.to_string().contains("no container named 'hook'"));

        let err = resolve_cron("nowhere/api").unwrap_err();
        assert!(err.to_string().contains("unknown network 'nowhere'"));
    }

    #[test]
    fn test_non_workload_reference_target() {
        let err = resolve_cron("@bucket/files").unwrap_err();
        assert!(err.to_string().contains("@bucket cannot be scheduled"));
    }

    #[test]
    fn test_crons_resolve_last() {
        let config = resolve_cron("api").unwrap();
        assert_eq!(config.resources.last().unwrap().id, "cron-tick");
    }
}
