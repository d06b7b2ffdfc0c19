//! Load balancers and ingresses.

use super::{NetworkContext, Resolver};
use crate::core::error::Result;
use crate::core::naming::sanitize_label;
use crate::core::resolved::*;
use crate::core::types::{LoadBalancerSpec, NetworkSpec};
use indexmap::IndexSet;

/// Route every path to the first container, else function, else UI.
fn default_route(network: &NetworkSpec) -> Option<RouteTarget> {
    let (backend, backend_kind) = network
        .containers
        .first()
        .map(|c| (&c.name, RouteBackendKind::Container))
        .or_else(|| network.functions.first().map(|f| (&f.name, RouteBackendKind::Function)))
        .or_else(|| network.uis.first().map(|u| (&u.name, RouteBackendKind::Ui)))?;
    Some(RouteTarget {
        path: "/*".to_string(),
        backend: backend.clone(),
        backend_kind,
    })
}

/// Every workload kind in the network carrying `backend` as its name.
fn classify(network: &NetworkSpec, backend: &str) -> Vec<RouteBackendKind> {
    let mut kinds = Vec::new();
    if network.ui(backend).is_some() {
        kinds.push(RouteBackendKind::Ui);
    }
    if network.container(backend).is_some() {
        kinds.push(RouteBackendKind::Container);
    }
    if network.function(backend).is_some() {
        kinds.push(RouteBackendKind::Function);
    }
    kinds
}

impl Resolver<'_> {
    fn route_targets(&self, network: &NetworkSpec, lb: &LoadBalancerSpec) -> Result<Vec<RouteTarget>> {
        if lb.routes.is_empty() {
            let route = default_route(network).ok_or_else(|| {
                self.invalid(
                    format!("load balancer in network '{}' has nothing to route to", network.name),
                    "declare a container, function or UI in the network, or add `routes`",
                )
            })?;
            return Ok(vec![route]);
        }

        lb.routes
            .iter()
            .map(|route| {
                let backend_kind = match classify(network, &route.backend).as_slice() {
                    [kind] => *kind,
                    [] => {
                        return Err(self.invalid(
                            format!(
                                "route '{}' points at unknown backend '{}'",
                                route.path, route.backend
                            ),
                            format!(
                                "route backends must name a container, function or UI in network '{}'",
                                network.name
                            ),
                        ))
                    }
                    _ => {
                        return Err(self.invalid(
                            format!(
                                "route '{}' backend '{}' is ambiguous in network '{}'",
                                route.path, route.backend, network.name
                            ),
                            "rename the container, function or UI so the route names exactly one",
                        ))
                    }
                };
                Ok(RouteTarget {
                    path: route.path.clone(),
                    backend: route.backend.clone(),
                    backend_kind,
                })
            })
            .collect()
    }

    pub(super) fn resolve_load_balancer(
        &mut self,
        ctx: &NetworkContext<'_>,
        lb: &LoadBalancerSpec,
    ) -> Result<()> {
        let routes = self.route_targets(ctx.spec, lb)?;
        let name = lb.name.clone().unwrap_or_else(|| ctx.name().to_string());

        if let Some(cluster) = self.cluster.clone() {
            let mut deps = IndexSet::from([cluster.namespace_id]);
            let mut rules = Vec::with_capacity(routes.len());
            for route in &routes {
                deps.insert(NodeKind::Deployment.node_id(&route.backend));
                deps.insert(NodeKind::Service.node_id(&route.backend));
                rules.push(IngressRule {
                    path: route.path.clone(),
                    service: sanitize_label(&route.backend),
                    port: ServiceConfig::default().port,
                });
            }
            let config = IngressConfig {
                ingress_name: sanitize_label(&name),
                namespace: cluster.namespace,
                host: lb.domain.clone(),
                tls: lb.https && lb.domain.is_some(),
                class: cluster.ingress_class,
                rules,
            };
            self.add(
                NodeKind::Ingress,
                &name,
                ResourceConfig::Ingress(config),
                deps,
                Some(ctx.name()),
            )?;
            return Ok(());
        }

        // construct: routed backends only
        let mut deps: IndexSet<String> = if self.profile.pipeline {
            IndexSet::new()
        } else {
            ctx.network_id.iter().cloned().collect()
        };
        for route in &routes {
            deps.insert(route.backend_kind.node_kind().node_id(&route.backend));
        }

        let iap_members = lb
            .iap
            .as_ref()
            .filter(|iap| iap.enabled)
            .map(|iap| iap.members.clone());
        let config = LoadBalancerConfig {
            lb_name: self.name(&name),
            region: self.region(),
            https: lb.https,
            domain: lb.domain.clone(),
            routes,
            iap_members,
        };
        self.add(
            NodeKind::LoadBalancer,
            &name,
            ResourceConfig::LoadBalancer(config),
            deps,
            Some(ctx.name()),
        )?;
        Ok(())
    }
}
