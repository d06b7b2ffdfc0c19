//! Dependency graph and provisioning order.
//!
//! Kahn's algorithm over the resolved node set. Among ready nodes the one
//! declared first wins, so identical input always yields an identical order.

use super::error::{CompileError, Result};
use super::resolved::{ResolvedConfig, ResolvedResource};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Compute a topological order of `resources` by their `depends_on` edges.
///
/// Fails on a duplicate id, on an edge to an id that is not in the set, or
/// when a cycle leaves nodes unordered.
pub fn sort(resources: &[ResolvedResource]) -> Result<Vec<String>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(resources.len());
    for (i, r) in resources.iter().enumerate() {
        if index.insert(r.id.as_str(), i).is_some() {
            return Err(CompileError::DuplicateResource { id: r.id.clone() });
        }
    }

    let mut in_degree = vec![0usize; resources.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); resources.len()];

    for (i, r) in resources.iter().enumerate() {
        for dep in &r.depends_on {
            let Some(&d) = index.get(dep.as_str()) else {
                return Err(CompileError::DanglingDependency {
                    node: r.id.clone(),
                    missing: dep.clone(),
                });
            };
            dependents[d].push(i);
            in_degree[i] += 1;
        }
    }

    // Ready set keyed by declaration index
    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(i, _)| i)
        .collect();

    let mut order = Vec::with_capacity(resources.len());
    while let Some(current) = ready.pop_first() {
        order.push(resources[current].id.clone());
        for &next in &dependents[current] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if order.len() != resources.len() {
        let nodes: Vec<String> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &d)| d > 0)
            .map(|(i, _)| resources[i].id.clone())
            .collect();
        return Err(CompileError::Cycle { nodes });
    }

    debug!(nodes = order.len(), "computed provisioning order");
    Ok(order)
}

/// Fill `config.order`, consuming and returning the config.
pub fn order(mut config: ResolvedConfig) -> Result<ResolvedConfig> {
    config.order = sort(&config.resources)?;
    Ok(config)
}

/// Direct dependents of `id` (nodes whose `depends_on` lists it), in
/// declaration order.
pub fn dependents<'a>(resources: &'a [ResolvedResource], id: &str) -> Vec<&'a ResolvedResource> {
    resources
        .iter()
        .filter(|r| r.depends_on.iter().any(|d| d == id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolved::{ResourceConfig, TopicConfig};

    fn node(id: &str, deps: &[&str]) -> ResolvedResource {
        ResolvedResource {
            id: id.to_string(),
            resource_type: "gcp:pubsub_topic".to_string(),
            name: id.to_string(),
            config: ResourceConfig::Topic(TopicConfig::default()),
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
            network: None,
        }
    }

    #[test]
    fn test_sort_linear() {
        let nodes = vec![node("c", &["b"]), node("b", &["a"]), node("a", &[])];
        assert_eq!(sort(&nodes).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_ties_follow_declaration_order() {
        // not alphabetical: beta is declared first
        let nodes = vec![node("beta", &[]), node("alpha", &[])];
        assert_eq!(sort(&nodes).unwrap(), vec!["beta", "alpha"]);
    }

    #[test]
    fn test_sort_diamond() {
        let nodes = vec![
            node("top", &[]),
            node("right", &["top"]),
            node("left", &["top"]),
            node("bottom", &["left", "right"]),
        ];
        assert_eq!(sort(&nodes).unwrap(), vec!["top", "right", "left", "bottom"]);
    }

    #[test]
    fn test_sort_ready_node_declared_earlier_wins() {
        // first becomes ready after root yet still precedes second
        let nodes = vec![
            node("first", &["root"]),
            node("root", &[]),
            node("second", &[]),
        ];
        assert_eq!(sort(&nodes).unwrap(), vec!["root", "first", "second"]);
    }

    #[test]
    fn test_sort_cycle() {
        let nodes = vec![node("free", &[]), node("a", &["b"]), node("b", &["a"])];
        let err = sort(&nodes).unwrap_err();
        match err {
            CompileError::Cycle { ref nodes } => assert_eq!(nodes, &["a", "b"]),
            other => panic!("expected cycle, got {other}"),
        }
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_sort_self_cycle() {
        let nodes = vec![node("loop", &["loop"])];
        let err = sort(&nodes).unwrap_err();
        assert!(err.to_string().contains("loop"));
    }

    #[test]
    fn test_sort_dangling() {
        let nodes = vec![node("api", &["secret-missing"])];
        let err = sort(&nodes).unwrap_err();
        assert_eq!(
            err.to_string(),
            "resource 'api' depends on unknown 'secret-missing'"
        );
    }

    #[test]
    fn test_sort_duplicate_id() {
        let nodes = vec![node("a", &[]), node("a", &[])];
        assert!(matches!(
            sort(&nodes),
            Err(CompileError::DuplicateResource { .. })
        ));
    }

    #[test]
    fn test_sort_empty() {
        assert!(sort(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_dependents() {
        let nodes = vec![node("a", &[]), node("b", &["a"]), node("c", &["a", "b"])];
        let ids: Vec<_> = dependents(&nodes, "a").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }
}
