//! Property-based tests for references, sanitizers and ordering.

use proptest::prelude::*;
use stackgraph::core::graph;
use stackgraph::core::naming::{sanitize_identifier, sanitize_label, LABEL_MAX_LEN};
use stackgraph::core::reference::{self, Reference, ReferenceType};
use stackgraph::core::resolved::{ResolvedResource, ResourceConfig, TopicConfig};

fn reference_strategy() -> impl Strategy<Value = Reference> {
    (
        prop::sample::select(ReferenceType::ALL.to_vec()),
        "[a-z0-9-]{1,24}",
        prop::option::of("[a-zA-Z]{1,16}"),
    )
        .prop_map(|(ref_type, name, property)| Reference {
            ref_type,
            name,
            property,
        })
}

/// Nodes where each may depend only on nodes declared before it, then
/// reversed so edges point forward as often as backward.
fn dag_strategy() -> impl Strategy<Value = Vec<ResolvedResource>> {
    (1usize..24)
        .prop_flat_map(|n| {
            prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..3), n)
        })
        .prop_map(|edges| {
            let mut nodes: Vec<ResolvedResource> = edges
                .iter()
                .enumerate()
                .map(|(i, picks)| {
                    let mut depends_on: Vec<String> = Vec::new();
                    if i > 0 {
                        for pick in picks {
                            let dep = format!("topic-{}", pick.index(i));
                            if !depends_on.contains(&dep) {
                                depends_on.push(dep);
                            }
                        }
                    }
                    ResolvedResource {
                        id: format!("topic-{}", i),
                        resource_type: "gcp:pubsub_topic".to_string(),
                        name: i.to_string(),
                        config: ResourceConfig::Topic(TopicConfig::default()),
                        depends_on,
                        network: None,
                    }
                })
                .collect();
            nodes.reverse();
            nodes
        })
}

proptest! {
    #[test]
    fn prop_reference_display_parses_back(r in reference_strategy()) {
        prop_assert_eq!(reference::parse(&r.to_string()), Some(r));
    }

    #[test]
    fn prop_embedded_reference_is_not_a_reference(r in reference_strategy(), prefix in "[a-z ]{1,8}") {
        let embedded = format!("{}{}", prefix, r);
        prop_assert!(!reference::is_reference(&embedded));
    }

    #[test]
    fn prop_sanitize_identifier_charset(name in ".{0,40}") {
        let id = sanitize_identifier(&name);
        prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        prop_assert!(!id.starts_with(|c: char| c.is_ascii_digit()));
        prop_assert_eq!(sanitize_identifier(&id), id.clone());
    }

    #[test]
    fn prop_sanitize_label_shape(value in ".{0,100}") {
        let label = sanitize_label(&value);
        prop_assert!(!label.is_empty());
        prop_assert!(label.len() <= LABEL_MAX_LEN);
        prop_assert!(label.starts_with(|c: char| c.is_ascii_lowercase()));
        prop_assert!(label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'));
        prop_assert_eq!(sanitize_label(&label), label.clone());
    }

    #[test]
    fn prop_sort_is_a_stable_topological_order(nodes in dag_strategy()) {
        let order = graph::sort(&nodes).unwrap();
        prop_assert_eq!(order.len(), nodes.len());
        for node in &nodes {
            let at = order.iter().position(|id| id == &node.id).unwrap();
            for dep in &node.depends_on {
                let dep_at = order.iter().position(|id| id == dep).unwrap();
                prop_assert!(dep_at < at, "{} must precede {}", dep, node.id);
            }
        }
        prop_assert_eq!(graph::sort(&nodes).unwrap(), order);
    }
}
