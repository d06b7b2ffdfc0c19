//! BLAKE3 fingerprints of compiler output.
//!
//! Hashes are taken over canonical JSON (struct field order, `IndexMap`
//! insertion order), so two compiles of the same description hash equal.

use super::error::Result;
use super::resolved::{ResolvedConfig, ResolvedResource};
use indexmap::IndexMap;

/// Hash a string. Returns `"blake3:{hex}"`.
pub fn hash_string(s: &str) -> String {
    format!("blake3:{}", blake3::hash(s.as_bytes()).to_hex())
}

/// Hash of a single node.
pub fn resource_hash(resource: &ResolvedResource) -> Result<String> {
    Ok(hash_string(&serde_json::to_string(resource)?))
}

/// Per-node hashes in provisioning order.
pub fn resource_hashes(config: &ResolvedConfig) -> Result<IndexMap<String, String>> {
    config
        .ordered()
        .into_iter()
        .map(|r| Ok((r.id.clone(), resource_hash(r)?)))
        .collect()
}

/// Fingerprint of a whole compile result, order included.
pub fn fingerprint(config: &ResolvedConfig) -> Result<String> {
    Ok(hash_string(&serde_json::to_string(config)?))
}

impl ResolvedConfig {
    /// See [`fingerprint`].
    pub fn fingerprint(&self) -> Result<String> {
        fingerprint(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolved::{ProjectInfo, ResourceConfig, SecretConfig};
    use crate::core::types::Backend;

    fn config(order: &[&str]) -> ResolvedConfig {
        let secret = |id: &str| ResolvedResource {
            id: id.to_string(),
            resource_type: "gcp:secret".to_string(),
            name: id.to_string(),
            config: ResourceConfig::Secret(SecretConfig {
                secret_id: id.to_string(),
                ..Default::default()
            }),
            depends_on: vec![],
            network: None,
        };
        ResolvedConfig {
            project: ProjectInfo {
                name: "shop".to_string(),
                region: "us-central1".to_string(),
                cloud_project_id: "shop".to_string(),
                backend: Backend::Flat,
            },
            resources: vec![secret("a"), secret("b")],
            order: order.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_hash_string_format() {
        let h = hash_string("hello");
        assert!(h.starts_with("blake3:"));
        assert_eq!(h.len(), 7 + 64);
        assert_eq!(h, hash_string("hello"));
    }

    #[test]
    fn test_fingerprint_stable() {
        let c = config(&["a", "b"]);
        assert_eq!(c.fingerprint().unwrap(), config(&["a", "b"]).fingerprint().unwrap());
    }

    #[test]
    fn test_fingerprint_covers_order() {
        assert_ne!(
            config(&["a", "b"]).fingerprint().unwrap(),
            config(&["b", "a"]).fingerprint().unwrap()
        );
    }

    #[test]
    fn test_resource_hashes_follow_order() {
        let hashes = resource_hashes(&config(&["b", "a"])).unwrap();
        let ids: Vec<_> = hashes.keys().cloned().collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_ne!(hashes["a"], hashes["b"]);
    }
}
