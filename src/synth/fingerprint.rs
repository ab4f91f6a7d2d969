//! BLAKE3 fingerprints over the canonical graph form.
//!
//! The external engine diffs declared graphs against live state; a stable
//! fingerprint lets it short-circuit when nothing changed. Identical
//! declarations always produce identical fingerprints because composition
//! is deterministic and the canonical JSON has a fixed field order.

use crate::core::types::StackGraph;

/// Canonical JSON form of a composed graph — compact, fixed field order,
/// env maps sorted by key.
pub fn canonical_json(graph: &StackGraph) -> Result<String, serde_json::Error> {
    serde_json::to_string(graph)
}

/// Hash a string. Returns `"blake3:{hex}"`.
pub fn hash_string(s: &str) -> String {
    format!("blake3:{}", blake3::hash(s.as_bytes()).to_hex())
}

/// Fingerprint a composed graph.
pub fn fingerprint_graph(graph: &StackGraph) -> Result<String, serde_json::Error> {
    Ok(hash_string(&canonical_json(graph)?))
}
