//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical record stored in the index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RagRecord {
    /// Deterministic point id, see [`stable_point_id`].
    pub id: String,
    pub text: String,
    /// 0-based page the text was taken from.
    pub page: usize,
    /// Document name.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl RagRecord {
    /// Builds a record for chunk `ordinal` of `collection`.
    pub fn new(
        collection: &str,
        ordinal: usize,
        page: usize,
        text: impl Into<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            id: stable_point_id(collection, ordinal).to_string(),
            text: text.into(),
            page,
            source,
            embedding: None,
        }
    }
}

/// Query parameters for retrieval.
#[derive(Clone, Copy, Debug)]
pub struct RagQuery<'a> {
    pub text: &'a str,
    pub top_k: u64,
}

/// A single retrieval hit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RagHit {
    pub score: f32,
    pub text: String,
    pub page: usize,
    pub source: Option<String>,
}

/// Deterministic UUIDv5 of `collection:ordinal`.
///
/// Re-ingesting a document into the same collection yields the same ids.
pub fn stable_point_id(collection: &str, ordinal: usize) -> Uuid {
    let key = format!("{collection}:{ordinal}");
    Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ids_are_stable_and_distinct() {
        assert_eq!(stable_point_id("contract_1", 0), stable_point_id("contract_1", 0));
        assert_ne!(stable_point_id("contract_1", 0), stable_point_id("contract_1", 1));
        assert_ne!(stable_point_id("contract_1", 0), stable_point_id("other", 0));
    }

    #[test]
    fn record_json_skips_missing_embedding() {
        let r = RagRecord::new("c", 3, 1, "hello", Some("a.pdf".into()));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["page"], 1);
        assert!(v.get("embedding").is_none());
    }
}
