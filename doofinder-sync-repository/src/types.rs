//! Request and response types for management API operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Preset used when an index has to be created on the fly.
pub const GENERIC_PRESET: &str = "generic";

/// A Doofinder search engine as returned by the management API.
///
/// Only the fields the indexer reads are modelled; anything else in the
/// response is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEngine {
    /// The search engine hash id.
    #[serde(alias = "hashid")]
    pub hash: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Language of the engine, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Site the engine serves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    /// Indices attached to the engine.
    #[serde(default)]
    pub indices: Vec<IndexSummary>,
}

/// Summary of an index as listed by the management API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Index name, equal to the item type it holds.
    pub name: String,
    /// Preset the index was created with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Provider specific index options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Body of a create-index call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexRequest {
    /// Name of the index to create.
    pub name: String,
    /// Preset to create the index from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Language the index content is written in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl CreateIndexRequest {
    /// Request for an index created from the generic preset.
    pub fn generic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preset: Some(GENERIC_PRESET.to_string()),
            language: None,
        }
    }

    /// Request for an index bound to a language context.
    pub fn for_language(name: impl Into<String>, language: Option<String>) -> Self {
        Self {
            name: name.into(),
            preset: None,
            language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generic_request_body() {
        let body = serde_json::to_value(CreateIndexRequest::generic("product")).unwrap();
        assert_eq!(body, json!({ "name": "product", "preset": "generic" }));
    }

    #[test]
    fn test_language_request_omits_missing_language() {
        let body = serde_json::to_value(CreateIndexRequest::for_language("post", None)).unwrap();
        assert_eq!(body, json!({ "name": "post" }));

        let body =
            serde_json::to_value(CreateIndexRequest::for_language("post", Some("en".into())))
                .unwrap();
        assert_eq!(body, json!({ "name": "post", "language": "en" }));
    }

    #[test]
    fn test_search_engine_ignores_unknown_fields() {
        let engine: SearchEngine = serde_json::from_value(json!({
            "hash": "abc123",
            "name": "My shop",
            "language": "en",
            "currency": "EUR",
            "indices": [{ "name": "product", "preset": "product" }]
        }))
        .unwrap();

        assert_eq!(engine.hash, "abc123");
        assert_eq!(engine.indices.len(), 1);
        assert_eq!(engine.indices[0].name, "product");
        assert!(engine.site_url.is_none());
    }

    #[test]
    fn test_search_engine_accepts_hashid() {
        let engine: SearchEngine = serde_json::from_value(json!({
            "hashid": "abc123",
            "name": "My shop",
            "language": "en",
            "indices": []
        }))
        .unwrap();

        assert_eq!(engine.hash, "abc123");
        assert_eq!(engine.language.as_deref(), Some("en"));
    }
}
