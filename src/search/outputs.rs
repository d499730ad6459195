//! Output types for search tools
//!
//! These types are used as the return values from search tool methods.
//! They are serialized to JSON strings for the MCP protocol, and can be
//! deserialized in tests for type-safe validation.

use serde::{Deserialize, Serialize};

use crate::search::index::MatchKind;

/// A documentation anchor with its resolved site URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetOutput {
    /// URL as stored in the search data
    pub url: String,
    /// URL on the documentation site
    pub canonical_url: String,
    /// Owning class, namespace or full signature
    pub context: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

/// Individual search result item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub key: String,
    pub label: String,
    pub match_kind: MatchKind,
    pub targets: Vec<TargetOutput>,
}

/// Pagination information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginationInfo {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// Output from search_docs operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchDocsOutput {
    pub version: String,
    pub query: String,
    pub results: Vec<SearchHit>,
    pub pagination: PaginationInfo,
}

impl SearchDocsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }

    /// Check if there are any results
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }
}

/// Output from lookup_symbol operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LookupSymbolOutput {
    pub version: String,
    pub key: String,
    pub entries: Vec<SearchHit>,
}

impl LookupSymbolOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// A doc set known to the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocVersionInfo {
    pub name: String,
    pub version: String,
    pub legacy: bool,
    pub latest: bool,
}

/// Output from list_doc_versions operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ListDocVersionsOutput {
    pub docs_dir: String,
    pub versions: Vec<DocVersionInfo>,
}

impl ListDocVersionsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Error output for search tools
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchErrorOutput {
    pub error: String,
}

impl SearchErrorOutput {
    /// Create a new error output
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize error"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_docs_output_serialization() {
        let output = SearchDocsOutput {
            version: "mongocxx-3.10.0".to_string(),
            query: "insert".to_string(),
            results: vec![SearchHit {
                key: "insert_one".to_string(),
                label: "insert_one".to_string(),
                match_kind: MatchKind::Prefix,
                targets: vec![TargetOutput {
                    url: "../classmongocxx_1_1collection.html#a1".to_string(),
                    canonical_url:
                        "https://mongocxx.org/api/mongocxx-3.10.0/classmongocxx_1_1collection.html#a1"
                            .to_string(),
                    context: "mongocxx::collection".to_string(),
                    external: false,
                }],
            }],
            pagination: PaginationInfo {
                total: 1,
                limit: 50,
                offset: 0,
                has_more: false,
            },
        };

        assert!(output.has_results());

        let json = output.to_json();
        assert!(json.contains(r#""match_kind":"prefix""#));
        assert!(!json.contains("external"));

        let deserialized: SearchDocsOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(output, deserialized);
    }

    #[test]
    fn test_search_error_output() {
        let output = SearchErrorOutput::new("Search failed");
        let json = output.to_json();
        let deserialized: SearchErrorOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(output, deserialized);
    }
}
