//! Record and entry types for the search index
//!
//! [`SourceRecord`] is the decoded shape of a data source, before any
//! invariant is checked. [`Entry`] is what a loaded index hands back to
//! callers.

use serde::{Deserialize, Serialize};

/// A single documentation anchor for an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Page URL with fragment, relative to the doc set's `search/` directory
    pub url: String,
    /// Short descriptive label, usually the owning class or namespace
    pub context: String,
    /// Whether the anchor points outside this doc set
    #[serde(default)]
    pub external: bool,
}

/// One indexed symbol or phrase with its documentation targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Normalized (trimmed, lower-cased) search key
    pub key: String,
    /// Human-readable display name
    pub label: String,
    /// Ordered anchors; never empty once loaded
    pub targets: Vec<Target>,
}

/// A `(label, url, context)` triple as it appears in a data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTarget {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub external: bool,
}

/// A decoded but unvalidated record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub targets: Vec<SourceTarget>,
}

impl SourceRecord {
    pub fn new(key: impl Into<String>, targets: Vec<SourceTarget>) -> Self {
        Self {
            key: Some(key.into()),
            targets,
        }
    }
}

impl SourceTarget {
    pub fn new(
        label: impl Into<String>,
        url: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            context: context.into(),
            external: false,
        }
    }
}

impl From<SourceTarget> for Target {
    fn from(target: SourceTarget) -> Self {
        Self {
            url: target.url,
            context: target.context,
            external: target.external,
        }
    }
}
