use std::sync::Arc;

use rmcp::schemars;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::{DocVersion, DocsCatalog};
use crate::search::config::{DEFAULT_SEARCH_LIMIT, MAX_QUERY_LENGTH, MAX_SEARCH_LIMIT};
use crate::search::entry::Entry;
use crate::search::index::MatchKind;
use crate::search::outputs::{
    DocVersionInfo, ListDocVersionsOutput, LookupSymbolOutput, PaginationInfo, SearchDocsOutput,
    SearchErrorOutput, SearchHit, TargetOutput,
};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchDocsParams {
    #[schemars(
        description = "Doc set to search, e.g. 'mongocxx-3.10.0' or 'legacy-1.0.7' (default: the newest; 'current' also means the newest)"
    )]
    pub version: Option<String>,
    #[schemars(
        description = "Symbol name or fragment to search for. Matching is case-insensitive; exact matches come first, then prefix matches, then other substring matches"
    )]
    pub query: String,
    #[schemars(description = "Maximum number of results to return (default: 50)")]
    pub limit: Option<usize>,
    #[schemars(description = "Starting position for pagination (default: 0)")]
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LookupSymbolParams {
    #[schemars(description = "Doc set to search (default: the newest)")]
    pub version: Option<String>,
    #[schemars(description = "Exact symbol key, case-insensitive (e.g. 'insert_one')")]
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct SearchTools {
    catalog: Arc<DocsCatalog>,
}

impl SearchTools {
    pub fn new(catalog: Arc<DocsCatalog>) -> Self {
        Self { catalog }
    }

    /// Ranked substring search over one doc set
    pub async fn search_docs(
        &self,
        params: SearchDocsParams,
    ) -> Result<SearchDocsOutput, SearchErrorOutput> {
        if params.query.chars().count() > MAX_QUERY_LENGTH {
            return Err(SearchErrorOutput::new(format!(
                "Query must not exceed {MAX_QUERY_LENGTH} characters"
            )));
        }

        let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        if limit > MAX_SEARCH_LIMIT {
            return Err(SearchErrorOutput::new(format!(
                "Limit must not exceed {MAX_SEARCH_LIMIT}"
            )));
        }
        let offset = params.offset.unwrap_or(0);

        let (version, index) = self
            .catalog
            .index_for(params.version.as_deref())
            .await
            .map_err(|e| SearchErrorOutput::new(format!("Search failed: {e:#}")))?;

        let matches = index.query_ranked(&params.query);
        let total = matches.len();

        let results = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|m| self.to_hit(&version, m.entry, m.kind))
            .collect();

        tracing::debug!(
            "search_docs '{}' in {}: {} matches",
            params.query,
            version.name,
            total
        );

        Ok(SearchDocsOutput {
            version: version.name,
            query: params.query,
            results,
            pagination: PaginationInfo {
                total,
                limit,
                offset,
                has_more: offset.saturating_add(limit) < total,
            },
        })
    }

    /// Every entry stored under an exact key
    pub async fn lookup_symbol(
        &self,
        params: LookupSymbolParams,
    ) -> Result<LookupSymbolOutput, SearchErrorOutput> {
        let (version, index) = self
            .catalog
            .index_for(params.version.as_deref())
            .await
            .map_err(|e| SearchErrorOutput::new(format!("Lookup failed: {e:#}")))?;

        let entries = index
            .lookup(&params.key)
            .into_iter()
            .map(|entry| self.to_hit(&version, entry, MatchKind::Exact))
            .collect();

        Ok(LookupSymbolOutput {
            version: version.name,
            key: params.key,
            entries,
        })
    }

    /// Doc sets in release order, newest last
    pub fn list_doc_versions(&self) -> ListDocVersionsOutput {
        let latest = self.catalog.latest().map(|v| v.name.as_str());

        ListDocVersionsOutput {
            docs_dir: self.catalog.config().docs_dir.display().to_string(),
            versions: self
                .catalog
                .versions()
                .iter()
                .map(|v| DocVersionInfo {
                    name: v.name.clone(),
                    version: v.version.to_string(),
                    legacy: v.legacy,
                    latest: Some(v.name.as_str()) == latest,
                })
                .collect(),
        }
    }

    fn to_hit(&self, version: &DocVersion, entry: &Entry, kind: MatchKind) -> SearchHit {
        SearchHit {
            key: entry.key.clone(),
            label: entry.label.clone(),
            match_kind: kind,
            targets: entry
                .targets
                .iter()
                .map(|target| TargetOutput {
                    url: target.url.clone(),
                    canonical_url: self.catalog.canonical_url(version, &target.url),
                    context: target.context.clone(),
                    external: target.external,
                })
                .collect(),
        }
    }
}
