use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::catalog::{CatalogConfig, DocsCatalog};
use crate::search::tools::{LookupSymbolParams, SearchDocsParams, SearchTools};

#[derive(Clone)]
pub struct ApiDocsService {
    search_tools: SearchTools,
    tool_router: ToolRouter<Self>,
}

impl ApiDocsService {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let catalog = Arc::new(DocsCatalog::open(config)?);
        Ok(Self::from_catalog(catalog))
    }

    pub fn from_catalog(catalog: Arc<DocsCatalog>) -> Self {
        Self {
            search_tools: SearchTools::new(catalog),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl ApiDocsService {
    #[tool(
        description = "Search the API documentation index of one doc set for symbols whose name contains the query. Matching is case-insensitive; exact matches are listed first, then names starting with the query, then other matches. Each result carries the documentation anchors with canonical URLs. Omit version to search the newest doc set; use list_doc_versions to see what is available."
    )]
    pub async fn search_docs(&self, params: Parameters<SearchDocsParams>) -> String {
        match self.search_tools.search_docs(params.0).await {
            Ok(output) => output.to_json(),
            Err(error) => error.to_json(),
        }
    }

    #[tool(
        description = "Look up one symbol by its exact name in a doc set. Returns every overload or homonym stored under that name with its documentation anchors. Use search_docs when you only know part of the name."
    )]
    pub async fn lookup_symbol(&self, params: Parameters<LookupSymbolParams>) -> String {
        match self.search_tools.lookup_symbol(params.0).await {
            Ok(output) => output.to_json(),
            Err(error) => error.to_json(),
        }
    }

    #[tool(
        description = "List the documentation versions available to search, oldest first. Legacy driver docs sort before current ones and the newest doc set is marked latest."
    )]
    pub async fn list_doc_versions(&self) -> String {
        self.search_tools.list_doc_versions().to_json()
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for ApiDocsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "MCP server for searching versioned Doxygen API documentation. Use list_doc_versions to see which doc sets exist, search_docs to find symbols by name fragment, and lookup_symbol to fetch every anchor for an exact symbol name.".to_string(),
            ),
            ..Default::default()
        }
    }
}
