use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::EnvFilter;

use apidocs_search::search::config::{DEFAULT_BASE_URL, DEFAULT_MODERN_PREFIX};
use apidocs_search::search::tools::{SearchDocsParams, SearchTools};
use apidocs_search::search::load_files;
use apidocs_search::{ApiDocsService, CatalogConfig, DocsCatalog};

/// MCP server and CLI for searching versioned Doxygen API documentation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding one doc set per release (legacy-X.Y.Z, mongocxx-X.Y.Z)
    #[arg(long, env = "APIDOCSPATH")]
    docs_dir: Option<String>,

    /// Site prefix used to build canonical documentation URLs
    #[arg(long, env = "APIDOCS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory name prefix of non-legacy doc sets
    #[arg(long, env = "APIDOCS_MODERN_PREFIX", default_value = DEFAULT_MODERN_PREFIX)]
    modern_prefix: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the search tools over MCP stdio (the default)
    Serve,
    /// Run one query and print the results as JSON
    Query {
        /// Text to search for
        query: String,
        /// Doc set to search (defaults to the newest)
        #[arg(long)]
        version: Option<String>,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Search these data files instead of the docs directory
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// List the doc sets found in the docs directory
    Versions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Args::parse();

    // Initialize tracing to stderr to avoid conflicts with stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match args.command.take() {
        Some(Commands::Query {
            query,
            version,
            limit,
            files,
        }) => {
            if files.is_empty() {
                query_catalog(&args, query, version, limit).await
            } else {
                query_files(&files, &query, limit)
            }
        }
        Some(Commands::Versions) => {
            let catalog = Arc::new(DocsCatalog::open(catalog_config(&args)?)?);
            let output = SearchTools::new(catalog).list_doc_versions();
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Some(Commands::Serve) | None => serve(catalog_config(&args)?).await,
    }
}

fn catalog_config(args: &Args) -> Result<CatalogConfig> {
    let docs_dir = args
        .docs_dir
        .as_deref()
        .context("No docs directory given: pass --docs-dir or set APIDOCSPATH")?;

    Ok(CatalogConfig {
        docs_dir: PathBuf::from(shellexpand::tilde(docs_dir).into_owned()),
        modern_prefix: args.modern_prefix.clone(),
        base_url: args.base_url.clone(),
    })
}

async fn query_catalog(
    args: &Args,
    query: String,
    version: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let catalog = Arc::new(DocsCatalog::open(catalog_config(args)?)?);
    let output = SearchTools::new(catalog)
        .search_docs(SearchDocsParams {
            version,
            query,
            limit,
            offset: None,
        })
        .await
        .map_err(|e| anyhow::anyhow!(e.error))?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Query data files directly, without a docs directory
fn query_files(files: &[PathBuf], query: &str, limit: Option<usize>) -> Result<()> {
    let index = load_files(files)?;
    let results: Vec<_> = index
        .query(query)
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

async fn serve(config: CatalogConfig) -> Result<()> {
    tracing::info!("Starting API docs search server on stdio...");
    tracing::info!("Using API docs directory: {}", config.docs_dir.display());

    let api_docs_service = ApiDocsService::new(config)?;

    // Serve using stdio transport
    let service = api_docs_service.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    // Wait for the service to complete
    service.waiting().await?;
    Ok(())
}
