//! # Catalog Module
//!
//! Discovers the versioned API doc sets under a docs root and hands out one
//! [`SearchIndex`] per doc set.
//!
//! A docs root holds one directory per release, named `legacy-X.Y.Z` for the
//! legacy driver and `<prefix>-X.Y.Z` (by default `mongocxx-X.Y.Z`) for the
//! current one. Releases order legacy first, then by version, so the last
//! entry is the newest doc set. Each doc set is indexed independently; keys
//! that repeat across releases are never merged.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use semver::Version;
use tokio::sync::OnceCell;

use crate::search::config::{
    CURRENT_ALIAS, DEFAULT_BASE_URL, DEFAULT_MODERN_PREFIX, LEGACY_PREFIX, SEARCH_DATA_PREFIX,
    SEARCH_DIR,
};
use crate::search::{SearchIndex, load_files};

/// Where to find doc sets and how to name them
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub docs_dir: PathBuf,
    pub modern_prefix: String,
    pub base_url: String,
}

impl CatalogConfig {
    pub fn new(docs_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs_dir: docs_dir.into(),
            modern_prefix: DEFAULT_MODERN_PREFIX.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// One released doc set on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocVersion {
    pub name: String,
    pub legacy: bool,
    pub version: Version,
    pub path: PathBuf,
}

impl DocVersion {
    fn sort_key(&self) -> (bool, &Version) {
        (!self.legacy, &self.version)
    }
}

/// Ordered set of doc versions, each with a lazily loaded index
#[derive(Debug)]
pub struct DocsCatalog {
    config: CatalogConfig,
    versions: Vec<DocVersion>,
    indexes: HashMap<String, OnceCell<Arc<SearchIndex>>>,
}

impl DocsCatalog {
    /// Scan the docs root for doc set directories
    pub fn open(config: CatalogConfig) -> Result<Self> {
        let root = &config.docs_dir;
        if !root.is_dir() {
            bail!("API docs directory does not exist: {}", root.display());
        }

        let mut versions = Vec::new();
        for dir_entry in fs::read_dir(root)
            .with_context(|| format!("Failed to read API docs directory: {}", root.display()))?
        {
            let dir_entry = dir_entry?;
            let file_type = dir_entry.file_type()?;
            if !file_type.is_dir() || file_type.is_symlink() {
                continue;
            }

            let Some(name) = dir_entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!("Skipping non UTF-8 directory: {:?}", dir_entry.file_name());
                continue;
            };

            if let Some((legacy, version)) = parse_doc_name(&name, &config.modern_prefix)? {
                versions.push(DocVersion {
                    path: dir_entry.path(),
                    name,
                    legacy,
                    version,
                });
            }
        }

        versions.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        match (versions.first(), versions.last()) {
            (Some(first), Some(last)) => tracing::info!(
                "Found {} API docs: {} ... {}",
                versions.len(),
                first.name,
                last.name
            ),
            _ => tracing::warn!("No API docs found in {}", root.display()),
        }

        let indexes = versions
            .iter()
            .map(|v| (v.name.clone(), OnceCell::new()))
            .collect();

        Ok(Self {
            config,
            versions,
            indexes,
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Every doc set, oldest first
    pub fn versions(&self) -> &[DocVersion] {
        &self.versions
    }

    pub fn latest(&self) -> Option<&DocVersion> {
        self.versions.last()
    }

    /// Find a doc set by directory name; `current` means the newest one
    pub fn find(&self, name: &str) -> Option<&DocVersion> {
        if name == CURRENT_ALIAS {
            return self.latest();
        }
        self.versions.iter().find(|v| v.name == name)
    }

    /// Like [`find`](Self::find), defaulting to the newest doc set
    pub fn resolve(&self, name: Option<&str>) -> Result<&DocVersion> {
        match name {
            Some(name) => self
                .find(name)
                .with_context(|| format!("Unknown API doc version: {name}")),
            None => self.latest().with_context(|| {
                format!("No API docs found in {}", self.config.docs_dir.display())
            }),
        }
    }

    /// Search index for a doc set, loading it on first use.
    ///
    /// Each doc set has its own cell, so loading one never blocks queries
    /// against another. A failed load leaves the cell empty for a retry.
    pub async fn index_for(&self, name: Option<&str>) -> Result<(DocVersion, Arc<SearchIndex>)> {
        let version = self.resolve(name)?.clone();
        let cell = self
            .indexes
            .get(&version.name)
            .with_context(|| format!("Unknown API doc version: {}", version.name))?;

        let index = cell
            .get_or_try_init(|| load_version(&version))
            .await?
            .clone();
        Ok((version, index))
    }

    /// Canonical site URL for a target URL taken from a doc set's search data
    pub fn canonical_url(&self, version: &DocVersion, url: &str) -> String {
        canonical_url(&self.config.base_url, &version.name, url)
    }
}

async fn load_version(version: &DocVersion) -> Result<Arc<SearchIndex>> {
    let files = search_files(&version.path)?;
    let index = tokio::task::spawn_blocking(move || load_files(&files))
        .await
        .context("Search index loading task failed")?
        .with_context(|| format!("Failed to load search index for {}", version.name))?;

    tracing::info!(
        "Loaded search index for {} ({} entries)",
        version.name,
        index.len()
    );
    Ok(Arc::new(index))
}

/// Classify a doc set directory name.
///
/// Returns `Ok(None)` for names whose version carries a suffix such as
/// `mongocxx-3.1.0-rc0`, and an error for names that are not doc sets at all.
pub fn parse_doc_name(name: &str, modern_prefix: &str) -> Result<Option<(bool, Version)>> {
    let legacy_prefix = format!("{LEGACY_PREFIX}-");
    let modern_prefix = format!("{modern_prefix}-");

    let (legacy, raw) = match name.strip_prefix(&legacy_prefix) {
        Some(raw) => (true, raw),
        None => (false, name.strip_prefix(&modern_prefix).unwrap_or(name)),
    };

    if raw.contains('-') {
        tracing::debug!("Skipping: {name}");
        return Ok(None);
    }

    let version = parse_release(raw).with_context(|| {
        format!("Unexpected API doc name \"{name}\": the docs directory may not be correct")
    })?;
    Ok(Some((legacy, version)))
}

/// Parse `X`, `X.Y` or `X.Y.Z`, padding missing components with zero.
///
/// Components are plain integers, so leading zeros are accepted (`3.01.0`
/// is `3.1.0`). Four or more components have no semver equivalent.
fn parse_release(raw: &str) -> Result<Version> {
    let parts = raw
        .split('.')
        .map(|part| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                bail!("Invalid version component \"{part}\" in \"{raw}\"");
            }
            part.parse::<u64>()
                .with_context(|| format!("Version component out of range in \"{raw}\""))
        })
        .collect::<Result<Vec<_>>>()?;

    match parts.as_slice() {
        [major] => Ok(Version::new(*major, 0, 0)),
        [major, minor] => Ok(Version::new(*major, *minor, 0)),
        [major, minor, patch] => Ok(Version::new(*major, *minor, *patch)),
        _ => bail!(
            "Version \"{raw}\" has {} components; at most 3 are supported",
            parts.len()
        ),
    }
}

/// The doc set's `search/all_*.js` files in numeric suffix order
pub fn search_files(doc_dir: &Path) -> Result<Vec<PathBuf>> {
    let search_dir = doc_dir.join(SEARCH_DIR);
    let mut files: Vec<(u64, PathBuf)> = Vec::new();

    for dir_entry in fs::read_dir(&search_dir)
        .with_context(|| format!("Failed to read search directory: {}", search_dir.display()))?
    {
        let path = dir_entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let number = file_name
            .strip_prefix(SEARCH_DATA_PREFIX)
            .and_then(|rest| rest.strip_suffix(".js"))
            .and_then(|n| n.parse::<u64>().ok());
        if let Some(number) = number {
            files.push((number, path));
        }
    }

    if files.is_empty() {
        bail!("No search data found in {}", search_dir.display());
    }

    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Join a search-relative target URL onto `<base_url>/<doc set>/`
pub fn canonical_url(base_url: &str, doc_name: &str, url: &str) -> String {
    if url.contains("://") {
        return url.to_string();
    }

    let mut path = url;
    loop {
        if let Some(rest) = path.strip_prefix("../") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else {
            break;
        }
    }
    let path = path.trim_start_matches('/');

    format!("{}/{}/{}", base_url.trim_end_matches('/'), doc_name, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_doc_set(root: &Path, name: &str, files: &[(&str, &str)]) {
        let search = root.join(name).join(SEARCH_DIR);
        fs::create_dir_all(&search).unwrap();
        for (file, contents) in files {
            fs::write(search.join(file), contents).unwrap();
        }
    }

    #[test]
    fn test_versions_sort_legacy_first_then_semver() {
        let dir = TempDir::new().unwrap();
        for name in [
            "mongocxx-3.10.0",
            "legacy-0.10.0",
            "mongocxx-3.2.0",
            "legacy-0.2.0",
            "mongocxx-3.1.0-rc0",
            "legacy-1.0.7",
        ] {
            fs::create_dir_all(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("README.txt"), "not a doc set").unwrap();

        let catalog = DocsCatalog::open(CatalogConfig::new(dir.path())).unwrap();
        let names: Vec<&str> = catalog.versions().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "legacy-0.2.0",
                "legacy-0.10.0",
                "legacy-1.0.7",
                "mongocxx-3.2.0",
                "mongocxx-3.10.0",
            ]
        );
        assert_eq!(catalog.latest().unwrap().name, "mongocxx-3.10.0");
        assert_eq!(catalog.find("current").unwrap().name, "mongocxx-3.10.0");
        assert!(catalog.find("legacy-1.0.7").unwrap().legacy);
        assert!(catalog.find("mongocxx-3.1.0-rc0").is_none());
    }

    #[test]
    fn test_unexpected_directory_name_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("mongocxx-3.0.0")).unwrap();
        fs::create_dir_all(dir.path().join("assets")).unwrap();

        let err = DocsCatalog::open(CatalogConfig::new(dir.path())).unwrap_err();
        assert!(err.to_string().contains("assets"));
    }

    #[test]
    fn test_missing_docs_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(DocsCatalog::open(CatalogConfig::new(dir.path().join("nope"))).is_err());
    }

    #[test]
    fn test_parse_doc_name() {
        assert_eq!(
            parse_doc_name("legacy-1.0.7", "mongocxx").unwrap(),
            Some((true, Version::new(1, 0, 7)))
        );
        assert_eq!(
            parse_doc_name("mongocxx-3.1", "mongocxx").unwrap(),
            Some((false, Version::new(3, 1, 0)))
        );
        assert_eq!(
            parse_doc_name("driver-2.0.0", "driver").unwrap(),
            Some((false, Version::new(2, 0, 0)))
        );
        assert_eq!(parse_doc_name("mongocxx-3.1.0-rc0", "mongocxx").unwrap(), None);
        assert!(parse_doc_name("current", "mongocxx").is_err());
    }

    #[test]
    fn test_parse_release_accepts_leading_zeros() {
        assert_eq!(parse_release("3.01.0").unwrap(), Version::new(3, 1, 0));
        assert_eq!(parse_release("007").unwrap(), Version::new(7, 0, 0));
        assert_eq!(
            parse_doc_name("mongocxx-3.01.0", "mongocxx").unwrap(),
            Some((false, Version::new(3, 1, 0)))
        );
    }

    #[test]
    fn test_parse_release_rejects_extra_components() {
        let err = parse_release("1.0.7.1").unwrap_err();
        assert!(err.to_string().contains("4 components"));

        let err = parse_doc_name("legacy-1.0.7.1", "mongocxx").unwrap_err();
        assert!(format!("{err:#}").contains("at most 3"));

        assert!(parse_release("1..2").is_err());
        assert!(parse_release("+1.0.0").is_err());
    }

    #[test]
    fn test_search_files_numeric_order() {
        let dir = TempDir::new().unwrap();
        make_doc_set(
            dir.path(),
            "mongocxx-3.0.0",
            &[
                ("all_10.js", "[]"),
                ("all_2.js", "[]"),
                ("all_0.js", "[]"),
                ("functions_0.js", "[]"),
                ("search.js", ""),
            ],
        );

        let files = search_files(&dir.path().join("mongocxx-3.0.0")).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["all_0.js", "all_2.js", "all_10.js"]);
    }

    #[test]
    fn test_search_files_missing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("legacy-1.0.0").join(SEARCH_DIR)).unwrap();
        assert!(search_files(&dir.path().join("legacy-1.0.0")).is_err());
    }

    #[test]
    fn test_canonical_url() {
        assert_eq!(
            canonical_url(
                "https://mongocxx.org/api/",
                "mongocxx-3.10.0",
                "../classmongocxx_1_1client.html#a1"
            ),
            "https://mongocxx.org/api/mongocxx-3.10.0/classmongocxx_1_1client.html#a1"
        );
        assert_eq!(
            canonical_url("https://mongocxx.org/api", "legacy-1.0.7", "https://en.cppreference.com/x"),
            "https://en.cppreference.com/x"
        );
    }

    #[tokio::test]
    async fn test_index_for_loads_once_per_version() {
        let dir = TempDir::new().unwrap();
        make_doc_set(
            dir.path(),
            "legacy-1.0.7",
            &[(
                "all_0.js",
                "var searchData=[['auth_0',['auth',['../classmongo_1_1DBClientWithCommands.html#a1',1,'mongo::DBClientWithCommands']]]];",
            )],
        );
        make_doc_set(
            dir.path(),
            "mongocxx-3.0.0",
            &[
                (
                    "all_0.js",
                    "var searchData=[['client_0',['client',['../classmongocxx_1_1client.html',1,'mongocxx']]]];",
                ),
                (
                    "all_1.js",
                    "var searchData=[['collection_0',['collection',['../classmongocxx_1_1collection.html',1,'mongocxx']]]];",
                ),
            ],
        );

        let catalog = DocsCatalog::open(CatalogConfig::new(dir.path())).unwrap();

        let (version, latest) = catalog.index_for(None).await.unwrap();
        assert_eq!(version.name, "mongocxx-3.0.0");
        let keys: Vec<&str> = latest.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["client", "collection"]);

        let (_, again) = catalog.index_for(Some("current")).await.unwrap();
        assert!(Arc::ptr_eq(&latest, &again));

        let (_, legacy) = catalog.index_for(Some("legacy-1.0.7")).await.unwrap();
        assert!(legacy.query("client").is_empty());
        assert_eq!(legacy.query("auth").len(), 1);

        assert!(catalog.index_for(Some("mongocxx-9.9.9")).await.is_err());
    }

    #[tokio::test]
    async fn test_index_for_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let catalog = DocsCatalog::open(CatalogConfig::new(dir.path())).unwrap();
        assert!(catalog.versions().is_empty());
        assert!(catalog.index_for(None).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_index_for_shares_one_load() {
        let dir = TempDir::new().unwrap();
        make_doc_set(
            dir.path(),
            "mongocxx-3.0.0",
            &[(
                "all_0.js",
                "var searchData=[['client_0',['client',['../classmongocxx_1_1client.html',1,'mongocxx']]]];",
            )],
        );
        let catalog = Arc::new(DocsCatalog::open(CatalogConfig::new(dir.path())).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let catalog = catalog.clone();
                tokio::spawn(async move { catalog.index_for(None).await.unwrap().1 })
            })
            .collect();

        let mut indexes = Vec::new();
        for handle in handles {
            indexes.push(handle.await.unwrap());
        }
        assert!(indexes.iter().all(|index| Arc::ptr_eq(index, &indexes[0])));
    }

    #[tokio::test]
    async fn test_index_for_retries_after_failed_load() {
        let dir = TempDir::new().unwrap();
        make_doc_set(dir.path(), "legacy-1.0.7", &[("all_0.js", "var searchData=[[")]);
        make_doc_set(
            dir.path(),
            "mongocxx-3.0.0",
            &[(
                "all_0.js",
                "var searchData=[['client_0',['client',['../classmongocxx_1_1client.html',1,'mongocxx']]]];",
            )],
        );
        let catalog = DocsCatalog::open(CatalogConfig::new(dir.path())).unwrap();

        assert!(catalog.index_for(Some("legacy-1.0.7")).await.is_err());
        // A broken doc set does not hold up the others
        let (_, current) = catalog.index_for(None).await.unwrap();
        assert_eq!(current.len(), 1);

        fs::write(
            dir.path().join("legacy-1.0.7").join(SEARCH_DIR).join("all_0.js"),
            "var searchData=[['auth_0',['auth',['../classmongo.html#a1',1,'mongo']]]];",
        )
        .unwrap();
        let (_, legacy) = catalog.index_for(Some("legacy-1.0.7")).await.unwrap();
        assert_eq!(legacy.query("auth").len(), 1);
    }
}
