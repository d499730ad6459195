//! # Search Configuration Module
//!
//! Limits and file layout constants for loading and querying doc indexes.

/// Default limit for search results
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Maximum allowed limit for search results
pub const MAX_SEARCH_LIMIT: usize = 1000;

/// Maximum allowed query length in characters
pub const MAX_QUERY_LENGTH: usize = 1000;

/// Directory inside a doc set holding the search data files
pub const SEARCH_DIR: &str = "search";

/// File name prefix of the Doxygen files covering every symbol kind
pub const SEARCH_DATA_PREFIX: &str = "all_";

/// Directory name prefix for pre-3.0 documentation
pub const LEGACY_PREFIX: &str = "legacy";

/// Default directory name prefix for current documentation
pub const DEFAULT_MODERN_PREFIX: &str = "mongocxx";

/// Alias that always resolves to the newest doc set
pub const CURRENT_ALIAS: &str = "current";

/// Default site prefix for canonical URLs
pub const DEFAULT_BASE_URL: &str = "https://mongocxx.org/api";

/// Deepest array nesting accepted in a `searchData` file
pub const MAX_NESTING_DEPTH: usize = 32;
