//! # Search Module
//!
//! In-memory symbol search over Doxygen-generated API documentation.
//!
//! Doxygen ships a client-side index with every doc build: `search/all_*.js`
//! files mapping lower-cased symbol keys to documentation anchors. This module
//! decodes those files and answers exact, prefix and substring lookups.
//!
//! ## Key Components
//!
//! - [`index`] - the immutable [`SearchIndex`] and its ranking
//! - [`source`] - decoders for Doxygen `searchData` and JSON record files
//! - [`entry`] - record and entry types
//! - [`tools`] - MCP tool implementations for search operations
//! - [`config`] - Configuration constants for search functionality

pub mod config;
pub mod entry;
pub mod error;
pub mod index;
pub mod outputs;
pub mod source;
pub mod tools;

pub use entry::{Entry, SourceRecord, SourceTarget, Target};
pub use error::MalformedDataError;
pub use index::{Match, MatchKind, SearchIndex, normalize};
pub use source::{SourceFormat, load_files, parse_json_records, parse_search_data};
pub use tools::SearchTools;
