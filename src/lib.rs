pub mod catalog;
pub mod search;
pub mod service;

pub use catalog::{CatalogConfig, DocsCatalog};
pub use search::{Entry, MalformedDataError, SearchIndex, Target};
pub use service::ApiDocsService;
