pub mod errors;
pub mod handler;
pub mod types;

// Public API exports
pub use errors::CatalogError;
pub use handler::{fetch_catalog, non_billable_keywords_with, priority_types_with, resolve_catalog};
pub use types::{
    NON_BILLABLE_KEYWORDS, PRIORITY_TYPES, ResolvedCatalog, SkippedType, SupportedTypeCatalog,
};
