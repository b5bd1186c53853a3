use crate::backend::BackendError;
use crate::errors::SweepError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to fetch supported resource types: {source}")]
    FetchFailed {
        #[source]
        source: BackendError,
    },

    #[error("Backend reported no supported resource types")]
    EmptyCatalog,
}

impl SweepError for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            CatalogError::FetchFailed { .. } => "CATALOG_FETCH_FAILED",
            CatalogError::EmptyCatalog => "CATALOG_EMPTY",
        }
    }
}
