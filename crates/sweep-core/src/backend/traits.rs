//! Search backend trait definition.

use async_trait::async_trait;

use crate::backend::errors::BackendError;
use crate::backend::types::{CompartmentSummary, SearchPage, SearchQuery};

/// Interface to the cloud's resource search and identity APIs.
///
/// Every call is independent; the region a search runs in is passed
/// explicitly so one backend value can serve concurrent region scans.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// The canonical name of this backend (e.g., "oci-cli", "fixture").
    fn name(&self) -> &'static str;

    /// Every resource type name the search service understands.
    async fn list_resource_types(&self) -> Result<Vec<String>, BackendError>;

    /// Fetch one page of at most `limit` records from a search in `region`.
    ///
    /// `page` is the token returned with the previous page, `None` for the
    /// first one.
    async fn search(
        &self,
        region: &str,
        query: &SearchQuery,
        limit: u32,
        page: Option<&str>,
    ) -> Result<SearchPage, BackendError>;

    /// Region identifiers the tenancy is subscribed to.
    async fn list_region_subscriptions(&self) -> Result<Vec<String>, BackendError>;

    /// All compartments of the tenancy, the root included.
    async fn list_compartments(&self) -> Result<Vec<CompartmentSummary>, BackendError>;
}
