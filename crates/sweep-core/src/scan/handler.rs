use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sweep_config::FallbackStrategy;

use crate::backend::{ResourceRecord, SearchBackend, SearchPage, SearchQuery};
use crate::catalog::ResolvedCatalog;
use crate::lifecycle::is_active;

use super::errors::ScanError;
use super::types::{QueryFailure, RegionFinding, ScanSettings, Tier};

/// Scan one region for live resources in a compartment.
///
/// The priority tier runs first, one query per type, and stops at the first
/// type with a live record. A query whose page holds nothing usable is
/// followed to its next page before the scan moves on. The fallback tier runs only when the priority
/// tier found nothing. A failed query is logged and counted as empty; if
/// every query of the region failed the region is unreachable rather than
/// clean. Cancellation is checked before each query.
pub async fn scan_region(
    backend: &dyn SearchBackend,
    region: &str,
    compartment_id: &str,
    catalog: &ResolvedCatalog,
    settings: &ScanSettings,
    cancel: &CancellationToken,
) -> Result<RegionFinding, ScanError> {
    info!(
        event = "core.scan.region_started",
        region = region,
        priority_types = catalog.priority.len(),
        fallback_strategy = %settings.fallback_strategy
    );

    let mut scan = RegionScan {
        backend,
        compartment_id,
        settings,
        cancel,
        finding: RegionFinding::new(region),
    };

    let found = scan.scan_types(&catalog.priority, Tier::Priority).await?
        || match settings.fallback_strategy {
            FallbackStrategy::Broad => scan.scan_broad(catalog).await?,
            FallbackStrategy::PerType => scan.scan_types(&catalog.fallback, Tier::Fallback).await?,
        };

    let finding = scan.finding;
    if !found && finding.all_queries_failed() {
        let last_error = finding
            .query_failures
            .last()
            .map(|f| f.message.clone())
            .unwrap_or_default();
        warn!(
            event = "core.scan.region_unreachable",
            region = region,
            failures = finding.query_failures.len()
        );
        return Err(ScanError::RegionUnreachable {
            region: region.to_string(),
            failures: finding.query_failures.len(),
            last_error,
        });
    }

    info!(
        event = "core.scan.region_completed",
        region = region,
        found = finding.found,
        tier = %finding.tier,
        queries = finding.queries_issued,
        failures = finding.query_failures.len()
    );
    Ok(finding)
}

struct RegionScan<'a> {
    backend: &'a dyn SearchBackend,
    compartment_id: &'a str,
    settings: &'a ScanSettings,
    cancel: &'a CancellationToken,
    finding: RegionFinding,
}

impl RegionScan<'_> {
    /// Fetch one page. `None` means the search failed and was recorded.
    async fn query(
        &mut self,
        query: &SearchQuery,
        page: Option<&str>,
    ) -> Result<Option<SearchPage>, ScanError> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled {
                region: self.finding.region.clone(),
            });
        }

        self.finding.queries_issued += 1;
        match self
            .backend
            .search(&self.finding.region, query, self.settings.result_limit, page)
            .await
        {
            Ok(result) => {
                debug!(
                    event = "core.scan.query_completed",
                    region = %self.finding.region,
                    query = %query,
                    page = ?page,
                    results = result.records.len(),
                    more = result.next_page.is_some()
                );
                Ok(Some(result))
            }
            Err(e) => {
                warn!(
                    event = "core.scan.query_failed",
                    region = %self.finding.region,
                    query = %query,
                    error = %e
                );
                self.finding.query_failures.push(QueryFailure {
                    resource_type: query.resource_type().map(str::to_string),
                    message: e.to_string(),
                });
                Ok(None)
            }
        }
    }

    /// Page through `query` until a page holds records accepted by `keep`.
    ///
    /// Returns the accepted records of that page, or nothing once the pages
    /// run out or a page fails.
    async fn find_live<F>(
        &mut self,
        query: SearchQuery,
        keep: F,
    ) -> Result<Vec<ResourceRecord>, ScanError>
    where
        F: Fn(&ResourceRecord) -> bool,
    {
        let mut page: Option<String> = None;
        loop {
            let Some(result) = self.query(&query, page.as_deref()).await? else {
                return Ok(Vec::new());
            };

            let live: Vec<ResourceRecord> =
                result.records.into_iter().filter(|r| keep(r)).collect();
            if !live.is_empty() {
                return Ok(live);
            }
            match result.next_page {
                Some(next) => page = Some(next),
                None => return Ok(Vec::new()),
            }
        }
    }

    async fn scan_types(&mut self, types: &[String], tier: Tier) -> Result<bool, ScanError> {
        for resource_type in types {
            let query = SearchQuery::by_type(resource_type, self.compartment_id);
            let active = self.find_live(query, is_active).await?;
            if !active.is_empty() {
                self.record_match(tier, resource_type, active);
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn scan_broad(&mut self, catalog: &ResolvedCatalog) -> Result<bool, ScanError> {
        let active = self
            .find_live(SearchQuery::all(self.compartment_id), |r| {
                is_active(r) && catalog.is_billable_candidate(&r.resource_type)
            })
            .await?;

        match active.first().map(|r| r.resource_type.clone()) {
            Some(resource_type) => {
                self.record_match(Tier::Fallback, &resource_type, active);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn record_match(&mut self, tier: Tier, resource_type: &str, mut active: Vec<ResourceRecord>) {
        info!(
            event = "core.scan.match_found",
            region = %self.finding.region,
            tier = %tier,
            resource_type = resource_type,
            count = active.len()
        );
        active.truncate(self.settings.sample_limit);
        self.finding.found = true;
        self.finding.tier = tier;
        self.finding.matched_type = Some(resource_type.to_string());
        self.finding.samples = active;
    }
}
