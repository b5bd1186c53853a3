use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use sweep_config::UnknownRegionPolicy;

use crate::backend::SearchBackend;
use crate::catalog::ResolvedCatalog;
use crate::scan::{RegionFinding, ScanError, ScanSettings, scan_region};

use super::errors::DiscoveryError;
use super::types::{CleanupReason, DiscoveryOptions, DiscoveryReport, RegionVerdict};

/// Scan every region for live resources in a compartment.
///
/// Regions are scanned as independent tasks, at most
/// `options.max_concurrency` at a time, each bounded by
/// `options.region_timeout`. A region whose scan fails, times out, or
/// panics is reported as `Unknown`, never as clean. If `cancel` fires the
/// whole run fails with `DiscoveryError::Cancelled`.
pub async fn discover(
    backend: Arc<dyn SearchBackend>,
    compartment_id: &str,
    regions: &[String],
    catalog: Arc<ResolvedCatalog>,
    options: &DiscoveryOptions,
    cancel: &CancellationToken,
) -> Result<DiscoveryReport, DiscoveryError> {
    let regions: BTreeSet<String> = regions
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    if regions.is_empty() {
        return Err(DiscoveryError::NoRegions);
    }

    info!(
        event = "core.discovery.started",
        compartment_id = compartment_id,
        regions = regions.len(),
        max_concurrency = options.max_concurrency
    );

    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let settings = Arc::new(options.scan.clone());
    let compartment: Arc<str> = Arc::from(compartment_id);

    let mut tasks = JoinSet::new();
    let mut task_regions = HashMap::new();
    for region in &regions {
        let task = RegionTask {
            backend: Arc::clone(&backend),
            catalog: Arc::clone(&catalog),
            settings: Arc::clone(&settings),
            semaphore: Arc::clone(&semaphore),
            compartment_id: Arc::clone(&compartment),
            region: region.clone(),
            timeout: options.region_timeout,
            cancel: cancel.clone(),
        };
        let handle = tasks.spawn(task.run());
        task_regions.insert(handle.id(), region.clone());
    }

    let mut verdicts = BTreeMap::new();
    let mut cancelled = false;
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((_, (region, Ok(finding)))) => {
                let verdict = if finding.found {
                    RegionVerdict::Found(finding)
                } else {
                    RegionVerdict::Clean(finding)
                };
                verdicts.insert(region, verdict);
            }
            Ok((_, (_, Err(ScanError::Cancelled { .. })))) => cancelled = true,
            Ok((_, (region, Err(e)))) => {
                warn!(
                    event = "core.discovery.region_unknown",
                    region = %region,
                    error = %e
                );
                verdicts.insert(region, RegionVerdict::Unknown { reason: e.to_string() });
            }
            Err(e) => {
                let region = task_regions
                    .get(&e.id())
                    .cloned()
                    .unwrap_or_else(|| "<unknown>".to_string());
                error!(
                    event = "core.discovery.region_task_failed",
                    region = %region,
                    error = %e
                );
                verdicts.insert(
                    region,
                    RegionVerdict::Unknown {
                        reason: format!("scan task failed: {}", e),
                    },
                );
            }
        }
    }

    if cancelled || cancel.is_cancelled() {
        warn!(event = "core.discovery.cancelled");
        return Err(DiscoveryError::Cancelled);
    }

    let report = DiscoveryReport {
        compartment_id: compartment_id.to_string(),
        verdicts,
        skipped_types: catalog.skipped.clone(),
        completed_at: Utc::now(),
    };

    info!(
        event = "core.discovery.completed",
        found = report.found_regions().len(),
        clean = report.clean_regions().len(),
        unknown = report.unknown_regions().len()
    );
    Ok(report)
}

/// Regions to hand to cleanup, with the reason for each.
///
/// An empty map means cleanup should be skipped. Under
/// `UnknownRegionPolicy::Abort` any unknown region is an error.
pub fn plan_cleanup(
    report: &DiscoveryReport,
    policy: UnknownRegionPolicy,
) -> Result<BTreeMap<String, CleanupReason>, DiscoveryError> {
    report
        .cleanup_targets(policy)
        .ok_or_else(|| DiscoveryError::UnknownRegions {
            regions: report
                .unknown_regions()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
}

struct RegionTask {
    backend: Arc<dyn SearchBackend>,
    catalog: Arc<ResolvedCatalog>,
    settings: Arc<ScanSettings>,
    semaphore: Arc<Semaphore>,
    compartment_id: Arc<str>,
    region: String,
    timeout: Duration,
    cancel: CancellationToken,
}

impl RegionTask {
    async fn run(self) -> (String, Result<RegionFinding, ScanError>) {
        let outcome = self.scan().await;
        (self.region, outcome)
    }

    async fn scan(&self) -> Result<RegionFinding, ScanError> {
        let _permit = tokio::select! {
            permit = Arc::clone(&self.semaphore).acquire_owned() => {
                permit.map_err(|_| ScanError::Cancelled { region: self.region.clone() })?
            }
            _ = self.cancel.cancelled() => {
                return Err(ScanError::Cancelled { region: self.region.clone() });
            }
        };

        let scan = scan_region(
            self.backend.as_ref(),
            &self.region,
            &self.compartment_id,
            &self.catalog,
            &self.settings,
            &self.cancel,
        );
        // Dropping an in-flight search kills its child process.
        tokio::select! {
            result = tokio::time::timeout(self.timeout, scan) => match result {
                Ok(result) => result,
                Err(_) => Err(ScanError::TimedOut {
                    region: self.region.clone(),
                    seconds: self.timeout.as_secs(),
                }),
            },
            _ = self.cancel.cancelled() => Err(ScanError::Cancelled {
                region: self.region.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::backend::{
        BackendError, CompartmentSummary, FixtureBackend, FixtureData, ResourceRecord,
        SearchPage, SearchQuery,
    };
    use crate::catalog::{SupportedTypeCatalog, non_billable_keywords_with, resolve_catalog};
    use crate::scan::Tier;

    const LAB: &str = "ocid1.compartment.oc1..lab01";

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> Arc<ResolvedCatalog> {
        Arc::new(resolve_catalog(
            &strings(&["Instance", "Bucket"]),
            &non_billable_keywords_with(&[]),
            SupportedTypeCatalog::from_names(["Instance", "Bucket", "OdaInstance"]),
        ))
    }

    fn lab_fixture(resources: &[(&str, ResourceRecord)]) -> FixtureData {
        let mut data = FixtureData {
            regions: strings(&["us-ashburn-1", "uk-london-1"]),
            ..Default::default()
        };
        for (region, record) in resources {
            data.resources
                .entry(region.to_string())
                .or_default()
                .push(record.clone());
        }
        data
    }

    async fn run(
        backend: Arc<dyn SearchBackend>,
        regions: &[String],
        options: &DiscoveryOptions,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        discover(
            backend,
            LAB,
            regions,
            catalog(),
            options,
            &CancellationToken::new(),
        )
        .await
    }

    #[tokio::test]
    async fn test_single_region_with_bucket() {
        let data = lab_fixture(&[(
            "uk-london-1",
            ResourceRecord::new("Bucket", "lab01-bucket").in_compartment(LAB),
        )]);
        let regions = data.regions.clone();
        let backend = Arc::new(FixtureBackend::new(data));

        let report = run(backend, &regions, &DiscoveryOptions::default())
            .await
            .unwrap();
        assert_eq!(report.found_regions(), vec!["uk-london-1"]);
        assert_eq!(report.clean_regions(), vec!["us-ashburn-1"]);

        let targets = plan_cleanup(&report, UnknownRegionPolicy::Include).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets["uk-london-1"], CleanupReason::Priority);
    }

    #[tokio::test]
    async fn test_nothing_found_yields_empty_plan() {
        let data = lab_fixture(&[(
            "us-ashburn-1",
            ResourceRecord::new("Instance", "old")
                .with_state("TERMINATED")
                .in_compartment(LAB),
        )]);
        let regions = data.regions.clone();
        let backend = Arc::new(FixtureBackend::new(data));

        let report = run(backend, &regions, &DiscoveryOptions::default())
            .await
            .unwrap();
        assert!(report.found_regions().is_empty());
        assert!(
            plan_cleanup(&report, UnknownRegionPolicy::Include)
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_regions_deduplicated() {
        let data = lab_fixture(&[(
            "uk-london-1",
            ResourceRecord::new("Instance", "web").in_compartment(LAB),
        )]);
        let backend = Arc::new(FixtureBackend::new(data));
        let regions = strings(&["uk-london-1", " uk-london-1 ", ""]);

        let report = run(backend.clone(), &regions, &DiscoveryOptions::default())
            .await
            .unwrap();
        assert_eq!(report.verdicts.len(), 1);
        assert_eq!(backend.queries_in("uk-london-1").len(), 1);
    }

    #[tokio::test]
    async fn test_no_regions() {
        let backend = Arc::new(FixtureBackend::new(FixtureData::default()));
        let err = run(backend, &[], &DiscoveryOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::NoRegions));
    }

    #[tokio::test]
    async fn test_unreachable_region_is_unknown_not_clean() {
        let mut data = lab_fixture(&[]);
        data.unreachable_regions = strings(&["us-ashburn-1"]);
        let regions = data.regions.clone();
        let backend = Arc::new(FixtureBackend::new(data));

        let report = run(backend, &regions, &DiscoveryOptions::default())
            .await
            .unwrap();
        assert_eq!(report.unknown_regions(), vec!["us-ashburn-1"]);
        assert_eq!(report.clean_regions(), vec!["uk-london-1"]);

        let targets = plan_cleanup(&report, UnknownRegionPolicy::Include).unwrap();
        assert_eq!(targets["us-ashburn-1"], CleanupReason::Unknown);

        let err = plan_cleanup(&report, UnknownRegionPolicy::Abort).unwrap_err();
        match err {
            DiscoveryError::UnknownRegions { regions } => {
                assert_eq!(regions, vec!["us-ashburn-1"])
            }
            other => panic!("expected UnknownRegions, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fallback_reason_reported() {
        let data = lab_fixture(&[(
            "us-ashburn-1",
            ResourceRecord::new("OdaInstance", "bot").in_compartment(LAB),
        )]);
        let regions = data.regions.clone();
        let backend = Arc::new(FixtureBackend::new(data));

        let report = run(backend, &regions, &DiscoveryOptions::default())
            .await
            .unwrap();
        let finding = report.verdicts["us-ashburn-1"].finding().unwrap();
        assert_eq!(finding.tier, Tier::Fallback);
        let targets = plan_cleanup(&report, UnknownRegionPolicy::Abort).unwrap();
        assert_eq!(targets["us-ashburn-1"], CleanupReason::Fallback);
    }

    #[tokio::test]
    async fn test_cancelled_run_fails() {
        let data = lab_fixture(&[]);
        let regions = data.regions.clone();
        let backend = Arc::new(FixtureBackend::new(data));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = discover(
            backend,
            LAB,
            &regions,
            catalog(),
            &DiscoveryOptions::default(),
            &cancel,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DiscoveryError::Cancelled));
    }

    /// Sleeps on every search and records peak concurrency.
    struct SlowBackend {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowBackend {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchBackend for SlowBackend {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn list_resource_types(&self) -> Result<Vec<String>, BackendError> {
            Ok(Vec::new())
        }

        async fn search(
            &self,
            _region: &str,
            _query: &SearchQuery,
            _limit: u32,
            _page: Option<&str>,
        ) -> Result<SearchPage, BackendError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(SearchPage::default())
        }

        async fn list_region_subscriptions(&self) -> Result<Vec<String>, BackendError> {
            Ok(Vec::new())
        }

        async fn list_compartments(&self) -> Result<Vec<CompartmentSummary>, BackendError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let backend = Arc::new(SlowBackend::new(Duration::from_millis(20)));
        let regions = strings(&["r1", "r2", "r3", "r4", "r5", "r6"]);
        let options = DiscoveryOptions {
            max_concurrency: 2,
            ..Default::default()
        };

        let report = run(backend.clone(), &regions, &options).await.unwrap();
        assert_eq!(report.clean_regions().len(), 6);
        assert!(backend.peak.load(Ordering::SeqCst) <= 2);
        assert!(backend.peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_timed_out_region_is_unknown() {
        let backend = Arc::new(SlowBackend::new(Duration::from_secs(5)));
        let regions = strings(&["uk-london-1"]);
        let options = DiscoveryOptions {
            region_timeout: Duration::from_millis(50),
            ..Default::default()
        };

        let report = run(backend, &regions, &options).await.unwrap();
        match &report.verdicts["uk-london-1"] {
            RegionVerdict::Unknown { reason } => assert!(reason.contains("timed out")),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }
}
