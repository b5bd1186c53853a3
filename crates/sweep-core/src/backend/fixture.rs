//! Backend serving canned responses from a JSON document.
//!
//! Used for dry runs against a recorded tenancy and as the test double for
//! the scanner and orchestrator. Every search is appended to a query log so
//! callers can assert how many remote calls a scan would have made.
//!
//! Searches behave like the real service: records in a terminal lifecycle
//! state never match, and results are paged with the offset of the next
//! record as the page token.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::BackendError;
use super::traits::SearchBackend;
use super::types::{CompartmentSummary, ResourceRecord, SearchPage, SearchQuery};
use crate::lifecycle::is_active;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureData {
    pub resource_types: Vec<String>,
    pub regions: Vec<String>,
    pub compartments: Vec<CompartmentSummary>,
    /// Resources per region.
    pub resources: BTreeMap<String, Vec<ResourceRecord>>,
    /// Type names whose queries fail, per region. `*` fails the broad query.
    pub failing_types: BTreeMap<String, Vec<String>>,
    /// Regions where every search fails.
    pub unreachable_regions: Vec<String>,
    /// When set, listing resource types fails.
    pub catalog_unavailable: bool,
}

/// One search as seen by the fixture backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedQuery {
    pub region: String,
    pub query: SearchQuery,
    pub limit: u32,
    pub page: Option<String>,
}

pub struct FixtureBackend {
    data: FixtureData,
    log: Mutex<Vec<LoggedQuery>>,
}

impl FixtureBackend {
    pub fn new(data: FixtureData) -> Self {
        Self {
            data,
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, BackendError> {
        let load_failed = |message: String| BackendError::FixtureLoadFailed {
            path: path.display().to_string(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
        let data: FixtureData =
            serde_json::from_str(&content).map_err(|e| load_failed(e.to_string()))?;

        debug!(
            event = "core.backend.fixture_loaded",
            path = %path.display(),
            regions = data.regions.len(),
            resource_types = data.resource_types.len()
        );
        Ok(Self::new(data))
    }

    /// Every search issued so far, in order.
    pub fn queries(&self) -> Vec<LoggedQuery> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Searches issued against one region.
    pub fn queries_in(&self, region: &str) -> Vec<LoggedQuery> {
        self.queries()
            .into_iter()
            .filter(|q| q.region == region)
            .collect()
    }

    fn record(&self, region: &str, query: &SearchQuery, limit: u32, page: Option<&str>) {
        if let Ok(mut log) = self.log.lock() {
            log.push(LoggedQuery {
                region: region.to_string(),
                query: query.clone(),
                limit,
                page: page.map(str::to_string),
            });
        }
    }

    fn should_fail(&self, region: &str, query: &SearchQuery) -> bool {
        if self.data.unreachable_regions.iter().any(|r| r == region) {
            return true;
        }
        let Some(failing) = self.data.failing_types.get(region) else {
            return false;
        };
        let key = query.resource_type().unwrap_or("*");
        failing.iter().any(|t| t.eq_ignore_ascii_case(key))
    }
}

#[async_trait]
impl SearchBackend for FixtureBackend {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn list_resource_types(&self) -> Result<Vec<String>, BackendError> {
        if self.data.catalog_unavailable {
            return Err(BackendError::CommandFailed {
                command: "list resource types".to_string(),
                code: "1".to_string(),
                stderr: "catalog unavailable".to_string(),
            });
        }
        Ok(self.data.resource_types.clone())
    }

    async fn search(
        &self,
        region: &str,
        query: &SearchQuery,
        limit: u32,
        page: Option<&str>,
    ) -> Result<SearchPage, BackendError> {
        self.record(region, query, limit, page);

        if self.should_fail(region, query) {
            return Err(BackendError::SearchFailed {
                region: region.to_string(),
                message: format!("simulated failure for '{}'", query),
            });
        }

        let offset = match page {
            Some(token) => token.parse::<usize>().map_err(|_| BackendError::SearchFailed {
                region: region.to_string(),
                message: format!("invalid page token '{}'", token),
            })?,
            None => 0,
        };

        let matching: Vec<&ResourceRecord> = self
            .data
            .resources
            .get(region)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| {
                        r.compartment_id
                            .as_deref()
                            .is_none_or(|c| c == query.compartment_id())
                    })
                    .filter(|r| {
                        query
                            .resource_type()
                            .is_none_or(|t| r.resource_type.eq_ignore_ascii_case(t))
                    })
                    .filter(|r| is_active(r))
                    .collect()
            })
            .unwrap_or_default();

        let end = offset.saturating_add(limit as usize).min(matching.len());
        let records = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|r| (*r).clone())
            .collect();
        let next_page = (end < matching.len()).then(|| end.to_string());
        Ok(SearchPage { records, next_page })
    }

    async fn list_region_subscriptions(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.data.regions.clone())
    }

    async fn list_compartments(&self) -> Result<Vec<CompartmentSummary>, BackendError> {
        Ok(self.data.compartments.clone())
    }
}
