use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sweep_config::{DiscoveryConfig, UnknownRegionPolicy};

use crate::catalog::SkippedType;
use crate::scan::{RegionFinding, ScanSettings};

/// Final state of one region after a discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum RegionVerdict {
    /// Live resources exist.
    Found(RegionFinding),
    /// Scanned to completion without a live match.
    Clean(RegionFinding),
    /// The scan did not complete; the region may still hold resources.
    Unknown { reason: String },
}

impl RegionVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            RegionVerdict::Found(_) => "found",
            RegionVerdict::Clean(_) => "clean",
            RegionVerdict::Unknown { .. } => "unknown",
        }
    }

    pub fn finding(&self) -> Option<&RegionFinding> {
        match self {
            RegionVerdict::Found(f) | RegionVerdict::Clean(f) => Some(f),
            RegionVerdict::Unknown { .. } => None,
        }
    }
}

/// Why a region is handed to cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupReason {
    Priority,
    Fallback,
    Unknown,
}

impl CleanupReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CleanupReason::Priority => "priority",
            CleanupReason::Fallback => "fallback",
            CleanupReason::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CleanupReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate result of scanning every region for one compartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub compartment_id: String,
    /// Keyed by region id, so iteration is sorted.
    pub verdicts: BTreeMap<String, RegionVerdict>,
    pub skipped_types: Vec<SkippedType>,
    pub completed_at: DateTime<Utc>,
}

impl DiscoveryReport {
    pub fn found_regions(&self) -> Vec<&str> {
        self.regions_where(|v| matches!(v, RegionVerdict::Found(_)))
    }

    pub fn unknown_regions(&self) -> Vec<&str> {
        self.regions_where(|v| matches!(v, RegionVerdict::Unknown { .. }))
    }

    pub fn clean_regions(&self) -> Vec<&str> {
        self.regions_where(|v| matches!(v, RegionVerdict::Clean(_)))
    }

    fn regions_where(&self, pred: impl Fn(&RegionVerdict) -> bool) -> Vec<&str> {
        self.verdicts
            .iter()
            .filter(|(_, v)| pred(v))
            .map(|(r, _)| r.as_str())
            .collect()
    }

    /// Regions to clean and why, under `policy` for unknown regions.
    ///
    /// Returns `None` when the policy is `Abort` and a region is unknown.
    pub fn cleanup_targets(
        &self,
        policy: UnknownRegionPolicy,
    ) -> Option<BTreeMap<String, CleanupReason>> {
        let mut targets = BTreeMap::new();
        for (region, verdict) in &self.verdicts {
            let reason = match verdict {
                RegionVerdict::Found(f) => match f.tier {
                    crate::scan::Tier::Fallback => CleanupReason::Fallback,
                    _ => CleanupReason::Priority,
                },
                RegionVerdict::Clean(_) => continue,
                RegionVerdict::Unknown { .. } => match policy {
                    UnknownRegionPolicy::Include => CleanupReason::Unknown,
                    UnknownRegionPolicy::Abort => return None,
                },
            };
            targets.insert(region.clone(), reason);
        }
        Some(targets)
    }
}

/// Everything the orchestrator needs besides the backend and catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    pub scan: ScanSettings,
    pub max_concurrency: usize,
    pub region_timeout: Duration,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

impl From<&DiscoveryConfig> for DiscoveryOptions {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            scan: ScanSettings::from(config),
            max_concurrency: config.max_concurrency.max(1),
            region_timeout: Duration::from_secs(config.region_timeout_secs),
        }
    }
}
