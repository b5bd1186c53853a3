use serde::{Deserialize, Serialize};

use sweep_config::{DiscoveryConfig, FallbackStrategy};

use crate::backend::ResourceRecord;

/// Which pass of a region scan produced the first live resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Priority,
    Fallback,
    None,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Priority => "priority",
            Tier::Fallback => "fallback",
            Tier::None => "none",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A search that failed and was treated as "no results".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFailure {
    /// `None` for the broad all-types query.
    pub resource_type: Option<String>,
    pub message: String,
}

/// Outcome of scanning one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionFinding {
    pub region: String,
    pub found: bool,
    pub tier: Tier,
    /// Type of the first live match, if any.
    pub matched_type: Option<String>,
    /// Live records from the matching query, capped at the sample limit.
    pub samples: Vec<ResourceRecord>,
    pub queries_issued: usize,
    pub query_failures: Vec<QueryFailure>,
}

impl RegionFinding {
    pub fn new(region: &str) -> Self {
        Self {
            region: region.to_string(),
            found: false,
            tier: Tier::None,
            matched_type: None,
            samples: Vec::new(),
            queries_issued: 0,
            query_failures: Vec::new(),
        }
    }

    /// Every issued query failed, so "nothing found" proves nothing.
    pub fn all_queries_failed(&self) -> bool {
        self.queries_issued > 0 && self.query_failures.len() == self.queries_issued
    }
}

/// Knobs for a single region scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    pub result_limit: u32,
    pub sample_limit: usize,
    pub fallback_strategy: FallbackStrategy,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

impl From<&DiscoveryConfig> for ScanSettings {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            result_limit: config.result_limit,
            sample_limit: config.sample_limit,
            fallback_strategy: config.fallback_strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_serde() {
        assert_eq!(serde_json::to_string(&Tier::Priority).unwrap(), "\"priority\"");
        assert_eq!(Tier::Fallback.to_string(), "fallback");
        let parsed: Tier = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(parsed, Tier::None);
    }

    #[test]
    fn test_all_queries_failed() {
        let mut finding = RegionFinding::new("us-ashburn-1");
        assert!(!finding.all_queries_failed());

        finding.queries_issued = 2;
        finding.query_failures.push(QueryFailure {
            resource_type: Some("Instance".to_string()),
            message: "timeout".to_string(),
        });
        assert!(!finding.all_queries_failed());

        finding.query_failures.push(QueryFailure {
            resource_type: None,
            message: "timeout".to_string(),
        });
        assert!(finding.all_queries_failed());
    }

    #[test]
    fn test_settings_from_config() {
        let settings = ScanSettings::default();
        assert_eq!(settings.result_limit, 25);
        assert_eq!(settings.sample_limit, 10);
        assert_eq!(settings.fallback_strategy, FallbackStrategy::Broad);
    }
}
