use std::collections::BTreeMap;

use serde::Serialize;

use sweep_core::catalog::SkippedType;
use sweep_core::{CleanupOutcome, CleanupReason, CompartmentSummary, DiscoveryReport};

/// Discovery report for JSON output (used by discover and run).
#[derive(Serialize)]
pub struct DiscoveryOutput<'a> {
    pub compartment: &'a CompartmentSummary,
    #[serde(flatten)]
    pub report: &'a DiscoveryReport,
    /// `None` when unknown regions block cleanup.
    pub cleanup_regions: Option<&'a BTreeMap<String, CleanupReason>>,
}

#[derive(Serialize)]
pub struct RunOutput<'a> {
    #[serde(flatten)]
    pub discovery: DiscoveryOutput<'a>,
    pub pre_clean_ran: bool,
    pub cleanup: &'a CleanupOutcome,
}

#[derive(Serialize)]
pub struct TypesOutput<'a> {
    pub supported_count: usize,
    pub priority: &'a [String],
    pub skipped: &'a [SkippedType],
    pub fallback: &'a [String],
    pub non_billable_keywords: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_discovery_output_flattens_report() {
        let compartment = CompartmentSummary {
            id: "ocid1.compartment.oc1..lab01".to_string(),
            name: "LAB-01".to_string(),
            lifecycle_state: Some("ACTIVE".to_string()),
        };
        let report = DiscoveryReport {
            compartment_id: compartment.id.clone(),
            verdicts: BTreeMap::new(),
            skipped_types: Vec::new(),
            completed_at: Utc::now(),
        };
        let mut targets = BTreeMap::new();
        targets.insert("uk-london-1".to_string(), CleanupReason::Priority);

        let output = DiscoveryOutput {
            compartment: &compartment,
            report: &report,
            cleanup_regions: Some(&targets),
        };
        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["compartment"]["name"], "LAB-01");
        assert_eq!(value["compartment_id"], "ocid1.compartment.oc1..lab01");
        assert_eq!(value["cleanup_regions"]["uk-london-1"], "priority");
    }

    #[test]
    fn test_run_output_includes_outcome() {
        let compartment = CompartmentSummary {
            id: "ocid1.compartment.oc1..lab01".to_string(),
            name: "LAB-01".to_string(),
            lifecycle_state: None,
        };
        let report = DiscoveryReport {
            compartment_id: compartment.id.clone(),
            verdicts: BTreeMap::new(),
            skipped_types: Vec::new(),
            completed_at: Utc::now(),
        };
        let outcome = CleanupOutcome::Skipped;
        let empty = BTreeMap::new();

        let output = RunOutput {
            discovery: DiscoveryOutput {
                compartment: &compartment,
                report: &report,
                cleanup_regions: Some(&empty),
            },
            pre_clean_ran: false,
            cleanup: &outcome,
        };
        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["cleanup"]["outcome"], "skipped");
        assert_eq!(value["pre_clean_ran"], false);
    }
}
