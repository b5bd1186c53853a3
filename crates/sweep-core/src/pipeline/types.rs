use serde::{Deserialize, Serialize};

pub const COMPARTMENT_PLACEHOLDER: &str = "{compartment}";
pub const REGIONS_PLACEHOLDER: &str = "{regions}";

/// What the cleanup executor is asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupRequest {
    pub compartment_name: String,
    /// Sorted and deduplicated.
    pub regions: Vec<String>,
}

impl CleanupRequest {
    pub fn new<I>(compartment_name: impl Into<String>, regions: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut regions: Vec<String> = regions.into_iter().collect();
        regions.sort();
        regions.dedup();
        Self {
            compartment_name: compartment_name.into(),
            regions,
        }
    }

    /// Comma-joined region list, as passed to the executor.
    pub fn region_argument(&self) -> String {
        self.regions.join(",")
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// Nothing to clean; the executor was not started.
    Skipped,
    /// The executor ran and exited successfully.
    Completed { command: Vec<String> },
    /// The executor would have run this command.
    DryRun { command: Vec<String> },
}

/// Substitute placeholders in an argv template.
pub fn render_command(template: &[String], compartment: &str, regions: &str) -> Vec<String> {
    template
        .iter()
        .map(|arg| {
            arg.replace(COMPARTMENT_PLACEHOLDER, compartment)
                .replace(REGIONS_PLACEHOLDER, regions)
        })
        .collect()
}
