use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default argv for the downstream cleanup executor.
pub const DEFAULT_CLEANUP_COMMAND: [&str; 5] =
    ["./cleanup.py", "-c", "{compartment}", "-r", "{regions}"];

/// Environment variable consulted when `backend.tenancy_id` is unset.
pub const TENANCY_ENV_VAR: &str = "OCI_TENANCY";

/// Top-level configuration, as read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub backend: BackendConfig,
    pub discovery: DiscoveryConfig,
    pub pipeline: PipelineConfig,
}

/// Which search backend the discovery run talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Shell out to the `oci` command line tool.
    #[default]
    OciCli,
    /// Serve canned responses from a JSON fixture file.
    Fixture,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::OciCli => "oci-cli",
            BackendKind::Fixture => "fixture",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "oci-cli" | "oci" => Ok(BackendKind::OciCli),
            "fixture" => Ok(BackendKind::Fixture),
            _ => Err(format!(
                "Unknown backend '{}'. Known backends: oci-cli, fixture",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Name or path of the OCI CLI binary.
    pub oci_bin: String,
    /// Profile from `~/.oci/config` passed as `--profile`.
    pub profile: Option<String>,
    /// Tenancy OCID; root of the compartment directory.
    pub tenancy_id: Option<String>,
    pub fixture_path: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            oci_bin: "oci".to_string(),
            profile: None,
            tenancy_id: None,
            fixture_path: None,
        }
    }
}

impl BackendConfig {
    /// Tenancy OCID from config, falling back to `$OCI_TENANCY`.
    pub fn tenancy_id(&self) -> Option<String> {
        self.tenancy_id
            .clone()
            .or_else(|| std::env::var(TENANCY_ENV_VAR).ok())
            .filter(|id| !id.trim().is_empty())
    }
}

/// How a region is searched once the priority tier comes back empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackStrategy {
    /// One `query all resources` call per region.
    #[default]
    Broad,
    /// One query per fallback type, stopping at the first match.
    PerType,
}

impl FallbackStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackStrategy::Broad => "broad",
            FallbackStrategy::PerType => "per-type",
        }
    }
}

impl std::fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FallbackStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "broad" => Ok(FallbackStrategy::Broad),
            "per-type" | "pertype" => Ok(FallbackStrategy::PerType),
            _ => Err(format!(
                "Unknown fallback strategy '{}'. Known strategies: broad, per-type",
                s
            )),
        }
    }
}

/// What to do with regions whose scan ended without a verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownRegionPolicy {
    /// Hand the region to cleanup anyway.
    #[default]
    Include,
    /// Fail the run before cleanup.
    Abort,
}

impl std::str::FromStr for UnknownRegionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "include" => Ok(UnknownRegionPolicy::Include),
            "abort" => Ok(UnknownRegionPolicy::Abort),
            _ => Err(format!(
                "Unknown region policy '{}'. Known policies: include, abort",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Max records requested per search query.
    pub result_limit: u32,
    /// Max sample records kept per region for reporting.
    pub sample_limit: usize,
    /// Max regions scanned at once.
    pub max_concurrency: usize,
    pub region_timeout_secs: u64,
    pub fallback_strategy: FallbackStrategy,
    pub on_unknown_region: UnknownRegionPolicy,
    pub extra_priority_types: Vec<String>,
    pub extra_non_billable_keywords: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            result_limit: 25,
            sample_limit: 10,
            max_concurrency: 4,
            region_timeout_secs: 120,
            fallback_strategy: FallbackStrategy::default(),
            on_unknown_region: UnknownRegionPolicy::default(),
            extra_priority_types: Vec::new(),
            extra_non_billable_keywords: Vec::new(),
        }
    }
}

/// External commands run around discovery.
///
/// Each command is an argv list; `{compartment}` and `{regions}` are
/// substituted before the process is spawned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub pre_clean: Option<Vec<String>>,
    pub cleanup: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pre_clean: None,
            cleanup: DEFAULT_CLEANUP_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }
}
