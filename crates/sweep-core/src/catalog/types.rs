use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Resource kinds known to bill or to hold other billable resources.
pub const PRIORITY_TYPES: &[&str] = &[
    // Compute & storage
    "Instance",
    "BootVolume",
    "Volume",
    "Image",
    "InstancePool",
    "VolumeBackup",
    "BootVolumeBackup",
    "VolumeGroup",
    // Database
    "DbSystem",
    "AutonomousDatabase",
    "AutonomousDatabaseBackup",
    // Load balancing
    "LoadBalancer",
    // Object and file storage
    "Bucket",
    "FileSystem",
    "MountTarget",
    // Streaming
    "Stream",
    "StreamPool",
    // Vault & security
    "Vault",
    "Key",
    "Secret",
    // Containers
    "Cluster",
    "NodePool",
    // Analytics / integration
    "AnalyticsInstance",
    "IntegrationInstance",
    // Serverless & APIs
    "Function",
    "ApiGateway",
    "ApiDeployment",
    // Monitoring / logging
    "Alarm",
    "LogGroup",
    "Log",
    // Networking
    "Vcn",
    "Subnet",
    "Drg",
    "InternetGateway",
    "NATGateway",
    "ServiceGateway",
    "RouteTable",
    "SecurityList",
    // Connectors
    "ServiceConnector",
    "Bastion",
];

/// Substrings marking catalog entries that can never bill.
pub const NON_BILLABLE_KEYWORDS: &[&str] =
    &["compartment", "tag", "policy", "group", "user", "tenancy"];

/// The backend's resource types keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedTypeCatalog {
    by_lower: BTreeMap<String, String>,
}

impl SupportedTypeCatalog {
    /// Build from backend names. The first spelling of a duplicate wins.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut by_lower = BTreeMap::new();
        for name in names {
            let name = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                continue;
            }
            by_lower
                .entry(trimmed.to_lowercase())
                .or_insert_with(|| trimmed.to_string());
        }
        Self { by_lower }
    }

    /// Backend spelling of `name`, matched case-insensitively.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.by_lower
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical(name).is_some()
    }

    /// Canonical names ordered by their lower-cased form.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_lower.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_lower.is_empty()
    }
}

/// A curated priority type the backend does not support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedType {
    pub name: String,
    pub reason: String,
}

/// Immutable snapshot of the type tiers for one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCatalog {
    pub supported: SupportedTypeCatalog,
    /// Priority types in curated order, canonical spelling.
    pub priority: Vec<String>,
    /// Remaining billable candidates, lexicographically ordered.
    pub fallback: Vec<String>,
    pub skipped: Vec<SkippedType>,
    /// Lower-cased non-billable keywords in effect.
    pub non_billable_keywords: Vec<String>,
}

impl ResolvedCatalog {
    pub fn is_priority(&self, name: &str) -> bool {
        self.priority.iter().any(|p| p.eq_ignore_ascii_case(name))
    }

    /// Whether a type name contains a non-billable keyword.
    pub fn is_non_billable(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.non_billable_keywords
            .iter()
            .any(|keyword| lower.contains(keyword.as_str()))
    }

    /// Whether a result of this type can justify cleanup.
    ///
    /// Priority types always can, even when their name happens to contain
    /// a keyword (`LogGroup`).
    pub fn is_billable_candidate(&self, name: &str) -> bool {
        self.is_priority(name) || !self.is_non_billable(name)
    }
}
