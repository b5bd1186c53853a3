use serde::{Deserialize, Serialize};

use crate::lifecycle::TERMINAL_STATES;

/// One resource returned by a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub resource_type: String,
    #[serde(default)]
    pub display_name: String,
    /// Absent for resource kinds that do not expose a lifecycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compartment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl ResourceRecord {
    pub fn new(resource_type: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            display_name: display_name.into(),
            lifecycle_state: None,
            compartment_id: None,
            identifier: None,
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.lifecycle_state = Some(state.into());
        self
    }

    pub fn in_compartment(mut self, compartment_id: impl Into<String>) -> Self {
        self.compartment_id = Some(compartment_id.into());
        self
    }

    /// State for display; `-` when the backend omitted it.
    pub fn state_label(&self) -> &str {
        match self.lifecycle_state.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => "-",
        }
    }
}

/// An entry of the tenancy's compartment directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompartmentSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
}

/// A structured resource search, scoped to one compartment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Resources of one type.
    ByType {
        resource_type: String,
        compartment_id: String,
    },
    /// Resources of every type.
    All { compartment_id: String },
}

impl SearchQuery {
    pub fn by_type(resource_type: &str, compartment_id: &str) -> Self {
        SearchQuery::ByType {
            resource_type: resource_type.to_string(),
            compartment_id: compartment_id.to_string(),
        }
    }

    pub fn all(compartment_id: &str) -> Self {
        SearchQuery::All {
            compartment_id: compartment_id.to_string(),
        }
    }

    pub fn compartment_id(&self) -> &str {
        match self {
            SearchQuery::ByType { compartment_id, .. } | SearchQuery::All { compartment_id } => {
                compartment_id
            }
        }
    }

    pub fn resource_type(&self) -> Option<&str> {
        match self {
            SearchQuery::ByType { resource_type, .. } => Some(resource_type),
            SearchQuery::All { .. } => None,
        }
    }

    /// Render in the structured search query language.
    ///
    /// Terminal lifecycle states are excluded server-side so a page of
    /// results is not used up by resources that no longer exist.
    pub fn to_query_text(&self) -> String {
        let target = match self {
            SearchQuery::ByType { resource_type, .. } => resource_type.as_str(),
            SearchQuery::All { .. } => "all",
        };
        let mut text = format!(
            "query {} resources where compartmentId = '{}'",
            target,
            self.compartment_id()
        );
        for state in TERMINAL_STATES {
            text.push_str(&format!(" && lifecycleState != '{}'", state));
        }
        text
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub records: Vec<ResourceRecord>,
    /// Token for the next page; `None` on the last one.
    pub next_page: Option<String>,
}

impl SearchPage {
    pub fn last(records: Vec<ResourceRecord>) -> Self {
        Self {
            records,
            next_page: None,
        }
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_query_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_text() {
        let q = SearchQuery::by_type("Bucket", "ocid1.compartment.oc1..lab");
        assert_eq!(
            q.to_query_text(),
            "query Bucket resources where compartmentId = 'ocid1.compartment.oc1..lab' \
             && lifecycleState != 'TERMINATED' && lifecycleState != 'DELETED' \
             && lifecycleState != 'INACTIVE'"
        );
        assert_eq!(q.resource_type(), Some("Bucket"));

        let all = SearchQuery::all("ocid1.compartment.oc1..lab");
        assert!(
            all.to_string()
                .starts_with("query all resources where compartmentId = 'ocid1.compartment.oc1..lab' && ")
        );
        assert!(all.to_string().contains("lifecycleState != 'TERMINATED'"));
        assert_eq!(all.resource_type(), None);
        assert_eq!(all.compartment_id(), "ocid1.compartment.oc1..lab");
    }

    #[test]
    fn test_state_label() {
        let record = ResourceRecord::new("Instance", "web-1");
        assert_eq!(record.state_label(), "-");
        assert_eq!(record.clone().with_state("").state_label(), "-");
        assert_eq!(record.with_state("RUNNING").state_label(), "RUNNING");
    }

    #[test]
    fn test_record_deserialize_without_optional_fields() {
        let record: ResourceRecord =
            serde_json::from_str(r#"{"resource_type":"Vcn"}"#).unwrap();
        assert_eq!(record.resource_type, "Vcn");
        assert_eq!(record.display_name, "");
        assert!(record.lifecycle_state.is_none());
    }
}
