use tracing::{debug, info};

use crate::backend::{CompartmentSummary, SearchBackend};

use super::errors::CompartmentError;

const ACTIVE_STATE: &str = "ACTIVE";
const OCID_PREFIX: &str = "ocid1.";

/// Find a compartment by exact name, or by OCID when given one.
///
/// Only an ACTIVE compartment qualifies. When several share the name the
/// active one wins.
pub fn resolve_compartment<'a>(
    directory: &'a [CompartmentSummary],
    name_or_id: &str,
) -> Result<&'a CompartmentSummary, CompartmentError> {
    let wanted = name_or_id.trim();
    if wanted.is_empty() {
        return Err(CompartmentError::EmptyName);
    }

    let by_ocid = wanted.starts_with(OCID_PREFIX);
    let candidates: Vec<&CompartmentSummary> = directory
        .iter()
        .filter(|c| if by_ocid { c.id == wanted } else { c.name == wanted })
        .collect();

    if let Some(active) = candidates.iter().find(|c| is_active(c)) {
        return Ok(*active);
    }

    match candidates.first() {
        Some(inactive) => Err(CompartmentError::NotActive {
            name: wanted.to_string(),
            state: inactive
                .lifecycle_state
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        }),
        None => Err(CompartmentError::NotFound {
            name: wanted.to_string(),
        }),
    }
}

fn is_active(compartment: &CompartmentSummary) -> bool {
    compartment
        .lifecycle_state
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case(ACTIVE_STATE))
}

/// Fetch the compartment directory and resolve `name_or_id` in it.
pub async fn lookup_compartment(
    backend: &dyn SearchBackend,
    name_or_id: &str,
) -> Result<CompartmentSummary, CompartmentError> {
    info!(event = "core.compartment.lookup_started", compartment = name_or_id);

    let directory = backend
        .list_compartments()
        .await
        .map_err(|source| CompartmentError::DirectoryUnavailable { source })?;
    debug!(
        event = "core.compartment.directory_loaded",
        count = directory.len()
    );

    let found = resolve_compartment(&directory, name_or_id)?.clone();
    info!(
        event = "core.compartment.lookup_completed",
        compartment = %found.name,
        compartment_id = %found.id
    );
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FixtureBackend, FixtureData};

    fn compartment(id: &str, name: &str, state: &str) -> CompartmentSummary {
        CompartmentSummary {
            id: id.to_string(),
            name: name.to_string(),
            lifecycle_state: Some(state.to_string()),
        }
    }

    fn directory() -> Vec<CompartmentSummary> {
        vec![
            compartment("ocid1.tenancy.oc1..root", "acme", "ACTIVE"),
            compartment("ocid1.compartment.oc1..old", "LAB-01", "DELETED"),
            compartment("ocid1.compartment.oc1..lab", "LAB-01", "ACTIVE"),
            compartment("ocid1.compartment.oc1..gone", "LAB-02", "DELETED"),
        ]
    }

    #[test]
    fn test_resolve_by_name_prefers_active() {
        let dir = directory();
        let found = resolve_compartment(&dir, "LAB-01").unwrap();
        assert_eq!(found.id, "ocid1.compartment.oc1..lab");
    }

    #[test]
    fn test_resolve_trims_input() {
        let dir = directory();
        assert!(resolve_compartment(&dir, "  LAB-01\n").is_ok());
    }

    #[test]
    fn test_resolve_by_ocid() {
        let dir = directory();
        let found = resolve_compartment(&dir, "ocid1.tenancy.oc1..root").unwrap();
        assert_eq!(found.name, "acme");
    }

    #[test]
    fn test_resolve_is_case_sensitive_on_name() {
        let dir = directory();
        assert!(matches!(
            resolve_compartment(&dir, "lab-01"),
            Err(CompartmentError::NotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_inactive_only() {
        let dir = directory();
        match resolve_compartment(&dir, "LAB-02") {
            Err(CompartmentError::NotActive { state, .. }) => assert_eq!(state, "DELETED"),
            other => panic!("expected NotActive, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_empty_name() {
        assert!(matches!(
            resolve_compartment(&directory(), "  "),
            Err(CompartmentError::EmptyName)
        ));
    }

    #[tokio::test]
    async fn test_lookup_through_backend() {
        let backend = FixtureBackend::new(FixtureData {
            compartments: directory(),
            ..Default::default()
        });
        let found = lookup_compartment(&backend, "LAB-01").await.unwrap();
        assert_eq!(found.id, "ocid1.compartment.oc1..lab");
    }
}
