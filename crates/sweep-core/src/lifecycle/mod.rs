//! Lifecycle-state classification of search results.

use crate::backend::ResourceRecord;

/// States that mean a resource no longer costs anything.
pub const TERMINAL_STATES: [&str; 3] = ["TERMINATED", "DELETED", "INACTIVE"];

/// Whether a lifecycle state counts as live.
///
/// A missing or blank state is live: some resource kinds never report one.
pub fn is_active_state(state: Option<&str>) -> bool {
    match state.map(str::trim) {
        None | Some("") => true,
        Some(state) => {
            let upper = state.to_uppercase();
            !TERMINAL_STATES.contains(&upper.as_str())
        }
    }
}

pub fn is_active(record: &ResourceRecord) -> bool {
    is_active_state(record.lifecycle_state.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty_state_is_active() {
        assert!(is_active_state(None));
        assert!(is_active_state(Some("")));
        assert!(is_active_state(Some("   ")));
    }

    #[test]
    fn test_terminal_states_any_case() {
        for state in [
            "terminated",
            "TERMINATED",
            "Terminated",
            "Deleted",
            "DELETED",
            "inactive",
            "InActive",
        ] {
            assert!(!is_active_state(Some(state)), "{state} should be terminal");
        }
    }

    #[test]
    fn test_live_states() {
        for state in ["ACTIVE", "RUNNING", "available", "Stopped", "PROVISIONING", "TERMINATING"] {
            assert!(is_active_state(Some(state)), "{state} should be live");
        }
    }

    #[test]
    fn test_is_active_record() {
        let record = ResourceRecord::new("Instance", "web-1");
        assert!(is_active(&record));
        assert!(!is_active(&record.clone().with_state("terminated")));
        assert!(is_active(&record.with_state("RUNNING")));
    }
}
