use crate::errors::SweepError;

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("No regions to scan")]
    NoRegions,

    #[error("Discovery was cancelled")]
    Cancelled,

    #[error("Could not determine the state of regions: {}", regions.join(", "))]
    UnknownRegions { regions: Vec<String> },
}

impl SweepError for DiscoveryError {
    fn error_code(&self) -> &'static str {
        match self {
            DiscoveryError::NoRegions => "DISCOVERY_NO_REGIONS",
            DiscoveryError::Cancelled => "DISCOVERY_CANCELLED",
            DiscoveryError::UnknownRegions { .. } => "DISCOVERY_UNKNOWN_REGIONS",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, DiscoveryError::NoRegions | DiscoveryError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_regions_display() {
        let error = DiscoveryError::UnknownRegions {
            regions: vec!["eu-frankfurt-1".to_string(), "uk-london-1".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Could not determine the state of regions: eu-frankfurt-1, uk-london-1"
        );
        assert_eq!(error.error_code(), "DISCOVERY_UNKNOWN_REGIONS");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_cancelled_is_user_error() {
        assert!(DiscoveryError::Cancelled.is_user_error());
    }
}
