use crate::backend::BackendError;
use crate::errors::SweepError;

#[derive(Debug, thiserror::Error)]
pub enum CompartmentError {
    #[error("Compartment '{name}' not found")]
    NotFound { name: String },

    #[error("Compartment '{name}' is not active (state: {state})")]
    NotActive { name: String, state: String },

    #[error("Compartment name cannot be empty")]
    EmptyName,

    #[error("Failed to list compartments: {source}")]
    DirectoryUnavailable {
        #[source]
        source: BackendError,
    },
}

impl SweepError for CompartmentError {
    fn error_code(&self) -> &'static str {
        match self {
            CompartmentError::NotFound { .. } => "COMPARTMENT_NOT_FOUND",
            CompartmentError::NotActive { .. } => "COMPARTMENT_NOT_ACTIVE",
            CompartmentError::EmptyName => "COMPARTMENT_EMPTY_NAME",
            CompartmentError::DirectoryUnavailable { .. } => "COMPARTMENT_DIRECTORY_UNAVAILABLE",
        }
    }

    fn is_user_error(&self) -> bool {
        !matches!(self, CompartmentError::DirectoryUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let error = CompartmentError::NotFound {
            name: "OCI-LAB-01".to_string(),
        };
        assert_eq!(error.to_string(), "Compartment 'OCI-LAB-01' not found");
        assert_eq!(error.error_code(), "COMPARTMENT_NOT_FOUND");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_directory_unavailable_is_not_user_error() {
        let error = CompartmentError::DirectoryUnavailable {
            source: BackendError::MissingTenancy,
        };
        assert!(!error.is_user_error());
    }
}
