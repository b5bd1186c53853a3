pub mod errors;
pub mod fixture;
pub mod oci_cli;
pub mod traits;
pub mod types;

use std::sync::Arc;

use tracing::info;

use sweep_config::{BackendConfig, BackendKind};

// Re-export public API
pub use errors::BackendError;
pub use fixture::{FixtureBackend, FixtureData, LoggedQuery};
pub use oci_cli::OciCliBackend;
pub use traits::SearchBackend;
pub use types::{CompartmentSummary, ResourceRecord, SearchPage, SearchQuery};

/// Construct the backend selected by configuration.
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn SearchBackend>, BackendError> {
    let backend: Arc<dyn SearchBackend> = match config.kind {
        BackendKind::OciCli => {
            let backend = OciCliBackend::from_config(config);
            backend.ensure_available()?;
            Arc::new(backend)
        }
        BackendKind::Fixture => {
            let path = config
                .fixture_path
                .as_deref()
                .ok_or_else(|| BackendError::FixtureLoadFailed {
                    path: String::new(),
                    message: "no fixture path configured".to_string(),
                })?;
            Arc::new(FixtureBackend::from_file(path)?)
        }
    };

    info!(event = "core.backend.selected", backend = backend.name());
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_fixture_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.json");
        std::fs::write(&path, "{}").unwrap();

        let config = BackendConfig {
            kind: BackendKind::Fixture,
            fixture_path: Some(path),
            ..Default::default()
        };
        let backend = build_backend(&config).unwrap();
        assert_eq!(backend.name(), "fixture");
    }

    #[test]
    fn test_build_fixture_backend_without_path() {
        let config = BackendConfig {
            kind: BackendKind::Fixture,
            ..Default::default()
        };
        assert!(matches!(
            build_backend(&config),
            Err(BackendError::FixtureLoadFailed { .. })
        ));
    }

    #[test]
    fn test_build_oci_backend_missing_binary() {
        let config = BackendConfig {
            oci_bin: "definitely-not-an-oci-binary-xyz".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            build_backend(&config),
            Err(BackendError::ToolNotFound { .. })
        ));
    }
}
