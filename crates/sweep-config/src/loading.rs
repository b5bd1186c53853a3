use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::types::SweepConfig;
use crate::validation::validate_config;

const CONFIG_DIR: &str = ".sweep";
const CONFIG_FILE: &str = "config.toml";

/// Candidate config locations, most specific first.
///
/// `./.sweep/config.toml` wins over `~/.sweep/config.toml`.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_DIR).join(CONFIG_FILE)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(CONFIG_DIR).join(CONFIG_FILE));
    }
    paths
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the first existing default
/// location is used, and built-in defaults apply when none exists.
/// The result is always validated.
pub fn load_config(explicit: Option<&Path>) -> Result<SweepConfig, ConfigError> {
    let config = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::ConfigNotFound {
                    path: path.display().to_string(),
                });
            }
            load_config_file(path)?
        }
        None => match default_config_paths().into_iter().find(|p| p.exists()) {
            Some(path) => load_config_file(&path)?,
            None => {
                debug!(event = "config.load_defaults");
                SweepConfig::default()
            }
        },
    };

    validate_config(&config)?;
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<SweepConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: SweepConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
            message: format!("{}: {}", path.display(), e),
        })?;

    info!(event = "config.load_completed", path = %path.display());
    Ok(config)
}
