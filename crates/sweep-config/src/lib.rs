//! Configuration for sweep: TOML types, file discovery, and validation.

mod errors;
mod loading;
mod types;
mod validation;

pub use errors::ConfigError;
pub use loading::{default_config_paths, load_config};
pub use types::{
    BackendConfig, BackendKind, DEFAULT_CLEANUP_COMMAND, DiscoveryConfig, FallbackStrategy,
    PipelineConfig, SweepConfig, TENANCY_ENV_VAR, UnknownRegionPolicy,
};
pub use validation::{MAX_RESULT_LIMIT, validate_config};
