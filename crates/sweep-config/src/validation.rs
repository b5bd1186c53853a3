use crate::errors::ConfigError;
use crate::types::{BackendKind, SweepConfig};

/// Upper bound accepted by the resource search API for one page.
pub const MAX_RESULT_LIMIT: u32 = 1000;

pub fn validate_config(config: &SweepConfig) -> Result<(), ConfigError> {
    let discovery = &config.discovery;

    if discovery.result_limit == 0 || discovery.result_limit > MAX_RESULT_LIMIT {
        return Err(invalid(format!(
            "discovery.result_limit must be between 1 and {}, got {}",
            MAX_RESULT_LIMIT, discovery.result_limit
        )));
    }

    if discovery.sample_limit == 0 {
        return Err(invalid("discovery.sample_limit must be at least 1"));
    }

    if discovery.max_concurrency == 0 {
        return Err(invalid("discovery.max_concurrency must be at least 1"));
    }

    if discovery.region_timeout_secs == 0 {
        return Err(invalid("discovery.region_timeout_secs must be at least 1"));
    }

    if discovery
        .extra_non_billable_keywords
        .iter()
        .any(|k| k.trim().is_empty())
    {
        return Err(invalid(
            "discovery.extra_non_billable_keywords must not contain empty keywords",
        ));
    }

    if config.pipeline.cleanup.is_empty() {
        return Err(invalid("pipeline.cleanup must name a command"));
    }

    if config
        .pipeline
        .pre_clean
        .as_ref()
        .is_some_and(|cmd| cmd.is_empty())
    {
        return Err(invalid("pipeline.pre_clean must name a command when set"));
    }

    if config.backend.kind == BackendKind::Fixture && config.backend.fixture_path.is_none() {
        return Err(invalid("backend.fixture_path is required for the fixture backend"));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidConfiguration {
        message: message.into(),
    }
}
