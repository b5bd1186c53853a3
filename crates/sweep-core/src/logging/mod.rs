use tracing_subscriber::EnvFilter;

/// Set to `json` to emit one JSON object per log line.
pub const LOG_FORMAT_ENV: &str = "SWEEP_LOG_FORMAT";

const QUIET_FILTER: &str = "error";
const VERBOSE_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// Logs go to stderr so stdout stays reserved for reports. `RUST_LOG`
/// overrides the quiet/verbose default. Calling this twice is a no-op.
pub fn init_logging(quiet: bool) {
    let default_filter = if quiet { QUIET_FILTER } else { VERBOSE_FILTER };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if json_requested() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    // Already installed (tests, repeated init) is fine.
    let _ = result;
}

fn json_requested() -> bool {
    std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_requested() {
        temp_env::with_var(LOG_FORMAT_ENV, Some("JSON"), || {
            assert!(json_requested());
        });
        temp_env::with_var(LOG_FORMAT_ENV, Some("pretty"), || {
            assert!(!json_requested());
        });
        temp_env::with_var_unset(LOG_FORMAT_ENV, || {
            assert!(!json_requested());
        });
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(true);
        init_logging(false);
    }
}
