use crate::errors::SweepError;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Scan of region '{region}' was cancelled")]
    Cancelled { region: String },

    #[error("All {failures} queries in region '{region}' failed; last error: {last_error}")]
    RegionUnreachable {
        region: String,
        failures: usize,
        last_error: String,
    },

    #[error("Scan of region '{region}' timed out after {seconds}s")]
    TimedOut { region: String, seconds: u64 },
}

impl SweepError for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            ScanError::Cancelled { .. } => "SCAN_CANCELLED",
            ScanError::RegionUnreachable { .. } => "SCAN_REGION_UNREACHABLE",
            ScanError::TimedOut { .. } => "SCAN_TIMED_OUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_unreachable_display() {
        let error = ScanError::RegionUnreachable {
            region: "uk-london-1".to_string(),
            failures: 3,
            last_error: "503".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "All 3 queries in region 'uk-london-1' failed; last error: 503"
        );
        assert_eq!(error.error_code(), "SCAN_REGION_UNREACHABLE");
    }

    #[test]
    fn test_timed_out_display() {
        let error = ScanError::TimedOut {
            region: "us-ashburn-1".to_string(),
            seconds: 120,
        };
        assert_eq!(
            error.to_string(),
            "Scan of region 'us-ashburn-1' timed out after 120s"
        );
        assert!(!error.is_user_error());
    }
}
