use crate::errors::SweepError;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Command '{command}' failed (exit code {code}): {stderr}")]
    CommandFailed {
        command: String,
        code: String,
        stderr: String,
    },

    #[error("Could not parse output of '{command}': {message}")]
    ParseFailed { command: String, message: String },

    #[error("Tenancy OCID is not configured (set backend.tenancy_id or OCI_TENANCY)")]
    MissingTenancy,

    #[error("Search in region '{region}' failed: {message}")]
    SearchFailed { region: String, message: String },

    #[error("Failed to load fixture '{path}': {message}")]
    FixtureLoadFailed { path: String, message: String },

    #[error("IO error talking to backend: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl SweepError for BackendError {
    fn error_code(&self) -> &'static str {
        match self {
            BackendError::ToolNotFound { .. } => "BACKEND_TOOL_NOT_FOUND",
            BackendError::CommandFailed { .. } => "BACKEND_COMMAND_FAILED",
            BackendError::ParseFailed { .. } => "BACKEND_PARSE_FAILED",
            BackendError::MissingTenancy => "BACKEND_MISSING_TENANCY",
            BackendError::SearchFailed { .. } => "BACKEND_SEARCH_FAILED",
            BackendError::FixtureLoadFailed { .. } => "BACKEND_FIXTURE_LOAD_FAILED",
            BackendError::IoError { .. } => "BACKEND_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            BackendError::ToolNotFound { .. }
                | BackendError::MissingTenancy
                | BackendError::FixtureLoadFailed { .. }
        )
    }
}
