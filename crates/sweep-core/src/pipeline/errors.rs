use crate::errors::SweepError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No command configured for the {stage} stage")]
    EmptyCommand { stage: &'static str },

    #[error("Failed to start {stage} command '{program}': {source}")]
    SpawnFailed {
        stage: &'static str,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} command '{command}' failed (exit code {code})")]
    CommandFailed {
        stage: &'static str,
        command: String,
        code: String,
    },
}

impl SweepError for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            PipelineError::EmptyCommand { .. } => "PIPELINE_EMPTY_COMMAND",
            PipelineError::SpawnFailed { .. } => "PIPELINE_SPAWN_FAILED",
            PipelineError::CommandFailed { .. } => "PIPELINE_COMMAND_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            PipelineError::EmptyCommand { .. } | PipelineError::SpawnFailed { .. }
        )
    }
}
