pub mod errors;
pub mod handler;
pub mod types;

// Public API exports
pub use errors::PipelineError;
pub use handler::{
    CLEANUP_STAGE, CleanupInvoker, PRE_CLEAN_STAGE, ProcessCleanupInvoker, StageOutput,
    invoke_cleanup, run_pre_clean, run_stage,
};
pub use types::{CleanupOutcome, CleanupRequest, render_command};
