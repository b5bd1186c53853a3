use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, Stderr};
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::pipeline::errors::PipelineError;
use crate::pipeline::types::{CleanupOutcome, CleanupRequest, render_command};

pub const PRE_CLEAN_STAGE: &str = "pre-clean";
pub const CLEANUP_STAGE: &str = "cleanup";

/// Boundary to whatever tears resources down. Discovery never deletes anything itself.
#[async_trait]
pub trait CleanupInvoker: Send + Sync {
    async fn invoke(&self, request: &CleanupRequest) -> Result<CleanupOutcome, PipelineError>;
}

/// Where a stage's standard output goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StageOutput {
    /// Shared with sweep's own stdout.
    #[default]
    Inherit,
    /// Forwarded to sweep's stderr, keeping stdout free for a JSON document.
    Stderr,
}

/// Runs the configured cleanup command as a child process.
#[derive(Debug, Clone)]
pub struct ProcessCleanupInvoker {
    template: Vec<String>,
    dry_run: bool,
    output: StageOutput,
}

impl ProcessCleanupInvoker {
    pub fn new(template: Vec<String>, dry_run: bool) -> Self {
        Self {
            template,
            dry_run,
            output: StageOutput::Inherit,
        }
    }

    pub fn with_output(mut self, output: StageOutput) -> Self {
        self.output = output;
        self
    }

    pub fn command_for(&self, request: &CleanupRequest) -> Vec<String> {
        render_command(
            &self.template,
            &request.compartment_name,
            &request.region_argument(),
        )
    }
}

#[async_trait]
impl CleanupInvoker for ProcessCleanupInvoker {
    async fn invoke(&self, request: &CleanupRequest) -> Result<CleanupOutcome, PipelineError> {
        let command = self.command_for(request);
        if self.dry_run {
            info!(
                event = "core.pipeline.cleanup_dry_run",
                command = command.join(" ")
            );
            return Ok(CleanupOutcome::DryRun { command });
        }
        run_stage(CLEANUP_STAGE, &command, self.output).await?;
        Ok(CleanupOutcome::Completed { command })
    }
}

/// Run one external stage to completion.
///
/// Stdin and stderr are inherited. A non-zero exit fails the stage. Nothing
/// is retried.
pub async fn run_stage(
    stage: &'static str,
    argv: &[String],
    output: StageOutput,
) -> Result<(), PipelineError> {
    match output {
        StageOutput::Inherit => run_stage_into(stage, argv, None::<&mut Stderr>).await,
        StageOutput::Stderr => {
            run_stage_into(stage, argv, Some(&mut tokio::io::stderr())).await
        }
    }
}

/// Run a stage, copying its stdout into `sink` when one is given.
async fn run_stage_into<W>(
    stage: &'static str,
    argv: &[String],
    sink: Option<&mut W>,
) -> Result<(), PipelineError>
where
    W: AsyncWrite + Unpin + Send,
{
    let Some((program, args)) = argv.split_first() else {
        return Err(PipelineError::EmptyCommand { stage });
    };
    let rendered = argv.join(" ");
    let spawn_failed = |source| PipelineError::SpawnFailed {
        stage,
        program: program.clone(),
        source,
    };

    info!(
        event = "core.pipeline.stage_started",
        stage = stage,
        command = rendered
    );

    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);
    if sink.is_some() {
        command.stdout(Stdio::piped());
    }
    let mut child = command.spawn().map_err(spawn_failed)?;

    if let (Some(sink), Some(mut stdout)) = (sink, child.stdout.take()) {
        if let Err(e) = tokio::io::copy(&mut stdout, sink).await {
            warn!(
                event = "core.pipeline.stage_output_lost",
                stage = stage,
                error = %e
            );
        }
    }

    let status = child.wait().await.map_err(spawn_failed)?;

    if !status.success() {
        let code = status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        error!(
            event = "core.pipeline.stage_failed",
            stage = stage,
            command = rendered,
            code = code
        );
        return Err(PipelineError::CommandFailed {
            stage,
            command: rendered,
            code,
        });
    }

    info!(event = "core.pipeline.stage_completed", stage = stage);
    Ok(())
}

/// Run the optional pre-clean stage. Returns whether anything ran.
pub async fn run_pre_clean(
    template: Option<&[String]>,
    compartment_name: &str,
    dry_run: bool,
    output: StageOutput,
) -> Result<bool, PipelineError> {
    let Some(template) = template else {
        return Ok(false);
    };
    let command = render_command(template, compartment_name, "");
    if dry_run {
        info!(
            event = "core.pipeline.pre_clean_dry_run",
            command = command.join(" ")
        );
        return Ok(false);
    }
    run_stage(PRE_CLEAN_STAGE, &command, output).await?;
    Ok(true)
}

/// Hand the region list to the invoker, skipping it when there is nothing to clean.
pub async fn invoke_cleanup(
    invoker: &dyn CleanupInvoker,
    request: &CleanupRequest,
) -> Result<CleanupOutcome, PipelineError> {
    if request.is_empty() {
        warn!(
            event = "core.pipeline.cleanup_skipped",
            compartment = request.compartment_name,
            reason = "no regions selected"
        );
        return Ok(CleanupOutcome::Skipped);
    }

    info!(
        event = "core.pipeline.cleanup_started",
        compartment = request.compartment_name,
        regions = request.region_argument()
    );
    invoker.invoke(request).await
}
