use clap::ArgMatches;
use tokio_util::sync::CancellationToken;
use tracing::info;

use sweep_config::SweepConfig;
use sweep_core::pipeline::render_command;
use sweep_core::{
    CleanupOutcome, CleanupRequest, ProcessCleanupInvoker, StageOutput, invoke_cleanup,
    plan_cleanup, run_pre_clean,
};

use super::helpers::{self, CommandResult};
use super::json_types::{DiscoveryOutput, RunOutput};
use crate::color;

struct RunFlags {
    json_output: bool,
    dry_run: bool,
    skip_pre_clean: bool,
}

pub(crate) fn handle_run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let flags = RunFlags {
        json_output: matches.get_flag("json"),
        dry_run: matches.get_flag("dry-run"),
        skip_pre_clean: matches.get_flag("skip-pre-clean"),
    };
    let config = helpers::load_config_with_overrides(matches, true)?;
    let compartment = helpers::compartment_argument(matches)?;
    let regions = helpers::region_overrides(matches);

    info!(
        event = "cli.run_started",
        compartment = compartment,
        requested_regions = regions.len(),
        dry_run = flags.dry_run,
        skip_pre_clean = flags.skip_pre_clean
    );

    let runtime = helpers::build_runtime()?;
    let cancel = CancellationToken::new();
    let outcome = runtime.block_on(async {
        helpers::spawn_shutdown_listener(cancel.clone());
        execute(&config, &compartment, &regions, &flags, &cancel).await
    })?;

    info!(event = "cli.run_completed", outcome = ?outcome);
    Ok(())
}

/// Pre-clean, discovery, then cleanup. Any failing stage stops the run.
async fn execute(
    config: &SweepConfig,
    compartment_input: &str,
    regions: &[String],
    flags: &RunFlags,
    cancel: &CancellationToken,
) -> CommandResult<CleanupOutcome> {
    let setup = helpers::prepare_discovery(config, compartment_input).await?;
    let compartment_name = setup.compartment.name.as_str();

    let pre_clean = if flags.skip_pre_clean {
        None
    } else {
        config.pipeline.pre_clean.as_deref()
    };
    if let Some(template) = pre_clean {
        if !flags.json_output {
            println!(
                "{} pre-clean: {}",
                stage_verb(flags.dry_run),
                color::ice(&render_command(template, compartment_name, "").join(" "))
            );
        }
    }
    let output = stage_output(flags.json_output);
    let pre_clean_ran = run_pre_clean(pre_clean, compartment_name, flags.dry_run, output)
        .await
        .map_err(|e| helpers::fail("Pre-clean failed", e))?;

    let report = helpers::scan_regions(&setup, config, regions, cancel).await?;
    let targets = plan_cleanup(&report, config.discovery.on_unknown_region)
        .map_err(|e| helpers::fail("Cleanup aborted", e))?;

    let request = CleanupRequest::new(compartment_name, targets.keys().cloned());
    let invoker = ProcessCleanupInvoker::new(config.pipeline.cleanup.clone(), flags.dry_run)
        .with_output(output);

    if !flags.json_output {
        helpers::print_discovery(&setup, &report, Some(&targets));
        if !request.is_empty() {
            println!(
                "\n{} cleanup: {}",
                stage_verb(flags.dry_run),
                color::ice(&invoker.command_for(&request).join(" "))
            );
        }
    }

    let outcome = invoke_cleanup(&invoker, &request)
        .await
        .map_err(|e| helpers::fail("Cleanup failed", e))?;

    if flags.json_output {
        let output = RunOutput {
            discovery: DiscoveryOutput {
                compartment: &setup.compartment,
                report: &report,
                cleanup_regions: Some(&targets),
            },
            pre_clean_ran,
            cleanup: &outcome,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &outcome {
            CleanupOutcome::Skipped => println!(
                "{}",
                color::muted("No active regions with resources found, skipping cleanup.")
            ),
            CleanupOutcome::DryRun { .. } => {
                println!("{}", color::muted("Dry run: cleanup not started."))
            }
            CleanupOutcome::Completed { .. } => println!("{}", color::aurora("Cleanup complete.")),
        }
    }

    Ok(outcome)
}

fn stage_verb(dry_run: bool) -> &'static str {
    if dry_run { "Would run" } else { "Running" }
}

/// With `--json`, stdout carries only the run document.
fn stage_output(json_output: bool) -> StageOutput {
    if json_output {
        StageOutput::Stderr
    } else {
        StageOutput::Inherit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_verb() {
        assert_eq!(stage_verb(true), "Would run");
        assert_eq!(stage_verb(false), "Running");
    }

    #[test]
    fn test_json_output_moves_stage_stdout_to_stderr() {
        assert_eq!(stage_output(true), StageOutput::Stderr);
        assert_eq!(stage_output(false), StageOutput::Inherit);
    }
}
