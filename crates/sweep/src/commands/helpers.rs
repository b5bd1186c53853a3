use std::collections::BTreeMap;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::ArgMatches;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use sweep_config::{
    BackendKind, FallbackStrategy, SweepConfig, UnknownRegionPolicy, load_config, validate_config,
};
use sweep_core::catalog::{non_billable_keywords_with, priority_types_with};
use sweep_core::compartment::CompartmentError;
use sweep_core::events;
use sweep_core::{
    CleanupReason, CompartmentSummary, DiscoveryOptions, DiscoveryReport, ResolvedCatalog,
    SearchBackend, SweepError, build_backend, discover, fetch_catalog, lookup_compartment,
};

use crate::{color, table};

pub(crate) type CommandResult<T> = Result<T, Box<dyn Error>>;

/// Report a failed step to the user and the log, then box it for `?`.
pub(crate) fn fail<E: SweepError>(context: &str, e: E) -> Box<dyn Error> {
    eprintln!("{}", color::error(&format!("{}: {}", context, e)));
    error!(event = "cli.step_failed", context = context, error = %e);
    events::log_app_error(&e);
    e.into()
}

/// Load configuration and apply command-line overrides.
///
/// `scan_overrides` is set by the commands that define the scan arguments.
pub(crate) fn load_config_with_overrides(
    matches: &ArgMatches,
    scan_overrides: bool,
) -> CommandResult<SweepConfig> {
    let explicit = matches.get_one::<PathBuf>("config");
    let mut config =
        load_config(explicit.map(PathBuf::as_path)).map_err(|e| fail("Failed to load config", e))?;

    if let Some(path) = matches.get_one::<PathBuf>("fixture") {
        config.backend.kind = BackendKind::Fixture;
        config.backend.fixture_path = Some(path.clone());
    }
    if let Some(kind) = matches.get_one::<String>("backend") {
        config.backend.kind = kind.parse::<BackendKind>()?;
    }
    if let Some(profile) = matches.get_one::<String>("profile") {
        config.backend.profile = Some(profile.clone());
    }

    if scan_overrides {
        let discovery = &mut config.discovery;
        if let Some(strategy) = matches.get_one::<String>("fallback") {
            discovery.fallback_strategy = strategy.parse::<FallbackStrategy>()?;
        }
        if let Some(limit) = matches.get_one::<u32>("limit") {
            discovery.result_limit = *limit;
        }
        if let Some(concurrency) = matches.get_one::<usize>("concurrency") {
            discovery.max_concurrency = *concurrency;
        }
        if let Some(timeout) = matches.get_one::<u64>("timeout") {
            discovery.region_timeout_secs = *timeout;
        }
        if let Some(policy) = matches.get_one::<String>("on-unknown") {
            discovery.on_unknown_region = policy.parse::<UnknownRegionPolicy>()?;
        }
    }

    validate_config(&config).map_err(|e| fail("Invalid configuration", e))?;
    info!(
        event = "cli.config_loaded",
        backend = %config.backend.kind,
        fallback = %config.discovery.fallback_strategy
    );
    Ok(config)
}

/// The `--compartment` value, or a name read from stdin.
pub(crate) fn compartment_argument(matches: &ArgMatches) -> CommandResult<String> {
    let input = match matches.get_one::<String>("compartment") {
        Some(value) => value.trim().to_string(),
        None => {
            print!("Enter the compartment name (e.g., OCI-LAB-##): ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim().to_string()
        }
    };

    if input.is_empty() {
        return Err(fail("Invalid compartment", CompartmentError::EmptyName));
    }
    Ok(input)
}

pub(crate) fn region_overrides(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("region")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

pub(crate) fn build_runtime() -> CommandResult<tokio::runtime::Runtime> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    Ok(runtime)
}

/// Cancel `token` on Ctrl-C or SIGTERM. Must be called inside the runtime.
pub(crate) fn spawn_shutdown_listener(token: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal(token).await {
            warn!(event = "cli.signal_handler_failed", error = %e);
        }
    });
}

async fn wait_for_shutdown_signal(token: CancellationToken) -> Result<(), io::Error> {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        tokio::select! {
            _ = ctrl_c => {
                info!(event = "cli.signal_received", signal = "SIGINT");
            }
            _ = sigterm.recv() => {
                info!(event = "cli.signal_received", signal = "SIGTERM");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await?;
        info!(event = "cli.signal_received", signal = "SIGINT");
    }

    eprintln!("{}", color::warning("Interrupted, stopping region scans..."));
    token.cancel();
    Ok(())
}

/// Backend, resolved compartment, and catalog snapshot for one run.
pub(crate) struct DiscoverySetup {
    pub backend: Arc<dyn SearchBackend>,
    pub compartment: CompartmentSummary,
    pub catalog: Arc<ResolvedCatalog>,
}

pub(crate) async fn load_catalog(
    backend: &dyn SearchBackend,
    config: &SweepConfig,
) -> CommandResult<ResolvedCatalog> {
    let priority = priority_types_with(&config.discovery.extra_priority_types);
    let keywords = non_billable_keywords_with(&config.discovery.extra_non_billable_keywords);
    fetch_catalog(backend, &priority, &keywords)
        .await
        .map_err(|e| fail("Failed to load the resource type catalog", e))
}

pub(crate) fn open_backend(config: &SweepConfig) -> CommandResult<Arc<dyn SearchBackend>> {
    build_backend(&config.backend).map_err(|e| fail("Failed to initialise backend", e))
}

pub(crate) async fn prepare_discovery(
    config: &SweepConfig,
    compartment_input: &str,
) -> CommandResult<DiscoverySetup> {
    let backend = open_backend(config)?;
    let compartment = lookup_compartment(backend.as_ref(), compartment_input)
        .await
        .map_err(|e| fail("Failed to resolve compartment", e))?;
    let catalog = load_catalog(backend.as_ref(), config).await?;

    Ok(DiscoverySetup {
        backend,
        compartment,
        catalog: Arc::new(catalog),
    })
}

/// Scan the requested regions, or every subscribed region when none are given.
pub(crate) async fn scan_regions(
    setup: &DiscoverySetup,
    config: &SweepConfig,
    requested: &[String],
    cancel: &CancellationToken,
) -> CommandResult<DiscoveryReport> {
    let regions = if requested.is_empty() {
        setup
            .backend
            .list_region_subscriptions()
            .await
            .map_err(|e| fail("Failed to list region subscriptions", e))?
    } else {
        requested.to_vec()
    };

    discover(
        Arc::clone(&setup.backend),
        &setup.compartment.id,
        &regions,
        Arc::clone(&setup.catalog),
        &DiscoveryOptions::from(&config.discovery),
        cancel,
    )
    .await
    .map_err(|e| fail("Discovery failed", e))
}

/// Human-readable discovery summary shared by `discover` and `run`.
pub(crate) fn print_discovery(
    setup: &DiscoverySetup,
    report: &DiscoveryReport,
    targets: Option<&BTreeMap<String, CleanupReason>>,
) {
    println!(
        "Compartment: {} {}",
        color::bold(&setup.compartment.name),
        color::muted(&format!("({})", setup.compartment.id))
    );

    if !setup.catalog.skipped.is_empty() {
        println!(
            "{}",
            color::muted(&format!(
                "Skipped {} unsupported priority type(s):",
                setup.catalog.skipped.len()
            ))
        );
        for skipped in &setup.catalog.skipped {
            println!("  - {} {}", skipped.name, color::muted(&skipped.reason));
        }
    }
    println!();

    table::print_report_table(report);
    table::print_region_details(report);

    match targets {
        Some(targets) if targets.is_empty() => {
            println!("\n{}", color::aurora("No regions need cleanup."));
        }
        Some(targets) => {
            println!("\nRegions to clean:");
            for (region, reason) in targets {
                println!("  {} {}", color::ice(region), color::tier(reason.as_str()));
            }
        }
        None => {
            println!(
                "\n{}",
                color::ember(
                    "Some regions could not be scanned; cleanup is blocked (on_unknown_region = abort)."
                )
            );
        }
    }

    println!(
        "{}",
        color::muted(&format!(
            "Completed at {}",
            report
                .completed_at
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        ))
    );
}
