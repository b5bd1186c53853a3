use clap::ArgMatches;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::helpers;
use super::json_types::DiscoveryOutput;

pub(crate) fn handle_discover_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let config = helpers::load_config_with_overrides(matches, true)?;
    let compartment = helpers::compartment_argument(matches)?;
    let regions = helpers::region_overrides(matches);

    info!(
        event = "cli.discover_started",
        compartment = compartment,
        requested_regions = regions.len(),
        json_output = json_output
    );

    let runtime = helpers::build_runtime()?;
    let cancel = CancellationToken::new();
    let (setup, report) = runtime.block_on(async {
        helpers::spawn_shutdown_listener(cancel.clone());
        let setup = helpers::prepare_discovery(&config, &compartment).await?;
        let report = helpers::scan_regions(&setup, &config, &regions, &cancel).await?;
        Ok::<_, Box<dyn std::error::Error>>((setup, report))
    })?;

    let targets = report.cleanup_targets(config.discovery.on_unknown_region);
    if targets.is_none() {
        warn!(
            event = "cli.discover_cleanup_blocked",
            unknown = ?report.unknown_regions()
        );
    }

    if json_output {
        let output = DiscoveryOutput {
            compartment: &setup.compartment,
            report: &report,
            cleanup_regions: targets.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        helpers::print_discovery(&setup, &report, targets.as_ref());
    }

    info!(
        event = "cli.discover_completed",
        found = report.found_regions().len(),
        clean = report.clean_regions().len(),
        unknown = report.unknown_regions().len()
    );
    Ok(())
}
