use clap::ArgMatches;
use tracing::error;

use sweep_core::events;

mod discover;
mod helpers;
mod json_types;
mod run;
mod types;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    match matches.subcommand() {
        Some(("discover", sub_matches)) => discover::handle_discover_command(sub_matches),
        Some(("run", sub_matches)) => run::handle_run_command(sub_matches),
        Some(("types", sub_matches)) => types::handle_types_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
