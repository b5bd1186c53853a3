use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};

use sweep_config::MAX_RESULT_LIMIT;

pub fn build_cli() -> Command {
    Command::new("sweep")
        .about("Find the regions where a compartment still has live resources, then clean them up")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Configuration file (default: ./.sweep/config.toml, then ~/.sweep/config.toml)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .help("Search backend to use")
                .value_parser(["oci-cli", "fixture"])
                .global(true),
        )
        .arg(
            Arg::new("fixture")
                .long("fixture")
                .value_name("PATH")
                .help("Fixture file for the fixture backend (implies --backend fixture)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .help("OCI CLI config profile")
                .global(true),
        )
        .subcommand(
            scan_args(Command::new("discover"))
                .about("Report which regions still hold live resources in a compartment"),
        )
        .subcommand(
            scan_args(Command::new("run"))
                .about("Pre-clean, discover, then invoke the cleanup command for the found regions")
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Print the pipeline commands instead of running them")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("skip-pre-clean")
                        .long("skip-pre-clean")
                        .help("Do not run the configured pre-clean command")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("types")
                .about("Show the priority and fallback resource type tiers")
                .arg(json_arg()),
        )
}

/// Arguments shared by the commands that scan regions.
fn scan_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("compartment")
                .short('c')
                .long("compartment")
                .help("Compartment name or OCID (prompted for when omitted)"),
        )
        .arg(
            Arg::new("region")
                .short('r')
                .long("region")
                .help("Scan only this region (repeatable; default: all subscribed regions)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("fallback")
                .long("fallback")
                .help("Fallback strategy when no priority type matches")
                .value_parser(["broad", "per-type"]),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .help("Result limit per search query")
                .value_parser(value_parser!(u32).range(1..=MAX_RESULT_LIMIT as i64)),
        )
        .arg(
            Arg::new("concurrency")
                .long("concurrency")
                .help("Maximum regions scanned at once")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help("Per-region scan timeout")
                .value_parser(value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("on-unknown")
                .long("on-unknown")
                .help("What to do with regions whose scan did not complete")
                .value_parser(["include", "abort"]),
        )
        .arg(json_arg())
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Output as JSON")
        .action(ArgAction::SetTrue)
}
