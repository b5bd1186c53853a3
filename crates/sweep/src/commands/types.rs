use clap::ArgMatches;
use tracing::info;

use super::helpers;
use super::json_types::TypesOutput;
use crate::color;

pub(crate) fn handle_types_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let config = helpers::load_config_with_overrides(matches, false)?;

    info!(event = "cli.types_started", json_output = json_output);

    let runtime = helpers::build_runtime()?;
    let catalog = runtime.block_on(async {
        let backend = helpers::open_backend(&config)?;
        helpers::load_catalog(backend.as_ref(), &config).await
    })?;

    if json_output {
        let output = TypesOutput {
            supported_count: catalog.supported.len(),
            priority: &catalog.priority,
            skipped: &catalog.skipped,
            fallback: &catalog.fallback,
            non_billable_keywords: &catalog.non_billable_keywords,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} supported resource types",
            color::bold(&catalog.supported.len().to_string())
        );

        println!("\nPriority ({}):", catalog.priority.len());
        for name in &catalog.priority {
            println!("  {}", color::copper(name));
        }

        if !catalog.skipped.is_empty() {
            println!("\nSkipped ({}):", catalog.skipped.len());
            for skipped in &catalog.skipped {
                println!("  {} {}", skipped.name, color::muted(&skipped.reason));
            }
        }

        println!("\nFallback ({}):", catalog.fallback.len());
        for name in &catalog.fallback {
            println!("  {}", name);
        }

        println!(
            "\n{}",
            color::muted(&format!(
                "Non-billable keywords: {}",
                catalog.non_billable_keywords.join(", ")
            ))
        );
    }

    info!(
        event = "cli.types_completed",
        priority = catalog.priority.len(),
        fallback = catalog.fallback.len(),
        skipped = catalog.skipped.len()
    );
    Ok(())
}
