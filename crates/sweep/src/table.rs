use sweep_core::scan::RegionFinding;
use sweep_core::{DiscoveryReport, RegionVerdict};

use crate::color;

/// Print a formatted table of region verdicts.
pub fn print_report_table(report: &DiscoveryReport) {
    let region_width = report
        .verdicts
        .keys()
        .map(|r| r.chars().count())
        .max()
        .unwrap_or(6)
        .clamp(6, 24);
    let verdict_width = 7;
    let tier_width = 8;
    let type_width = report
        .verdicts
        .values()
        .filter_map(|v| v.finding())
        .filter_map(|f| f.matched_type.as_deref())
        .map(|t| t.chars().count())
        .max()
        .unwrap_or(4)
        .clamp(4, 28);
    let queries_width = 7;
    let failed_width = 6;

    let border = |left: &str, mid: &str, right: &str| {
        color::muted(&format!(
            "{left}{}{mid}{}{mid}{}{mid}{}{mid}{}{mid}{}{right}",
            "─".repeat(region_width + 2),
            "─".repeat(verdict_width + 2),
            "─".repeat(tier_width + 2),
            "─".repeat(type_width + 2),
            "─".repeat(queries_width + 2),
            "─".repeat(failed_width + 2),
        ))
    };

    println!("{}", border("┌", "┬", "┐"));
    println!(
        "│ {} │ {} │ {} │ {} │ {} │ {} │",
        color::bold(&truncate("Region", region_width)),
        color::bold(&truncate("Verdict", verdict_width)),
        color::bold(&truncate("Tier", tier_width)),
        color::bold(&truncate("Type", type_width)),
        color::bold(&truncate("Queries", queries_width)),
        color::bold(&truncate("Failed", failed_width)),
    );
    println!("{}", border("├", "┼", "┤"));

    for (region, verdict) in &report.verdicts {
        let (tier, matched, queries, failed) = match verdict.finding() {
            Some(f) => (
                f.tier.as_str(),
                f.matched_type.as_deref().unwrap_or("-"),
                f.queries_issued.to_string(),
                f.query_failures.len().to_string(),
            ),
            None => ("-", "-", "-".to_string(), "-".to_string()),
        };

        println!(
            "│ {} │ {} │ {} │ {} │ {} │ {} │",
            color::ice(&truncate(region, region_width)),
            color::verdict(&truncate(verdict.label(), verdict_width)),
            color::tier(&truncate(tier, tier_width)),
            truncate(matched, type_width),
            truncate(&queries, queries_width),
            truncate(&failed, failed_width),
        );
    }

    println!("{}", border("└", "┴", "┘"));

    println!(
        "\nTotal: {} region(s), {} found, {} clean, {} unknown",
        report.verdicts.len(),
        report.found_regions().len(),
        report.clean_regions().len(),
        report.unknown_regions().len(),
    );
}

/// Print sample resources and failure reasons below the table.
pub fn print_region_details(report: &DiscoveryReport) {
    for line in region_detail_lines(report) {
        println!("{}", line);
    }
}

/// Detail lines for every region with something to say: samples of a
/// match, failed queries of a finished scan, or why a scan did not finish.
fn region_detail_lines(report: &DiscoveryReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (region, verdict) in &report.verdicts {
        match verdict {
            RegionVerdict::Found(finding) => {
                lines.push(format!(
                    "\n{} {} ({} tier):",
                    color::ice(region),
                    finding.matched_type.as_deref().unwrap_or("resources"),
                    color::tier(finding.tier.as_str()),
                ));
                for sample in &finding.samples {
                    lines.push(format!(
                        "    - {} {}",
                        sample.display_name,
                        color::muted(&format!("(State: {})", sample.state_label()))
                    ));
                }
                push_failures(&mut lines, finding);
            }
            RegionVerdict::Clean(finding) => {
                if !finding.query_failures.is_empty() {
                    lines.push(format!(
                        "\n{} {}",
                        color::ice(region),
                        color::copper("clean, but some queries failed:")
                    ));
                    push_failures(&mut lines, finding);
                }
            }
            RegionVerdict::Unknown { reason } => {
                lines.push(format!("\n{} {}", color::ice(region), color::ember(reason)));
            }
        }
    }
    lines
}

fn push_failures(lines: &mut Vec<String>, finding: &RegionFinding) {
    for failure in &finding.query_failures {
        let target = failure.resource_type.as_deref().unwrap_or("all types");
        lines.push(format!(
            "    ! {} {}",
            target,
            color::ember(&failure.message)
        ));
    }
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Uses character count (not byte count) so multi-byte names never split.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}
