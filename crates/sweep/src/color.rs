//! CLI color helpers.
//!
//! Every function respects `NO_COLOR`, `FORCE_COLOR`, and TTY detection
//! via `owo-colors`' `if_supports_color()`.

use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

/// Call once from main.rs when `--no-color` is passed.
pub fn set_no_color() {
    // SAFETY: Called once at startup before the runtime spawns any threads.
    unsafe { std::env::set_var("NO_COLOR", "1") };
}

// Region ids, commands: #7CB4C8
const ICE: (u8, u8, u8) = (124, 180, 200);
// Clean: #6B8F5E
const AURORA: (u8, u8, u8) = (107, 143, 94);
// Found, needs cleanup: #C49A5C
const COPPER: (u8, u8, u8) = (196, 154, 92);
// Unknown, failures: #B87060
const EMBER: (u8, u8, u8) = (184, 112, 96);
// Secondary text, borders: #5C6370
const MUTED: (u8, u8, u8) = (92, 99, 112);

pub fn ice(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(ICE.0, ICE.1, ICE.2))
        .to_string()
}

pub fn aurora(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(AURORA.0, AURORA.1, AURORA.2))
        .to_string()
}

pub fn copper(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(COPPER.0, COPPER.1, COPPER.2))
        .to_string()
}

pub fn ember(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(EMBER.0, EMBER.1, EMBER.2))
        .to_string()
}

pub fn bold(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.bold()).to_string()
}

pub fn muted(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(MUTED.0, MUTED.1, MUTED.2))
        .to_string()
}

/// Color-code a region verdict (found/clean/unknown). Padding is kept.
pub fn verdict(label: &str) -> String {
    match label.trim() {
        "found" => copper(label),
        "clean" => aurora(label),
        "unknown" => ember(label),
        _ => label.to_string(),
    }
}

/// Color-code a scan tier or cleanup reason. Padding is kept.
pub fn tier(label: &str) -> String {
    match label.trim() {
        "priority" => copper(label),
        "fallback" => ice(label),
        "unknown" => ember(label),
        "none" | "-" => muted(label),
        _ => label.to_string(),
    }
}

/// Error styling for stderr messages.
pub fn error(text: &str) -> String {
    text.if_supports_color(Stderr, |t| t.truecolor(EMBER.0, EMBER.1, EMBER.2))
        .to_string()
}

/// Warning styling for stderr messages.
pub fn warning(text: &str) -> String {
    text.if_supports_color(Stderr, |t| t.truecolor(COPPER.0, COPPER.1, COPPER.2))
        .to_string()
}

/// Muted styling for secondary info on stderr.
pub fn hint(text: &str) -> String {
    text.if_supports_color(Stderr, |t| t.truecolor(MUTED.0, MUTED.1, MUTED.2))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_functions_contain_original_text() {
        assert!(ice("uk-london-1").contains("uk-london-1"));
        assert!(aurora("clean").contains("clean"));
        assert!(copper("found").contains("found"));
        assert!(ember("unknown").contains("unknown"));
        assert!(bold("Region").contains("Region"));
        assert!(muted("-").contains('-'));
        assert!(error("failed").contains("failed"));
        assert!(warning("careful").contains("careful"));
        assert!(hint("try --help").contains("try --help"));
    }

    #[test]
    fn test_verdict_maps_correctly() {
        assert!(verdict("found").contains("found"));
        assert!(verdict("clean").contains("clean"));
        assert!(verdict("unknown").contains("unknown"));
        assert_eq!(verdict("other"), "other");
        assert!(verdict("clean   ").contains("clean   "));
    }

    #[test]
    fn test_tier_maps_correctly() {
        assert!(tier("priority").contains("priority"));
        assert!(tier("fallback").contains("fallback"));
        assert!(tier("none").contains("none"));
        assert_eq!(tier("other"), "other");
    }
}
