//! Environment configuration.
//!
//! | variable                         | setting                   |
//! |----------------------------------|---------------------------|
//! | `SPYRR_LOWERCASE_HEADER_VALUES`  | `lowercase_header_values` |
//! | `SPYRR_PRETTY_DIFF`              | `pretty_diff`             |
//!
//! Values are `true`, `false`, `1` or `0`. Anything else leaves the default.

use spyrr_domain::HarnessSettings;
use tracing::warn;

/// Variable controlling whether string header values are lower-cased.
pub const LOWERCASE_HEADER_VALUES_VAR: &str = "SPYRR_LOWERCASE_HEADER_VALUES";

/// Variable controlling pretty-printed bodies in failure messages.
pub const PRETTY_DIFF_VAR: &str = "SPYRR_PRETTY_DIFF";

/// Reads harness settings from the process environment.
#[must_use]
pub fn settings_from_env() -> HarnessSettings {
    settings_from_lookup(|key| std::env::var(key).ok())
}

/// Builds harness settings from an arbitrary variable lookup.
pub fn settings_from_lookup<F>(lookup: F) -> HarnessSettings
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = HarnessSettings::default();
    let flag = |key: &str, default: bool| {
        lookup(key).map_or(default, |raw| {
            parse_flag(&raw).unwrap_or_else(|| {
                warn!(variable = key, value = %raw, "ignoring unparsable flag");
                default
            })
        })
    };

    HarnessSettings {
        lowercase_header_values: flag(
            LOWERCASE_HEADER_VALUES_VAR,
            defaults.lowercase_header_values,
        ),
        pretty_diff: flag(PRETTY_DIFF_VAR, defaults.pretty_diff),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
