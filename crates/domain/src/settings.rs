//! Harness settings
//!
//! Knobs that change how responses are recorded and how failures render.

use serde::{Deserialize, Serialize};

/// Settings shared by the harness and its assertion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessSettings {
    /// Lower-case string header values when the controller writes them.
    #[serde(default = "default_lowercase_header_values")]
    pub lowercase_header_values: bool,

    /// Render bodies in failure messages as pretty-printed JSON.
    #[serde(default)]
    pub pretty_diff: bool,
}

const fn default_lowercase_header_values() -> bool {
    true
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            lowercase_header_values: default_lowercase_header_values(),
            pretty_diff: false,
        }
    }
}
