//! Boot configuration.

use serde::{Deserialize, Serialize};

use crate::BootError;

/// Path the guest module is published at.
pub const DEFAULT_WASM_URL: &str = "/wasm/main.wasm";
/// Host page element the UI mounts into.
pub const DEFAULT_ANCHOR: &str = "#app";

/// Settings read once at startup. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Where the guest module is fetched from.
    pub wasm_url: String,
    /// CSS selector of the mount anchor.
    pub anchor: String,
    /// `log` level name (`error` .. `trace`, or `off`).
    pub log_level: String,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            wasm_url: DEFAULT_WASM_URL.to_owned(),
            anchor: DEFAULT_ANCHOR.to_owned(),
            log_level: "info".to_owned(),
        }
    }
}

impl BootConfig {
    /// Parses overrides; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, BootError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parsed log level; unknown names fall back to `Info`.
    pub fn level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
