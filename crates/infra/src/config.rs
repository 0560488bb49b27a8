//! Host configuration.

use serde::Deserialize;

pub const PUBLISH_EVENTS_VAR: &str = "SPACEDAO_PUBLISH_EVENTS";

/// Settings for a `LedgerHost`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Publish committed events to the bus after each append.
    pub publish_events: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            publish_events: true,
        }
    }
}

impl HostConfig {
    /// Read from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let publish_events = lookup(PUBLISH_EVENTS_VAR)
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(defaults.publish_events);

        Self { publish_events }
    }
}
