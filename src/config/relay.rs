//! Relay and backlog formatting configuration.

use serde::Deserialize;

/// Configuration for backlog timestamping.
///
/// Buffered lines are replayed later, so each gets a timestamp applied with
/// a `chrono` format string. Placement mirrors the bouncer convention:
/// prepended by default, optionally appended instead (or both).
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// `chrono` strftime format for backlog timestamps.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Prepend the timestamp to buffered lines.
    #[serde(default = "default_true")]
    pub prepend_timestamps: bool,

    /// Append the timestamp to buffered lines.
    #[serde(default)]
    pub append_timestamps: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
            prepend_timestamps: true,
            append_timestamps: false,
        }
    }
}

fn default_timestamp_format() -> String {
    "[%H:%M:%S]".to_string()
}

fn default_true() -> bool {
    true
}
