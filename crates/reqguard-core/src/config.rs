//! Logging configuration

use std::path::PathBuf;

/// Env var naming the file all channels are redirected to
pub const ENV_LOG_FILE: &str = "REQGUARD_LOG_FILE";
/// Env var toggling the debug channel (`true`/`false`/`1`/`0`)
pub const ENV_DEBUG: &str = "REQGUARD_DEBUG";
/// Standard `tracing` filter env var
pub const ENV_FILTER: &str = "RUST_LOG";

/// How the process logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Redirect every channel to this file (create+append). `None` keeps stdout.
    pub log_file: Option<PathBuf>,
    /// Whether the debug channel starts enabled
    pub debug: bool,
    /// `tracing` filter directives for library diagnostics
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            debug: true,
            filter: None,
        }
    }
}

impl LoggingConfig {
    /// Load from the environment, reading a `.env` file first if present
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_file: lookup(ENV_LOG_FILE)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            debug: lookup(ENV_DEBUG)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.debug),
            filter: lookup(ENV_FILTER).filter(|v| !v.trim().is_empty()),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
