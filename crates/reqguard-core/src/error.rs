//! Errors raised by the logging layer itself

use std::path::PathBuf;

/// Failures of the sink. Request-handling failures never surface here;
/// they are absorbed by the request wrapper.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The log file could not be opened in create+append mode
    #[error("failed to open log file {}: {source}", path.display())]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a line to the current destination failed
    #[error("failed to write log line: {0}")]
    Write(#[from] std::io::Error),
}
