//! Leveled logger with four named channels
//!
//! Every channel writes `<prefix><timestamp> <line>` to the same [`Sink`].
//! The logger is an explicit service value: build one at startup and share
//! it behind an `Arc` with everything that logs.

use std::error::Error;
use std::fmt::Display;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, warn};

use crate::failure::classify_traced;
use crate::{
    CapturedFailure, LogError, LoggingConfig, Sink, TracedError, NIL_ERROR_MESSAGE, SKIP_DEPTH,
};

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Named log channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogChannel {
    Error,
    Info,
    Positive,
    Debug,
}

impl LogChannel {
    /// Line prefix, including the terminal color tag
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Error => "\u{1b}[31mERROR: \u{1b}[0m",
            Self::Info => "INFO: ",
            Self::Positive => "\u{1b}[32mINFO: \u{1b}[0m",
            Self::Debug => "\u{1b}[33mDEBUG: \u{1b}[0m",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Info => "info",
            Self::Positive => "positive",
            Self::Debug => "debug",
        }
    }
}

/// Logging service holding the channel configuration and the shared sink
#[derive(Debug)]
pub struct Logger {
    sink: Sink,
    /// Relaxed; readers may briefly see a stale value after a toggle
    debug_enabled: AtomicBool,
}

impl Logger {
    /// Logger over `sink`, debug channel enabled
    pub fn new(sink: Sink) -> Self {
        Self {
            sink,
            debug_enabled: AtomicBool::new(true),
        }
    }

    /// Logger writing to stdout
    pub fn stdout() -> Self {
        Self::new(Sink::stdout())
    }

    /// Build a logger from configuration, redirecting to the configured file
    pub fn from_config(config: &LoggingConfig) -> Result<Self, LogError> {
        let logger = Self::stdout();
        logger.set_debug_enabled(config.debug);
        if let Some(path) = &config.log_file {
            logger.redirect_sink(path)?;
        }
        Ok(logger)
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Write one line to `channel`
    pub fn emit(&self, channel: LogChannel, line: impl Display) {
        if channel == LogChannel::Debug && !self.debug_enabled() {
            return;
        }

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let text = format!("{}{} {}", channel.prefix(), timestamp, line);
        if let Err(e) = self.sink.write_line(&text) {
            warn!(channel = channel.as_str(), "Dropped log line: {}", e);
        }
    }

    pub fn error(&self, line: impl Display) {
        self.emit(LogChannel::Error, line);
    }

    pub fn info(&self, line: impl Display) {
        self.emit(LogChannel::Info, line);
    }

    pub fn positive(&self, line: impl Display) {
        self.emit(LogChannel::Positive, line);
    }

    /// No-op while the debug channel is disabled
    pub fn debug(&self, line: impl Display) {
        self.emit(LogChannel::Debug, line);
    }

    pub fn set_debug_enabled(&self, enabled: bool) {
        self.debug_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled.load(Ordering::Relaxed)
    }

    /// Move all channels to `path` (create+append)
    pub fn redirect_sink(&self, path: impl AsRef<Path>) -> Result<(), LogError> {
        self.sink.redirect_to_file(path)
    }

    /// Move all channels to `path`, terminating the process if the file
    /// cannot be opened. Logging to a broken destination is not an option.
    pub fn write_logs_to_file(&self, path: impl AsRef<Path>) {
        if self.redirect_or_report(path).is_err() {
            std::process::exit(1);
        }
    }

    /// Redirect, reporting a failure to tracing and to stderr. Stderr still
    /// gets it when no subscriber is installed yet.
    fn redirect_or_report(&self, path: impl AsRef<Path>) -> Result<(), LogError> {
        self.redirect_sink(path).map_err(|e| {
            error!("[Logger] Cannot write logs to file: {}", e);
            eprintln!("{}", e);
            e
        })
    }

    /// Log an error with its stack trace.
    ///
    /// Errors without a trace are wrapped once so the trace starts at the
    /// caller of this method.
    #[inline(never)]
    pub fn log_failure(&self, err: Option<&(dyn Error + 'static)>) {
        let Some(err) = err else {
            self.error(NIL_ERROR_MESSAGE);
            return;
        };

        let captured = match err.downcast_ref::<TracedError>() {
            Some(traced) => classify_traced(traced),
            None => classify_traced(
                &TracedError::new(err.to_string()).without_frames_of("Logger::log_failure"),
            ),
        };
        self.log_captured(&captured);
    }

    /// Log an already classified failure to the error channel
    pub fn log_captured(&self, captured: &CapturedFailure) {
        self.error(captured.log_line(SKIP_DEPTH));
    }
}

/// Space-join arguments the way a print-line does
pub fn join_args(args: &[&dyn Display]) -> String {
    args.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `log_error!(logger, a, b, ...)` writes `a b ...` to the error channel
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.error($crate::logger::join_args(&[$(&$arg as &dyn ::std::fmt::Display),+]))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.info($crate::logger::join_args(&[$(&$arg as &dyn ::std::fmt::Display),+]))
    };
}

#[macro_export]
macro_rules! log_positive {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.positive($crate::logger::join_args(&[$(&$arg as &dyn ::std::fmt::Display),+]))
    };
}

/// Arguments are not formatted while the debug channel is off
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        if $logger.debug_enabled() {
            $logger.debug($crate::logger::join_args(&[$(&$arg as &dyn ::std::fmt::Display),+]))
        }
    };
}
