//! # Reqguard Core Library
//!
//! Leveled logging and failure capture for network-service handlers.
//!
//! ## Modules
//!
//! - `sink` - Shared, switchable line destination (stdout or append-mode file)
//! - `logger` - Four named log channels (error, info, positive, debug)
//! - `failure` - Classification of arbitrary failure values, traced errors
//! - `trace` - Stack trace rendering with a configurable skip depth
//! - `config` - Logging configuration loaded from the environment
//! - `telemetry` - `tracing` subscriber bootstrap for library diagnostics

pub mod config;
pub mod error;
pub mod failure;
pub mod logger;
pub mod sink;
pub mod telemetry;
pub mod trace;

// Re-export commonly used types
pub use config::LoggingConfig;
pub use error::LogError;
pub use failure::{
    classify, BoxError, CapturedFailure, Failure, FailureKind, Frame, HasTrace, TracedError,
    NIL_ERROR_MESSAGE, NIL_PANIC_MESSAGE,
};
pub use logger::{LogChannel, Logger};
pub use sink::{MemoryBuffer, Sink};
pub use trace::{render, render_frames, SKIP_DEPTH};
