//! Reqguard Gateway
//!
//! HTTP side of reqguard:
//! - Panic-safe request wrapper (axum middleware)
//! - Per-request context and tracing spans
//! - Guarded server wiring the wrapper around user routes

pub mod context;
pub mod safe_handler;
pub mod server;

pub use context::{RequestContext, RequestSpan};
pub use safe_handler::{handle_internal_error, safe_handler_middleware, wrap, JSON_CONTENT_TYPE};
pub use server::{GuardServer, ServerConfig};
