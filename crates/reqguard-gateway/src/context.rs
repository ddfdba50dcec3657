//! Request Context - per-request correlation for log lines
//!
//! Generates a short local request ID and provides the tracing span that
//! wraps handling of one request. IDs never leave this process.

use axum::extract::Request;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info_span, Span};

/// Global request counter for ID generation
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a short ID for this request
/// Format: 6 hex characters (e.g., "a1b2c3")
pub fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0);

    // Mix counter and timestamp for uniqueness
    let mixed = counter.wrapping_add(timestamp);
    format!("{:06x}", mixed & 0xFFFFFF)
}

/// What the wrapper knows about the request it is guarding
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Short request ID (6 hex chars)
    pub request_id: String,
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path (e.g., /orders)
    pub path: String,
    /// Path plus query, as logged on failure
    pub uri: String,
    /// Request start time
    pub started_at: std::time::Instant,
}

impl RequestContext {
    pub fn new(method: &str, uri: &str) -> Self {
        let path = uri.split('?').next().unwrap_or(uri);
        Self {
            request_id: generate_request_id(),
            method: method.to_string(),
            path: path.to_string(),
            uri: uri.to_string(),
            started_at: std::time::Instant::now(),
        }
    }

    /// Context for an incoming request
    pub fn from_request(request: &Request) -> Self {
        let uri = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| request.uri().path());
        Self::new(request.method().as_str(), uri)
    }

    /// Get elapsed time since request started
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    /// The target line logged before the handler runs
    pub fn target(&self) -> String {
        format!("→ {} {}", self.method, self.uri)
    }
}

/// Request span builder
pub struct RequestSpan;

impl RequestSpan {
    /// Create a tracing span for an incoming request
    pub fn enter(ctx: &RequestContext) -> Span {
        info_span!(
            "request",
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
        )
    }

    /// Log request completion
    pub fn log_exit(ctx: &RequestContext, status: u16) {
        debug!(
            request_id = %ctx.request_id,
            "← {} ({}ms)",
            status,
            ctx.elapsed_ms()
        );
    }
}
