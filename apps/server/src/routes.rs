//! Demo routes

use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::{get, post},
    Router,
};
use reqguard_core::{log_debug, Logger};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct FailParams {
    message: Option<String>,
}

#[derive(Deserialize)]
pub struct DebugParams {
    enabled: bool,
}

pub fn routes(logger: Arc<Logger>) -> Router {
    Router::new()
        .route("/echo", post(echo))
        .route("/fail", get(fail).post(fail))
        .route("/debug", post(set_debug))
        .with_state(logger)
}

/// Echo the request body back
async fn echo(State(logger): State<Arc<Logger>>, body: Bytes) -> Bytes {
    log_debug!(logger, "echo", body.len(), "bytes");
    body
}

/// Fail on purpose, with `?message=` as the panic message
async fn fail(Query(params): Query<FailParams>) -> &'static str {
    match params.message {
        Some(message) => panic!("{}", message),
        None => std::panic::panic_any(()),
    }
}

/// Toggle the debug channel
async fn set_debug(
    State(logger): State<Arc<Logger>>,
    Query(params): Query<DebugParams>,
) -> &'static str {
    logger.set_debug_enabled(params.enabled);
    if params.enabled {
        "debug on"
    } else {
        "debug off"
    }
}
