//! Panic-safe request wrapper
//!
//! Buffers the request body so it can be replayed to the handler and logged
//! on failure, runs the handler behind an unwind boundary, and turns any
//! failure into an error-channel log entry plus a JSON 500 response.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use futures::FutureExt;
use http_body_util::BodyExt;
use reqguard_core::{classify, Failure, Logger, NIL_PANIC_MESSAGE};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{warn, Instrument};

use crate::context::{RequestContext, RequestSpan};

/// Content type of every error response
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Guard every route of `router` with [`safe_handler_middleware`]
pub fn wrap<S>(router: Router<S>, logger: Arc<Logger>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(logger, safe_handler_middleware))
}

/// Middleware that keeps a failing handler from taking the request down
/// with it.
///
/// The request target is logged before anything else. A body that cannot be
/// read is handled like a handler failure and the handler is not called.
pub async fn safe_handler_middleware(
    State(logger): State<Arc<Logger>>,
    request: Request,
    next: Next,
) -> Response {
    let ctx = RequestContext::from_request(&request);
    let span = RequestSpan::enter(&ctx);

    async move {
        logger.info(ctx.target());

        let (parts, body) = request.into_parts();
        let body_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(request_id = %ctx.request_id, "Failed to read request body: {}", e);
                return handle_internal_error(&logger, &Failure::from_error(e), &[], &ctx);
            }
        };

        // The handler gets its own copy; ours is kept for the failure log
        let request = Request::from_parts(parts, Body::from(body_bytes.clone()));

        match AssertUnwindSafe(next.run(request)).catch_unwind().await {
            Ok(response) => {
                RequestSpan::log_exit(&ctx, response.status().as_u16());
                response
            }
            Err(payload) => {
                let failure = Failure::from_panic(payload);
                handle_internal_error(&logger, &failure, &body_bytes, &ctx)
            }
        }
    }
    .instrument(span)
    .await
}

/// Log a failure with its request context and build the 500 response.
///
/// The log gets the classified message and trace; the response body is the
/// raw encoding of the failure value.
pub fn handle_internal_error(
    logger: &Logger,
    failure: &Failure,
    body: &[u8],
    ctx: &RequestContext,
) -> Response {
    let mut captured = classify(failure);
    if !captured.is_usable() {
        captured = classify(&Failure::from(NIL_PANIC_MESSAGE));
    }
    warn!(
        request_id = %ctx.request_id,
        kind = ?captured.kind,
        "Recovered from handler failure"
    );
    logger.log_captured(&captured.with_context(&ctx.uri));

    // Separate line so the request can be replayed from the log
    if !body.is_empty() {
        logger.error(String::from_utf8_lossy(body));
    }

    let encoded = match serde_json::to_vec(&failure.to_json()) {
        Ok(bytes) => Body::from(bytes),
        Err(e) => {
            warn!(request_id = %ctx.request_id, "Failed to encode error response: {}", e);
            Body::empty()
        }
    };

    let mut response = Response::new(encoded);
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    response
}
