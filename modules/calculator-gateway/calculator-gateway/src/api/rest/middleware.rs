//! HTTP middleware stack.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::middleware::{Next, from_fn_with_state, map_request};
use axum::response::IntoResponse;
use calculator_sdk::Severity;
use http::{Request, Response, StatusCode};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing::field::Empty;

use super::error::{ApiError, TRANSPORT_ERROR};
use super::request_id::{self, MakeReqId};

/// Drop an `x-request-id` that is empty or not visible ASCII, so that
/// `SetRequestIdLayer` generates a usable one.
async fn strip_unusable_request_id(mut req: Request<Body>) -> Request<Body> {
    let unusable = req
        .headers()
        .get(request_id::REQUEST_ID_HEADER)
        .is_some_and(|v| !request_id::is_usable(v));
    if unusable {
        req.headers_mut().remove(request_id::REQUEST_ID_HEADER);
    }
    req
}

/// Whole-request deadline. Expiry is answered with the JSON error body.
async fn enforce_request_timeout(
    State(limit): State<Duration>,
    req: Request<Body>,
    next: Next,
) -> Response<Body> {
    let rid = request_id::from_headers(req.headers());
    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(request_id = %rid, timeout = ?limit, "request timed out");
            ApiError::new(
                StatusCode::GATEWAY_TIMEOUT,
                rid,
                TRANSPORT_ERROR,
                format!("request did not complete within {limit:?}"),
                Severity::Error,
            )
            .into_response()
        }
    }
}

fn apply_trace_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<Body>| {
                let rid = req
                    .headers()
                    .get(request_id::REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");

                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    version = ?req.version(),
                    module = "calculator_gateway",
                    request_id = %rid,
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(|res: &Response<Body>, latency: Duration, span: &Span| {
                span.record("status", res.status().as_u16());
                span.record(
                    "latency_ms",
                    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                );
                tracing::info!(parent: span, "request finished");
            }),
    )
}

/// Apply all middleware layers to a router.
///
/// At runtime requests flow outermost to innermost:
/// request id cleanup → `SetRequestId` → `PropagateRequestId` → Trace → Timeout →
/// `BodyLimit` → Router.
pub fn apply_middleware_stack(router: Router, request_timeout: Duration, body_limit_bytes: usize) -> Router {
    // Layer registration order (reverse of execution): innermost -> outermost

    // 4) Body limit; oversized bodies surface as a JSON rejection in the handler
    let router = router.layer(DefaultBodyLimit::max(body_limit_bytes));

    // 3) Timeout
    let router = router.layer(from_fn_with_state(request_timeout, enforce_request_timeout));

    // 2) Trace
    let router = apply_trace_layer(router);

    // 1) Request id: clean up (outermost), set, then propagate to the response
    router
        .layer(PropagateRequestIdLayer::new(request_id::header()))
        .layer(SetRequestIdLayer::new(request_id::header(), MakeReqId))
        .layer(map_request(strip_unusable_request_id))
}
