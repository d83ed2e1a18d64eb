//! REST handlers for calculator-gateway

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use http::HeaderMap;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::config::ErrorStatusPolicy;
use crate::domain::Service;

use super::dto::{AddRequest, AddResponse};
use super::error::ApiError;
use super::request_id;

/// Handler for POST /add
///
/// The request id comes from `x-request-id` and is forwarded to the
/// calculator, so the id in the body matches the response header.
pub async fn handle_add(
    Extension(service): Extension<Arc<Service>>,
    Extension(policy): Extension<ErrorStatusPolicy>,
    headers: HeaderMap,
    payload: Result<Json<AddRequest>, JsonRejection>,
) -> Result<Json<AddResponse>, ApiError> {
    let request_id = request_id::from_headers(&headers);
    let span = service.logger().request_span("http_add", &request_id);
    info!(
        parent: &span,
        request_id = %request_id,
        method = "POST",
        path = "/add",
        "Received add request"
    );

    let Json(req) = payload.map_err(|rejection| {
        warn!(
            parent: &span,
            request_id = %request_id,
            error = %rejection,
            "Failed to decode request body"
        );
        ApiError::bad_request(&request_id)
    })?;

    let result = service
        .add(req.into_domain(request_id.clone()))
        .await
        .map_err(|e| ApiError::from_service(e, &request_id, policy))?;

    Ok(Json(AddResponse::from(result)))
}

/// Handler for GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
