//! Route registration for calculator-gateway

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::config::ErrorStatusPolicy;
use crate::domain::Service;

use super::handlers;

/// Register all REST routes.
///
/// * `service` - Domain Service
/// * `policy` - status mapping for calculator errors
pub fn register_routes(router: Router, service: Arc<Service>, policy: ErrorStatusPolicy) -> Router {
    router
        // POST /add - Add a list of numbers
        .route("/add", post(handlers::handle_add))
        // GET /health - Liveness check
        .route("/health", get(handlers::health))
        .layer(Extension(service))
        .layer(Extension(policy))
}
