//! Gateway assembly and HTTP server lifecycle.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use calckit_bootstrap::Logger;
use calculator::LocalCalculatorClient;
use calculator_sdk::{CalculatorClientV1, wire_client};
use tokio::net::TcpListener;

use crate::api::rest::{middleware, routes};
use crate::config::{CalculatorEndpointConfig, CalculatorMode, GatewayConfig};
use crate::domain::Service;

/// Build the calculator client for the configured mode.
///
/// Local mode logs through a child of `logger`.
///
/// Remote mode uses a lazily connected channel, so the gateway starts even
/// when the calculator is down; failures surface per request.
///
/// # Errors
/// Returns an error for an invalid calculator URI.
pub async fn build_calculator(
    cfg: &CalculatorEndpointConfig,
    logger: &Logger,
) -> Result<Arc<dyn CalculatorClientV1>> {
    match cfg.mode {
        CalculatorMode::Remote => wire_client(&cfg.uri, &cfg.grpc_client_config(), false).await,
        CalculatorMode::Local => {
            let service = calculator::Service::new(logger.child("calculator"));
            tracing::info!("using in-process calculator");
            Ok(Arc::new(LocalCalculatorClient::new(Arc::new(service))))
        }
    }
}

/// Routes plus the middleware stack.
pub fn build_router(config: &GatewayConfig, service: Arc<Service>) -> Router {
    let router = routes::register_routes(Router::new(), service, config.error_status_policy);
    middleware::apply_middleware_stack(router, config.request_timeout(), config.body_limit_bytes)
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// # Errors
/// Returns an error if the HTTP server fails.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().ok();
    tracing::info!(addr = ?addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
