//! Wiring for Calculator SDK
//!
//! Provides `wire_client` to build the shared gRPC client handle.

use std::sync::Arc;

use anyhow::Result;
use calckit_transport_grpc::client::GrpcClientConfig;

use crate::SERVICE_NAME;
use crate::api::CalculatorClientV1;
use crate::client::CalculatorGrpcClient;

/// Build the calculator client as a shared trait object.
///
/// With `eager` the connection is established (with retries) before
/// returning; otherwise the channel dials on the first call and connection
/// failures are reported per call.
///
/// # Errors
/// Returns an error for an invalid URI, or when `eager` and the service is unreachable.
pub async fn wire_client(
    uri: &str,
    cfg: &GrpcClientConfig,
    eager: bool,
) -> Result<Arc<dyn CalculatorClientV1>> {
    let client = if eager {
        CalculatorGrpcClient::connect(uri, cfg).await?
    } else {
        CalculatorGrpcClient::connect_lazy(uri, cfg)?
    };
    tracing::info!(service = SERVICE_NAME, uri, eager, "CalculatorClientV1 client wired");
    Ok(Arc::new(client))
}
