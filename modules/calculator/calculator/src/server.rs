//! gRPC server lifecycle.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use calckit_transport_grpc::server::grpc_trace_layer;
use calculator_sdk::{AdditionServiceServer, SERVICE_NAME};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use crate::api::grpc::CalculatorServiceImpl;
use crate::domain::Service;

/// Bind the listening socket. Port `0` picks a free port.
///
/// # Errors
/// Returns an error if the address cannot be bound.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind gRPC listener on {addr}"))
}

/// Serve `AdditionService` on `listener` until `shutdown` resolves.
///
/// # Errors
/// Returns an error if the tonic server fails.
pub async fn serve<F>(listener: TcpListener, service: Arc<Service>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let local_addr = listener.local_addr().ok();
    tracing::info!(
        service = SERVICE_NAME,
        addr = ?local_addr,
        "gRPC server listening"
    );

    let incoming = TcpListenerStream::new(listener);
    Server::builder()
        .layer(grpc_trace_layer(SERVICE_NAME))
        .add_service(AdditionServiceServer::new(CalculatorServiceImpl::new(service)))
        .serve_with_incoming_shutdown(incoming, shutdown)
        .await
        .context("gRPC server failed")?;

    tracing::info!(service = SERVICE_NAME, "gRPC server stopped");
    Ok(())
}
