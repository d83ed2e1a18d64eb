//! gRPC client transport configuration and connection utilities.
//!
//! This module provides gRPC client configuration with:
//! - Configurable connect and RPC timeouts
//! - HTTP/2 keepalive settings for connection health
//! - Tracing spans around connection establishment
//!
//! Only connection establishment is ever retried. RPCs are not.

use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tracing::Instrument;

fn duration_to_u64_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Configuration for the gRPC client transport stack.
#[derive(Debug, Clone)]
pub struct GrpcClientConfig {
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,

    /// Deadline applied to every RPC on the channel.
    pub rpc_timeout: Duration,

    /// Connection attempts after the first one, used by [`connect_with_retry`].
    pub max_retries: u32,

    /// Base duration for the linear backoff between connection attempts.
    pub base_backoff: Duration,

    /// Cap for the backoff between connection attempts.
    pub max_backoff: Duration,

    /// Service name for tracing.
    pub service_name: &'static str,

    /// Log connection details once connected.
    pub enable_tracing: bool,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            rpc_timeout: Duration::from_secs(5),
            max_retries: 3,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            service_name: "grpc_client",
            enable_tracing: true,
        }
    }
}

impl GrpcClientConfig {
    /// Create a new configuration with the given service name.
    #[must_use]
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub fn without_tracing(mut self) -> Self {
        self.enable_tracing = false;
        self
    }
}

/// Build a tonic `Endpoint` with timeouts and keepalive settings.
fn build_endpoint(uri: String, cfg: &GrpcClientConfig) -> Result<Endpoint, tonic::transport::Error> {
    let endpoint = Endpoint::from_shared(uri)?
        .connect_timeout(cfg.connect_timeout)
        .timeout(cfg.rpc_timeout)
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .http2_keep_alive_interval(Duration::from_secs(30))
        .keep_alive_timeout(Duration::from_secs(10))
        .keep_alive_while_idle(true);

    Ok(endpoint)
}

/// Connect to a gRPC service eagerly with the configured transport stack.
///
/// # Errors
/// Returns an error if the URI is invalid or the connection cannot be established
/// within `connect_timeout`.
pub async fn connect_with_stack<TClient>(
    uri: impl Into<String>,
    cfg: &GrpcClientConfig,
) -> anyhow::Result<TClient>
where
    TClient: From<Channel>,
{
    let uri_string = uri.into();
    let span = tracing::debug_span!(
        "grpc_connect",
        service = cfg.service_name,
        uri = %uri_string
    );

    async move {
        let endpoint = build_endpoint(uri_string, cfg)?;
        let channel = endpoint.connect().await?;

        if cfg.enable_tracing {
            tracing::info!(
                service_name = cfg.service_name,
                connect_timeout_ms = duration_to_u64_ms(cfg.connect_timeout),
                rpc_timeout_ms = duration_to_u64_ms(cfg.rpc_timeout),
                "gRPC client connected"
            );
        }

        Ok(TClient::from(channel))
    }
    .instrument(span)
    .await
}

/// Create a client whose channel connects on first use.
///
/// The returned client can be cloned and shared across tasks; all clones
/// multiplex over one channel. Connection failures surface on the RPC itself.
///
/// # Errors
/// Returns an error only if the URI is invalid.
pub fn connect_lazy<TClient>(uri: impl Into<String>, cfg: &GrpcClientConfig) -> anyhow::Result<TClient>
where
    TClient: From<Channel>,
{
    let uri_string = uri.into();
    let endpoint = build_endpoint(uri_string.clone(), cfg)?;
    let channel = endpoint.connect_lazy();

    if cfg.enable_tracing {
        tracing::info!(
            service_name = cfg.service_name,
            uri = %uri_string,
            rpc_timeout_ms = duration_to_u64_ms(cfg.rpc_timeout),
            "gRPC client configured (lazy connect)"
        );
    }

    Ok(TClient::from(channel))
}

/// Connect to a gRPC service, retrying the connection with linear backoff.
///
/// # Errors
/// Returns the last connection error once `max_retries` extra attempts are exhausted.
pub async fn connect_with_retry<TClient>(
    uri: impl Into<String>,
    cfg: &GrpcClientConfig,
) -> anyhow::Result<TClient>
where
    TClient: From<Channel>,
{
    use anyhow::Context;

    let uri_string = uri.into();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match connect_with_stack::<TClient>(&uri_string, cfg).await {
            Ok(client) => {
                if attempt > 1 {
                    tracing::info!(
                        service = cfg.service_name,
                        attempt,
                        "gRPC connection established after retries"
                    );
                }
                return Ok(client);
            }
            Err(e) if attempt <= cfg.max_retries => {
                let backoff = (cfg.base_backoff * attempt).min(cfg.max_backoff);
                tracing::warn!(
                    service = cfg.service_name,
                    attempt,
                    max_retries = cfg.max_retries,
                    error = %e,
                    backoff_ms = duration_to_u64_ms(backoff),
                    "gRPC connection failed, retrying..."
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                tracing::error!(
                    service = cfg.service_name,
                    attempt,
                    error = %e,
                    "gRPC connection failed after all retries"
                );
                return Err(e).context(format!(
                    "Failed to connect to {} after {} attempts",
                    cfg.service_name, attempt
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = GrpcClientConfig::default();
        assert_eq!(cfg.connect_timeout, Duration::from_secs(5));
        assert_eq!(cfg.rpc_timeout, Duration::from_secs(5));
        assert_eq!(cfg.max_retries, 3);
        assert!(cfg.enable_tracing);
    }

    #[test]
    fn test_build_endpoint_succeeds() {
        let cfg = GrpcClientConfig::default();
        let result = build_endpoint("http://localhost:50051".to_owned(), &cfg);
        assert!(result.is_ok(), "build_endpoint should succeed with valid URI");
    }

    #[test]
    fn test_build_endpoint_empty_uri() {
        let cfg = GrpcClientConfig::default();
        let result = build_endpoint(String::new(), &cfg);
        assert!(result.is_err(), "build_endpoint should fail with empty URI");
    }
}
