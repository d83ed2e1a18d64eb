//! Gateway configuration.

use std::net::SocketAddr;
use std::time::Duration;

use calckit_bootstrap::LoggingConfig;
use calckit_transport_grpc::client::GrpcClientConfig;
use serde::{Deserialize, Serialize};

/// Environment prefix, e.g. `GATEWAY__CALCULATOR__URI=http://calc:50051`.
pub const ENV_PREFIX: &str = "GATEWAY";

/// Where the calculator runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorMode {
    /// Over gRPC at `calculator.uri`.
    #[default]
    Remote,
    /// In this process.
    Local,
}

/// HTTP status chosen for calculator errors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStatusPolicy {
    /// `WARNING` and `ERROR` map to 400, `CRITICAL` to 500.
    #[default]
    BySeverity,
    /// Every calculator error maps to 500.
    Uniform,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalculatorEndpointConfig {
    pub mode: CalculatorMode,
    pub uri: String,
    pub connect_timeout_ms: u64,
    /// Per-call deadline.
    pub rpc_timeout_ms: u64,
}

impl Default for CalculatorEndpointConfig {
    fn default() -> Self {
        Self {
            mode: CalculatorMode::Remote,
            uri: "http://127.0.0.1:50051".to_owned(),
            connect_timeout_ms: 5000,
            rpc_timeout_ms: 5000,
        }
    }
}

impl CalculatorEndpointConfig {
    #[must_use]
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    #[must_use]
    pub fn grpc_client_config(&self) -> GrpcClientConfig {
        GrpcClientConfig::new(calculator_sdk::SERVICE_NAME)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_rpc_timeout(self.rpc_timeout())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// Whole-request timeout enforced by the HTTP middleware.
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
    pub calculator: CalculatorEndpointConfig,
    pub error_status_policy: ErrorStatusPolicy,
    pub logging: LoggingConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout_secs: 15,
            body_limit_bytes: 1024 * 1024,
            calculator: CalculatorEndpointConfig::default(),
            error_status_policy: ErrorStatusPolicy::BySeverity,
            logging: LoggingConfig::default(),
        }
    }
}

/// Semantic configuration error, detected after loading.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayConfigError {
    #[error("calculator.rpc_timeout_ms must be greater than zero")]
    ZeroRpcTimeout,
    #[error(
        "calculator.rpc_timeout_ms ({rpc_timeout_ms} ms) must be below request_timeout_secs ({request_timeout_secs} s)"
    )]
    RpcTimeoutNotBelowRequestTimeout {
        rpc_timeout_ms: u64,
        request_timeout_secs: u64,
    },
}

impl GatewayConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The per-call deadline must expire before the whole-request timeout.
    ///
    /// # Errors
    /// Returns a [`GatewayConfigError`] describing the first inconsistency.
    pub fn validate(&self) -> Result<(), GatewayConfigError> {
        if self.calculator.rpc_timeout_ms == 0 {
            return Err(GatewayConfigError::ZeroRpcTimeout);
        }
        if self.calculator.rpc_timeout() >= self.request_timeout() {
            return Err(GatewayConfigError::RpcTimeoutNotBelowRequestTimeout {
                rpc_timeout_ms: self.calculator.rpc_timeout_ms,
                request_timeout_secs: self.request_timeout_secs,
            });
        }
        Ok(())
    }
}
