//! Calculator server configuration.

use std::net::SocketAddr;

use calckit_bootstrap::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Environment prefix, e.g. `CALCULATOR__LISTEN_ADDR=127.0.0.1:6000`.
pub const ENV_PREFIX: &str = "CALCULATOR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalculatorConfig {
    pub listen_addr: SocketAddr,
    pub logging: LoggingConfig,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 50051)),
            logging: LoggingConfig::default(),
        }
    }
}
