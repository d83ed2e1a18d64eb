//! Calculator Gateway
//!
//! Accepts `POST /add` JSON requests, forwards them to the calculator
//! (over gRPC or in-process) and maps results and errors back to JSON.
//!
//! ## Architecture
//!
//! - `domain/service.rs` - forwarding under a deadline
//! - `api/rest/` - DTOs, handlers, error mapping, routes, middleware
//! - `server.rs` - calculator wiring and HTTP server lifecycle

pub mod config;
pub mod server;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;

pub use config::{CalculatorMode, ErrorStatusPolicy, GatewayConfig, GatewayConfigError};
pub use domain::{Service, ServiceError};
