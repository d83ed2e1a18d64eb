//! Calculator Module
//!
//! Validates and sums numbers, exposed as the `calculator.v1.AdditionService`
//! gRPC service.
//!
//! ## Architecture
//!
//! - `domain/service.rs` - Core business logic
//! - `api/grpc/server.rs` - gRPC server implementation
//! - `client.rs` - in-process `CalculatorClientV1`
//! - `server.rs` - listener and server lifecycle
//!
//! External consumers should use the `calculator-sdk` crate, which provides
//! the gRPC client and `wire_client()`.

pub mod config;
pub mod server;

mod client;
pub use client::LocalCalculatorClient;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;

pub use config::CalculatorConfig;
pub use domain::Service;
