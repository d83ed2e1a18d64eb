//! Calculator SDK
//!
//! This crate provides everything needed to consume the calculator service:
//! - Domain types (`CalculationRequest`, `CalculationResult`, `CalculationError`)
//! - API trait (`CalculatorClientV1`) and client error (`CalculatorError`)
//! - gRPC client (`CalculatorGrpcClient`) and wiring (`wire_client`)
//! - Proto stubs and conversions for the server implementation
//!
//! ## Usage
//!
//! ```ignore
//! use calculator_sdk::{CalculationRequest, wire_client};
//!
//! let client = wire_client("http://127.0.0.1:50051", &cfg, false).await?;
//! let result = client.add(CalculationRequest::new(vec![1.0, 2.0])).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === API TRAIT AND TYPES ===
mod api;
pub use api::{
    CALCULATION_METHOD, CalculationError, CalculationMetadata, CalculationRequest,
    CalculationResult, CalculatorClientV1, CalculatorError, Constraints, ErrorCode, Severity,
    UnknownErrorCode,
};

// === WIRING ===
mod client;
mod wiring;
pub use client::CalculatorGrpcClient;
pub use wiring::wire_client;

// === PROTO CONVERSIONS ===
pub mod convert;

// === GRPC PROTO STUBS (for server implementation) ===
/// Generated protobuf types for `AdditionService`
#[allow(clippy::all, clippy::pedantic)]
pub mod proto {
    tonic::include_proto!("calculator.v1");
}

// Re-export proto types needed by server
pub use proto::addition_service_server::{AdditionService, AdditionServiceServer};
pub use proto::{AddRequest, AddResponse};

/// Fully-qualified gRPC service name
pub const SERVICE_NAME: &str = "calculator.v1.AdditionService";
