//! Server-side request logging for tonic services.
//!
//! Every call gets an `grpc_request` span carrying the method path and the
//! caller's request id; the response (including latency) is logged at INFO
//! and failures at ERROR.

use tower_http::classify::{GrpcErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

use crate::REQUEST_ID_METADATA_KEY;

/// Builds the per-call span from the HTTP/2 request underneath the gRPC call.
#[derive(Clone, Debug, Default)]
pub struct GrpcMakeSpan {
    service: &'static str,
}

impl GrpcMakeSpan {
    #[must_use]
    pub fn new(service: &'static str) -> Self {
        Self { service }
    }
}

impl<B> MakeSpan<B> for GrpcMakeSpan {
    fn make_span(&mut self, request: &http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(REQUEST_ID_METADATA_KEY)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("n/a");

        tracing::info_span!(
            "grpc_request",
            service = self.service,
            method = %request.uri().path(),
            request_id = %request_id,
        )
    }
}

pub type GrpcTraceLayer = TraceLayer<SharedClassifier<GrpcErrorsAsFailures>, GrpcMakeSpan>;

/// Tower layer to put on `tonic::transport::Server::builder()`.
#[must_use]
pub fn grpc_trace_layer(service: &'static str) -> GrpcTraceLayer {
    TraceLayer::new_for_grpc()
        .make_span_with(GrpcMakeSpan::new(service))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_span_reads_request_id_header() {
        let request = http::Request::builder()
            .uri("http://localhost/calculator.v1.AdditionService/Add")
            .header(REQUEST_ID_METADATA_KEY, "req-7")
            .body(())
            .unwrap();

        let mut make = GrpcMakeSpan::new("calculator");
        // No subscriber is installed, so the span is disabled; building it must not panic.
        let _span = make.make_span(&request);
    }

    #[test]
    fn layer_builds() {
        let _layer = grpc_trace_layer("calculator");
    }
}
