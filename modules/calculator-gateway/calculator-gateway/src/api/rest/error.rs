//! Mapping of gateway failures onto HTTP responses.
//!
//! Every failure is written as an [`ErrorResponse`] JSON body.

use axum::Json;
use axum::response::{IntoResponse, Response};
use calculator_sdk::Severity;
use http::StatusCode;

use crate::config::ErrorStatusPolicy;
use crate::domain::ServiceError;

use super::dto::{ErrorInfo, ErrorResponse};

/// Malformed or unreadable request body.
pub const BAD_REQUEST: &str = "BAD_REQUEST";
/// The calculator answered with a failure that carries no calculation error.
pub const GRPC_ERROR: &str = "GRPC_ERROR";
/// The calculator could not be reached, or did not answer in time.
pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// HTTP status for a calculator error of the given severity.
#[must_use]
pub fn status_for_severity(severity: Severity, policy: ErrorStatusPolicy) -> StatusCode {
    match (policy, severity) {
        (ErrorStatusPolicy::BySeverity, Severity::Warning | Severity::Error) => {
            StatusCode::BAD_REQUEST
        }
        (ErrorStatusPolicy::BySeverity, Severity::Critical) | (ErrorStatusPolicy::Uniform, _) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            status,
            body: ErrorResponse {
                result: 0.0,
                request_id: request_id.into(),
                error: ErrorInfo {
                    code: code.into(),
                    message: message.into(),
                    severity,
                },
            },
        }
    }

    pub fn bad_request(request_id: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            request_id,
            BAD_REQUEST,
            "Invalid request body",
            Severity::Error,
        )
    }

    /// Translate a domain failure. `request_id` is used when the failure does
    /// not carry one of its own.
    pub fn from_service(err: ServiceError, request_id: &str, policy: ErrorStatusPolicy) -> Self {
        match err {
            ServiceError::Calculation(e) => {
                let id = if e.request_id.is_empty() {
                    request_id.to_owned()
                } else {
                    e.request_id
                };
                Self::new(
                    status_for_severity(e.severity, policy),
                    id,
                    e.code.as_str(),
                    e.message,
                    e.severity,
                )
            }
            ServiceError::Transport(msg) => Self::new(
                StatusCode::BAD_GATEWAY,
                request_id,
                TRANSPORT_ERROR,
                format!("calculator unreachable: {msg}"),
                Severity::Error,
            ),
            e @ ServiceError::DeadlineExceeded(_) => Self::new(
                StatusCode::GATEWAY_TIMEOUT,
                request_id,
                TRANSPORT_ERROR,
                e.to_string(),
                Severity::Error,
            ),
            ServiceError::RemoteError(msg) => Self::new(
                StatusCode::BAD_GATEWAY,
                request_id,
                GRPC_ERROR,
                format!("gRPC error: {msg}"),
                Severity::Error,
            ),
            ServiceError::Internal(msg) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                request_id,
                INTERNAL_ERROR,
                msg,
                Severity::Error,
            ),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
