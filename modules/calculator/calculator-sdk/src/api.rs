//! Calculator API trait and types
//!
//! Transport-agnostic contract of the calculator service. The gRPC client in
//! this crate and the in-process client in the `calculator` crate both
//! implement [`CalculatorClientV1`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Method name reported in the metadata of every successful calculation.
pub const CALCULATION_METHOD: &str = "simple_addition";

/// Optional caller-supplied bounds on the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub max_count: Option<u32>,
}

impl Constraints {
    /// Build constraints only when at least one bound is present.
    #[must_use]
    pub fn from_parts(
        min_value: Option<f64>,
        max_value: Option<f64>,
        max_count: Option<u32>,
    ) -> Option<Self> {
        if min_value.is_none() && max_value.is_none() && max_count.is_none() {
            return None;
        }
        Some(Self {
            min_value,
            max_value,
            max_count,
        })
    }
}

/// Input of the addition operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationRequest {
    pub numbers: Vec<f64>,
    /// Generated by the calculator when `None` or empty.
    pub request_id: Option<String>,
    pub constraints: Option<Constraints>,
}

impl CalculationRequest {
    #[must_use]
    pub fn new(numbers: Vec<f64>) -> Self {
        Self {
            numbers,
            request_id: None,
            constraints: None,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// The caller-supplied id, if it is non-empty.
    #[must_use]
    pub fn supplied_request_id(&self) -> Option<&str> {
        self.request_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Descriptive data attached to a successful calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationMetadata {
    pub computed_at: DateTime<Utc>,
    pub count_processed: u32,
    pub method: String,
}

/// Successful outcome of the addition operation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResult {
    pub value: f64,
    pub request_id: String,
    pub metadata: CalculationMetadata,
}

/// Operational importance of a calculation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calculator error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoNumbers,
    ConstraintViolation,
    ValueTooLow,
    ValueTooHigh,
    Overflow,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoNumbers => "NO_NUMBERS",
            Self::ConstraintViolation => "CONSTRAINT_VIOLATION",
            Self::ValueTooLow => "VALUE_TOO_LOW",
            Self::ValueTooHigh => "VALUE_TOO_HIGH",
            Self::Overflow => "OVERFLOW",
        }
    }

    /// Severity the calculator assigns to this code.
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::NoNumbers | Self::ConstraintViolation => Severity::Warning,
            Self::ValueTooLow | Self::ValueTooHigh => Severity::Error,
            Self::Overflow => Severity::Critical,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown calculator error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NO_NUMBERS" => Ok(Self::NoNumbers),
            "CONSTRAINT_VIOLATION" => Ok(Self::ConstraintViolation),
            "VALUE_TOO_LOW" => Ok(Self::ValueTooLow),
            "VALUE_TOO_HIGH" => Ok(Self::ValueTooHigh),
            "OVERFLOW" => Ok(Self::Overflow),
            other => Err(UnknownErrorCode(other.to_owned())),
        }
    }
}

/// Failed outcome of the addition operation.
///
/// Carries the resolved request id so callers can correlate the failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct CalculationError {
    pub code: ErrorCode,
    pub message: String,
    pub severity: Severity,
    pub request_id: String,
}

impl CalculationError {
    /// Error with the severity implied by `code`.
    pub fn new(code: ErrorCode, message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: code.severity(),
            request_id: request_id.into(),
        }
    }
}

/// Calculator API trait
///
/// A stateless service that sums numbers under optional constraints.
#[async_trait]
pub trait CalculatorClientV1: Send + Sync {
    /// Validate and sum the request's numbers.
    async fn add(&self, request: CalculationRequest) -> Result<CalculationResult, CalculatorError>;
}

/// Error type for Calculator operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    /// The calculator rejected the input or could not compute the sum.
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    /// The calculator could not be reached.
    #[error("gRPC transport error: {0}")]
    Transport(String),

    /// The calculator answered with a failure that carries no calculation error.
    #[error("remote service error: {0}")]
    Remote(String),

    /// No answer within the deadline.
    #[error("calculator did not answer within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraints_absent_when_no_bound_given() {
        assert_eq!(Constraints::from_parts(None, None, None), None);
    }

    #[test]
    fn zero_bounds_are_present_not_absent() {
        let c = Constraints::from_parts(Some(0.0), None, Some(0)).unwrap();
        assert_eq!(c.min_value, Some(0.0));
        assert_eq!(c.max_count, Some(0));
        assert_eq!(c.max_value, None);
    }

    #[test]
    fn error_codes_parse_back() {
        for code in [
            ErrorCode::NoNumbers,
            ErrorCode::ConstraintViolation,
            ErrorCode::ValueTooLow,
            ErrorCode::ValueTooHigh,
            ErrorCode::Overflow,
        ] {
            assert_eq!(code.as_str().parse::<ErrorCode>().unwrap(), code);
        }
        assert!("NOPE".parse::<ErrorCode>().is_err());
    }

    #[test]
    fn severities_follow_codes() {
        assert_eq!(ErrorCode::NoNumbers.severity(), Severity::Warning);
        assert_eq!(ErrorCode::ConstraintViolation.severity(), Severity::Warning);
        assert_eq!(ErrorCode::ValueTooLow.severity(), Severity::Error);
        assert_eq!(ErrorCode::ValueTooHigh.severity(), Severity::Error);
        assert_eq!(ErrorCode::Overflow.severity(), Severity::Critical);
        assert!(Severity::Warning < Severity::Error && Severity::Error < Severity::Critical);
    }

    #[test]
    fn severity_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"CRITICAL\""
        );
    }

    #[test]
    fn empty_request_id_is_not_supplied() {
        let req = CalculationRequest::new(vec![1.0]).with_request_id("");
        assert_eq!(req.supplied_request_id(), None);
        let req = CalculationRequest::new(vec![1.0]).with_request_id("abc");
        assert_eq!(req.supplied_request_id(), Some("abc"));
    }

    #[test]
    fn calculation_error_display_includes_code() {
        let err = CalculationError::new(ErrorCode::Overflow, "Calculation resulted in infinity", "r1");
        assert_eq!(err.to_string(), "OVERFLOW: Calculation resulted in infinity");
        assert_eq!(err.severity, Severity::Critical);
    }
}
