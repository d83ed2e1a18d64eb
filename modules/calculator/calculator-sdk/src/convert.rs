//! Conversions between the domain types in [`crate::api`] and the protobuf
//! messages of `calculator.v1`.
//!
//! A calculation error crosses the wire as a non-OK `Status` whose details
//! hold an encoded `AddResponse` (result 0, request id, error info).

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use prost::Message;
use tonic::{Code, Status};

use crate::api::{
    CalculationError, CalculationMetadata, CalculationRequest, CalculationResult, CalculatorError,
    Constraints, ErrorCode, Severity,
};
use crate::proto::{self, add_response};

impl From<Constraints> for proto::Constraints {
    fn from(c: Constraints) -> Self {
        Self {
            min_value: c.min_value,
            max_value: c.max_value,
            max_numbers: c.max_count,
        }
    }
}

impl From<proto::Constraints> for Constraints {
    fn from(c: proto::Constraints) -> Self {
        Self {
            min_value: c.min_value,
            max_value: c.max_value,
            max_count: c.max_numbers,
        }
    }
}

impl From<&CalculationRequest> for proto::AddRequest {
    fn from(req: &CalculationRequest) -> Self {
        Self {
            numbers: req.numbers.clone(),
            request_id: req.request_id.clone().unwrap_or_default(),
            constraints: req.constraints.map(Into::into),
        }
    }
}

impl From<proto::AddRequest> for CalculationRequest {
    fn from(req: proto::AddRequest) -> Self {
        Self {
            numbers: req.numbers,
            request_id: Some(req.request_id).filter(|id| !id.is_empty()),
            constraints: req.constraints.map(Into::into),
        }
    }
}

impl From<Severity> for add_response::Severity {
    fn from(s: Severity) -> Self {
        match s {
            Severity::Warning => Self::Warning,
            Severity::Error => Self::Error,
            Severity::Critical => Self::Critical,
        }
    }
}

fn severity_from_proto(s: add_response::Severity) -> Option<Severity> {
    match s {
        add_response::Severity::Unspecified => None,
        add_response::Severity::Warning => Some(Severity::Warning),
        add_response::Severity::Error => Some(Severity::Error),
        add_response::Severity::Critical => Some(Severity::Critical),
    }
}

impl From<&CalculationResult> for proto::AddResponse {
    fn from(res: &CalculationResult) -> Self {
        Self {
            result: res.value,
            request_id: res.request_id.clone(),
            error: None,
            calculation_metadata: Some(add_response::CalculationMetadata {
                calculation_time: res
                    .metadata
                    .computed_at
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                numbers_processed: res.metadata.count_processed,
                calculation_method: res.metadata.method.clone(),
            }),
        }
    }
}

/// Partial response describing a failed calculation.
#[must_use]
pub fn error_to_proto(err: &CalculationError) -> proto::AddResponse {
    let mut info = add_response::ErrorInfo {
        code: err.code.as_str().to_owned(),
        message: err.message.clone(),
        severity: 0,
    };
    info.set_severity(err.severity.into());

    proto::AddResponse {
        result: 0.0,
        request_id: err.request_id.clone(),
        error: Some(info),
        calculation_metadata: None,
    }
}

fn error_from_info(info: &add_response::ErrorInfo, request_id: String) -> Option<CalculationError> {
    let code: ErrorCode = info.code.parse().ok()?;
    Some(CalculationError {
        code,
        message: info.message.clone(),
        severity: severity_from_proto(info.severity()).unwrap_or_else(|| code.severity()),
        request_id,
    })
}

/// Status code signalling a calculation error.
#[must_use]
pub fn grpc_code(code: ErrorCode) -> Code {
    match code {
        ErrorCode::NoNumbers
        | ErrorCode::ConstraintViolation
        | ErrorCode::ValueTooLow
        | ErrorCode::ValueTooHigh => Code::InvalidArgument,
        ErrorCode::Overflow => Code::OutOfRange,
    }
}

/// Encode a calculation error as a failed gRPC status.
#[must_use]
pub fn error_to_status(err: &CalculationError) -> Status {
    let details = Bytes::from(error_to_proto(err).encode_to_vec());
    Status::with_details(grpc_code(err.code), err.to_string(), details)
}

/// Recover the calculation error carried in a status' details, if any.
#[must_use]
pub fn error_from_status(status: &Status) -> Option<CalculationError> {
    if status.details().is_empty() {
        return None;
    }
    let resp = proto::AddResponse::decode(status.details()).ok()?;
    let info = resp.error.as_ref()?;
    error_from_info(info, resp.request_id)
}

/// Interpret a successful `AddResponse`.
///
/// A response that carries error info (peers that report errors in-band only)
/// is turned into [`CalculatorError::Calculation`].
///
/// # Errors
/// Returns [`CalculatorError::Calculation`] for in-band errors and
/// [`CalculatorError::Remote`] for malformed responses.
pub fn result_from_proto(resp: proto::AddResponse) -> Result<CalculationResult, CalculatorError> {
    if let Some(info) = &resp.error {
        return Err(match error_from_info(info, resp.request_id.clone()) {
            Some(err) => CalculatorError::Calculation(err),
            None => CalculatorError::Remote(format!("{}: {}", info.code, info.message)),
        });
    }

    let meta = resp
        .calculation_metadata
        .ok_or_else(|| CalculatorError::Remote("response without calculation metadata".to_owned()))?;

    let computed_at = DateTime::parse_from_rfc3339(&meta.calculation_time)
        .map_err(|e| {
            CalculatorError::Remote(format!(
                "invalid calculation_time '{}': {e}",
                meta.calculation_time
            ))
        })?
        .with_timezone(&Utc);

    Ok(CalculationResult {
        value: resp.result,
        request_id: resp.request_id,
        metadata: CalculationMetadata {
            computed_at,
            count_processed: meta.numbers_processed,
            method: meta.calculation_method,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CALCULATION_METHOD;

    fn sample_result() -> CalculationResult {
        CalculationResult {
            value: 6.0,
            request_id: "req-1".to_owned(),
            metadata: CalculationMetadata {
                computed_at: DateTime::parse_from_rfc3339("2024-05-01T10:00:00.123Z")
                    .unwrap()
                    .with_timezone(&Utc),
                count_processed: 3,
                method: CALCULATION_METHOD.to_owned(),
            },
        }
    }

    #[test]
    fn request_keeps_constraint_absence() {
        let req = CalculationRequest::new(vec![1.0, 2.0]);
        let wire = proto::AddRequest::from(&req);
        assert!(wire.constraints.is_none());
        assert!(wire.request_id.is_empty());

        let back = CalculationRequest::from(wire);
        assert_eq!(back.constraints, None);
        assert_eq!(back.request_id, None);
    }

    #[test]
    fn request_keeps_zero_valued_constraints() {
        let req = CalculationRequest::new(vec![1.0])
            .with_request_id("abc")
            .with_constraints(Constraints {
                min_value: Some(0.0),
                max_value: None,
                max_count: Some(0),
            });
        let back = CalculationRequest::from(proto::AddRequest::from(&req));
        assert_eq!(back, req);
    }

    #[test]
    fn result_survives_the_wire() {
        let res = sample_result();
        let back = result_from_proto(proto::AddResponse::from(&res)).unwrap();
        assert_eq!(back, res);
    }

    #[test]
    fn status_carries_structured_error() {
        let err = CalculationError::new(ErrorCode::ValueTooLow, "Number -1 is below minimum 0", "req-9");
        let status = error_to_status(&err);

        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(error_from_status(&status), Some(err));

        let partial = proto::AddResponse::decode(status.details()).unwrap();
        assert!(partial.result.abs() < f64::EPSILON);
        assert_eq!(partial.request_id, "req-9");
    }

    #[test]
    fn overflow_maps_to_out_of_range() {
        let err = CalculationError::new(ErrorCode::Overflow, "Calculation resulted in infinity", "r");
        assert_eq!(error_to_status(&err).code(), Code::OutOfRange);
    }

    #[test]
    fn plain_status_has_no_calculation_error() {
        assert_eq!(error_from_status(&Status::unavailable("down")), None);
    }

    #[test]
    fn in_band_error_in_ok_response_is_reported() {
        let err = CalculationError::new(ErrorCode::NoNumbers, "No numbers provided for addition", "r2");
        let resp = error_to_proto(&err);
        assert_eq!(
            result_from_proto(resp).unwrap_err(),
            CalculatorError::Calculation(err)
        );
    }

    #[test]
    fn unspecified_severity_falls_back_to_code() {
        let info = add_response::ErrorInfo {
            code: "OVERFLOW".to_owned(),
            message: "boom".to_owned(),
            severity: 0,
        };
        let err = error_from_info(&info, "r".to_owned()).unwrap();
        assert_eq!(err.severity, Severity::Critical);
    }

    #[test]
    fn missing_metadata_is_remote_error() {
        let resp = proto::AddResponse {
            result: 1.0,
            request_id: "r".to_owned(),
            error: None,
            calculation_metadata: None,
        };
        assert!(matches!(
            result_from_proto(resp),
            Err(CalculatorError::Remote(_))
        ));
    }
}
