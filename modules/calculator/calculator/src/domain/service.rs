//! Domain service for calculator
//!
//! Validates a [`CalculationRequest`] against its constraints and sums the
//! numbers. Every outcome carries the resolved request id.

use std::time::Instant;

use calckit_bootstrap::Logger;
use calculator_sdk::{
    CALCULATION_METHOD, CalculationError, CalculationMetadata, CalculationRequest,
    CalculationResult, Constraints, ErrorCode, Severity,
};
use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Stateless addition service shared by the gRPC server and the in-process
/// client.
#[derive(Clone, Debug)]
pub struct Service {
    logger: Logger,
}

impl Service {
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Validate the request and return the left-to-right sum of its numbers.
    ///
    /// Checks run in a fixed order and the first violation wins: count limit,
    /// then each number against `min_value` and `max_value` in input order,
    /// then emptiness, then overflow of the sum.
    ///
    /// # Errors
    /// Returns a [`CalculationError`] describing the first violation.
    pub fn add(&self, request: CalculationRequest) -> Result<CalculationResult, CalculationError> {
        let request_id = resolve_request_id(&request);
        let span = self.logger.request_span("add", &request_id);
        let _enter = span.enter();

        let started = Instant::now();
        debug!(
            request_id = %request_id,
            numbers_count = request.numbers.len(),
            constraints = ?request.constraints,
            "processing addition"
        );

        let outcome = calculate(&request, request_id);
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &outcome {
            Ok(res) => info!(
                request_id = %res.request_id,
                numbers_count = request.numbers.len(),
                duration_ms,
                calculation_ok = true,
                result = res.value,
                "calculation completed"
            ),
            Err(err) => log_failure(err, request.numbers.len(), duration_ms),
        }
        outcome
    }
}

fn resolve_request_id(request: &CalculationRequest) -> String {
    request
        .supplied_request_id()
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned)
}

fn log_failure(err: &CalculationError, numbers_count: usize, duration_ms: u64) {
    match err.severity {
        Severity::Critical => error!(
            request_id = %err.request_id,
            numbers_count,
            duration_ms,
            calculation_ok = false,
            code = %err.code,
            severity = %err.severity,
            "calculation failed: {}", err.message
        ),
        Severity::Warning | Severity::Error => warn!(
            request_id = %err.request_id,
            numbers_count,
            duration_ms,
            calculation_ok = false,
            code = %err.code,
            severity = %err.severity,
            "calculation rejected: {}", err.message
        ),
    }
}

fn calculate(
    request: &CalculationRequest,
    request_id: String,
) -> Result<CalculationResult, CalculationError> {
    let numbers = &request.numbers;

    if let Some(constraints) = &request.constraints {
        if let Err((code, message)) = check_constraints(numbers, constraints) {
            return Err(CalculationError::new(code, message, request_id));
        }
    }

    if numbers.is_empty() {
        return Err(CalculationError::new(
            ErrorCode::NoNumbers,
            "No numbers provided for addition",
            request_id,
        ));
    }

    let sum = numbers.iter().fold(0.0_f64, |acc, n| acc + n);
    if !sum.is_finite() {
        return Err(CalculationError::new(
            ErrorCode::Overflow,
            "Calculation resulted in infinity",
            request_id,
        ));
    }

    Ok(CalculationResult {
        value: sum,
        request_id,
        metadata: CalculationMetadata {
            computed_at: Utc::now(),
            count_processed: u32::try_from(numbers.len()).unwrap_or(u32::MAX),
            method: CALCULATION_METHOD.to_owned(),
        },
    })
}

fn check_constraints(numbers: &[f64], c: &Constraints) -> Result<(), (ErrorCode, String)> {
    if let Some(max_count) = c.max_count {
        if numbers.len() > usize::try_from(max_count).unwrap_or(usize::MAX) {
            return Err((
                ErrorCode::ConstraintViolation,
                format!("Too many numbers. Maximum allowed: {max_count}"),
            ));
        }
    }

    for &n in numbers {
        if let Some(min) = c.min_value {
            if n < min {
                return Err((
                    ErrorCode::ValueTooLow,
                    format!("Number {n:.6} is below minimum {min:.6}"),
                ));
            }
        }
        if let Some(max) = c.max_value {
            if n > max {
                return Err((
                    ErrorCode::ValueTooHigh,
                    format!("Number {n:.6} is above maximum {max:.6}"),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn service() -> Service {
        Service::new(Logger::disabled())
    }

    fn bounds(min: Option<f64>, max: Option<f64>, count: Option<u32>) -> Constraints {
        Constraints {
            min_value: min,
            max_value: max,
            max_count: count,
        }
    }

    #[test]
    fn sums_unconstrained_numbers() {
        let res = service()
            .add(CalculationRequest::new(vec![1.0, 2.0, 3.0]))
            .unwrap();
        assert!((res.value - 6.0).abs() < f64::EPSILON);
        assert_eq!(res.metadata.count_processed, 3);
        assert_eq!(res.metadata.method, "simple_addition");
    }

    #[test]
    fn sum_is_left_to_right() {
        let numbers = vec![1e16, 1.0, -1e16];
        let expected = numbers.iter().fold(0.0_f64, |acc, n| acc + n);
        let res = service().add(CalculationRequest::new(numbers)).unwrap();
        assert_eq!(res.value.to_bits(), expected.to_bits());
    }

    #[test]
    fn decimal_sum_is_close() {
        let res = service()
            .add(CalculationRequest::new(vec![0.1, 0.2]))
            .unwrap();
        assert!((res.value - 0.3).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_no_numbers_warning() {
        let err = service()
            .add(CalculationRequest::new(vec![]).with_request_id("r-empty"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoNumbers);
        assert_eq!(err.severity, Severity::Warning);
        assert_eq!(err.message, "No numbers provided for addition");
        assert_eq!(err.request_id, "r-empty");
    }

    #[test]
    fn count_limit_checked_before_values() {
        let req = CalculationRequest::new(vec![-100.0, 2.0, 3.0])
            .with_constraints(bounds(Some(0.0), None, Some(2)));
        let err = service().add(req).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConstraintViolation);
        assert_eq!(err.severity, Severity::Warning);
        assert_eq!(err.message, "Too many numbers. Maximum allowed: 2");
    }

    #[test]
    fn count_limit_equal_to_len_passes() {
        let req =
            CalculationRequest::new(vec![1.0, 2.0]).with_constraints(bounds(None, None, Some(2)));
        assert!(service().add(req).is_ok());
    }

    #[test]
    fn zero_count_limit_on_empty_input_is_no_numbers() {
        let req = CalculationRequest::new(vec![]).with_constraints(bounds(None, None, Some(0)));
        assert_eq!(service().add(req).unwrap_err().code, ErrorCode::NoNumbers);
    }

    #[test]
    fn value_below_minimum() {
        let req = CalculationRequest::new(vec![5.0, -1.0])
            .with_constraints(bounds(Some(0.0), None, None));
        let err = service().add(req).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueTooLow);
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.message, "Number -1.000000 is below minimum 0.000000");
    }

    #[test]
    fn value_above_maximum() {
        let req = CalculationRequest::new(vec![5.0, 11.5])
            .with_constraints(bounds(None, Some(10.0), None));
        let err = service().add(req).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueTooHigh);
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.message, "Number 11.500000 is above maximum 10.000000");
    }

    #[test]
    fn first_violating_element_wins() {
        // The high value comes first, so it is reported even though a low
        // value follows.
        let req = CalculationRequest::new(vec![1.0, 50.0, -50.0])
            .with_constraints(bounds(Some(0.0), Some(10.0), None));
        assert_eq!(service().add(req).unwrap_err().code, ErrorCode::ValueTooHigh);
    }

    #[test]
    fn bounds_are_inclusive() {
        let req = CalculationRequest::new(vec![0.0, 10.0])
            .with_constraints(bounds(Some(0.0), Some(10.0), None));
        assert!(service().add(req).is_ok());
    }

    #[test]
    fn infinite_sum_is_critical_overflow() {
        let err = service()
            .add(CalculationRequest::new(vec![f64::MAX, f64::MAX]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Overflow);
        assert_eq!(err.severity, Severity::Critical);
        assert_eq!(err.message, "Calculation resulted in infinity");
    }

    #[test]
    fn supplied_request_id_is_echoed() {
        let res = service()
            .add(CalculationRequest::new(vec![1.0]).with_request_id("abc-123"))
            .unwrap();
        assert_eq!(res.request_id, "abc-123");
    }

    #[test]
    fn missing_or_empty_request_id_is_generated() {
        let a = service().add(CalculationRequest::new(vec![1.0])).unwrap();
        let b = service()
            .add(CalculationRequest::new(vec![1.0]).with_request_id(""))
            .unwrap();
        assert!(Uuid::parse_str(&a.request_id).is_ok());
        assert!(Uuid::parse_str(&b.request_id).is_ok());
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn repeated_calls_agree_except_timestamp() {
        let req = CalculationRequest::new(vec![1.5, 2.5, -1.0]).with_request_id("same");
        let first = service().add(req.clone()).unwrap();
        let second = service().add(req).unwrap();
        assert_eq!(first.value.to_bits(), second.value.to_bits());
        assert_eq!(first.request_id, second.request_id);
        assert_eq!(first.metadata.count_processed, second.metadata.count_processed);
        assert_eq!(first.metadata.method, second.metadata.method);
    }

    #[test]
    #[traced_test]
    fn outcome_is_logged_with_request_id() {
        let _ = service().add(CalculationRequest::new(vec![]).with_request_id("log-me"));
        assert!(logs_contain("log-me"));
        assert!(logs_contain("calculation rejected"));
    }

    #[test]
    #[traced_test]
    fn success_is_logged_with_request_id_under_a_named_logger() {
        let svc = Service::new(Logger::new("calculator"));
        let _ = svc.add(CalculationRequest::new(vec![1.0, 2.0]).with_request_id("ok-id"));
        assert!(logs_contain("ok-id"));
        assert!(logs_contain("calculation completed"));
        assert!(logs_contain("calculation_ok=true"));
    }
}
