//! Domain service for calculator-gateway
//!
//! Forwards a calculation to the configured `CalculatorClientV1` under a
//! deadline and reports the outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use calckit_bootstrap::Logger;
use calculator_sdk::{
    CalculationError, CalculationRequest, CalculationResult, CalculatorClientV1, CalculatorError,
};
use tracing::{Instrument, debug, error, info};

/// Error type for Service operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The calculator rejected the request.
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    /// The calculator could not be reached
    #[error("calculator unreachable: {0}")]
    Transport(String),

    /// Remote service call failed
    #[error("remote service error: {0}")]
    RemoteError(String),

    #[error("calculator did not answer within {0:?}")]
    DeadlineExceeded(Duration),

    /// Internal processing error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CalculatorError> for ServiceError {
    fn from(err: CalculatorError) -> Self {
        match err {
            CalculatorError::Calculation(e) => Self::Calculation(e),
            CalculatorError::Transport(msg) => Self::Transport(msg),
            CalculatorError::Remote(msg) => Self::RemoteError(msg),
            CalculatorError::DeadlineExceeded(d) => Self::DeadlineExceeded(d),
            CalculatorError::Internal(msg) => Self::Internal(msg),
        }
    }
}

/// Domain service that forwards additions to the calculator.
pub struct Service {
    calculator: Arc<dyn CalculatorClientV1>,
    timeout: Duration,
    logger: Logger,
}

impl Service {
    /// `timeout` bounds each calculator call.
    pub fn new(calculator: Arc<dyn CalculatorClientV1>, timeout: Duration, logger: Logger) -> Self {
        Self {
            calculator,
            timeout,
            logger,
        }
    }

    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Add the request's numbers by delegating to the calculator.
    ///
    /// # Errors
    /// Returns [`ServiceError::Calculation`] when the calculator rejects the
    /// input, and a transport variant when it cannot be reached in time.
    pub async fn add(
        &self,
        request: CalculationRequest,
    ) -> Result<CalculationResult, ServiceError> {
        let request_id = request.supplied_request_id().unwrap_or("n/a").to_owned();
        let span = self.logger.request_span("add", &request_id);
        self.add_inner(request, &request_id).instrument(span).await
    }

    async fn add_inner(
        &self,
        request: CalculationRequest,
        request_id: &str,
    ) -> Result<CalculationResult, ServiceError> {
        let numbers_count = request.numbers.len();
        debug!(request_id, numbers_count, "Delegating addition to calculator service");

        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, self.calculator.add(request)).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => Err(ServiceError::DeadlineExceeded(self.timeout)),
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &outcome {
            Ok(res) => info!(
                request_id,
                numbers_count,
                duration_ms,
                calculation_ok = true,
                result = res.value,
                "Calculation completed successfully"
            ),
            Err(ServiceError::Calculation(e)) => info!(
                request_id,
                numbers_count,
                duration_ms,
                calculation_ok = false,
                code = %e.code,
                severity = %e.severity,
                "Calculation rejected: {}", e.message
            ),
            Err(e) => error!(
                request_id,
                numbers_count,
                duration_ms,
                calculation_ok = false,
                error = %e,
                "Calculation failed"
            ),
        }
        outcome
    }
}
