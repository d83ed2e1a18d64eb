//! In-process implementation of `CalculatorClientV1`.

use std::sync::Arc;

use async_trait::async_trait;
use calculator_sdk::{CalculationRequest, CalculationResult, CalculatorClientV1, CalculatorError};

use crate::domain::Service;

/// Calls the domain service directly, without a network hop.
///
/// Used by the gateway in `local` mode and by tests.
#[derive(Clone)]
pub struct LocalCalculatorClient {
    service: Arc<Service>,
}

impl LocalCalculatorClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CalculatorClientV1 for LocalCalculatorClient {
    async fn add(&self, request: CalculationRequest) -> Result<CalculationResult, CalculatorError> {
        self.service.add(request).map_err(CalculatorError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calckit_bootstrap::Logger;
    use calculator_sdk::ErrorCode;

    #[tokio::test]
    async fn delegates_to_service() {
        let client: Arc<dyn CalculatorClientV1> =
            Arc::new(LocalCalculatorClient::new(Arc::new(Service::new(Logger::disabled()))));

        let ok = client.add(CalculationRequest::new(vec![2.0, 2.0])).await.unwrap();
        assert!((ok.value - 4.0).abs() < f64::EPSILON);

        let err = client.add(CalculationRequest::new(vec![])).await.unwrap_err();
        assert!(matches!(err, CalculatorError::Calculation(e) if e.code == ErrorCode::NoNumbers));
    }
}
