//! gRPC Server implementation for calculator
//!
//! The server implementation handles gRPC requests and delegates
//! to the domain Service for business logic.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use calckit_transport_grpc::extract_request_id;
use calculator_sdk::convert::error_to_status;
use calculator_sdk::{AddRequest, AddResponse, AdditionService, CalculationRequest};

use crate::domain::Service;

/// gRPC service implementation that wraps the domain Service.
#[derive(Clone)]
pub struct CalculatorServiceImpl {
    service: Arc<Service>,
}

impl CalculatorServiceImpl {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl AdditionService for CalculatorServiceImpl {
    async fn add(&self, request: Request<AddRequest>) -> Result<Response<AddResponse>, Status> {
        // The message field wins; metadata is the fallback id source.
        let metadata_id = extract_request_id(request.metadata());

        let mut req = CalculationRequest::from(request.into_inner());
        if req.supplied_request_id().is_none() {
            req.request_id = metadata_id;
        }

        match self.service.add(req) {
            Ok(result) => Ok(Response::new(AddResponse::from(&result))),
            Err(err) => Err(error_to_status(&err)),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use calckit_bootstrap::Logger;
    use calckit_transport_grpc::attach_request_id;
    use calculator_sdk::convert::error_from_status;
    use calculator_sdk::{ErrorCode, proto};

    fn server() -> CalculatorServiceImpl {
        CalculatorServiceImpl::new(Arc::new(Service::new(Logger::disabled())))
    }

    fn add_request(numbers: Vec<f64>, request_id: &str) -> AddRequest {
        AddRequest {
            numbers,
            request_id: request_id.to_owned(),
            constraints: None,
        }
    }

    #[tokio::test]
    async fn success_fills_metadata() {
        let resp = server()
            .add(Request::new(add_request(vec![1.0, 2.0, 3.0], "r1")))
            .await
            .unwrap()
            .into_inner();

        assert!((resp.result - 6.0).abs() < f64::EPSILON);
        assert_eq!(resp.request_id, "r1");
        assert!(resp.error.is_none());
        let meta = resp.calculation_metadata.unwrap();
        assert_eq!(meta.numbers_processed, 3);
        assert_eq!(meta.calculation_method, "simple_addition");
        assert!(meta.calculation_time.ends_with('Z'));
    }

    #[tokio::test]
    async fn metadata_request_id_used_when_field_empty() {
        let mut request = Request::new(add_request(vec![1.0], ""));
        attach_request_id(request.metadata_mut(), "from-header").unwrap();
        let resp = server().add(request).await.unwrap().into_inner();
        assert_eq!(resp.request_id, "from-header");
    }

    #[tokio::test]
    async fn field_request_id_wins_over_metadata() {
        let mut request = Request::new(add_request(vec![1.0], "from-field"));
        attach_request_id(request.metadata_mut(), "from-header").unwrap();
        let resp = server().add(request).await.unwrap().into_inner();
        assert_eq!(resp.request_id, "from-field");
    }

    #[tokio::test]
    async fn violation_is_returned_as_status_with_details() {
        let request = AddRequest {
            numbers: vec![1.0, 2.0, 3.0],
            request_id: "r2".to_owned(),
            constraints: Some(proto::Constraints {
                min_value: None,
                max_value: None,
                max_numbers: Some(2),
            }),
        };
        let status = server().add(Request::new(request)).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let err = error_from_status(&status).unwrap();
        assert_eq!(err.code, ErrorCode::ConstraintViolation);
        assert_eq!(err.request_id, "r2");
    }
}
