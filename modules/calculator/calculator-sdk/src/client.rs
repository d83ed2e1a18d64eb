//! gRPC client implementation of `CalculatorClientV1`

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use calckit_transport_grpc::attach_request_id;
use calckit_transport_grpc::client::{GrpcClientConfig, connect_lazy, connect_with_retry};
use tonic::transport::Channel;

use crate::api::{CalculationRequest, CalculationResult, CalculatorClientV1, CalculatorError};
use crate::convert::{error_from_status, result_from_proto};
use crate::proto::AddRequest;
use crate::proto::addition_service_client::AdditionServiceClient;

/// gRPC client for the calculator service.
///
/// Cheap to clone; clones share one multiplexed channel.
#[derive(Clone)]
pub struct CalculatorGrpcClient {
    inner: AdditionServiceClient<Channel>,
    rpc_timeout: Duration,
}

impl CalculatorGrpcClient {
    /// Connect eagerly, retrying the connection per `cfg`.
    ///
    /// # Errors
    /// Returns an error if the service cannot be reached after all attempts.
    pub async fn connect(uri: impl Into<String>, cfg: &GrpcClientConfig) -> Result<Self> {
        let channel: Channel = connect_with_retry(uri, cfg).await?;
        Ok(Self::from_channel(channel, cfg.rpc_timeout))
    }

    /// Build a client whose channel dials on first use.
    ///
    /// # Errors
    /// Returns an error if `uri` is invalid.
    pub fn connect_lazy(uri: impl Into<String>, cfg: &GrpcClientConfig) -> Result<Self> {
        let channel: Channel = connect_lazy(uri, cfg)?;
        Ok(Self::from_channel(channel, cfg.rpc_timeout))
    }

    #[must_use]
    pub fn from_channel(channel: Channel, rpc_timeout: Duration) -> Self {
        Self {
            inner: AdditionServiceClient::new(channel),
            rpc_timeout,
        }
    }

    fn map_status(&self, status: &tonic::Status) -> CalculatorError {
        if let Some(err) = error_from_status(status) {
            return CalculatorError::Calculation(err);
        }
        match status.code() {
            tonic::Code::DeadlineExceeded | tonic::Code::Cancelled => {
                CalculatorError::DeadlineExceeded(self.rpc_timeout)
            }
            tonic::Code::Unavailable => CalculatorError::Transport(status.message().to_owned()),
            code => CalculatorError::Remote(format!("{code:?}: {}", status.message())),
        }
    }
}

#[async_trait]
impl CalculatorClientV1 for CalculatorGrpcClient {
    async fn add(&self, request: CalculationRequest) -> Result<CalculationResult, CalculatorError> {
        let mut client = self.inner.clone();

        let proto_req = AddRequest::from(&request);
        let mut grpc_request = tonic::Request::new(proto_req);
        grpc_request.set_timeout(self.rpc_timeout);

        if let Some(id) = request.supplied_request_id() {
            attach_request_id(grpc_request.metadata_mut(), id)
                .map_err(|e| CalculatorError::Internal(e.message().to_owned()))?;
        }

        let response = client
            .add(grpc_request)
            .await
            .map_err(|status| self.map_status(&status))?;

        result_from_proto(response.into_inner())
    }
}
