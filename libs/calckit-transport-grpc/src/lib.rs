#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod client;
pub mod server;

use tonic::Status;
use tonic::metadata::{MetadataMap, MetadataValue};

/// Metadata key carrying the caller's request id across the gRPC hop.
pub const REQUEST_ID_METADATA_KEY: &str = "x-request-id";

/// Put `request_id` into outgoing gRPC metadata.
///
/// # Errors
/// Returns `Status::invalid_argument` if the id is not a valid ASCII header value.
pub fn attach_request_id(meta: &mut MetadataMap, request_id: &str) -> Result<(), Status> {
    let value = MetadataValue::try_from(request_id)
        .map_err(|e| Status::invalid_argument(format!("request id metadata: {e}")))?;
    meta.insert(REQUEST_ID_METADATA_KEY, value);
    Ok(())
}

/// Read the request id from incoming gRPC metadata, if present and non-empty.
#[must_use]
pub fn extract_request_id(meta: &MetadataMap) -> Option<String> {
    meta.get(REQUEST_ID_METADATA_KEY)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
