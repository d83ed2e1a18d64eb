//! `x-request-id` handling for the HTTP side.

use http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[must_use]
pub fn header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

/// Generates a UUID v4 for requests that arrive without an id.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Non-blank visible ASCII.
#[must_use]
pub fn is_usable(value: &HeaderValue) -> bool {
    value.to_str().is_ok_and(|v| !v.trim().is_empty())
}

/// The request id carried in `headers`, or a fresh one.
#[must_use]
pub fn from_headers(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .filter(|v| is_usable(v))
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_value_is_used() {
        let mut headers = HeaderMap::new();
        headers.insert(header(), HeaderValue::from_static("abc"));
        assert_eq!(from_headers(&headers), "abc");
    }

    #[test]
    fn missing_header_generates_uuid() {
        let id = from_headers(&HeaderMap::new());
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn blank_and_opaque_values_are_unusable() {
        assert!(!is_usable(&HeaderValue::from_static("")));
        assert!(!is_usable(&HeaderValue::from_static("   ")));
        assert!(!is_usable(&HeaderValue::from_bytes(b"caf\xe9").unwrap()));
        assert!(is_usable(&HeaderValue::from_static("req-7")));
    }

    #[test]
    fn make_request_id_yields_uuid() {
        let req = Request::new(());
        let id = MakeReqId.make_request_id(&req).unwrap();
        assert!(Uuid::parse_str(id.header_value().to_str().unwrap()).is_ok());
    }
}
