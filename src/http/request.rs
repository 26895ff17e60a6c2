//! Request-side helpers.
//!
//! # Responsibilities
//! - Generate a unique id per inbound call (UUID v4, `x-request-id`)
//! - Merge query string and form body into the raw parameter map
//! - Describe the originating URI for diagnostics

use std::collections::HashMap;

use axum::http::{header, HeaderMap, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::calling::RawParameters;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Mints `x-request-id` values for calls that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeCallId;

impl MakeRequestId for MakeCallId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string()).ok().map(RequestId::new)
    }
}

/// Query parameters first, form fields override.
pub fn merge_parameters(
    query: Option<HashMap<String, String>>,
    form: Option<HashMap<String, String>>,
) -> RawParameters {
    let mut params = RawParameters::new();
    params.extend(query.unwrap_or_default());
    params.extend(form.unwrap_or_default());
    params
}

/// `http://<host><path>` when a Host header is present, otherwise the path.
pub fn script_uri(headers: &HeaderMap, uri: &Uri) -> String {
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    match host {
        Some(host) => format!("http://{}{}", host, uri.path()),
        None => uri.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_overrides_query() {
        let query = HashMap::from([("calling".to_string(), "q".to_string()), ("a".to_string(), "1".to_string())]);
        let form = HashMap::from([("calling".to_string(), "f".to_string())]);
        let params = merge_parameters(Some(query), Some(form));
        assert_eq!(params["calling"], "f");
        assert_eq!(params["a"], "1");
        assert!(merge_parameters(None, None).is_empty());
    }

    #[test]
    fn script_uri_drops_query() {
        let mut headers = HeaderMap::new();
        let uri: Uri = "/api/call?calling=abc".parse().unwrap();
        assert_eq!(script_uri(&headers, &uri), "/api/call");

        headers.insert(header::HOST, HeaderValue::from_static("eti.local:8080"));
        assert_eq!(script_uri(&headers, &uri), "http://eti.local:8080/api/call");
    }

    #[test]
    fn call_ids_are_unique() {
        let mut maker = MakeCallId;
        let request = Request::new(());
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
