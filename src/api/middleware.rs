use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[must_use]
pub fn request_id_header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

/// Reuses a well-formed `x-request-id` sent by the client, otherwise mints a UUID v4.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidOrHeader;

impl MakeRequestId for MakeRequestUuidOrHeader {
    fn make_request_id<B>(&mut self, request: &Request<B>) -> Option<RequestId> {
        let from_header = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .filter(|value| value.to_str().is_ok_and(|s| !s.is_empty() && s.len() <= 128))
            .cloned();

        let value = from_header.or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok())?;
        Some(RequestId::new(value))
    }
}
