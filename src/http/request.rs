//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID when the client did not send one
//! - Capture the inbound request as an [`InboundRequest`] value
//! - Extract routing-relevant information (host, path and query, `q`)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The body stays a stream; nothing here reads it

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, Method, Request, Uri},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::form_urlencoded;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// The request as received, before any relay decision.
pub struct InboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Body,
}

impl InboundRequest {
    pub fn from_request(request: Request<Body>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        }
    }

    /// Path plus query string, always starting with `/`.
    pub fn path_and_query(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
    }

    /// Host the client addressed: the `Host` header, else the URI authority.
    pub fn host(&self) -> Option<&str> {
        self.headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| self.uri.authority().map(|a| a.as_str()))
    }

    /// First value of a decoded query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.uri.query()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    pub fn request_id(&self) -> &str {
        self.headers
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}
