//! Header manipulation and CORS.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Strip headers that stop browsers from using relayed content
//!   cross-origin, and add permissive CORS headers
//! - Answer CORS preflight probes
//!
//! # Design Decisions
//! - The outbound `host` is derived from the target URL, never copied
//! - Sanitization is idempotent; applying it twice changes nothing

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::Response,
};

/// Methods advertised in preflight responses.
pub const PREFLIGHT_ALLOW_METHODS: &str = "GET,POST,PUT,PATCH,TRACE,DELETE,HEAD,OPTIONS";

/// Preflight cache lifetime in seconds (20 days).
pub const PREFLIGHT_MAX_AGE: &str = "1728000";

/// Response headers removed before a response leaves the relay.
pub const RESTRICTIVE_HEADERS: &[&str] = &[
    "content-security-policy",
    "content-security-policy-report-only",
    "clear-site-data",
];

/// Request headers that describe the inbound hop and are not forwarded.
const HOP_BY_HOP_REQUEST: &[HeaderName] = &[
    header::HOST,
    header::CONNECTION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Response headers that describe the upstream hop and are not returned.
const HOP_BY_HOP_RESPONSE: &[HeaderName] = &[header::CONNECTION, header::TRANSFER_ENCODING];

/// Legacy hop-by-hop headers without a constant in `http`.
const HOP_BY_HOP_EXTRA: &[&str] = &["keep-alive", "proxy-connection"];

/// Copy inbound headers for forwarding, without hop-by-hop entries.
pub fn forwardable_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in HOP_BY_HOP_REQUEST {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_EXTRA {
        headers.remove(*name);
    }
    headers
}

/// Remove hop-by-hop entries from an upstream response's headers.
pub fn strip_response_hop_headers(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_RESPONSE {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_EXTRA {
        headers.remove(*name);
    }
}

/// Make headers safe for cross-origin consumption.
pub fn sanitize_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    for name in RESTRICTIVE_HEADERS {
        headers.remove(*name);
    }
}

/// Apply [`sanitize_headers`] to a finished response.
pub fn sanitize_response(mut response: Response) -> Response {
    sanitize_headers(response.headers_mut());
    response
}

/// True for a browser CORS preflight probe.
pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS && headers.contains_key(header::ACCESS_CONTROL_REQUEST_HEADERS)
}

/// The 204 answer to a preflight probe.
pub fn preflight_response() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(PREFLIGHT_ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE),
    );
    response
}
