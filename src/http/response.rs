//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn an upstream response into a client response
//! - Drop hop-by-hop headers and sanitize for cross-origin use
//! - Keep the body streaming
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Status and end-to-end headers pass through untouched

use axum::response::Response;

use crate::security::headers::{sanitize_response, strip_response_hop_headers};
use crate::upstream::UpstreamResponse;

/// Build the client response for a relayed upstream response.
pub fn relay_response(upstream: UpstreamResponse) -> Response {
    sanitize_response(passthrough_response(upstream))
}

/// Pass an upstream response through without touching CORS headers.
pub fn passthrough_response(upstream: UpstreamResponse) -> Response {
    let UpstreamResponse {
        status,
        mut headers,
        body,
    } = upstream;

    strip_response_hop_headers(&mut headers);

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
