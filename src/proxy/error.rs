//! Relay error taxonomy.

use std::time::Duration;

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::security::headers::sanitize_response;
use crate::upstream::FetchError;

/// Terminal failures while relaying a request. None are retried.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The embedded target is not a parseable absolute URL.
    #[error("Bad URL")]
    BadUrl,

    /// The engine was handed a URL it cannot fetch.
    #[error("Bad upstream url")]
    BadUpstreamUrl,

    /// An upstream `location` header could not be resolved.
    #[error("Bad redirect location")]
    BadRedirectLocation,

    /// Redirects kept pointing at non-upstream URLs past the hop limit.
    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),

    /// The allow-list rejected the target.
    #[error("blocked")]
    AccessBlocked,

    /// Upstream produced no response headers within the request deadline.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// Network or transport failure while forwarding.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl RelayError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadUrl => StatusCode::BAD_REQUEST,
            Self::AccessBlocked => StatusCode::FORBIDDEN,
            Self::BadUpstreamUrl
            | Self::BadRedirectLocation
            | Self::TooManyRedirects(_)
            | Self::Timeout(_)
            | Self::Fetch(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadUrl => "bad_url",
            Self::BadUpstreamUrl => "bad_upstream_url",
            Self::BadRedirectLocation => "bad_redirect_location",
            Self::TooManyRedirects(_) => "too_many_redirects",
            Self::AccessBlocked => "blocked",
            Self::Timeout(_) => "timeout",
            Self::Fetch(_) => "fetch",
        }
    }

    fn body(&self) -> String {
        match self {
            Self::Fetch(_) | Self::Timeout(_) => format!("relay error:\n{self}"),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body()));
        *response.status_mut() = self.status_code();
        sanitize_response(response)
    }
}
