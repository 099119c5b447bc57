//! Upstream transport seam.
//!
//! # Data Flow
//! ```text
//! proxy engine builds OutboundRequest
//!     → Upstream::fetch (one HTTP exchange, never follows redirects)
//!     → UpstreamResponse (status, headers, streamed body)
//! ```
//!
//! # Design Decisions
//! - The engine depends only on these value types and the trait
//! - Bodies are streamed in both directions, never buffered
//! - Redirect handling belongs to the engine, not the transport

pub mod client;

use std::fmt;

use axum::{
    body::Body,
    http::{HeaderMap, Method, StatusCode},
};
use futures_util::future::BoxFuture;
use thiserror::Error;
use url::Url;

pub use client::ReqwestUpstream;

/// A request ready to be sent upstream.
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Body,
}

impl OutboundRequest {
    /// Body-less GET with no headers.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }
}

impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// A response received from upstream, body not yet consumed.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Errors raised by a transport.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The exchange failed (DNS, connect, TLS, reset, timeout).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The outbound request could not be built.
    #[error("invalid outbound request: {0}")]
    InvalidRequest(String),
}

/// One HTTP exchange with an upstream origin.
///
/// Implementations must not follow redirects: a 3xx comes back as-is so the
/// engine can decide whether to hand it to the caller or chase it.
pub trait Upstream: Send + Sync {
    fn fetch(&self, request: OutboundRequest) -> BoxFuture<'_, Result<UpstreamResponse, FetchError>>;
}
