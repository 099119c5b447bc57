//! Forwarding and redirect resolution.
//!
//! # Responsibilities
//! - Send the request upstream with redirects handled here, not by the transport
//! - Resolve `location` against the URL that produced it
//! - Hand upstream-like redirects back to the caller through the relay prefix
//! - Chase every other redirect, up to `max_redirects` hops
//!
//! # Redirect Handling
//! ```text
//! fetch(url) ──► no location ─────────────────► relay response
//!      │
//!      └─────► location ─► resolve ─► upstream-like? ─yes─► location = prefix + url
//!                                        │
//!                                        no
//!                                        ▼
//!                           hop budget left? ─no─► TooManyRedirects
//!                                        │
//!                                       yes ─► fetch(resolved)
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::Response,
};
use url::Url;

use crate::http::response::relay_response;
use crate::observability::metrics;
use crate::proxy::error::RelayError;
use crate::routing::is_upstream_like;
use crate::upstream::{OutboundRequest, Upstream, UpstreamResponse};

/// Request headers that only make sense together with a body.
const BODY_HEADERS: &[header::HeaderName] = &[
    header::CONTENT_ENCODING,
    header::CONTENT_LANGUAGE,
    header::CONTENT_LOCATION,
    header::CONTENT_LENGTH,
    header::CONTENT_TYPE,
];

/// Method, headers and body to forward. The URL changes per hop; this does not,
/// except where redirect semantics require a switch to GET.
pub struct RequestSpec {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Body,
}

impl RequestSpec {
    pub fn new(method: Method, headers: HeaderMap, body: Body) -> Self {
        Self {
            method,
            headers,
            body,
        }
    }
}

/// Forwards requests and decides what to do with upstream redirects.
#[derive(Clone)]
pub struct ProxyEngine {
    upstream: Arc<dyn Upstream>,
    prefix: String,
    max_redirects: usize,
}

impl ProxyEngine {
    pub fn new(upstream: Arc<dyn Upstream>, prefix: impl Into<String>, max_redirects: usize) -> Self {
        Self {
            upstream,
            prefix: prefix.into(),
            max_redirects,
        }
    }

    /// Forward `spec` to `target`, following non-upstream redirects.
    ///
    /// The request body is streamed to the first hop only; redirects the
    /// relay follows on its own are sent without a body.
    pub async fn proxy(&self, target: Url, spec: RequestSpec) -> Result<Response, RelayError> {
        let RequestSpec {
            mut method,
            mut headers,
            body,
        } = spec;
        let mut body = Some(body);
        let mut current = target;
        let mut followed = 0;

        loop {
            ensure_fetchable(&current)?;

            let request = OutboundRequest {
                method: method.clone(),
                url: current.clone(),
                headers: headers.clone(),
                body: body.take().unwrap_or_else(Body::empty),
            };
            let response = self.upstream.fetch(request).await?;

            tracing::debug!(
                hop = followed,
                url = %current,
                status = %response.status,
                "Upstream responded"
            );

            let Some(location) = response.headers.get(header::LOCATION) else {
                return Ok(relay_response(response));
            };
            let resolved = resolve_location(&current, location)?;

            if is_upstream_like(resolved.as_str()) {
                metrics::record_redirect("rewritten");
                return self.rewrite_location(response, &resolved);
            }

            if followed == self.max_redirects {
                tracing::warn!(
                    url = %resolved,
                    max_redirects = self.max_redirects,
                    "Redirect limit reached"
                );
                return Err(RelayError::TooManyRedirects(self.max_redirects));
            }
            followed += 1;
            metrics::record_redirect("followed");

            if switches_to_get(response.status, &method) {
                method = Method::GET;
            }
            // The body went to the first hop; later hops send none.
            for name in BODY_HEADERS {
                headers.remove(name);
            }

            tracing::debug!(from = %current, to = %resolved, "Following redirect");
            current = resolved;
        }
    }

    /// Point the caller at `<prefix><resolved>` so its next request comes
    /// back through the relay.
    fn rewrite_location(
        &self,
        mut response: UpstreamResponse,
        resolved: &Url,
    ) -> Result<Response, RelayError> {
        let location = format!("{}{}", self.prefix, resolved);
        let value = HeaderValue::from_str(&location).map_err(|_| RelayError::BadRedirectLocation)?;
        response.headers.insert(header::LOCATION, value);

        tracing::debug!(location = %location, "Returning rewritten redirect");
        Ok(relay_response(response))
    }
}

/// Only absolute http(s) URLs with a host can be fetched.
fn ensure_fetchable(url: &Url) -> Result<(), RelayError> {
    if matches!(url.scheme(), "http" | "https") && url.has_host() {
        Ok(())
    } else {
        Err(RelayError::BadUpstreamUrl)
    }
}

/// Resolve a `location` value against the URL that returned it.
///
/// Handles absolute, scheme-relative, path-relative and fragment-only values.
pub fn resolve_location(base: &Url, location: &HeaderValue) -> Result<Url, RelayError> {
    let location = location
        .to_str()
        .map_err(|_| RelayError::BadRedirectLocation)?;

    base.join(location).map_err(|e| {
        tracing::warn!(base = %base, location = %location, error = %e, "Bad redirect location");
        RelayError::BadRedirectLocation
    })
}

/// 303 always turns into GET (HEAD stays HEAD); 301/302 do so for POST.
fn switches_to_get(status: StatusCode, method: &Method) -> bool {
    match status {
        StatusCode::SEE_OTHER => *method != Method::GET && *method != Method::HEAD,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => *method == Method::POST,
        _ => false,
    }
}
