//! Entry point for every inbound request.
//!
//! # Responsibilities
//! - Answer CORS preflight probes
//! - Serve the `?q=<target>` shortcut
//! - Recover the embedded target from the path
//! - Classify, rewrite and allow-list the target
//! - Route to the proxy engine or the static-asset origin
//! - Turn every failure into a complete response

use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use regex::Regex;
use url::Url;

use crate::config::RelaySettings;
use crate::http::request::InboundRequest;
use crate::http::response::passthrough_response;
use crate::observability::metrics;
use crate::proxy::engine::{ProxyEngine, RequestSpec};
use crate::proxy::error::RelayError;
use crate::routing::rewrite::canonical_url;
use crate::routing::{classify, rewrite, RewriteOutcome};
use crate::security::access_control::AccessFilter;
use crate::security::headers::{
    forwardable_request_headers, is_preflight, preflight_response, sanitize_response,
};
use crate::upstream::{OutboundRequest, Upstream};

/// Some front ends merge `//` in paths, so `https://x` arrives as `https:/x`.
static MANGLED_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?:/+").expect("scheme pattern is valid"));

/// Deadline for a request when none is configured.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Routes inbound requests. Cheap to clone; all state is immutable.
#[derive(Clone)]
pub struct Dispatcher {
    settings: Arc<RelaySettings>,
    access: AccessFilter,
    engine: ProxyEngine,
    upstream: Arc<dyn Upstream>,
    request_timeout: Duration,
}

impl Dispatcher {
    pub fn new(settings: RelaySettings, upstream: Arc<dyn Upstream>) -> Self {
        let engine = ProxyEngine::new(
            upstream.clone(),
            settings.prefix.clone(),
            settings.max_redirects,
        );
        Self {
            access: AccessFilter::new(settings.allow_list.clone()),
            settings: Arc::new(settings),
            engine,
            upstream,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound the time until response headers, redirect hops included.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Handle one request. Never fails: errors become responses here.
    pub async fn dispatch(&self, request: InboundRequest) -> Response {
        let start = Instant::now();
        let method = request.method.clone();
        let request_id = request.request_id().to_string();

        let (label, result) = match tokio::time::timeout(self.request_timeout, self.route(request)).await {
            Ok(routed) => routed,
            Err(_) => ("timeout", Err(RelayError::Timeout(self.request_timeout))),
        };
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    RelayError::Fetch(e) => {
                        tracing::error!(request_id = %request_id, error = %e, "Upstream request failed")
                    }
                    RelayError::Timeout(after) => {
                        tracing::error!(request_id = %request_id, timeout = ?after, "Upstream timed out")
                    }
                    RelayError::AccessBlocked => {
                        metrics::record_blocked();
                        tracing::warn!(request_id = %request_id, "Target not in allow-list")
                    }
                    other => {
                        tracing::warn!(request_id = %request_id, error = %other, kind = other.kind(), "Request rejected")
                    }
                }
                err.into_response()
            }
        };

        metrics::record_request(method.as_str(), label, response.status().as_u16(), start);
        response
    }

    async fn route(&self, request: InboundRequest) -> (&'static str, Result<Response, RelayError>) {
        if is_preflight(&request.method, &request.headers) {
            return ("preflight", Ok(preflight_response()));
        }

        if let Some(q) = request.query_param("q").filter(|q| !q.is_empty()) {
            return ("shortcut", self.shortcut(&request, &q));
        }

        let Some(target) = extract_target(request.path_and_query(), &self.settings.prefix) else {
            let path = request.path_and_query().trim_start_matches('/').to_string();
            tracing::debug!(
                request_id = %request.request_id(),
                path = %path,
                "Outside relay prefix, serving asset"
            );
            return ("unmatched", self.fetch_asset(&path).await);
        };
        let family = classify(&target);

        tracing::debug!(
            request_id = %request.request_id(),
            method = %request.method,
            family = %family,
            target = %target,
            "Dispatching request"
        );

        let result = match rewrite(&target, family, &self.settings) {
            RewriteOutcome::Proxy(target) => self.forward(request, &target).await,
            RewriteOutcome::Redirect(location) => mirror_redirect(&location),
            RewriteOutcome::Asset(path) => self.fetch_asset(&path).await,
        };
        (family.as_str(), result)
    }

    /// `?q=<target>` → 301 to `<scheme>://<host><prefix><target>`.
    fn shortcut(&self, request: &InboundRequest, q: &str) -> Result<Response, RelayError> {
        let host = request.host().ok_or(RelayError::BadUrl)?;
        let location = format!(
            "{}://{}{}{}",
            self.settings.public_scheme, host, self.settings.prefix, q
        );
        redirect(StatusCode::MOVED_PERMANENTLY, &location)
    }

    async fn forward(&self, request: InboundRequest, target: &str) -> Result<Response, RelayError> {
        self.access.check(target)?;

        let url = canonical_url(target).map_err(|_| RelayError::BadUrl)?;
        let spec = RequestSpec::new(
            request.method,
            forwardable_request_headers(&request.headers),
            request.body,
        );
        self.engine.proxy(url, spec).await
    }

    /// Unmatched paths are served verbatim from the asset origin.
    async fn fetch_asset(&self, path: &str) -> Result<Response, RelayError> {
        let url = Url::parse(&format!("{}{}", self.settings.asset_url, path))
            .map_err(|_| RelayError::BadUrl)?;
        let response = self.upstream.fetch(OutboundRequest::get(url)).await?;
        Ok(passthrough_response(response))
    }
}

/// The embedded target: whatever follows the prefix, with a collapsed
/// `https:/` restored to `https://`. `None` when the path is not under the
/// prefix at all.
pub fn extract_target(path_and_query: &str, prefix: &str) -> Option<String> {
    let rest = path_and_query.strip_prefix(prefix)?;
    Some(MANGLED_SCHEME.replace(rest, "https://").into_owned())
}

fn mirror_redirect(location: &str) -> Result<Response, RelayError> {
    redirect(StatusCode::FOUND, location).map(sanitize_response)
}

fn redirect(status: StatusCode, location: &str) -> Result<Response, RelayError> {
    let value = HeaderValue::from_str(location).map_err(|_| RelayError::BadUrl)?;
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response.headers_mut().insert(header::LOCATION, value);
    Ok(response)
}
