//! Test utilities.
//!
//! A scripted, in-memory [`Upstream`] so the engine and dispatcher can be
//! exercised without sockets. Only compiled for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
};
use futures_util::future::BoxFuture;

use crate::config::RelayConfig;
use crate::upstream::{FetchError, OutboundRequest, Upstream, UpstreamResponse};

/// A canned upstream answer.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    pub body: &'static str,
}

impl ScriptedResponse {
    pub fn ok(body: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            body,
        }
    }

    pub fn redirect(status: u16, location: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            headers: vec![("location", location.to_string())],
            body: "",
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

/// What the engine actually sent.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Upstream answering from a URL → response table.
///
/// Unknown URLs fail like a refused connection.
#[derive(Debug, Default)]
pub struct ScriptedUpstream {
    routes: HashMap<String, ScriptedResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Option<Duration>,
}

impl ScriptedUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, response: ScriptedResponse) -> Self {
        self.routes.insert(url.to_string(), response);
        self
    }

    /// Hold every answer back by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("recorder mutex poisoned").clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

impl Upstream for ScriptedUpstream {
    fn fetch(&self, request: OutboundRequest) -> BoxFuture<'_, Result<UpstreamResponse, FetchError>> {
        Box::pin(async move {
            let url = request.url.to_string();
            let body = axum::body::to_bytes(request.body, usize::MAX)
                .await
                .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;

            self.requests
                .lock()
                .expect("recorder mutex poisoned")
                .push(RecordedRequest {
                    method: request.method,
                    url: url.clone(),
                    headers: request.headers,
                    body,
                });

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let Some(scripted) = self.routes.get(&url) else {
                return Err(FetchError::Request {
                    url,
                    source: Box::new(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "connection refused",
                    )),
                });
            };

            let mut headers = HeaderMap::new();
            for (name, value) in &scripted.headers {
                headers.append(
                    HeaderName::from_static(*name),
                    HeaderValue::from_str(value).expect("valid header value"),
                );
            }

            Ok(UpstreamResponse {
                status: scripted.status,
                headers,
                body: Body::from(scripted.body),
            })
        })
    }
}

/// Default config with the given prefix.
pub fn test_config(prefix: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.relay.prefix = prefix.to_string();
    config.relay.asset_url = "https://assets.example/ghweb/".to_string();
    config
}

/// Read a response body to a string.
pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
