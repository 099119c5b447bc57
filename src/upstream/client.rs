//! reqwest-backed transport.

use std::time::Duration;

use axum::body::{Body, HttpBody};
use futures_util::future::BoxFuture;
use reqwest::redirect::Policy;

use crate::config::TimeoutConfig;
use crate::upstream::{FetchError, OutboundRequest, Upstream, UpstreamResponse};

/// Production transport: a shared `reqwest::Client` with redirects disabled.
#[derive(Debug, Clone)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
}

impl ReqwestUpstream {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| FetchError::InvalidRequest(format!("failed to build client: {e}")))?;

        Ok(Self { client })
    }

    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, FetchError> {
        let url = request.url.to_string();

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        // Known-empty bodies are omitted so GETs are not sent chunked.
        if request.body.size_hint().exact() != Some(0) {
            builder = builder.body(reqwest::Body::wrap_stream(request.body.into_data_stream()));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url,
                source: Box::new(e),
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = Body::from_stream(response.bytes_stream());

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

impl Upstream for ReqwestUpstream {
    fn fetch(&self, request: OutboundRequest) -> BoxFuture<'_, Result<UpstreamResponse, FetchError>> {
        Box::pin(self.send(request))
    }
}
