//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use futures_util::future::BoxFuture;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use gh_relay::config::RelayConfig;
use gh_relay::http::HttpServer;
use gh_relay::lifecycle::Shutdown;
use gh_relay::upstream::{FetchError, OutboundRequest, Upstream, UpstreamResponse};

/// Answer from a mock origin: status, extra headers, body.
pub type MockReply = (u16, Vec<(&'static str, String)>, String);

/// Start a raw-TCP origin that answers every request with `f(path)`.
///
/// Returns the address it is listening on.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockReply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let (read_half, mut write_half) = socket.into_split();
                        let mut reader = BufReader::new(read_half);

                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.is_err() {
                            return;
                        }
                        let path = request_line
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .to_string();
                        loop {
                            let mut line = String::new();
                            match reader.read_line(&mut line).await {
                                Ok(0) => break,
                                Ok(_) if line == "\r\n" => break,
                                Ok(_) => continue,
                                Err(_) => return,
                            }
                        }

                        let (status, headers, body) = f(path).await;
                        let reason = StatusCode::from_u16(status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");
                        let mut response = format!("HTTP/1.1 {status} {reason}\r\n");
                        for (name, value) in headers {
                            response.push_str(&format!("{name}: {value}\r\n"));
                        }
                        response.push_str(&format!(
                            "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        ));

                        let _ = write_half.write_all(response.as_bytes()).await;
                        let _ = write_half.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// In-memory upstream keyed by full URL. Unknown URLs fail like a refused
/// connection.
#[derive(Default)]
pub struct FakeUpstream {
    routes: HashMap<String, MockReply>,
    seen: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, status: u16, headers: Vec<(&'static str, String)>, body: &str) -> Self {
        self.routes
            .insert(url.to_string(), (status, headers, body.to_string()));
        self
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Upstream for FakeUpstream {
    fn fetch(&self, request: OutboundRequest) -> BoxFuture<'_, Result<UpstreamResponse, FetchError>> {
        Box::pin(async move {
            let url = request.url.to_string();
            self.seen.lock().unwrap().push(url.clone());

            let Some((status, headers, body)) = self.routes.get(&url).cloned() else {
                return Err(FetchError::Request {
                    url,
                    source: Box::new(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "connection refused",
                    )),
                });
            };

            let mut map = HeaderMap::new();
            for (name, value) in headers {
                map.append(
                    HeaderName::from_static(name),
                    HeaderValue::from_str(&value).unwrap(),
                );
            }

            Ok(UpstreamResponse {
                status: StatusCode::from_u16(status).unwrap(),
                headers: map,
                body: Body::from(body),
            })
        })
    }
}

/// A relay server running in the background.
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl RunningRelay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Bind an ephemeral port and serve `server` on it.
pub async fn spawn_relay(server: HttpServer) -> RunningRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    RunningRelay { addr, shutdown }
}

/// Serve `config` on top of `upstream`.
#[allow(dead_code)]
pub async fn spawn_relay_with(config: RelayConfig, upstream: Arc<dyn Upstream>) -> RunningRelay {
    spawn_relay(HttpServer::with_upstream(config, upstream)).await
}

/// Client that never follows redirects, so tests see what the relay sent.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
