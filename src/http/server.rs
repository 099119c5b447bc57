//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all relay handler
//! - Wire up middleware (tracing, request ID)
//! - Apply the request deadline through the dispatcher, so it answers 502
//! - Serve plain TCP or TLS with graceful shutdown

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::request::{InboundRequest, MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::signals::shutdown_signal;
use crate::proxy::Dispatcher;
use crate::upstream::{FetchError, ReqwestUpstream, Upstream};

/// How long TLS connections get to finish after shutdown starts.
const TLS_DRAIN_SECS: u64 = 30;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: Arc<RelayConfig>,
}

impl HttpServer {
    /// Create a server that forwards with the production reqwest transport.
    pub fn new(config: RelayConfig) -> Result<Self, FetchError> {
        let upstream = Arc::new(ReqwestUpstream::new(&config.timeouts)?);
        Ok(Self::with_upstream(config, upstream))
    }

    /// Create a server on top of any transport.
    pub fn with_upstream(config: RelayConfig, upstream: Arc<dyn Upstream>) -> Self {
        let state = AppState {
            dispatcher: Dispatcher::new(config.relay.clone(), upstream)
                .with_request_timeout(Duration::from_secs(config.timeouts.request_secs)),
        };
        let router = Self::build_router(state);

        Self {
            router,
            config: Arc::new(config),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(relay_handler))
            .route("/", any(relay_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Run the server on a bound plain-TCP listener until shutdown.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.relay.prefix,
            mirror_mode = self.config.relay.mirror_mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS termination until shutdown.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown_signal(shutdown).await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Catch-all handler: every path is a potential embedded target.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state
        .dispatcher
        .dispatch(InboundRequest::from_request(request))
        .await
}
