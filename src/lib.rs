//! GitHub relay: a reverse proxy that forwards embedded GitHub URLs.
//!
//! A request to `https://relay.example/https://github.com/o/r/releases/...`
//! is classified against the known upstream families, rewritten to its
//! canonical origin URL, forwarded with redirects handled by the relay itself,
//! and returned with cross-origin friendly headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

#[cfg(test)]
pub mod test_utils;
