//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, InboundRequest)
//!     → [proxy::dispatcher decides what to do]
//!     → response.rs (strip hop-by-hop, sanitize)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{InboundRequest, MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
