//! Relay core.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → dispatcher.rs (preflight, ?q= shortcut, path recovery, classify,
//!                      rewrite, allow-list)
//!     → engine.rs (forward, resolve redirects hop by hop)
//!     → security::headers (sanitize)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Stateless per request; the only shared state is immutable config
//! - Redirect following is an explicit, bounded loop
//! - Every failure becomes a complete response at the dispatcher boundary

pub mod dispatcher;
pub mod engine;
pub mod error;

pub use dispatcher::Dispatcher;
pub use engine::{ProxyEngine, RequestSpec};
pub use error::RelayError;
