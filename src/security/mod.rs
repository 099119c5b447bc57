//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (answer CORS preflight, drop hop-by-hop request headers)
//!     → access_control.rs (substring allow-list on the embedded target)
//!     → Pass to the proxy engine
//!
//! Outgoing response:
//!     → headers.rs (strip CSP / clear-site-data, add permissive CORS)
//! ```
//!
//! # Design Decisions
//! - Fail closed: an allow-list miss is a terminal 403
//! - Every relay-produced response is sanitized on the way out

pub mod access_control;
pub mod headers;
