//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Embedded target (e.g. "https://github.com/o/r/blob/main/f")
//!     → matcher.rs (classify into an UpstreamFamily)
//!     → rewrite.rs (canonical upstream URL, or a mirror redirect)
//!     → Return: RewriteOutcome
//! ```
//!
//! # Design Decisions
//! - Pattern table compiled once, immutable at runtime
//! - Deterministic: same input always lands in the same family
//! - First match wins (table order)

pub mod matcher;
pub mod rewrite;

pub use matcher::{classify, is_upstream_like, UpstreamFamily};
pub use rewrite::{normalize_path, rewrite, RewriteOutcome};
