//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher / engine produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log event of a request
//! - Metrics are cheap and no-ops when the exporter is disabled

pub mod logging;
pub mod metrics;
