//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Read config → Apply CLI overrides → Validate → Build server → Bind
//!
//! Shutdown (shutdown.rs + signals.rs):
//!     SIGINT/SIGTERM or Shutdown::trigger → Stop accepting → Drain → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - In-flight streams are allowed to finish on graceful shutdown

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
