//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Responder boundary, once per request:
//!     → access.rs (Interaction → Logger → access line)
//!     → metrics.rs (counters, histograms)
//!
//! Everywhere else:
//!     → logging.rs (structured tracing events)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Access lines go through tracing on their own target
//! - Metrics are cheap and optional

pub mod access;
pub mod logging;
pub mod metrics;

pub use access::{AccessFormat, Interaction, Logger, SystemLogger};
