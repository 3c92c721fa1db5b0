//! Resource Dispatch Library
//!
//! Maps `(method, path)` to endpoints registered on named resources and runs
//! them through an ordered middleware chain.
//!
//! ```text
//!   request ──▶ Responder ──▶ [A ▶ B ▶ C] ──▶ Dispatcher ──▶ endpoint
//!                  │                              │
//!                  │                              └─▶ 404 / 405
//!   response ◀─────┴────────── [A ◀ B ◀ C] ◀──────────────────┘
//! ```

pub mod config;
pub mod demo;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod service;

pub use config::ServiceConfig;
pub use http::{HttpServer, Responder};
pub use lifecycle::Shutdown;
pub use routing::{Dispatcher, Match, Resource};
pub use service::Service;
