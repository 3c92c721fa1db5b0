//! HTTP request handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum: parse HTTP, attach connect info)
//!     → responder.rs (fault boundary, access log)
//!     → middleware/ (pre-phase, outermost first)
//!     → [routing::Dispatcher resolves the endpoint]
//!     → handler.rs (endpoint) or 404/405 via response.rs
//!     → middleware/ (post-phase, outermost last)
//!     → Send to client
//! ```

pub mod handler;
pub mod middleware;
pub mod request;
pub mod responder;
pub mod response;
pub mod server;

pub use handler::{BoxError, Endpoint, HandlerResult, Request, Response};
pub use middleware::{from_fn, Middleware, Next};
pub use request::{RequestExt, RequestId, X_REQUEST_ID};
pub use responder::{Responder, ResponderBuilder};
pub use response::{Formatter, JsonFormatter};
pub use server::HttpServer;
