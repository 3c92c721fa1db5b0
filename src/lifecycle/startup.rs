//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated config into a Service
//! - Assemble the standard middleware chain around a dispatcher
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Middleware order is fixed: request id, auth, timeout

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, ServiceConfig};
use crate::http::middleware::{BearerAuth, RequestIdMiddleware, Timeout};
use crate::http::responder::Responder;
use crate::observability::access::AccessFormatError;
use crate::routing::{Dispatcher, SetupError};
use crate::service::Service;

/// Anything that stops the process from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("access log format: {0}")]
    AccessFormat(#[from] AccessFormatError),

    #[error("route table: {0}")]
    Routes(#[from] SetupError),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the shared service context.
pub fn build_service(config: ServiceConfig) -> Result<Arc<Service>, StartupError> {
    Ok(Arc::new(Service::new(config)?))
}

/// Wrap `dispatcher` in the standard middleware, outermost first:
/// request id, bearer auth (when configured), timeout (when non-zero).
pub fn standard_responder(service: Arc<Service>, dispatcher: Dispatcher) -> Responder {
    let auth = BearerAuth::from_config(Arc::clone(&service));
    let timeout = Timeout::from_config(Arc::clone(&service));

    Responder::builder(service, dispatcher)
        .with(RequestIdMiddleware)
        .with_optional(auth)
        .with_optional(timeout)
        .build()
}
