//! Request deadline.
//!
//! On expiry the inner chain is dropped, which cancels it at whatever await
//! point it is suspended on, and a 504 is answered in its place.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use futures_util::future::BoxFuture;

use crate::http::handler::{HandlerResult, Request};
use crate::http::middleware::{Middleware, Next};
use crate::service::Service;

#[derive(Debug, Clone)]
pub struct Timeout {
    service: Arc<Service>,
    limit: Duration,
}

impl Timeout {
    pub fn new(service: Arc<Service>, limit: Duration) -> Self {
        Self { service, limit }
    }

    /// Use `timeouts.request_secs`; `None` when it is 0 (disabled).
    pub fn from_config(service: Arc<Service>) -> Option<Self> {
        match service.config().timeouts.request_secs {
            0 => None,
            secs => Some(Self::new(service, Duration::from_secs(secs))),
        }
    }
}

impl Middleware for Timeout {
    fn handle(&self, request: Request, next: Next) -> BoxFuture<'static, HandlerResult> {
        let service = Arc::clone(&self.service);
        let limit = self.limit;
        let path = request.uri().path().to_string();

        Box::pin(async move {
            match tokio::time::timeout(limit, next.run(request)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(path = %path, limit = ?limit, "Request timed out");
                    Ok(service.formatter().error(StatusCode::GATEWAY_TIMEOUT))
                }
            }
        })
    }
}
