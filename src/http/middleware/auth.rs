//! Bearer token gate.
//!
//! Requests without `Authorization: Bearer <token>` are answered with 401
//! and never reach the inner chain.

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use futures_util::future::BoxFuture;

use crate::http::handler::{HandlerResult, Request};
use crate::http::middleware::{Middleware, Next};
use crate::service::Service;

#[derive(Debug, Clone)]
pub struct BearerAuth {
    service: Arc<Service>,
    expected: String,
}

impl BearerAuth {
    pub fn new(service: Arc<Service>, token: &str) -> Self {
        Self {
            service,
            expected: format!("Bearer {}", token),
        }
    }

    /// Use `auth.bearer_token`; `None` when no token is configured.
    pub fn from_config(service: Arc<Service>) -> Option<Self> {
        let token = service.config().auth.bearer_token.clone()?;
        Some(Self::new(service, &token))
    }

    fn authorized(&self, request: &Request) -> bool {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|value| value == self.expected)
    }
}

impl Middleware for BearerAuth {
    fn handle(&self, request: Request, next: Next) -> BoxFuture<'static, HandlerResult> {
        if self.authorized(&request) {
            return next.run(request);
        }

        tracing::warn!(path = %request.uri().path(), "Rejected unauthenticated request");
        let mut response = self.service.formatter().error(StatusCode::UNAUTHORIZED);
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        Box::pin(async move { Ok(response) })
    }
}
