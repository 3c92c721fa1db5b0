//! Request ID propagation.
//!
//! An incoming `x-request-id` is kept; otherwise a UUID v4 is generated. The
//! id is stored in the request extensions and echoed on the response.

use axum::http::HeaderValue;
use futures_util::future::BoxFuture;
use uuid::Uuid;

use crate::http::handler::{HandlerResult, Request};
use crate::http::middleware::{Middleware, Next};
use crate::http::request::{RequestId, X_REQUEST_ID};

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdMiddleware;

impl Middleware for RequestIdMiddleware {
    fn handle(&self, mut request: Request, next: Next) -> BoxFuture<'static, HandlerResult> {
        let incoming = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let id = incoming.unwrap_or_else(|| Uuid::new_v4().to_string());
        // Both branches produce visible ASCII, so the header value is valid.
        let value = HeaderValue::from_str(&id).ok();

        if let Some(value) = &value {
            request.headers_mut().insert(X_REQUEST_ID, value.clone());
        }
        request.extensions_mut().insert(RequestId(id));

        Box::pin(async move {
            let mut response = next.run(request).await?;
            if let Some(value) = value {
                response.headers_mut().insert(X_REQUEST_ID, value);
            }
            Ok(response)
        })
    }
}
