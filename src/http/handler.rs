//! Endpoint contract.
//!
//! An endpoint is any `Fn(Request, Params) -> impl Future<Output = HandlerResult>`
//! that is `Send + Sync + 'static`. Plain `async fn`s and closures returning
//! `async move` blocks both qualify.

use std::future::Future;

use futures_util::future::BoxFuture;

pub use axum::extract::Request;
pub use axum::response::Response;

use crate::routing::Params;

/// Error type for faults raised by endpoints and middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of an endpoint or middleware call.
pub type HandlerResult = Result<Response, BoxError>;

/// A callable bound to a method on a resource.
pub trait Endpoint: Send + Sync + 'static {
    fn call(&self, request: Request, params: Params) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Endpoint for F
where
    F: Fn(Request, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, request: Request, params: Params) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(request, params))
    }
}
