//! Middleware composition.
//!
//! # Data Flow
//! ```text
//! Chain [A, B, C] + terminal:
//!     A pre → B pre → C pre → terminal → C post → B post → A post
//! ```
//!
//! # Design Decisions
//! - The chain is an array fixed at build time; `Next` is an index into it
//! - First-registered middleware is outermost
//! - Middleware hold no per-request state and may run concurrently
//! - Not calling `next` short-circuits everything inside

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::http::handler::{HandlerResult, Request};

pub mod auth;
pub mod recover;
pub mod request_id;
pub mod timeout;

pub use auth::BearerAuth;
pub use recover::Recover;
pub use request_id::RequestIdMiddleware;
pub use timeout::Timeout;

/// A unit wrapping the rest of the chain.
pub trait Middleware: Send + Sync + 'static {
    /// Handle `request`, delegating to `next` or answering directly.
    fn handle(&self, request: Request, next: Next) -> BoxFuture<'static, HandlerResult>;
}

/// The innermost callable of a chain.
pub type Terminal = Arc<dyn Fn(Request) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Middleware in call order plus the terminal handler.
pub struct Chain {
    middleware: Box<[Arc<dyn Middleware>]>,
    terminal: Terminal,
}

impl Chain {
    pub fn new(middleware: Vec<Arc<dyn Middleware>>, terminal: Terminal) -> Arc<Self> {
        Arc::new(Self {
            middleware: middleware.into_boxed_slice(),
            terminal,
        })
    }

    /// Number of middleware in front of the terminal.
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// A handle on the outermost link.
    pub fn entry(self: &Arc<Self>) -> Next {
        Next {
            chain: Arc::clone(self),
            position: 0,
        }
    }
}

/// The remainder of the chain after the current middleware.
#[derive(Clone)]
pub struct Next {
    chain: Arc<Chain>,
    position: usize,
}

impl Next {
    /// Run the rest of the chain.
    pub fn run(self, request: Request) -> BoxFuture<'static, HandlerResult> {
        match self.chain.middleware.get(self.position) {
            Some(middleware) => {
                let middleware = Arc::clone(middleware);
                let next = Next {
                    chain: self.chain,
                    position: self.position + 1,
                };
                middleware.handle(request, next)
            }
            None => (self.chain.terminal)(request),
        }
    }
}

/// Middleware built from an async closure; see [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F> {
    f: F,
}

/// Turn `async |request, next| { ... }` into a [`Middleware`].
///
/// ```
/// use resource_dispatch::http::middleware::{from_fn, Next};
/// use resource_dispatch::http::handler::Request;
///
/// let logging = from_fn(|request: Request, next: Next| async move {
///     tracing::debug!(path = %request.uri().path(), "before");
///     let response = next.run(request).await;
///     tracing::debug!("after");
///     response
/// });
/// # let _ = logging;
/// ```
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    FromFn { f }
}

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn handle(&self, request: Request, next: Next) -> BoxFuture<'static, HandlerResult> {
        Box::pin((self.f)(request, next))
    }
}
