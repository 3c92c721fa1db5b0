//! Per-request entry point.
//!
//! # Responsibilities
//! - Compose middleware around the dispatcher once, at build time
//! - Resolve the route at the innermost link and call the endpoint
//! - Turn a miss into 404/405 through the service formatter
//! - Guarantee a response: errors and panics become 500 at the boundary
//! - Hand every finished exchange to the logger and metrics
//!
//! # Design Decisions
//! - One `Responder` per process, cloned cheaply into transport tasks
//! - Per-request state lives in the request only
//! - A failing request never touches the shared route table

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{header, HeaderValue, StatusCode};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::http::handler::{HandlerResult, Request, Response};
use crate::http::middleware::{Chain, Middleware, Terminal};
use crate::observability::access::{Interaction, RequestSummary};
use crate::observability::metrics;
use crate::routing::{Dispatcher, Match, NonExistentMatch};
use crate::service::Service;

/// Collects middleware in registration order.
pub struct ResponderBuilder {
    service: Arc<Service>,
    dispatcher: Arc<Dispatcher>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl ResponderBuilder {
    /// Append a middleware. The first one appended is the outermost.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Append a middleware only when present, e.g. one built from config.
    pub fn with_optional(self, middleware: Option<impl Middleware>) -> Self {
        match middleware {
            Some(middleware) => self.with(middleware),
            None => self,
        }
    }

    /// The service middleware should be built against.
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    /// Freeze the chain.
    pub fn build(self) -> Responder {
        tracing::debug!(
            middleware = self.middleware.len(),
            routes = self.dispatcher.routes().len(),
            "Responder chain built"
        );
        let terminal = dispatch_terminal(Arc::clone(&self.service), self.dispatcher);
        Responder {
            chain: Chain::new(self.middleware, terminal),
            service: self.service,
        }
    }
}

/// The composed chain plus its fault boundary.
#[derive(Clone)]
pub struct Responder {
    chain: Arc<Chain>,
    service: Arc<Service>,
}

impl Responder {
    pub fn builder(service: Arc<Service>, dispatcher: Dispatcher) -> ResponderBuilder {
        ResponderBuilder {
            service,
            dispatcher: Arc::new(dispatcher),
            middleware: Vec::new(),
        }
    }

    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    /// Run one request through the chain. Always yields a response.
    pub async fn handle(&self, mut request: Request) -> Response {
        let started = Instant::now();
        let summary = RequestSummary::capture(&request);
        request.extensions_mut().insert(Arc::clone(&self.service));

        // Building the next future may itself panic, so it happens inside the guard.
        let chain = Arc::clone(&self.chain);
        let outcome = AssertUnwindSafe(async move { chain.entry().run(request).await })
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                tracing::error!(
                    method = %summary.method,
                    path = %summary.uri.path(),
                    error = %error,
                    "Unhandled error in request chain"
                );
                metrics::record_fault("error");
                self.service.formatter().error(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Err(panic) => {
                tracing::error!(
                    method = %summary.method,
                    path = %summary.uri.path(),
                    panic = %panic_message(panic.as_ref()),
                    "Panic in request chain"
                );
                metrics::record_fault("panic");
                self.service.formatter().error(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        let elapsed = started.elapsed();
        metrics::record_request(summary.method.as_str(), response.status().as_u16(), elapsed);
        self.service.logger().access(Interaction::new(summary, &response, elapsed));

        response
    }
}

/// The innermost link: route, then call the endpoint or answer the miss.
fn dispatch_terminal(service: Arc<Service>, dispatcher: Arc<Dispatcher>) -> Terminal {
    Arc::new(move |mut request: Request| -> BoxFuture<'static, HandlerResult> {
        match dispatcher.dispatch(request.method(), request.uri().path()) {
            Match::Existent(found) => {
                tracing::trace!(
                    resource = %found.resource(),
                    params = ?found.params(),
                    "Route matched"
                );
                let (endpoint, params) = found.into_parts();
                request.extensions_mut().insert(params.clone());
                endpoint.call(request, params)
            }
            Match::NonExistent(miss) => {
                tracing::debug!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    reason = ?miss.reason(),
                    "No route matched"
                );
                let response = miss_response(&service, &miss);
                Box::pin(async move { Ok(response) })
            }
        }
    })
}

fn miss_response(service: &Service, miss: &NonExistentMatch) -> Response {
    let collapse = service.config().dispatcher.collapse_method_not_allowed;
    let status = miss.status(collapse);
    let mut response = service.formatter().error(status);

    if status == StatusCode::METHOD_NOT_ALLOWED {
        let allow = miss
            .allowed()
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers_mut().insert(header::ALLOW, value);
        }
    }

    response
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
