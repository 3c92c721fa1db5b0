//! Converts faults from the inner chain into 500 responses.
//!
//! Placed anywhere in the chain, it stops an error from reaching the
//! middleware outside it; those see an ordinary response instead.

use std::sync::Arc;

use axum::http::StatusCode;
use futures_util::future::BoxFuture;

use crate::http::handler::{HandlerResult, Request};
use crate::http::middleware::{Middleware, Next};
use crate::service::Service;

#[derive(Debug, Clone)]
pub struct Recover {
    service: Arc<Service>,
}

impl Recover {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

impl Middleware for Recover {
    fn handle(&self, request: Request, next: Next) -> BoxFuture<'static, HandlerResult> {
        let service = Arc::clone(&self.service);
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        Box::pin(async move {
            match next.run(request).await {
                Ok(response) => Ok(response),
                Err(error) => {
                    tracing::error!(
                        method = %method,
                        path = %path,
                        error = %error,
                        "Recovered from handler error"
                    );
                    Ok(service.formatter().error(StatusCode::INTERNAL_SERVER_ERROR))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::http::handler::{BoxError, Response};
    use crate::http::middleware::{from_fn, Chain, Terminal};
    use axum::body::Body;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_outer_middleware_sees_response() {
        let service = Arc::new(Service::new(ServiceConfig::default()).unwrap());
        let observed = Arc::new(Mutex::new(None));
        let sink = observed.clone();

        let outer: Arc<dyn Middleware> = Arc::new(from_fn(move |request: Request, next: Next| {
            let sink = sink.clone();
            async move {
                let result = next.run(request).await;
                let outcome = result.as_ref().map(|r| r.status()).map_err(|e| e.to_string());
                *sink.lock().unwrap() = Some(outcome);
                result
            }
        }));
        let failing: Terminal = Arc::new(|_request: Request| -> BoxFuture<'static, HandlerResult> {
            Box::pin(async { Err::<Response, BoxError>("database unavailable".into()) })
        });
        let recover: Arc<dyn Middleware> = Arc::new(Recover::new(service));
        let chain = Chain::new(vec![outer, recover], failing);

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = chain.entry().run(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(*observed.lock().unwrap(), Some(Ok(StatusCode::INTERNAL_SERVER_ERROR)));
    }
}
