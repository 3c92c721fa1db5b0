//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum Router that forwards every request to the Responder
//! - Wire up transport-level tracing
//! - Bind to a listener and serve until shutdown
//!
//! # Design Decisions
//! - Axum only parses HTTP; all routing happens in the Responder
//! - Connect info is attached so the access log can report the client address

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::http::handler::Request;
use crate::http::responder::Responder;
use crate::lifecycle::Shutdown;

/// HTTP front end for a [`Responder`].
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(responder: Responder) -> Self {
        Self {
            router: Self::build_router(responder),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(responder: Responder) -> Router {
        Router::new()
            .fallback(move |request: Request| {
                let responder = responder.clone();
                async move { responder.handle(request).await }
            })
            .layer(TraceLayer::new_for_http())
    }

    /// The underlying router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
