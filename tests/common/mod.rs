//! Shared utilities for system tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use resource_dispatch::config::ServiceConfig;
use resource_dispatch::demo;
use resource_dispatch::http::{HttpServer, Responder};
use resource_dispatch::lifecycle::{build_service, standard_responder, Shutdown};
use resource_dispatch::Service;

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Serve `responder` on 127.0.0.1 with an OS-assigned port.
pub async fn serve(responder: Responder) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();

    tokio::spawn(async move {
        let _ = HttpServer::new(responder).run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown }
}

/// Serve the comment API behind the standard middleware chain.
pub async fn start_demo(config: ServiceConfig) -> TestServer {
    let service = build_service(config).unwrap();
    serve(standard_responder(service, demo::comments().unwrap())).await
}

pub fn service(config: ServiceConfig) -> Arc<Service> {
    build_service(config).unwrap()
}

/// Client that never pools, so a stopped server is observed immediately.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
