//! Request-scoped data.
//!
//! The responder and the built-in middleware leave their per-request values
//! in the request extensions; [`RequestExt`] reads them back.

use std::sync::Arc;

use crate::http::handler::Request;
use crate::routing::Params;
use crate::service::Service;

/// Header carrying the request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation id assigned by
/// [`RequestIdMiddleware`](crate::http::middleware::RequestIdMiddleware).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Accessors for values stored in the request extensions.
pub trait RequestExt {
    /// Parameters extracted by the dispatcher; present inside endpoints.
    fn params(&self) -> Option<&Params>;

    /// The owning service; present once the request entered a responder.
    fn service(&self) -> Option<&Arc<Service>>;

    fn request_id(&self) -> Option<&str>;
}

impl RequestExt for Request {
    fn params(&self) -> Option<&Params> {
        self.extensions().get::<Params>()
    }

    fn service(&self) -> Option<&Arc<Service>> {
        self.extensions().get::<Arc<Service>>()
    }

    fn request_id(&self) -> Option<&str> {
        self.extensions()
            .get::<RequestId>()
            .map(|RequestId(id)| id.as_str())
    }
}
