//! Response rendering.
//!
//! # Responsibilities
//! - Render structured bodies into responses ([`Formatter`])
//! - Produce the bodies of synthesized error responses
//!
//! # Design Decisions
//! - One formatter per service, chosen at startup
//! - Error bodies share the shape `{"message": "<reason>"}`

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use serde_json::{json, Value};

use crate::http::handler::Response;

/// Content type of every JSON body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Renders a structured body into a response.
pub trait Formatter: Send + Sync + 'static {
    fn format(&self, status: StatusCode, body: &Value) -> Response;

    /// A `{"message": ...}` body carrying the status' canonical reason.
    fn error(&self, status: StatusCode) -> Response {
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        self.format(status, &json!({ "message": reason }))
    }
}

/// Formatter producing `application/json; charset=utf-8` bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, status: StatusCode, body: &Value) -> Response {
        let text = if self.pretty {
            serde_json::to_string_pretty(body)
        } else {
            serde_json::to_string(body)
        };
        // Serializing a Value cannot fail: its map keys are always strings.
        let text = text.unwrap_or_default();

        let mut response = Response::new(Body::from(text));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        response
    }
}
