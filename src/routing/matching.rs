//! Dispatch outcomes.

use std::fmt;
use std::sync::Arc;

use axum::http::{Method, StatusCode};

use crate::http::handler::Endpoint;
use crate::routing::pattern::Params;

/// The result of resolving one (method, path) pair.
#[derive(Debug, Clone)]
pub enum Match {
    Existent(ExistentMatch),
    NonExistent(NonExistentMatch),
}

impl Match {
    pub fn is_existent(&self) -> bool {
        matches!(self, Match::Existent(_))
    }

    /// Why nothing matched, if nothing did.
    pub fn reason(&self) -> Option<Reason> {
        match self {
            Match::Existent(_) => None,
            Match::NonExistent(miss) => Some(miss.reason()),
        }
    }
}

/// A resource answered both the path and the method.
#[derive(Clone)]
pub struct ExistentMatch {
    resource: String,
    endpoint: Arc<dyn Endpoint>,
    params: Params,
}

impl ExistentMatch {
    pub(crate) fn new(resource: String, endpoint: Arc<dyn Endpoint>, params: Params) -> Self {
        Self {
            resource,
            endpoint,
            params,
        }
    }

    /// Name of the resource that matched.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn endpoint(&self) -> &Arc<dyn Endpoint> {
        &self.endpoint
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_parts(self) -> (Arc<dyn Endpoint>, Params) {
        (self.endpoint, self.params)
    }
}

impl fmt::Debug for ExistentMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExistentMatch")
            .field("resource", &self.resource)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Why a dispatch found nothing to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// No pattern matched the path.
    NotFound,
    /// A pattern matched the path, but no binding answers the method.
    MethodNotAllowed,
}

/// No endpoint answers the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonExistentMatch {
    reason: Reason,
    allowed: Vec<Method>,
}

impl NonExistentMatch {
    pub(crate) fn not_found() -> Self {
        Self {
            reason: Reason::NotFound,
            allowed: Vec::new(),
        }
    }

    pub(crate) fn method_not_allowed(allowed: Vec<Method>) -> Self {
        Self {
            reason: Reason::MethodNotAllowed,
            allowed,
        }
    }

    pub fn reason(&self) -> Reason {
        self.reason
    }

    /// Methods bound on the resources whose pattern matched the path, in
    /// registration order. Empty for `NotFound`.
    pub fn allowed(&self) -> &[Method] {
        &self.allowed
    }

    /// HTTP status for this miss; `collapse` maps 405 onto 404.
    pub fn status(&self, collapse: bool) -> StatusCode {
        match self.reason {
            Reason::NotFound => StatusCode::NOT_FOUND,
            Reason::MethodNotAllowed if collapse => StatusCode::NOT_FOUND,
            Reason::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}
