//! Resources and their method bindings.

use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::http::handler::Endpoint;
use crate::routing::error::{ConfigurationError, DuplicateBindingError, PatternError, SetupResult};
use crate::routing::pattern::Pattern;

/// One method answered by one endpoint.
#[derive(Clone)]
pub struct Binding {
    method: Method,
    endpoint: Arc<dyn Endpoint>,
}

impl Binding {
    pub fn new(method: Method, endpoint: impl Endpoint) -> Self {
        Self {
            method,
            endpoint: Arc::new(endpoint),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &Arc<dyn Endpoint> {
        &self.endpoint
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Normalize a method token to its uppercase form.
pub fn parse_method(method: &str) -> Result<Method, ConfigurationError> {
    let upper = method.trim().to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| ConfigurationError::InvalidMethod {
        method: method.to_string(),
    })
}

/// A named path template with its method bindings.
///
/// The template is relative to the parent resource, if any. A resource with
/// no bindings only contributes a path prefix to its children and is never a
/// dispatch candidate itself.
#[derive(Debug, Clone)]
pub struct Resource {
    name: String,
    pattern: Pattern,
    parent: Option<String>,
    bindings: Vec<Binding>,
}

impl Resource {
    /// Create a resource; the template is compiled immediately.
    pub fn new(name: impl Into<String>, template: &str) -> Result<Self, PatternError> {
        Ok(Self {
            name: name.into(),
            pattern: Pattern::compile(template)?,
            parent: None,
            bindings: Vec::new(),
        })
    }

    /// Nest this resource under the resource named `parent`.
    pub fn within(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Bind `endpoint` to `method`. The method is uppercased first.
    pub fn bind(self, method: &str, endpoint: impl Endpoint) -> SetupResult<Self> {
        let method = parse_method(method)?;
        Ok(self.bind_method(method, endpoint)?)
    }

    /// Bind `endpoint` to an already parsed method.
    pub fn bind_method(
        mut self,
        method: Method,
        endpoint: impl Endpoint,
    ) -> Result<Self, DuplicateBindingError> {
        if self.binding(&method).is_some() {
            return Err(DuplicateBindingError {
                resource: self.name.clone(),
                method: method.to_string(),
            });
        }
        self.bindings.push(Binding::new(method, endpoint));
        Ok(self)
    }

    pub fn get(self, endpoint: impl Endpoint) -> Result<Self, DuplicateBindingError> {
        self.bind_method(Method::GET, endpoint)
    }

    pub fn post(self, endpoint: impl Endpoint) -> Result<Self, DuplicateBindingError> {
        self.bind_method(Method::POST, endpoint)
    }

    pub fn put(self, endpoint: impl Endpoint) -> Result<Self, DuplicateBindingError> {
        self.bind_method(Method::PUT, endpoint)
    }

    pub fn delete(self, endpoint: impl Endpoint) -> Result<Self, DuplicateBindingError> {
        self.bind_method(Method::DELETE, endpoint)
    }

    pub fn patch(self, endpoint: impl Endpoint) -> Result<Self, DuplicateBindingError> {
        self.bind_method(Method::PATCH, endpoint)
    }

    pub fn head(self, endpoint: impl Endpoint) -> Result<Self, DuplicateBindingError> {
        self.bind_method(Method::HEAD, endpoint)
    }

    pub fn options(self, endpoint: impl Endpoint) -> Result<Self, DuplicateBindingError> {
        self.bind_method(Method::OPTIONS, endpoint)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The template relative to the parent.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn binding(&self, method: &Method) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.method() == method)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub(crate) fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }
}
