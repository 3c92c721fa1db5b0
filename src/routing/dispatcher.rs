//! Route table and lookup.
//!
//! # Responsibilities
//! - Collect resources in declaration order
//! - Resolve parent links into absolute patterns
//! - Resolve (method, path) into a [`Match`]
//!
//! # Design Decisions
//! - Immutable after `build()` (shared across tasks without locks)
//! - O(n) scan in registration order; first match wins
//! - Explicit `NonExistentMatch` rather than a silent default

use std::collections::HashMap;

use axum::http::Method;

use crate::routing::error::{ConfigurationError, SetupResult};
use crate::routing::matching::{ExistentMatch, Match, NonExistentMatch};
use crate::routing::pattern::Pattern;
use crate::routing::resource::{Binding, Resource};

/// A resource frozen with its absolute pattern.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    pattern: Pattern,
    bindings: Vec<Binding>,
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The absolute pattern.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.bindings.iter().map(Binding::method)
    }

    fn binding(&self, method: &Method) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.method() == method)
    }
}

/// Collects resources before the dispatcher starts serving.
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    resources: Vec<Resource>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resource. Order is significant: earlier resources win.
    pub fn register(&mut self, resource: Resource) -> Result<&mut Self, ConfigurationError> {
        if self.position(resource.name()).is_some() {
            return Err(ConfigurationError::DuplicateResource {
                name: resource.name().to_string(),
            });
        }
        self.resources.push(resource);
        Ok(self)
    }

    /// Compute the absolute pattern of the named resource by walking its
    /// parent chain.
    pub fn resolve_path(&self, name: &str) -> SetupResult<Pattern> {
        let lineage = self.lineage(name)?;
        let mut resolved = Pattern::compile("")?;
        for index in lineage.into_iter().rev() {
            resolved = resolved.join(self.resources[index].pattern())?;
        }
        if resolved.template().is_empty() {
            resolved = Pattern::compile("/")?;
        }
        Ok(resolved)
    }

    /// Resolve every resource and freeze the table.
    ///
    /// Every parent chain is checked, including those of prefix-only
    /// resources, so a bad chain fails here rather than at match time.
    pub fn build(self) -> SetupResult<Dispatcher> {
        let mut patterns = HashMap::with_capacity(self.resources.len());
        for resource in &self.resources {
            patterns.insert(resource.name().to_string(), self.resolve_path(resource.name())?);
        }

        let routes = self
            .resources
            .into_iter()
            .filter(|resource| !resource.bindings().is_empty())
            .filter_map(|resource| {
                let pattern = patterns.remove(resource.name())?;
                Some(Route {
                    name: resource.name().to_string(),
                    pattern,
                    bindings: resource.into_bindings(),
                })
            })
            .collect::<Vec<_>>();

        for route in &routes {
            tracing::debug!(
                resource = %route.name,
                pattern = %route.pattern,
                methods = ?route.methods().collect::<Vec<_>>(),
                "Route registered"
            );
        }

        Ok(Dispatcher { routes })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.resources.iter().position(|r| r.name() == name)
    }

    /// Indices from `name` up to its root ancestor.
    fn lineage(&self, name: &str) -> Result<Vec<usize>, ConfigurationError> {
        let mut chain: Vec<usize> = Vec::new();
        let mut current = self.position(name).ok_or_else(|| ConfigurationError::UnknownResource {
            name: name.to_string(),
        })?;

        loop {
            if chain.contains(&current) {
                let mut names: Vec<String> = chain
                    .iter()
                    .map(|&i| self.resources[i].name().to_string())
                    .collect();
                names.push(self.resources[current].name().to_string());
                return Err(ConfigurationError::CyclicParent { chain: names });
            }
            chain.push(current);

            let resource = &self.resources[current];
            match resource.parent() {
                None => return Ok(chain),
                Some(parent) => {
                    current = self.position(parent).ok_or_else(|| {
                        ConfigurationError::UnknownParent {
                            resource: resource.name().to_string(),
                            parent: parent.to_string(),
                        }
                    })?;
                }
            }
        }
    }
}

/// Immutable route table.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    routes: Vec<Route>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolve a request.
    ///
    /// A route whose pattern matches but which lacks the method does not stop
    /// the scan; a later route may still answer both.
    pub fn dispatch(&self, method: &Method, path: &str) -> Match {
        let mut allowed: Vec<Method> = Vec::new();
        let mut path_matched = false;

        for route in &self.routes {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };

            if let Some(binding) = route.binding(method) {
                return Match::Existent(ExistentMatch::new(
                    route.name.clone(),
                    binding.endpoint().clone(),
                    params,
                ));
            }

            path_matched = true;
            for bound in route.methods() {
                if !allowed.contains(bound) {
                    allowed.push(bound.clone());
                }
            }
        }

        if path_matched {
            Match::NonExistent(NonExistentMatch::method_not_allowed(allowed))
        } else {
            Match::NonExistent(NonExistentMatch::not_found())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::{HandlerResult, Request};
    use crate::routing::error::SetupError;
    use crate::routing::matching::Reason;
    use crate::routing::Params;
    use axum::response::IntoResponse;

    async fn ok(_req: Request, _params: Params) -> HandlerResult {
        Ok("ok".into_response())
    }

    fn existent(m: Match) -> ExistentMatch {
        match m {
            Match::Existent(found) => found,
            Match::NonExistent(miss) => panic!("expected a match, got {:?}", miss),
        }
    }

    #[test]
    fn test_nested_resolution() {
        let mut builder = Dispatcher::builder();
        builder.register(Resource::new("api", "/api/v1").unwrap()).unwrap();
        builder
            .register(
                Resource::new("comment", "/comment/{id}")
                    .unwrap()
                    .within("api")
                    .get(ok)
                    .unwrap(),
            )
            .unwrap();

        assert_eq!(builder.resolve_path("comment").unwrap().template(), "/api/v1/comment/{id}");

        let dispatcher = builder.build().unwrap();
        assert_eq!(dispatcher.routes().len(), 1);
        let found = existent(dispatcher.dispatch(&Method::GET, "/api/v1/comment/7"));
        assert_eq!(found.resource(), "comment");
        assert_eq!(found.params().get("id"), Some("7"));
    }

    #[test]
    fn test_parent_declared_after_child() {
        let mut builder = Dispatcher::builder();
        builder
            .register(Resource::new("item", "/item").unwrap().within("shop").get(ok).unwrap())
            .unwrap();
        builder.register(Resource::new("shop", "/shop").unwrap()).unwrap();
        let dispatcher = builder.build().unwrap();
        assert!(dispatcher.dispatch(&Method::GET, "/shop/item").is_existent());
    }

    #[test]
    fn test_prefix_only_resource_is_not_routable() {
        let mut builder = Dispatcher::builder();
        builder.register(Resource::new("api", "/api").unwrap()).unwrap();
        let dispatcher = builder.build().unwrap();
        assert_eq!(dispatcher.dispatch(&Method::GET, "/api").reason(), Some(Reason::NotFound));
    }

    #[test]
    fn test_cycle_fails_at_build() {
        let mut builder = Dispatcher::builder();
        builder.register(Resource::new("a", "/a").unwrap().within("b")).unwrap();
        builder.register(Resource::new("b", "/b").unwrap().within("a")).unwrap();
        match builder.build() {
            Err(SetupError::Configuration(ConfigurationError::CyclicParent { chain })) => {
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let mut builder = Dispatcher::builder();
        builder.register(Resource::new("a", "/a").unwrap().within("a").get(ok).unwrap()).unwrap();
        assert!(matches!(
            builder.build(),
            Err(SetupError::Configuration(ConfigurationError::CyclicParent { .. }))
        ));
    }

    #[test]
    fn test_unknown_parent() {
        let mut builder = Dispatcher::builder();
        builder
            .register(Resource::new("a", "/a").unwrap().within("ghost").get(ok).unwrap())
            .unwrap();
        assert!(matches!(
            builder.build(),
            Err(SetupError::Configuration(ConfigurationError::UnknownParent { .. }))
        ));
    }

    #[test]
    fn test_duplicate_resource_name() {
        let mut builder = Dispatcher::builder();
        builder.register(Resource::new("a", "/a").unwrap()).unwrap();
        assert!(matches!(
            builder.register(Resource::new("a", "/b").unwrap()),
            Err(ConfigurationError::DuplicateResource { .. })
        ));
    }

    #[test]
    fn test_duplicate_capture_across_parent() {
        let mut builder = Dispatcher::builder();
        builder.register(Resource::new("org", "/org/{id}").unwrap()).unwrap();
        builder
            .register(
                Resource::new("member", "/member/{id}")
                    .unwrap()
                    .within("org")
                    .get(ok)
                    .unwrap(),
            )
            .unwrap();
        assert!(matches!(builder.build(), Err(SetupError::Pattern(_))));
    }

    #[test]
    fn test_method_not_allowed_lists_bound_methods() {
        let mut builder = Dispatcher::builder();
        builder
            .register(
                Resource::new("comment", "/comment/{id}")
                    .unwrap()
                    .get(ok)
                    .unwrap()
                    .delete(ok)
                    .unwrap(),
            )
            .unwrap();
        let dispatcher = builder.build().unwrap();

        match dispatcher.dispatch(&Method::PUT, "/comment/7") {
            Match::NonExistent(miss) => {
                assert_eq!(miss.reason(), Reason::MethodNotAllowed);
                assert_eq!(miss.allowed(), &[Method::GET, Method::DELETE]);
            }
            Match::Existent(_) => panic!("PUT is not bound"),
        }
    }

    #[test]
    fn test_later_route_can_answer_method() {
        let mut builder = Dispatcher::builder();
        builder.register(Resource::new("read", "/doc/{id}").unwrap().get(ok).unwrap()).unwrap();
        builder.register(Resource::new("write", "/doc/{key}").unwrap().put(ok).unwrap()).unwrap();
        let dispatcher = builder.build().unwrap();

        let found = existent(dispatcher.dispatch(&Method::PUT, "/doc/1"));
        assert_eq!(found.resource(), "write");
        assert_eq!(found.params().get("key"), Some("1"));
    }

    #[test]
    fn test_empty_dispatcher() {
        let dispatcher = Dispatcher::default();
        assert_eq!(dispatcher.dispatch(&Method::GET, "/").reason(), Some(Reason::NotFound));
    }
}
