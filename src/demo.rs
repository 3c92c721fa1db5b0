//! Comment API served by the binary and exercised by the system tests.
//!
//! ```text
//! api        /api/v1                 (prefix only)
//! comment    /api/v1/comment/{key}   GET → 200 {"key": <key as integer>}, 400 otherwise
//! comments   /api/v1/comment         PUT → 201 {"message": "Created"}
//! ```

use axum::http::StatusCode;
use serde_json::json;

use crate::http::handler::{HandlerResult, Request};
use crate::http::request::RequestExt;
use crate::routing::{Dispatcher, Params, Resource, SetupResult};

/// Build the comment API route table.
pub fn comments() -> SetupResult<Dispatcher> {
    let mut builder = Dispatcher::builder();
    builder.register(Resource::new("api", "/api/v1")?)?;
    builder.register(Resource::new("comment", "/comment/{key}")?.within("api").get(read)?)?;
    builder.register(Resource::new("comments", "/comment")?.within("api").put(upsert)?)?;
    builder.build()
}

async fn read(request: Request, params: Params) -> HandlerResult {
    let service = request.service().ok_or("service context missing")?;
    let formatter = service.formatter();

    let response = match params.get_or("key", "").parse::<i64>() {
        Ok(key) => formatter.format(StatusCode::OK, &json!({ "key": key })),
        Err(_) => formatter.format(
            StatusCode::BAD_REQUEST,
            &json!({ "message": "key must be an integer" }),
        ),
    };
    Ok(response)
}

async fn upsert(request: Request, _params: Params) -> HandlerResult {
    let service = request.service().ok_or("service context missing")?;
    Ok(service
        .formatter()
        .format(StatusCode::CREATED, &json!({ "message": "Created" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Reason;
    use axum::http::Method;

    #[test]
    fn test_route_table() {
        let dispatcher = comments().unwrap();
        let templates: Vec<_> = dispatcher
            .routes()
            .iter()
            .map(|r| r.pattern().template())
            .collect();
        assert_eq!(templates, vec!["/api/v1/comment/{key}", "/api/v1/comment"]);
    }

    #[test]
    fn test_comment_scenarios() {
        let dispatcher = comments().unwrap();

        match dispatcher.dispatch(&Method::GET, "/api/v1/comment/7") {
            crate::routing::Match::Existent(found) => {
                assert_eq!(found.resource(), "comment");
                assert_eq!(found.params().get("key"), Some("7"));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(dispatcher.dispatch(&Method::PUT, "/api/v1/comment").is_existent());
        assert_eq!(
            dispatcher.dispatch(&Method::PUT, "/api/v1/comment/7").reason(),
            Some(Reason::MethodNotAllowed)
        );
        assert_eq!(
            dispatcher.dispatch(&Method::PUT, "/api/v1/not-found").reason(),
            Some(Reason::NotFound)
        );
    }

    #[tokio::test]
    async fn test_empty_key_is_rejected_by_endpoint() {
        use crate::config::ServiceConfig;
        use crate::http::Responder;
        use crate::service::Service;
        use axum::body::Body;
        use axum::http::StatusCode;
        use std::sync::Arc;

        let dispatcher = comments().unwrap();
        match dispatcher.dispatch(&Method::GET, "/api/v1/comment/") {
            crate::routing::Match::Existent(found) => {
                assert_eq!(found.params().get("key"), Some(""));
            }
            other => panic!("unexpected {:?}", other),
        }

        let service = Arc::new(Service::new(ServiceConfig::default()).unwrap());
        let responder = Responder::builder(service, dispatcher).build();
        let request = Request::builder().uri("/api/v1/comment/").body(Body::empty()).unwrap();
        assert_eq!(responder.handle(request).await.status(), StatusCode::BAD_REQUEST);
    }
}
