//! C12 — the request dispatcher: matches a route, binds declared
//! parameters, optionally parses a DTO body, runs the handler, and falls
//! back to a status-coded response on any dispatch-time failure.
//!
//! Grounded on `examples/original_source/web/server/HttpRequestHandler.cpp`'s
//! `handle()` (route lookup, then the controller's generated endpoint
//! wrapper extracting params before calling the user handler) and
//! `HttpRouter::route` for the "no match" path.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{http_status_for, HearthError};
use crate::http::Headers;
use crate::web::context::RequestContext;
use crate::web::endpoint::{EndpointRegistry, ParamSource};
use crate::web::params::parse_query;
use crate::web::response::{self, Response};

/// Runs the full dispatch sequence for one already-parsed
/// request (start line + headers + body already produced by C9). Never
/// returns `Err`: dispatch-time failures (no route, missing/bad
/// parameter) are turned into status-coded [`Response`]s so a connection
/// handler always has something to write back.
pub fn dispatch(registry: &EndpointRegistry, method: &str, target: &str, headers: &Headers, body: &[u8]) -> Response {
    let (path, query_text) = split_target(target);

    let (endpoint, path_vars, tail) = match registry.find(method, path) {
        Some(found) => found,
        None => {
            debug!(method, path, "no endpoint matched");
            return error_response(&HearthError::router_no_match());
        }
    };

    // A pattern ending in `*` may have captured the query string as its
    // tail instead of it surviving in `target`'s own `?` split; prefer
    // whichever is non-empty, since only one of the two paths produces it
    // for a given pattern shape.
    let query_text = tail.as_deref().map(strip_leading_question_mark).unwrap_or(query_text);
    let query = parse_query(query_text);

    let mut params = HashMap::new();
    for param in &endpoint.params {
        let raw = match param.source {
            ParamSource::Path => path_vars.get(param.name).map(|v| v.as_str()),
            ParamSource::Query => query.get(param.name),
            ParamSource::Header => headers.get(param.name),
        };
        match raw {
            Some(text) => match crate::web::params::parse_primitive(param.descriptor, param.name, text) {
                Ok(value) => {
                    params.insert(param.name, value);
                }
                Err(err) => {
                    warn!(param = param.name, error = %err, "failed to bind endpoint parameter");
                    return error_response(&err);
                }
            },
            None if param.required => {
                warn!(param = param.name, "required endpoint parameter missing");
                return error_response(&HearthError::dispatch_param_missing(param.name));
            }
            None => {}
        }
    }

    let context = RequestContext { method, path, path_vars, query, headers, body, params };

    match (endpoint.handler)(&context) {
        Ok(response) => response,
        Err(err) => error_response(&err),
    }
}

fn split_target(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    }
}

fn strip_leading_question_mark(text: &str) -> &str {
    text.strip_prefix('?').unwrap_or(text)
}

fn error_response(err: &HearthError) -> Response {
    response::text(http_status_for(err), err.message().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::INT32;
    use crate::web::endpoint::Endpoint;
    use crate::web::response::status;
    use std::sync::Arc;

    fn registry_with_id_endpoint() -> EndpointRegistry {
        let mut registry = EndpointRegistry::new();
        registry.register(
            Endpoint::new(
                "GET",
                "/widgets/{id}",
                Arc::new(|ctx| {
                    let id = ctx.param("id").cloned();
                    assert!(id.is_some());
                    Ok(status(200))
                }),
            )
            .with_param("id", ParamSource::Path, &INT32, true),
        );
        registry
    }

    #[test]
    fn dispatches_a_matched_request_with_bound_path_param() {
        let registry = registry_with_id_endpoint();
        let headers = Headers::new();
        let response = dispatch(&registry, "GET", "/widgets/42", &headers, b"");
        assert_eq!(response.status, 200);
    }

    #[test]
    fn unmatched_route_yields_404() {
        let registry = registry_with_id_endpoint();
        let headers = Headers::new();
        let response = dispatch(&registry, "GET", "/nowhere", &headers, b"");
        assert_eq!(response.status, 404);
    }

    #[test]
    fn missing_required_param_yields_400_without_calling_the_handler() {
        let mut registry = EndpointRegistry::new();
        registry.register(
            Endpoint::new("GET", "/widgets/{id}", Arc::new(|_| panic!("handler must not run")))
                .with_param("id", ParamSource::Query, &INT32, true),
        );
        let headers = Headers::new();
        let response = dispatch(&registry, "GET", "/widgets/42", &headers, b"");
        assert_eq!(response.status, 400);
    }

    #[test]
    fn query_string_is_parsed_and_bound() {
        let mut registry = EndpointRegistry::new();
        registry.register(
            Endpoint::new(
                "GET",
                "/search",
                Arc::new(|ctx| {
                    assert_eq!(ctx.query.get("q"), Some("widgets"));
                    Ok(status(200))
                }),
            ),
        );
        let headers = Headers::new();
        let response = dispatch(&registry, "GET", "/search?q=widgets", &headers, b"");
        assert_eq!(response.status, 200);
    }
}
