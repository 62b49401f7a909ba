//! C11 — binding handler functions, declared parameter types, and a URL
//! pattern into route entries.
//!
//! Grounded on `ApiController::Endpoint`/`EndpointInfo`
//! (`examples/original_source/web/server/api/Endpoint.hpp`): the original
//! carries method, path pattern, and a map of declared param
//! name→`Type*` alongside the handler closure. Registered once at startup
//! and never mutated, so this holds plain data plus a
//! boxed handler rather than anything requiring interior mutability.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::descriptor::TypeDescriptor;
use crate::router::{Pattern, RouteTable};
use crate::web::context::RequestContext;
use crate::web::response::Response;

use crate::error::Result;

/// Where a declared parameter's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    Path,
    Query,
    Header,
}

/// One declared parameter: its source, its primitive/string descriptor,
/// and whether the request is rejected with 400 when it is absent
/// (dispatch step (c)).
#[derive(Debug, Clone, Copy)]
pub struct ParamInfo {
    pub name: &'static str,
    pub source: ParamSource,
    pub descriptor: &'static TypeDescriptor,
    pub required: bool,
}

/// A handler: takes the bound request context, returns a response or an
/// error the dispatcher turns into a status-coded response.
pub type Handler = Arc<dyn Fn(&RequestContext) -> Result<Response> + Send + Sync>;

/// An endpoint's full declared info ("Endpoint info"): method,
/// pattern, declared params, and whether it reads a DTO body. The
/// response-code→type map here is advisory documentation in the
/// original (used to generate OpenAPI) and has no runtime effect here, so
/// it is represented as a plain list rather than wired into dispatch.
pub struct Endpoint {
    pub method: &'static str,
    pub pattern: Pattern,
    pub params: Vec<ParamInfo>,
    pub consumes_body: bool,
    pub handler: Handler,
}

impl Endpoint {
    pub fn new(method: &'static str, pattern: &str, handler: Handler) -> Self {
        Endpoint { method, pattern: Pattern::compile(pattern), params: Vec::new(), consumes_body: false, handler }
    }

    pub fn with_param(mut self, name: &'static str, source: ParamSource, descriptor: &'static TypeDescriptor, required: bool) -> Self {
        self.params.push(ParamInfo { name, source, descriptor, required });
        self
    }

    pub fn with_body(mut self) -> Self {
        self.consumes_body = true;
        self
    }
}

/// A registry of [`Endpoint`]s, backed by one [`RouteTable`] shared across
/// all methods. Registration order within a method is preserved
/// ("first match wins").
pub struct EndpointRegistry {
    table: RouteTable<Endpoint>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        EndpointRegistry { table: RouteTable::new() }
    }

    pub fn register(&mut self, endpoint: Endpoint) {
        let method = endpoint.method;
        let pattern = endpoint.pattern.clone();
        self.table.register(method, pattern, endpoint);
    }

    /// Finds the first endpoint, in registration order, whose method
    /// matches and whose pattern accepts `target`.
    pub fn find(&self, method: &str, target: &str) -> Option<(&Endpoint, HashMap<String, String>, Option<String>)> {
        let (endpoint, result) = self.table.route(method, target)?;
        Some((endpoint, result.variables, result.tail))
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::response::status;

    #[test]
    fn finds_the_first_registered_match() {
        let mut registry = EndpointRegistry::new();
        registry.register(Endpoint::new("GET", "/widgets/*", Arc::new(|_| Ok(status(200)))));
        registry.register(Endpoint::new("GET", "/widgets/{id}", Arc::new(|_| Ok(status(201)))));

        let (endpoint, vars, _) = registry.find("GET", "/widgets/7").unwrap();
        assert_eq!(endpoint.method, "GET");
        assert!(vars.is_empty());
    }

    #[test]
    fn method_mismatch_is_not_found() {
        let mut registry = EndpointRegistry::new();
        registry.register(Endpoint::new("GET", "/ping", Arc::new(|_| Ok(status(200)))));
        assert!(registry.find("POST", "/ping").is_none());
    }
}
