//! The bound view of a matched request a [`crate::web::endpoint::Handler`]
//! runs against: path variables, query string, headers, and raw body
//! bytes, plus the already-parsed declared parameters (dispatch step
//! (a)/(b)).

use std::collections::HashMap;

use crate::http::Headers;
use crate::model::value::DtoValue;
use crate::web::params::MultiMap;

/// Everything the dispatcher (C12) resolved before calling a handler.
pub struct RequestContext<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub path_vars: HashMap<String, String>,
    pub query: MultiMap,
    pub headers: &'a Headers,
    pub body: &'a [u8],
    /// Declared parameters ("Endpoint info"), already parsed
    /// to their declared primitive type via [`crate::web::params::parse_primitive`].
    pub params: HashMap<&'static str, DtoValue>,
}

impl<'a> RequestContext<'a> {
    pub fn param(&self, name: &str) -> Option<&DtoValue> {
        self.params.get(name)
    }
}
