//! C11/C12/C13 — endpoint registration, request dispatch, and response
//! construction built on top of the router (C10), HTTP parser (C9), and
//! JSON mapper (C6/C7/C8).

pub mod context;
pub mod dispatch;
pub mod endpoint;
pub mod params;
pub mod response;

pub use context::RequestContext;
pub use dispatch::dispatch;
pub use endpoint::{Endpoint, EndpointRegistry, Handler, ParamInfo, ParamSource};
pub use params::{parse_primitive, parse_query, MultiMap};
pub use response::{dto, status, text, Body, Response};
