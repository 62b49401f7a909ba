//! C9 — HTTP/1.1 message parsing: start lines, headers, and body framing.

pub mod body;
pub mod message;

pub use body::{determine_framing, read_chunked_body, BodyFraming};
pub use message::{
    parse_headers, parse_headers_with_limit, parse_request_line, parse_status_line, HeaderField, Headers, RequestLine, StatusLine,
    DEFAULT_MAX_HEADER_BYTES,
};
