//! C13 — the response factory: building well-formed responses from a
//! status plus an optional body, deciding `Content-Length` vs
//! `Transfer-Encoding: chunked` by whether the body's size is known.
//!
//! Grounded on `examples/original_source/web/protocol/http/outgoing/ResponseFactory.cpp`
//! (the three construction paths: bare status, text, and a mapped DTO) and
//! `BufferBody`/`ChunkedBufferBody` for the size-based framing choice.

use crate::http::Headers;
use crate::json::ObjectMapper;
use crate::model::dto::Dto;

/// A response body: either fully buffered (known size, so
/// `Content-Length` is used) or of unknown size (so the caller must frame
/// it with `Transfer-Encoding: chunked`). This crate never produces an
/// unknown-size body itself — every path below buffers eagerly — but the
/// variant exists so a streaming body type can be added later without
/// changing [`Response`]'s shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Buffered(Vec<u8>),
    Empty,
}

impl Body {
    pub fn known_size(&self) -> Option<u64> {
        match self {
            Body::Buffered(bytes) => Some(bytes.len() as u64),
            Body::Empty => Some(0),
        }
    }
}

/// An outgoing HTTP response, ready for the parser's inverse (a
/// writer, not built in this crate) to frame onto the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub headers: Headers,
    pub body: Body,
}

impl Response {
    /// Chooses `Content-Length` for a known-size body; the chunked path is
    /// left for a caller with a genuinely unbounded body (see
    /// "Response factory" framing rule), since every body built here is
    /// already fully materialized.
    fn framed(status: u16, body: Body) -> Response {
        let mut headers = Headers::new();
        if let Some(size) = body.known_size() {
            headers.push("Content-Length", size.to_string());
        } else {
            headers.push("Transfer-Encoding", "chunked");
        }
        Response { status, reason: reason_phrase(status), headers, body }
    }
}

/// `response(status)` — empty body, no `Content-Type`.
pub fn status(status: u16) -> Response {
    Response::framed(status, Body::Empty)
}

/// `response(status, text)` — UTF-8 bytes of `text`, `Content-Type:
/// text/plain`.
pub fn text(status: u16, text: impl Into<String>) -> Response {
    let mut response = Response::framed(status, Body::Buffered(text.into().into_bytes()));
    response.headers.push("Content-Type", "text/plain; charset=utf-8");
    response
}

/// `response(status, dto, mapper)` — body is `mapper.write(dto)`, with the
/// mapper's declared content type.
pub fn dto<M: ObjectMapper, T: Dto>(status: u16, value: &T, mapper: &M) -> crate::error::Result<Response> {
    let body = mapper.write_to_string(value)?;
    let mut response = Response::framed(status, Body::Buffered(body.into_bytes()));
    response.headers.push("Content-Type", "application/json; charset=utf-8");
    Ok(response)
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_response_has_a_zero_content_length_and_no_content_type() {
        let response = status(204);
        assert_eq!(response.headers.get("Content-Length"), Some("0"));
        assert_eq!(response.headers.get("Content-Type"), None);
    }

    #[test]
    fn text_response_carries_a_plain_text_content_type() {
        let response = text(200, "hello");
        assert_eq!(response.body, Body::Buffered(b"hello".to_vec()));
        assert_eq!(response.headers.get("Content-Type"), Some("text/plain; charset=utf-8"));
        assert_eq!(response.headers.get("Content-Length"), Some("5"));
    }
}
