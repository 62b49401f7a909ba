//! C9 — HTTP/1.1 start-line and header parsing.
//!
//! Ported from `examples/original_source/web/protocol/http/Http.cpp`
//! (`Protocol::parseRequestStartingLine`, `parseResponseStartingLine`,
//! `parseHeaderName`, `parseHeaders`). The original builds each piece as a
//! `ParsingCaret::Label` (a start/end pair lazily materialized into a
//! `String`); here `Caret::find`/`Caret::label` plays the same role without
//! needing a separate `Label` type, since a Rust slice already borrows
//! without copying.

use crate::caret::Caret;
use crate::error::{HearthError, Result};

/// `METHOD SP request-target SP HTTP-version CRLF` (RFC 7230 §3.1.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    pub version: String,
}

/// `HTTP-version SP status-code SP reason-phrase CRLF` (RFC 7230 §3.1.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub version: String,
    pub status: u16,
    pub reason: String,
}

pub fn parse_request_line(caret: &mut Caret<'_>) -> Result<RequestLine> {
    let method_start = caret.pos();
    if !caret.find(b' ') {
        return Err(HearthError::http_malformed_start_line("missing space after method"));
    }
    let method = caret.label(method_start, caret.pos()).to_string();
    caret.set_pos(caret.pos() + 1);

    let target_start = caret.pos();
    if !caret.find(b' ') {
        return Err(HearthError::http_malformed_start_line("missing space after request target"));
    }
    let target = caret.label(target_start, caret.pos()).to_string();
    caret.set_pos(caret.pos() + 1);

    let version_start = caret.pos();
    if !caret.find_crlf() {
        return Err(HearthError::http_malformed_start_line("missing CRLF after HTTP version"));
    }
    let version = caret.label(version_start, caret.pos()).to_string();
    caret.skip_crlf();

    if !version.starts_with("HTTP/") {
        return Err(HearthError::http_unknown_protocol(format!("unrecognized protocol token `{version}`")));
    }

    Ok(RequestLine { method, target, version })
}

pub fn parse_status_line(caret: &mut Caret<'_>) -> Result<StatusLine> {
    let version_start = caret.pos();
    if !caret.find(b' ') {
        return Err(HearthError::http_malformed_start_line("missing space after HTTP version"));
    }
    let version = caret.label(version_start, caret.pos()).to_string();
    caret.set_pos(caret.pos() + 1);

    if !version.starts_with("HTTP/") {
        return Err(HearthError::http_unknown_protocol(format!("unrecognized protocol token `{version}`")));
    }

    let status = caret.parse_u32().map_err(|_| HearthError::http_malformed_start_line("missing or invalid status code"))?;
    let status: u16 = status.try_into().map_err(|_| HearthError::http_malformed_start_line("status code out of range"))?;
    caret.consume_if(" ", true);

    let reason_start = caret.pos();
    if !caret.find_crlf() {
        return Err(HearthError::http_malformed_start_line("missing CRLF after reason phrase"));
    }
    let reason = caret.label(reason_start, caret.pos()).to_string();
    caret.skip_crlf();

    Ok(StatusLine { version, status, reason })
}

/// One `name: value` header field as written on the wire. Fields preserve
/// their original casing and duplicate entries are kept in arrival order —
/// neither `Headers::get` nor `Headers::get_all` mutate the underlying list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub name: String,
    pub value: String,
}

/// The header block of an HTTP message. RFC 7230 §3.2.2 treats field names
/// case-insensitively and allows repetition; this keeps every field exactly
/// as parsed and resolves case-insensitivity and multiplicity at lookup
/// time rather than normalizing on insert, so a message can be re-emitted
/// byte-for-byte if nothing touches it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(pub Vec<HeaderField>);

impl Headers {
    pub fn new() -> Self {
        Headers(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(HeaderField { name: name.into(), value: value.into() });
    }

    /// First value for `name`, case-insensitive. Use [`get_all`](Self::get_all)
    /// for headers (`Set-Cookie`, `Cache-Control`, ...) that may legally
    /// repeat and whose values must all be observed.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|h| h.name.eq_ignore_ascii_case(name)).map(|h| h.value.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.0.iter().filter(|h| h.name.eq_ignore_ascii_case(name)).map(|h| h.value.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderField> {
        self.0.iter()
    }
}

/// Above this many header-block bytes, [`parse_headers`] gives up with
/// `http.header_too_large` rather than keep scanning attacker-controlled
/// input indefinitely. No original-source constant names a value, so this
/// picks the common 8 KiB many HTTP servers default to.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

/// Finds the end of one header field's name: up to the first `:` or space
/// (folding-whitespace before the colon is legal), or `\r` if the line has
/// neither — a line with no colon at all is a grammar error, not a signal to
/// keep scanning into the next line. Returns `None` only when the input ends
/// before any of `: \r` appears at all.
fn parse_header_name<'a>(caret: &mut Caret<'a>) -> Option<&'a str> {
    let start = caret.pos();
    if !caret.find_any_of(b": \r") {
        return None;
    }
    if caret.is_at(b'\r') {
        return None;
    }
    Some(caret.label(start, caret.pos()))
}

/// Reads header fields up to (and including) the blank-line CRLF that ends
/// the header block, rejecting a block larger than
/// [`DEFAULT_MAX_HEADER_BYTES`] with `http.header_too_large`.
/// A header line with no `:` at all — whether `parse_header_name` ran off
/// the end of the input or stopped at a bare `\r` — is `http.malformed_start_line`
/// instead: too-large is strictly a size policy, never a grammar one.
pub fn parse_headers(caret: &mut Caret<'_>) -> Result<Headers> {
    parse_headers_with_limit(caret, DEFAULT_MAX_HEADER_BYTES)
}

/// [`parse_headers`] with an explicit size limit, for a caller that has its
/// own configured maximum instead of [`DEFAULT_MAX_HEADER_BYTES`].
pub fn parse_headers_with_limit(caret: &mut Caret<'_>, max_header_bytes: usize) -> Result<Headers> {
    let block_start = caret.pos();
    let mut headers = Headers::new();
    while !caret.at_crlf() {
        if caret.pos() - block_start > max_header_bytes {
            return Err(HearthError::http_header_too_large());
        }
        caret.advance_to_non_whitespace();
        let name = match parse_header_name(caret) {
            Some(n) => n.to_string(),
            None => return Err(HearthError::http_malformed_start_line("missing ':' in header line")),
        };
        caret.advance_to_non_whitespace();
        if !caret.consume_if(":", true) {
            return Err(HearthError::http_malformed_start_line("missing ':' after header name"));
        }
        caret.advance_to_non_whitespace();
        let value_start = caret.pos();
        if !caret.find_crlf() {
            return Err(HearthError::http_malformed_start_line("header value not terminated by CRLF"));
        }
        let value = caret.label(value_start, caret.pos()).trim_end().to_string();
        headers.push(name, value);
        caret.skip_crlf();
    }
    if caret.pos() - block_start > max_header_bytes {
        return Err(HearthError::http_header_too_large());
    }
    caret.skip_crlf();
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_request_line() {
        let mut caret = Caret::from_str("GET /widgets?id=1 HTTP/1.1\r\nHost: example.com\r\n\r\n");
        let line = parse_request_line(&mut caret).unwrap();
        assert_eq!(line, RequestLine { method: "GET".into(), target: "/widgets?id=1".into(), version: "HTTP/1.1".into() });
    }

    #[test]
    fn rejects_unknown_protocol_token() {
        let mut caret = Caret::from_str("GET / GOPHER/1.0\r\n\r\n");
        let err = parse_request_line(&mut caret).unwrap_err();
        assert_eq!(err.code(), "http.unknown_protocol");
    }

    #[test]
    fn parses_a_status_line() {
        let mut caret = Caret::from_str("HTTP/1.1 404 Not Found\r\n");
        let line = parse_status_line(&mut caret).unwrap();
        assert_eq!(line, StatusLine { version: "HTTP/1.1".into(), status: 404, reason: "Not Found".into() });
    }

    #[test]
    fn headers_preserve_case_and_duplicates() {
        let mut caret = Caret::from_str("Content-Type: text/plain\r\nX-Tag: a\r\nX-Tag: b\r\n\r\n");
        let headers = parse_headers(&mut caret).unwrap();
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("X-Tag"), Some("a"));
        assert_eq!(headers.get_all("x-tag"), vec!["a", "b"]);
        assert_eq!(headers.0[0].name, "Content-Type");
    }

    #[test]
    fn missing_colon_after_header_name_is_malformed() {
        let mut caret = Caret::from_str("Broken Header\r\n\r\n");
        let err = parse_headers(&mut caret).unwrap_err();
        assert_eq!(err.code(), "http.malformed_start_line");
    }

    #[test]
    fn a_header_line_with_no_colon_at_all_is_malformed_not_too_large() {
        let mut caret = Caret::from_str("BrokenHeader\r\n\r\n");
        let err = parse_headers(&mut caret).unwrap_err();
        assert_eq!(err.code(), "http.malformed_start_line");
    }

    #[test]
    fn a_header_block_over_the_configured_limit_is_rejected() {
        let mut caret = Caret::from_str("X-Long: aaaaaaaaaaaaaaaaaaaa\r\n\r\n");
        let err = parse_headers_with_limit(&mut caret, 8).unwrap_err();
        assert_eq!(err.code(), "http.header_too_large");
    }
}
