//! C9 — HTTP body framing: deciding how many bytes belong to the body and
//! decoding chunked transfer-coding (RFC 7230 §3.3, §4.1).
//!
//! oatpp resolves this as part of `HttpRequestHandler`/`StreamingBody`
//! reading the `Content-Length`/`Transfer-Encoding` headers before handing
//! the connection stream to the mapper; here it is split out as a pure
//! function of [`Headers`] so the dispatcher (C12) can decide framing
//! before it has a live stream (e.g. in tests, against an in-memory
//! buffer).

use crate::caret::Caret;
use crate::error::{HearthError, Result};
use crate::http::message::Headers;

/// How a message body's end is determined, resolved from its headers
/// per RFC 7230 §3.3.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFraming {
    /// `Content-Length: n` — exactly `n` bytes follow.
    LengthDelimited(u64),
    /// `Transfer-Encoding: chunked` — takes priority over `Content-Length`
    /// per RFC 7230 §3.3.3 rule 3.
    Chunked,
    /// No framing header present: request bodies default to empty; response
    /// bodies run to connection close.
    ReadToClose,
}

/// Resolves the framing for a message. `is_request` matters only for the
/// "neither header present" case (rule 6 in RFC 7230 §3.3.3).
pub fn determine_framing(headers: &Headers, is_request: bool) -> Result<BodyFraming> {
    if let Some(encoding) = headers.get("Transfer-Encoding") {
        if encoding.eq_ignore_ascii_case("chunked") {
            return Ok(BodyFraming::Chunked);
        }
        return Err(HearthError::http_malformed_start_line(format!("unsupported Transfer-Encoding `{encoding}`")));
    }
    if let Some(length) = headers.get("Content-Length") {
        let value: u64 = length.trim().parse().map_err(|_| HearthError::http_malformed_start_line("invalid Content-Length"))?;
        return Ok(BodyFraming::LengthDelimited(value));
    }
    if is_request {
        Ok(BodyFraming::LengthDelimited(0))
    } else {
        Ok(BodyFraming::ReadToClose)
    }
}

/// Reads a chunked body already fully buffered in `caret`, concatenating
/// chunk data and stopping at the zero-length final chunk. Trailer headers
/// after the final chunk are parsed and discarded, per RFC 7230 §4.1.2 —
/// this crate has no use for trailers (no streaming transport consumes them
/// yet).
pub fn read_chunked_body(caret: &mut Caret<'_>) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let size_start = caret.pos();
        if !caret.find_any_of(b"\r;") {
            return Err(HearthError::http_malformed_start_line("unterminated chunk size"));
        }
        let size_text = caret.label(size_start, caret.pos());
        let size = u64::from_str_radix(size_text.trim(), 16).map_err(|_| HearthError::http_malformed_start_line("invalid chunk size"))?;

        // Skip a chunk-extension, if present, up to the CRLF.
        if !caret.at_crlf() {
            caret.find_crlf();
        }
        if !caret.skip_crlf() {
            return Err(HearthError::http_malformed_start_line("chunk size not terminated by CRLF"));
        }

        if size == 0 {
            break;
        }

        let size = size as usize;
        if caret.remaining().len() < size {
            return Err(HearthError::http_malformed_start_line("chunk data shorter than declared size"));
        }
        body.extend_from_slice(&caret.remaining()[..size]);
        caret.set_pos(caret.pos() + size);
        if !caret.skip_crlf() {
            return Err(HearthError::http_malformed_start_line("chunk data not terminated by CRLF"));
        }
    }

    // Trailer section: zero or more header lines followed by a blank line.
    while !caret.at_crlf() {
        if !caret.find_crlf() {
            return Err(HearthError::http_malformed_start_line("unterminated trailer section"));
        }
        caret.skip_crlf();
    }
    caret.skip_crlf();

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_encoding_chunked_outranks_content_length() {
        let mut headers = Headers::new();
        headers.push("Content-Length", "10");
        headers.push("Transfer-Encoding", "chunked");
        assert_eq!(determine_framing(&headers, true).unwrap(), BodyFraming::Chunked);
    }

    #[test]
    fn request_with_no_framing_header_has_empty_body() {
        let headers = Headers::new();
        assert_eq!(determine_framing(&headers, true).unwrap(), BodyFraming::LengthDelimited(0));
    }

    #[test]
    fn response_with_no_framing_header_reads_to_close() {
        let headers = Headers::new();
        assert_eq!(determine_framing(&headers, false).unwrap(), BodyFraming::ReadToClose);
    }

    #[test]
    fn decodes_chunked_body() {
        let mut caret = Caret::from_str("4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n");
        let body = read_chunked_body(&mut caret).unwrap();
        assert_eq!(body, b"Wikipedia");
    }

    #[test]
    fn rejects_truncated_chunk_data() {
        let mut caret = Caret::from_str("10\r\nshort\r\n");
        assert!(read_chunked_body(&mut caret).is_err());
    }
}
