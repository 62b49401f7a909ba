//! `Caret` — a position-carrying, borrowed-buffer tokenizer.
//!
//! Ported from `examples/original_source/core/parser/ParsingCaret.{hpp,cpp}`.
//! A caret never owns or copies its input; every successful parse either
//! leaves `pos` unchanged or strictly advances it, and a failed call never
//! advances `pos` at all — callers can always rewind to a checkpoint and
//! retry a different production without the caret having moved underneath
//! them.

use crate::error::HearthError;

const WHITESPACE: &[u8] = b" \t\n\r\x0c";

/// A non-owning cursor over a byte buffer, carrying an error slot.
///
/// # Why
/// Every parser in this crate (JSON, HTTP, the URL router) reads from a
/// buffer it does not own and must not copy — a request body or pattern
/// string already lives somewhere else for the duration of the call. oatpp
/// solves this with `ParsingCaret` wrapping a raw pointer plus an
/// `std::exception_ptr`-free error slot; a Rust lifetime parameter gets the
/// non-owning part for free, so this only needs to carry position and error.
///
/// # How
/// Every `find_*`/`parse_*` method either advances `pos` past what it
/// consumed and returns the parsed value, or leaves `pos` untouched and
/// records into `error` instead — never both. That all-or-nothing contract
/// is what lets a caller try one production, and on failure rewind with
/// [`Self::set_pos`] to a saved checkpoint and try another without the
/// caret's state leaking between attempts.
///
/// # What
/// - Constructed per parse and never stored past the call that created it.
/// - The borrowed slices it hands out (`label`, `find_*`) live exactly as
///   long as the underlying buffer, not as long as the `Caret` itself.
pub struct Caret<'a> {
    data: &'a [u8],
    pos: usize,
    error: Option<HearthError>,
}

impl<'a> Caret<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, error: None }
    }

    pub fn from_str(s: &'a str) -> Self {
        Self::new(s.as_bytes())
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        debug_assert!(pos <= self.data.len());
        self.pos = pos.min(self.data.len());
    }

    /// Bytes from the current position to the end of the buffer.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// [`remaining`](Self::remaining) as a borrowed `&str`, for callers that
    /// already know the buffer is valid UTF-8 (e.g. the router matching
    /// against a request target).
    pub fn remaining_str(&self) -> &'a str {
        self.label(self.pos, self.data.len())
    }

    pub fn can_continue(&self) -> bool {
        self.pos < self.data.len()
    }

    pub fn is_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn is_at(&self, c: u8) -> bool {
        self.peek() == Some(c)
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&HearthError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<HearthError> {
        self.error.take()
    }

    /// Allows speculative lookahead: a caller can try an alternative parse
    /// after a failed one without losing caret usability.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn fail(&mut self, err: HearthError) {
        self.error = Some(err.with_offset(self.pos));
    }

    /// Returns a borrowed slice of the underlying buffer, `[start, end)`.
    pub fn label(&self, start: usize, end: usize) -> &'a str {
        std::str::from_utf8(&self.data[start..end]).unwrap_or_default()
    }

    pub fn label_bytes(&self, start: usize, end: usize) -> &'a [u8] {
        &self.data[start..end]
    }

    // --- whitespace / scanning ------------------------------------------

    /// Advances past whitespace; returns `true` if it stopped on a
    /// non-whitespace byte before the end of input, `false` if it reached
    /// the end.
    pub fn advance_to_non_whitespace(&mut self) -> bool {
        while self.pos < self.data.len() {
            if !WHITESPACE.contains(&self.data[self.pos]) {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    /// Advances to (not past) the first occurrence of `byte`.
    pub fn find(&mut self, byte: u8) -> bool {
        while self.pos < self.data.len() {
            if self.data[self.pos] == byte {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    /// Advances to the first byte NOT in `set`.
    pub fn find_not_in(&mut self, set: &[u8]) -> bool {
        while self.pos < self.data.len() {
            if !set.contains(&self.data[self.pos]) {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    /// Advances to the first byte that IS in `set`.
    pub fn find_any_of(&mut self, set: &[u8]) -> bool {
        while self.pos < self.data.len() {
            if set.contains(&self.data[self.pos]) {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    pub fn find_crlf(&mut self) -> bool {
        while self.pos + 1 < self.data.len() {
            if self.data[self.pos] == b'\r' && self.data[self.pos + 1] == b'\n' {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    pub fn at_crlf(&self) -> bool {
        self.pos + 1 < self.data.len() && self.data[self.pos] == b'\r' && self.data[self.pos + 1] == b'\n'
    }

    pub fn skip_crlf(&mut self) -> bool {
        if self.at_crlf() {
            self.pos += 2;
            true
        } else {
            false
        }
    }

    // --- numeric primitives ----------------------------------------------

    fn scan_decimal(&mut self, allow_sign: bool) -> Option<(usize, usize)> {
        let start = self.pos;
        let mut i = self.pos;
        if allow_sign && i < self.data.len() && (self.data[i] == b'-' || self.data[i] == b'+') {
            i += 1;
        }
        let digits_start = i;
        while i < self.data.len() && self.data[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start {
            return None;
        }
        Some((start, i))
    }

    pub fn parse_i32(&mut self) -> Result<i32, HearthError> {
        match self.scan_decimal(true) {
            None => {
                let e = HearthError::parse_malformed("expected an integer");
                self.fail(e.clone_light());
                Err(e.with_offset(self.pos))
            }
            Some((start, end)) => {
                let text = self.label(start, end);
                match text.parse::<i32>() {
                    Ok(v) => {
                        self.pos = end;
                        Ok(v)
                    }
                    Err(_) => {
                        let e = HearthError::parse_number_range(format!("integer out of i32 range: {text}"));
                        self.fail(e.clone_light());
                        Err(e.with_offset(start))
                    }
                }
            }
        }
    }

    pub fn parse_i64(&mut self) -> Result<i64, HearthError> {
        match self.scan_decimal(true) {
            None => {
                let e = HearthError::parse_malformed("expected an integer");
                self.fail(e.clone_light());
                Err(e.with_offset(self.pos))
            }
            Some((start, end)) => {
                let text = self.label(start, end);
                match text.parse::<i64>() {
                    Ok(v) => {
                        self.pos = end;
                        Ok(v)
                    }
                    Err(_) => {
                        let e = HearthError::parse_number_range(format!("integer out of i64 range: {text}"));
                        self.fail(e.clone_light());
                        Err(e.with_offset(start))
                    }
                }
            }
        }
    }

    pub fn parse_u32(&mut self) -> Result<u32, HearthError> {
        match self.scan_decimal(false) {
            None => {
                let e = HearthError::parse_malformed("expected an unsigned integer");
                self.fail(e.clone_light());
                Err(e.with_offset(self.pos))
            }
            Some((start, end)) => {
                let text = self.label(start, end);
                match text.parse::<u32>() {
                    Ok(v) => {
                        self.pos = end;
                        Ok(v)
                    }
                    Err(_) => {
                        let e = HearthError::parse_number_range(format!("integer out of u32 range: {text}"));
                        self.fail(e.clone_light());
                        Err(e.with_offset(start))
                    }
                }
            }
        }
    }

    pub fn parse_u64(&mut self) -> Result<u64, HearthError> {
        match self.scan_decimal(false) {
            None => {
                let e = HearthError::parse_malformed("expected an unsigned integer");
                self.fail(e.clone_light());
                Err(e.with_offset(self.pos))
            }
            Some((start, end)) => {
                let text = self.label(start, end);
                match text.parse::<u64>() {
                    Ok(v) => {
                        self.pos = end;
                        Ok(v)
                    }
                    Err(_) => {
                        let e = HearthError::parse_number_range(format!("integer out of u64 range: {text}"));
                        self.fail(e.clone_light());
                        Err(e.with_offset(start))
                    }
                }
            }
        }
    }

    fn scan_float(&mut self) -> Option<(usize, usize)> {
        let start = self.pos;
        let mut i = self.pos;
        let len = self.data.len();
        if i < len && (self.data[i] == b'-' || self.data[i] == b'+') {
            i += 1;
        }
        let mantissa_start = i;
        while i < len && self.data[i].is_ascii_digit() {
            i += 1;
        }
        if i < len && self.data[i] == b'.' {
            i += 1;
            while i < len && self.data[i].is_ascii_digit() {
                i += 1;
            }
        }
        if i == mantissa_start || (i == mantissa_start + 1 && self.data[mantissa_start] == b'.') {
            return None;
        }
        if i < len && (self.data[i] == b'e' || self.data[i] == b'E') {
            let mut j = i + 1;
            if j < len && (self.data[j] == b'-' || self.data[j] == b'+') {
                j += 1;
            }
            let exp_start = j;
            while j < len && self.data[j].is_ascii_digit() {
                j += 1;
            }
            if j > exp_start {
                i = j;
            }
        }
        Some((start, i))
    }

    pub fn parse_f32(&mut self) -> Result<f32, HearthError> {
        match self.scan_float() {
            None => {
                let e = HearthError::parse_malformed("expected a float");
                self.fail(e.clone_light());
                Err(e.with_offset(self.pos))
            }
            Some((start, end)) => {
                let text = self.label(start, end);
                match text.parse::<f32>() {
                    Ok(v) => {
                        self.pos = end;
                        Ok(v)
                    }
                    Err(_) => {
                        let e = HearthError::parse_malformed(format!("invalid float literal: {text}"));
                        self.fail(e.clone_light());
                        Err(e.with_offset(start))
                    }
                }
            }
        }
    }

    pub fn parse_f64(&mut self) -> Result<f64, HearthError> {
        match self.scan_float() {
            None => {
                let e = HearthError::parse_malformed("expected a float");
                self.fail(e.clone_light());
                Err(e.with_offset(self.pos))
            }
            Some((start, end)) => {
                let text = self.label(start, end);
                match text.parse::<f64>() {
                    Ok(v) => {
                        self.pos = end;
                        Ok(v)
                    }
                    Err(_) => {
                        let e = HearthError::parse_malformed(format!("invalid float literal: {text}"));
                        self.fail(e.clone_light());
                        Err(e.with_offset(start))
                    }
                }
            }
        }
    }

    /// Default literals are `"true"`/`"false"`.
    pub fn parse_bool(&mut self, true_text: &str, false_text: &str) -> Result<bool, HearthError> {
        if self.consume_if(true_text, true) {
            Ok(true)
        } else if self.consume_if(false_text, true) {
            Ok(false)
        } else {
            let e = HearthError::parse_malformed("expected a boolean literal");
            self.fail(e.clone_light());
            Err(e.with_offset(self.pos))
        }
    }

    // --- literal matching --------------------------------------------------

    /// Advances only if the literal follows at the current position.
    pub fn consume_if(&mut self, text: &str, case_sensitive: bool) -> bool {
        let bytes = text.as_bytes();
        if bytes.len() > self.data.len() - self.pos {
            return false;
        }
        let window = &self.data[self.pos..self.pos + bytes.len()];
        let matches = if case_sensitive {
            window == bytes
        } else {
            window.eq_ignore_ascii_case(bytes)
        };
        if matches {
            self.pos += bytes.len();
        }
        matches
    }

    /// Like [`consume_if`](Self::consume_if) but requires the following byte
    /// to not continue an identifier (`[A-Za-z0-9_]`).
    pub fn consume_if_word(&mut self, text: &str) -> bool {
        let bytes = text.as_bytes();
        if bytes.len() > self.data.len() - self.pos {
            return false;
        }
        let window = &self.data[self.pos..self.pos + bytes.len()];
        if window != bytes {
            return false;
        }
        let after = self.pos + bytes.len();
        if after < self.data.len() && is_ident_byte(self.data[after]) {
            return false;
        }
        self.pos = after;
        true
    }

    /// Returns the label between `open` and `close`; `escape` characters
    /// cause the following byte to be skipped over while scanning for
    /// `close`. Fails with `UNCLOSED` if `close` is never seen.
    pub fn parse_enclosed(&mut self, open: u8, close: u8, escape: u8) -> Result<&'a str, HearthError> {
        if self.peek() != Some(open) {
            let e = HearthError::parse_malformed("missing opening delimiter").with_offset(self.pos);
            self.fail(e.clone_light());
            return Err(e);
        }
        let open_pos = self.pos;
        let mut i = self.pos + 1;
        let start = i;
        while i < self.data.len() {
            if self.data[i] == escape {
                i += 1;
            } else if self.data[i] == close {
                let label = self.label(start, i);
                self.pos = i + 1;
                return Ok(label);
            }
            i += 1;
        }
        self.pos = open_pos;
        let e = HearthError::parse_malformed("unclosed delimiter").with_offset(open_pos);
        self.fail(e.clone_light());
        Err(e)
    }

    /// `[A-Za-z0-9_]+`.
    pub fn parse_identifier(&mut self) -> Result<&'a str, HearthError> {
        let start = self.pos;
        let mut i = self.pos;
        while i < self.data.len() && is_ident_byte(self.data[i]) {
            i += 1;
        }
        if i == start {
            let e = HearthError::parse_malformed("expected an identifier").with_offset(self.pos);
            self.fail(e.clone_light());
            return Err(e);
        }
        self.pos = i;
        Ok(self.label(start, i))
    }

    /// Advances to and consumes the first literal in `list` that matches at
    /// the current position, trying entries in order.
    pub fn find_in_dictionary(&mut self, list: &[&str]) -> Option<usize> {
        for (idx, candidate) in list.iter().enumerate() {
            if self.consume_if(candidate, true) {
                return Some(idx);
            }
        }
        None
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_literal_then_trailing_garbage() {
        let mut caret = Caret::from_str("   -42abc");
        assert!(caret.advance_to_non_whitespace());
        let v = caret.parse_i32().unwrap();
        assert_eq!(v, -42);
        assert_eq!(caret.pos(), 6);
        assert!(!caret.has_error());

        let before = caret.pos();
        let err = caret.parse_i32().unwrap_err();
        assert_eq!(err.code(), "parse.malformed");
        assert_eq!(caret.pos(), before);
    }

    #[test]
    fn failed_parse_never_advances() {
        let mut caret = Caret::from_str("not-a-number");
        let before = caret.pos();
        assert!(caret.parse_i32().is_err());
        assert_eq!(caret.pos(), before);
    }

    #[test]
    fn i32_overflow_is_range_error_not_silent_truncation() {
        let mut caret = Caret::from_str("99999999999999999999");
        let err = caret.parse_i32().unwrap_err();
        assert_eq!(err.code(), "parse.number_range");
        assert_eq!(caret.pos(), 0);
    }

    #[test]
    fn clear_error_allows_speculative_lookahead() {
        let mut caret = Caret::from_str("true");
        assert!(caret.parse_i32().is_err());
        caret.clear_error();
        assert!(!caret.has_error());
        assert!(caret.parse_bool("true", "false").unwrap());
    }

    #[test]
    fn enclosed_label_respects_escape() {
        let mut caret = Caret::from_str(r#""a\"b" rest"#);
        let label = caret.parse_enclosed(b'"', b'"', b'\\').unwrap();
        assert_eq!(label, r#"a\"b"#);
    }

    #[test]
    fn enclosed_label_fails_without_close() {
        let mut caret = Caret::from_str("\"unterminated");
        let start = caret.pos();
        let err = caret.parse_enclosed(b'"', b'"', b'\\').unwrap_err();
        assert_eq!(err.code(), "parse.malformed");
        assert_eq!(caret.pos(), start);
    }

    #[test]
    fn identifier_grammar() {
        let mut caret = Caret::from_str("field_1-next");
        let id = caret.parse_identifier().unwrap();
        assert_eq!(id, "field_1");
    }

    #[test]
    fn consume_if_word_rejects_identifier_continuation() {
        let mut caret = Caret::from_str("truest");
        assert!(!caret.consume_if_word("true"));
        assert_eq!(caret.pos(), 0);

        let mut caret = Caret::from_str("true,");
        assert!(caret.consume_if_word("true"));
        assert_eq!(caret.pos(), 4);
    }

    proptest::proptest! {
        #[test]
        fn position_never_moves_backward_on_success(s in "[ -~]{0,40}") {
            let mut caret = Caret::from_str(&s);
            let before = caret.pos();
            if caret.parse_i32().is_ok() {
                assert!(caret.pos() >= before);
            } else {
                assert_eq!(caret.pos(), before);
            }
        }
    }
}
