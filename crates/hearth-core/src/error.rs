//! Error taxonomy shared by every subsystem in this crate.
//!
//! Modeled on `spark-core`'s `CoreError`/`ErrorCategory` split: errors carry
//! a stable `<domain>.<reason>` code plus a human-readable message, rather
//! than living as variants of one closed enum. New failure kinds can be
//! added as constructors without a breaking change to a match statement
//! somewhere in a downstream crate.

use std::borrow::Cow;
use std::fmt;

/// How a caller should react to an error, independent of its message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient; the same operation may succeed if retried (e.g. a
    /// non-blocking I/O call that would have blocked).
    Retryable,
    /// The input or request itself is invalid; retrying without changing it
    /// will not help.
    NonRetryable,
    /// An invariant the implementation itself is supposed to uphold was
    /// violated (wrong dispatcher category, unregistered type). These are
    /// bugs, not client-facing failures.
    ProgrammerError,
}

/// The error type returned by every fallible operation in this crate.
///
/// # Why
/// `spark-core`'s `CoreError` establishes the pattern this follows: a
/// stable string code plus a human message, rather than one large enum
/// with a variant per failure kind. An enum forces every downstream match
/// statement to grow a new arm whenever a new failure is added anywhere in
/// the crate, which breaks source compatibility for callers who already
/// handle the failures they care about and `_ => ...` everything else. A
/// code string has no such coupling: a new constructor is purely additive.
///
/// # How
/// Construction goes through [`HearthError::new`] or one of the named
/// constructors below it, each fixing a `code`/[`ErrorCategory`] pair so
/// call sites never have to pick a category by hand and risk miscategorizing
/// a retryable failure as permanent or vice versa. `with_offset`/`with_source`
/// attach optional context after construction, mirroring `CoreError`'s
/// builder-style `with_*` methods.
///
/// # What
/// - `code` is always `'static` and namespaced `<domain>.<reason>`, matching
///   every constructor's literal below.
/// - `message` is free text for a human reading logs; nothing in this crate
///   parses it back out.
/// - `category` governs only what a caller *should* do (retry or not); it
///   never changes how this type itself behaves.
#[derive(Debug)]
pub struct HearthError {
    code: &'static str,
    message: Cow<'static, str>,
    category: ErrorCategory,
    /// Byte offset into the input being parsed, when the error originated
    /// from a caret-driven parser. `None` for non-parsing errors.
    offset: Option<usize>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HearthError {
    pub fn new(code: &'static str, message: impl Into<Cow<'static, str>>, category: ErrorCategory) -> Self {
        Self { code, message: message.into(), category, offset: None, source: None }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    // --- named error constructors, one per failure kind -----------------

    pub fn parse_malformed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new("parse.malformed", message, ErrorCategory::NonRetryable)
    }

    pub fn parse_number_range(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new("parse.number_range", message, ErrorCategory::NonRetryable)
    }

    pub fn json_unexpected_token(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new("json.unexpected_token", message, ErrorCategory::NonRetryable)
    }

    pub fn json_unknown_field(field: &str) -> Self {
        Self::new("json.unknown_field", format!("unknown field `{field}`"), ErrorCategory::NonRetryable)
    }

    pub fn required_field_null(field: &str) -> Self {
        Self::new("json.required_field_null", format!("required field `{field}` was null or missing"), ErrorCategory::NonRetryable)
    }

    pub fn map_key_not_string() -> Self {
        Self::new("json.map_key_not_string", "map key type must be String", ErrorCategory::NonRetryable)
    }

    pub fn http_malformed_start_line(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new("http.malformed_start_line", message, ErrorCategory::NonRetryable)
    }

    pub fn http_unknown_protocol(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new("http.unknown_protocol", message, ErrorCategory::NonRetryable)
    }

    pub fn http_header_too_large() -> Self {
        Self::new("http.header_too_large", "header block exceeds configured limit", ErrorCategory::NonRetryable)
    }

    pub fn io_retry_later() -> Self {
        Self::new("io.retry_later", "operation would block", ErrorCategory::Retryable)
    }

    pub fn io_broken(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new("io.broken", message, ErrorCategory::NonRetryable)
    }

    pub fn router_no_match() -> Self {
        Self::new("router.no_match", "no endpoint matched the request", ErrorCategory::NonRetryable)
    }

    pub fn dispatch_param_missing(name: &str) -> Self {
        Self::new("dispatch.param_missing", format!("required parameter `{name}` missing"), ErrorCategory::NonRetryable)
    }

    pub fn dispatch_param_bad_cast(name: &str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new("dispatch.param_bad_cast", format!("parameter `{name}`: {}", message.into()), ErrorCategory::NonRetryable)
    }

    pub fn programmer_error(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new("hearth.programmer_error", message, ErrorCategory::ProgrammerError)
    }

    /// Cheap clone used where a caret both records an error on itself and
    /// returns one to the caller — `HearthError` does not derive `Clone`
    /// because `source` is a boxed trait object, so this copies only the
    /// printable parts and drops the cause chain.
    pub(crate) fn clone_light(&self) -> HearthError {
        HearthError::new(self.code(), self.message().to_string(), self.category())
    }
}

impl fmt::Display for HearthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(off) => write!(f, "[{}] {} (at byte {off})", self.code, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

impl std::error::Error for HearthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type Result<T> = std::result::Result<T, HearthError>;

/// Maps each error code to its HTTP status. Only the dispatcher (C12)
/// needs this; everything else just propagates `HearthError` unchanged.
pub fn http_status_for(err: &HearthError) -> u16 {
    match err.code() {
        "http.malformed_start_line" | "http.unknown_protocol" => 400,
        "http.header_too_large" => 431,
        "router.no_match" => 404,
        "dispatch.param_missing" | "dispatch.param_bad_cast" => 400,
        _ => 500,
    }
}
