//! C10 — URL pattern compilation and matching.
//!
//! Ported from `examples/original_source/web/url/mapping/Pattern.cpp`
//! (`Pattern::parse`, `Pattern::match`, `Pattern::findSysChar`). `findSysChar`
//! scanning for the next `/` or `?` — the rule that separates a path
//! segment from a trailing query string — is exactly
//! [`Caret::find_any_of`] with `b"/?"`.

use std::collections::HashMap;

use crate::caret::Caret;

/// One compiled segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A literal path segment, matched verbatim.
    Const(String),
    /// `{name}` — captures one path segment under `name`.
    Var(String),
    /// `*` — must be the last segment; captures everything after it
    /// (including further `/`s) as the match's tail.
    Tail,
}

/// A compiled route pattern, e.g. `/widgets/{id}/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<Segment>,
}

/// The result of a successful [`Pattern::match_path`]: captured `{var}`
/// values plus whatever followed a `*` segment or a `?` query separator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchResult {
    pub variables: HashMap<String, String>,
    pub tail: Option<String>,
}

impl Pattern {
    /// Compiles `path` into segments. `/` separates segments, `{name}`
    /// marks a variable, and a bare `*` anywhere truncates the pattern into
    /// a tail-capture (mirroring the original's early `return result` on
    /// hitting `*`).
    pub fn compile(path: &str) -> Pattern {
        let bytes = path.as_bytes();
        let mut segments = Vec::new();
        let mut last = 0usize;
        let mut i = 0usize;

        while i < bytes.len() {
            match bytes[i] {
                b'/' => {
                    if i > last {
                        segments.push(Segment::Const(path[last..i].to_string()));
                    }
                    last = i + 1;
                }
                b'*' => {
                    segments.push(Segment::Tail);
                    return Pattern { segments };
                }
                b'{' => {
                    last = i + 1;
                    while i < bytes.len() && bytes[i] != b'}' {
                        i += 1;
                    }
                    if i > last {
                        segments.push(Segment::Var(path[last..i].to_string()));
                    } else {
                        segments.push(Segment::Var(String::new()));
                    }
                    last = i + 1;
                }
                _ => {}
            }
            i += 1;
        }

        if i > last {
            segments.push(Segment::Const(path[last..i].to_string()));
        }

        Pattern { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Matches `url` (a request target's path, optionally followed by `?
    /// query`) against this pattern. Returns `None` on no match.
    pub fn match_path(&self, url: &str) -> Option<MatchResult> {
        let mut caret = Caret::from_str(url);

        if self.segments.is_empty() {
            return if caret.consume_if("/", true) { None } else { Some(MatchResult::default()) };
        }

        let mut variables = HashMap::new();
        let mut tail: Option<String> = None;
        let mut iter = self.segments.iter().peekable();

        while let Some(segment) = iter.next() {
            caret.consume_if("/", true);

            match segment {
                Segment::Const(text) => {
                    if !caret.consume_if(text, true) {
                        return None;
                    }
                    if caret.can_continue() && !caret.is_at(b'/') {
                        if caret.is_at(b'?') && matches!(iter.peek(), None | Some(Segment::Tail)) {
                            tail = Some(caret.remaining_str().to_string());
                            return Some(MatchResult { variables, tail });
                        }
                        return None;
                    }
                }
                Segment::Tail => {
                    if caret.can_continue() {
                        tail = Some(caret.remaining_str().to_string());
                    }
                    return Some(MatchResult { variables, tail });
                }
                Segment::Var(name) => {
                    if !caret.can_continue() {
                        return None;
                    }
                    let start = caret.pos();
                    caret.find_any_of(b"/?");

                    if caret.is_at(b'?') {
                        if matches!(iter.peek(), None | Some(Segment::Tail)) {
                            let captured = caret.label(start, caret.pos()).to_string();
                            variables.insert(name.clone(), captured);
                            tail = Some(caret.remaining_str().to_string());
                            return Some(MatchResult { variables, tail });
                        }
                        caret.find(b'/');
                    }

                    let captured = caret.label(start, caret.pos()).to_string();
                    variables.insert(name.clone(), captured);
                }
            }
        }

        caret.consume_if("/", true);
        if caret.can_continue() {
            return None;
        }

        Some(MatchResult { variables, tail })
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Const(text) => write!(f, "/{text}")?,
                Segment::Var(name) => write!(f, "/{{{name}}}")?,
                Segment::Tail => write!(f, "/*")?,
            }
        }
        Ok(())
    }
}
