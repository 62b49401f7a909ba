//! A per-method, ordered list of compiled patterns: the piece of C10 that
//! decides *which* registered pattern a request target matches, as opposed
//! to [`super::pattern::Pattern`] which decides whether one given pattern
//! matches. Grounded on `HttpRouter::route` in
//! `examples/original_source/src/oatpp/web/server/HttpRouter.hpp`, which
//! walks its endpoints in registration order and returns the first match.

use std::collections::HashMap;

use crate::router::pattern::{MatchResult, Pattern};

/// An ordered table of `(pattern, handler-id)` pairs per HTTP method.
/// Registration order is preserved and is significant: a request matches
/// the *first* pattern in the list that accepts it, even if a later,
/// more specific pattern would also match (an explicit open-question
/// resolved in DESIGN.md as "first-match-wins, unchanged from the
/// original").
pub struct RouteTable<H> {
    routes: HashMap<String, Vec<(Pattern, H)>>,
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        RouteTable { routes: HashMap::new() }
    }

    pub fn register(&mut self, method: &str, pattern: Pattern, handler: H) {
        self.routes.entry(method.to_ascii_uppercase()).or_default().push((pattern, handler));
    }

    /// Finds the first pattern registered under `method` that matches
    /// `target`, returning its handler and the captured variables/tail.
    pub fn route(&self, method: &str, target: &str) -> Option<(&H, MatchResult)> {
        let candidates = self.routes.get(&method.to_ascii_uppercase())?;
        for (pattern, handler) in candidates {
            if let Some(result) = pattern.match_path(target) {
                return Some((handler, result));
            }
        }
        None
    }
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registered_match_wins_over_a_later_more_specific_one() {
        let mut table = RouteTable::new();
        table.register("GET", Pattern::compile("/widgets/*"), "catch-all");
        table.register("GET", Pattern::compile("/widgets/{id}"), "by-id");

        let (handler, _) = table.route("GET", "/widgets/42").unwrap();
        assert_eq!(*handler, "catch-all");
    }

    #[test]
    fn method_is_looked_up_case_insensitively() {
        let mut table = RouteTable::new();
        table.register("get", Pattern::compile("/ping"), "pong");
        assert!(table.route("GET", "/ping").is_some());
    }

    #[test]
    fn no_match_returns_none() {
        let mut table: RouteTable<&str> = RouteTable::new();
        table.register("GET", Pattern::compile("/ping"), "pong");
        assert!(table.route("GET", "/pong").is_none());
        assert!(table.route("POST", "/ping").is_none());
    }
}
