//! C10 — URL pattern compilation/matching and per-method route tables.

pub mod pattern;
pub mod table;

pub use pattern::{MatchResult, Pattern, Segment};
pub use table::RouteTable;
