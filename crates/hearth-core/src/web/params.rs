//! Query-string parsing and the primitive-dispatcher `parse-from-string`
//! half of C11/C12 parameter binding.
//!
//! oatpp resolves "parse this path/query/header string into a declared
//! primitive type" through each primitive's `Primitive<T>::Interpretation`
//! / `SerializerNode::deserialize` pair
//! (`examples/original_source/src/oatpp/core/data/mapping/type/Primitive.hpp`).
//! Here the same job is done directly against [`Caret`]'s numeric parsers,
//! since every declared param type in this crate bottoms out at a
//! [`PrimitiveKind`] or `String`.

use crate::caret::Caret;
use crate::error::{HearthError, Result};
use crate::model::descriptor::{Category, PrimitiveKind, TypeDescriptor};
use crate::model::value::DtoValue;

/// A multimap preserving insertion order, matching the original's
/// "multiple entries with the same key are preserved in order" rule for
/// both query strings and header lookups used during parameter binding.
#[derive(Debug, Clone, Default)]
pub struct MultiMap {
    entries: Vec<(String, String)>,
}

impl MultiMap {
    pub fn new() -> Self {
        MultiMap { entries: Vec::new() }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// First value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parses a `key=value&key=value` query string. A key with no `=` maps to
/// an empty value; no URL-decoding is performed (delegated to the
/// encoding layer). `text` should already have any
/// leading `?` stripped.
pub fn parse_query(text: &str) -> MultiMap {
    let mut map = MultiMap::new();
    if text.is_empty() {
        return map;
    }
    for pair in text.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => map.push(key, value),
            None => map.push(pair, ""),
        }
    }
    map
}

/// Parses `text` into a [`DtoValue`] matching `descriptor`'s primitive
/// kind, or `String` — the only categories a path/query/header parameter
/// can declare. Mirrors each primitive dispatcher's `parse-from-string`
/// (dispatch step (b)).
pub fn parse_primitive(descriptor: &'static TypeDescriptor, name: &str, text: &str) -> Result<DtoValue> {
    match descriptor.category {
        Category::String => Ok(DtoValue::String(text.to_string())),
        Category::Primitive(kind) => {
            let mut caret = Caret::from_str(text);
            let value = match kind {
                PrimitiveKind::Bool => caret.parse_bool("true", "false").map(DtoValue::Bool),
                PrimitiveKind::Int32 => caret.parse_i32().map(DtoValue::Int32),
                PrimitiveKind::Int64 => caret.parse_i64().map(DtoValue::Int64),
                PrimitiveKind::UInt32 => caret.parse_u32().map(DtoValue::UInt32),
                PrimitiveKind::UInt64 => caret.parse_u64().map(DtoValue::UInt64),
                PrimitiveKind::Float32 => caret.parse_f32().map(DtoValue::Float32),
                PrimitiveKind::Float64 => caret.parse_f64().map(DtoValue::Float64),
            };
            let value = value.map_err(|_| HearthError::dispatch_param_bad_cast(name, format!("`{text}` is not a valid {}", descriptor.name_qualifier)))?;
            if caret.can_continue() {
                return Err(HearthError::dispatch_param_bad_cast(name, format!("trailing characters after {}", descriptor.name_qualifier)));
            }
            Ok(value)
        }
        _ => Err(HearthError::programmer_error(format!("parameter `{name}` declares non-primitive type `{}`", descriptor.name_qualifier))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::{BOOL, INT32, STRING};

    #[test]
    fn parses_key_value_pairs_in_order() {
        let map = parse_query("a=1&b=2&a=3");
        assert_eq!(map.get("a"), Some("1"));
        assert_eq!(map.get_all("a").collect::<Vec<_>>(), vec!["1", "3"]);
    }

    #[test]
    fn key_without_equals_maps_to_empty_value() {
        let map = parse_query("verbose");
        assert_eq!(map.get("verbose"), Some(""));
    }

    #[test]
    fn parses_declared_primitive_types() {
        assert_eq!(parse_primitive(&INT32, "id", "42").unwrap(), DtoValue::Int32(42));
        assert_eq!(parse_primitive(&BOOL, "flag", "true").unwrap(), DtoValue::Bool(true));
        assert_eq!(parse_primitive(&STRING, "name", "widget").unwrap(), DtoValue::String("widget".to_string()));
    }

    #[test]
    fn rejects_trailing_garbage_after_a_number() {
        assert!(parse_primitive(&INT32, "id", "42abc").is_err());
    }
}
