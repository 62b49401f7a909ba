//! The dynamic value tree that flows between the JSON mapper (C7/C8), the
//! DTO model (C5) and the dispatcher (C12).
//!
//! oatpp represents every mapped value as a `Void` (`ObjectWrapper<void>`)
//! plus its `Type*`, and downcasts through the category's polymorphic
//! dispatcher to read it. A tagged union serves the same purpose in Rust
//! without the downcast: [`DtoValue`] already carries its shape, and
//! [`DtoValue::descriptor`] recovers the [`TypeDescriptor`] a dispatcher
//! would have needed, so serializer code matches on the enum directly.

use crate::model::descriptor::{Category, PrimitiveKind, TypeDescriptor};

/// A DTO object instance as a field-name/value list. Field order is
/// preserved exactly as declared — the JSON serializer (C7) emits fields in
/// this order, matching oatpp's `Properties` list, which is a `std::list`
/// append-ordered by field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct DtoObject {
    pub descriptor: &'static TypeDescriptor,
    /// Keys are owned rather than `&'static str`: a declared DTO field name
    /// is `'static`, but a key read off the wire by the deserializer is not,
    /// and both end up in the same tree.
    pub fields: Vec<(String, DtoValue)>,
}

impl DtoObject {
    pub fn new(descriptor: &'static TypeDescriptor) -> Self {
        DtoObject { descriptor, fields: Vec::new() }
    }

    pub fn get(&self, name: &str) -> Option<&DtoValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn set(&mut self, name: impl Into<String>, value: DtoValue) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }
}

/// The dynamic value tree. `Null` stands in for oatpp's `nullptr` wrapper
/// state (`ObjectWrapper::operator bool() == false`): every DTO field,
/// collection element and map value may independently be absent this way.
#[derive(Debug, Clone, PartialEq)]
pub enum DtoValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    List(Vec<DtoValue>),
    /// Key-value pairs in insertion order, mirroring oatpp's `ListMap` /
    /// `PairList` fields-as-map representation used for both DTO `Fields<V>`
    /// and the generic `UnorderedMap`.
    Map(Vec<(DtoValue, DtoValue)>),
    Object(DtoObject),
    /// A type-erased value: the payload plus the descriptor needed to
    /// serialize it, mirroring `type::Any` pairing an `AnyHandle`'s object
    /// pointer with its stored `Type*`.
    Any(Box<DtoValue>, &'static TypeDescriptor),
}

impl DtoValue {
    /// Best-effort static descriptor for this value's shape. `Object`/`Any`
    /// carry their own exact descriptor; the other variants resolve to the
    /// corresponding primitive/container singleton.
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        use crate::model::descriptor::*;
        match self {
            DtoValue::Null => &VOID,
            DtoValue::Bool(_) => &BOOL,
            DtoValue::Int32(_) => &INT32,
            DtoValue::Int64(_) => &INT64,
            DtoValue::UInt32(_) => &UINT32,
            DtoValue::UInt64(_) => &UINT64,
            DtoValue::Float32(_) => &FLOAT32,
            DtoValue::Float64(_) => &FLOAT64,
            DtoValue::String(_) => &STRING,
            DtoValue::List(_) => &ANY,
            DtoValue::Map(_) => &ANY,
            DtoValue::Object(obj) => obj.descriptor,
            DtoValue::Any(_, descriptor) => descriptor,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DtoValue::Null)
    }

    /// Classifies a value as a JSON number for the deserializer's `Any`
    /// dispatch rule: an integral literal with no
    /// fractional/exponent part is always `Int64`, regardless of whether it
    /// also fits a narrower width; anything with a `.` or exponent maps to
    /// `Float64`. A field bound to a narrower or unsigned type is coerced
    /// from this representation separately, once its declared width is
    /// known (see `json::deserializer::coerce_to_field_type`).
    pub fn number_from_literal(literal: &str, is_float: bool) -> DtoValue {
        if is_float {
            return DtoValue::Float64(literal.parse().unwrap_or(f64::NAN));
        }
        match literal.parse::<i64>() {
            Ok(v) => DtoValue::Int64(v),
            Err(_) => DtoValue::Float64(literal.parse().unwrap_or(f64::NAN)),
        }
    }
}

/// True when `descriptor`'s category requires its key representation to be
/// a JSON string (object member name) rather than a bare value — used by
/// the JSON serializer to raise `MAP_KEY_NOT_STRING` before
/// emitting anything.
pub fn map_key_is_string(descriptor: &TypeDescriptor) -> bool {
    match descriptor.category {
        Category::Map { key, .. } => matches!(key.category, Category::String),
        _ => true,
    }
}

pub fn primitive_kind_of(descriptor: &TypeDescriptor) -> Option<PrimitiveKind> {
    match descriptor.category {
        Category::Primitive(kind) => Some(kind),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_from_literal_always_widens_integers_to_int64() {
        assert_eq!(DtoValue::number_from_literal("42", false), DtoValue::Int64(42));
        assert_eq!(DtoValue::number_from_literal("9999999999", false), DtoValue::Int64(9_999_999_999));
        assert_eq!(DtoValue::number_from_literal("1.5", true), DtoValue::Float64(1.5));
    }

    #[test]
    fn object_set_replaces_existing_field_in_place() {
        let descriptor = &crate::model::descriptor::ANY;
        let mut obj = DtoObject::new(descriptor);
        obj.set("a", DtoValue::Int32(1));
        obj.set("b", DtoValue::Int32(2));
        obj.set("a", DtoValue::Int32(99));
        assert_eq!(obj.fields, vec![("a".to_string(), DtoValue::Int32(99)), ("b".to_string(), DtoValue::Int32(2))]);
    }
}
