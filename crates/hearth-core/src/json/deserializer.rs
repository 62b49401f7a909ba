//! C8 — the JSON deserializer: a recursive-descent reader over [`Caret`]
//! that produces a dynamic [`DtoValue`] tree, ported from
//! `examples/original_source/parser/json/mapping/Deserializer.cpp`
//! (`readValue`/`readObject`/`readList`/`skipValue`).
//!
//! The C++ original dispatches per-field by the target DTO's declared field
//! type, since a field's expected type is always known up front from its
//! `Property`. Without compile-time field reflection this reads JSON into a
//! type-agnostic tree first (an `Any` wrapping `Null`/numbers/strings/lists/
//! objects) and leaves binding that tree onto a concrete `T: Dto` to
//! [`bind`], which applies the target's field table, its `required` policy
//! and its `allow-unknown-fields` policy during the second pass. Under this
//! "Any dispatch" rule, a value read with no target type becomes `Int64`
//! (integers) or `Float64` (anything with a fraction or exponent) regardless
//! of its literal's width; [`coerce_to_field_type`] narrows that generic
//! representation once `bind` knows the target field's declared type.

use crate::caret::Caret;
use crate::error::{HearthError, Result};
use crate::json::config::JsonDeserializerConfig;
use crate::json::escape::unescape;
use crate::model::descriptor::ANY;
use crate::model::dto::{check_required_fields, Dto};
use crate::model::value::{DtoObject, DtoValue};

/// Parses one JSON value from `caret`, leaving the caret positioned just
/// past it. Whitespace before the value is skipped; trailing whitespace is
/// not.
pub fn deserialize(caret: &mut Caret<'_>, config: &JsonDeserializerConfig) -> Result<DtoValue> {
    read_value(caret, config)
}

/// Parses `text` fully as one JSON document; trailing non-whitespace bytes
/// are rejected.
pub fn parse_document(text: &str, config: &JsonDeserializerConfig) -> Result<DtoValue> {
    let mut caret = Caret::from_str(text);
    let value = read_value(&mut caret, config)?;
    caret.advance_to_non_whitespace();
    if caret.can_continue() {
        return Err(HearthError::json_unexpected_token("trailing data after JSON document"));
    }
    Ok(value)
}

fn read_value(caret: &mut Caret<'_>, config: &JsonDeserializerConfig) -> Result<DtoValue> {
    caret.advance_to_non_whitespace();
    match caret.peek() {
        None => Err(HearthError::json_unexpected_token("unexpected end of input")),
        Some(b'"') => read_string(caret).map(DtoValue::String),
        Some(b'{') => read_object(caret, config),
        Some(b'[') => read_list(caret, config),
        Some(b't') | Some(b'f') => caret.parse_bool("true", "false").map(DtoValue::Bool).map_err(rethrow_as_json),
        Some(b'n') => {
            if caret.consume_if_word("null") {
                Ok(DtoValue::Null)
            } else {
                Err(HearthError::json_unexpected_token("invalid literal"))
            }
        }
        Some(b'-') | Some(b'0'..=b'9') => read_number(caret),
        Some(other) => Err(HearthError::json_unexpected_token(format!("unexpected character '{}'", other as char))),
    }
}

fn rethrow_as_json(err: HearthError) -> HearthError {
    HearthError::json_unexpected_token(err.message().to_string())
}

fn read_string(caret: &mut Caret<'_>) -> Result<String> {
    let raw = caret.parse_enclosed(b'"', b'"', b'\\').map_err(rethrow_as_json)?;
    unescape(raw)
}

fn read_number(caret: &mut Caret<'_>) -> Result<DtoValue> {
    let is_float = looks_like_float(caret.remaining());
    let value = if is_float {
        let v = caret.parse_f64().map_err(rethrow_as_json)?;
        DtoValue::Float64(v)
    } else {
        let v = caret.parse_i64().map_err(rethrow_as_json)?;
        DtoValue::Int64(v)
    };
    Ok(value)
}

/// Scans ahead (without consuming) to see whether the number literal
/// starting at `bytes[0]` contains a `.`/`e`/`E` before its last digit —
/// the JSON grammar's number production allows an integer part followed
/// optionally by a fraction and/or exponent, and only the full grammar tells
/// us which numeric type to read into.
fn looks_like_float(bytes: &[u8]) -> bool {
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
        i += 1;
    }
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    matches!(bytes.get(i), Some(b'.') | Some(b'e') | Some(b'E'))
}

fn read_list(caret: &mut Caret<'_>, config: &JsonDeserializerConfig) -> Result<DtoValue> {
    if !caret.consume_if("[", true) {
        return Err(HearthError::json_unexpected_token("expected '['"));
    }
    let mut items = Vec::new();
    caret.advance_to_non_whitespace();
    if caret.consume_if("]", true) {
        return Ok(DtoValue::List(items));
    }
    loop {
        items.push(read_value(caret, config)?);
        caret.advance_to_non_whitespace();
        if caret.consume_if(",", true) {
            continue;
        }
        if caret.consume_if("]", true) {
            break;
        }
        return Err(HearthError::json_unexpected_token("expected ',' or ']' in array"));
    }
    Ok(DtoValue::List(items))
}

fn read_object(caret: &mut Caret<'_>, config: &JsonDeserializerConfig) -> Result<DtoValue> {
    if !caret.consume_if("{", true) {
        return Err(HearthError::json_unexpected_token("expected '{'"));
    }
    let mut object = DtoObject::new(&ANY);
    caret.advance_to_non_whitespace();
    if caret.consume_if("}", true) {
        return Ok(DtoValue::Object(object));
    }
    loop {
        caret.advance_to_non_whitespace();
        let key = read_string(caret)?;
        caret.advance_to_non_whitespace();
        if !caret.consume_if(":", true) {
            return Err(HearthError::json_unexpected_token("expected ':' after object key"));
        }
        let value = read_value(caret, config)?;
        object.fields.push((key, value));
        caret.advance_to_non_whitespace();
        if caret.consume_if(",", true) {
            continue;
        }
        if caret.consume_if("}", true) {
            break;
        }
        return Err(HearthError::json_unexpected_token("expected ',' or '}' in object"));
    }
    Ok(DtoValue::Object(object))
}

/// Binds a generic, already-parsed `tree` (typically `DtoValue::Object`)
/// onto a concrete `T: Dto`, enforcing `target`'s `required` fields and the
/// `allow_unknown_fields` policy.
pub fn bind<T: Dto + Default>(tree: &DtoValue, config: &JsonDeserializerConfig) -> Result<T> {
    let object = match tree {
        DtoValue::Object(object) => object,
        other => {
            return Err(HearthError::json_unexpected_token(format!(
                "expected an object, found `{}`",
                other.descriptor().class_id.name
            )))
        }
    };

    let fields = T::fields();
    if !config.allow_unknown_fields {
        for (name, _) in &object.fields {
            if !fields.iter().any(|f| f.name == name.as_str()) {
                return Err(HearthError::json_unknown_field(name));
            }
        }
    }

    check_required_fields(fields, object)?;

    let mut target = T::default();
    for field in fields {
        if let Some(value) = object.get(field.name) {
            let value = apply_interpretation(value.clone(), field.descriptor, config);
            let coerced = coerce_to_field_type(value, field.descriptor)?;
            (field.set)(&mut target, coerced)?;
        }
    }
    Ok(target)
}

/// Tries `config.use_interpretations`, in order, against `descriptor` — the
/// deserializer-side counterpart of `json::serializer`'s own
/// `try_interpretation`. Returns `value` unchanged when the config names no
/// interpretations or none of `descriptor`'s registered ones match.
fn apply_interpretation(value: DtoValue, descriptor: &'static crate::model::descriptor::TypeDescriptor, config: &JsonDeserializerConfig) -> DtoValue {
    if config.use_interpretations.is_empty() {
        return value;
    }
    let names: Vec<&str> = config.use_interpretations.iter().map(String::as_str).collect();
    match descriptor.find_interpretation(&names) {
        Some(interpretation) => interpretation.from_interpretation(&value),
        None => value,
    }
}

/// Narrows a tree value parsed under the Any-dispatch rule (always `Int64`/
/// `Float64`) to `field`'s declared primitive width, the step the C++
/// original gets for free from its per-field `Property` type. Out-of-range
/// values are rejected rather than silently truncated; non-primitive and
/// already-matching values pass through unchanged.
fn coerce_to_field_type(value: DtoValue, descriptor: &'static crate::model::descriptor::TypeDescriptor) -> Result<DtoValue> {
    use crate::model::descriptor::{Category, PrimitiveKind};

    let kind = match descriptor.category {
        Category::Primitive(kind) => kind,
        _ => return Ok(value),
    };

    let out_of_range = || HearthError::json_unexpected_token(format!("value does not fit in {}", descriptor.name_qualifier));

    match (kind, value) {
        (PrimitiveKind::Int32, DtoValue::Int64(v)) => i32::try_from(v).map(DtoValue::Int32).map_err(|_| out_of_range()),
        (PrimitiveKind::UInt32, DtoValue::Int64(v)) => u32::try_from(v).map(DtoValue::UInt32).map_err(|_| out_of_range()),
        (PrimitiveKind::UInt64, DtoValue::Int64(v)) => u64::try_from(v).map(DtoValue::UInt64).map_err(|_| out_of_range()),
        (PrimitiveKind::Float32, DtoValue::Float64(v)) => Ok(DtoValue::Float32(v as f32)),
        (_, other) => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars() {
        let config = JsonDeserializerConfig::default();
        assert_eq!(parse_document("42", &config).unwrap(), DtoValue::Int64(42));
        assert_eq!(parse_document("9999999999", &config).unwrap(), DtoValue::Int64(9_999_999_999));
        assert_eq!(parse_document("1.5", &config).unwrap(), DtoValue::Float64(1.5));
        assert_eq!(parse_document("true", &config).unwrap(), DtoValue::Bool(true));
        assert_eq!(parse_document("null", &config).unwrap(), DtoValue::Null);
        assert_eq!(parse_document("\"hi\\n\"", &config).unwrap(), DtoValue::String("hi\n".into()));
    }

    #[test]
    fn parses_nested_structures() {
        let config = JsonDeserializerConfig::default();
        let value = parse_document(r#"{"a": [1, 2, {"b": null}]}"#, &config).unwrap();
        match value {
            DtoValue::Object(obj) => {
                assert_eq!(
                    obj.get("a"),
                    Some(&DtoValue::List(vec![DtoValue::Int64(1), DtoValue::Int64(2), DtoValue::Object({
                        let mut inner = DtoObject::new(&ANY);
                        inner.fields.push(("b".to_string(), DtoValue::Null));
                        inner
                    })]))
                );
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn bind_coerces_an_int64_literal_down_to_the_fields_declared_width() {
        use crate::model::descriptor::{Category, ClassId, TypeDescriptor};
        use crate::model::dto::{Dto, FieldDescriptor};
        use std::any::Any;

        struct Counters {
            total: u32,
        }
        impl Default for Counters {
            fn default() -> Self {
                Counters { total: 0 }
            }
        }

        static COUNTERS_TYPE: TypeDescriptor =
            TypeDescriptor { class_id: ClassId { name: "Counters", id: 0 }, name_qualifier: "Counters", category: Category::Object, interpretations: &[] };
        static COUNTERS_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
            name: "total",
            descriptor: &crate::model::descriptor::UINT32,
            required: false,
            deprecated: false,
            get: |dto| DtoValue::UInt32(dto.as_any().downcast_ref::<Counters>().unwrap().total),
            set: |dto, value| {
                let counters = dto.as_any_mut().downcast_mut::<Counters>().unwrap();
                match value {
                    DtoValue::UInt32(v) => {
                        counters.total = v;
                        Ok(())
                    }
                    _ => Err(HearthError::dispatch_param_bad_cast("total", "expected UInt32")),
                }
            },
        }];
        impl Dto for Counters {
            fn type_descriptor() -> &'static TypeDescriptor {
                &COUNTERS_TYPE
            }
            fn fields() -> &'static [FieldDescriptor] {
                &COUNTERS_FIELDS
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        let config = JsonDeserializerConfig::default();
        let tree = parse_document(r#"{"total": 7}"#, &config).unwrap();
        let counters: Counters = bind(&tree, &config).unwrap();
        assert_eq!(counters.total, 7);
    }

    #[test]
    fn bind_applies_a_registered_interpretation_before_coercion() {
        use crate::model::descriptor::{Category, ClassId, TypeDescriptor};
        use crate::model::dto::{Dto, FieldDescriptor};
        use crate::model::interpretation::Interpretation;
        use std::any::Any;

        struct StringAsInt;
        impl Interpretation for StringAsInt {
            fn to_interpretation(&self, original: &DtoValue) -> DtoValue {
                original.clone()
            }
            fn from_interpretation(&self, interpreted: &DtoValue) -> DtoValue {
                match interpreted {
                    DtoValue::String(s) => s.parse::<i64>().map(DtoValue::Int64).unwrap_or(DtoValue::Null),
                    other => other.clone(),
                }
            }
            fn interpretation_type(&self) -> &'static TypeDescriptor {
                &crate::model::descriptor::STRING
            }
        }
        static STRING_AS_INT: StringAsInt = StringAsInt;
        static INTERPRETATIONS: [(&str, &dyn Interpretation); 1] = [("string", &STRING_AS_INT)];
        static UINT32_VIA_STRING: TypeDescriptor = TypeDescriptor {
            class_id: ClassId { name: "UInt32ViaString", id: 0 },
            name_qualifier: "UInt32ViaString",
            category: Category::Primitive(crate::model::descriptor::PrimitiveKind::UInt32),
            interpretations: &INTERPRETATIONS,
        };

        struct Quota {
            limit: u32,
        }
        impl Default for Quota {
            fn default() -> Self {
                Quota { limit: 0 }
            }
        }
        static QUOTA_TYPE: TypeDescriptor =
            TypeDescriptor { class_id: ClassId { name: "Quota", id: 0 }, name_qualifier: "Quota", category: Category::Object, interpretations: &[] };
        static QUOTA_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
            name: "limit",
            descriptor: &UINT32_VIA_STRING,
            required: false,
            deprecated: false,
            get: |dto| DtoValue::UInt32(dto.as_any().downcast_ref::<Quota>().unwrap().limit),
            set: |dto, value| {
                let quota = dto.as_any_mut().downcast_mut::<Quota>().unwrap();
                match value {
                    DtoValue::UInt32(v) => {
                        quota.limit = v;
                        Ok(())
                    }
                    _ => Err(HearthError::dispatch_param_bad_cast("limit", "expected UInt32")),
                }
            },
        }];
        impl Dto for Quota {
            fn type_descriptor() -> &'static TypeDescriptor {
                &QUOTA_TYPE
            }
            fn fields() -> &'static [FieldDescriptor] {
                &QUOTA_FIELDS
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        let config = JsonDeserializerConfig { use_interpretations: vec!["string".to_string()], ..JsonDeserializerConfig::default() };
        let tree = parse_document(r#"{"limit": "42"}"#, &config).unwrap();
        let quota: Quota = bind(&tree, &config).unwrap();
        assert_eq!(quota.limit, 42);
    }

    #[test]
    fn rejects_trailing_garbage() {
        let config = JsonDeserializerConfig::default();
        assert!(parse_document("42 garbage", &config).is_err());
    }

    #[test]
    fn rejects_unclosed_array() {
        let config = JsonDeserializerConfig::default();
        let err = parse_document("[1, 2", &config).unwrap_err();
        assert_eq!(err.code(), "json.unexpected_token");
    }
}
