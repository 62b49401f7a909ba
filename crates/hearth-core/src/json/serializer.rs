//! C7 — the JSON serializer: walks a [`DtoValue`] tree driven by its
//! [`TypeDescriptor`] category, ported from
//! `examples/original_source/parser/json/mapping/Serializer.cpp`.
//!
//! The C++ original dispatches per field through a chain of `typeName ==
//! __class::X::CLASS_NAME` comparisons (`Serializer::writeObject`,
//! `writeListCollection`, `writeListMapCollection`). Since [`Category`] is
//! already a closed Rust enum, that chain collapses to one `match`.

use crate::error::{HearthError, Result};
use crate::json::config::JsonSerializerConfig;
use crate::json::escape::escape;
use crate::model::descriptor::{Category, TypeDescriptor};
use crate::model::value::{map_key_is_string, DtoValue};

/// Serializes `value` to a JSON text. `MAP_KEY_NOT_STRING` is raised
/// eagerly, before any output is produced, whenever a `Map` value's
/// descriptor declares a non-string key type.
pub fn serialize(value: &DtoValue, config: &JsonSerializerConfig) -> Result<String> {
    let mut out = String::new();
    write_value(&mut out, value, config)?;
    Ok(out)
}

fn write_value(out: &mut String, value: &DtoValue, config: &JsonSerializerConfig) -> Result<()> {
    if let Some(interpreted) = try_interpretation(value, config) {
        return write_value(out, &interpreted, config);
    }
    match value {
        DtoValue::Null => out.push_str("null"),
        DtoValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        DtoValue::Int32(v) => out.push_str(&v.to_string()),
        DtoValue::Int64(v) => out.push_str(&v.to_string()),
        DtoValue::UInt32(v) => out.push_str(&v.to_string()),
        DtoValue::UInt64(v) => out.push_str(&v.to_string()),
        DtoValue::Float32(v) => out.push_str(&format_float(*v as f64, &config.float_format)),
        DtoValue::Float64(v) => out.push_str(&format_float(*v, &config.float_format)),
        DtoValue::String(s) => write_string(out, s),
        DtoValue::List(items) => write_list(out, items, config)?,
        DtoValue::Map(entries) => write_map(out, entries, config)?,
        DtoValue::Object(object) => write_object(out, object, config)?,
        DtoValue::Any(inner, _) => write_value(out, inner, config)?,
    }
    Ok(())
}

/// Tries `config.use_interpretations`, in order, against `value`'s own
/// descriptor — the entry point `TypeDescriptor::find_interpretation` was
/// added for this but had no caller before it was wired in here. Returns
/// `None` when the config names no interpretations or none of `value`'s
/// descriptor matches, in which case the caller falls back to native form.
fn try_interpretation(value: &DtoValue, config: &JsonSerializerConfig) -> Option<DtoValue> {
    if config.use_interpretations.is_empty() {
        return None;
    }
    // `Any` carries its descriptor separately from its payload; every other
    // variant's descriptor already describes the value itself.
    let (descriptor, naked): (&TypeDescriptor, &DtoValue) = match value {
        DtoValue::Any(inner, descriptor) => (descriptor, inner.as_ref()),
        other => (other.descriptor(), other),
    };
    let names: Vec<&str> = config.use_interpretations.iter().map(String::as_str).collect();
    let interpretation = descriptor.find_interpretation(&names)?;
    Some(interpretation.to_interpretation(naked))
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    out.push_str(&escape(s));
    out.push('"');
}

/// Formats a float per `format` — a `printf`-style format string, of which
/// only the `%.<precision>g` shape (default `%.16g`) is actually
/// interpreted: `precision` significant digits, trailing zeros trimmed, with
/// a `.0` kept when trimming would otherwise leave an integer-looking
/// literal. Any other format string falls back to `std::fmt::Display`'s
/// shortest round-tripping decimal.
fn format_float(value: f64, format: &str) -> String {
    if value.is_nan() || value.is_infinite() {
        return "null".to_string();
    }
    match parse_g_precision(format) {
        Some(precision) => format_g(value, precision),
        None => {
            let rendered = value.to_string();
            if rendered.contains('.') || rendered.contains('e') || rendered.contains('E') {
                rendered
            } else {
                format!("{rendered}.0")
            }
        }
    }
}

fn parse_g_precision(format: &str) -> Option<usize> {
    format.strip_prefix("%.")?.strip_suffix('g')?.parse::<usize>().ok()
}

/// A minimal `%.Ng` emulation: render with `precision` significant digits in
/// whichever of fixed or exponential notation `printf`'s `%g` would have
/// chosen, then trim trailing zeros.
fn format_g(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = scientific.split_once('e').expect("Rust's {:e} always emits an exponent");
    let exponent: i32 = exponent.parse().expect("Rust's {:e} exponent is always a plain integer");

    if exponent < -4 || exponent >= precision as i32 {
        format!("{}e{exponent}", trim_trailing_zeros(mantissa))
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_trailing_zeros(&format!("{value:.decimals$}"))
    }
}

fn trim_trailing_zeros(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    let trimmed = text.trim_end_matches('0');
    match trimmed.strip_suffix('.') {
        Some(whole) => format!("{whole}.0"),
        None => trimmed.to_string(),
    }
}

fn write_list(out: &mut String, items: &[DtoValue], config: &JsonSerializerConfig) -> Result<()> {
    out.push('[');
    let mut first = true;
    for item in items {
        if item.is_null() && !config.include_null_fields {
            continue;
        }
        if !first {
            out.push_str(",");
        }
        first = false;
        write_value(out, item, config)?;
    }
    out.push(']');
    Ok(())
}

fn write_map(out: &mut String, entries: &[(DtoValue, DtoValue)], config: &JsonSerializerConfig) -> Result<()> {
    out.push('{');
    let mut first = true;
    for (key, value) in entries {
        let key_text = match key {
            DtoValue::String(s) => s.as_str(),
            _ => return Err(HearthError::map_key_not_string()),
        };
        if value.is_null() && !config.include_null_fields {
            continue;
        }
        if !first {
            out.push_str(",");
        }
        first = false;
        write_string(out, key_text);
        out.push_str(":");
        write_value(out, value, config)?;
    }
    out.push('}');
    Ok(())
}

fn write_object(out: &mut String, object: &crate::model::value::DtoObject, config: &JsonSerializerConfig) -> Result<()> {
    if let Category::Map { .. } = object.descriptor.category {
        if !map_key_is_string(object.descriptor) {
            return Err(HearthError::map_key_not_string());
        }
    }
    out.push('{');
    let mut first = true;
    for (name, value) in &object.fields {
        if value.is_null() && !config.include_null_fields {
            continue;
        }
        if !first {
            out.push_str(",");
        }
        first = false;
        write_string(out, name);
        out.push_str(":");
        write_value(out, value, config)?;
    }
    out.push('}');
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::{ClassId, TypeDescriptor};
    use crate::model::value::DtoObject;

    #[test]
    fn serializes_scalars() {
        let config = JsonSerializerConfig::default();
        assert_eq!(serialize(&DtoValue::Int32(42), &config).unwrap(), "42");
        assert_eq!(serialize(&DtoValue::Bool(true), &config).unwrap(), "true");
        assert_eq!(serialize(&DtoValue::Float64(1.0), &config).unwrap(), "1.0");
        assert_eq!(serialize(&DtoValue::String("hi\n".into()), &config).unwrap(), "\"hi\\n\"");
    }

    #[test]
    fn omits_null_fields_when_configured() {
        static TYPE: TypeDescriptor =
            TypeDescriptor { class_id: ClassId { name: "T", id: 0 }, name_qualifier: "T", category: Category::Object, interpretations: &[] };
        let mut obj = DtoObject::new(&TYPE);
        obj.set("a", DtoValue::Int32(1));
        obj.set("b", DtoValue::Null);

        let config = JsonSerializerConfig { include_null_fields: false, ..JsonSerializerConfig::default() };
        assert_eq!(serialize(&DtoValue::Object(obj.clone()), &config).unwrap(), "{\"a\":1}");

        let config = JsonSerializerConfig { include_null_fields: true, ..JsonSerializerConfig::default() };
        assert_eq!(serialize(&DtoValue::Object(obj), &config).unwrap(), "{\"a\":1,\"b\":null}");
    }

    #[test]
    fn a_dto_with_multiple_fields_has_no_spaces_around_separators() {
        static TYPE: TypeDescriptor =
            TypeDescriptor { class_id: ClassId { name: "Person", id: 0 }, name_qualifier: "Person", category: Category::Object, interpretations: &[] };
        let mut obj = DtoObject::new(&TYPE);
        obj.set("name", DtoValue::String("Alice".to_string()));
        obj.set("age", DtoValue::Int64(30));

        let config = JsonSerializerConfig::default();
        assert_eq!(serialize(&DtoValue::Object(obj), &config).unwrap(), "{\"name\":\"Alice\",\"age\":30}");
    }

    #[test]
    fn float_format_controls_significant_digits() {
        let config = JsonSerializerConfig { float_format: "%.3g".to_string(), ..JsonSerializerConfig::default() };
        assert_eq!(serialize(&DtoValue::Float64(3.14159), &config).unwrap(), "3.14");

        let config = JsonSerializerConfig { float_format: "not-a-format".to_string(), ..JsonSerializerConfig::default() };
        assert_eq!(serialize(&DtoValue::Float64(1.0), &config).unwrap(), "1.0");
    }

    #[test]
    fn use_interpretations_substitutes_a_registered_interpretation() {
        use crate::model::interpretation::Interpretation;

        struct AsString;
        impl Interpretation for AsString {
            fn to_interpretation(&self, original: &DtoValue) -> DtoValue {
                match original {
                    DtoValue::Int32(v) => DtoValue::String(v.to_string()),
                    other => other.clone(),
                }
            }
            fn from_interpretation(&self, interpreted: &DtoValue) -> DtoValue {
                interpreted.clone()
            }
            fn interpretation_type(&self) -> &'static TypeDescriptor {
                &crate::model::descriptor::STRING
            }
        }
        static AS_STRING: AsString = AsString;
        static INTERPRETATIONS: [(&str, &dyn Interpretation); 1] = [("string", &AS_STRING)];
        static INT_AS_STRING: TypeDescriptor = TypeDescriptor {
            class_id: ClassId { name: "IntAsString", id: 0 },
            name_qualifier: "IntAsString",
            category: Category::Primitive(crate::model::descriptor::PrimitiveKind::Int32),
            interpretations: &INTERPRETATIONS,
        };

        let value = DtoValue::Any(Box::new(DtoValue::Int32(7)), &INT_AS_STRING);
        let config = JsonSerializerConfig { use_interpretations: vec!["string".to_string()], ..JsonSerializerConfig::default() };
        assert_eq!(serialize(&value, &config).unwrap(), "\"7\"");
    }

    #[test]
    fn non_string_map_key_is_rejected() {
        let config = JsonSerializerConfig::default();
        let value = DtoValue::Map(vec![(DtoValue::Int32(1), DtoValue::Bool(true))]);
        let err = serialize(&value, &config).unwrap_err();
        assert_eq!(err.code(), "json.map_key_not_string");
    }
}
