//! Type-checked access to [`DtoValue::Any`], mirroring `type::Any::store`/
//! `retrieve` in
//! `examples/original_source/src/oatpp/core/data/mapping/type/Any.{hpp,cpp}`.
//! The C++ version throws `std::runtime_error` on a type mismatch; this
//! returns a `programmer_error`-categorized [`HearthError`] instead, since a
//! mismatch here means calling code asked for the wrong type, not a bad
//! request.

use crate::error::{HearthError, Result};
use crate::model::descriptor::TypeDescriptor;
use crate::model::value::DtoValue;

/// Wraps `value` as an `Any` carrying `descriptor`, the Rust equivalent of
/// `Any::store`.
pub fn store(value: DtoValue, descriptor: &'static TypeDescriptor) -> DtoValue {
    DtoValue::Any(Box::new(value), descriptor)
}

/// Unwraps an `Any` value, checking its stored descriptor matches
/// `expected` by class id. Returns `programmer_error` on mismatch, matching
/// `Any::retrieve`'s "throws if stored type and type requested do not
/// match" contract.
pub fn retrieve<'a>(value: &'a DtoValue, expected: &'static TypeDescriptor) -> Result<&'a DtoValue> {
    match value {
        DtoValue::Any(inner, descriptor) if descriptor.class_id == expected.class_id => Ok(inner),
        DtoValue::Any(_, descriptor) => Err(HearthError::programmer_error(format!(
            "Any holds `{}`, expected `{}`",
            descriptor.class_id.name, expected.class_id.name
        ))),
        other => Err(HearthError::programmer_error(format!("value is not an Any, it is `{}`", other.descriptor().class_id.name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::INT32;

    #[test]
    fn retrieve_rejects_mismatched_type() {
        let wrapped = store(DtoValue::Int32(7), &INT32);
        assert_eq!(retrieve(&wrapped, &INT32).unwrap(), &DtoValue::Int32(7));
        let err = retrieve(&wrapped, &crate::model::descriptor::STRING).unwrap_err();
        assert_eq!(err.code(), "hearth.programmer_error");
    }
}
