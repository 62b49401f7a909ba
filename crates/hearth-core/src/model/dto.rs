//! C5 — the DTO model: typed structs that convert to/from [`DtoValue`]
//! through a static field table, replacing oatpp's macro-generated
//! `Z__CLASS_GET_FIELDS_MAP`/`Z__CLASS_EXTEND` reflection
//! (`examples/original_source/src/oatpp/core/data/mapping/type/Object.hpp`).
//!
//! oatpp DTOs declare fields with the `DTO_FIELD` macro, which registers a
//! getter/setter pair into a process-wide `Properties` list at static-init
//! time and supports single inheritance via `Z__CLASS_EXTEND` prepending the
//! base's fields. Rust has no portable equivalent of that macro without a
//! proc-macro crate, which is out of scope here, so a [`Dto`] implementation
//! is expected to hand-list its [`FieldDescriptor`]s; inheritance is modeled
//! by one DTO embedding another and concatenating field slices.

use crate::error::{HearthError, Result};
use crate::model::descriptor::TypeDescriptor;
use crate::model::value::DtoValue;
use std::any::Any;

/// Declares one field of a DTO: its wire name, its descriptor (for the JSON
/// mapper and router parameter binding), whether it must be present on
/// deserialization, whether it is kept only for backward compatibility, and
/// typed accessors bridging to [`DtoValue`].
pub struct FieldDescriptor {
    pub name: &'static str,
    pub descriptor: &'static TypeDescriptor,
    pub required: bool,
    /// Mirrors `Endpoint::Info::deprecated`: carried as metadata for
    /// documentation/introspection purposes. Neither the serializer nor the
    /// deserializer changes behavior for a deprecated field — it is read and
    /// written exactly like any other field.
    pub deprecated: bool,
    pub get: fn(&dyn Dto) -> DtoValue,
    pub set: fn(&mut dyn Dto, DtoValue) -> Result<()>,
}

/// A DTO type: a fixed, ordered set of fields plus its own descriptor.
///
/// # Why
/// The JSON mapper (C7/C8) and router parameter binding both need to walk
/// an arbitrary DTO's fields generically — read them for serialization,
/// write them for deserialization — without either side knowing the
/// concrete struct. oatpp gets this from macro-generated reflection
/// (`Z__CLASS_GET_FIELDS_MAP`); a hand-listed `'static` field table is the
/// direct analogue without a proc-macro crate.
///
/// # How
/// `fields()` returns one [`FieldDescriptor`] per field, each carrying a
/// `get`/`set` function pointer that downcasts `&dyn Dto`/`&mut dyn Dto` to
/// the concrete type via [`as_any`](Self::as_any)/[`as_any_mut`](Self::as_any_mut).
/// Every caller in this crate (`to_dto_object`, `from_dto_object`, the JSON
/// serializer/deserializer) goes through this table instead of touching
/// struct fields directly, so a new `Dto` impl only has to get this one
/// trait right to work everywhere else.
///
/// # What an implementor must guarantee
/// - `fields()` returns the same slice, in the same order, every call.
/// - Each field's `get`/`set` pair downcasts to the same concrete type that
///   implements this trait — a mismatched downcast panics rather than
///   erroring, since it indicates a field table built by hand incorrectly
///   rather than a possible runtime condition.
pub trait Dto: Any + Send + Sync {
    fn type_descriptor() -> &'static TypeDescriptor
    where
        Self: Sized;
    fn fields() -> &'static [FieldDescriptor]
    where
        Self: Sized;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Checks every `required` field in `fields` is present (non-null) in
/// `object`, returning the first violation as `REQUIRED_FIELD_NULL`.
/// Mirrors oatpp's deserializer raising when a DTO field annotated
/// `REQUIRED` comes back unset after parsing an object body.
pub fn check_required_fields(fields: &[FieldDescriptor], object: &crate::model::value::DtoObject) -> Result<()> {
    for field in fields {
        if field.required {
            match object.get(field.name) {
                Some(value) if !value.is_null() => {}
                _ => return Err(HearthError::required_field_null(field.name)),
            }
        }
    }
    Ok(())
}

/// Builds the dynamic [`DtoObject`] view of a typed DTO by walking its
/// static field table and invoking each `get` accessor in declaration
/// order — the serializer's entry point into a concrete `T: Dto`.
pub fn to_dto_object<T: Dto>(value: &T) -> crate::model::value::DtoObject {
    let descriptor = T::type_descriptor();
    let mut obj = crate::model::value::DtoObject::new(descriptor);
    for field in T::fields() {
        obj.set(field.name, (field.get)(value));
    }
    obj
}

/// Populates a typed DTO's fields from a dynamic [`DtoObject`], the
/// deserializer's exit point back into `T: Dto`. Unknown object keys are the
/// caller's concern (the `allow-unknown-fields` policy lives in the
/// deserializer, not here); this only ever writes keys with a matching
/// field descriptor.
pub fn from_dto_object<T: Dto>(target: &mut T, object: &crate::model::value::DtoObject) -> Result<()> {
    check_required_fields(T::fields(), object)?;
    for field in T::fields() {
        if let Some(value) = object.get(field.name) {
            (field.set)(target, value.clone())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::{Category, ClassId, TypeDescriptor};
    use crate::model::value::DtoObject;

    struct Point {
        x: i32,
        y: i32,
    }

    static POINT_TYPE: TypeDescriptor = TypeDescriptor {
        class_id: ClassId { name: "Point", id: 0 },
        name_qualifier: "Point",
        category: Category::Object,
        interpretations: &[],
    };

    static POINT_FIELDS: [FieldDescriptor; 2] = [
        FieldDescriptor {
            name: "x",
            descriptor: &crate::model::descriptor::INT32,
            required: true,
            deprecated: false,
            get: |dto| DtoValue::Int32(dto.as_any().downcast_ref::<Point>().unwrap().x),
            set: |dto, value| {
                let point = dto.as_any_mut().downcast_mut::<Point>().unwrap();
                match value {
                    DtoValue::Int32(v) => {
                        point.x = v;
                        Ok(())
                    }
                    _ => Err(HearthError::dispatch_param_bad_cast("x", "expected Int32")),
                }
            },
        },
        FieldDescriptor {
            name: "y",
            descriptor: &crate::model::descriptor::INT32,
            required: false,
            deprecated: false,
            get: |dto| DtoValue::Int32(dto.as_any().downcast_ref::<Point>().unwrap().y),
            set: |dto, value| {
                let point = dto.as_any_mut().downcast_mut::<Point>().unwrap();
                match value {
                    DtoValue::Int32(v) => {
                        point.y = v;
                        Ok(())
                    }
                    _ => Err(HearthError::dispatch_param_bad_cast("y", "expected Int32")),
                }
            },
        },
    ];

    impl Dto for Point {
        fn type_descriptor() -> &'static TypeDescriptor {
            &POINT_TYPE
        }
        fn fields() -> &'static [FieldDescriptor] {
            &POINT_FIELDS
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn round_trips_through_dto_object() {
        let point = Point { x: 3, y: 4 };
        let obj = to_dto_object(&point);
        assert_eq!(obj.get("x"), Some(&DtoValue::Int32(3)));

        let mut rebuilt = Point { x: 0, y: 0 };
        from_dto_object(&mut rebuilt, &obj).unwrap();
        assert_eq!(rebuilt.x, 3);
        assert_eq!(rebuilt.y, 4);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let descriptor = Point::type_descriptor();
        let mut obj = DtoObject::new(descriptor);
        obj.set("y", DtoValue::Int32(1));
        let mut target = Point { x: 0, y: 0 };
        let err = from_dto_object(&mut target, &obj).unwrap_err();
        assert_eq!(err.code(), "json.required_field_null");
    }
}
