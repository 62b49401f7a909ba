//! C6/C7/C8 — the `ObjectMapper` contract and its JSON implementation.

pub mod config;
pub mod deserializer;
pub mod escape;
pub mod serializer;

pub use config::{JsonDeserializerConfig, JsonSerializerConfig};

use crate::error::Result;
use crate::model::dto::{to_dto_object, Dto};
use crate::model::value::DtoValue;

/// C6 — the generic mapping contract a transport (C12/C13) programs
/// against, independent of which wire format backs it. `JsonObjectMapper`
/// is the only implementation this crate ships, mirroring
/// `examples/original_source/parser/json/mapping/ObjectMapper.hpp`
/// providing the sole concrete `ObjectMapper` oatpp ships out of the box.
pub trait ObjectMapper: Send + Sync {
    fn write_to_string<T: Dto>(&self, value: &T) -> Result<String>
    where
        Self: Sized;
    fn read_from_str<T: Dto + Default>(&self, text: &str) -> Result<T>
    where
        Self: Sized;
}

/// The JSON `ObjectMapper`.
#[derive(Debug, Clone, Default)]
pub struct JsonObjectMapper {
    pub serializer_config: JsonSerializerConfig,
    pub deserializer_config: JsonDeserializerConfig,
}

impl JsonObjectMapper {
    pub fn new(serializer_config: JsonSerializerConfig, deserializer_config: JsonDeserializerConfig) -> Self {
        JsonObjectMapper { serializer_config, deserializer_config }
    }
}

impl ObjectMapper for JsonObjectMapper {
    fn write_to_string<T: Dto>(&self, value: &T) -> Result<String> {
        let object = to_dto_object(value);
        serializer::serialize(&DtoValue::Object(object), &self.serializer_config)
    }

    fn read_from_str<T: Dto + Default>(&self, text: &str) -> Result<T> {
        let tree = deserializer::parse_document(text, &self.deserializer_config)?;
        deserializer::bind(&tree, &self.deserializer_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::{Category, ClassId, TypeDescriptor, INT32};
    use crate::model::dto::FieldDescriptor;
    use crate::model::value::DtoValue;
    use std::any::Any;

    #[derive(Debug, Default)]
    struct Point {
        x: i32,
        y: i32,
    }

    static POINT_TYPE: TypeDescriptor =
        TypeDescriptor { class_id: ClassId { name: "Point", id: 0 }, name_qualifier: "Point", category: Category::Object, interpretations: &[] };

    static POINT_FIELDS: [FieldDescriptor; 2] = [
        FieldDescriptor {
            name: "x",
            descriptor: &INT32,
            required: true,
            deprecated: false,
            get: |dto| DtoValue::Int32(dto.as_any().downcast_ref::<Point>().unwrap().x),
            set: |dto, value| {
                if let DtoValue::Int32(v) = value {
                    dto.as_any_mut().downcast_mut::<Point>().unwrap().x = v;
                }
                Ok(())
            },
        },
        FieldDescriptor {
            name: "y",
            descriptor: &INT32,
            required: false,
            deprecated: false,
            get: |dto| DtoValue::Int32(dto.as_any().downcast_ref::<Point>().unwrap().y),
            set: |dto, value| {
                if let DtoValue::Int32(v) = value {
                    dto.as_any_mut().downcast_mut::<Point>().unwrap().y = v;
                }
                Ok(())
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
    fn round_trips_a_dto_through_json_text() {
        let mapper = JsonObjectMapper::default();
        let point = Point { x: 3, y: 4 };
        let text = mapper.write_to_string(&point).unwrap();
        assert_eq!(text, "{\"x\":3,\"y\":4}");

        let rebuilt: Point = mapper.read_from_str(&text).unwrap();
        assert_eq!(rebuilt.x, 3);
        assert_eq!(rebuilt.y, 4);
    }

    #[test]
    fn unknown_field_rejected_when_policy_disallows() {
        let mapper = JsonObjectMapper::new(
            JsonSerializerConfig::default(),
            JsonDeserializerConfig { allow_unknown_fields: false, ..JsonDeserializerConfig::default() },
        );
        let err = mapper.read_from_str::<Point>(r#"{"x": 1, "z": 2}"#).unwrap_err();
        assert_eq!(err.code(), "json.unknown_field");
    }
}
