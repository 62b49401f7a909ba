use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hearth_core::caret::Caret;
use hearth_core::json::config::{JsonDeserializerConfig, JsonSerializerConfig};
use hearth_core::json::{deserializer, serializer};
use hearth_core::model::value::{DtoObject, DtoValue};
use hearth_core::model::descriptor::{Category, ClassId, TypeDescriptor};

static BENCH_TYPE: TypeDescriptor =
    TypeDescriptor { class_id: ClassId { name: "Bench", id: 0 }, name_qualifier: "Bench", category: Category::Object, interpretations: &[] };

fn sample_object() -> DtoValue {
    DtoValue::Object(DtoObject {
        descriptor: &BENCH_TYPE,
        fields: vec![
            ("id".to_string(), DtoValue::Int64(123456789)),
            ("name".to_string(), DtoValue::String("widget-42".to_string())),
            ("active".to_string(), DtoValue::Bool(true)),
            ("score".to_string(), DtoValue::Float64(3.14159)),
            ("tags".to_string(), DtoValue::List(vec![DtoValue::String("a".to_string()), DtoValue::String("b".to_string())])),
        ],
    })
}

fn bench_caret_parse_i32(c: &mut Criterion) {
    c.bench_function("caret_parse_i32", |b| {
        b.iter(|| {
            let mut caret = Caret::new(black_box(b"1234567890"));
            caret.parse_i32().unwrap()
        })
    });
}

fn bench_json_serialize(c: &mut Criterion) {
    let value = sample_object();
    let config = JsonSerializerConfig::default();
    c.bench_function("json_serialize_object", |b| {
        b.iter(|| serializer::serialize(black_box(&value), &config).unwrap())
    });
}

fn bench_json_deserialize(c: &mut Criterion) {
    let text = r#"{"id":123456789,"name":"widget-42","active":true,"score":3.14159,"tags":["a","b"]}"#;
    let config = JsonDeserializerConfig::default();
    c.bench_function("json_deserialize_object", |b| {
        b.iter(|| deserializer::parse_document(black_box(text), &config).unwrap())
    });
}

criterion_group!(parsing_benches, bench_caret_parse_i32, bench_json_serialize, bench_json_deserialize);
criterion_main!(parsing_benches);
