//! Serializer/deserializer configuration, modeled on
//! `Serializer::Config`/`Deserializer::Config` in
//! `examples/original_source/parser/json/mapping/{Serializer,Deserializer}.hpp`.

/// Controls how [`crate::json::serialize`] renders values.
#[derive(Debug, Clone)]
pub struct JsonSerializerConfig {
    /// When `true`, a null DTO field is emitted as `"field": null`; when
    /// `false` it is omitted from the object entirely. Mirrors
    /// `Config::includeNullFields`.
    pub include_null_fields: bool,
    /// A `printf`-style float format, defaulting to `%.16g`. Only the
    /// `%.<precision>g` shape is interpreted; any other string falls back
    /// to the shortest round-tripping decimal.
    pub float_format: String,
    /// Interpretation names tried, in order, before a value's native form is
    /// serialized — see [`crate::model::descriptor::TypeDescriptor::find_interpretation`].
    /// Empty (the default) means no substitution is attempted.
    pub use_interpretations: Vec<String>,
}

impl Default for JsonSerializerConfig {
    fn default() -> Self {
        JsonSerializerConfig { include_null_fields: true, float_format: "%.16g".to_string(), use_interpretations: Vec::new() }
    }
}

/// Controls how [`crate::json::deserialize`] reads values.
#[derive(Debug, Clone)]
pub struct JsonDeserializerConfig {
    /// When `true` (the default, matching `Config::allowUnknownFields`), an
    /// object member with no matching DTO field is skipped structurally.
    /// When `false`, it raises `json.unknown_field`.
    pub allow_unknown_fields: bool,
    /// Interpretation names tried, in order, before a field's native
    /// representation is bound — the inverse of
    /// [`JsonSerializerConfig::use_interpretations`].
    pub use_interpretations: Vec<String>,
}

impl Default for JsonDeserializerConfig {
    fn default() -> Self {
        JsonDeserializerConfig { allow_unknown_fields: true, use_interpretations: Vec::new() }
    }
}
