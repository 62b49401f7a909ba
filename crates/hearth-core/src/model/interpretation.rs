//! Type interpretations: reversible substitutions a serializer/deserializer
//! may apply in place of a type's native representation.
//!
//! Grounded on `Type::AbstractInterpretation` / `Type::Interpretation<...>`
//! in `examples/original_source/src/oatpp/core/data/mapping/type/Type.hpp`.
//! The C++ template pair `toInterpretation`/`fromInterpretation` becomes a
//! plain object-safe trait here since Rust doesn't need a CRTP-style
//! template to get static dispatch at the call site — callers already hold
//! `&dyn Interpretation` from [`crate::model::descriptor::TypeDescriptor::find_interpretation`].

use crate::model::descriptor::TypeDescriptor;
use crate::model::value::DtoValue;

/// Converts a value between its original type and an alternate wire
/// representation, e.g. a DTO field typed as a domain enum but interpreted
/// as a plain string on the wire.
pub trait Interpretation: Send + Sync {
    /// Original value -> interpreted value.
    fn to_interpretation(&self, original: &DtoValue) -> DtoValue;
    /// Interpreted value -> original value.
    fn from_interpretation(&self, interpreted: &DtoValue) -> DtoValue;
    /// Descriptor of the interpreted (wire) representation.
    fn interpretation_type(&self) -> &'static TypeDescriptor;
}
