//! C4/C5 — the type-descriptor metamodel and DTO model that the JSON mapper
//! (C7/C8), router (C10) and dispatcher (C12) all build on.

pub mod any;
pub mod descriptor;
pub mod dto;
pub mod interpretation;
pub mod registry;
pub mod value;

pub use descriptor::{Category, ClassId, PrimitiveKind, TypeDescriptor};
pub use dto::{Dto, FieldDescriptor};
pub use interpretation::Interpretation;
pub use registry::{TypeRegistry, GLOBAL_REGISTRY};
pub use value::{DtoObject, DtoValue};
