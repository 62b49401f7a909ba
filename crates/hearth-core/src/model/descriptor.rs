//! C4 — the type-descriptor metamodel.
//!
//! Ported in spirit from `examples/original_source/src/oatpp/core/data/mapping/type/Type.{hpp,cpp}`.
//! The C++ original forwards polymorphic calls through a `void*
//! polymorphicDispatcher` cast back to a concrete `PolymorphicDispatcher`
//! interface per category (Object/List/Map/Enum/...). Rust has no need for
//! the `void*` cast: [`Category`] is a closed enum carrying exactly the
//! per-category data the dispatcher interfaces exposed (key type for maps,
//! element type for lists, the primitive's numeric kind), so a `match` on
//! `Category` replaces the vtable hop.

use std::sync::atomic::{AtomicU32, Ordering};

/// Identifies a family of runtime types sharing one dispatch strategy, e.g.
/// every `List<T>` regardless of `T`. Mirrors `type::ClassId`: a stable name
/// plus a process-lifetime incrementing id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassId {
    pub name: &'static str,
    pub id: u32,
}

static CLASS_COUNTER: AtomicU32 = AtomicU32::new(0);

impl ClassId {
    pub fn new(name: &'static str) -> Self {
        let id = CLASS_COUNTER.fetch_add(1, Ordering::Relaxed);
        ClassId { name, id }
    }

    /// Count of class ids minted so far in this process.
    pub fn class_count() -> u32 {
        CLASS_COUNTER.load(Ordering::Relaxed)
    }
}

/// Numeric sub-kind of a [`Category::Primitive`] descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

/// The polymorphic-dispatch category of a [`TypeDescriptor`].
///
/// # Why
/// oatpp resolves a type's runtime behavior through a `void* polymorphicDispatcher`
/// cast to one of several per-category dispatcher interfaces, chosen once at
/// `Type` construction and hidden behind virtual calls from then on. A
/// closed Rust enum gets the same "resolve once, act differently per kind"
/// behavior without the cast: every serializer/deserializer/router
/// operation that needs to act generically on a value matches on `Category`
/// directly.
///
/// # How
/// Each variant carries exactly the data its dispatcher interface exposed —
/// `List`/`Map` keep their element/key/value descriptors inline rather than
/// making a caller re-derive them from a class id, and `Primitive` keeps its
/// [`PrimitiveKind`] so numeric coercion ([`crate::json::deserializer`]'s
/// field-width narrowing) never needs a second lookup.
#[derive(Debug, Clone, Copy)]
pub enum Category {
    Void,
    Primitive(PrimitiveKind),
    String,
    /// DTO object: fields are looked up via [`crate::model::dto::Dto::fields`].
    Object,
    /// Homogeneous sequence; `element` names the item descriptor.
    List { element: &'static TypeDescriptor },
    /// Associative container; oatpp's `MAP_KEY_NOT_STRING` check is driven by
    /// `key` here rather than runtime introspection of the key value.
    Map { key: &'static TypeDescriptor, value: &'static TypeDescriptor },
    Enum,
    /// Type-erased value carrying its own descriptor alongside the payload.
    Any,
}

/// Static description of a runtime type: its dispatch [`Category`], plus any
/// registered [`Interpretation`]s a deserializer/serializer may substitute in
/// its place (e.g. reading an ISO-8601 string into a DTO that models time as
/// an integer).
pub struct TypeDescriptor {
    pub class_id: ClassId,
    pub name_qualifier: &'static str,
    pub category: Category,
    pub interpretations: &'static [(&'static str, &'static dyn crate::model::interpretation::Interpretation)],
}

impl TypeDescriptor {
    /// Finds the first interpretation named in `names`, in order — mirrors
    /// `Type::findInterpretation`'s "first match from the candidate list
    /// wins" contract.
    pub fn find_interpretation(&self, names: &[&str]) -> Option<&'static dyn crate::model::interpretation::Interpretation> {
        for name in names {
            if let Some((_, interp)) = self.interpretations.iter().find(|(n, _)| n == name) {
                return Some(*interp);
            }
        }
        None
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("class_id", &self.class_id)
            .field("name_qualifier", &self.name_qualifier)
            .finish()
    }
}

/// Descriptors are process-lifetime singletons (one `static` per type), so
/// identity is the only equality that makes sense — mirrors the
/// `std::ptr::eq` check [`crate::model::registry::TypeRegistry::register`]
/// already uses to detect a name collision.
impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

macro_rules! primitive_descriptor {
    ($static_name:ident, $class_name:literal, $qualifier:literal, $kind:expr) => {
        pub static $static_name: TypeDescriptor = TypeDescriptor {
            class_id: ClassId { name: $class_name, id: 0 },
            name_qualifier: $qualifier,
            category: Category::Primitive($kind),
            interpretations: &[],
        };
    };
}

primitive_descriptor!(BOOL, "Boolean", "Boolean", PrimitiveKind::Bool);
primitive_descriptor!(INT32, "Int32", "Int32", PrimitiveKind::Int32);
primitive_descriptor!(INT64, "Int64", "Int64", PrimitiveKind::Int64);
primitive_descriptor!(UINT32, "UInt32", "UInt32", PrimitiveKind::UInt32);
primitive_descriptor!(UINT64, "UInt64", "UInt64", PrimitiveKind::UInt64);
primitive_descriptor!(FLOAT32, "Float32", "Float32", PrimitiveKind::Float32);
primitive_descriptor!(FLOAT64, "Float64", "Float64", PrimitiveKind::Float64);

pub static STRING: TypeDescriptor = TypeDescriptor {
    class_id: ClassId { name: "String", id: 0 },
    name_qualifier: "String",
    category: Category::String,
    interpretations: &[],
};

pub static VOID: TypeDescriptor = TypeDescriptor {
    class_id: ClassId { name: "Void", id: 0 },
    name_qualifier: "Void",
    category: Category::Void,
    interpretations: &[],
};

pub static ANY: TypeDescriptor = TypeDescriptor {
    class_id: ClassId { name: "Any", id: 0 },
    name_qualifier: "Any",
    category: Category::Any,
    interpretations: &[],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_descriptors_carry_their_kind() {
        assert!(matches!(INT32.category, Category::Primitive(PrimitiveKind::Int32)));
        assert!(matches!(STRING.category, Category::String));
    }

    #[test]
    fn class_id_new_assigns_increasing_ids() {
        let a = ClassId::new("A");
        let b = ClassId::new("B");
        assert!(b.id > a.id);
    }
}
