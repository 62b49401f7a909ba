//! A name -> [`TypeDescriptor`] registry, used by the router (C10) to bind a
//! path/query parameter name to the descriptor it must parse as, and by the
//! JSON mapper when resolving a polymorphic `Any` field back to a concrete
//! DTO by its declared class name.
//!
//! oatpp does not need this: a `Type*` is always reachable at compile time
//! through `Class::getType()`. Here, descriptors are registered once (at
//! startup, from each `Dto` impl) into a process-wide table guarded by
//! `spin::RwLock`, the same lock the teacher crate reaches for on read-mostly
//! shared state.

use spin::RwLock;
use std::collections::HashMap;

use crate::error::HearthError;
use crate::model::descriptor::TypeDescriptor;

pub struct TypeRegistry {
    by_name: RwLock<HashMap<&'static str, &'static TypeDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry { by_name: RwLock::new(HashMap::new()) }
    }

    /// Registers `descriptor` under its class-id name. Re-registering the
    /// same name with a different descriptor is a programmer error: it
    /// means two DTOs collided on a class name.
    pub fn register(&self, descriptor: &'static TypeDescriptor) -> Result<(), HearthError> {
        let mut table = self.by_name.write();
        match table.get(descriptor.class_id.name) {
            Some(existing) if !std::ptr::eq(*existing, descriptor) => Err(HearthError::programmer_error(format!(
                "type name `{}` registered twice with different descriptors",
                descriptor.class_id.name
            ))),
            _ => {
                table.insert(descriptor.class_id.name, descriptor);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&'static TypeDescriptor> {
        self.by_name.read().get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide registry used when no caller-local registry is threaded
/// through (e.g. ad-hoc `Any` resolution in tests).
pub static GLOBAL_REGISTRY: spin::Lazy<TypeRegistry> = spin::Lazy::new(TypeRegistry::new);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::{Category, ClassId, TypeDescriptor};

    static FOO: TypeDescriptor =
        TypeDescriptor { class_id: ClassId { name: "Foo", id: 0 }, name_qualifier: "Foo", category: Category::Object, interpretations: &[] };

    #[test]
    fn registers_and_looks_up_by_name() {
        let registry = TypeRegistry::new();
        registry.register(&FOO).unwrap();
        assert!(std::ptr::eq(registry.lookup("Foo").unwrap(), &FOO));
        assert!(registry.lookup("Bar").is_none());
    }

    #[test]
    fn re_registering_the_same_descriptor_is_idempotent() {
        let registry = TypeRegistry::new();
        registry.register(&FOO).unwrap();
        registry.register(&FOO).unwrap();
        assert_eq!(registry.len(), 1);
    }
}
