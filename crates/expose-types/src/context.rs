//! Type registry
//!
//! `TypeContext` owns one shared descriptor per native type, keyed by
//! `TypeId`. Accessors created from the same context see the same
//! symbolic-name tables.

use std::any::{Any, TypeId};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::descriptor::{AbstractType, TypeDescriptor};
use crate::native::NativeType;

struct Entry {
    erased: Rc<dyn AbstractType>,
    typed: Rc<dyn Any>,
}

/// Registry of type descriptors.
#[derive(Default)]
pub struct TypeContext {
    entries: FxHashMap<TypeId, Entry>,
    order: Vec<TypeId>,
}

impl TypeContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the descriptor for `T`, registering it on first request
    pub fn register<T: NativeType>(&mut self) -> Rc<TypeDescriptor<T>> {
        if let Some(existing) = self.descriptor::<T>() {
            return existing;
        }
        let descriptor = Rc::new(TypeDescriptor::<T>::new());
        self.insert(descriptor.clone());
        descriptor
    }

    /// Get the descriptor for `T` if registered
    pub fn descriptor<T: NativeType>(&self) -> Option<Rc<TypeDescriptor<T>>> {
        let entry = self.entries.get(&TypeId::of::<T>())?;
        entry.typed.clone().downcast::<TypeDescriptor<T>>().ok()
    }

    /// Register `T` with an explicit symbolic-name table.
    ///
    /// Returns `false` if the table of an already registered descriptor was
    /// fixed before.
    pub fn set_named_values<T: NativeType>(&mut self, values: Vec<(T, String)>) -> bool {
        self.register::<T>().set_named_values(values)
    }

    /// Look up a descriptor by type identity
    pub fn lookup(&self, id: TypeId) -> Option<Rc<dyn AbstractType>> {
        self.entries.get(&id).map(|entry| entry.erased.clone())
    }

    /// Look up a descriptor by type name
    pub fn lookup_name(&self, name: &str) -> Option<Rc<dyn AbstractType>> {
        self.types().find(|ty| ty.type_name() == name)
    }

    /// Registered descriptors in registration order
    pub fn types(&self) -> impl Iterator<Item = Rc<dyn AbstractType>> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(|entry| entry.erased.clone())
    }

    /// Check if `T` is registered
    pub fn contains<T: NativeType>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no type is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert<T: NativeType>(&mut self, descriptor: Rc<TypeDescriptor<T>>) {
        let id = TypeId::of::<T>();
        let erased: Rc<dyn AbstractType> = descriptor.clone();
        let typed: Rc<dyn Any> = descriptor;
        self.entries.insert(id, Entry { erased, typed });
        self.order.push(id);
    }
}

impl std::fmt::Debug for TypeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeContext")
            .field("types", &self.types().map(|t| t.type_name()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_returns_shared_descriptor() {
        let mut ctx = TypeContext::new();
        let a = ctx.register::<i32>();
        let b = ctx.register::<i32>();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_lookup_by_id_and_name() {
        let mut ctx = TypeContext::new();
        ctx.register::<f64>();
        ctx.register::<Vec<String>>();

        let ty = ctx.lookup(TypeId::of::<f64>()).unwrap();
        assert!(ty.is_floating_point());
        assert!(ctx.lookup_name("Vec<String>").unwrap().is_dynamic_array());
        assert!(ctx.lookup(TypeId::of::<u8>()).is_none());
    }

    #[test]
    fn test_named_values_through_context() {
        let mut ctx = TypeContext::new();
        assert!(ctx.set_named_values::<u16>(vec![(3, "three".to_string())]));

        let ty = ctx.descriptor::<u16>().unwrap();
        assert_eq!(ty.to_string(&3), "three");
        assert!(!ctx.set_named_values::<u16>(vec![(4, "four".to_string())]));
    }

    #[test]
    fn test_types_in_registration_order() {
        let mut ctx = TypeContext::new();
        ctx.register::<bool>();
        ctx.register::<String>();
        let names: Vec<String> = ctx.types().map(|t| t.type_name()).collect();
        assert_eq!(names, vec!["bool".to_string(), "String".to_string()]);
    }
}
