//! In-place accessor storage

use std::fmt;
use std::rc::Rc;

use expose_types::{NativeType, TypeDescriptor};

use super::Typed;

/// Accessor that owns its value.
pub struct DirectValue<T: NativeType> {
    descriptor: Rc<TypeDescriptor<T>>,
    value: T,
}

impl<T: NativeType> DirectValue<T> {
    /// Create with an initial value
    pub fn new(value: T) -> Self {
        Self::with_descriptor(Rc::new(TypeDescriptor::new()), value)
    }

    /// Create with a shared descriptor (usually from a `TypeContext`)
    pub fn with_descriptor(descriptor: Rc<TypeDescriptor<T>>, value: T) -> Self {
        Self { descriptor, value }
    }

    /// Borrow the stored value
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutably borrow the stored value
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Replace the stored value
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    /// Take the stored value
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: NativeType> Typed for DirectValue<T> {
    type Value = T;

    fn descriptor(&self) -> &TypeDescriptor<T> {
        &self.descriptor
    }

    fn value(&self) -> T {
        self.value.clone()
    }

    fn set_value(&mut self, value: T) -> bool {
        self.value = value;
        true
    }
}

impl<T: NativeType> Default for DirectValue<T> {
    fn default() -> Self {
        Self::new(T::default_value())
    }
}

impl<T: NativeType> fmt::Debug for DirectValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectValue")
            .field("type", &T::type_name())
            .field("value", &self.value)
            .finish()
    }
}
