//! Named accessors

use std::fmt;

use expose_types::{NativeType, TypeDescriptor};

use crate::typed::{AbstractTyped, DirectValue, Typed};

/// A typed accessor that has a name.
pub trait AbstractProperty: AbstractTyped {
    /// Member name, unique within its object
    fn name(&self) -> &str;
}

/// Named, typed member of an [`Object`](super::Object).
///
/// Reads and writes delegate to the wrapped accessor. A read-only property
/// rejects every write even if the accessor would accept it.
pub struct Property<T: NativeType> {
    name: String,
    read_only: bool,
    accessor: Box<dyn Typed<Value = T>>,
}

impl<T: NativeType> Property<T> {
    /// Create a property over `accessor`
    pub fn new<A>(name: impl Into<String>, accessor: A) -> Self
    where
        A: Typed<Value = T>,
    {
        Self {
            name: name.into(),
            read_only: false,
            accessor: Box::new(accessor),
        }
    }

    /// Create a property that rejects writes
    pub fn read_only<A>(name: impl Into<String>, accessor: A) -> Self
    where
        A: Typed<Value = T>,
    {
        Self {
            read_only: true,
            ..Self::new(name, accessor)
        }
    }

    /// Create a property that stores `value` in place
    pub fn with_value(name: impl Into<String>, value: T) -> Self {
        Self::new(name, DirectValue::new(value))
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the current value
    pub fn get(&self) -> T {
        self.accessor.value()
    }

    /// Write a new value. Returns `false` if rejected.
    pub fn set(&mut self, value: T) -> bool {
        Typed::set_value(self, value)
    }

    /// The wrapped accessor
    pub fn accessor(&self) -> &dyn Typed<Value = T> {
        self.accessor.as_ref()
    }
}

impl<T: NativeType> Typed for Property<T> {
    type Value = T;

    fn descriptor(&self) -> &TypeDescriptor<T> {
        self.accessor.descriptor()
    }

    fn value(&self) -> T {
        self.accessor.value()
    }

    fn set_value(&mut self, value: T) -> bool {
        !self.read_only && self.accessor.set_value(value)
    }

    fn writable(&self) -> bool {
        !self.read_only && self.accessor.writable()
    }

    fn composite(&self) -> bool {
        self.accessor.composite()
    }

    fn sub_count(&self) -> usize {
        self.accessor.sub_count()
    }

    fn sub(&self, index: usize) -> Option<&dyn AbstractTyped> {
        self.accessor.sub(index)
    }

    fn sub_mut(&mut self, index: usize) -> Option<&mut dyn AbstractTyped> {
        if self.read_only {
            return None;
        }
        self.accessor.sub_mut(index)
    }
}

impl<T: NativeType> AbstractProperty for Property<T> {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<T: NativeType> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("type", &T::type_name())
            .field("read_only", &self.read_only)
            .finish()
    }
}
