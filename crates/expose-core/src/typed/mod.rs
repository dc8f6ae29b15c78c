//! Typed accessors
//!
//! An accessor is a handle over one logical value. Consumers work through
//! the object-safe [`AbstractTyped`] interface without knowing the native
//! type; storage strategies implement the small [`Typed`] hook trait and get
//! the full interface from one blanket implementation, so in-place,
//! closure-mediated and array-element storage convert values identically.
//!
//! Strategies:
//! - [`DirectValue`] stores the value in place
//! - [`StoredValue`] reads and writes through getter/setter closures
//! - [`StoredArray`] wraps a fixed-size array and exposes one
//!   [`ArrayElement`] sub-accessor per index

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use expose_types::{NativeType, TypeDescriptor, TypeKind};

use crate::convert;
use crate::variant::Variant;

pub mod array;
pub mod direct;
pub mod stored;

pub use array::{ArrayElement, StoredArray};
pub use direct::DirectValue;
pub use stored::StoredValue;

/// Shared, type-erased accessor that a [`Variant::reference`] can link to
pub type SharedTyped = Rc<RefCell<dyn AbstractTyped>>;

/// Wrap an accessor for shared access
pub fn share<A: AbstractTyped>(accessor: A) -> Rc<RefCell<A>> {
    Rc::new(RefCell::new(accessor))
}

/// Uniform read/write/convert interface over one value.
///
/// Every `from_*` method returns `false` when the input cannot be
/// represented or the accessor is read-only; the stored value is unchanged
/// in that case.
pub trait AbstractTyped: Any {
    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Identity of the native type
    fn native_type_id(&self) -> TypeId;

    /// Type name
    fn type_name(&self) -> String;

    /// Category flags
    fn kind(&self) -> TypeKind;

    /// Check if writes are rejected
    fn is_read_only(&self) -> bool;

    /// Check if the value exposes sub-values
    fn is_composite(&self) -> bool;

    /// Number of sub-values
    fn num_sub_values(&self) -> usize;

    /// Sub-value at index
    fn sub_value(&self, index: usize) -> Option<&dyn AbstractTyped>;

    /// Mutable sub-value at index
    fn sub_value_mut(&mut self, index: usize) -> Option<&mut dyn AbstractTyped>;

    /// Current value as a variant
    fn to_variant(&self) -> Variant;

    /// Set from a variant
    fn from_variant(&mut self, value: &Variant) -> bool;

    /// String form
    fn to_string(&self) -> String;

    /// Set from string form
    fn from_string(&mut self, text: &str) -> bool;

    /// Convert to boolean
    fn to_bool(&self) -> bool;

    /// Set from boolean
    fn from_bool(&mut self, value: bool) -> bool;

    /// Convert to a signed 64-bit integer
    fn to_i64(&self) -> i64;

    /// Set from a signed 64-bit integer
    fn from_i64(&mut self, value: i64) -> bool;

    /// Convert to an unsigned 64-bit integer
    fn to_u64(&self) -> u64;

    /// Set from an unsigned 64-bit integer
    fn from_u64(&mut self, value: u64) -> bool;

    /// Convert to a double
    fn to_f64(&self) -> f64;

    /// Set from a double
    fn from_f64(&mut self, value: f64) -> bool;

    /// `BOOLEAN` flag
    fn is_bool(&self) -> bool {
        self.kind().is_boolean()
    }

    /// Integral or floating point
    fn is_number(&self) -> bool {
        self.kind().is_number()
    }

    /// `INTEGRAL` flag
    fn is_integral(&self) -> bool {
        self.kind().is_integral()
    }

    /// `FLOATING_POINT` flag
    fn is_floating_point(&self) -> bool {
        self.kind().is_floating_point()
    }

    /// `STRING` flag
    fn is_string(&self) -> bool {
        self.kind().is_string()
    }

    /// `ARRAY` flag
    fn is_array(&self) -> bool {
        self.kind().is_array()
    }

    /// `ENUM` flag
    fn is_enum(&self) -> bool {
        self.kind().is_enum()
    }

    /// `OBJECT` flag
    fn is_object(&self) -> bool {
        self.kind().is_object()
    }
}

/// Storage hooks of a typed accessor.
///
/// Implementors only decide where the value lives; conversions come from
/// the blanket [`AbstractTyped`] implementation.
pub trait Typed: 'static {
    /// Native type of the value
    type Value: NativeType;

    /// Descriptor used for conversions
    fn descriptor(&self) -> &TypeDescriptor<Self::Value>;

    /// Read the current value
    fn value(&self) -> Self::Value;

    /// Write a new value. Returns `false` if rejected.
    fn set_value(&mut self, value: Self::Value) -> bool;

    /// Check if `set_value` can succeed
    fn writable(&self) -> bool {
        true
    }

    /// Check if the storage exposes sub-values
    fn composite(&self) -> bool {
        false
    }

    /// Number of sub-values
    fn sub_count(&self) -> usize {
        0
    }

    /// Sub-value at index
    fn sub(&self, _index: usize) -> Option<&dyn AbstractTyped> {
        None
    }

    /// Mutable sub-value at index
    fn sub_mut(&mut self, _index: usize) -> Option<&mut dyn AbstractTyped> {
        None
    }
}

/// Read-modify-write through the descriptor, leaving storage untouched on
/// failure.
fn update<S, F>(storage: &mut S, convert: F) -> bool
where
    S: Typed,
    F: FnOnce(&TypeDescriptor<S::Value>, &mut S::Value) -> bool,
{
    if !storage.writable() {
        return false;
    }
    let mut value = storage.value();
    if !convert(storage.descriptor(), &mut value) {
        return false;
    }
    storage.set_value(value)
}

impl<S: Typed> AbstractTyped for S {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn native_type_id(&self) -> TypeId {
        TypeId::of::<S::Value>()
    }

    fn type_name(&self) -> String {
        self.descriptor().type_name()
    }

    fn kind(&self) -> TypeKind {
        self.descriptor().kind()
    }

    fn is_read_only(&self) -> bool {
        !self.writable()
    }

    fn is_composite(&self) -> bool {
        self.composite()
    }

    fn num_sub_values(&self) -> usize {
        self.sub_count()
    }

    fn sub_value(&self, index: usize) -> Option<&dyn AbstractTyped> {
        self.sub(index)
    }

    fn sub_value_mut(&mut self, index: usize) -> Option<&mut dyn AbstractTyped> {
        self.sub_mut(index)
    }

    fn to_variant(&self) -> Variant {
        convert::to_variant(self.descriptor(), &self.value())
    }

    fn from_variant(&mut self, value: &Variant) -> bool {
        update(self, |ty, target| convert::from_variant(ty, target, value))
    }

    fn to_string(&self) -> String {
        self.descriptor().to_string(&self.value())
    }

    fn from_string(&mut self, text: &str) -> bool {
        update(self, |ty, target| ty.from_string(target, text))
    }

    fn to_bool(&self) -> bool {
        self.descriptor().to_bool(&self.value())
    }

    fn from_bool(&mut self, value: bool) -> bool {
        update(self, |ty, target| ty.from_bool(target, value))
    }

    fn to_i64(&self) -> i64 {
        self.descriptor().to_i64(&self.value())
    }

    fn from_i64(&mut self, value: i64) -> bool {
        update(self, |ty, target| ty.from_i64(target, value))
    }

    fn to_u64(&self) -> u64 {
        self.descriptor().to_u64(&self.value())
    }

    fn from_u64(&mut self, value: u64) -> bool {
        update(self, |ty, target| ty.from_u64(target, value))
    }

    fn to_f64(&self) -> f64 {
        self.descriptor().to_f64(&self.value())
    }

    fn from_f64(&mut self, value: f64) -> bool {
        update(self, |ty, target| ty.from_f64(target, value))
    }
}
