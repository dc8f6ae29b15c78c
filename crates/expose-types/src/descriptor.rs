//! Type descriptors
//!
//! A `TypeDescriptor<T>` carries the introspection data and conversion rules
//! for one native type. It is stateless apart from the symbolic-name table,
//! which is fixed the first time it is read.

use std::any::{Any, TypeId};
use std::cell::OnceCell;
use std::fmt;

use crate::kind::TypeKind;
use crate::native::NativeType;

/// Type-erased view of a descriptor.
pub trait AbstractType: Any {
    /// Identity of the described native type
    fn native_type_id(&self) -> TypeId;

    /// Type name
    fn type_name(&self) -> String;

    /// Category flags
    fn kind(&self) -> TypeKind;

    /// Identity of the element type (the type itself for scalars)
    fn element_type_id(&self) -> TypeId;

    /// Name of the element type
    fn element_type_name(&self) -> String;

    /// Check if symbolic names are defined
    fn has_symbolic_names(&self) -> bool;

    /// Symbolic names in declaration order
    fn symbolic_names(&self) -> Vec<String>;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// `BOOLEAN` flag
    fn is_boolean(&self) -> bool {
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

    /// `SIGNED` flag
    fn is_signed(&self) -> bool {
        self.kind().is_signed()
    }

    /// `UNSIGNED` flag
    fn is_unsigned(&self) -> bool {
        self.kind().is_unsigned()
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

    /// `DYNAMIC_ARRAY` flag
    fn is_dynamic_array(&self) -> bool {
        self.kind().is_dynamic_array()
    }

    /// `MAP` flag
    fn is_map(&self) -> bool {
        self.kind().is_map()
    }

    /// `ENUM` flag
    fn is_enum(&self) -> bool {
        self.kind().is_enum()
    }
}

/// Descriptor for the native type `T`.
pub struct TypeDescriptor<T: NativeType> {
    named_values: OnceCell<Vec<(T, String)>>,
}

impl<T: NativeType> TypeDescriptor<T> {
    /// Create a descriptor using the type's built-in symbolic names
    pub fn new() -> Self {
        Self {
            named_values: OnceCell::new(),
        }
    }

    /// Create a descriptor with an explicit symbolic-name table
    pub fn with_named_values(values: Vec<(T, String)>) -> Self {
        let descriptor = Self::new();
        let _ = descriptor.named_values.set(values);
        descriptor
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Type name
    pub fn type_name(&self) -> String {
        T::type_name()
    }

    /// Category flags
    pub fn kind(&self) -> TypeKind {
        T::kind()
    }

    /// `BOOLEAN` flag
    pub fn is_boolean(&self) -> bool {
        T::kind().is_boolean()
    }

    /// Integral or floating point
    pub fn is_number(&self) -> bool {
        T::kind().is_number()
    }

    /// `INTEGRAL` flag
    pub fn is_integral(&self) -> bool {
        T::kind().is_integral()
    }

    /// `SIGNED` flag
    pub fn is_signed(&self) -> bool {
        T::kind().is_signed()
    }

    /// `UNSIGNED` flag
    pub fn is_unsigned(&self) -> bool {
        T::kind().is_unsigned()
    }

    /// `FLOATING_POINT` flag
    pub fn is_floating_point(&self) -> bool {
        T::kind().is_floating_point()
    }

    /// `STRING` flag
    pub fn is_string(&self) -> bool {
        T::kind().is_string()
    }

    /// `ARRAY` flag
    pub fn is_array(&self) -> bool {
        T::kind().is_array()
    }

    /// `DYNAMIC_ARRAY` flag
    pub fn is_dynamic_array(&self) -> bool {
        T::kind().is_dynamic_array()
    }

    /// `MAP` flag
    pub fn is_map(&self) -> bool {
        T::kind().is_map()
    }

    /// `ENUM` flag
    pub fn is_enum(&self) -> bool {
        T::kind().is_enum()
    }

    /// Default value
    pub fn default_value(&self) -> T {
        T::default_value()
    }

    /// Smallest representable value
    pub fn minimum_value(&self) -> Option<T> {
        T::minimum_value()
    }

    /// Largest representable value
    pub fn maximum_value(&self) -> Option<T> {
        T::maximum_value()
    }

    // ========================================================================
    // Symbolic names
    // ========================================================================

    /// Value/name table. Reading it fixes the table.
    pub fn named_values(&self) -> &[(T, String)] {
        self.named_values.get_or_init(T::symbolic_names)
    }

    /// Set the value/name table.
    ///
    /// Succeeds once, before the table is first read. Later calls return
    /// `false` and leave the table unchanged.
    pub fn set_named_values(&self, values: Vec<(T, String)>) -> bool {
        match self.named_values.set(values) {
            Ok(()) => true,
            Err(_) => {
                log::warn!(
                    "symbolic names for {} are already fixed; ignoring new table",
                    T::type_name()
                );
                false
            }
        }
    }

    /// Check if any symbolic name is defined
    pub fn has_symbolic_names(&self) -> bool {
        !self.named_values().is_empty()
    }

    /// Symbolic names in table order
    pub fn symbolic_names(&self) -> Vec<String> {
        self.named_values().iter().map(|(_, name)| name.clone()).collect()
    }

    /// Symbolic name of `value`
    pub fn name_of(&self, value: &T) -> Option<&str> {
        self.named_values()
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, name)| name.as_str())
    }

    /// Value registered under `name`
    pub fn value_of(&self, name: &str) -> Option<T> {
        self.named_values()
            .iter()
            .find(|(_, n)| n == name)
            .map(|(v, _)| v.clone())
    }

    // ========================================================================
    // Canonical conversions
    // ========================================================================

    /// String form: the symbolic name if registered, else the generic form
    pub fn to_string(&self, value: &T) -> String {
        match self.name_of(value) {
            Some(name) => name.to_string(),
            None => value.format(),
        }
    }

    /// Set from a symbolic name or the generic string form
    pub fn from_string(&self, target: &mut T, text: &str) -> bool {
        let parsed = self
            .value_of(text.trim())
            .or_else(|| T::parse(text));
        Self::assign(target, parsed)
    }

    /// Convert to boolean
    pub fn to_bool(&self, value: &T) -> bool {
        value.to_bool()
    }

    /// Set from boolean
    pub fn from_bool(&self, target: &mut T, value: bool) -> bool {
        Self::assign(target, T::from_bool(value))
    }

    /// Convert to a signed 64-bit integer
    pub fn to_i64(&self, value: &T) -> i64 {
        value.to_i64()
    }

    /// Set from a signed 64-bit integer
    pub fn from_i64(&self, target: &mut T, value: i64) -> bool {
        Self::assign(target, T::from_i64(value))
    }

    /// Convert to an unsigned 64-bit integer
    pub fn to_u64(&self, value: &T) -> u64 {
        value.to_u64()
    }

    /// Set from an unsigned 64-bit integer
    pub fn from_u64(&self, target: &mut T, value: u64) -> bool {
        Self::assign(target, T::from_u64(value))
    }

    /// Convert to a double
    pub fn to_f64(&self, value: &T) -> f64 {
        value.to_f64()
    }

    /// Set from a double
    pub fn from_f64(&self, target: &mut T, value: f64) -> bool {
        Self::assign(target, T::from_f64(value))
    }

    fn assign(target: &mut T, value: Option<T>) -> bool {
        match value {
            Some(v) => {
                *target = v;
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Arrays and maps
    // ========================================================================

    /// Number of elements (arrays and maps)
    pub fn num_elements(&self, value: &T) -> usize {
        value.num_elements()
    }

    /// Element at index, `None` if out of range or not an array
    pub fn element(&self, value: &T, index: usize) -> Option<T::Element> {
        value.element(index)
    }

    /// Replace element at index
    pub fn set_element(&self, value: &mut T, index: usize, element: T::Element) -> bool {
        value.set_element(index, element)
    }

    /// Append an element. No-op returning `false` unless dynamic.
    pub fn push(&self, value: &mut T, element: T::Element) -> bool {
        T::kind().is_dynamic_array() && value.push(element)
    }

    /// Map keys
    pub fn keys(&self, value: &T) -> Vec<String> {
        value.keys()
    }

    /// Map entry for key
    pub fn entry(&self, value: &T, key: &str) -> Option<T::Element> {
        value.entry(key)
    }

    /// Insert or replace a map entry
    pub fn set_entry(&self, value: &mut T, key: &str, element: T::Element) -> bool {
        value.set_entry(key, element)
    }
}

impl<T: NativeType> Default for TypeDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NativeType> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &T::type_name())
            .field("kind", &T::kind())
            .finish()
    }
}

impl<T: NativeType> AbstractType for TypeDescriptor<T> {
    fn native_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> String {
        T::type_name()
    }

    fn kind(&self) -> TypeKind {
        T::kind()
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T::Element>()
    }

    fn element_type_name(&self) -> String {
        <T::Element as NativeType>::type_name()
    }

    fn has_symbolic_names(&self) -> bool {
        TypeDescriptor::has_symbolic_names(self)
    }

    fn symbolic_names(&self) -> Vec<String> {
        TypeDescriptor::symbolic_names(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbolic_names_for_integers() {
        let ty = TypeDescriptor::<i32>::new();
        assert!(ty.set_named_values(vec![(0, "Off".to_string()), (1, "On".to_string())]));

        assert_eq!(ty.to_string(&1), "On");
        assert_eq!(ty.to_string(&5), "5");

        let mut v = 0;
        assert!(ty.from_string(&mut v, "On"));
        assert_eq!(v, 1);
        assert!(ty.from_string(&mut v, "7"));
        assert_eq!(v, 7);
    }

    #[test]
    fn test_named_values_set_once() {
        let ty = TypeDescriptor::<u8>::new();
        assert!(ty.set_named_values(vec![(1, "one".to_string())]));
        assert!(!ty.set_named_values(vec![(2, "two".to_string())]));
        assert_eq!(ty.symbolic_names(), vec!["one".to_string()]);
    }

    #[test]
    fn test_named_values_fixed_after_first_use() {
        let ty = TypeDescriptor::<u8>::new();
        assert!(!ty.has_symbolic_names());
        assert!(!ty.set_named_values(vec![(1, "one".to_string())]));
    }

    #[test]
    fn test_failed_conversion_keeps_value() {
        let ty = TypeDescriptor::<i64>::new();
        let mut v = 12;
        assert!(!ty.from_string(&mut v, "twelve"));
        assert!(!ty.from_f64(&mut v, f64::NAN));
        assert_eq!(v, 12);
    }

    #[test]
    fn test_push_only_on_dynamic_arrays() {
        let fixed = TypeDescriptor::<[u8; 2]>::new();
        let mut a = [1, 2];
        assert!(!fixed.push(&mut a, 3));

        let dynamic = TypeDescriptor::<Vec<u8>>::new();
        let mut v = vec![1, 2];
        assert!(dynamic.push(&mut v, 3));
        assert_eq!(v, vec![1, 2, 3]);
        assert_eq!(dynamic.num_elements(&v), 3);
        assert_eq!(dynamic.element(&v, 2), Some(3));
        assert_eq!(dynamic.element(&v, 9), None);
    }

    #[test]
    fn test_abstract_view() {
        let ty = TypeDescriptor::<Vec<f32>>::new();
        let erased: &dyn AbstractType = &ty;
        assert!(erased.is_array());
        assert!(erased.is_dynamic_array());
        assert!(!erased.is_map());
        assert_eq!(erased.element_type_name(), "f32");
        assert_eq!(erased.element_type_id(), TypeId::of::<f32>());
    }
}
