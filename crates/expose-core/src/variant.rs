//! Variant values
//!
//! `Variant` is the type-erased interchange value: a scalar, an ordered
//! array, an insertion-ordered string map, or a live reference to an
//! accessor owned elsewhere. Conversions between tags never fail at the
//! type level; the `from_*` methods report values that cannot be
//! represented.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use expose_types::{NativeType, TypeDescriptor, TypeKind};
use indexmap::IndexMap;

use crate::convert;
use crate::typed::{AbstractTyped, SharedTyped};

/// Array payload of a variant
pub type VariantArray = Vec<Variant>;

/// Map payload of a variant, iterated in insertion order
pub type VariantMap = IndexMap<String, Variant>;

// ============================================================================
// Reference links
// ============================================================================

/// Non-owning link from a variant to an accessor.
///
/// The referent stays owned by its creator. Once it is dropped the link
/// dangles: reads yield `Null` and writes fail. A read that re-enters the
/// same link, as when an object holds a reference to itself, also yields
/// `Null`.
pub struct VariantRef {
    target: Weak<RefCell<dyn AbstractTyped>>,
    reading: Cell<bool>,
}

impl Clone for VariantRef {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            reading: Cell::new(false),
        }
    }
}

impl VariantRef {
    /// Link to a shared accessor
    pub fn new<A: AbstractTyped>(target: &Rc<RefCell<A>>) -> Self {
        let shared: SharedTyped = target.clone();
        Self::from_shared(&shared)
    }

    /// Link to an already type-erased accessor
    pub fn from_shared(target: &SharedTyped) -> Self {
        Self {
            target: Rc::downgrade(target),
            reading: Cell::new(false),
        }
    }

    /// Check if the referent is still alive
    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Snapshot of the referent's current value
    pub fn get(&self) -> Variant {
        self.read(|target| target.to_variant()).unwrap_or_default()
    }

    /// Run `f` against the referent
    pub fn read<R>(&self, f: impl FnOnce(&dyn AbstractTyped) -> R) -> Option<R> {
        let Some(target) = self.target.upgrade() else {
            log::debug!("read through dangling variant reference");
            return None;
        };
        let Ok(target) = target.try_borrow() else {
            log::debug!("variant reference target is mutably borrowed");
            return None;
        };
        if self.reading.replace(true) {
            log::debug!("variant reference cycle cut at re-entrant read");
            return None;
        }
        let result = f(&*target);
        self.reading.set(false);
        Some(result)
    }

    /// Run the write `f` against the referent
    pub fn write(&self, f: impl FnOnce(&mut dyn AbstractTyped) -> bool) -> bool {
        let Some(target) = self.target.upgrade() else {
            log::debug!("write through dangling variant reference");
            return false;
        };
        let Ok(mut target) = target.try_borrow_mut() else {
            log::debug!("variant reference target is already borrowed");
            return false;
        };
        f(&mut *target)
    }
}

impl fmt::Debug for VariantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantRef")
            .field("alive", &self.is_alive())
            .finish()
    }
}

// ============================================================================
// Variant
// ============================================================================

/// Type-erased composite value.
///
/// Cloning deep-copies arrays and maps. Cloning a `Reference` yields an
/// owned snapshot of the referent's current value; clone the inner
/// [`VariantRef`] to keep the link.
#[derive(Debug, Default)]
pub enum Variant {
    /// No value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed 64-bit integer
    Int64(i64),
    /// Unsigned 64-bit integer
    UInt64(u64),
    /// Double precision float
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Ordered list of values
    Array(VariantArray),
    /// Insertion-ordered string map
    Map(VariantMap),
    /// Live link to an accessor owned elsewhere
    Reference(VariantRef),
}

impl Variant {
    /// Empty array
    pub fn array() -> Self {
        Variant::Array(Vec::new())
    }

    /// Empty map
    pub fn map() -> Self {
        Variant::Map(IndexMap::new())
    }

    /// Reference to a shared accessor. Writes through the variant update
    /// the accessor in place.
    pub fn reference<A: AbstractTyped>(target: &Rc<RefCell<A>>) -> Self {
        Variant::Reference(VariantRef::new(target))
    }

    /// Convert any native value using its canonical rules
    pub fn from_value<T: NativeType>(value: &T) -> Self {
        convert::to_variant(&TypeDescriptor::<T>::new(), value)
    }

    /// Name of the active tag
    pub fn tag_name(&self) -> &'static str {
        match self {
            Variant::Null => "null",
            Variant::Bool(_) => "bool",
            Variant::Int64(_) => "int64",
            Variant::UInt64(_) => "uint64",
            Variant::Double(_) => "double",
            Variant::String(_) => "string",
            Variant::Array(_) => "array",
            Variant::Map(_) => "map",
            Variant::Reference(_) => "reference",
        }
    }

    /// Check for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Variant::Null)
    }

    /// Check for `Bool`
    pub fn is_bool(&self) -> bool {
        matches!(self, Variant::Bool(_))
    }

    /// Check for `Int64` or `UInt64`
    pub fn is_integral(&self) -> bool {
        matches!(self, Variant::Int64(_) | Variant::UInt64(_))
    }

    /// Check for any numeric tag
    pub fn is_number(&self) -> bool {
        matches!(self, Variant::Int64(_) | Variant::UInt64(_) | Variant::Double(_))
    }

    /// Check for `String`
    pub fn is_string(&self) -> bool {
        matches!(self, Variant::String(_))
    }

    /// Check for `Array`
    pub fn is_array(&self) -> bool {
        matches!(self, Variant::Array(_))
    }

    /// Check for `Map`
    pub fn is_map(&self) -> bool {
        matches!(self, Variant::Map(_))
    }

    /// Check for `Reference`
    pub fn is_reference(&self) -> bool {
        matches!(self, Variant::Reference(_))
    }

    // ========================================================================
    // Composite access
    // ========================================================================

    /// Array payload, if this is an array
    pub fn as_array(&self) -> Option<&VariantArray> {
        match self {
            Variant::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Map payload, if this is a map
    pub fn as_map(&self) -> Option<&VariantMap> {
        match self {
            Variant::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Mutable array payload. Any other content is replaced by an empty
    /// array first.
    pub fn as_array_mut(&mut self) -> &mut VariantArray {
        if !self.is_array() {
            *self = Variant::array();
        }
        match self {
            Variant::Array(items) => items,
            _ => unreachable!(),
        }
    }

    /// Mutable map payload. Any other content is replaced by an empty map
    /// first.
    pub fn as_map_mut(&mut self) -> &mut VariantMap {
        if !self.is_map() {
            *self = Variant::map();
        }
        match self {
            Variant::Map(entries) => entries,
            _ => unreachable!(),
        }
    }

    /// Map entry for `key`
    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.as_map()?.get(key)
    }

    /// Mutable map entry for `key`
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Variant> {
        match self {
            Variant::Map(entries) => entries.get_mut(key),
            _ => None,
        }
    }

    /// Array element at `index`
    pub fn at(&self, index: usize) -> Option<&Variant> {
        self.as_array()?.get(index)
    }

    /// Mutable array element at `index`
    pub fn at_mut(&mut self, index: usize) -> Option<&mut Variant> {
        match self {
            Variant::Array(items) => items.get_mut(index),
            _ => None,
        }
    }

    /// Number of elements or entries; zero for scalars
    pub fn len(&self) -> usize {
        match self {
            Variant::Array(items) => items.len(),
            Variant::Map(entries) => entries.len(),
            _ => 0,
        }
    }

    /// Check if there are no elements or entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Typed extraction
    // ========================================================================

    /// Narrow to `T`, falling back to `T`'s default value
    pub fn value<T: NativeType>(&self) -> T {
        self.convert().unwrap_or_else(T::default_value)
    }

    /// Narrow to `T` if representable
    pub fn convert<T: NativeType>(&self) -> Option<T> {
        self.convert_with(&TypeDescriptor::<T>::new())
    }

    /// Narrow to `T` using a specific descriptor
    pub fn convert_with<T: NativeType>(&self, ty: &TypeDescriptor<T>) -> Option<T> {
        let mut target = ty.default_value();
        convert::from_variant(ty, &mut target, self).then_some(target)
    }

    /// Check if the value is representable as `T`
    pub fn can_convert<T: NativeType>(&self) -> bool {
        self.convert::<T>().is_some()
    }

    // ========================================================================
    // Canonical conversions
    // ========================================================================

    /// Convert to boolean
    pub fn to_bool(&self) -> bool {
        match self {
            Variant::Null | Variant::Array(_) | Variant::Map(_) => false,
            Variant::Bool(v) => *v,
            Variant::Int64(v) => v.to_bool(),
            Variant::UInt64(v) => v.to_bool(),
            Variant::Double(v) => v.to_bool(),
            Variant::String(v) => v.to_bool(),
            Variant::Reference(r) => r.read(|t| t.to_bool()).unwrap_or(false),
        }
    }

    /// Convert to a signed 64-bit integer
    pub fn to_i64(&self) -> i64 {
        match self {
            Variant::Null | Variant::Array(_) | Variant::Map(_) => 0,
            Variant::Bool(v) => v.to_i64(),
            Variant::Int64(v) => *v,
            Variant::UInt64(v) => v.to_i64(),
            Variant::Double(v) => v.to_i64(),
            Variant::String(v) => v.to_i64(),
            Variant::Reference(r) => r.read(|t| t.to_i64()).unwrap_or(0),
        }
    }

    /// Convert to an unsigned 64-bit integer
    pub fn to_u64(&self) -> u64 {
        match self {
            Variant::Null | Variant::Array(_) | Variant::Map(_) => 0,
            Variant::Bool(v) => v.to_u64(),
            Variant::Int64(v) => v.to_u64(),
            Variant::UInt64(v) => *v,
            Variant::Double(v) => v.to_u64(),
            Variant::String(v) => v.to_u64(),
            Variant::Reference(r) => r.read(|t| t.to_u64()).unwrap_or(0),
        }
    }

    /// Convert to a double
    pub fn to_f64(&self) -> f64 {
        match self {
            Variant::Null | Variant::Array(_) | Variant::Map(_) => 0.0,
            Variant::Bool(v) => v.to_f64(),
            Variant::Int64(v) => v.to_f64(),
            Variant::UInt64(v) => v.to_f64(),
            Variant::Double(v) => *v,
            Variant::String(v) => v.to_f64(),
            Variant::Reference(r) => r.read(|t| t.to_f64()).unwrap_or(0.0),
        }
    }

    /// Set from string form.
    ///
    /// Scalar tags parse `text` with their own rules; `Null`, arrays and
    /// maps become a `String`.
    pub fn from_string(&mut self, text: &str) -> bool {
        match self {
            Variant::Bool(v) => assign(v, bool::parse(text)),
            Variant::Int64(v) => assign(v, i64::parse(text)),
            Variant::UInt64(v) => assign(v, u64::parse(text)),
            Variant::Double(v) => assign(v, f64::parse(text)),
            Variant::String(v) => assign(v, Some(text.to_string())),
            Variant::Reference(r) => r.write(|t| t.from_string(text)),
            Variant::Null | Variant::Array(_) | Variant::Map(_) => {
                *self = Variant::String(text.to_string());
                true
            }
        }
    }

    /// Set from boolean
    pub fn from_bool(&mut self, value: bool) -> bool {
        match self {
            Variant::Bool(v) => assign(v, Some(value)),
            Variant::Int64(v) => assign(v, i64::from_bool(value)),
            Variant::UInt64(v) => assign(v, u64::from_bool(value)),
            Variant::Double(v) => assign(v, f64::from_bool(value)),
            Variant::String(v) => assign(v, String::from_bool(value)),
            Variant::Reference(r) => r.write(|t| t.from_bool(value)),
            Variant::Null | Variant::Array(_) | Variant::Map(_) => {
                *self = Variant::Bool(value);
                true
            }
        }
    }

    /// Set from a signed 64-bit integer
    pub fn from_i64(&mut self, value: i64) -> bool {
        match self {
            Variant::Bool(v) => assign(v, bool::from_i64(value)),
            Variant::Int64(v) => assign(v, Some(value)),
            Variant::UInt64(v) => assign(v, u64::from_i64(value)),
            Variant::Double(v) => assign(v, f64::from_i64(value)),
            Variant::String(v) => assign(v, String::from_i64(value)),
            Variant::Reference(r) => r.write(|t| t.from_i64(value)),
            Variant::Null | Variant::Array(_) | Variant::Map(_) => {
                *self = Variant::Int64(value);
                true
            }
        }
    }

    /// Set from an unsigned 64-bit integer
    pub fn from_u64(&mut self, value: u64) -> bool {
        match self {
            Variant::Bool(v) => assign(v, bool::from_u64(value)),
            Variant::Int64(v) => assign(v, i64::from_u64(value)),
            Variant::UInt64(v) => assign(v, Some(value)),
            Variant::Double(v) => assign(v, f64::from_u64(value)),
            Variant::String(v) => assign(v, String::from_u64(value)),
            Variant::Reference(r) => r.write(|t| t.from_u64(value)),
            Variant::Null | Variant::Array(_) | Variant::Map(_) => {
                *self = Variant::UInt64(value);
                true
            }
        }
    }

    /// Set from a double
    pub fn from_f64(&mut self, value: f64) -> bool {
        match self {
            Variant::Bool(v) => assign(v, bool::from_f64(value)),
            Variant::Int64(v) => assign(v, i64::from_f64(value)),
            Variant::UInt64(v) => assign(v, u64::from_f64(value)),
            Variant::Double(v) => assign(v, Some(value)),
            Variant::String(v) => assign(v, String::from_f64(value)),
            Variant::Reference(r) => r.write(|t| t.from_f64(value)),
            Variant::Null | Variant::Array(_) | Variant::Map(_) => {
                *self = Variant::Double(value);
                true
            }
        }
    }

    /// Replace the value. A reference forwards `value` to its referent.
    pub fn assign(&mut self, value: &Variant) -> bool {
        match self {
            Variant::Reference(r) => r.write(|t| t.from_variant(value)),
            _ => {
                *self = value.clone();
                true
            }
        }
    }
}

fn assign<T>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

impl Clone for Variant {
    fn clone(&self) -> Self {
        match self {
            Variant::Null => Variant::Null,
            Variant::Bool(v) => Variant::Bool(*v),
            Variant::Int64(v) => Variant::Int64(*v),
            Variant::UInt64(v) => Variant::UInt64(*v),
            Variant::Double(v) => Variant::Double(*v),
            Variant::String(v) => Variant::String(v.clone()),
            Variant::Array(items) => Variant::Array(items.clone()),
            Variant::Map(entries) => Variant::Map(entries.clone()),
            Variant::Reference(r) => r.get(),
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::Reference(a), _) => a.get() == *other,
            (_, Variant::Reference(b)) => *self == b.get(),
            (Variant::Null, Variant::Null) => true,
            (Variant::Bool(a), Variant::Bool(b)) => a == b,
            (Variant::Int64(a), Variant::Int64(b)) => a == b,
            (Variant::UInt64(a), Variant::UInt64(b)) => a == b,
            (Variant::Int64(a), Variant::UInt64(b)) => u64::try_from(*a) == Ok(*b),
            (Variant::UInt64(a), Variant::Int64(b)) => u64::try_from(*b) == Ok(*a),
            (Variant::Double(a), Variant::Double(b)) => a == b,
            (Variant::String(a), Variant::String(b)) => a == b,
            (Variant::Array(a), Variant::Array(b)) => a == b,
            (Variant::Map(a), Variant::Map(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Null => Ok(()),
            Variant::Bool(v) => write!(f, "{}", v),
            Variant::Int64(v) => write!(f, "{}", v),
            Variant::UInt64(v) => write!(f, "{}", v),
            Variant::Double(v) => write!(f, "{}", v),
            Variant::String(v) => f.write_str(v),
            Variant::Array(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Variant::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Variant::Reference(r) => write!(f, "{}", r.get()),
        }
    }
}

// ============================================================================
// Construction
// ============================================================================

macro_rules! impl_from_scalar {
    ($($ty:ty => $tag:ident as $repr:ty),* $(,)?) => {
        $(
            impl From<$ty> for Variant {
                fn from(value: $ty) -> Self {
                    Variant::$tag(value as $repr)
                }
            }
        )*
    };
}

impl_from_scalar! {
    i8 => Int64 as i64,
    i16 => Int64 as i64,
    i32 => Int64 as i64,
    i64 => Int64 as i64,
    u8 => UInt64 as u64,
    u16 => UInt64 as u64,
    u32 => UInt64 as u64,
    u64 => UInt64 as u64,
    f32 => Double as f64,
    f64 => Double as f64,
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::String(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.to_string())
    }
}

impl From<VariantArray> for Variant {
    fn from(value: VariantArray) -> Self {
        Variant::Array(value)
    }
}

impl From<VariantMap> for Variant {
    fn from(value: VariantMap) -> Self {
        Variant::Map(value)
    }
}

impl From<VariantRef> for Variant {
    fn from(value: VariantRef) -> Self {
        Variant::Reference(value)
    }
}

impl FromIterator<Variant> for Variant {
    fn from_iter<I: IntoIterator<Item = Variant>>(iter: I) -> Self {
        Variant::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Variant)> for Variant {
    fn from_iter<I: IntoIterator<Item = (K, Variant)>>(iter: I) -> Self {
        Variant::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ============================================================================
// Variant as a native type
// ============================================================================

impl NativeType for Variant {
    type Element = Variant;

    fn type_name() -> String {
        "Variant".to_string()
    }

    fn kind() -> TypeKind {
        TypeKind::VARIANT
    }

    fn default_value() -> Self {
        Variant::Null
    }

    fn format(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Option<Self> {
        Some(Variant::String(text.to_string()))
    }

    fn to_bool(&self) -> bool {
        Variant::to_bool(self)
    }

    fn from_bool(value: bool) -> Option<Self> {
        Some(Variant::Bool(value))
    }

    fn to_i64(&self) -> i64 {
        Variant::to_i64(self)
    }

    fn from_i64(value: i64) -> Option<Self> {
        Some(Variant::Int64(value))
    }

    fn to_u64(&self) -> u64 {
        Variant::to_u64(self)
    }

    fn from_u64(value: u64) -> Option<Self> {
        Some(Variant::UInt64(value))
    }

    fn to_f64(&self) -> f64 {
        Variant::to_f64(self)
    }

    fn from_f64(value: f64) -> Option<Self> {
        Some(Variant::Double(value))
    }

    fn num_elements(&self) -> usize {
        self.len()
    }

    fn element(&self, index: usize) -> Option<Variant> {
        self.at(index).cloned()
    }

    fn set_element(&mut self, index: usize, value: Variant) -> bool {
        match self.at_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn keys(&self) -> Vec<String> {
        match self {
            Variant::Map(entries) => entries.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn entry(&self, key: &str) -> Option<Variant> {
        self.get(key).cloned()
    }

    fn set_entry(&mut self, key: &str, value: Variant) -> bool {
        match self {
            Variant::Map(entries) => {
                entries.insert(key.to_string(), value);
                true
            }
            _ => false,
        }
    }
}
