//! Canonical conversion rules for native Rust types
//!
//! `NativeType` is the per-type rule set behind every descriptor: the type
//! name, category flags, default and range, the five canonical conversion
//! pairs and, for composites, element access.
//!
//! # Overflow policy
//!
//! All integer conversions saturate at the target range. `300` assigned to a
//! `u8` becomes `255`, `-1` assigned to a `u32` becomes `0`. Floats convert to
//! integers by truncating toward zero and then saturating. NaN has no integer
//! or boolean representation, so those conversions fail.

use std::collections::BTreeMap;
use std::fmt;

use crate::kind::TypeKind;

/// Conversion rules for one native type.
///
/// `from_*` functions return `None` when the input has no representation in
/// the type; callers keep their previous value in that case.
pub trait NativeType: Clone + PartialEq + fmt::Debug + 'static {
    /// Element type for arrays and maps (`Self` for scalars)
    type Element: NativeType;

    /// Human readable type name
    fn type_name() -> String;

    /// Category flags
    fn kind() -> TypeKind;

    /// Default value
    fn default_value() -> Self;

    /// Smallest representable value, for fixed-range numbers
    fn minimum_value() -> Option<Self> {
        None
    }

    /// Largest representable value, for fixed-range numbers
    fn maximum_value() -> Option<Self> {
        None
    }

    /// Built-in symbolic names (enumerations)
    fn symbolic_names() -> Vec<(Self, String)> {
        Vec::new()
    }

    /// Generic string form
    fn format(&self) -> String;

    /// Parse the generic string form
    fn parse(text: &str) -> Option<Self>;

    /// String form as an item of a list or map
    fn format_item(&self) -> String {
        self.format()
    }

    /// Parse one item of a list or map
    fn parse_item(text: &str) -> Option<Self> {
        Self::parse(text)
    }

    /// Convert to boolean
    fn to_bool(&self) -> bool;

    /// Convert from boolean
    fn from_bool(value: bool) -> Option<Self>;

    /// Convert to a signed 64-bit integer
    fn to_i64(&self) -> i64;

    /// Convert from a signed 64-bit integer
    fn from_i64(value: i64) -> Option<Self>;

    /// Convert to an unsigned 64-bit integer
    fn to_u64(&self) -> u64;

    /// Convert from an unsigned 64-bit integer
    fn from_u64(value: u64) -> Option<Self>;

    /// Convert to a double
    fn to_f64(&self) -> f64;

    /// Convert from a double
    fn from_f64(value: f64) -> Option<Self>;

    /// Number of elements (arrays and maps)
    fn num_elements(&self) -> usize {
        0
    }

    /// Element at index (arrays)
    fn element(&self, _index: usize) -> Option<Self::Element> {
        None
    }

    /// Replace element at index (arrays)
    fn set_element(&mut self, _index: usize, _value: Self::Element) -> bool {
        false
    }

    /// Append an element (dynamic arrays only)
    fn push(&mut self, _value: Self::Element) -> bool {
        false
    }

    /// Keys in iteration order (maps)
    fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    /// Entry for key (maps)
    fn entry(&self, _key: &str) -> Option<Self::Element> {
        None
    }

    /// Insert or replace an entry (maps)
    fn set_entry(&mut self, _key: &str, _value: Self::Element) -> bool {
        false
    }
}

// ============================================================================
// Shared parsing helpers
// ============================================================================

/// Parse a boolean word or digit (`true`, `False`, `1`, `0`)
pub fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

/// Parse integer text into `i128`, falling back to truncated float text
pub fn parse_integer(text: &str) -> Option<i128> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i128>() {
        return Some(v);
    }
    let f = text.parse::<f64>().ok()?;
    if !f.is_finite() {
        return None;
    }
    // float -> int `as` casts truncate and saturate
    Some(f as i128)
}

/// Characters that force an item to be quoted inside a list or map form
const RESERVED: &[char] = &[',', ':', '(', ')', '[', ']', '{', '}', '"', '\\'];

/// Bracket depth and quoting state while scanning a list or map body
#[derive(Default)]
struct Scanner {
    depth: i32,
    quoted: bool,
    escaped: bool,
}

impl Scanner {
    /// Feed one character. Returns `Some(true)` for a character outside
    /// quotes and brackets, `None` for a closing bracket with no opening one.
    fn step(&mut self, c: char) -> Option<bool> {
        if self.quoted {
            match c {
                _ if self.escaped => self.escaped = false,
                '\\' => self.escaped = true,
                '"' => self.quoted = false,
                _ => {}
            }
            return Some(false);
        }
        match c {
            '"' => self.quoted = true,
            '(' | '[' | '{' => self.depth += 1,
            ')' | ']' | '}' => {
                self.depth -= 1;
                if self.depth < 0 {
                    return None;
                }
            }
            _ => return Some(self.depth == 0),
        }
        Some(false)
    }

    fn balanced(&self) -> bool {
        self.depth == 0 && !self.quoted
    }
}

/// Split `items` at top-level commas, ignoring commas nested in brackets
/// or quotes.
///
/// Returns an empty list for blank input and `None` for unbalanced
/// brackets or an unterminated quote.
pub fn split_top_level(items: &str) -> Option<Vec<&str>> {
    if items.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut parts = Vec::new();
    let mut scanner = Scanner::default();
    let mut start = 0;
    for (i, c) in items.char_indices() {
        if scanner.step(c)? && c == ',' {
            parts.push(items[start..i].trim());
            start = i + 1;
        }
    }
    if !scanner.balanced() {
        return None;
    }
    parts.push(items[start..].trim());
    Some(parts)
}

/// Split a map item at its first top-level `:`
pub fn split_key_value(item: &str) -> Option<(&str, &str)> {
    let mut scanner = Scanner::default();
    for (i, c) in item.char_indices() {
        if scanner.step(c)? && c == ':' {
            return Some((item[..i].trim(), item[i + 1..].trim()));
        }
    }
    None
}

/// Quote `text` if it would not survive as a bare list or map item.
///
/// Inside quotes, `"` and `\` are escaped with a backslash.
pub fn quote_item(text: &str) -> String {
    if !text.is_empty() && text.trim() == text && !text.contains(RESERVED) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Reverse of [`quote_item`]. Bare items must be non-empty and free of
/// reserved characters.
pub fn unquote_item(text: &str) -> Option<String> {
    let text = text.trim();
    let Some(body) = text.strip_prefix('"') else {
        if text.is_empty() || text.contains(RESERVED) {
            return None;
        }
        return Some(text.to_string());
    };
    let body = body.strip_suffix('"')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?),
            '"' => return None,
            _ => out.push(c),
        }
    }
    Some(out)
}

/// Strip `open`/`close` delimiters around `text`
pub fn strip_delimiters(text: &str, open: char, close: char) -> Option<&str> {
    text.trim().strip_prefix(open)?.strip_suffix(close)
}

fn format_list<I: Iterator<Item = String>>(items: I) -> String {
    let body: Vec<String> = items.collect();
    format!("({})", body.join(", "))
}

// ============================================================================
// Scalars
// ============================================================================

impl NativeType for bool {
    type Element = bool;

    fn type_name() -> String {
        "bool".to_string()
    }

    fn kind() -> TypeKind {
        TypeKind::BOOLEAN
    }

    fn default_value() -> Self {
        false
    }

    fn format(&self) -> String {
        let text = if *self { "true" } else { "false" };
        text.to_string()
    }

    fn parse(text: &str) -> Option<Self> {
        parse_bool(text)
    }

    fn to_bool(&self) -> bool {
        *self
    }

    fn from_bool(value: bool) -> Option<Self> {
        Some(value)
    }

    fn to_i64(&self) -> i64 {
        *self as i64
    }

    fn from_i64(value: i64) -> Option<Self> {
        Some(value != 0)
    }

    fn to_u64(&self) -> u64 {
        *self as u64
    }

    fn from_u64(value: u64) -> Option<Self> {
        Some(value != 0)
    }

    fn to_f64(&self) -> f64 {
        if *self { 1.0 } else { 0.0 }
    }

    fn from_f64(value: f64) -> Option<Self> {
        if value.is_nan() {
            None
        } else {
            Some(value != 0.0)
        }
    }
}

macro_rules! impl_integral {
    ($ty:ty, $kind:expr) => {
        impl NativeType for $ty {
            type Element = $ty;

            fn type_name() -> String {
                stringify!($ty).to_string()
            }

            fn kind() -> TypeKind {
                $kind
            }

            fn default_value() -> Self {
                0
            }

            fn minimum_value() -> Option<Self> {
                Some(<$ty>::MIN)
            }

            fn maximum_value() -> Option<Self> {
                Some(<$ty>::MAX)
            }

            fn format(&self) -> String {
                self.to_string()
            }

            fn parse(text: &str) -> Option<Self> {
                parse_integer(text).map(|v| saturate::<$ty>(v))
            }

            fn to_bool(&self) -> bool {
                *self != 0
            }

            fn from_bool(value: bool) -> Option<Self> {
                Some(value as $ty)
            }

            fn to_i64(&self) -> i64 {
                (*self as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
            }

            fn from_i64(value: i64) -> Option<Self> {
                Some(saturate::<$ty>(value as i128))
            }

            fn to_u64(&self) -> u64 {
                (*self as i128).clamp(0, u64::MAX as i128) as u64
            }

            fn from_u64(value: u64) -> Option<Self> {
                Some(saturate::<$ty>(value as i128))
            }

            fn to_f64(&self) -> f64 {
                *self as f64
            }

            fn from_f64(value: f64) -> Option<Self> {
                if value.is_nan() {
                    None
                } else {
                    Some(value as $ty)
                }
            }
        }

        impl Saturate for $ty {
            fn saturate_from(value: i128) -> Self {
                value.clamp(<$ty>::MIN as i128, <$ty>::MAX as i128) as $ty
            }
        }
    };
}

/// Clamp an `i128` into an integer type's range
pub trait Saturate {
    /// Saturating conversion
    fn saturate_from(value: i128) -> Self;
}

/// Saturate `value` into the range of `T`
pub fn saturate<T: Saturate>(value: i128) -> T {
    T::saturate_from(value)
}

impl_integral!(i8, TypeKind::INTEGRAL.union(TypeKind::SIGNED));
impl_integral!(i16, TypeKind::INTEGRAL.union(TypeKind::SIGNED));
impl_integral!(i32, TypeKind::INTEGRAL.union(TypeKind::SIGNED));
impl_integral!(i64, TypeKind::INTEGRAL.union(TypeKind::SIGNED));
impl_integral!(u8, TypeKind::INTEGRAL.union(TypeKind::UNSIGNED));
impl_integral!(u16, TypeKind::INTEGRAL.union(TypeKind::UNSIGNED));
impl_integral!(u32, TypeKind::INTEGRAL.union(TypeKind::UNSIGNED));
impl_integral!(u64, TypeKind::INTEGRAL.union(TypeKind::UNSIGNED));

macro_rules! impl_floating_point {
    ($ty:ty) => {
        impl NativeType for $ty {
            type Element = $ty;

            fn type_name() -> String {
                stringify!($ty).to_string()
            }

            fn kind() -> TypeKind {
                TypeKind::FLOATING_POINT | TypeKind::SIGNED
            }

            fn default_value() -> Self {
                0.0
            }

            fn minimum_value() -> Option<Self> {
                Some(<$ty>::MIN)
            }

            fn maximum_value() -> Option<Self> {
                Some(<$ty>::MAX)
            }

            fn format(&self) -> String {
                self.to_string()
            }

            fn parse(text: &str) -> Option<Self> {
                text.trim().parse::<$ty>().ok()
            }

            fn to_bool(&self) -> bool {
                *self != 0.0
            }

            fn from_bool(value: bool) -> Option<Self> {
                Some(if value { 1.0 } else { 0.0 })
            }

            fn to_i64(&self) -> i64 {
                *self as i64
            }

            fn from_i64(value: i64) -> Option<Self> {
                Some(value as $ty)
            }

            fn to_u64(&self) -> u64 {
                *self as u64
            }

            fn from_u64(value: u64) -> Option<Self> {
                Some(value as $ty)
            }

            fn to_f64(&self) -> f64 {
                *self as f64
            }

            fn from_f64(value: f64) -> Option<Self> {
                if value.is_finite() {
                    Some(value.clamp(<$ty>::MIN as f64, <$ty>::MAX as f64) as $ty)
                } else {
                    Some(value as $ty)
                }
            }
        }
    };
}

impl_floating_point!(f32);
impl_floating_point!(f64);

impl NativeType for String {
    type Element = String;

    fn type_name() -> String {
        "String".to_string()
    }

    fn kind() -> TypeKind {
        TypeKind::STRING
    }

    fn default_value() -> Self {
        String::new()
    }

    fn format(&self) -> String {
        self.clone()
    }

    fn parse(text: &str) -> Option<Self> {
        Some(text.to_string())
    }

    fn format_item(&self) -> String {
        quote_item(self)
    }

    fn parse_item(text: &str) -> Option<Self> {
        unquote_item(text)
    }

    fn to_bool(&self) -> bool {
        parse_bool(self).unwrap_or(false)
    }

    fn from_bool(value: bool) -> Option<Self> {
        Some(value.format())
    }

    fn to_i64(&self) -> i64 {
        parse_integer(self).map(saturate::<i64>).unwrap_or(0)
    }

    fn from_i64(value: i64) -> Option<Self> {
        Some(value.to_string())
    }

    fn to_u64(&self) -> u64 {
        parse_integer(self).map(saturate::<u64>).unwrap_or(0)
    }

    fn from_u64(value: u64) -> Option<Self> {
        Some(value.to_string())
    }

    fn to_f64(&self) -> f64 {
        self.trim().parse::<f64>().unwrap_or(0.0)
    }

    fn from_f64(value: f64) -> Option<Self> {
        Some(value.to_string())
    }
}

// ============================================================================
// Composites
// ============================================================================

impl<E: NativeType, const N: usize> NativeType for [E; N] {
    type Element = E;

    fn type_name() -> String {
        format!("[{}; {}]", E::type_name(), N)
    }

    fn kind() -> TypeKind {
        TypeKind::ARRAY
    }

    fn default_value() -> Self {
        std::array::from_fn(|_| E::default_value())
    }

    fn format(&self) -> String {
        format_list(self.iter().map(|e| e.format_item()))
    }

    fn parse(text: &str) -> Option<Self> {
        let items = split_top_level(strip_delimiters(text, '(', ')')?)?;
        if items.len() != N {
            return None;
        }
        let mut out = Self::default_value();
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = E::parse_item(item)?;
        }
        Some(out)
    }

    fn to_bool(&self) -> bool {
        false
    }

    fn from_bool(_value: bool) -> Option<Self> {
        None
    }

    fn to_i64(&self) -> i64 {
        0
    }

    fn from_i64(_value: i64) -> Option<Self> {
        None
    }

    fn to_u64(&self) -> u64 {
        0
    }

    fn from_u64(_value: u64) -> Option<Self> {
        None
    }

    fn to_f64(&self) -> f64 {
        0.0
    }

    fn from_f64(_value: f64) -> Option<Self> {
        None
    }

    fn num_elements(&self) -> usize {
        N
    }

    fn element(&self, index: usize) -> Option<E> {
        self.get(index).cloned()
    }

    fn set_element(&mut self, index: usize, value: E) -> bool {
        match self.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl<E: NativeType> NativeType for Vec<E> {
    type Element = E;

    fn type_name() -> String {
        format!("Vec<{}>", E::type_name())
    }

    fn kind() -> TypeKind {
        TypeKind::ARRAY | TypeKind::DYNAMIC_ARRAY
    }

    fn default_value() -> Self {
        Vec::new()
    }

    fn format(&self) -> String {
        format_list(self.iter().map(|e| e.format_item()))
    }

    fn parse(text: &str) -> Option<Self> {
        split_top_level(strip_delimiters(text, '(', ')')?)?
            .into_iter()
            .map(E::parse_item)
            .collect()
    }

    fn to_bool(&self) -> bool {
        false
    }

    fn from_bool(_value: bool) -> Option<Self> {
        None
    }

    fn to_i64(&self) -> i64 {
        0
    }

    fn from_i64(_value: i64) -> Option<Self> {
        None
    }

    fn to_u64(&self) -> u64 {
        0
    }

    fn from_u64(_value: u64) -> Option<Self> {
        None
    }

    fn to_f64(&self) -> f64 {
        0.0
    }

    fn from_f64(_value: f64) -> Option<Self> {
        None
    }

    fn num_elements(&self) -> usize {
        self.len()
    }

    fn element(&self, index: usize) -> Option<E> {
        self.get(index).cloned()
    }

    fn set_element(&mut self, index: usize, value: E) -> bool {
        match self.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn push(&mut self, value: E) -> bool {
        Vec::push(self, value);
        true
    }
}

impl<E: NativeType> NativeType for BTreeMap<String, E> {
    type Element = E;

    fn type_name() -> String {
        format!("BTreeMap<String, {}>", E::type_name())
    }

    fn kind() -> TypeKind {
        TypeKind::MAP
    }

    fn default_value() -> Self {
        BTreeMap::new()
    }

    fn format(&self) -> String {
        let body: Vec<String> = self
            .iter()
            .map(|(k, v)| format!("{}: {}", quote_item(k), v.format_item()))
            .collect();
        format!("{{{}}}", body.join(", "))
    }

    fn parse(text: &str) -> Option<Self> {
        let mut out = BTreeMap::new();
        for item in split_top_level(strip_delimiters(text, '{', '}')?)? {
            let (key, value) = split_key_value(item)?;
            out.insert(unquote_item(key)?, E::parse_item(value)?);
        }
        Some(out)
    }

    fn to_bool(&self) -> bool {
        false
    }

    fn from_bool(_value: bool) -> Option<Self> {
        None
    }

    fn to_i64(&self) -> i64 {
        0
    }

    fn from_i64(_value: i64) -> Option<Self> {
        None
    }

    fn to_u64(&self) -> u64 {
        0
    }

    fn from_u64(_value: u64) -> Option<Self> {
        None
    }

    fn to_f64(&self) -> f64 {
        0.0
    }

    fn from_f64(_value: f64) -> Option<Self> {
        None
    }

    fn num_elements(&self) -> usize {
        self.len()
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }

    fn entry(&self, key: &str) -> Option<E> {
        self.get(key).cloned()
    }

    fn set_entry(&mut self, key: &str, value: E) -> bool {
        self.insert(key.to_string(), value);
        true
    }
}

// ============================================================================
// Enumerations
// ============================================================================

/// Implement [`NativeType`] for a fieldless enum.
///
/// The enum must be `Clone + Copy + PartialEq + Debug` with an explicit
/// integer representation. Variant names become the built-in symbolic names
/// and the first variant is the default value.
///
/// ```ignore
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// #[repr(i32)]
/// enum Mood { Neutral = 0, Happy = 1, Sad = -1 }
///
/// native_enum!(Mood: i32 { Neutral, Happy, Sad });
/// ```
#[macro_export]
macro_rules! native_enum {
    ($ty:ident : $repr:ty { $first:ident $(, $variant:ident)* $(,)? }) => {
        impl $crate::NativeType for $ty {
            type Element = $ty;

            fn type_name() -> String {
                stringify!($ty).to_string()
            }

            fn kind() -> $crate::TypeKind {
                $crate::TypeKind::ENUM
            }

            fn default_value() -> Self {
                $ty::$first
            }

            fn symbolic_names() -> Vec<(Self, String)> {
                vec![
                    ($ty::$first, stringify!($first).to_string()),
                    $(($ty::$variant, stringify!($variant).to_string()),)*
                ]
            }

            fn format(&self) -> String {
                (*self as $repr).to_string()
            }

            fn parse(text: &str) -> Option<Self> {
                let value = text.trim().parse::<i64>().ok()?;
                <Self as $crate::NativeType>::from_i64(value)
            }

            fn format_item(&self) -> String {
                <Self as $crate::NativeType>::symbolic_names()
                    .into_iter()
                    .find(|(value, _)| value == self)
                    .map(|(_, name)| name)
                    .unwrap_or_else(|| <Self as $crate::NativeType>::format(self))
            }

            fn parse_item(text: &str) -> Option<Self> {
                let text = text.trim();
                <Self as $crate::NativeType>::symbolic_names()
                    .into_iter()
                    .find(|(_, name)| name == text)
                    .map(|(value, _)| value)
                    .or_else(|| <Self as $crate::NativeType>::parse(text))
            }

            fn to_bool(&self) -> bool {
                (*self as $repr) != 0
            }

            fn from_bool(value: bool) -> Option<Self> {
                <Self as $crate::NativeType>::from_i64(value as i64)
            }

            fn to_i64(&self) -> i64 {
                (*self as $repr) as i64
            }

            fn from_i64(value: i64) -> Option<Self> {
                if value == ($ty::$first as $repr) as i64 {
                    return Some($ty::$first);
                }
                $(
                    if value == ($ty::$variant as $repr) as i64 {
                        return Some($ty::$variant);
                    }
                )*
                None
            }

            fn to_u64(&self) -> u64 {
                let value = <Self as $crate::NativeType>::to_i64(self);
                if value < 0 { 0 } else { value as u64 }
            }

            fn from_u64(value: u64) -> Option<Self> {
                let value = i64::try_from(value).ok()?;
                <Self as $crate::NativeType>::from_i64(value)
            }

            fn to_f64(&self) -> f64 {
                (*self as $repr) as f64
            }

            fn from_f64(value: f64) -> Option<Self> {
                if value.fract() != 0.0 || !value.is_finite() {
                    return None;
                }
                <Self as $crate::NativeType>::from_i64(value as i64)
            }
        }
    };
}
