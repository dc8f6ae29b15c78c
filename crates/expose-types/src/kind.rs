//! Category flags describing the shape of a native type

use std::fmt;

/// Set of category flags for a native type.
///
/// Flags combine: a `u16` is `INTEGRAL | UNSIGNED`, a `Vec<f32>` is
/// `ARRAY | DYNAMIC_ARRAY`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeKind(u16);

impl TypeKind {
    /// No flags set
    pub const NONE: TypeKind = TypeKind(0);
    /// `bool`
    pub const BOOLEAN: TypeKind = TypeKind(1 << 0);
    /// Integer types
    pub const INTEGRAL: TypeKind = TypeKind(1 << 1);
    /// Signed numbers
    pub const SIGNED: TypeKind = TypeKind(1 << 2);
    /// Unsigned integers
    pub const UNSIGNED: TypeKind = TypeKind(1 << 3);
    /// `f32` / `f64`
    pub const FLOATING_POINT: TypeKind = TypeKind(1 << 4);
    /// `String`
    pub const STRING: TypeKind = TypeKind(1 << 5);
    /// Indexed sequence of elements
    pub const ARRAY: TypeKind = TypeKind(1 << 6);
    /// Array that can grow
    pub const DYNAMIC_ARRAY: TypeKind = TypeKind(1 << 7);
    /// String-keyed map
    pub const MAP: TypeKind = TypeKind(1 << 8);
    /// Enumeration with symbolic names
    pub const ENUM: TypeKind = TypeKind(1 << 9);
    /// Type-erased variant value
    pub const VARIANT: TypeKind = TypeKind(1 << 10);
    /// Reflection object (group of properties)
    pub const OBJECT: TypeKind = TypeKind(1 << 11);

    const NAMES: [(TypeKind, &'static str); 12] = [
        (TypeKind::BOOLEAN, "boolean"),
        (TypeKind::INTEGRAL, "integral"),
        (TypeKind::SIGNED, "signed"),
        (TypeKind::UNSIGNED, "unsigned"),
        (TypeKind::FLOATING_POINT, "floating-point"),
        (TypeKind::STRING, "string"),
        (TypeKind::ARRAY, "array"),
        (TypeKind::DYNAMIC_ARRAY, "dynamic-array"),
        (TypeKind::MAP, "map"),
        (TypeKind::ENUM, "enum"),
        (TypeKind::VARIANT, "variant"),
        (TypeKind::OBJECT, "object"),
    ];

    /// Combine two flag sets
    #[inline]
    pub const fn union(self, other: TypeKind) -> TypeKind {
        TypeKind(self.0 | other.0)
    }

    /// Check if every flag of `other` is set
    #[inline]
    pub const fn contains(self, other: TypeKind) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Raw bits
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Check if no flag is set
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check for `BOOLEAN`
    pub const fn is_boolean(self) -> bool {
        self.contains(TypeKind::BOOLEAN)
    }

    /// Integral or floating point
    pub const fn is_number(self) -> bool {
        self.is_integral() || self.is_floating_point()
    }

    /// Check for `INTEGRAL`
    pub const fn is_integral(self) -> bool {
        self.contains(TypeKind::INTEGRAL)
    }

    /// Check for `SIGNED`
    pub const fn is_signed(self) -> bool {
        self.contains(TypeKind::SIGNED)
    }

    /// Check for `UNSIGNED`
    pub const fn is_unsigned(self) -> bool {
        self.contains(TypeKind::UNSIGNED)
    }

    /// Check for `FLOATING_POINT`
    pub const fn is_floating_point(self) -> bool {
        self.contains(TypeKind::FLOATING_POINT)
    }

    /// Check for `STRING`
    pub const fn is_string(self) -> bool {
        self.contains(TypeKind::STRING)
    }

    /// Check for `ARRAY`
    pub const fn is_array(self) -> bool {
        self.contains(TypeKind::ARRAY)
    }

    /// Check for `DYNAMIC_ARRAY`
    pub const fn is_dynamic_array(self) -> bool {
        self.contains(TypeKind::DYNAMIC_ARRAY)
    }

    /// Check for `MAP`
    pub const fn is_map(self) -> bool {
        self.contains(TypeKind::MAP)
    }

    /// Check for `ENUM`
    pub const fn is_enum(self) -> bool {
        self.contains(TypeKind::ENUM)
    }

    /// Check for `VARIANT`
    pub const fn is_variant(self) -> bool {
        self.contains(TypeKind::VARIANT)
    }

    /// Check for `OBJECT`
    pub const fn is_object(self) -> bool {
        self.contains(TypeKind::OBJECT)
    }
}

impl std::ops::BitOr for TypeKind {
    type Output = TypeKind;

    fn bitor(self, rhs: TypeKind) -> TypeKind {
        self.union(rhs)
    }
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKind({})", self)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut first = true;
        for (flag, name) in TypeKind::NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}
