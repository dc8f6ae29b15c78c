//! Native value <-> Variant conversion
//!
//! One rule set shared by `Variant::value`, `Variant::from_value` and every
//! typed accessor. Scalars map to their natural tag, enumerations to their
//! symbolic name (numeric when unnamed), arrays and maps element-wise.

use std::any::Any;

use expose_types::{NativeType, TypeDescriptor};

use crate::variant::{Variant, VariantMap};

/// Convert a native value to a variant
pub fn to_variant<T: NativeType>(ty: &TypeDescriptor<T>, value: &T) -> Variant {
    let kind = ty.kind();

    if kind.is_variant() {
        return (value as &dyn Any)
            .downcast_ref::<Variant>()
            .cloned()
            .unwrap_or_default();
    }

    if kind.is_enum() {
        return match ty.name_of(value) {
            Some(name) => Variant::String(name.to_string()),
            None => Variant::Int64(ty.to_i64(value)),
        };
    }

    if kind.is_map() {
        let element_ty = TypeDescriptor::<T::Element>::new();
        let entries: VariantMap = ty
            .keys(value)
            .into_iter()
            .filter_map(|key| {
                let element = ty.entry(value, &key)?;
                Some((key, to_variant(&element_ty, &element)))
            })
            .collect();
        return Variant::Map(entries);
    }

    if kind.is_array() {
        let element_ty = TypeDescriptor::<T::Element>::new();
        return (0..ty.num_elements(value))
            .filter_map(|i| ty.element(value, i))
            .map(|element| to_variant(&element_ty, &element))
            .collect();
    }

    if kind.is_boolean() {
        Variant::Bool(ty.to_bool(value))
    } else if kind.is_integral() && kind.is_unsigned() {
        Variant::UInt64(ty.to_u64(value))
    } else if kind.is_integral() {
        Variant::Int64(ty.to_i64(value))
    } else if kind.is_floating_point() {
        Variant::Double(ty.to_f64(value))
    } else {
        Variant::String(ty.to_string(value))
    }
}

/// Set a native value from a variant.
///
/// `target` is replaced only if the whole value converts; fixed-size arrays
/// require exactly as many elements as they hold. `Null` converts to
/// nothing.
pub fn from_variant<T: NativeType>(ty: &TypeDescriptor<T>, target: &mut T, value: &Variant) -> bool {
    if let Variant::Reference(link) = value {
        return from_variant(ty, target, &link.get());
    }

    let kind = ty.kind();

    if kind.is_variant() {
        return match (target as &mut dyn Any).downcast_mut::<Variant>() {
            Some(slot) => {
                *slot = value.clone();
                true
            }
            None => false,
        };
    }

    if kind.is_map() {
        return map_from_variant(ty, target, value);
    }

    if kind.is_array() {
        return array_from_variant(ty, target, value);
    }

    match value {
        Variant::Bool(v) => ty.from_bool(target, *v),
        Variant::Int64(v) => ty.from_i64(target, *v),
        Variant::UInt64(v) => ty.from_u64(target, *v),
        Variant::Double(v) => ty.from_f64(target, *v),
        Variant::String(v) => ty.from_string(target, v),
        Variant::Null | Variant::Array(_) | Variant::Map(_) | Variant::Reference(_) => false,
    }
}

fn array_from_variant<T: NativeType>(ty: &TypeDescriptor<T>, target: &mut T, value: &Variant) -> bool {
    let Some(items) = value.as_array() else {
        return false;
    };
    let element_ty = TypeDescriptor::<T::Element>::new();
    let mut out = ty.default_value();

    if ty.is_dynamic_array() {
        for item in items {
            let mut element = element_ty.default_value();
            if !from_variant(&element_ty, &mut element, item) || !ty.push(&mut out, element) {
                return false;
            }
        }
    } else {
        if items.len() != ty.num_elements(&out) {
            return false;
        }
        for (i, item) in items.iter().enumerate() {
            let mut element = ty
                .element(&out, i)
                .unwrap_or_else(|| element_ty.default_value());
            if !from_variant(&element_ty, &mut element, item) || !ty.set_element(&mut out, i, element) {
                return false;
            }
        }
    }

    *target = out;
    true
}

fn map_from_variant<T: NativeType>(ty: &TypeDescriptor<T>, target: &mut T, value: &Variant) -> bool {
    let Some(entries) = value.as_map() else {
        return false;
    };
    let element_ty = TypeDescriptor::<T::Element>::new();
    let mut out = ty.default_value();

    for (key, item) in entries {
        let mut element = element_ty.default_value();
        if !from_variant(&element_ty, &mut element, item) || !ty.set_entry(&mut out, key, element) {
            return false;
        }
    }

    *target = out;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_scalar_tags() {
        assert_eq!(to_variant(&TypeDescriptor::new(), &true), Variant::Bool(true));
        assert_eq!(to_variant(&TypeDescriptor::new(), &-4i8), Variant::Int64(-4));
        assert_eq!(to_variant(&TypeDescriptor::new(), &4u16), Variant::UInt64(4));
        assert_eq!(to_variant(&TypeDescriptor::new(), &0.5f32), Variant::Double(0.5));
        assert_eq!(
            to_variant(&TypeDescriptor::new(), &"hi".to_string()),
            Variant::String("hi".to_string())
        );
    }

    #[test]
    fn test_named_integer_stays_numeric() {
        let ty = TypeDescriptor::<i32>::with_named_values(vec![(1, "one".to_string())]);
        assert_eq!(to_variant(&ty, &1), Variant::Int64(1));

        let mut v = 0;
        assert!(from_variant(&ty, &mut v, &Variant::from("one")));
        assert_eq!(v, 1);
    }

    #[test]
    fn test_map_round_trip() {
        let mut m = BTreeMap::new();
        m.insert("a".to_string(), vec![1u8, 2]);
        m.insert("b".to_string(), Vec::new());
        let ty = TypeDescriptor::<BTreeMap<String, Vec<u8>>>::new();

        let v = to_variant(&ty, &m);
        assert_eq!(v.get("a").and_then(|a| a.at(1)), Some(&Variant::UInt64(2)));

        let mut back = BTreeMap::new();
        assert!(from_variant(&ty, &mut back, &v));
        assert_eq!(back, m);
    }

    #[test]
    fn test_partial_failure_keeps_target() {
        let ty = TypeDescriptor::<Vec<i32>>::new();
        let mut target = vec![9];
        let bad: Variant = vec![Variant::from(1), Variant::from("x")].into();
        assert!(!from_variant(&ty, &mut target, &bad));
        assert_eq!(target, vec![9]);
    }

    #[test]
    fn test_fixed_array_length_must_match() {
        let ty = TypeDescriptor::<[f64; 2]>::new();
        let mut target = [1.0, 2.0];
        let short: Variant = vec![Variant::from(3.0)].into();
        assert!(!from_variant(&ty, &mut target, &short));
        assert_eq!(target, [1.0, 2.0]);
    }

    #[test]
    fn test_null_converts_to_nothing() {
        let ty = TypeDescriptor::<String>::new();
        let mut target = "keep".to_string();
        assert!(!from_variant(&ty, &mut target, &Variant::Null));
        assert_eq!(target, "keep");
    }

    #[test]
    fn test_variant_target_takes_any_value() {
        let ty = TypeDescriptor::<Variant>::new();
        let mut target = Variant::Null;
        let source: Variant = vec![Variant::from(1)].into();
        assert!(from_variant(&ty, &mut target, &source));
        assert_eq!(target, source);
        assert_eq!(to_variant(&ty, &target), source);
    }
}
