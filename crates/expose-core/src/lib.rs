//! Expose core
//!
//! Runtime type erasure and reflection on top of `expose-types`:
//!
//! - [`Variant`]: type-erased composite value (scalars, arrays, ordered
//!   maps, live references)
//! - [`json`]: JSON text codec for variants
//! - [`typed`]: accessors over one value, stored in place, behind closures,
//!   or as elements of a fixed-size array
//! - [`reflect`]: named properties and nestable objects
//! - [`component`]: in-memory registry of versioned component factories
//!
//! # Example
//!
//! ```ignore
//! use expose_core::{DirectValue, JsonMode, Object, Property};
//!
//! let mut root = Object::new("root");
//! root.add("count", DirectValue::new(3u32))?;
//! root.add_property(Property::read_only("label", DirectValue::new("x".to_string())))?;
//!
//! assert_eq!(root.to_json(JsonMode::Compact), r#"{"count":3,"label":"x"}"#);
//! ```

#![warn(missing_docs)]

pub mod component;
pub mod convert;
pub mod error;
pub mod json;
pub mod reflect;
pub mod typed;
pub mod variant;

pub use component::{ComponentInfo, ComponentRegistry};
pub use error::{ComponentError, ParseError, ReflectError};
pub use json::{JsonMode, JsonOptions};
pub use reflect::{AbstractProperty, Object, Property};
pub use typed::{share, AbstractTyped, ArrayElement, DirectValue, SharedTyped, StoredArray, StoredValue, Typed};
pub use variant::{Variant, VariantArray, VariantMap, VariantRef};

pub use expose_types::{
    native_enum, AbstractType, NativeType, TypeContext, TypeDescriptor, TypeKind,
};
