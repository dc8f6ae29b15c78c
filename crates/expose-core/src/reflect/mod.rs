//! Property/Object reflection tree
//!
//! A [`Property`] gives a typed accessor a name; an [`Object`] groups
//! properties and nested objects under unique names and is itself an
//! accessor. Lookups by name are typed: asking for the wrong native type
//! yields nothing rather than a converted value.

pub mod object;
pub mod property;

pub use object::Object;
pub use property::{AbstractProperty, Property};
