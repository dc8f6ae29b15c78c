//! Expose type system
//!
//! Type descriptors for native Rust types: category flags, defaults and
//! ranges, symbolic names, and the canonical conversions every typed value
//! supports (string, bool, i64, u64, f64, element access).

#![warn(missing_docs)]

pub mod context;
pub mod descriptor;
pub mod kind;
pub mod native;

pub use context::TypeContext;
pub use descriptor::{AbstractType, TypeDescriptor};
pub use kind::TypeKind;
pub use native::NativeType;
