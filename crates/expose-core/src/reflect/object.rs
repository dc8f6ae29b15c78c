//! Reflection objects
//!
//! An `Object` is an ordered set of named members (properties or nested
//! objects) and is itself an accessor, so trees nest to any depth and
//! convert to and from variant maps and JSON as a whole.

use std::any::{Any, TypeId};
use std::fmt;

use expose_types::{NativeType, TypeKind};
use rustc_hash::FxHashMap;

use crate::error::ReflectError;
use crate::json::{self, JsonMode};
use crate::typed::{AbstractTyped, Typed};
use crate::variant::{Variant, VariantMap};

use super::property::{AbstractProperty, Property};

/// Ordered collection of named members.
///
/// Member names are unique; adding a second member under a taken name is
/// rejected and the existing member is kept. Members cannot be removed or
/// reordered once added.
#[derive(Default)]
pub struct Object {
    name: String,
    members: Vec<Box<dyn AbstractProperty>>,
    index: FxHashMap<String, usize>,
}

impl Object {
    /// Create an empty object
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Object name
    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Add a property
    pub fn add_property<T: NativeType>(&mut self, property: Property<T>) -> Result<(), ReflectError> {
        self.insert(Box::new(property))
    }

    /// Add a property named `name` over `accessor`
    pub fn add<A: Typed>(&mut self, name: impl Into<String>, accessor: A) -> Result<(), ReflectError> {
        self.add_property(Property::new(name, accessor))
    }

    /// Add a nested object
    pub fn add_object(&mut self, object: Object) -> Result<(), ReflectError> {
        self.insert(Box::new(object))
    }

    /// Add any named accessor
    pub fn add_member(&mut self, member: Box<dyn AbstractProperty>) -> Result<(), ReflectError> {
        self.insert(member)
    }

    fn insert(&mut self, member: Box<dyn AbstractProperty>) -> Result<(), ReflectError> {
        let name = member.name().to_string();
        if self.index.contains_key(&name) {
            log::warn!("object '{}' already has a member named '{}'", self.name, name);
            return Err(ReflectError::DuplicateProperty { name });
        }
        self.index.insert(name, self.members.len());
        self.members.push(member);
        Ok(())
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the object has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.iter().map(|m| m.name())
    }

    /// Members in declaration order
    pub fn members(&self) -> impl Iterator<Item = &dyn AbstractProperty> + '_ {
        self.members.iter().map(|m| -> &dyn AbstractProperty { m.as_ref() })
    }

    /// Check if a member named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Member named `name`
    pub fn member(&self, name: &str) -> Option<&dyn AbstractProperty> {
        let i = *self.index.get(name)?;
        Some(self.members[i].as_ref())
    }

    /// Mutable member named `name`
    pub fn member_mut(&mut self, name: &str) -> Option<&mut dyn AbstractProperty> {
        let i = *self.index.get(name)?;
        Some(self.members[i].as_mut())
    }

    /// Property named `name` holding exactly a `T`
    pub fn property<T: NativeType>(&self, name: &str) -> Option<&Property<T>> {
        self.member(name)?.as_any().downcast_ref::<Property<T>>()
    }

    /// Mutable property named `name` holding exactly a `T`
    pub fn property_mut<T: NativeType>(&mut self, name: &str) -> Option<&mut Property<T>> {
        self.member_mut(name)?.as_any_mut().downcast_mut::<Property<T>>()
    }

    /// Nested object named `name`
    pub fn object(&self, name: &str) -> Option<&Object> {
        self.member(name)?.as_any().downcast_ref::<Object>()
    }

    /// Mutable nested object named `name`
    pub fn object_mut(&mut self, name: &str) -> Option<&mut Object> {
        self.member_mut(name)?.as_any_mut().downcast_mut::<Object>()
    }

    /// Member at a dot-separated path through nested objects
    pub fn find(&self, path: &str) -> Option<&dyn AbstractProperty> {
        match path.split_once('.') {
            None => self.member(path),
            Some((head, rest)) => self.object(head)?.find(rest),
        }
    }

    /// Mutable member at a dot-separated path through nested objects
    pub fn find_mut(&mut self, path: &str) -> Option<&mut dyn AbstractProperty> {
        match path.split_once('.') {
            None => self.member_mut(path),
            Some((head, rest)) => self.object_mut(head)?.find_mut(rest),
        }
    }

    /// Value of the `T` property at `path`
    pub fn value_at<T: NativeType>(&self, path: &str) -> Result<T, ReflectError> {
        let member = self.find(path).ok_or_else(|| ReflectError::UnknownProperty {
            path: path.to_string(),
        })?;
        match member.as_any().downcast_ref::<Property<T>>() {
            Some(property) => Ok(property.get()),
            None => Err(ReflectError::TypeMismatch {
                path: path.to_string(),
                expected: T::type_name(),
                actual: member.type_name(),
            }),
        }
    }

    /// Convert and write `value` into the member at `path`
    pub fn set_at(&mut self, path: &str, value: &Variant) -> Result<(), ReflectError> {
        let member = self.find_mut(path).ok_or_else(|| ReflectError::UnknownProperty {
            path: path.to_string(),
        })?;
        if member.from_variant(value) {
            Ok(())
        } else {
            Err(ReflectError::Conversion {
                path: path.to_string(),
                target: member.type_name(),
            })
        }
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serialize the member tree as JSON
    pub fn to_json(&self, mode: JsonMode) -> String {
        json::to_json(&self.to_variant(), mode)
    }

    /// Apply JSON text to the member tree
    pub fn from_json(&mut self, text: &str) -> bool {
        match json::parse(text) {
            Ok(value) => self.from_variant(&value),
            Err(_) => false,
        }
    }

    fn apply(&mut self, entries: &VariantMap) -> Result<(), String> {
        for (key, value) in entries {
            let Some(member) = self.member_mut(key) else {
                log::trace!("object '{}' skips unknown key '{}'", self.name, key);
                continue;
            };
            if member.is_read_only() {
                continue;
            }
            if !member.from_variant(value) {
                return Err(key.clone());
            }
        }
        Ok(())
    }

    /// Write every member of `previous` back, continuing past failures
    fn restore(&mut self, previous: &VariantMap) {
        for (key, value) in previous {
            let Some(member) = self.member_mut(key) else {
                continue;
            };
            if member.is_read_only() || member.from_variant(value) {
                continue;
            }
            log::warn!(
                "object '{}' could not restore '{}' after a rejected update",
                self.name,
                key
            );
        }
    }
}

impl AbstractTyped for Object {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn native_type_id(&self) -> TypeId {
        TypeId::of::<Object>()
    }

    fn type_name(&self) -> String {
        "Object".to_string()
    }

    fn kind(&self) -> TypeKind {
        TypeKind::OBJECT
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn is_composite(&self) -> bool {
        true
    }

    fn num_sub_values(&self) -> usize {
        self.members.len()
    }

    fn sub_value(&self, index: usize) -> Option<&dyn AbstractTyped> {
        let member = self.members.get(index)?;
        Some(member.as_ref() as &dyn AbstractTyped)
    }

    fn sub_value_mut(&mut self, index: usize) -> Option<&mut dyn AbstractTyped> {
        let member = self.members.get_mut(index)?;
        Some(member.as_mut() as &mut dyn AbstractTyped)
    }

    fn to_variant(&self) -> Variant {
        Variant::Map(
            self.members
                .iter()
                .map(|m| (m.name().to_string(), m.to_variant()))
                .collect(),
        )
    }

    /// Apply a map of member values.
    ///
    /// Unknown keys and read-only members are skipped. If any member rejects
    /// its value every member is restored and `false` is returned.
    fn from_variant(&mut self, value: &Variant) -> bool {
        if let Variant::Reference(link) = value {
            return self.from_variant(&link.get());
        }
        let Some(entries) = value.as_map() else {
            return false;
        };
        let snapshot = self.to_variant();
        match self.apply(entries) {
            Ok(()) => true,
            Err(key) => {
                log::debug!(
                    "object '{}' rejected value for '{}'; restoring previous state",
                    self.name,
                    key
                );
                if let Some(previous) = snapshot.as_map() {
                    self.restore(previous);
                }
                false
            }
        }
    }

    fn to_string(&self) -> String {
        self.to_json(JsonMode::Compact)
    }

    fn from_string(&mut self, text: &str) -> bool {
        self.from_json(text)
    }

    fn to_bool(&self) -> bool {
        false
    }

    fn from_bool(&mut self, _value: bool) -> bool {
        false
    }

    fn to_i64(&self) -> i64 {
        0
    }

    fn from_i64(&mut self, _value: i64) -> bool {
        false
    }

    fn to_u64(&self) -> u64 {
        0
    }

    fn from_u64(&mut self, _value: u64) -> bool {
        false
    }

    fn to_f64(&self) -> f64 {
        0.0
    }

    fn from_f64(&mut self, _value: f64) -> bool {
        false
    }
}

impl AbstractProperty for Object {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("name", &self.name)
            .field("members", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
