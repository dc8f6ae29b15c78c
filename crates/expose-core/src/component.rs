//! Component registry
//!
//! An in-memory table of named, versioned factories for some capability
//! interface `I` (usually a trait object). Lookup takes a name and a semver
//! requirement and picks the highest registered version that satisfies it.

use std::fmt;

use rustc_hash::FxHashMap;
use semver::{Version, VersionReq};

use crate::error::ComponentError;

/// Description of a registered component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Component name
    pub name: String,
    /// Name of the interface the component implements
    pub interface: String,
    /// Component version
    pub version: Version,
    /// Free-form description
    pub description: String,
    /// Author or vendor
    pub author: String,
}

impl ComponentInfo {
    /// Create component info, parsing `version` as semver
    pub fn new(
        name: impl Into<String>,
        interface: impl Into<String>,
        version: &str,
    ) -> Result<Self, ComponentError> {
        let version = parse_version(version)?;
        Ok(Self {
            name: name.into(),
            interface: interface.into(),
            version,
            description: String::new(),
            author: String::new(),
        })
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }
}

fn parse_version(text: &str) -> Result<Version, ComponentError> {
    Version::parse(text.trim()).map_err(|e| ComponentError::InvalidVersion {
        text: text.to_string(),
        message: e.to_string(),
    })
}

fn parse_requirement(text: &str) -> Result<VersionReq, ComponentError> {
    VersionReq::parse(text.trim()).map_err(|e| ComponentError::InvalidVersion {
        text: text.to_string(),
        message: e.to_string(),
    })
}

type Factory<I> = Box<dyn Fn() -> Box<I>>;

struct Registration<I: ?Sized> {
    info: ComponentInfo,
    factory: Factory<I>,
}

/// Registry of component factories producing `Box<I>`.
pub struct ComponentRegistry<I: ?Sized> {
    entries: Vec<Registration<I>>,
    by_name: FxHashMap<String, Vec<usize>>,
}

impl<I: ?Sized + 'static> ComponentRegistry<I> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    /// Register a factory.
    ///
    /// Fails if a component with the same name and version exists.
    pub fn register<F>(&mut self, info: ComponentInfo, factory: F) -> Result<(), ComponentError>
    where
        F: Fn() -> Box<I> + 'static,
    {
        let versions = self.by_name.entry(info.name.clone()).or_default();
        if versions.iter().any(|&i| self.entries[i].info.version == info.version) {
            return Err(ComponentError::Duplicate {
                name: info.name,
                version: info.version.to_string(),
            });
        }
        versions.push(self.entries.len());
        self.entries.push(Registration {
            info,
            factory: Box::new(factory),
        });
        Ok(())
    }

    /// All registered components in registration order
    pub fn components(&self) -> impl Iterator<Item = &ComponentInfo> + '_ {
        self.entries.iter().map(|entry| &entry.info)
    }

    /// Components implementing `interface`
    pub fn components_for<'a>(&'a self, interface: &'a str) -> impl Iterator<Item = &'a ComponentInfo> + 'a {
        self.components().filter(move |info| info.interface == interface)
    }

    /// Highest version of `name` satisfying `requirement` (e.g. `"^1.2"`, `"*"`)
    pub fn find(&self, name: &str, requirement: &str) -> Result<&ComponentInfo, ComponentError> {
        self.resolve(name, requirement).map(|entry| &entry.info)
    }

    /// Create an instance of the highest version of `name` satisfying
    /// `requirement`
    pub fn instantiate(&self, name: &str, requirement: &str) -> Result<Box<I>, ComponentError> {
        let entry = self.resolve(name, requirement)?;
        log::trace!("instantiating component {} {}", entry.info.name, entry.info.version);
        Ok((entry.factory)())
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no component is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn resolve(&self, name: &str, requirement: &str) -> Result<&Registration<I>, ComponentError> {
        let req = parse_requirement(requirement)?;
        let best = self
            .by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| &self.entries[i])
            .filter(|entry| req.matches(&entry.info.version))
            .max_by(|a, b| a.info.version.cmp(&b.info.version));

        best.ok_or_else(|| {
            log::debug!("no component {} matching {}", name, requirement);
            ComponentError::NotFound {
                name: name.to_string(),
                requirement: requirement.to_string(),
            }
        })
    }
}

impl<I: ?Sized + 'static> Default for ComponentRegistry<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized> fmt::Debug for ComponentRegistry<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field(
                "components",
                &self
                    .entries
                    .iter()
                    .map(|e| format!("{} {}", e.info.name, e.info.version))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter {
        fn greet(&self) -> String;
    }

    struct Plain;

    impl Greeter for Plain {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    struct Loud;

    impl Greeter for Loud {
        fn greet(&self) -> String {
            "HELLO".to_string()
        }
    }

    #[test]
    fn test_register_and_list() {
        let mut registry: ComponentRegistry<dyn Greeter> = ComponentRegistry::new();
        let info = ComponentInfo::new("greeter", "Greeter", "1.0.0")
            .unwrap()
            .with_author("expose")
            .with_description("says hello");
        registry.register(info, || Box::new(Plain)).unwrap();

        assert_eq!(registry.len(), 1);
        let listed: Vec<_> = registry.components_for("Greeter").collect();
        assert_eq!(listed[0].author, "expose");
        assert_eq!(registry.components_for("Other").count(), 0);
    }

    #[test]
    fn test_duplicate_version_rejected() {
        let mut registry: ComponentRegistry<dyn Greeter> = ComponentRegistry::new();
        let info = ComponentInfo::new("greeter", "Greeter", "1.0.0").unwrap();
        registry.register(info.clone(), || Box::new(Plain)).unwrap();
        assert!(matches!(
            registry.register(info, || Box::new(Loud)),
            Err(ComponentError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_invalid_version_text() {
        assert!(matches!(
            ComponentInfo::new("x", "X", "one"),
            Err(ComponentError::InvalidVersion { .. })
        ));
        let registry: ComponentRegistry<dyn Greeter> = ComponentRegistry::new();
        assert!(matches!(
            registry.find("x", ">>1"),
            Err(ComponentError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_instantiate_picks_highest_match() {
        let mut registry: ComponentRegistry<dyn Greeter> = ComponentRegistry::new();
        registry
            .register(ComponentInfo::new("greeter", "Greeter", "1.0.0").unwrap(), || Box::new(Plain))
            .unwrap();
        registry
            .register(ComponentInfo::new("greeter", "Greeter", "2.1.0").unwrap(), || Box::new(Loud))
            .unwrap();

        assert_eq!(registry.instantiate("greeter", "*").unwrap().greet(), "HELLO");
        assert_eq!(registry.instantiate("greeter", "^1").unwrap().greet(), "hello");
        assert_eq!(registry.find("greeter", ">=2").unwrap().version, Version::new(2, 1, 0));
        assert!(matches!(
            registry.instantiate("greeter", "^3"),
            Err(ComponentError::NotFound { .. })
        ));
    }
}
