// ABOUTME: Immutable name -> factory map for pluggable extractors and simulators.
// ABOUTME: Built once at startup and passed by reference to whatever needs lookup.

use crate::{Result, ScmError};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub type Factory<T> = Box<dyn Fn() -> Box<T> + Send + Sync>;

struct RegistryEntry<T: ?Sized> {
    description: String,
    factory: Factory<T>,
}

/// String-keyed factories for one kind of implementation (`"extractor"`, `"simulator"`).
pub struct Registry<T: ?Sized> {
    kind: &'static str,
    entries: BTreeMap<String, RegistryEntry<T>>,
}

pub struct RegistryBuilder<T: ?Sized> {
    kind: &'static str,
    entries: BTreeMap<String, RegistryEntry<T>>,
}

impl<T: ?Sized> RegistryBuilder<T> {
    /// Register a factory. A later registration under the same name replaces the earlier one.
    pub fn register<F>(mut self, name: impl Into<String>, description: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        let name = name.into();
        let entry = RegistryEntry {
            description: description.into(),
            factory: Box::new(factory),
        };
        if self.entries.insert(name.clone(), entry).is_some() {
            warn!(kind = self.kind, name = %name, "replacing existing registration");
        }
        self
    }

    pub fn build(self) -> Registry<T> {
        debug!(kind = self.kind, count = self.entries.len(), "registry built");
        Registry {
            kind: self.kind,
            entries: self.entries,
        }
    }
}

impl<T: ?Sized> Registry<T> {
    pub fn builder(kind: &'static str) -> RegistryBuilder<T> {
        RegistryBuilder {
            kind,
            entries: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Instantiate the implementation registered as `name`.
    pub fn get(&self, name: &str) -> Result<Box<T>> {
        self.entries
            .get(name)
            .map(|entry| (entry.factory)())
            .ok_or_else(|| ScmError::UnknownImplementation {
                kind: self.kind,
                name: name.to_string(),
                available: self.names().into_iter().map(String::from).collect(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// `(name, description)` pairs, sorted by name.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.description.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct Hello;
    impl Greeter for Hello {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    struct Hola;
    impl Greeter for Hola {
        fn greet(&self) -> String {
            "hola".into()
        }
    }

    fn registry() -> Registry<dyn Greeter> {
        Registry::builder("greeter")
            .register("hola", "Spanish greeting", || Box::new(Hola) as Box<dyn Greeter>)
            .register("hello", "English greeting", || Box::new(Hello) as Box<dyn Greeter>)
            .build()
    }

    #[test]
    fn get_instantiates_registered_implementation() {
        let registry = registry();
        assert_eq!(registry.get("hello").unwrap().greet(), "hello");
        assert_eq!(registry.get("hola").unwrap().greet(), "hola");
        assert!(registry.contains("hola"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_name_lists_available_keys() {
        match registry().get("bonjour") {
            Err(ScmError::UnknownImplementation { kind, name, available }) => {
                assert_eq!(kind, "greeter");
                assert_eq!(name, "bonjour");
                assert_eq!(available, vec!["hello".to_string(), "hola".to_string()]);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("lookup of unregistered name succeeded"),
        }
    }

    #[test]
    fn entries_are_sorted_with_descriptions() {
        let registry = registry();
        let entries: Vec<_> = registry.entries().collect();
        assert_eq!(
            entries,
            vec![("hello", "English greeting"), ("hola", "Spanish greeting")]
        );
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let registry: Registry<dyn Greeter> = Registry::builder("greeter")
            .register("g", "first", || Box::new(Hello) as Box<dyn Greeter>)
            .register("g", "second", || Box::new(Hola) as Box<dyn Greeter>)
            .build();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("g").unwrap().greet(), "hola");
        assert!(Registry::<dyn Greeter>::builder("empty").build().is_empty());
    }
}
