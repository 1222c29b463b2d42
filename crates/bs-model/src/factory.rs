//! Type-name to constructor registry.

use core::fmt;
use std::collections::BTreeMap;

use crate::component::Component;

/// Builds a component of one type with the given name and default parameters.
pub type Constructor = fn(&str) -> Box<dyn Component>;

/// Explicit registry of the component types a project can instantiate.
#[derive(Clone, Default)]
pub struct ComponentFactory {
    constructors: BTreeMap<String, Constructor>,
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("types", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ComponentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` for `type_name`, replacing any earlier one.
    pub fn register(&mut self, type_name: &str, constructor: Constructor) {
        self.constructors.insert(type_name.to_string(), constructor);
    }

    /// Builder form of [`ComponentFactory::register`].
    pub fn with(mut self, type_name: &str, constructor: Constructor) -> Self {
        self.register(type_name, constructor);
        self
    }

    /// Build a component, or `None` for an unknown type.
    pub fn create(&self, type_name: &str, name: &str) -> Option<Box<dyn Component>> {
        self.constructors.get(type_name).map(|build| build(name))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentCore;

    struct Marker {
        core: ComponentCore,
    }

    impl Component for Marker {
        fn core(&self) -> &ComponentCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut ComponentCore {
            &mut self.core
        }
    }

    fn marker(name: &str) -> Box<dyn Component> {
        Box::new(Marker {
            core: ComponentCore::new("Marker", name),
        })
    }

    #[test]
    fn creates_registered_types_only() {
        let factory = ComponentFactory::new().with("Marker", marker);
        let built = factory.create("Marker", "m1").unwrap();
        assert_eq!(built.name(), "m1");
        assert_eq!(built.type_name(), "Marker");
        assert!(factory.create("Space", "s1").is_none());
        assert_eq!(factory.type_names().collect::<Vec<_>>(), vec!["Marker"]);
        assert!(format!("{factory:?}").contains("Marker"));
    }
}
