//! Insertion-ordered parameter collection.

use crate::parameter::Parameter;

/// Parameters of one component or project, in declaration order.
///
/// Order is observable: it drives reference traversal and export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    items: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, replacing any existing one with the same name in place.
    pub fn insert(&mut self, parameter: Parameter) {
        match self.items.iter_mut().find(|p| p.name() == parameter.name()) {
            Some(existing) => *existing = parameter,
            None => self.items.push(parameter),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.items.iter().find(|p| p.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.items.iter_mut().find(|p| p.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.items.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(Parameter::name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut set = ParameterSet::new();
        set.insert(Parameter::float("width", 1.0, "m"));
        set.insert(Parameter::float("height", 1.0, "m"));
        set.insert(Parameter::float("width", 2.0, "m"));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["width", "height"]);
        assert_eq!(set.get("width").and_then(Parameter::as_f64), Some(2.0));
    }

    #[test]
    fn missing_lookup() {
        let set = ParameterSet::new();
        assert!(set.get("width").is_none());
        assert!(set.is_empty());
    }
}
